//! Secrets Manager descriptors
//!
//! The secret bundle is written once as a versioned JSON blob; consumers
//! reference individual keys by templated path (`{arn}:{key}::`), never by
//! value.

use stackform_core::{Resource, ResourceId, ResourceIdentity, ResourceRef, Result, Stack, Value};

pub const SECRET_KIND: &str = "aws:secretsmanager:secret";
pub const SECRET_VERSION_KIND: &str = "aws:secretsmanager:secret-version";

/// Handle to a managed secret descriptor.
#[derive(Debug, Clone)]
pub struct Secret {
    res: ResourceRef,
}

impl Secret {
    pub fn new(stack: &mut Stack, name: &str) -> Result<Self> {
        Ok(Self {
            res: stack.add(Resource::new(SECRET_KIND, name))?,
        })
    }

    pub fn arn(&self) -> Value {
        self.res.attr("arn")
    }

    pub fn id(&self) -> Value {
        self.res.attr("id")
    }
}

impl ResourceIdentity for Secret {
    fn resource_id(&self) -> &ResourceId {
        self.res.resource_id()
    }
}

/// Arguments for [`SecretVersion::new`].
#[derive(Debug, Clone)]
pub struct SecretVersionArgs {
    pub secret_id: Value,

    /// The serialized payload. The builder marks it sensitive; it is
    /// rendered tagged for the engine and redacted from display output.
    pub secret_string: Value,
}

/// Handle to a secret-version descriptor.
#[derive(Debug, Clone)]
pub struct SecretVersion {
    res: ResourceRef,
}

impl SecretVersion {
    pub fn new(stack: &mut Stack, name: &str, args: SecretVersionArgs) -> Result<Self> {
        let resource = Resource::new(SECRET_VERSION_KIND, name)
            .with_property("secretId", args.secret_id)
            .with_property("secretString", args.secret_string.secret());
        Ok(Self {
            res: stack.add(resource)?,
        })
    }

    pub fn arn(&self) -> Value {
        self.res.attr("arn")
    }

    /// Templated reference to one key of the version's JSON payload.
    /// Referencing the version (not the bare secret) orders every consumer
    /// after the payload is written.
    pub fn key_reference(&self, key: &str) -> Value {
        Value::concat([self.arn(), ":".into(), key.into(), "::".into()])
    }
}

impl ResourceIdentity for SecretVersion {
    fn resource_id(&self) -> &ResourceId {
        self.res.resource_id()
    }
}
