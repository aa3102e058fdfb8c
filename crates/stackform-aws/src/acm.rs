//! ACM certificate lookup (external collaborator)
//!
//! Certificates are issued and validated out of band; composition only
//! resolves a pre-existing one by apex domain. The lookup result may be
//! absent — consumers extract the ARN through [`crate::arn_of`] and the
//! engine reports the failure once a consuming descriptor needs the
//! missing attribute.

use stackform_core::{Resource, ResourceId, ResourceIdentity, ResourceRef, Result, Stack, Value};

pub const CERTIFICATE_KIND: &str = "aws:acm:certificate";

/// Handle to a certificate lookup.
#[derive(Debug, Clone)]
pub struct Certificate {
    res: ResourceRef,
}

/// Look up the most recent issued certificate covering `domain`.
pub fn find_certificate(stack: &mut Stack, name: &str, domain: &str) -> Result<Certificate> {
    let resource = Resource::lookup(CERTIFICATE_KIND, name)
        .with_property("domain", domain)
        .with_property("statuses", Value::list([Value::from("ISSUED")]))
        .with_property("mostRecent", true);
    Ok(Certificate {
        res: stack.add(resource)?,
    })
}

impl Certificate {
    /// The whole lookup result; shape unknown until the engine resolves it.
    pub fn output(&self) -> Value {
        self.res.output()
    }
}

impl ResourceIdentity for Certificate {
    fn resource_id(&self) -> &ResourceId {
        self.res.resource_id()
    }
}
