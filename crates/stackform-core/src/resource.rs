//! Resource descriptors

use crate::value::{ResourceId, Value};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Declarative specification of one desired external resource.
///
/// A descriptor referencing another descriptor's output implicitly depends
/// on it; `depends_on` carries only the extra edges needed when two
/// descriptors must be ordered without a data dependency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    /// Resource kind (e.g. "aws:s3:bucket").
    pub kind: String,

    /// Logical name, unique within the stack.
    pub name: ResourceId,

    /// Desired properties; leaves may be deferred references.
    #[serde(default)]
    pub properties: BTreeMap<String, Value>,

    /// Explicit ordering constraints.
    #[serde(default)]
    pub depends_on: BTreeSet<ResourceId>,

    /// Read-only data source resolved by the engine, never created.
    #[serde(default)]
    pub lookup: bool,
}

impl Resource {
    pub fn new(kind: impl Into<String>, name: impl Into<ResourceId>) -> Self {
        Self {
            kind: kind.into(),
            name: name.into(),
            properties: BTreeMap::new(),
            depends_on: BTreeSet::new(),
            lookup: false,
        }
    }

    /// A read-only data source (zone, certificate, user lookups).
    pub fn lookup(kind: impl Into<String>, name: impl Into<ResourceId>) -> Self {
        Self {
            lookup: true,
            ..Self::new(kind, name)
        }
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    pub fn with_dependency<D: ResourceIdentity + ?Sized>(mut self, dep: &D) -> Self {
        self.depends_on.insert(dep.resource_id().clone());
        self
    }

    /// Full predecessor set: explicit edges plus every resource referenced
    /// by a property value.
    pub fn dependencies(&self) -> BTreeSet<ResourceId> {
        let mut ids = self.depends_on.clone();
        for value in self.properties.values() {
            value.collect_dependencies(&mut ids);
        }
        ids
    }
}

/// Identifies a registered descriptor. Implemented by [`ResourceRef`] and
/// by the typed handles built on top of it.
pub trait ResourceIdentity {
    fn resource_id(&self) -> &ResourceId;
}

/// Cheap handle to a registered descriptor; mints deferred references to
/// its attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceRef {
    name: ResourceId,
}

impl ResourceRef {
    pub(crate) fn new(name: ResourceId) -> Self {
        Self { name }
    }

    /// Deferred reference to a named attribute.
    pub fn attr(&self, attribute: impl Into<String>) -> Value {
        Value::Ref {
            resource: self.name.clone(),
            attribute: Some(attribute.into()),
        }
    }

    /// Deferred reference to the whole attribute object.
    pub fn output(&self) -> Value {
        Value::Ref {
            resource: self.name.clone(),
            attribute: None,
        }
    }
}

impl ResourceIdentity for ResourceRef {
    fn resource_id(&self) -> &ResourceId {
        &self.name
    }
}
