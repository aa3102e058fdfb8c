//! Deferred values (output handles)
//!
//! A [`Value`] is either known at composition time or a forward reference
//! to an attribute of a resource the reconciliation engine has not
//! materialized yet. Forward references compose lazily ([`Value::get`],
//! [`Value::concat`]) and are never forced during composition;
//! [`Value::resolve`] exists for the engine side and for tests.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Logical name of a resource, unique within a stack.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceId(String);

impl ResourceId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ResourceId {
    fn from(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl From<String> for ResourceId {
    fn from(name: String) -> Self {
        Self(name)
    }
}

/// A property value of a resource descriptor.
///
/// Deferred variants (`Ref`, `Get`, and any `Concat`/`Map`/`List` holding
/// them) resolve only after the engine materializes the referenced
/// resources. `Absent` represents a lookup that found nothing; it
/// propagates through [`Value::get`] instead of failing, so the consuming
/// descriptor carries the absence to the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Value {
    /// A value known at composition time.
    Lit(serde_json::Value),

    /// Forward reference to an attribute of a not-yet-materialized
    /// resource. `attribute: None` refers to the whole attribute object
    /// (lookup results of unknown shape).
    Ref {
        resource: ResourceId,
        attribute: Option<String>,
    },

    /// Lazy field projection on a deferred value.
    Get { base: Box<Value>, attribute: String },

    /// String interpolation across deferred parts.
    Concat(Vec<Value>),

    /// Ordered list of values.
    List(Vec<Value>),

    /// String-keyed map of values.
    Map(BTreeMap<String, Value>),

    /// Sensitive payload. Rendered tagged so the engine can encrypt it in
    /// recorded state; redacted from display output.
    Secret(Box<Value>),

    /// A missing lookup result.
    Absent,
}

impl Value {
    pub fn concat(parts: impl IntoIterator<Item = Value>) -> Self {
        Value::Concat(parts.into_iter().collect())
    }

    pub fn list(items: impl IntoIterator<Item = Value>) -> Self {
        Value::List(items.into_iter().collect())
    }

    pub fn map<K: Into<String>>(entries: impl IntoIterator<Item = (K, Value)>) -> Self {
        Value::Map(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Lazily extract a named attribute. Absent in, absent out; never
    /// fails.
    pub fn get(self, attribute: impl Into<String>) -> Self {
        match self {
            Value::Absent => Value::Absent,
            base => Value::Get {
                base: Box::new(base),
                attribute: attribute.into(),
            },
        }
    }

    /// Mark the value as sensitive.
    pub fn secret(self) -> Self {
        Value::Secret(Box::new(self))
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Value::Absent)
    }

    /// Literal payload, if the value is known at composition time.
    pub fn as_lit(&self) -> Option<&serde_json::Value> {
        match self {
            Value::Lit(value) => Some(value),
            _ => None,
        }
    }

    /// Entry of a `Map` value.
    pub fn entry(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Map(entries) => entries.get(key),
            _ => None,
        }
    }

    /// Item of a `List` value.
    pub fn item(&self, index: usize) -> Option<&Value> {
        match self {
            Value::List(items) => items.get(index),
            _ => None,
        }
    }

    /// Resources this value references, directly or nested.
    pub fn dependencies(&self) -> BTreeSet<ResourceId> {
        let mut ids = BTreeSet::new();
        self.collect_dependencies(&mut ids);
        ids
    }

    pub(crate) fn collect_dependencies(&self, ids: &mut BTreeSet<ResourceId>) {
        match self {
            Value::Lit(_) | Value::Absent => {}
            Value::Ref { resource, .. } => {
                ids.insert(resource.clone());
            }
            Value::Get { base, .. } => base.collect_dependencies(ids),
            Value::Secret(inner) => inner.collect_dependencies(ids),
            Value::Concat(parts) | Value::List(parts) => {
                for part in parts {
                    part.collect_dependencies(ids);
                }
            }
            Value::Map(entries) => {
                for value in entries.values() {
                    value.collect_dependencies(ids);
                }
            }
        }
    }

    /// Resolve against materialized attributes.
    ///
    /// Returns `None` while any referenced attribute is unknown or absent;
    /// never panics. Composition code must not call this — it belongs to
    /// the engine side and to tests.
    pub fn resolve(&self, attrs: &impl AttributeSource) -> Option<serde_json::Value> {
        match self {
            Value::Lit(value) => Some(value.clone()),
            Value::Ref {
                resource,
                attribute,
            } => {
                let object = attrs.attributes(resource)?;
                match attribute {
                    None => Some(object.clone()),
                    Some(name) => object.get(name).filter(|v| !v.is_null()).cloned(),
                }
            }
            Value::Get { base, attribute } => {
                let base = base.resolve(attrs)?;
                base.get(attribute).filter(|v| !v.is_null()).cloned()
            }
            Value::Concat(parts) => {
                let mut out = String::new();
                for part in parts {
                    match part.resolve(attrs)? {
                        serde_json::Value::String(s) => out.push_str(&s),
                        serde_json::Value::Number(n) => out.push_str(&n.to_string()),
                        serde_json::Value::Bool(b) => out.push_str(if b { "true" } else { "false" }),
                        _ => return None,
                    }
                }
                Some(serde_json::Value::String(out))
            }
            Value::List(items) => items
                .iter()
                .map(|item| item.resolve(attrs))
                .collect::<Option<Vec<_>>>()
                .map(serde_json::Value::Array),
            Value::Map(entries) => {
                let mut object = serde_json::Map::new();
                for (key, value) in entries {
                    object.insert(key.clone(), value.resolve(attrs)?);
                }
                Some(serde_json::Value::Object(object))
            }
            Value::Secret(inner) => inner.resolve(attrs),
            Value::Absent => None,
        }
    }

    fn fmt_path(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Ref {
                resource,
                attribute: None,
            } => write!(f, "{resource}"),
            Value::Ref {
                resource,
                attribute: Some(name),
            } => write!(f, "{resource}.{name}"),
            Value::Get { base, attribute } => {
                base.fmt_path(f)?;
                write!(f, ".{attribute}")
            }
            other => fmt::Display::fmt(other, f),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Lit(serde_json::Value::String(s)) => write!(f, "{s}"),
            Value::Lit(other) => write!(f, "{other}"),
            Value::Ref { .. } | Value::Get { .. } => {
                write!(f, "${{")?;
                self.fmt_path(f)?;
                write!(f, "}}")
            }
            Value::Concat(parts) => {
                for part in parts {
                    write!(f, "{part}")?;
                }
                Ok(())
            }
            Value::List(_) => write!(f, "[..]"),
            Value::Map(_) => write!(f, "{{..}}"),
            Value::Secret(_) => write!(f, "[secret]"),
            Value::Absent => write!(f, "<absent>"),
        }
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        Value::Lit(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Lit(serde_json::Value::String(value.to_string()))
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Lit(serde_json::Value::String(value))
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Lit(serde_json::Value::Bool(value))
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Lit(serde_json::Value::from(value))
    }
}

impl From<u16> for Value {
    fn from(value: u16) -> Self {
        Value::Lit(serde_json::Value::from(value))
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Value::Lit(serde_json::Value::from(value))
    }
}

impl From<u64> for Value {
    fn from(value: u64) -> Self {
        Value::Lit(serde_json::Value::from(value))
    }
}

/// Source of materialized resource attributes (the engine's view of the
/// world after reconciliation).
pub trait AttributeSource {
    fn attributes(&self, resource: &ResourceId) -> Option<&serde_json::Value>;
}

impl AttributeSource for BTreeMap<ResourceId, serde_json::Value> {
    fn attributes(&self, resource: &ResourceId) -> Option<&serde_json::Value> {
        self.get(resource)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn attrs(entries: &[(&str, serde_json::Value)]) -> BTreeMap<ResourceId, serde_json::Value> {
        entries
            .iter()
            .map(|(name, value)| (ResourceId::from(*name), value.clone()))
            .collect()
    }

    #[test]
    fn get_on_absent_stays_absent() {
        let value = Value::Absent.get("arn");
        assert!(value.is_absent());
        // projecting further still never fails
        assert!(value.get("id").is_absent());
    }

    #[test]
    fn get_on_reference_projects_lazily() {
        let base = Value::Ref {
            resource: "certificate".into(),
            attribute: None,
        };
        let arn = base.get("arn");
        let source = attrs(&[("certificate", json!({ "arn": "arn:aws:acm:cert/1" }))]);
        assert_eq!(arn.resolve(&source), Some(json!("arn:aws:acm:cert/1")));
    }

    #[test]
    fn resolve_missing_attribute_is_none_not_panic() {
        let value = Value::Ref {
            resource: "bucket".into(),
            attribute: Some("arn".to_string()),
        };
        let source = attrs(&[("bucket", json!({ "id": "b-1" }))]);
        assert_eq!(value.resolve(&source), None);

        // unknown resource as well
        let empty = attrs(&[]);
        assert_eq!(value.resolve(&empty), None);
    }

    #[test]
    fn concat_resolves_after_all_parts() {
        let url = Value::concat([
            Value::from("https://"),
            Value::Ref {
                resource: "cdn".into(),
                attribute: Some("domainName".to_string()),
            },
        ]);
        assert_eq!(url.resolve(&attrs(&[])), None);

        let source = attrs(&[("cdn", json!({ "domainName": "d111.cloudfront.example" }))]);
        assert_eq!(
            url.resolve(&source),
            Some(json!("https://d111.cloudfront.example"))
        );
    }

    #[test]
    fn dependencies_found_in_nested_properties() {
        let value = Value::map([
            (
                "resources",
                Value::list([
                    Value::Ref {
                        resource: "bucket".into(),
                        attribute: Some("arn".to_string()),
                    },
                    Value::concat([
                        Value::Ref {
                            resource: "bucket".into(),
                            attribute: Some("arn".to_string()),
                        },
                        Value::from("/*"),
                    ]),
                ]),
            ),
            (
                "condition",
                Value::Ref {
                    resource: "cdn".into(),
                    attribute: Some("arn".to_string()),
                },
            ),
        ]);
        let deps = value.dependencies();
        assert_eq!(deps.len(), 2);
        assert!(deps.contains(&"bucket".into()));
        assert!(deps.contains(&"cdn".into()));
    }

    #[test]
    fn secret_display_is_redacted() {
        let value = Value::from("hunter2").secret();
        assert_eq!(value.to_string(), "[secret]");
        // the payload is still there for the engine
        let source = attrs(&[]);
        assert_eq!(value.resolve(&source), Some(json!("hunter2")));
    }

    #[test]
    fn display_renders_interpolation_form() {
        let url = Value::concat([
            Value::from("https://"),
            Value::Ref {
                resource: "cdn".into(),
                attribute: Some("domainName".to_string()),
            },
        ]);
        assert_eq!(url.to_string(), "https://${cdn.domainName}");
    }
}
