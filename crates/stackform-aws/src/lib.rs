//! Provider resource builders
//!
//! Typed descriptor builders for the resource kinds Stackform composes.
//! Each builder registers exactly one descriptor on the stack and returns a
//! handle exposing deferred attribute references; nothing here performs
//! provider I/O. Property keys use the provider's wire names so the
//! rendered manifest needs no further translation by the engine.

pub mod acm;
pub mod cloudfront;
pub mod ec2;
pub mod ecr;
pub mod ecs;
pub mod elb;
pub mod iam;
pub mod route53;
pub mod s3;
pub mod secretsmanager;

use stackform_core::Value;

/// Lazily extract the `arn` attribute from a resource reference of
/// unknown shape, including an absent one. Absent in, absent out; never
/// fails.
pub fn arn_of(resource: Value) -> Value {
    resource.get("arn")
}

#[cfg(test)]
mod tests {
    use super::*;
    use stackform_core::{ResourceId, Value};

    #[test]
    fn arn_of_absent_resource_is_absent() {
        assert!(arn_of(Value::Absent).is_absent());
    }

    #[test]
    fn arn_of_reference_projects_the_arn() {
        let reference = Value::Ref {
            resource: ResourceId::from("certificate"),
            attribute: None,
        };
        match arn_of(reference) {
            Value::Get { attribute, .. } => assert_eq!(attribute, "arn"),
            other => panic!("expected a lazy projection, got {other:?}"),
        }
    }
}
