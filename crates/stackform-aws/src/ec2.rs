//! Security-group descriptors

use stackform_core::{Resource, ResourceId, ResourceIdentity, ResourceRef, Result, Stack, Value};

pub const SECURITY_GROUP_KIND: &str = "aws:ec2:security-group";

/// One ingress or egress rule.
#[derive(Debug, Clone)]
pub struct SecurityGroupRule {
    pub protocol: String,
    pub from_port: u16,
    pub to_port: u16,
    pub cidr_blocks: Vec<String>,

    /// Source/destination security groups; traffic is restricted to
    /// members of these groups.
    pub security_groups: Vec<Value>,
}

impl SecurityGroupRule {
    /// TCP on a single port, with no sources yet.
    pub fn tcp(port: u16) -> Self {
        Self {
            protocol: "tcp".to_string(),
            from_port: port,
            to_port: port,
            cidr_blocks: Vec::new(),
            security_groups: Vec::new(),
        }
    }

    /// All protocols, all ports.
    pub fn all_traffic() -> Self {
        Self {
            protocol: "-1".to_string(),
            from_port: 0,
            to_port: 0,
            cidr_blocks: Vec::new(),
            security_groups: Vec::new(),
        }
    }

    pub fn with_cidr(mut self, cidr: impl Into<String>) -> Self {
        self.cidr_blocks.push(cidr.into());
        self
    }

    pub fn with_source_group(mut self, group: impl Into<Value>) -> Self {
        self.security_groups.push(group.into());
        self
    }

    fn to_value(&self) -> Value {
        let mut entries: Vec<(&str, Value)> = vec![
            ("protocol", self.protocol.clone().into()),
            ("fromPort", self.from_port.into()),
            ("toPort", self.to_port.into()),
        ];
        if !self.cidr_blocks.is_empty() {
            entries.push((
                "cidrBlocks",
                Value::list(self.cidr_blocks.iter().cloned().map(Value::from)),
            ));
        }
        if !self.security_groups.is_empty() {
            entries.push(("securityGroups", Value::List(self.security_groups.clone())));
        }
        Value::map(entries)
    }
}

/// Arguments for [`SecurityGroup::new`].
#[derive(Debug, Clone, Default)]
pub struct SecurityGroupArgs {
    pub description: String,
    pub ingress: Vec<SecurityGroupRule>,
    pub egress: Vec<SecurityGroupRule>,
}

/// Handle to a security-group descriptor.
#[derive(Debug, Clone)]
pub struct SecurityGroup {
    res: ResourceRef,
}

impl SecurityGroup {
    pub fn new(stack: &mut Stack, name: &str, args: SecurityGroupArgs) -> Result<Self> {
        let resource = Resource::new(SECURITY_GROUP_KIND, name)
            .with_property("description", args.description)
            .with_property(
                "ingress",
                Value::list(args.ingress.iter().map(SecurityGroupRule::to_value)),
            )
            .with_property(
                "egress",
                Value::list(args.egress.iter().map(SecurityGroupRule::to_value)),
            );
        Ok(Self {
            res: stack.add(resource)?,
        })
    }

    pub fn id(&self) -> Value {
        self.res.attr("id")
    }
}

impl ResourceIdentity for SecurityGroup {
    fn resource_id(&self) -> &ResourceId {
        self.res.resource_id()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn source_group_rule_carries_no_cidr() {
        let mut stack = Stack::new("test");
        let lb_group = SecurityGroup::new(
            &mut stack,
            "lb-security-group",
            SecurityGroupArgs {
                description: "HTTPS from the internet".to_string(),
                ingress: vec![SecurityGroupRule::tcp(443).with_cidr("0.0.0.0/0")],
                egress: vec![SecurityGroupRule::all_traffic().with_cidr("0.0.0.0/0")],
            },
        )
        .unwrap();

        SecurityGroup::new(
            &mut stack,
            "service-security-group",
            SecurityGroupArgs {
                description: "Container port from the load balancer".to_string(),
                ingress: vec![SecurityGroupRule::tcp(1337).with_source_group(lb_group.id())],
                egress: vec![SecurityGroupRule::all_traffic().with_cidr("0.0.0.0/0")],
            },
        )
        .unwrap();

        let group = stack.get("service-security-group").unwrap();
        let rule = group.properties["ingress"].item(0).unwrap();
        assert_eq!(rule.entry("fromPort").unwrap().as_lit(), Some(&json!(1337)));
        assert!(rule.entry("cidrBlocks").is_none());
        assert!(rule.entry("securityGroups").is_some());
        // the source-group reference is a data dependency on the LB group
        assert!(
            group
                .dependencies()
                .contains(&"lb-security-group".into())
        );
    }
}
