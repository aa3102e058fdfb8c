//! Load-balancer descriptors: load balancer, target group, listener

use stackform_core::{Resource, ResourceId, ResourceIdentity, ResourceRef, Result, Stack, Value};

pub const LOAD_BALANCER_KIND: &str = "aws:elb:load-balancer";
pub const TARGET_GROUP_KIND: &str = "aws:elb:target-group";
pub const LISTENER_KIND: &str = "aws:elb:listener";

/// Arguments for [`LoadBalancer::new`].
#[derive(Debug, Clone)]
pub struct LoadBalancerArgs {
    pub internal: bool,
    pub load_balancer_type: String,
    pub security_groups: Vec<Value>,
}

impl Default for LoadBalancerArgs {
    fn default() -> Self {
        Self {
            internal: false,
            load_balancer_type: "application".to_string(),
            security_groups: Vec::new(),
        }
    }
}

/// Handle to a load-balancer descriptor.
#[derive(Debug, Clone)]
pub struct LoadBalancer {
    res: ResourceRef,
}

impl LoadBalancer {
    pub fn new(stack: &mut Stack, name: &str, args: LoadBalancerArgs) -> Result<Self> {
        let resource = Resource::new(LOAD_BALANCER_KIND, name)
            .with_property("internal", args.internal)
            .with_property("loadBalancerType", args.load_balancer_type)
            .with_property("securityGroups", Value::List(args.security_groups));
        Ok(Self {
            res: stack.add(resource)?,
        })
    }

    pub fn arn(&self) -> Value {
        self.res.attr("arn")
    }

    pub fn dns_name(&self) -> Value {
        self.res.attr("dnsName")
    }

    pub fn zone_id(&self) -> Value {
        self.res.attr("zoneId")
    }
}

impl ResourceIdentity for LoadBalancer {
    fn resource_id(&self) -> &ResourceId {
        self.res.resource_id()
    }
}

/// Health check policy for a target group.
#[derive(Debug, Clone)]
pub struct HealthCheckArgs {
    pub path: String,
    pub interval_seconds: u32,

    /// HTTP status codes treated as healthy (e.g. "200-204").
    pub matcher: String,
}

/// Arguments for [`TargetGroup::new`].
#[derive(Debug, Clone)]
pub struct TargetGroupArgs {
    pub port: u16,
    pub protocol: String,
    pub target_type: String,
    pub health_check: HealthCheckArgs,
}

/// Handle to a target-group descriptor.
#[derive(Debug, Clone)]
pub struct TargetGroup {
    res: ResourceRef,
}

impl TargetGroup {
    pub fn new(stack: &mut Stack, name: &str, args: TargetGroupArgs) -> Result<Self> {
        let health = args.health_check;
        let resource = Resource::new(TARGET_GROUP_KIND, name)
            .with_property("port", args.port)
            .with_property("protocol", args.protocol)
            .with_property("targetType", args.target_type)
            .with_property(
                "healthCheck",
                Value::map([
                    ("path", Value::from(health.path)),
                    ("interval", health.interval_seconds.into()),
                    ("matcher", health.matcher.into()),
                ]),
            );
        Ok(Self {
            res: stack.add(resource)?,
        })
    }

    pub fn arn(&self) -> Value {
        self.res.attr("arn")
    }
}

impl ResourceIdentity for TargetGroup {
    fn resource_id(&self) -> &ResourceId {
        self.res.resource_id()
    }
}

/// Arguments for [`Listener::new`].
#[derive(Debug, Clone)]
pub struct ListenerArgs {
    pub load_balancer_arn: Value,
    pub port: u16,
    pub protocol: String,
    pub ssl_policy: String,

    /// Certificate for TLS termination; may be an absent reference, which
    /// the engine rejects at creation time.
    pub certificate_arn: Value,

    /// Target group receiving forwarded traffic.
    pub target_group_arn: Value,
}

/// Handle to a listener descriptor.
#[derive(Debug, Clone)]
pub struct Listener {
    res: ResourceRef,
}

impl Listener {
    pub fn new(stack: &mut Stack, name: &str, args: ListenerArgs) -> Result<Self> {
        let resource = Resource::new(LISTENER_KIND, name)
            .with_property("loadBalancerArn", args.load_balancer_arn)
            .with_property("port", args.port)
            .with_property("protocol", args.protocol)
            .with_property("sslPolicy", args.ssl_policy)
            .with_property("certificateArn", args.certificate_arn)
            .with_property(
                "defaultActions",
                Value::list([Value::map([
                    ("type", Value::from("forward")),
                    ("targetGroupArn", args.target_group_arn),
                ])]),
            );
        Ok(Self {
            res: stack.add(resource)?,
        })
    }
}

impl ResourceIdentity for Listener {
    fn resource_id(&self) -> &ResourceId {
        self.res.resource_id()
    }
}
