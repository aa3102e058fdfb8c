//! Container orchestration descriptors: cluster, task definition, service

use stackform_core::{Resource, ResourceId, ResourceIdentity, ResourceRef, Result, Stack, Value};

pub const CLUSTER_KIND: &str = "aws:ecs:cluster";
pub const TASK_DEFINITION_KIND: &str = "aws:ecs:task-definition";
pub const SERVICE_KIND: &str = "aws:ecs:service";

/// Handle to a cluster descriptor.
#[derive(Debug, Clone)]
pub struct Cluster {
    res: ResourceRef,
}

impl Cluster {
    pub fn new(stack: &mut Stack, name: &str) -> Result<Self> {
        Ok(Self {
            res: stack.add(Resource::new(CLUSTER_KIND, name))?,
        })
    }

    pub fn arn(&self) -> Value {
        self.res.attr("arn")
    }

    pub fn cluster_name(&self) -> Value {
        self.res.attr("name")
    }
}

impl ResourceIdentity for Cluster {
    fn resource_id(&self) -> &ResourceId {
        self.res.resource_id()
    }
}

/// A container port mapping. With awsvpc networking the host port always
/// equals the container port.
#[derive(Debug, Clone, Copy)]
pub struct PortMapping {
    pub container_port: u16,
}

impl PortMapping {
    pub fn tcp(port: u16) -> Self {
        Self {
            container_port: port,
        }
    }

    fn to_value(self) -> Value {
        Value::map([
            ("containerPort", self.container_port.into()),
            ("protocol", "tcp".into()),
        ])
    }
}

/// Reference to one key of a managed secret; the value itself never
/// appears in the task definition.
#[derive(Debug, Clone)]
pub struct ContainerSecret {
    pub name: String,
    pub value_from: Value,
}

/// One container in a task definition.
#[derive(Debug, Clone)]
pub struct ContainerDefinition {
    pub name: String,
    pub image: Value,
    pub essential: bool,
    pub port_mappings: Vec<PortMapping>,
    pub secrets: Vec<ContainerSecret>,
}

impl ContainerDefinition {
    fn to_value(&self) -> Value {
        let mut entries: Vec<(&str, Value)> = vec![
            ("name", self.name.clone().into()),
            ("image", self.image.clone()),
            ("essential", self.essential.into()),
            (
                "portMappings",
                Value::list(self.port_mappings.iter().map(|m| m.to_value())),
            ),
        ];
        if !self.secrets.is_empty() {
            entries.push((
                "secrets",
                Value::list(self.secrets.iter().map(|secret| {
                    Value::map([
                        ("name", Value::from(secret.name.clone())),
                        ("valueFrom", secret.value_from.clone()),
                    ])
                })),
            ));
        }
        Value::map(entries)
    }
}

/// Arguments for [`TaskDefinition::new`].
#[derive(Debug, Clone)]
pub struct TaskDefinitionArgs {
    pub family: String,
    pub cpu: u32,
    pub memory: u32,
    pub execution_role_arn: Value,
    pub containers: Vec<ContainerDefinition>,
}

/// Handle to a task-definition descriptor.
#[derive(Debug, Clone)]
pub struct TaskDefinition {
    res: ResourceRef,
}

impl TaskDefinition {
    pub fn new(stack: &mut Stack, name: &str, args: TaskDefinitionArgs) -> Result<Self> {
        // cpu and memory are stringly typed on the provider wire
        let resource = Resource::new(TASK_DEFINITION_KIND, name)
            .with_property("family", args.family)
            .with_property("cpu", args.cpu.to_string())
            .with_property("memory", args.memory.to_string())
            .with_property("networkMode", "awsvpc")
            .with_property(
                "requiresCompatibilities",
                Value::list([Value::from("FARGATE")]),
            )
            .with_property("executionRoleArn", args.execution_role_arn)
            .with_property(
                "containerDefinitions",
                Value::list(args.containers.iter().map(ContainerDefinition::to_value)),
            );
        Ok(Self {
            res: stack.add(resource)?,
        })
    }

    pub fn arn(&self) -> Value {
        self.res.attr("arn")
    }
}

impl ResourceIdentity for TaskDefinition {
    fn resource_id(&self) -> &ResourceId {
        self.res.resource_id()
    }
}

/// Network placement for a service task.
#[derive(Debug, Clone)]
pub struct NetworkArgs {
    pub assign_public_ip: bool,
    pub security_groups: Vec<Value>,
}

/// Attachment between a service and a target group.
#[derive(Debug, Clone)]
pub struct ServiceLoadBalancer {
    pub target_group_arn: Value,
    pub container_name: String,
    pub container_port: u16,
}

/// Arguments for [`Service::new`].
#[derive(Debug, Clone)]
pub struct ServiceArgs {
    pub cluster: Value,
    pub task_definition: Value,
    pub desired_count: u32,
    pub launch_type: String,
    pub network: NetworkArgs,
    pub load_balancers: Vec<ServiceLoadBalancer>,
}

/// Handle to a service descriptor.
#[derive(Debug, Clone)]
pub struct Service {
    res: ResourceRef,
}

impl Service {
    pub fn new(stack: &mut Stack, name: &str, args: ServiceArgs) -> Result<Self> {
        let load_balancers = Value::list(args.load_balancers.into_iter().map(|lb| {
            Value::map([
                ("targetGroupArn", lb.target_group_arn),
                ("containerName", lb.container_name.into()),
                ("containerPort", lb.container_port.into()),
            ])
        }));
        let resource = Resource::new(SERVICE_KIND, name)
            .with_property("cluster", args.cluster)
            .with_property("taskDefinition", args.task_definition)
            .with_property("desiredCount", args.desired_count)
            .with_property("launchType", args.launch_type)
            .with_property(
                "networkConfiguration",
                Value::map([
                    ("assignPublicIp", args.network.assign_public_ip.into()),
                    (
                        "securityGroups",
                        Value::List(args.network.security_groups),
                    ),
                ]),
            )
            .with_property("loadBalancers", load_balancers);
        Ok(Self {
            res: stack.add(resource)?,
        })
    }

    pub fn service_name(&self) -> Value {
        self.res.attr("name")
    }
}

impl ResourceIdentity for Service {
    fn resource_id(&self) -> &ResourceId {
        self.res.resource_id()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn container_secrets_reference_keys_not_values() {
        let mut stack = Stack::new("test");
        let secret_arn = Value::Ref {
            resource: "api-secrets".into(),
            attribute: Some("arn".to_string()),
        };
        TaskDefinition::new(
            &mut stack,
            "task-definition",
            TaskDefinitionArgs {
                family: "api".to_string(),
                cpu: 256,
                memory: 512,
                execution_role_arn: Value::from("arn:aws:iam::123:role/exec"),
                containers: vec![ContainerDefinition {
                    name: "api".to_string(),
                    image: Value::from("registry.example/api:latest"),
                    essential: true,
                    port_mappings: vec![PortMapping::tcp(1337)],
                    secrets: vec![ContainerSecret {
                        name: "API_KEY".to_string(),
                        value_from: Value::concat([
                            secret_arn,
                            ":".into(),
                            "API_KEY".into(),
                            "::".into(),
                        ]),
                    }],
                }],
            },
        )
        .unwrap();

        let task = stack.get("task-definition").unwrap();
        assert_eq!(
            task.properties["cpu"].as_lit(),
            Some(&json!("256")),
            "cpu travels as a string"
        );
        let container = task.properties["containerDefinitions"].item(0).unwrap();
        let secret = container.entry("secrets").unwrap().item(0).unwrap();
        assert_eq!(
            secret.entry("valueFrom").unwrap().to_string(),
            "${api-secrets.arn}:API_KEY::"
        );
        // the secret reference makes the task depend on the secret
        assert!(task.dependencies().contains(&"api-secrets".into()));
    }
}
