//! API backend composition
//!
//! Container registry, secret bundle, orchestration cluster, task
//! execution role with least-privilege secret access, HTTPS load balancer,
//! security groups, running service, and DNS alias.

use stackform_aws::ec2::{SecurityGroup, SecurityGroupArgs, SecurityGroupRule};
use stackform_aws::ecr::{Repository, RepositoryArgs};
use stackform_aws::ecs::{
    Cluster, ContainerDefinition, ContainerSecret, NetworkArgs, PortMapping, Service, ServiceArgs,
    ServiceLoadBalancer, TaskDefinition, TaskDefinitionArgs,
};
use stackform_aws::elb::{
    HealthCheckArgs, Listener, ListenerArgs, LoadBalancer, LoadBalancerArgs, TargetGroup,
    TargetGroupArgs,
};
use stackform_aws::route53::{AliasTarget, Record, RecordArgs};
use stackform_aws::secretsmanager::{Secret, SecretVersion, SecretVersionArgs};
use stackform_aws::{acm, arn_of, iam, route53};
use stackform_config::{BackendConfig, SiteConfig};
use stackform_core::{Result, Stack, Value};

const HEALTH_CHECK_PATH: &str = "/_health";
const HEALTH_CHECK_INTERVAL_SECONDS: u32 = 180;
/// Any 2xx up to 204 counts as healthy.
const HEALTH_CHECK_MATCHER: &str = "200-204";
const TLS_POLICY: &str = "ELBSecurityPolicy-TLS13-1-2-2021-06";
const TASK_SERVICE_PRINCIPAL: &str = "ecs-tasks.amazonaws.com";
const EXECUTION_ROLE_POLICY_ARN: &str =
    "arn:aws:iam::aws:policy/service-role/AmazonECSTaskExecutionRolePolicy";

/// Named outputs of the backend composition.
#[derive(Debug, Clone)]
pub struct BackendOutputs {
    pub image_uri: Value,
    pub load_balancer_url: Value,
    pub repo_name: Value,
    pub service_name: Value,
    pub cluster_name: Value,
    pub container_name: Value,
}

pub fn compose(
    stack: &mut Stack,
    site: &SiteConfig,
    backend: &BackendConfig,
) -> Result<BackendOutputs> {
    let repo = Repository::new(
        stack,
        "repo",
        RepositoryArgs {
            force_delete: true,
            max_images: Some(1),
        },
    )?;
    let image_uri = Value::concat([
        repo.repository_url(),
        ":".into(),
        backend.image_tag.as_str().into(),
    ]);

    let secret = Secret::new(stack, "api-secrets")?;
    let payload = serde_json::to_string(&backend.secrets)?;
    let version = SecretVersion::new(
        stack,
        "api-secrets-version",
        SecretVersionArgs {
            secret_id: secret.id(),
            secret_string: payload.into(),
        },
    )?;

    let cluster = Cluster::new(stack, "cluster")?;

    let execution_role = iam::Role::new(
        stack,
        "task-execution-role",
        iam::service_assume_role_policy(TASK_SERVICE_PRINCIPAL).to_value(),
    )?;
    iam::RolePolicyAttachment::new(
        stack,
        "task-execution-base",
        execution_role.role_name(),
        EXECUTION_ROLE_POLICY_ARN.into(),
    )?;

    // Least privilege: the execution role may read this one secret and
    // nothing else in the store.
    let secret_access = iam::PolicyDocument::new().with_statement(
        iam::PolicyStatement::allow()
            .with_action("secretsmanager:GetSecretValue")
            .with_resource(secret.arn()),
    );
    let secret_policy = iam::Policy::new(
        stack,
        "secret-access",
        "Read access to the backend secret bundle",
        secret_access.to_value(),
    )?;
    iam::RolePolicyAttachment::new(
        stack,
        "task-execution-secrets",
        execution_role.role_name(),
        secret_policy.arn(),
    )?;

    let lb_group = SecurityGroup::new(
        stack,
        "lb-security-group",
        SecurityGroupArgs {
            description: "HTTPS from the internet".to_string(),
            ingress: vec![SecurityGroupRule::tcp(443).with_cidr("0.0.0.0/0")],
            egress: vec![SecurityGroupRule::all_traffic().with_cidr("0.0.0.0/0")],
        },
    )?;

    // Only the load balancer may reach the container port.
    let service_group = SecurityGroup::new(
        stack,
        "service-security-group",
        SecurityGroupArgs {
            description: "Container port from the load balancer".to_string(),
            ingress: vec![
                SecurityGroupRule::tcp(backend.container_port).with_source_group(lb_group.id()),
            ],
            egress: vec![SecurityGroupRule::all_traffic().with_cidr("0.0.0.0/0")],
        },
    )?;

    let certificate = acm::find_certificate(stack, "api-certificate", &site.domain)?;

    let load_balancer = LoadBalancer::new(
        stack,
        "load-balancer",
        LoadBalancerArgs {
            security_groups: vec![lb_group.id()],
            ..Default::default()
        },
    )?;

    let target_group = TargetGroup::new(
        stack,
        "target-group",
        TargetGroupArgs {
            port: backend.container_port,
            protocol: "HTTP".to_string(),
            target_type: "ip".to_string(),
            health_check: HealthCheckArgs {
                path: HEALTH_CHECK_PATH.to_string(),
                interval_seconds: HEALTH_CHECK_INTERVAL_SECONDS,
                matcher: HEALTH_CHECK_MATCHER.to_string(),
            },
        },
    )?;

    Listener::new(
        stack,
        "https-listener",
        ListenerArgs {
            load_balancer_arn: load_balancer.arn(),
            port: 443,
            protocol: "HTTPS".to_string(),
            ssl_policy: TLS_POLICY.to_string(),
            certificate_arn: arn_of(certificate.output()),
            target_group_arn: target_group.arn(),
        },
    )?;

    let task = TaskDefinition::new(
        stack,
        "task-definition",
        TaskDefinitionArgs {
            family: "api".to_string(),
            cpu: backend.cpu,
            memory: backend.memory,
            execution_role_arn: execution_role.arn(),
            containers: vec![ContainerDefinition {
                name: backend.container_name.clone(),
                image: image_uri.clone(),
                essential: true,
                port_mappings: vec![PortMapping::tcp(backend.container_port)],
                secrets: backend
                    .secrets
                    .keys()
                    .map(|key| ContainerSecret {
                        name: key.clone(),
                        value_from: version.key_reference(key),
                    })
                    .collect(),
            }],
        },
    )?;

    let service = Service::new(
        stack,
        "service",
        ServiceArgs {
            cluster: cluster.arn(),
            task_definition: task.arn(),
            desired_count: 1,
            launch_type: "FARGATE".to_string(),
            network: NetworkArgs {
                assign_public_ip: true,
                security_groups: vec![service_group.id()],
            },
            load_balancers: vec![ServiceLoadBalancer {
                target_group_arn: target_group.arn(),
                container_name: backend.container_name.clone(),
                container_port: backend.container_port,
            }],
        },
    )?;

    let zone = route53::find_zone(stack, "api-zone", &site.domain)?;
    Record::new(
        stack,
        &backend.domain_name(site),
        RecordArgs {
            zone_id: zone.zone_id(),
            name: backend.subdomain(site),
            record_type: "A".to_string(),
            aliases: vec![AliasTarget {
                name: load_balancer.dns_name(),
                zone_id: load_balancer.zone_id(),
                evaluate_target_health: true,
            }],
        },
    )?;

    tracing::debug!(domain = %backend.domain_name(site), "composed backend");

    Ok(BackendOutputs {
        image_uri,
        load_balancer_url: Value::concat([Value::from("https://"), load_balancer.dns_name()]),
        repo_name: repo.repo_name(),
        service_name: service.service_name(),
        cluster_name: cluster.cluster_name(),
        container_name: backend.container_name.as_str().into(),
    })
}
