//! IAM policy documents and identity descriptors

use stackform_core::{Resource, ResourceId, ResourceIdentity, ResourceRef, Result, Stack, Value};
use std::collections::BTreeMap;

pub const POLICY_KIND: &str = "aws:iam:policy";
pub const ROLE_KIND: &str = "aws:iam:role";
pub const ROLE_POLICY_ATTACHMENT_KIND: &str = "aws:iam:role-policy-attachment";
pub const USER_KIND: &str = "aws:iam:user";

const POLICY_VERSION: &str = "2012-10-17";

/// Statement effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    Allow,
    Deny,
}

impl Effect {
    fn as_str(self) -> &'static str {
        match self {
            Effect::Allow => "Allow",
            Effect::Deny => "Deny",
        }
    }
}

/// A statement principal.
#[derive(Debug, Clone)]
pub struct Principal {
    pub principal_type: String,
    pub identifiers: Vec<Value>,
}

impl Principal {
    /// A provider service principal.
    pub fn service(identifier: impl Into<Value>) -> Self {
        Self {
            principal_type: "Service".to_string(),
            identifiers: vec![identifier.into()],
        }
    }

    /// An account identity (user or role ARN).
    pub fn aws(identifier: impl Into<Value>) -> Self {
        Self {
            principal_type: "AWS".to_string(),
            identifiers: vec![identifier.into()],
        }
    }
}

/// A statement condition.
#[derive(Debug, Clone)]
pub struct Condition {
    pub test: String,
    pub variable: String,
    pub values: Vec<Value>,
}

impl Condition {
    pub fn string_equals(variable: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            test: "StringEquals".to_string(),
            variable: variable.into(),
            values: vec![value.into()],
        }
    }
}

/// One policy statement.
#[derive(Debug, Clone)]
pub struct PolicyStatement {
    pub effect: Effect,
    pub principals: Vec<Principal>,
    pub actions: Vec<String>,
    pub resources: Vec<Value>,
    pub conditions: Vec<Condition>,
}

impl PolicyStatement {
    pub fn allow() -> Self {
        Self {
            effect: Effect::Allow,
            principals: Vec::new(),
            actions: Vec::new(),
            resources: Vec::new(),
            conditions: Vec::new(),
        }
    }

    pub fn with_principal(mut self, principal: Principal) -> Self {
        self.principals.push(principal);
        self
    }

    pub fn with_action(mut self, action: impl Into<String>) -> Self {
        self.actions.push(action.into());
        self
    }

    pub fn with_actions<S: Into<String>>(mut self, actions: impl IntoIterator<Item = S>) -> Self {
        self.actions.extend(actions.into_iter().map(Into::into));
        self
    }

    pub fn with_resource(mut self, resource: impl Into<Value>) -> Self {
        self.resources.push(resource.into());
        self
    }

    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    /// Render to the provider's statement shape.
    pub fn to_value(&self) -> Value {
        let mut entries: Vec<(&str, Value)> = vec![("Effect", self.effect.as_str().into())];

        if !self.principals.is_empty() {
            let mut grouped: BTreeMap<String, Vec<Value>> = BTreeMap::new();
            for principal in &self.principals {
                grouped
                    .entry(principal.principal_type.clone())
                    .or_default()
                    .extend(principal.identifiers.iter().cloned());
            }
            entries.push((
                "Principal",
                Value::Map(
                    grouped
                        .into_iter()
                        .map(|(principal_type, identifiers)| {
                            (principal_type, Value::List(identifiers))
                        })
                        .collect(),
                ),
            ));
        }

        entries.push((
            "Action",
            Value::list(self.actions.iter().cloned().map(Value::from)),
        ));

        if !self.resources.is_empty() {
            entries.push(("Resource", Value::List(self.resources.clone())));
        }

        if !self.conditions.is_empty() {
            let mut tests: BTreeMap<String, BTreeMap<String, Value>> = BTreeMap::new();
            for condition in &self.conditions {
                tests
                    .entry(condition.test.clone())
                    .or_default()
                    .insert(condition.variable.clone(), Value::List(condition.values.clone()));
            }
            entries.push((
                "Condition",
                Value::Map(
                    tests
                        .into_iter()
                        .map(|(test, variables)| (test, Value::Map(variables)))
                        .collect(),
                ),
            ));
        }

        Value::map(entries)
    }
}

/// Ordered list of statements, rendered to the provider's policy JSON as a
/// deferred value, since referenced ARNs may still be pending. Statement
/// order does not change authorization semantics but is preserved for
/// auditability.
#[derive(Debug, Clone, Default)]
pub struct PolicyDocument {
    statements: Vec<PolicyStatement>,
}

impl PolicyDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_statement(mut self, statement: PolicyStatement) -> Self {
        self.statements.push(statement);
        self
    }

    pub fn statements(&self) -> &[PolicyStatement] {
        &self.statements
    }

    pub fn to_value(&self) -> Value {
        Value::map([
            ("Version", Value::from(POLICY_VERSION)),
            (
                "Statement",
                Value::list(self.statements.iter().map(PolicyStatement::to_value)),
            ),
        ])
    }
}

/// Assume-role document for a provider service.
pub fn service_assume_role_policy(service: &str) -> PolicyDocument {
    PolicyDocument::new().with_statement(
        PolicyStatement::allow()
            .with_principal(Principal::service(service))
            .with_action("sts:AssumeRole"),
    )
}

/// Handle to a standalone policy descriptor.
#[derive(Debug, Clone)]
pub struct Policy {
    res: ResourceRef,
}

impl Policy {
    pub fn new(stack: &mut Stack, name: &str, description: &str, policy: Value) -> Result<Self> {
        let resource = Resource::new(POLICY_KIND, name)
            .with_property("description", description)
            .with_property("policy", policy);
        Ok(Self {
            res: stack.add(resource)?,
        })
    }

    pub fn arn(&self) -> Value {
        self.res.attr("arn")
    }
}

impl ResourceIdentity for Policy {
    fn resource_id(&self) -> &ResourceId {
        self.res.resource_id()
    }
}

/// Handle to a role descriptor.
#[derive(Debug, Clone)]
pub struct Role {
    res: ResourceRef,
}

impl Role {
    pub fn new(stack: &mut Stack, name: &str, assume_role_policy: Value) -> Result<Self> {
        let resource =
            Resource::new(ROLE_KIND, name).with_property("assumeRolePolicy", assume_role_policy);
        Ok(Self {
            res: stack.add(resource)?,
        })
    }

    pub fn arn(&self) -> Value {
        self.res.attr("arn")
    }

    pub fn role_name(&self) -> Value {
        self.res.attr("name")
    }
}

impl ResourceIdentity for Role {
    fn resource_id(&self) -> &ResourceId {
        self.res.resource_id()
    }
}

/// Attaches a policy to a role.
#[derive(Debug, Clone)]
pub struct RolePolicyAttachment {
    res: ResourceRef,
}

impl RolePolicyAttachment {
    pub fn new(stack: &mut Stack, name: &str, role: Value, policy_arn: Value) -> Result<Self> {
        let resource = Resource::new(ROLE_POLICY_ATTACHMENT_KIND, name)
            .with_property("role", role)
            .with_property("policyArn", policy_arn);
        Ok(Self {
            res: stack.add(resource)?,
        })
    }
}

impl ResourceIdentity for RolePolicyAttachment {
    fn resource_id(&self) -> &ResourceId {
        self.res.resource_id()
    }
}

/// Handle to a user lookup (pipeline identity).
#[derive(Debug, Clone)]
pub struct User {
    res: ResourceRef,
}

/// Look up an existing user by name.
pub fn find_user(stack: &mut Stack, name: &str, user_name: &str) -> Result<User> {
    let resource = Resource::lookup(USER_KIND, name).with_property("userName", user_name);
    Ok(User {
        res: stack.add(resource)?,
    })
}

impl User {
    pub fn arn(&self) -> Value {
        self.res.attr("arn")
    }
}

impl ResourceIdentity for User {
    fn resource_id(&self) -> &ResourceId {
        self.res.resource_id()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::BTreeMap as Map;

    fn resolve(value: &Value, attrs: &Map<ResourceId, serde_json::Value>) -> serde_json::Value {
        value.resolve(attrs).expect("document should resolve")
    }

    #[test]
    fn statement_renders_provider_shape() {
        let statement = PolicyStatement::allow()
            .with_principal(Principal::service("cloudfront.amazonaws.com"))
            .with_actions(["s3:GetObject", "s3:ListBucket"])
            .with_resource("arn:aws:s3:::site")
            .with_condition(Condition::string_equals("AWS:SourceArn", "arn:aws:cloudfront::123:distribution/D1"));

        let attrs: Map<ResourceId, serde_json::Value> = Map::new();
        let rendered = resolve(&statement.to_value(), &attrs);
        assert_eq!(
            rendered,
            json!({
                "Effect": "Allow",
                "Principal": { "Service": ["cloudfront.amazonaws.com"] },
                "Action": ["s3:GetObject", "s3:ListBucket"],
                "Resource": ["arn:aws:s3:::site"],
                "Condition": {
                    "StringEquals": {
                        "AWS:SourceArn": ["arn:aws:cloudfront::123:distribution/D1"]
                    }
                }
            })
        );
    }

    #[test]
    fn assume_role_statement_has_no_resource_section() {
        let document = service_assume_role_policy("ecs-tasks.amazonaws.com");
        let attrs: Map<ResourceId, serde_json::Value> = Map::new();
        let rendered = resolve(&document.to_value(), &attrs);
        assert_eq!(rendered["Version"], "2012-10-17");
        let statement = &rendered["Statement"][0];
        assert_eq!(statement["Action"], json!(["sts:AssumeRole"]));
        assert!(statement.get("Resource").is_none());
    }

    #[test]
    fn document_defers_pending_arns() {
        let pending = Value::Ref {
            resource: "bucket".into(),
            attribute: Some("arn".to_string()),
        };
        let document = PolicyDocument::new().with_statement(
            PolicyStatement::allow()
                .with_action("s3:GetObject")
                .with_resource(pending),
        );
        let value = document.to_value();

        let empty: Map<ResourceId, serde_json::Value> = Map::new();
        assert_eq!(value.resolve(&empty), None);

        let mut attrs: Map<ResourceId, serde_json::Value> = Map::new();
        attrs.insert("bucket".into(), json!({ "arn": "arn:aws:s3:::site" }));
        let rendered = resolve(&value, &attrs);
        assert_eq!(rendered["Statement"][0]["Resource"], json!(["arn:aws:s3:::site"]));
    }
}
