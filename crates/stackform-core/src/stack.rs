//! Program root: the desired-state graph under construction

use crate::error::{CoreError, Result};
use crate::manifest::{MANIFEST_VERSION, Manifest, ResourceManifest};
use crate::resource::{Resource, ResourceRef};
use crate::value::{ResourceId, Value};
use chrono::Utc;
use std::collections::{BTreeMap, BTreeSet};

/// The composition root.
///
/// Descriptors register here bottom-up; the completed graph is validated
/// and rendered once per run, then handed to the reconciliation engine.
/// Registration order is preserved in the rendered manifest for
/// auditability.
#[derive(Debug, Clone)]
pub struct Stack {
    name: String,
    resources: Vec<Resource>,
    names: BTreeSet<ResourceId>,
    outputs: BTreeMap<String, Value>,
}

impl Stack {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            resources: Vec::new(),
            names: BTreeSet::new(),
            outputs: BTreeMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Register a descriptor. Fails on a duplicate logical name.
    pub fn add(&mut self, resource: Resource) -> Result<ResourceRef> {
        if !self.names.insert(resource.name.clone()) {
            return Err(CoreError::DuplicateResource(resource.name));
        }
        tracing::debug!(kind = %resource.kind, name = %resource.name, "registered descriptor");
        let handle = ResourceRef::new(resource.name.clone());
        self.resources.push(resource);
        Ok(handle)
    }

    /// Export a named output of the program.
    pub fn export(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.outputs.insert(name.into(), value.into());
    }

    pub fn resources(&self) -> &[Resource] {
        &self.resources
    }

    pub fn get(&self, name: &str) -> Option<&Resource> {
        self.resources.iter().find(|r| r.name.as_str() == name)
    }

    pub fn outputs(&self) -> &BTreeMap<String, Value> {
        &self.outputs
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    /// Check the graph: every dependency edge (explicit or implied by a
    /// data reference) targets a registered descriptor, and the graph is
    /// acyclic.
    pub fn validate(&self) -> Result<()> {
        let mut edges: BTreeMap<ResourceId, BTreeSet<ResourceId>> = BTreeMap::new();
        for resource in &self.resources {
            let deps = resource.dependencies();
            for dep in &deps {
                if !self.names.contains(dep) {
                    return Err(CoreError::UnknownDependency {
                        resource: resource.name.clone(),
                        dependency: dep.clone(),
                    });
                }
            }
            edges.insert(resource.name.clone(), deps);
        }
        for (name, value) in &self.outputs {
            for dep in value.dependencies() {
                if !self.names.contains(&dep) {
                    return Err(CoreError::UnknownOutputReference {
                        output: name.clone(),
                        dependency: dep,
                    });
                }
            }
        }
        check_acyclic(&edges)
    }

    /// Render the engine handoff document. Each descriptor carries its full
    /// predecessor set so the engine can order operations without
    /// re-deriving data references.
    pub fn render(&self) -> Manifest {
        let resources: Vec<ResourceManifest> = self
            .resources
            .iter()
            .map(|resource| ResourceManifest {
                kind: resource.kind.clone(),
                name: resource.name.clone(),
                properties: resource.properties.clone(),
                depends_on: resource.dependencies(),
                lookup: resource.lookup,
            })
            .collect();
        tracing::debug!(
            resources = resources.len(),
            outputs = self.outputs.len(),
            "rendered manifest"
        );
        Manifest {
            format_version: MANIFEST_VERSION,
            stack: self.name.clone(),
            generated_at: Utc::now(),
            resources,
            outputs: self.outputs.clone(),
        }
    }
}

#[derive(Clone, Copy, PartialEq)]
enum Mark {
    InProgress,
    Done,
}

fn check_acyclic(edges: &BTreeMap<ResourceId, BTreeSet<ResourceId>>) -> Result<()> {
    fn visit(
        node: &ResourceId,
        edges: &BTreeMap<ResourceId, BTreeSet<ResourceId>>,
        marks: &mut BTreeMap<ResourceId, Mark>,
        path: &mut Vec<ResourceId>,
    ) -> Result<()> {
        match marks.get(node) {
            Some(Mark::Done) => return Ok(()),
            Some(Mark::InProgress) => {
                let start = path.iter().position(|n| n == node).unwrap_or(0);
                let mut cycle: Vec<&str> = path[start..].iter().map(|n| n.as_str()).collect();
                cycle.push(node.as_str());
                return Err(CoreError::CircularDependency(cycle.join(" -> ")));
            }
            None => {}
        }
        marks.insert(node.clone(), Mark::InProgress);
        path.push(node.clone());
        if let Some(deps) = edges.get(node) {
            for dep in deps {
                visit(dep, edges, marks, path)?;
            }
        }
        path.pop();
        marks.insert(node.clone(), Mark::Done);
        Ok(())
    }

    let mut marks = BTreeMap::new();
    let mut path = Vec::new();
    for node in edges.keys() {
        visit(node, edges, &mut marks, &mut path)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_names_are_rejected() {
        let mut stack = Stack::new("test");
        stack.add(Resource::new("aws:s3:bucket", "bucket")).unwrap();
        let err = stack
            .add(Resource::new("aws:s3:bucket", "bucket"))
            .unwrap_err();
        assert!(matches!(err, CoreError::DuplicateResource(_)));
    }

    #[test]
    fn unknown_dependency_fails_validation() {
        let mut stack = Stack::new("test");
        let bucket = ResourceRef::new("missing".into());
        stack
            .add(Resource::new("aws:s3:bucket-policy", "policy").with_dependency(&bucket))
            .unwrap();
        let err = stack.validate().unwrap_err();
        assert!(matches!(err, CoreError::UnknownDependency { .. }));
    }

    #[test]
    fn unknown_output_reference_fails_validation() {
        let mut stack = Stack::new("test");
        stack.export(
            "cdnURL",
            Value::Ref {
                resource: "cdn".into(),
                attribute: Some("domainName".to_string()),
            },
        );
        let err = stack.validate().unwrap_err();
        assert!(matches!(err, CoreError::UnknownOutputReference { .. }));
    }

    #[test]
    fn cycles_are_detected() {
        let mut stack = Stack::new("test");
        let a = ResourceRef::new("a".into());
        let b = ResourceRef::new("b".into());
        stack
            .add(Resource::new("aws:test:thing", "a").with_dependency(&b))
            .unwrap();
        stack
            .add(Resource::new("aws:test:thing", "b").with_dependency(&a))
            .unwrap();
        let err = stack.validate().unwrap_err();
        match err {
            CoreError::CircularDependency(cycle) => {
                assert!(cycle.contains("a") && cycle.contains("b"), "cycle: {cycle}");
            }
            other => panic!("expected circular dependency, got {other}"),
        }
    }

    #[test]
    fn implicit_data_dependencies_validate_and_render() {
        let mut stack = Stack::new("test");
        let bucket = stack.add(Resource::new("aws:s3:bucket", "bucket")).unwrap();
        stack
            .add(
                Resource::new("aws:s3:bucket-policy", "policy")
                    .with_property("bucket", bucket.attr("id")),
            )
            .unwrap();
        stack.validate().unwrap();

        let manifest = stack.render();
        let policy = &manifest.resources[1];
        assert!(policy.depends_on.contains(&"bucket".into()));
    }

    #[test]
    fn render_preserves_registration_order() {
        let mut stack = Stack::new("test");
        for name in ["bucket", "ownership-controls", "public-access-block"] {
            stack.add(Resource::new("aws:s3:thing", name)).unwrap();
        }
        let manifest = stack.render();
        let names: Vec<&str> = manifest
            .resources
            .iter()
            .map(|r| r.name.as_str())
            .collect();
        assert_eq!(
            names,
            vec!["bucket", "ownership-controls", "public-access-block"]
        );
    }
}
