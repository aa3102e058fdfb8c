//! ECR repository descriptors

use stackform_core::{Resource, ResourceId, ResourceIdentity, ResourceRef, Result, Stack, Value};

pub const REPOSITORY_KIND: &str = "aws:ecr:repository";

/// Arguments for [`Repository::new`].
#[derive(Debug, Clone, Default)]
pub struct RepositoryArgs {
    /// Delete the repository even when it still holds images.
    pub force_delete: bool,

    /// Keep at most this many images; older ones are expired by a
    /// lifecycle policy.
    pub max_images: Option<u32>,
}

/// Handle to a container registry descriptor.
#[derive(Debug, Clone)]
pub struct Repository {
    res: ResourceRef,
}

impl Repository {
    pub fn new(stack: &mut Stack, name: &str, args: RepositoryArgs) -> Result<Self> {
        let mut resource =
            Resource::new(REPOSITORY_KIND, name).with_property("forceDelete", args.force_delete);
        if let Some(max) = args.max_images {
            resource = resource.with_property(
                "lifecyclePolicy",
                Value::map([(
                    "rules",
                    Value::list([Value::map([
                        ("description", Value::from(format!("Max {max} image(s)"))),
                        ("maximumNumberOfImages", max.into()),
                        ("tagStatus", "any".into()),
                    ])]),
                )]),
            );
        }
        Ok(Self {
            res: stack.add(resource)?,
        })
    }

    pub fn repo_name(&self) -> Value {
        self.res.attr("name")
    }

    pub fn repository_url(&self) -> Value {
        self.res.attr("repositoryUrl")
    }
}

impl ResourceIdentity for Repository {
    fn resource_id(&self) -> &ResourceId {
        self.res.resource_id()
    }
}
