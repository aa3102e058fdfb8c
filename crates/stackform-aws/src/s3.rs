//! S3 descriptors: bucket, access controls, content sync, bucket policy

use stackform_core::{Resource, ResourceId, ResourceIdentity, ResourceRef, Result, Stack, Value};

pub const BUCKET_KIND: &str = "aws:s3:bucket";
pub const OWNERSHIP_CONTROLS_KIND: &str = "aws:s3:bucket-ownership-controls";
pub const PUBLIC_ACCESS_BLOCK_KIND: &str = "aws:s3:bucket-public-access-block";
pub const BUCKET_FOLDER_KIND: &str = "aws:s3:bucket-folder";
pub const BUCKET_POLICY_KIND: &str = "aws:s3:bucket-policy";

/// Arguments for [`Bucket::new`].
#[derive(Debug, Clone, Default)]
pub struct BucketArgs {
    /// Physical bucket name; defaults to the logical name.
    pub bucket: Option<String>,

    /// Serve the bucket as a static website.
    pub website: Option<WebsiteArgs>,
}

#[derive(Debug, Clone, Default)]
pub struct WebsiteArgs {
    pub index_document: String,
    pub error_document: String,
}

/// Handle to a registered bucket descriptor.
#[derive(Debug, Clone)]
pub struct Bucket {
    res: ResourceRef,
}

impl Bucket {
    pub fn new(stack: &mut Stack, name: &str, args: BucketArgs) -> Result<Self> {
        let mut resource = Resource::new(BUCKET_KIND, name)
            .with_property("bucket", args.bucket.unwrap_or_else(|| name.to_string()));
        if let Some(website) = args.website {
            resource = resource.with_property(
                "website",
                Value::map([
                    ("indexDocument", Value::from(website.index_document)),
                    ("errorDocument", Value::from(website.error_document)),
                ]),
            );
        }
        Ok(Self {
            res: stack.add(resource)?,
        })
    }

    pub fn arn(&self) -> Value {
        self.res.attr("arn")
    }

    pub fn id(&self) -> Value {
        self.res.attr("id")
    }

    pub fn bucket(&self) -> Value {
        self.res.attr("bucket")
    }

    pub fn bucket_domain_name(&self) -> Value {
        self.res.attr("bucketDomainName")
    }

    pub fn website_endpoint(&self) -> Value {
        self.res.attr("websiteEndpoint")
    }
}

impl ResourceIdentity for Bucket {
    fn resource_id(&self) -> &ResourceId {
        self.res.resource_id()
    }
}

/// Ownership-control descriptor for a bucket.
#[derive(Debug, Clone)]
pub struct BucketOwnershipControls {
    res: ResourceRef,
}

impl BucketOwnershipControls {
    pub fn new(
        stack: &mut Stack,
        name: &str,
        bucket: Value,
        object_ownership: &str,
    ) -> Result<Self> {
        let resource = Resource::new(OWNERSHIP_CONTROLS_KIND, name)
            .with_property("bucket", bucket)
            .with_property(
                "rule",
                Value::map([("objectOwnership", Value::from(object_ownership))]),
            );
        Ok(Self {
            res: stack.add(resource)?,
        })
    }
}

impl ResourceIdentity for BucketOwnershipControls {
    fn resource_id(&self) -> &ResourceId {
        self.res.resource_id()
    }
}

/// Arguments for [`BucketPublicAccessBlock::new`]. All four blocks default
/// to on: direct public access is denied at the bucket level and reads go
/// through the distribution.
#[derive(Debug, Clone)]
pub struct PublicAccessBlockArgs {
    pub block_public_acls: bool,
    pub block_public_policy: bool,
    pub ignore_public_acls: bool,
    pub restrict_public_buckets: bool,
}

impl Default for PublicAccessBlockArgs {
    fn default() -> Self {
        Self {
            block_public_acls: true,
            block_public_policy: true,
            ignore_public_acls: true,
            restrict_public_buckets: true,
        }
    }
}

/// Public-access-block descriptor for a bucket.
#[derive(Debug, Clone)]
pub struct BucketPublicAccessBlock {
    res: ResourceRef,
}

impl BucketPublicAccessBlock {
    pub fn new(
        stack: &mut Stack,
        name: &str,
        bucket: Value,
        args: PublicAccessBlockArgs,
    ) -> Result<Self> {
        let resource = Resource::new(PUBLIC_ACCESS_BLOCK_KIND, name)
            .with_property("bucket", bucket)
            .with_property("blockPublicAcls", args.block_public_acls)
            .with_property("blockPublicPolicy", args.block_public_policy)
            .with_property("ignorePublicAcls", args.ignore_public_acls)
            .with_property("restrictPublicBuckets", args.restrict_public_buckets);
        Ok(Self {
            res: stack.add(resource)?,
        })
    }
}

impl ResourceIdentity for BucketPublicAccessBlock {
    fn resource_id(&self) -> &ResourceId {
        self.res.resource_id()
    }
}

/// Arguments for [`BucketFolder::new`].
#[derive(Debug, Clone)]
pub struct BucketFolderArgs {
    /// Local directory synced into the bucket.
    pub path: String,
    pub bucket_name: Value,
    pub acl: String,
}

/// Content-sync descriptor: mirrors a local directory into the bucket.
///
/// Syncing must wait for the access-control descriptors to commit even
/// though no data dependency exists, so callers pass them as explicit
/// predecessors.
#[derive(Debug, Clone)]
pub struct BucketFolder {
    res: ResourceRef,
}

impl BucketFolder {
    pub fn new(
        stack: &mut Stack,
        name: &str,
        args: BucketFolderArgs,
        after: &[&dyn ResourceIdentity],
    ) -> Result<Self> {
        let mut resource = Resource::new(BUCKET_FOLDER_KIND, name)
            .with_property("path", args.path)
            .with_property("bucketName", args.bucket_name)
            .with_property("acl", args.acl);
        for dep in after {
            resource = resource.with_dependency(*dep);
        }
        Ok(Self {
            res: stack.add(resource)?,
        })
    }
}

impl ResourceIdentity for BucketFolder {
    fn resource_id(&self) -> &ResourceId {
        self.res.resource_id()
    }
}

/// Attaches a rendered policy document to a bucket.
#[derive(Debug, Clone)]
pub struct BucketPolicy {
    res: ResourceRef,
}

impl BucketPolicy {
    pub fn new(stack: &mut Stack, name: &str, bucket: Value, policy: Value) -> Result<Self> {
        let resource = Resource::new(BUCKET_POLICY_KIND, name)
            .with_property("bucket", bucket)
            .with_property("policy", policy);
        Ok(Self {
            res: stack.add(resource)?,
        })
    }
}

impl ResourceIdentity for BucketPolicy {
    fn resource_id(&self) -> &ResourceId {
        self.res.resource_id()
    }
}
