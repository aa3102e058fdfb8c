//! Static-website composition
//!
//! Bucket, access controls, synced content, edge-caching distribution, DNS
//! alias, and the bucket policy granting the distribution read access.

use crate::policy::bucket_policy;
use stackform_aws::cloudfront::{
    CacheBehaviorArgs, CustomErrorResponse, Distribution, DistributionArgs, OriginAccessControl,
    OriginAccessControlArgs, OriginArgs,
};
use stackform_aws::route53::{AliasTarget, Record, RecordArgs};
use stackform_aws::s3::{
    Bucket, BucketArgs, BucketFolder, BucketFolderArgs, BucketOwnershipControls, BucketPolicy,
    BucketPublicAccessBlock, PublicAccessBlockArgs, WebsiteArgs,
};
use stackform_aws::{acm, arn_of, iam, route53};
use stackform_config::SiteConfig;
use stackform_core::{Result, Stack, Value};

/// Constant-TTL cache: min, default, and max are pinned to the same value,
/// so the edge never renegotiates freshness.
const CACHE_TTL_SECONDS: u64 = 600;
const PRICE_CLASS: &str = "PriceClass_100";
const EDGE_METHODS: [&str; 3] = ["GET", "HEAD", "OPTIONS"];

/// Named outputs of the site composition.
#[derive(Debug, Clone)]
pub struct SiteOutputs {
    pub origin_url: Value,
    pub origin_hostname: Value,
    pub cdn_url: Value,
    pub cdn_hostname: Value,
    pub domain_url: Value,
}

pub fn compose(stack: &mut Stack, site: &SiteConfig) -> Result<SiteOutputs> {
    let domain_name = site.domain_name();

    let bucket = Bucket::new(
        stack,
        "bucket",
        BucketArgs {
            bucket: Some(domain_name.clone()),
            website: Some(WebsiteArgs {
                index_document: site.index_document.clone(),
                error_document: site.error_document.clone(),
            }),
        },
    )?;

    let ownership =
        BucketOwnershipControls::new(stack, "ownership-controls", bucket.bucket(), "ObjectWriter")?;
    let access_block = BucketPublicAccessBlock::new(
        stack,
        "public-access-block",
        bucket.bucket(),
        PublicAccessBlockArgs::default(),
    )?;

    // Sync must not start until both access-control descriptors commit.
    BucketFolder::new(
        stack,
        "bucket-folder",
        BucketFolderArgs {
            path: site.path.clone(),
            bucket_name: bucket.bucket(),
            acl: "public-read".to_string(),
        },
        &[&ownership, &access_block],
    )?;

    let certificate = acm::find_certificate(stack, "certificate", &site.domain)?;

    let oac = OriginAccessControl::new(
        stack,
        "oac",
        OriginAccessControlArgs {
            description: "CDN access to the site bucket".to_string(),
            ..Default::default()
        },
    )?;

    let cdn = Distribution::new(
        stack,
        "cdn",
        DistributionArgs {
            enabled: true,
            aliases: vec![domain_name.clone()],
            certificate_arn: arn_of(certificate.output()),
            origins: vec![OriginArgs {
                origin_id: bucket.arn(),
                domain_name: bucket.bucket_domain_name(),
                origin_access_control_id: oac.id(),
            }],
            default_root_object: site.index_document.clone(),
            default_cache_behavior: CacheBehaviorArgs {
                target_origin_id: bucket.arn(),
                viewer_protocol_policy: "redirect-to-https".to_string(),
                allowed_methods: EDGE_METHODS.iter().map(|m| m.to_string()).collect(),
                cached_methods: EDGE_METHODS.iter().map(|m| m.to_string()).collect(),
                ttl_seconds: CACHE_TTL_SECONDS,
                forward_query_string: true,
                forward_cookies: "all".to_string(),
            },
            price_class: PRICE_CLASS.to_string(),
            custom_error_responses: vec![CustomErrorResponse {
                error_code: 404,
                response_code: 404,
                response_page_path: format!("/{}", site.error_document),
            }],
        },
    )?;

    let zone = route53::find_zone(stack, "zone", &site.domain)?;
    Record::new(
        stack,
        &domain_name,
        RecordArgs {
            zone_id: zone.zone_id(),
            name: site.subdomain.clone(),
            record_type: "A".to_string(),
            aliases: vec![AliasTarget {
                name: cdn.domain_name(),
                zone_id: cdn.hosted_zone_id(),
                evaluate_target_health: true,
            }],
        },
    )?;

    let pipeline = match &site.pipeline_user {
        Some(user) => Some(iam::find_user(stack, "pipeline-user", user)?.arn()),
        None => None,
    };
    let document = bucket_policy(&bucket, &cdn, pipeline);
    BucketPolicy::new(stack, "bucket-policy", bucket.id(), document.to_value())?;

    tracing::debug!(domain = %domain_name, "composed site");

    Ok(SiteOutputs {
        origin_url: Value::concat([Value::from("http://"), bucket.website_endpoint()]),
        origin_hostname: bucket.website_endpoint(),
        cdn_url: Value::concat([Value::from("https://"), cdn.domain_name()]),
        cdn_hostname: cdn.domain_name(),
        domain_url: site.domain_url().into(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn test_site() -> SiteConfig {
        SiteConfig {
            domain: "example.com".to_string(),
            subdomain: "dev".to_string(),
            path: "./www".to_string(),
            index_document: "index.html".to_string(),
            error_document: "error.html".to_string(),
            pipeline_user: None,
        }
    }

    #[test]
    fn dev_example_scenario() {
        let mut stack = Stack::new("test");
        let outputs = compose(&mut stack, &test_site()).unwrap();
        stack.validate().unwrap();

        assert_eq!(outputs.domain_url.to_string(), "https://dev.example.com");

        let cdn = stack.get("cdn").unwrap();
        assert_eq!(
            cdn.properties["defaultRootObject"].as_lit(),
            Some(&json!("index.html"))
        );
        let error = cdn.properties["customErrorResponses"].item(0).unwrap();
        assert_eq!(
            error.entry("responsePagePath").unwrap().as_lit(),
            Some(&json!("/error.html"))
        );
    }

    #[test]
    fn cache_ttl_is_constant() {
        let mut stack = Stack::new("test");
        compose(&mut stack, &test_site()).unwrap();

        let cdn = stack.get("cdn").unwrap();
        let behavior = &cdn.properties["defaultCacheBehavior"];
        for key in ["minTtl", "defaultTtl", "maxTtl"] {
            assert_eq!(behavior.entry(key).unwrap().as_lit(), Some(&json!(600)));
        }
        assert_eq!(
            behavior.entry("viewerProtocolPolicy").unwrap().as_lit(),
            Some(&json!("redirect-to-https"))
        );
    }

    #[test]
    fn record_aliases_the_distribution() {
        let mut stack = Stack::new("test");
        compose(&mut stack, &test_site()).unwrap();

        let record = stack.get("dev.example.com").unwrap();
        assert_eq!(record.properties["name"].as_lit(), Some(&json!("dev")));
        let alias = record.properties["aliases"].item(0).unwrap();
        assert_eq!(
            alias.entry("name").unwrap(),
            &Value::Ref {
                resource: "cdn".into(),
                attribute: Some("domainName".to_string()),
            }
        );
        assert_eq!(
            alias.entry("evaluateTargetHealth").unwrap().as_lit(),
            Some(&json!(true))
        );
    }

    #[test]
    fn certificate_arn_flows_into_the_distribution() {
        let mut stack = Stack::new("test");
        compose(&mut stack, &test_site()).unwrap();

        let cdn = stack.get("cdn").unwrap();
        let certificate = cdn.properties["viewerCertificate"]
            .entry("acmCertificateArn")
            .unwrap();
        assert_eq!(certificate.to_string(), "${certificate.arn}");
        // the lookup is a data dependency of the distribution
        assert!(cdn.dependencies().contains(&"certificate".into()));
    }

    #[test]
    fn pipeline_user_enables_the_write_grant() {
        let mut stack = Stack::new("test");
        let mut site = test_site();
        site.pipeline_user = Some("site-deployer".to_string());
        compose(&mut stack, &site).unwrap();
        stack.validate().unwrap();

        let lookup = stack.get("pipeline-user").unwrap();
        assert!(lookup.lookup);

        let policy = stack.get("bucket-policy").unwrap();
        let statements = policy.properties["policy"].entry("Statement").unwrap();
        assert!(statements.item(1).is_some());
        assert!(statements.item(2).is_none());
    }

    #[test]
    fn no_pipeline_user_means_read_only_policy() {
        let mut stack = Stack::new("test");
        compose(&mut stack, &test_site()).unwrap();

        let policy = stack.get("bucket-policy").unwrap();
        let statements = policy.properties["policy"].entry("Statement").unwrap();
        assert!(statements.item(0).is_some());
        assert!(statements.item(1).is_none());
    }
}
