//! Bucket access policy composition

use stackform_aws::cloudfront::Distribution;
use stackform_aws::iam::{Condition, PolicyDocument, PolicyStatement, Principal};
use stackform_aws::s3::Bucket;
use stackform_core::Value;

const CDN_PRINCIPAL: &str = "cloudfront.amazonaws.com";

/// Build the bucket policy document.
///
/// The CDN statement is always present and is scoped to the requesting
/// distribution's ARN, so no other distribution the provider hosts can use
/// its service principal to read this bucket. The pipeline statement
/// appears only when a pipeline identity is supplied; it lets an external
/// deployment pipeline update site content directly, bypassing the
/// content-sync descriptor.
pub fn bucket_policy(
    bucket: &Bucket,
    distribution: &Distribution,
    pipeline: Option<Value>,
) -> PolicyDocument {
    let objects = Value::concat([bucket.arn(), "/*".into()]);

    let mut document = PolicyDocument::new().with_statement(
        PolicyStatement::allow()
            .with_principal(Principal::service(CDN_PRINCIPAL))
            .with_actions(["s3:GetObject", "s3:ListBucket"])
            .with_resource(bucket.arn())
            .with_resource(objects.clone())
            .with_condition(Condition::string_equals("AWS:SourceArn", distribution.arn())),
    );

    if let Some(identity) = pipeline {
        document = document.with_statement(
            PolicyStatement::allow()
                .with_principal(Principal::aws(identity))
                .with_actions(["s3:PutObject", "s3:ListBucket", "s3:DeleteObject"])
                .with_resource(bucket.arn())
                .with_resource(objects),
        );
    }

    document
}
