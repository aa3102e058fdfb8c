//! Program root: assembles the full desired-state graph

use crate::{backend, site};
use stackform_config::Settings;
use stackform_core::{Result, Stack};

/// Build and validate the complete stack: site and backend compositions
/// plus every exported output.
pub fn build(settings: &Settings) -> Result<Stack> {
    let mut stack = Stack::new(settings.site.domain_name());

    let site = site::compose(&mut stack, &settings.site)?;
    stack.export("originURL", site.origin_url);
    stack.export("originHostname", site.origin_hostname);
    stack.export("cdnURL", site.cdn_url);
    stack.export("cdnHostname", site.cdn_hostname);
    stack.export("domainURL", site.domain_url);

    let backend = backend::compose(&mut stack, &settings.site, &settings.backend)?;
    stack.export("imageUri", backend.image_uri);
    stack.export("loadBalancerUrl", backend.load_balancer_url);
    stack.export("repoName", backend.repo_name);
    stack.export("serviceName", backend.service_name);
    stack.export("clusterName", backend.cluster_name);
    stack.export("containerName", backend.container_name);

    stack.validate()?;
    Ok(stack)
}

#[cfg(test)]
mod tests {
    use super::*;
    use stackform_config::{BackendConfig, SiteConfig};
    use std::collections::BTreeMap;

    fn test_settings() -> Settings {
        Settings {
            site: SiteConfig {
                domain: "example.com".to_string(),
                subdomain: "dev".to_string(),
                path: "./www".to_string(),
                index_document: "index.html".to_string(),
                error_document: "error.html".to_string(),
                pipeline_user: None,
            },
            backend: BackendConfig {
                container_port: 1337,
                container_name: "dev-backend-container".to_string(),
                cpu: 256,
                memory: 512,
                image_tag: "latest".to_string(),
                secrets: BTreeMap::new(),
            },
        }
    }

    #[test]
    fn full_program_exports_all_outputs() {
        let stack = build(&test_settings()).unwrap();
        let outputs = stack.outputs();
        for name in [
            "originURL",
            "originHostname",
            "cdnURL",
            "cdnHostname",
            "domainURL",
            "imageUri",
            "loadBalancerUrl",
            "repoName",
            "serviceName",
            "clusterName",
            "containerName",
        ] {
            assert!(outputs.contains_key(name), "missing output {name}");
        }
        assert_eq!(outputs.len(), 11);
    }

    #[test]
    fn full_program_graph_is_valid() {
        // build() already validates; exercise it explicitly on the result
        let stack = build(&test_settings()).unwrap();
        stack.validate().unwrap();
        assert_eq!(stack.name(), "dev.example.com");
        assert!(stack.len() > 20, "expected the full descriptor set");
    }

    #[test]
    fn stack_outputs_resolve_to_urls() {
        let stack = build(&test_settings()).unwrap();
        assert_eq!(
            stack.outputs()["domainURL"].to_string(),
            "https://dev.example.com"
        );
        assert_eq!(
            stack.outputs()["cdnURL"].to_string(),
            "https://${cdn.domainName}"
        );
    }
}
