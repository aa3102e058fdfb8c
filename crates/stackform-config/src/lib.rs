//! Configuration surface for Stackform
//!
//! Settings are read once at startup from an optional `stackform.toml`
//! file overlaid with `STACKFORM_*` environment variables (nested keys
//! separated by `__`, e.g. `STACKFORM_SITE__DOMAIN=example.com`).
//!
//! Required keys are checked before any descriptor is built: a missing
//! `site.domain` or `site.subdomain` fails the whole run with no partial
//! graph.

pub mod error;

pub use error::{ConfigError, Result};

use config::{Config, Environment, File};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

const ENV_PREFIX: &str = "STACKFORM";
const CONFIG_FILE: &str = "stackform";

pub const DEFAULT_SITE_PATH: &str = "./www";
pub const DEFAULT_INDEX_DOCUMENT: &str = "index.html";
pub const DEFAULT_ERROR_DOCUMENT: &str = "error.html";
pub const DEFAULT_CONTAINER_PORT: u16 = 1337;
pub const DEFAULT_CONTAINER_NAME: &str = "dev-backend-container";
pub const DEFAULT_CPU: u32 = 256;
pub const DEFAULT_MEMORY: u32 = 512;
pub const DEFAULT_IMAGE_TAG: &str = "latest";

/// Fully validated program settings.
#[derive(Debug, Clone)]
pub struct Settings {
    pub site: SiteConfig,
    pub backend: BackendConfig,
}

/// Static website settings.
#[derive(Debug, Clone)]
pub struct SiteConfig {
    /// Apex domain (required).
    pub domain: String,

    /// Subdomain the site is served under (required).
    pub subdomain: String,

    /// Local directory synced into the bucket.
    pub path: String,

    /// Default document served at the root.
    pub index_document: String,

    /// Document served for 404 responses.
    pub error_document: String,

    /// Optional deployment-pipeline user granted direct write access to
    /// the bucket.
    pub pipeline_user: Option<String>,
}

impl SiteConfig {
    /// `{subdomain}.{domain}`
    pub fn domain_name(&self) -> String {
        format!("{}.{}", self.subdomain, self.domain)
    }

    /// `https://{subdomain}.{domain}`
    pub fn domain_url(&self) -> String {
        format!("https://{}", self.domain_name())
    }
}

/// API backend settings.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// Port the container listens on. Single source for the task
    /// definition port mapping, the target group, and the security-group
    /// ingress rule.
    pub container_port: u16,

    /// Container name inside the task definition.
    pub container_name: String,

    /// Task CPU units.
    pub cpu: u32,

    /// Task memory (MiB).
    pub memory: u32,

    /// Image tag appended to the repository URL.
    pub image_tag: String,

    /// Secret bundle written once to the managed secret store. Keys become
    /// named references in the container definition; values never appear
    /// in the task definition or image. The loader normalizes keys to
    /// lowercase.
    pub secrets: BTreeMap<String, String>,
}

impl BackendConfig {
    /// The backend subdomain, derived from the site's: `api-{subdomain}`.
    pub fn subdomain(&self, site: &SiteConfig) -> String {
        format!("api-{}", site.subdomain)
    }

    /// `api-{subdomain}.{domain}`
    pub fn domain_name(&self, site: &SiteConfig) -> String {
        format!("{}.{}", self.subdomain(site), site.domain)
    }
}

#[derive(Debug, Default, Deserialize)]
struct RawSettings {
    #[serde(default)]
    site: RawSite,
    #[serde(default)]
    backend: RawBackend,
}

#[derive(Debug, Default, Deserialize)]
struct RawSite {
    domain: Option<String>,
    subdomain: Option<String>,
    path: Option<String>,
    index_document: Option<String>,
    error_document: Option<String>,
    pipeline_user: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawBackend {
    container_port: Option<u16>,
    container_name: Option<String>,
    cpu: Option<u32>,
    memory: Option<u32>,
    image_tag: Option<String>,
    #[serde(default)]
    secrets: BTreeMap<String, String>,
}

impl Settings {
    /// Load from `stackform.toml` (if present) and the environment.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load from an explicit file path overlaid with the environment.
    pub fn load_from(file: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();
        builder = match file {
            Some(path) => builder.add_source(File::from(path)),
            None => builder.add_source(File::with_name(CONFIG_FILE).required(false)),
        };
        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );
        let raw: RawSettings = builder.build()?.try_deserialize()?;
        raw.validate()
    }
}

impl RawSettings {
    fn validate(self) -> Result<Settings> {
        let site = self.site;
        let domain = require(site.domain, "site.domain")?;
        let subdomain = require(site.subdomain, "site.subdomain")?;

        let backend = self.backend;
        let container_port = backend.container_port.unwrap_or(DEFAULT_CONTAINER_PORT);
        if container_port == 0 {
            return Err(ConfigError::InvalidValue {
                key: "backend.container_port",
                message: "port must be non-zero".to_string(),
            });
        }

        Ok(Settings {
            site: SiteConfig {
                domain,
                subdomain,
                path: site.path.unwrap_or_else(|| DEFAULT_SITE_PATH.to_string()),
                index_document: site
                    .index_document
                    .unwrap_or_else(|| DEFAULT_INDEX_DOCUMENT.to_string()),
                error_document: site
                    .error_document
                    .unwrap_or_else(|| DEFAULT_ERROR_DOCUMENT.to_string()),
                pipeline_user: site.pipeline_user.filter(|user| !user.is_empty()),
            },
            backend: BackendConfig {
                container_port,
                container_name: backend
                    .container_name
                    .unwrap_or_else(|| DEFAULT_CONTAINER_NAME.to_string()),
                cpu: backend.cpu.unwrap_or(DEFAULT_CPU),
                memory: backend.memory.unwrap_or(DEFAULT_MEMORY),
                image_tag: backend
                    .image_tag
                    .unwrap_or_else(|| DEFAULT_IMAGE_TAG.to_string()),
                secrets: backend.secrets,
            },
        })
    }
}

fn require(value: Option<String>, key: &'static str) -> Result<String> {
    value
        .filter(|v| !v.is_empty())
        .ok_or(ConfigError::MissingKey(key))
}
