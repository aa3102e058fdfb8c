//! The engine handoff document
//!
//! A rendered manifest is the program's only artifact: a finite, acyclic
//! desired-state graph the reconciliation engine diffs against previously
//! recorded state. Diffing, ordering, and provider calls are entirely the
//! engine's job; re-running the composition and handing over a fresh
//! manifest is the recovery path for any provider-side failure.

use crate::error::Result;
use crate::value::{ResourceId, Value};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Manifest format version.
pub const MANIFEST_VERSION: u32 = 1;

/// The complete desired-state graph for one stack.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    /// Format version.
    pub format_version: u32,

    /// Stack name.
    pub stack: String,

    /// When this manifest was rendered.
    pub generated_at: DateTime<Utc>,

    /// Descriptors in registration order.
    pub resources: Vec<ResourceManifest>,

    /// Exported outputs, resolvable once the graph is reconciled.
    pub outputs: BTreeMap<String, Value>,
}

/// One descriptor as the engine sees it: desired properties plus the full
/// predecessor set (explicit edges and data references combined).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceManifest {
    pub kind: String,
    pub name: ResourceId,

    #[serde(default)]
    pub properties: BTreeMap<String, Value>,

    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub depends_on: BTreeSet<ResourceId>,

    #[serde(default, skip_serializing_if = "is_false")]
    pub lookup: bool,
}

fn is_false(flag: &bool) -> bool {
    !flag
}

impl Manifest {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn summary(&self) -> ManifestSummary {
        let lookups = self.resources.iter().filter(|r| r.lookup).count();
        ManifestSummary {
            resources: self.resources.len() - lookups,
            lookups,
            outputs: self.outputs.len(),
        }
    }
}

/// Counts for user-facing summaries.
#[derive(Debug, Clone, Copy)]
pub struct ManifestSummary {
    pub resources: usize,
    pub lookups: usize,
    pub outputs: usize,
}

impl fmt::Display for ManifestSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} resources, {} lookups, {} outputs",
            self.resources, self.lookups, self.outputs
        )
    }
}
