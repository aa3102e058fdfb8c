//! Composition error types

use crate::value::ResourceId;
use thiserror::Error;

/// Errors raised while building or validating a stack
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("duplicate resource name: {0}")]
    DuplicateResource(ResourceId),

    #[error("resource {resource} depends on unknown resource {dependency}")]
    UnknownDependency {
        resource: ResourceId,
        dependency: ResourceId,
    },

    #[error("output {output} references unknown resource {dependency}")]
    UnknownOutputReference {
        output: String,
        dependency: ResourceId,
    },

    #[error("circular dependency detected: {0}")]
    CircularDependency(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CoreError>;
