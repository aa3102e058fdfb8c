//! Configuration error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required setting: {0}")]
    MissingKey(&'static str),

    #[error("invalid setting {key}: {message}")]
    InvalidValue { key: &'static str, message: String },

    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
