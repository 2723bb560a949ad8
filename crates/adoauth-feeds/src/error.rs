//! Error types for feed discovery and credential persistence

use thiserror::Error;

#[derive(Error, Debug)]
pub enum FeedsError {
    /// An existing config file is present but cannot be understood, so
    /// merging into it would risk destroying user configuration.
    #[error("Cannot merge into existing config {path}")]
    ExistingConfig {
        path: String,
        #[source]
        source: adoauth_core::CoreError,
    },

    #[error("Token acquisition failed: {message}")]
    TokenAcquisition { message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl FeedsError {
    pub fn existing_config(path: impl std::fmt::Display, source: adoauth_core::CoreError) -> Self {
        FeedsError::ExistingConfig {
            path: path.to_string(),
            source,
        }
    }

    pub fn token(message: impl Into<String>) -> Self {
        FeedsError::TokenAcquisition {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, FeedsError>;
