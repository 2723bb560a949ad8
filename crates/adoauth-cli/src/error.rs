//! CLI error types with exit code handling
//!
//! This module provides a unified error type for CLI operations that
//! maps errors to appropriate exit codes.

use adoauth_feeds::FeedsError;
use miette::Diagnostic;
use thiserror::Error;

use crate::exit_codes;

/// CLI-specific error type that includes exit code information
#[derive(Error, Debug, Diagnostic)]
pub enum CliError {
    /// Token acquisition failed
    #[error("{message}")]
    #[diagnostic(code(adoauth::cli::token))]
    Token {
        message: String,
        #[help]
        help: Option<String>,
    },

    /// An existing config file could not be safely merged into
    #[error("{message}")]
    #[diagnostic(code(adoauth::cli::config))]
    Config { message: String },

    /// IO error (file not found, permissions, etc.)
    #[error("IO error: {message}")]
    #[diagnostic(code(adoauth::cli::io))]
    Io { message: String },

    /// Internal error (unexpected failure)
    #[error("Internal error: {message}")]
    #[diagnostic(code(adoauth::cli::internal))]
    Internal { message: String },
}

impl CliError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Token { .. } => exit_codes::TOKEN_ERROR,
            CliError::Config { .. } => exit_codes::CONFIG_ERROR,
            CliError::Io { .. } => exit_codes::IO_ERROR,
            CliError::Internal { .. } => exit_codes::ERROR,
        }
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

impl From<FeedsError> for CliError {
    fn from(err: FeedsError) -> Self {
        match &err {
            FeedsError::TokenAcquisition { .. } => CliError::Token {
                message: err.to_string(),
                help: Some("run `az login` and try again".to_string()),
            },
            FeedsError::ExistingConfig { source, .. } => CliError::Config {
                message: format!("{err}: {source}"),
            },
            FeedsError::Io(e) => CliError::Io {
                message: e.to_string(),
            },
            FeedsError::Json(e) => CliError::Internal {
                message: e.to_string(),
            },
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        CliError::Io {
            message: err.to_string(),
        }
    }
}

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;
