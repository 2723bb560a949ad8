//! Core error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("XML parse error: {message}")]
    XmlParse { message: String },

    #[error("Invalid document structure: {message}")]
    InvalidDocument { message: String },

    #[error("Malformed npmrc line {line}: {content}")]
    MalformedLine { line: usize, content: String },
}

impl CoreError {
    /// Wrap any XML-level failure (syntax, encoding, attributes).
    pub fn xml(err: impl std::fmt::Display) -> Self {
        CoreError::XmlParse {
            message: err.to_string(),
        }
    }

    pub fn invalid_document(message: impl Into<String>) -> Self {
        CoreError::InvalidDocument {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;
