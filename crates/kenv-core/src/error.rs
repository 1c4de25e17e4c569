//! Core error types

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum CoreError {
    /// Input is not well-formed YAML/JSON at the document level
    #[error("failed to parse document {index}: {message}")]
    Parse { index: usize, message: String },

    /// Document kind has no injection or generation path
    #[error("kind {kind} not supported")]
    UnsupportedKind { kind: String },

    /// Document claims a supported kind but does not match its shape
    #[error("failed to decode {kind}: {message}")]
    Decode { kind: String, message: String },

    /// Key rejected by the ConfigMap key or DNS-1123 subdomain grammar
    #[error("{key} is not a valid ConfigMap key: {}", .reasons.join(", "))]
    InvalidKey { key: String, reasons: Vec<String> },

    #[error("invalid variables file {}: {message}", .path.display())]
    VarsFile { path: PathBuf, message: String },

    #[error("failed to encode resource: {0}")]
    Encode(String),

    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl CoreError {
    pub(crate) fn parse(index: usize, message: impl ToString) -> Self {
        CoreError::Parse {
            index,
            message: message.to_string(),
        }
    }

    pub(crate) fn decode(kind: &str, message: impl ToString) -> Self {
        CoreError::Decode {
            kind: kind.to_string(),
            message: message.to_string(),
        }
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(e: serde_json::Error) -> Self {
        CoreError::Encode(e.to_string())
    }
}

impl From<serde_yaml::Error> for CoreError {
    fn from(e: serde_yaml::Error) -> Self {
        CoreError::Encode(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;
