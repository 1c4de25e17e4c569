//! CLI error types with exit code handling
//!
//! This module provides a unified error type for CLI operations that
//! maps errors to appropriate exit codes.

use kenv_core::CoreError;
use miette::Diagnostic;
use thiserror::Error;

use crate::exit_codes;

/// CLI-specific error type that includes exit code information
#[derive(Error, Debug, Diagnostic)]
pub enum CliError {
    /// Manifest could not be parsed or decoded
    #[error("{message}")]
    #[diagnostic(code(kenv::cli::parse))]
    Parse {
        message: String,
        #[help]
        help: Option<String>,
    },

    /// Document kind cannot receive variables
    #[error("Kind {kind} not supported")]
    #[diagnostic(
        code(kenv::cli::unsupported_kind),
        help(
            "supported kinds are Deployment, DaemonSet, ReplicaSet and ReplicationController; \
             use --skip-unsupported to pass other documents through unchanged"
        )
    )]
    UnsupportedKind { kind: String },

    /// Variable key rejected for the generated ConfigMap/Secret
    #[error("{message}")]
    #[diagnostic(code(kenv::cli::invalid_key))]
    InvalidKey {
        message: String,
        #[help]
        help: Option<String>,
    },

    /// IO error (file not found, permissions, etc.)
    #[error("IO error: {message}")]
    #[diagnostic(code(kenv::cli::io))]
    Io { message: String },

    /// Output could not be rendered
    #[error("Output error: {message}")]
    #[diagnostic(code(kenv::cli::output))]
    Output { message: String },
}

impl CliError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Parse { .. } => exit_codes::PARSE_ERROR,
            CliError::UnsupportedKind { .. } => exit_codes::UNSUPPORTED_KIND,
            CliError::InvalidKey { .. } => exit_codes::INVALID_KEY,
            CliError::Io { .. } => exit_codes::IO_ERROR,
            CliError::Output { .. } => exit_codes::ERROR,
        }
    }

    /// Create an output error
    pub fn output(message: impl Into<String>) -> Self {
        Self::Output {
            message: message.into(),
        }
    }
}

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        let message = err.to_string();
        match err {
            CoreError::Parse { .. } => CliError::Parse {
                message,
                help: Some("documents must be YAML or JSON objects with a top-level `kind`".into()),
            },
            CoreError::Decode { .. } => CliError::Parse {
                message,
                help: None,
            },
            CoreError::UnsupportedKind { kind } => CliError::UnsupportedKind { kind },
            CoreError::InvalidKey { .. } => CliError::InvalidKey {
                message,
                help: Some(
                    "pass --convert to lowercase keys and replace '_' with '-' for older API servers"
                        .into(),
                ),
            },
            CoreError::VarsFile { .. } => CliError::Parse {
                message,
                help: Some("variables files must be key=value lines or a flat YAML/JSON mapping".into()),
            },
            CoreError::Io { .. } => CliError::Io { message },
            _ => CliError::Output { message },
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes_from_core_errors() {
        let unsupported: CliError = CoreError::UnsupportedKind {
            kind: "Service".into(),
        }
        .into();
        assert_eq!(unsupported.exit_code(), exit_codes::UNSUPPORTED_KIND);
        assert_eq!(unsupported.to_string(), "Kind Service not supported");

        let invalid: CliError = CoreError::InvalidKey {
            key: "@@".into(),
            reasons: vec!["bad".into()],
        }
        .into();
        assert_eq!(invalid.exit_code(), exit_codes::INVALID_KEY);

        let decode: CliError = CoreError::Decode {
            kind: "Deployment".into(),
            message: "invalid type".into(),
        }
        .into();
        assert_eq!(decode.exit_code(), exit_codes::PARSE_ERROR);
    }

    #[test]
    fn test_io_error() {
        let err: CliError = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
        assert_eq!(err.exit_code(), exit_codes::IO_ERROR);
        assert_eq!(err.to_string(), "IO error: gone");
    }
}
