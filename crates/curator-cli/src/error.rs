//! CLI error types
//!
//! Every failure is printed with the step that failed. Configuration errors
//! additionally show the usage of the failing subcommand.

use curator_client::ClientError;
use curator_core::CoreError;
use miette::Diagnostic;
use thiserror::Error;

/// CLI-specific error type
#[derive(Error, Debug, Diagnostic, Clone)]
pub enum CliError {
    /// Invalid global configuration (server, org, repo)
    #[error("{message}")]
    #[diagnostic(code(curator::cli::config))]
    Config {
        message: String,
        #[help]
        help: Option<String>,
    },

    /// Chart directory validation, loading or packaging failed
    #[error("{message}")]
    #[diagnostic(code(curator::cli::chart))]
    Chart {
        message: String,
        #[help]
        help: Option<String>,
    },

    /// IO error (temp dir, archive file)
    #[error("{message}")]
    #[diagnostic(code(curator::cli::io))]
    Io { message: String },

    /// ChartMuseum API or transport failure
    #[error("{message}")]
    #[diagnostic(code(curator::cli::api))]
    Api { message: String },
}

impl CliError {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            help: None,
        }
    }

    /// Create a configuration error with help text
    pub fn config_with_help(message: impl Into<String>, help: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            help: Some(help.into()),
        }
    }

    /// Create a chart error prefixed with the failed step
    pub fn chart(step: impl std::fmt::Display, err: CoreError) -> Self {
        let help = match &err {
            CoreError::InvalidChart { .. } | CoreError::MissingField { .. } => {
                Some("A chart directory needs a Chart.yaml with a name and a SemVer version".to_string())
            }
            _ => None,
        };
        Self::Chart {
            message: format!("{}: {}", step, err),
            help,
        }
    }

    /// Create an IO error prefixed with the failed step
    pub fn io(step: impl std::fmt::Display, err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{}: {}", step, err),
        }
    }

    /// Whether the usage of the subcommand should be shown
    pub fn shows_usage(&self) -> bool {
        matches!(self, CliError::Config { .. })
    }
}

impl From<ClientError> for CliError {
    fn from(err: ClientError) -> Self {
        CliError::Api {
            message: err.to_string(),
        }
    }
}

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;
