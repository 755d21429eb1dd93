//! Error types for ChartMuseum API operations

use thiserror::Error;

use crate::response::Response;

/// ChartMuseum client errors
#[derive(Debug, Error)]
pub enum ClientError {
    // ============ Configuration Errors ============
    #[error("ChartMuseum API - base URL can not be blank")]
    BlankBaseUrl,

    #[error("Invalid base URL {url:?}: {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("Invalid request path {path:?}: {reason}")]
    InvalidPath { path: String, reason: String },

    #[error("Invalid {name} header: {reason}")]
    InvalidHeader { name: String, reason: String },

    // ============ Chart Errors ============
    #[error("{message}")]
    InvalidChart { message: String },

    #[error("Chart to upload can't be a directory")]
    NotAFile,

    // ============ Context Errors ============
    #[error("context canceled")]
    Cancelled,

    #[error("context deadline exceeded")]
    DeadlineExceeded,

    // ============ Network Errors ============
    #[error("Network error: {message}")]
    NetworkError { message: String },

    #[error("Request timed out: {message}")]
    Timeout { message: String },

    // ============ API Errors ============
    /// Non-2xx status; the decoded response is kept for inspection
    #[error("{}", .response.envelope.error)]
    Api { status: u16, response: Box<Response> },

    // ============ IO Errors ============
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    // ============ Wrapping ============
    #[error("{context}: {source}")]
    Context {
        context: String,
        #[source]
        source: Box<ClientError>,
    },
}

/// Result type for ChartMuseum API operations
pub type Result<T> = std::result::Result<T, ClientError>;

impl ClientError {
    /// Prefix this error with a description of the failed step
    pub fn context(self, context: impl Into<String>) -> Self {
        ClientError::Context {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// The decoded API response behind this error, if the server answered
    pub fn response(&self) -> Option<&Response> {
        match self {
            ClientError::Api { response, .. } => Some(response.as_ref()),
            ClientError::Context { source, .. } => source.response(),
            _ => None,
        }
    }

    /// The innermost error, skipping context prefixes
    pub fn root(&self) -> &ClientError {
        match self {
            ClientError::Context { source, .. } => source.root(),
            other => other,
        }
    }

    /// Whether the operation stopped because its context finished
    pub fn is_context_done(&self) -> bool {
        matches!(
            self.root(),
            ClientError::Cancelled | ClientError::DeadlineExceeded
        )
    }
}

/// Attach step context to fallible results
pub trait ResultExt<T> {
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.context(context))
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ClientError::Timeout {
                message: e.to_string(),
            }
        } else if e.is_connect() {
            ClientError::NetworkError {
                message: format!("Connection failed: {}", e),
            }
        } else {
            ClientError::NetworkError {
                message: e.to_string(),
            }
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(e: serde_json::Error) -> Self {
        ClientError::Serialization(e.to_string())
    }
}
