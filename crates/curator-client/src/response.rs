//! ChartMuseum response envelope

use reqwest::StatusCode;
use reqwest::header::HeaderMap;
use serde::{Deserialize, Serialize};

/// JSON body returned by every ChartMuseum API call
///
/// All fields are optional on the wire; missing ones default to empty/false.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Envelope {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub message: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub error: String,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub saved: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub deleted: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub healthy: bool,
}

impl Envelope {
    /// Decode a body, falling back to an empty envelope when it is not valid JSON
    pub fn decode(body: &[u8]) -> Self {
        if body.is_empty() {
            return Self::default();
        }
        match serde_json::from_slice(body) {
            Ok(envelope) => envelope,
            Err(e) => {
                tracing::trace!("ignoring undecodable response body: {}", e);
                Self::default()
            }
        }
    }
}

/// A decoded API response with its transport status and headers
#[derive(Debug, Clone)]
pub struct Response {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub envelope: Envelope,
}

impl Response {
    pub fn new(status: StatusCode, headers: HeaderMap, body: &[u8]) -> Self {
        Self {
            status,
            headers,
            envelope: Envelope::decode(body),
        }
    }

    /// 2xx status
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    pub fn message(&self) -> &str {
        &self.envelope.message
    }

    pub fn saved(&self) -> bool {
        self.envelope.saved
    }

    pub fn deleted(&self) -> bool {
        self.envelope.deleted
    }

    pub fn healthy(&self) -> bool {
        self.envelope.healthy
    }
}
