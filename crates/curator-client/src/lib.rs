//! Curator ChartMuseum client
//!
//! This crate talks to the ChartMuseum HTTP API:
//!
//! - **Transport**: requests relative to a base URL, JSON envelope decoding
//! - **Charts**: upload and delete, optionally scoped to `{org}/{repo}`
//! - **Context**: cancellation and deadlines for every call
//!
//! ## Example
//!
//! ```rust,no_run
//! use curator_client::{ChartInfo, Client, Context};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Client::new("http://localhost:8080", None)?;
//! let chart = ChartInfo::new("nginx", "15.0.0").with_repo(Some("stable"));
//!
//! let file = tokio::fs::File::open("nginx-15.0.0.tgz").await?;
//! let response = client.charts().upload(&Context::background(), &chart, file).await?;
//! assert!(response.saved());
//! # Ok(())
//! # }
//! ```

pub mod charts;
pub mod client;
pub mod context;
pub mod error;
pub mod response;
pub mod sniff;

// Re-exports for convenience
pub use charts::{ChartInfo, ChartService, Scope};
pub use client::{Client, DEFAULT_USER_AGENT, MEDIA_TYPE};
pub use context::Context;
pub use error::{ClientError, Result, ResultExt};
pub use response::{Envelope, Response};
pub use sniff::detect_content_type;
