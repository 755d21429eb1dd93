//! Curator Core - chart loading and packaging
//!
//! This crate turns a chart directory into the archive a chart repository accepts:
//! - `ChartMetadata`: the parsed `Chart.yaml`
//! - `LoadedChart`: a validated chart directory and the files to package
//! - `IgnoreRules`: `.helmignore` handling
//! - `create_archive`: `{name}-{version}.tgz` packaging

pub mod archive;
pub mod chart;
pub mod error;
pub mod ignore;

pub use archive::{create_archive, default_archive_name};
pub use chart::{CHART_FILE, ChartMetadata, LoadedChart, Maintainer, validate_chart_dir};
pub use error::{CoreError, Result};
pub use ignore::{IGNORE_FILE, IgnoreRules};
