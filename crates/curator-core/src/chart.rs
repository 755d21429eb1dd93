//! Chart definition and loading

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::{CoreError, Result};
use crate::ignore::IgnoreRules;

/// File holding the chart metadata
pub const CHART_FILE: &str = "Chart.yaml";

/// Chart metadata as found in `Chart.yaml`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartMetadata {
    /// Chart API version (v1 or v2)
    #[serde(default)]
    pub api_version: Option<String>,

    /// Chart name (required)
    #[serde(default)]
    pub name: String,

    /// Chart version (required, SemVer)
    #[serde(default)]
    pub version: String,

    #[serde(default)]
    pub description: Option<String>,

    /// Version of the packaged application
    #[serde(default)]
    pub app_version: Option<String>,

    #[serde(default)]
    pub kube_version: Option<String>,

    /// Chart type (application or library)
    #[serde(default, rename = "type")]
    pub chart_type: Option<String>,

    #[serde(default)]
    pub home: Option<String>,

    #[serde(default)]
    pub icon: Option<String>,

    #[serde(default)]
    pub sources: Vec<String>,

    #[serde(default)]
    pub keywords: Vec<String>,

    #[serde(default)]
    pub maintainers: Vec<Maintainer>,

    #[serde(default)]
    pub deprecated: bool,

    #[serde(default)]
    pub annotations: HashMap<String, String>,
}

/// Maintainer information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Maintainer {
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

impl ChartMetadata {
    /// Parse metadata from the content of a `Chart.yaml`
    pub fn parse(content: &str) -> Result<Self> {
        let metadata: Self = serde_yaml::from_str(content)?;
        metadata.validate()?;
        Ok(metadata)
    }

    /// Check the fields a chart repository needs to index the chart
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(CoreError::MissingField {
                field: "name".to_string(),
            });
        }
        if self.name.contains('/') || self.name.contains('\\') {
            return Err(CoreError::InvalidChart {
                message: format!("chart name {:?} must not contain path separators", self.name),
            });
        }
        if self.version.trim().is_empty() {
            return Err(CoreError::MissingField {
                field: "version".to_string(),
            });
        }
        semver::Version::parse(self.version.trim_start_matches('v'))?;
        Ok(())
    }
}

/// Validate that `path` is a chart directory and return its metadata
///
/// The directory must exist and contain a parseable `Chart.yaml`
/// with a name and a SemVer version.
pub fn validate_chart_dir<P: AsRef<Path>>(path: P) -> Result<ChartMetadata> {
    let root = path.as_ref();
    let meta = std::fs::metadata(root).map_err(|_| CoreError::ChartNotFound {
        path: root.display().to_string(),
    })?;
    if !meta.is_dir() {
        return Err(CoreError::NotADirectory {
            path: root.display().to_string(),
        });
    }

    let chart_file = root.join(CHART_FILE);
    if !chart_file.is_file() {
        return Err(CoreError::InvalidChart {
            message: format!("no {} exists in directory {}", CHART_FILE, root.display()),
        });
    }

    let content = std::fs::read_to_string(&chart_file)?;
    ChartMetadata::parse(&content)
}

/// A chart loaded from disk, ready to be packaged
#[derive(Debug, Clone)]
pub struct LoadedChart {
    /// Parsed Chart.yaml
    pub metadata: ChartMetadata,

    /// Chart root directory
    pub root: PathBuf,

    /// Files to package, relative to `root`, sorted
    pub files: Vec<PathBuf>,
}

impl LoadedChart {
    /// Load a chart from a directory, honouring `.helmignore`
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let metadata = validate_chart_dir(&path)?;
        Self::with_metadata(path, metadata)
    }

    /// Collect the files of a chart whose `Chart.yaml` was already validated
    ///
    /// Symlinks are followed; a dangling link is an error.
    pub fn with_metadata<P: AsRef<Path>>(path: P, metadata: ChartMetadata) -> Result<Self> {
        let root = path.as_ref().to_path_buf();
        let rules = IgnoreRules::load(&root)?;

        let mut files = Vec::new();
        let walker = walkdir::WalkDir::new(&root)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| {
                let rel = entry.path().strip_prefix(&root).unwrap_or(entry.path());
                rel.as_os_str().is_empty() || !rules.is_ignored(rel, entry.file_type().is_dir())
            });

        for entry in walker {
            let entry = entry.map_err(std::io::Error::from)?;
            if !entry.file_type().is_file() {
                continue;
            }
            let rel = entry
                .path()
                .strip_prefix(&root)
                .unwrap_or(entry.path())
                .to_path_buf();
            files.push(rel);
        }
        files.sort();

        tracing::debug!(
            "loaded chart {}-{} with {} files from {}",
            metadata.name,
            metadata.version,
            files.len(),
            root.display()
        );

        Ok(Self {
            metadata,
            root,
            files,
        })
    }

    /// Chart name
    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    /// Chart version
    pub fn version(&self) -> &str {
        &self.metadata.version
    }
}
