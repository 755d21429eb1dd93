//! `.helmignore` support
//!
//! Rules use gitignore syntax and are matched relative to the chart root.
//! Helm's defaults are applied before the chart's own `.helmignore`, so a
//! chart can re-include them with `!`.

use ignore::gitignore::{Gitignore, GitignoreBuilder};
use std::path::Path;

use crate::error::{CoreError, Result};

/// Name of the ignore file inside a chart directory
pub const IGNORE_FILE: &str = ".helmignore";

/// Rules that always apply, before the chart's own `.helmignore`
const DEFAULT_RULES: &[&str] = &[".git/", "templates/.?*"];

/// Parsed ignore rules for a chart directory
#[derive(Debug, Clone)]
pub struct IgnoreRules {
    matcher: Gitignore,
}

impl IgnoreRules {
    /// Build the rule set for `root`: defaults plus `root/.helmignore` if present
    pub fn load(root: &Path) -> Result<Self> {
        let mut builder = GitignoreBuilder::new(root);
        add_lines(&mut builder, DEFAULT_RULES.iter().copied())?;

        let path = root.join(IGNORE_FILE);
        if path.is_file() {
            let content = std::fs::read_to_string(&path)?;
            add_lines(&mut builder, content.lines())?;
        }
        build(&builder)
    }

    /// Parse rules from the content of an ignore file, without the defaults
    pub fn parse(content: &str) -> Result<Self> {
        let mut builder = GitignoreBuilder::new("");
        add_lines(&mut builder, content.lines())?;
        build(&builder)
    }

    /// Whether a path relative to the chart root should be left out
    pub fn is_ignored(&self, rel: &Path, is_dir: bool) -> bool {
        self.matcher.matched(rel, is_dir).is_ignore()
    }
}

fn add_lines<'a>(
    builder: &mut GitignoreBuilder,
    lines: impl IntoIterator<Item = &'a str>,
) -> Result<()> {
    for line in lines {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        builder
            .add_line(None, line)
            .map_err(|e| CoreError::InvalidIgnorePattern {
                pattern: line.to_string(),
                message: e.to_string(),
            })?;
    }
    Ok(())
}

fn build(builder: &GitignoreBuilder) -> Result<IgnoreRules> {
    let matcher = builder
        .build()
        .map_err(|e| CoreError::InvalidIgnorePattern {
            pattern: IGNORE_FILE.to_string(),
            message: e.to_string(),
        })?;
    Ok(IgnoreRules { matcher })
}
