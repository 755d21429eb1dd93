//! Global configuration shared by every subcommand

use clap::Args;
use curator_client::{ChartInfo, Client, Context};
use std::time::Duration;

use crate::error::{CliError, Result};

/// Global options, each also readable from the environment
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// ChartMuseum API base URL
    #[arg(short, long, env = "CHARTMUSEUM_SERVER", global = true, value_name = "URL")]
    pub server: Option<String>,

    /// ChartMuseum organisation
    #[arg(short, long, env = "CHARTMUSEUM_ORG", global = true)]
    pub org: Option<String>,

    /// ChartMuseum repository
    #[arg(short, long, env = "CHARTMUSEUM_REPO", global = true)]
    pub repo: Option<String>,

    /// Give up on the server after this many seconds (no limit by default)
    #[arg(long, env = "CHARTMUSEUM_TIMEOUT", global = true, value_name = "SECONDS")]
    pub timeout: Option<u64>,
}

impl GlobalArgs {
    /// Context for the operation, with a deadline when `--timeout` is set
    pub fn context(&self) -> Context {
        match self.timeout {
            Some(secs) => Context::with_timeout(Duration::from_secs(secs)),
            None => Context::background(),
        }
    }
}

/// Validated configuration with a ready client
#[derive(Debug, Clone)]
pub struct Config {
    pub server: String,
    pub org: Option<String>,
    pub repo: Option<String>,
    pub client: Client,
}

impl Config {
    /// Chart identity in the configured namespace
    pub fn chart_info(&self, name: &str, version: &str) -> ChartInfo {
        ChartInfo::new(name, version)
            .with_org(self.org.clone())
            .with_repo(self.repo.clone())
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Validate the global options and build the API client
pub fn init_config(args: &GlobalArgs) -> Result<Config> {
    let server = non_empty(&args.server).unwrap_or_default();
    let org = non_empty(&args.org);
    let repo = non_empty(&args.repo);

    if org.is_some() && repo.is_none() {
        return Err(CliError::config_with_help(
            "Repo required if Org is set",
            "Pass --repo or set CHARTMUSEUM_REPO",
        ));
    }

    let client = Client::new(&server, None).map_err(|e| {
        CliError::config(format!(
            "Could not create ChartMuseum client (server: {:?}): {}",
            server, e
        ))
    })?;
    tracing::debug!("using ChartMuseum API at {}", client.base_url());

    Ok(Config {
        server,
        org,
        repo,
        client,
    })
}
