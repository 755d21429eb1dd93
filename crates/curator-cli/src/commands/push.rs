//! Push command - package a chart directory and upload it

use console::style;
use curator_client::{Context, Response};
use curator_core::{ChartMetadata, LoadedChart, create_archive, validate_chart_dir};
use std::path::Path;

use crate::config::Config;
use crate::error::{CliError, Result};

pub async fn run(ctx: &Context, config: &Config, chart_dir: &Path) -> Result<()> {
    let shown = chart_dir.display().to_string();

    let metadata = validate_chart_dir(chart_dir)
        .map_err(|e| CliError::chart(format!("Error validating chart path: {:?}", shown), e))?;

    match package_and_upload(ctx, config, chart_dir, metadata).await {
        Err(err) => println!("Error while processing {:?}: {}", shown, err),
        Ok(response) if response.saved() => println!(
            "{} {:?} to {:?}",
            style("Successfully uploaded").green().bold(),
            shown,
            config.server
        ),
        Ok(response) => println!(
            "Unexpected ChartMuseum response (Message = {:?})",
            response.message()
        ),
    }

    Ok(())
}

/// Package `chart_dir` into a temporary archive and upload it
///
/// `metadata` is the already validated `Chart.yaml`. The temporary directory
/// is removed when this returns, whatever the outcome.
pub async fn package_and_upload(
    ctx: &Context,
    config: &Config,
    chart_dir: &Path,
    metadata: ChartMetadata,
) -> Result<Response> {
    let tmp = tempfile::Builder::new()
        .prefix("curator-")
        .tempdir()
        .map_err(|e| CliError::io("Error while preparing temp Dir", e))?;

    let chart = LoadedChart::with_metadata(chart_dir, metadata).map_err(|e| {
        CliError::chart(
            format!("Error while loading Chart directory: {:?}", chart_dir.display().to_string()),
            e,
        )
    })?;

    let archive = create_archive(&chart, tmp.path()).map_err(|e| {
        CliError::chart(
            format!("Error while packaging Chart: {:?}", chart_dir.display().to_string()),
            e,
        )
    })?;

    let file = tokio::fs::File::open(&archive).await.map_err(|e| {
        CliError::io(
            format!(
                "Error while opening generated Chart package: {:?}",
                archive.display().to_string()
            ),
            e,
        )
    })?;

    let info = config.chart_info(chart.name(), chart.version());
    tracing::debug!("uploading {} from {}", info, archive.display());

    let response = config.client.charts().upload(ctx, &info, file).await?;
    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{GlobalArgs, init_config};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn write_chart(dir: &Path) {
        std::fs::write(dir.join("Chart.yaml"), "apiVersion: v2\nname: demo\nversion: 1.0.0\n")
            .unwrap();
        std::fs::write(dir.join("values.yaml"), "replicaCount: 1\n").unwrap();
    }

    fn config_for(server: &MockServer, org: Option<&str>, repo: Option<&str>) -> Config {
        init_config(&GlobalArgs {
            server: Some(server.uri()),
            org: org.map(str::to_string),
            repo: repo.map(str::to_string),
            timeout: None,
        })
        .unwrap()
    }

    async fn push_dir(config: &Config, dir: &Path) -> Result<Response> {
        let metadata = validate_chart_dir(dir).unwrap();
        package_and_upload(&Context::background(), config, dir, metadata).await
    }

    #[tokio::test]
    async fn test_package_and_upload_root_scope() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/charts"))
            .respond_with(ResponseTemplate::new(201).set_body_string(r#"{"saved":true}"#))
            .expect(1)
            .mount(&server)
            .await;

        let chart_dir = tempfile::TempDir::new().unwrap();
        write_chart(chart_dir.path());
        let config = config_for(&server, None, None);

        let response = push_dir(&config, chart_dir.path()).await.unwrap();
        assert!(response.saved());

        let requests = server.received_requests().await.unwrap();
        assert_eq!(&requests[0].body[..2], &[0x1f, 0x8b]);
        assert_eq!(
            requests[0].headers.get("content-type").unwrap(),
            "application/x-gzip"
        );
    }

    #[tokio::test]
    async fn test_package_and_upload_repo_scope() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/stable/charts"))
            .respond_with(ResponseTemplate::new(201).set_body_string(r#"{"saved":true}"#))
            .expect(1)
            .mount(&server)
            .await;

        let chart_dir = tempfile::TempDir::new().unwrap();
        write_chart(chart_dir.path());
        let config = config_for(&server, None, Some("stable"));

        let response = push_dir(&config, chart_dir.path()).await.unwrap();
        assert!(response.saved());
    }

    #[tokio::test]
    async fn test_package_and_upload_server_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string(r#"{"error":"disk full"}"#))
            .mount(&server)
            .await;

        let chart_dir = tempfile::TempDir::new().unwrap();
        write_chart(chart_dir.path());
        let config = config_for(&server, None, None);

        let err = push_dir(&config, chart_dir.path()).await.unwrap_err();
        assert!(matches!(err, CliError::Api { .. }));
        assert!(err.to_string().contains("disk full"));
    }

    #[tokio::test]
    async fn test_package_and_upload_broken_chart() {
        let server = MockServer::start().await;
        let chart_dir = tempfile::TempDir::new().unwrap();
        write_chart(chart_dir.path());
        std::fs::write(chart_dir.path().join(".helmignore"), "[\n").unwrap();
        let config = config_for(&server, None, None);

        let err = push_dir(&config, chart_dir.path()).await.unwrap_err();
        assert!(matches!(err, CliError::Chart { .. }));
        assert!(err.to_string().starts_with("Error while loading Chart directory"));
        assert!(server.received_requests().await.unwrap().is_empty());
    }
}
