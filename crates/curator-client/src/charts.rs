//! Chart upload and deletion
//!
//! Charts live either at the server root or under an optional
//! `{org}/{repo}` namespace. An org always needs a repo.

use std::fmt;
use std::io::SeekFrom;

use reqwest::Method;
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncSeekExt};

use crate::client::Client;
use crate::context::Context;
use crate::error::{ClientError, Result, ResultExt};
use crate::response::Response;
use crate::sniff::{OCTET_STREAM, SNIFF_LEN, detect_content_type};

/// Identifies a chart version and the namespace it belongs to
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChartInfo {
    pub name: String,
    pub version: String,
    pub org: Option<String>,
    pub repo: Option<String>,
}

/// Where a chart lives on the server
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope<'a> {
    Root,
    Repo(&'a str),
    Org { org: &'a str, repo: &'a str },
}

impl ChartInfo {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            org: None,
            repo: None,
        }
    }

    /// Set the organisation; empty strings leave it unset
    pub fn with_org(mut self, org: Option<impl Into<String>>) -> Self {
        self.org = org.map(Into::into).filter(|o| !o.is_empty());
        self
    }

    /// Set the repository; empty strings leave it unset
    pub fn with_repo(mut self, repo: Option<impl Into<String>>) -> Self {
        self.repo = repo.map(Into::into).filter(|r| !r.is_empty());
        self
    }

    fn org(&self) -> Option<&str> {
        self.org.as_deref().filter(|o| !o.is_empty())
    }

    fn repo(&self) -> Option<&str> {
        self.repo.as_deref().filter(|r| !r.is_empty())
    }

    /// Resolve the namespace, rejecting an org without a repo
    pub fn scope(&self) -> Result<Scope<'_>> {
        match (self.org(), self.repo()) {
            (Some(_), None) => Err(ClientError::InvalidChart {
                message: "Repo required if Org is provided".to_string(),
            }),
            (Some(org), Some(repo)) => Ok(Scope::Org { org, repo }),
            (None, Some(repo)) => Ok(Scope::Repo(repo)),
            (None, None) => Ok(Scope::Root),
        }
    }

    /// `api/[{org}/][{repo}/]charts`
    pub fn upload_path(&self) -> Result<String> {
        Ok(match self.scope()? {
            Scope::Root => "api/charts".to_string(),
            Scope::Repo(repo) => format!("api/{}/charts", repo),
            Scope::Org { org, repo } => format!("api/{}/{}/charts", org, repo),
        })
    }

    /// `api/[{org}/][{repo}/]charts/{name}/{version}`
    pub fn chart_path(&self) -> Result<String> {
        Ok(format!(
            "{}/{}/{}",
            self.upload_path()?,
            self.name,
            self.version
        ))
    }
}

impl fmt::Display for ChartInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.org(), self.repo()) {
            (Some(org), repo) => write!(
                f,
                "{}/{}/{}-{}",
                org,
                repo.unwrap_or_default(),
                self.name,
                self.version
            ),
            (None, Some(repo)) => write!(f, "{}/{}-{}", repo, self.name, self.version),
            (None, None) => write!(f, "{}-{}", self.name, self.version),
        }
    }
}

/// Chart operations of the ChartMuseum API
#[derive(Debug, Clone, Copy)]
pub struct ChartService<'a> {
    client: &'a Client,
}

impl<'a> ChartService<'a> {
    pub fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// Upload a packaged chart
    pub async fn upload(&self, ctx: &Context, chart: &ChartInfo, file: File) -> Result<Response> {
        let path = chart.upload_path()?;
        self.upload_file(ctx, &path, file).await
    }

    /// Delete a chart version
    pub async fn delete(&self, ctx: &Context, chart: &ChartInfo) -> Result<Response> {
        let path = chart.chart_path()?;
        let request = self
            .client
            .new_request(Method::DELETE, &path, None::<&()>)
            .context("Failed creating delete request")?;
        self.client
            .execute(ctx, request)
            .await
            .context("Failed to do delete request")
    }

    async fn upload_file(&self, ctx: &Context, path: &str, mut file: File) -> Result<Response> {
        let metadata = file
            .metadata()
            .await
            .map_err(|e| ClientError::Io(e).context("Unable to access file"))?;
        if metadata.is_dir() {
            return Err(ClientError::NotAFile);
        }

        let content_type = sniff_content_type(&mut file).await?;
        tracing::debug!(
            "uploading {} bytes as {} to {}",
            metadata.len(),
            content_type,
            path
        );

        let request = self
            .client
            .new_upload_request(path, file, metadata.len(), content_type)
            .context("Failed creating upload request")?;
        self.client
            .execute(ctx, request)
            .await
            .context("Failed to do upload request")
    }
}

/// Detect the content type from the head of `file`, then rewind it
async fn sniff_content_type(file: &mut File) -> Result<&'static str> {
    let mut head = Vec::with_capacity(SNIFF_LEN);
    let content_type = match (&mut *file).take(SNIFF_LEN as u64).read_to_end(&mut head).await {
        Ok(_) => detect_content_type(&head),
        Err(e) => {
            tracing::debug!("content sniffing failed: {}", e);
            OCTET_STREAM
        }
    };
    file.seek(SeekFrom::Start(0))
        .await
        .map_err(|e| ClientError::Io(e).context("Unable to rewind file"))?;
    Ok(content_type)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use wiremock::matchers::{body_bytes, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const ALL_NAMES: &[(&str, &str)] = &[("demo", "1.0.0"), ("", ""), ("a-b", "0.1.0-rc.1")];

    fn gzip_bytes() -> Vec<u8> {
        let mut data = vec![0x1f, 0x8b, 0x08, 0x00];
        data.extend(std::iter::repeat_n(0xabu8, 2048));
        data
    }

    async fn temp_file(data: &[u8]) -> (tempfile::NamedTempFile, File) {
        let mut named = tempfile::NamedTempFile::new().unwrap();
        named.write_all(data).unwrap();
        named.flush().unwrap();
        let file = File::open(named.path()).await.unwrap();
        (named, file)
    }

    #[test]
    fn test_paths_per_scope() {
        let root = ChartInfo::new("demo", "1.0.0");
        assert_eq!(root.upload_path().unwrap(), "api/charts");
        assert_eq!(root.chart_path().unwrap(), "api/charts/demo/1.0.0");

        let repo = ChartInfo::new("demo", "1.0.0").with_repo(Some("stable"));
        assert_eq!(repo.upload_path().unwrap(), "api/stable/charts");
        assert_eq!(repo.chart_path().unwrap(), "api/stable/charts/demo/1.0.0");

        let org = ChartInfo::new("demo", "1.0.0")
            .with_org(Some("acme"))
            .with_repo(Some("stable"));
        assert_eq!(org.upload_path().unwrap(), "api/acme/stable/charts");
        assert_eq!(
            org.chart_path().unwrap(),
            "api/acme/stable/charts/demo/1.0.0"
        );
    }

    #[test]
    fn test_empty_scope_values_are_unset() {
        let chart = ChartInfo::new("demo", "1.0.0")
            .with_org(Some(""))
            .with_repo(Some(""));
        assert_eq!(chart.scope().unwrap(), Scope::Root);
        assert_eq!(chart.org, None);
    }

    #[test]
    fn test_org_without_repo_rejected() {
        for (name, version) in ALL_NAMES {
            let chart = ChartInfo::new(*name, *version).with_org(Some("acme"));
            assert!(matches!(
                chart.upload_path(),
                Err(ClientError::InvalidChart { .. })
            ));
            assert!(matches!(
                chart.chart_path(),
                Err(ClientError::InvalidChart { .. })
            ));
        }
    }

    #[test]
    fn test_display() {
        let chart = ChartInfo::new("demo", "1.0.0");
        insta::assert_snapshot!(chart.to_string(), @"demo-1.0.0");
        let chart = chart.with_repo(Some("stable"));
        insta::assert_snapshot!(chart.to_string(), @"stable/demo-1.0.0");
        let chart = chart.with_org(Some("acme"));
        insta::assert_snapshot!(chart.to_string(), @"acme/stable/demo-1.0.0");
    }

    #[tokio::test]
    async fn test_sniff_rewinds_file() {
        let data = gzip_bytes();
        let (_named, mut file) = temp_file(&data).await;

        let content_type = sniff_content_type(&mut file).await.unwrap();
        assert_eq!(content_type, "application/x-gzip");

        let mut rest = Vec::new();
        file.read_to_end(&mut rest).await.unwrap();
        assert_eq!(rest, data);
    }

    #[tokio::test]
    async fn test_sniff_rewinds_short_text_file() {
        let (_named, mut file) = temp_file(b"hello").await;

        let content_type = sniff_content_type(&mut file).await.unwrap();
        assert_eq!(content_type, "text/plain; charset=utf-8");

        let mut rest = Vec::new();
        file.read_to_end(&mut rest).await.unwrap();
        assert_eq!(rest, b"hello");
    }

    #[tokio::test]
    async fn test_upload_sends_whole_file() {
        let server = MockServer::start().await;
        let data = gzip_bytes();
        Mock::given(method("POST"))
            .and(path("/api/charts"))
            .and(header("content-type", "application/x-gzip"))
            .and(body_bytes(data.clone()))
            .respond_with(ResponseTemplate::new(201).set_body_string(r#"{"saved":true}"#))
            .expect(1)
            .mount(&server)
            .await;

        let client = Client::new(&server.uri(), None).unwrap();
        let (_named, file) = temp_file(&data).await;
        let response = client
            .charts()
            .upload(&Context::background(), &ChartInfo::new("demo", "1.0.0"), file)
            .await
            .unwrap();

        assert!(response.saved());
        let requests = server.received_requests().await.unwrap();
        assert_eq!(
            requests[0].headers.get("content-length").unwrap(),
            &data.len().to_string()
        );
    }

    #[tokio::test]
    async fn test_upload_org_scope() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/acme/stable/charts"))
            .respond_with(ResponseTemplate::new(201).set_body_string(r#"{"saved":true}"#))
            .expect(1)
            .mount(&server)
            .await;

        let client = Client::new(&server.uri(), None).unwrap();
        let (_named, file) = temp_file(&gzip_bytes()).await;
        let chart = ChartInfo::new("demo", "1.0.0")
            .with_org(Some("acme"))
            .with_repo(Some("stable"));

        let response = client
            .charts()
            .upload(&Context::background(), &chart, file)
            .await
            .unwrap();
        assert!(response.saved());
    }

    #[tokio::test]
    async fn test_upload_org_without_repo_sends_nothing() {
        let server = MockServer::start().await;
        let client = Client::new(&server.uri(), None).unwrap();
        let (_named, file) = temp_file(&gzip_bytes()).await;
        let chart = ChartInfo::new("demo", "1.0.0").with_org(Some("acme"));

        let err = client
            .charts()
            .upload(&Context::background(), &chart, file)
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Repo required if Org is provided");
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_upload_directory_rejected() {
        let server = MockServer::start().await;
        let client = Client::new(&server.uri(), None).unwrap();
        let dir = tempfile::TempDir::new().unwrap();
        let file = File::open(dir.path()).await.unwrap();

        let err = client
            .charts()
            .upload(&Context::background(), &ChartInfo::new("demo", "1.0.0"), file)
            .await
            .unwrap_err();

        assert!(matches!(err, ClientError::NotAFile));
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_upload_server_error_is_wrapped() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string(r#"{"error":"disk full"}"#))
            .mount(&server)
            .await;

        let client = Client::new(&server.uri(), None).unwrap();
        let (_named, file) = temp_file(&gzip_bytes()).await;
        let err = client
            .charts()
            .upload(&Context::background(), &ChartInfo::new("demo", "1.0.0"), file)
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Failed to do upload request: disk full");
        assert_eq!(err.response().unwrap().status, 500);
    }

    #[tokio::test]
    async fn test_delete_paths() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/api/acme/stable/charts/demo/1.0.0"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"deleted":true}"#))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/api/charts/demo/1.0.0"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"deleted":true}"#))
            .expect(1)
            .mount(&server)
            .await;

        let client = Client::new(&server.uri(), None).unwrap();
        let ctx = Context::background();

        let scoped = ChartInfo::new("demo", "1.0.0")
            .with_org(Some("acme"))
            .with_repo(Some("stable"));
        assert!(client.charts().delete(&ctx, &scoped).await.unwrap().deleted());

        let root = ChartInfo::new("demo", "1.0.0");
        assert!(client.charts().delete(&ctx, &root).await.unwrap().deleted());
    }

    #[tokio::test]
    async fn test_delete_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .respond_with(
                ResponseTemplate::new(404).set_body_string(r#"{"error":"improper constraint: 9.9.9"}"#),
            )
            .mount(&server)
            .await;

        let client = Client::new(&server.uri(), None).unwrap();
        let err = client
            .charts()
            .delete(&Context::background(), &ChartInfo::new("demo", "9.9.9"))
            .await
            .unwrap_err();

        assert!(err.to_string().starts_with("Failed to do delete request: "));
        assert!(err.to_string().contains("improper constraint"));
    }

    #[tokio::test]
    async fn test_delete_org_without_repo_sends_nothing() {
        let server = MockServer::start().await;
        let client = Client::new(&server.uri(), None).unwrap();
        let chart = ChartInfo::new("demo", "1.0.0").with_org(Some("acme"));

        let err = client
            .charts()
            .delete(&Context::background(), &chart)
            .await
            .unwrap_err();

        assert!(matches!(err, ClientError::InvalidChart { .. }));
        assert!(server.received_requests().await.unwrap().is_empty());
    }
}
