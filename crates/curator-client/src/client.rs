//! ChartMuseum API transport
//!
//! Builds requests relative to a fixed base URL and decodes the JSON
//! envelope every endpoint answers with.

use reqwest::header::{ACCEPT, CONTENT_LENGTH, CONTENT_TYPE, HeaderValue, USER_AGENT};
use reqwest::{Body, Method, Request};
use serde::Serialize;
use url::Url;

use crate::charts::ChartService;
use crate::context::Context;
use crate::error::{ClientError, Result};
use crate::response::Response;

/// User agent sent with every request
pub const DEFAULT_USER_AGENT: &str = concat!("curator/", env!("CARGO_PKG_VERSION"));

/// Versioned media type of the ChartMuseum API
pub const MEDIA_TYPE: &str = "application/vnd.chartmuseum.v0+json";

/// ChartMuseum API client
#[derive(Debug, Clone)]
pub struct Client {
    /// Base URL for API requests, always ending with `/`
    base_url: Url,
    user_agent: HeaderValue,
    http: reqwest::Client,
}

impl Client {
    /// Create a client for `base_url`
    ///
    /// A missing trailing slash is added. Without an `http` client a default
    /// one is built.
    pub fn new(base_url: &str, http: Option<reqwest::Client>) -> Result<Self> {
        let base_url = normalize_base_url(base_url)?;
        let http = match http {
            Some(http) => http,
            None => reqwest::Client::builder()
                .build()
                .map_err(|e| ClientError::NetworkError {
                    message: e.to_string(),
                })?,
        };

        Ok(Self {
            base_url,
            user_agent: HeaderValue::from_static(DEFAULT_USER_AGENT),
            http,
        })
    }

    /// Override the user agent
    pub fn with_user_agent(mut self, user_agent: &str) -> Result<Self> {
        self.user_agent =
            HeaderValue::from_str(user_agent).map_err(|e| ClientError::InvalidHeader {
                name: USER_AGENT.to_string(),
                reason: e.to_string(),
            })?;
        Ok(self)
    }

    /// The normalized base URL
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Chart upload/delete operations
    pub fn charts(&self) -> ChartService<'_> {
        ChartService::new(self)
    }

    /// Resolve a relative path (no leading slash) against the base URL
    pub fn resolve(&self, path: &str) -> Result<Url> {
        if path.starts_with('/') {
            return Err(ClientError::InvalidPath {
                path: path.to_string(),
                reason: "relative paths must not start with a slash".to_string(),
            });
        }
        let url = self
            .base_url
            .join(path)
            .map_err(|e| ClientError::InvalidPath {
                path: path.to_string(),
                reason: e.to_string(),
            })?;
        if !url.as_str().starts_with(self.base_url.as_str()) {
            return Err(ClientError::InvalidPath {
                path: path.to_string(),
                reason: format!("resolves outside of {}", self.base_url),
            });
        }
        Ok(url)
    }

    /// Build an API request, JSON-encoding `body` when present
    pub fn new_request<T>(&self, method: Method, path: &str, body: Option<&T>) -> Result<Request>
    where
        T: Serialize + ?Sized,
    {
        let url = self.resolve(path)?;
        let mut request = Request::new(method, url);

        if let Some(body) = body {
            let data = serde_json::to_vec(body)?;
            request
                .headers_mut()
                .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
            *request.body_mut() = Some(Body::from(data));
        }

        let headers = request.headers_mut();
        headers.insert(ACCEPT, HeaderValue::from_static(MEDIA_TYPE));
        headers.insert(USER_AGENT, self.user_agent.clone());
        Ok(request)
    }

    /// Build a `POST` streaming `body` of `size` bytes
    pub fn new_upload_request(
        &self,
        path: &str,
        body: impl Into<Body>,
        size: u64,
        content_type: &str,
    ) -> Result<Request> {
        let url = self.resolve(path)?;
        let content_type =
            HeaderValue::from_str(content_type).map_err(|e| ClientError::InvalidHeader {
                name: CONTENT_TYPE.to_string(),
                reason: format!("{:?}: {}", content_type, e),
            })?;

        let mut request = Request::new(Method::POST, url);
        let headers = request.headers_mut();
        headers.insert(CONTENT_TYPE, content_type);
        headers.insert(CONTENT_LENGTH, HeaderValue::from(size));
        headers.insert(ACCEPT, HeaderValue::from_static(MEDIA_TYPE));
        headers.insert(USER_AGENT, self.user_agent.clone());
        *request.body_mut() = Some(body.into());
        Ok(request)
    }

    /// Send a request and decode the response
    ///
    /// If `ctx` finishes first, or the transport fails after it finished, the
    /// context error is returned instead of the transport error. Non-2xx
    /// statuses come back as `ClientError::Api` carrying the decoded response.
    pub async fn execute(&self, ctx: &Context, request: Request) -> Result<Response> {
        if let Some(err) = ctx.err() {
            return Err(err);
        }

        let method = request.method().clone();
        let url = request.url().clone();
        tracing::debug!("{} {}", method, url);

        let exchange = async {
            let resp = self.http.execute(request).await?;
            let status = resp.status();
            let headers = resp.headers().clone();
            let body = resp.bytes().await.map(|b| b.to_vec()).unwrap_or_else(|e| {
                tracing::debug!("failed reading response body from {}: {}", url, e);
                Vec::new()
            });
            Ok::<_, reqwest::Error>(Response::new(status, headers, &body))
        };

        let result = tokio::select! {
            result = exchange => result,
            _ = ctx.done() => {
                return Err(ctx.err().unwrap_or(ClientError::Cancelled));
            }
        };

        let response = match result {
            Ok(response) => response,
            Err(e) => {
                if let Some(ctx_err) = ctx.err() {
                    return Err(ctx_err);
                }
                return Err(e.into());
            }
        };

        tracing::debug!("{} {} -> {}", method, url, response.status);

        if response.is_success() {
            Ok(response)
        } else {
            Err(ClientError::Api {
                status: response.status.as_u16(),
                response: Box::new(response),
            })
        }
    }

    /// Query the server health endpoint
    pub async fn health(&self, ctx: &Context) -> Result<Response> {
        let request = self.new_request(Method::GET, "health", None::<&()>)?;
        self.execute(ctx, request).await
    }
}

fn normalize_base_url(base_url: &str) -> Result<Url> {
    let trimmed = base_url.trim();
    if trimmed.is_empty() {
        return Err(ClientError::BlankBaseUrl);
    }

    let invalid = |reason: String| ClientError::InvalidBaseUrl {
        url: base_url.to_string(),
        reason,
    };

    let mut url = Url::parse(trimmed).map_err(|e| invalid(e.to_string()))?;
    if url.cannot_be_a_base() {
        return Err(invalid("URL cannot be used as a base".to_string()));
    }
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme {:?}", url.scheme())));
    }
    // Relative references never carry the base query or fragment
    url.set_query(None);
    url.set_fragment(None);
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}
