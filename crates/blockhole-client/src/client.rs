//! Mastodon instance API client.

use crate::api::{DomainBlockApi, MeasuresApi};
use crate::config::HttpConfig;
use blockhole_core::{BlockholeError, Result};
use reqwest::{Client as HttpClient, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Client for one Mastodon instance
#[derive(Clone)]
pub struct InstanceClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    http: HttpClient,
    host: String,
    base_url: String,
    token: Option<String>,
}

impl std::fmt::Debug for InstanceClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InstanceClient")
            .field("host", &self.inner.host)
            .field("base_url", &self.inner.base_url)
            .field("authenticated", &self.inner.token.is_some())
            .finish()
    }
}

impl InstanceClient {
    /// Create an unauthenticated client for `host` using default settings
    pub fn new(host: impl Into<String>) -> Result<Self> {
        InstanceClientBuilder::new(host).build()
    }

    /// Create a builder for custom configuration
    #[must_use]
    pub fn builder(host: impl Into<String>) -> InstanceClientBuilder {
        InstanceClientBuilder::new(host)
    }

    /// The instance host name this client talks to
    #[must_use]
    pub fn host(&self) -> &str {
        &self.inner.host
    }

    /// Returns true if requests carry a bearer token
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.inner.token.is_some()
    }

    /// Access domain block endpoints
    #[must_use]
    pub fn domain_blocks(&self) -> DomainBlockApi<'_> {
        DomainBlockApi::new(self)
    }

    /// Access admin measure endpoints
    #[must_use]
    pub fn measures(&self) -> MeasuresApi<'_> {
        MeasuresApi::new(self)
    }

    /// Absolute URL for an API path
    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{}", self.inner.base_url, path)
    }

    /// Start a request with auth attached
    pub(crate) fn request(&self, method: Method, url: &str) -> RequestBuilder {
        let builder = self.inner.http.request(method, url);
        match &self.inner.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Send a request, mapping only transport failures
    pub(crate) async fn send(&self, request: RequestBuilder) -> Result<Response> {
        request
            .send()
            .await
            .map_err(|e| BlockholeError::Http(e.to_string()))
    }

    /// Perform a POST request with JSON body
    pub(crate) async fn post<T: DeserializeOwned, B: serde::Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let url = self.url(path);
        debug!(url = %url, "POST request");

        let response = self.send(self.request(Method::POST, &url).json(body)).await?;
        self.handle_response(response).await
    }

    /// Perform a PUT request with JSON body, ignoring the response body
    pub(crate) async fn put<B: serde::Serialize + Sync>(&self, path: &str, body: &B) -> Result<()> {
        let url = self.url(path);
        debug!(url = %url, "PUT request");

        let response = self.send(self.request(Method::PUT, &url).json(body)).await?;
        self.handle_empty_response(response).await
    }

    /// Handle an API response that returns JSON
    pub(crate) async fn handle_response<T: DeserializeOwned>(
        &self,
        response: Response,
    ) -> Result<T> {
        let status = response.status();

        if status.is_success() {
            let body = response
                .text()
                .await
                .map_err(|e| BlockholeError::Http(e.to_string()))?;
            serde_json::from_str(&body).map_err(BlockholeError::Json)
        } else {
            self.handle_error(status.as_u16(), response).await
        }
    }

    /// Handle an API response whose body we don't need
    pub(crate) async fn handle_empty_response(&self, response: Response) -> Result<()> {
        let status = response.status();

        if status.is_success() {
            Ok(())
        } else {
            self.handle_error(status.as_u16(), response).await
        }
    }

    /// Convert an error response to a `BlockholeError`
    pub(crate) async fn handle_error<T>(&self, status: u16, response: Response) -> Result<T> {
        let url = response.url().to_string();
        let message = error_message(&response.text().await.unwrap_or_default());

        match status {
            401 | 403 => {
                warn!(host = %self.inner.host, "request rejected: {message}");
                Err(BlockholeError::Unauthorized(message))
            }
            404 => Err(BlockholeError::NotFound { resource: url }),
            _ => Err(BlockholeError::Api {
                code: status,
                message,
            }),
        }
    }
}

/// Pull the `error` field out of a Mastodon error body, or return the body as is
pub(crate) fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(String::from))
        .unwrap_or_else(|| body.to_string())
}

/// Builder for configuring an [`InstanceClient`]
pub struct InstanceClientBuilder {
    host: String,
    base_url: Option<String>,
    token: Option<String>,
    config: HttpConfig,
}

impl InstanceClientBuilder {
    /// Create a new builder for the given instance host
    #[must_use]
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            base_url: None,
            token: None,
            config: HttpConfig::default(),
        }
    }

    /// Set the bearer token used for authenticated endpoints
    #[must_use]
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Set the bearer token if one is configured
    #[must_use]
    pub fn maybe_token(mut self, token: Option<String>) -> Self {
        self.token = token;
        self
    }

    /// Set the base URL instead of `https://<host>` (useful for testing)
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the request timeout
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config = self.config.timeout(timeout);
        self
    }

    /// Set the User-Agent header
    #[must_use]
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.config = self.config.user_agent(agent);
        self
    }

    /// Replace all HTTP settings at once
    #[must_use]
    pub fn config(mut self, config: HttpConfig) -> Self {
        self.config = config;
        self
    }

    /// Build the client
    pub fn build(self) -> Result<InstanceClient> {
        if self.host.is_empty() {
            return Err(BlockholeError::Config("instance host is empty".into()));
        }
        let http = self.config.http_client()?;
        let base_url = self
            .base_url
            .unwrap_or_else(|| format!("https://{}", self.host))
            .trim_end_matches('/')
            .to_string();

        Ok(InstanceClient {
            inner: Arc::new(ClientInner {
                http,
                host: self.host,
                base_url,
                token: self.token,
            }),
        })
    }
}
