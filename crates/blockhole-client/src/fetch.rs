//! Raw list fetching for URL sources.

use crate::client::error_message;
use crate::config::HttpConfig;
use blockhole_core::{BlockholeError, Result};
use reqwest::Client as HttpClient;
use tracing::{debug, warn};
use url::Url;

/// Fetches raw list bodies from `http(s)://` or `file://` URLs
#[derive(Debug, Clone)]
pub struct UrlFetcher {
    http: HttpClient,
    max_bytes: usize,
}

impl UrlFetcher {
    /// Create a fetcher with default settings
    pub fn new() -> Result<Self> {
        Self::with_config(&HttpConfig::default())
    }

    /// Create a fetcher from explicit HTTP settings
    pub fn with_config(config: &HttpConfig) -> Result<Self> {
        Ok(Self {
            http: config.http_client()?,
            max_bytes: config.max_list_bytes,
        })
    }

    /// Fetch `url` and return its body as text. Bodies over the size cap are truncated.
    pub async fn fetch(&self, url: &str) -> Result<String> {
        let parsed = Url::parse(url)
            .map_err(|e| BlockholeError::Config(format!("invalid URL '{url}': {e}")))?;

        let bytes = match parsed.scheme() {
            "file" => self.read_file(&parsed).await?,
            "http" | "https" => self.download(url).await?,
            other => {
                return Err(BlockholeError::Config(format!(
                    "unsupported URL scheme '{other}' in '{url}'"
                )))
            }
        };

        String::from_utf8(bytes)
            .map_err(|_| BlockholeError::Parse(format!("{url} is not valid UTF-8")))
    }

    async fn download(&self, url: &str) -> Result<Vec<u8>> {
        debug!(url, "GET request");
        let mut response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| BlockholeError::Http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = error_message(&response.text().await.unwrap_or_default());
            return Err(BlockholeError::Api {
                code: status.as_u16(),
                message,
            });
        }

        let mut body = Vec::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| BlockholeError::Http(e.to_string()))?
        {
            let room = self.max_bytes - body.len();
            if chunk.len() >= room {
                body.extend_from_slice(&chunk[..room]);
                if chunk.len() > room {
                    warn!(url, max_bytes = self.max_bytes, "list truncated at size limit");
                }
                break;
            }
            body.extend_from_slice(&chunk);
        }
        Ok(body)
    }

    async fn read_file(&self, url: &Url) -> Result<Vec<u8>> {
        let path = url
            .to_file_path()
            .map_err(|()| BlockholeError::Config(format!("invalid file URL '{url}'")))?;
        debug!(path = %path.display(), "reading local list");

        let mut bytes = tokio::fs::read(&path).await?;
        if bytes.len() > self.max_bytes {
            warn!(
                path = %path.display(),
                max_bytes = self.max_bytes,
                "list truncated at size limit"
            );
            bytes.truncate(self.max_bytes);
        }
        Ok(bytes)
    }
}
