//! Domain block API endpoints.

use crate::client::error_message;
use crate::InstanceClient;
use blockhole_core::{
    parse_blocklist, Blocklist, BlockholeError, DomainBlock, FieldSet, ListFormat, Result,
    SeverityLevel,
};
use reqwest::header::LINK;
use reqwest::Method;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

const ADMIN_PATH: &str = "/api/v1/admin/domain_blocks";
const PUBLIC_PATH: &str = "/api/v1/instance/domain_blocks";

/// Result of asking an instance to create a block
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateOutcome {
    /// Block was created with this id
    Created(Option<String>),
    /// The instance already has a stricter block covering the domain
    StricterBlockExists(String),
}

/// Result of asking an instance to delete a block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    /// No block with that id existed
    AlreadyAbsent,
}

/// Body sent when creating or updating a block. Never carries the id.
#[derive(Debug, Serialize)]
struct BlockPayload<'a> {
    domain: &'a str,
    severity: SeverityLevel,
    public_comment: &'a str,
    private_comment: &'a str,
    reject_media: bool,
    reject_reports: bool,
    obfuscate: bool,
}

impl<'a> From<&'a DomainBlock> for BlockPayload<'a> {
    fn from(block: &'a DomainBlock) -> Self {
        Self {
            domain: &block.domain,
            severity: block.severity,
            public_comment: &block.public_comment,
            private_comment: &block.private_comment,
            reject_media: block.reject_media,
            reject_reports: block.reject_reports,
            obfuscate: block.obfuscate,
        }
    }
}

/// Domain block API endpoints
pub struct DomainBlockApi<'a> {
    client: &'a InstanceClient,
}

impl<'a> DomainBlockApi<'a> {
    pub(crate) fn new(client: &'a InstanceClient) -> Self {
        Self { client }
    }

    /// Fetch every domain block on the instance, following pagination.
    ///
    /// The admin endpoint needs a token with `admin:read:domain_blocks` and
    /// returns full block records; the public endpoint returns what the
    /// instance publishes, which may be obfuscated.
    pub async fn list(&self, admin: bool, import_fields: &FieldSet) -> Result<Blocklist> {
        let (path, format) = if admin {
            (ADMIN_PATH, ListFormat::Json)
        } else {
            (PUBLIC_PATH, ListFormat::MastodonApiPublic)
        };
        let origin = self.client.host().to_string();
        info!(host = %origin, admin, "fetching instance blocklist");

        let mut blocklist = Blocklist::new(origin.as_str());
        let mut next = Some(self.client.url(path));

        while let Some(url) = next.take() {
            debug!(url = %url, "GET request");
            let response = self
                .client
                .send(self.client.request(Method::GET, &url))
                .await?;

            let status = response.status();
            if !status.is_success() {
                return self.client.handle_error(status.as_u16(), response).await;
            }

            next = response
                .headers()
                .get(LINK)
                .and_then(|value| value.to_str().ok())
                .and_then(next_link);

            let body = response
                .text()
                .await
                .map_err(|e| BlockholeError::Http(e.to_string()))?;
            let page =
                parse_blocklist(&body, &origin, format, import_fields, SeverityLevel::Suspend)?;
            debug!(blocks = page.len(), "parsed page");
            blocklist.extend(page);
        }

        Ok(blocklist)
    }

    /// Fetch every block through the admin API, with destination ids attached
    pub async fn list_admin(&self, fields: &FieldSet) -> Result<Blocklist> {
        self.list(true, &fields.with_id()).await
    }

    /// Create a new domain block
    pub async fn create(&self, block: &DomainBlock) -> Result<CreateOutcome> {
        let url = self.client.url(ADMIN_PATH);
        debug!(url = %url, domain = %block.domain, "POST request");

        let response = self
            .client
            .send(
                self.client
                    .request(Method::POST, &url)
                    .json(&BlockPayload::from(block)),
            )
            .await?;

        if response.status().as_u16() == 422 {
            let message = error_message(&response.text().await.unwrap_or_default());
            warn!(domain = %block.domain, "{message}");
            return Ok(CreateOutcome::StricterBlockExists(message));
        }

        let created: Value = self.client.handle_response(response).await?;
        Ok(CreateOutcome::Created(created.get("id").and_then(id_string)))
    }

    /// Update the block with `id` to match `block`
    pub async fn update(&self, id: &str, block: &DomainBlock) -> Result<()> {
        self.client
            .put(&format!("{ADMIN_PATH}/{id}"), &BlockPayload::from(block))
            .await
    }

    /// Remove the block with `id`
    pub async fn delete(&self, id: &str) -> Result<DeleteOutcome> {
        let url = self.client.url(&format!("{ADMIN_PATH}/{id}"));
        debug!(url = %url, "DELETE request");

        let response = self
            .client
            .send(self.client.request(Method::DELETE, &url))
            .await?;

        if response.status().as_u16() == 404 {
            warn!(id, "no such domain block");
            return Ok(DeleteOutcome::AlreadyAbsent);
        }

        self.client.handle_empty_response(response).await?;
        Ok(DeleteOutcome::Deleted)
    }
}

/// Mastodon ids are strings, but tolerate numbers
fn id_string(value: &Value) -> Option<String> {
    match value {
        Value::String(id) => Some(id.clone()),
        Value::Number(id) => Some(id.to_string()),
        _ => None,
    }
}

/// Extract the `rel="next"` target from a `Link` header
fn next_link(header: &str) -> Option<String> {
    header.split(',').find_map(|link| {
        let mut parts = link.split(';');
        let target = parts.next()?.trim();
        let is_next = parts.any(|param| {
            let param = param.trim();
            param == "rel=\"next\"" || param == "rel=next"
        });
        if !is_next {
            return None;
        }
        target
            .strip_prefix('<')
            .and_then(|t| t.strip_suffix('>'))
            .map(String::from)
    })
}
