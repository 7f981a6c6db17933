//! Admin measure endpoints.

use crate::InstanceClient;
use blockhole_core::{BlockholeError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

const MEASURES_PATH: &str = "/api/v1/admin/measures";
const INSTANCE_FOLLOWS: &str = "instance_follows";

#[derive(Debug, Serialize)]
struct MeasureRequest<'a> {
    keys: [&'a str; 1],
    instance_follows: DomainFilter<'a>,
}

#[derive(Debug, Serialize)]
struct DomainFilter<'a> {
    domain: &'a str,
}

#[derive(Debug, Deserialize)]
struct Measure {
    key: String,
    #[serde(default)]
    total: Value,
}

/// Admin measure API endpoints
pub struct MeasuresApi<'a> {
    client: &'a InstanceClient,
}

impl<'a> MeasuresApi<'a> {
    pub(crate) fn new(client: &'a InstanceClient) -> Self {
        Self { client }
    }

    /// Number of local accounts following accounts at `domain`.
    ///
    /// The measure endpoint only accepts one domain per request.
    pub async fn instance_follows(&self, domain: &str) -> Result<u64> {
        let request = MeasureRequest {
            keys: [INSTANCE_FOLLOWS],
            instance_follows: DomainFilter { domain },
        };

        let measures: Vec<Measure> = self.client.post(MEASURES_PATH, &request).await?;
        let measure = measures
            .iter()
            .find(|m| m.key == INSTANCE_FOLLOWS)
            .ok_or_else(|| {
                BlockholeError::Parse(format!("no {INSTANCE_FOLLOWS} measure returned"))
            })?;

        total(&measure.total)
    }
}

/// Measure totals come back as strings
fn total(value: &Value) -> Result<u64> {
    match value {
        Value::String(text) => text
            .parse()
            .map_err(|_| BlockholeError::Parse(format!("bad measure total '{text}'"))),
        Value::Number(number) => number
            .as_u64()
            .ok_or_else(|| BlockholeError::Parse(format!("bad measure total '{number}'"))),
        other => Err(BlockholeError::Parse(format!("bad measure total '{other}'"))),
    }
}
