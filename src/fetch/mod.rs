// src/fetch/mod.rs
use crate::error::{PipelineError, Result};
use crate::table::Table;
use reqwest::Client;
use serde_json::Value as Json;
use tracing::{debug, error, info, warn};

/// Reads one "list all" collection endpoint into a [`Table`].
///
/// A single GET per call, no retries: a failed request is final for the run.
#[derive(Clone)]
pub struct SourceReader {
    client: Client,
}

impl SourceReader {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Fetch `url`, logging any failure and falling back to an empty table.
    #[tracing::instrument(level = "info", skip(self))]
    pub async fn fetch(&self, url: &str) -> Table {
        match self.try_fetch(url).await {
            Ok(table) => {
                info!(rows = table.num_rows(), columns = table.num_columns(), "fetched");
                table
            }
            Err(e @ PipelineError::EmptyPayload { .. }) => {
                warn!("{}", e);
                Table::empty()
            }
            Err(e) => {
                error!("{}", e);
                Table::empty()
            }
        }
    }

    /// Fetch `url` and report exactly why nothing came back.
    pub async fn try_fetch(&self, url: &str) -> Result<Table> {
        let payload = self.fetch_payload(url).await?;
        table_from_payload(url, payload)
    }

    /// GET `url` and decode the body as JSON, without shaping it.
    pub async fn fetch_payload(&self, url: &str) -> Result<Json> {
        debug!("GET {}", url);
        let transport = |source: reqwest::Error| PipelineError::Transport {
            url: url.to_string(),
            source,
        };

        let payload: Json = self
            .client
            .get(url)
            .send()
            .await
            .map_err(transport)?
            .error_for_status()
            .map_err(transport)?
            .json()
            .await
            .map_err(transport)?;

        Ok(payload)
    }
}

/// Turn a decoded response body into a table. Array elements that are not
/// objects are skipped.
pub fn table_from_payload(url: &str, payload: Json) -> Result<Table> {
    let items = match payload {
        Json::Null => Vec::new(),
        Json::Array(items) => items,
        other => {
            return Err(PipelineError::MalformedPayload {
                url: url.to_string(),
                reason: format!("expected a JSON array, got {}", json_kind(&other)),
            })
        }
    };
    if items.is_empty() {
        return Err(PipelineError::EmptyPayload {
            url: url.to_string(),
        });
    }

    let total = items.len();
    let records: Vec<_> = items
        .into_iter()
        .filter_map(|item| match item {
            Json::Object(map) => Some(map),
            _ => None,
        })
        .collect();

    if records.is_empty() {
        return Err(PipelineError::MalformedPayload {
            url: url.to_string(),
            reason: format!("none of the {} array elements is an object", total),
        });
    }
    if records.len() < total {
        warn!(
            url,
            skipped = total - records.len(),
            "skipping non-object array elements"
        );
    }

    Ok(Table::from_records(records))
}

fn json_kind(v: &Json) -> &'static str {
    match v {
        Json::Null => "null",
        Json::Bool(_) => "a boolean",
        Json::Number(_) => "a number",
        Json::String(_) => "a string",
        Json::Array(_) => "an array",
        Json::Object(_) => "an object",
    }
}
