// client.rs
use reqwest::blocking::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;
use url::Url;

use crate::config::{ConfigError, IngestConfig};
use crate::errors::UpstreamError;
use crate::upstream::models::{RawRecord, RecordPage};

const USER_AGENT: &str = concat!("listing-ingest/", env!("CARGO_PKG_VERSION"));

/// One list request: page size, optional view, optional continuation cursor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageQuery {
    pub page_size: u32,
    pub view: Option<String>,
    pub offset: Option<String>,
}

impl PageQuery {
    pub fn new(page_size: u32, view: Option<&str>) -> Self {
        Self {
            page_size,
            view: view.map(str::to_string),
            offset: None,
        }
    }

    pub fn with_offset(mut self, offset: Option<String>) -> Self {
        self.offset = offset;
        self
    }

    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![("maxRecords", self.page_size.to_string())];
        if let Some(view) = &self.view {
            params.push(("view", view.clone()));
        }
        if let Some(offset) = &self.offset {
            params.push(("offset", offset.clone()));
        }
        params
    }
}

/// Read access to the remote table. The HTTP client is the production impl; tests script their own.
pub trait RecordSource {
    fn list_records(&self, query: &PageQuery) -> Result<RecordPage, UpstreamError>;

    fn get_record(&self, record_id: &str) -> Result<RawRecord, UpstreamError>;
}

impl<S: RecordSource + ?Sized> RecordSource for &S {
    fn list_records(&self, query: &PageQuery) -> Result<RecordPage, UpstreamError> {
        (**self).list_records(query)
    }

    fn get_record(&self, record_id: &str) -> Result<RawRecord, UpstreamError> {
        (**self).get_record(record_id)
    }
}

/// Bearer-token client for `GET {api}/{baseId}/{table}[/{recordId}]`.
pub struct TableClient {
    client: Client,
    table_url: Url,
    token: String,
}

impl TableClient {
    pub fn new(config: &IngestConfig) -> Result<Self, ConfigError> {
        let table_url = table_url(&config.api_url, &config.base_id, &config.table)?;

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(config.request_timeout)
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| ConfigError::Invalid {
                key: "LISTINGS_API_URL",
                value: config.api_url.clone(),
                reason: format!("HTTP client could not be built: {e}"),
            })?;

        Ok(Self {
            client,
            table_url,
            token: config.api_token.clone(),
        })
    }

    pub fn table_url(&self) -> &Url {
        &self.table_url
    }

    fn send(&self, url: Url, params: &[(&str, String)]) -> Result<String, UpstreamError> {
        debug!(%url, ?params, "upstream request");

        let resp = self
            .client
            .get(url)
            .bearer_auth(&self.token)
            .query(params)
            .send()?;

        let status = resp.status();
        let text = resp.text()?;

        if !status.is_success() {
            return Err(UpstreamError::from_status(status.as_u16(), error_message(&text)));
        }

        Ok(text)
    }
}

impl RecordSource for TableClient {
    fn list_records(&self, query: &PageQuery) -> Result<RecordPage, UpstreamError> {
        let text = self.send(self.table_url.clone(), &query.to_params())?;
        serde_json::from_str(&text).map_err(|e| UpstreamError::Decode(e.to_string()))
    }

    fn get_record(&self, record_id: &str) -> Result<RawRecord, UpstreamError> {
        let mut url = self.table_url.clone();
        url.path_segments_mut()
            .map_err(|_| UpstreamError::Decode("table URL cannot take a path".into()))?
            .push(record_id);

        let text = self.send(url, &[])?;
        serde_json::from_str(&text).map_err(|e| UpstreamError::Decode(e.to_string()))
    }
}

/// Percent-encodes base and table as path segments; table names are often non-ASCII.
pub fn table_url(api_url: &str, base_id: &str, table: &str) -> Result<Url, ConfigError> {
    let mut url = Url::parse(api_url).map_err(|e| ConfigError::Invalid {
        key: "LISTINGS_API_URL",
        value: api_url.to_string(),
        reason: e.to_string(),
    })?;

    url.path_segments_mut()
        .map_err(|_| ConfigError::Invalid {
            key: "LISTINGS_API_URL",
            value: api_url.to_string(),
            reason: "cannot be a base URL".into(),
        })?
        .pop_if_empty()
        .push(base_id)
        .push(table);

    Ok(url)
}

/// Upstream errors come as `{"error": {"type", "message"}}` or `{"error": "CODE"}`.
fn error_message(body: &str) -> String {
    let parsed: Option<Value> = serde_json::from_str(body).ok();

    let from_json = parsed.as_ref().and_then(|json| match json.get("error") {
        Some(Value::String(code)) => Some(code.clone()),
        Some(Value::Object(obj)) => {
            let kind = obj.get("type").and_then(Value::as_str).unwrap_or("");
            let message = obj.get("message").and_then(Value::as_str).unwrap_or("");
            Some(format!("{kind} {message}").trim().to_string())
        }
        _ => None,
    });

    match from_json {
        Some(msg) if !msg.is_empty() => msg,
        _ => body.chars().take(200).collect(),
    }
}
