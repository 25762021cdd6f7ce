/// PostgREST (Supabase) content store.
///
/// This module provides `RestStore` for synchronous HTTP access to the hosted
/// content database, along with a builder that falls back to environment
/// variables for its configuration.
use std::time::Duration;

use reqwest::Method;
use reqwest::blocking::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use crate::models::{
    ContentKind, ContentRow, Difficulty, Hierarchy, RowId, Subject, Subtopic, SubtopicId, Topic,
};
use crate::store::{ContentStore, StoreError};
use crate::utils::parse_timestamp;

/// Rows requested per page when listing a table.
const PAGE_SIZE: usize = 1000;

/// Ids per `in.(...)` filter, keeping request URLs bounded.
const ID_BATCH: usize = 100;

/// Builder for constructing `RestStore` instances.
///
/// # Examples
///
/// ```
/// use revkit::rest::RestStoreBuilder;
///
/// let store = RestStoreBuilder::new()
///     .base_url("https://example.supabase.co")
///     .service_key("service-role-key")
///     .build()
///     .expect("Failed to create store");
///
/// assert_eq!(store.base_url(), "https://example.supabase.co");
/// ```
#[derive(Debug, Default)]
pub struct RestStoreBuilder {
    base_url: Option<String>,
    service_key: Option<String>,
}

impl RestStoreBuilder {
    /// Creates a new `RestStoreBuilder` with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the project URL (e.g. "https://abc.supabase.co").
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Sets the service-role key used for both `apikey` and bearer auth.
    pub fn service_key(mut self, key: impl Into<String>) -> Self {
        self.service_key = Some(key.into());
        self
    }

    /// Builds the `RestStore` with the configured settings.
    ///
    /// # Environment Variables
    ///
    /// If `base_url()` was not called, `SUPABASE_URL` is used. If
    /// `service_key()` was not called, `SUPABASE_SERVICE_ROLE_KEY` is used.
    /// Either being absent is an error.
    pub fn build(self) -> Result<RestStore, StoreError> {
        let base_url = match self.base_url {
            Some(url) => url,
            None => std::env::var("SUPABASE_URL")
                .map_err(|_| StoreError::MissingConfig("SUPABASE_URL"))?,
        };
        let service_key = match self.service_key {
            Some(key) => key,
            None => std::env::var("SUPABASE_SERVICE_ROLE_KEY")
                .map_err(|_| StoreError::MissingConfig("SUPABASE_SERVICE_ROLE_KEY"))?,
        };

        reqwest::Url::parse(&base_url)
            .map_err(|e| StoreError::InvalidUrl(format!("{}: {}", base_url, e)))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(5))
            .build()
            .map_err(StoreError::Network)?;

        Ok(RestStore {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            service_key,
        })
    }
}

/// Synchronous client for the hosted content database's REST interface.
///
/// Requests are issued one at a time with no retries; a failed request
/// surfaces as a `StoreError` to the calling operation.
pub struct RestStore {
    client: Client,
    base_url: String,
    service_key: String,
}

impl RestStore {
    /// Returns the project URL this store talks to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client
            .request(method, format!("{}/rest/v1/{}", self.base_url, path))
            .header("apikey", &self.service_key)
            .header("Authorization", format!("Bearer {}", self.service_key))
    }

    fn send(&self, request: RequestBuilder) -> Result<Response, StoreError> {
        let response = request.send().map_err(StoreError::Network)?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(StoreError::Http {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    fn fetch_all<T: DeserializeOwned>(
        &self,
        table: &str,
        select: &str,
        order: &str,
    ) -> Result<Vec<T>, StoreError> {
        let mut all = Vec::new();
        let mut offset = 0;
        loop {
            let request = self.request(Method::GET, table).query(&[
                ("select", select.to_string()),
                ("order", order.to_string()),
                ("limit", PAGE_SIZE.to_string()),
                ("offset", offset.to_string()),
            ]);
            let page: Vec<T> = self.send(request)?.json().map_err(decode_error)?;
            let fetched = page.len();
            all.extend(page);
            debug!(table, offset, fetched, "fetched page");

            if fetched < PAGE_SIZE {
                return Ok(all);
            }
            offset += fetched;
        }
    }
}

impl ContentStore for RestStore {
    fn hierarchy(&self) -> Result<Hierarchy, StoreError> {
        let subjects: Vec<Subject> = self.fetch_all("subjects", "id,name,slug", "name.asc,id.asc")?;
        let topics: Vec<Topic> =
            self.fetch_all("topics", "id,name,slug,subject_id", "name.asc,id.asc")?;
        let subtopics: Vec<Subtopic> = self.fetch_all(
            "subtopics",
            "id,name,slug,topic_id,description,learning_objectives,created_at",
            "name.asc,id.asc",
        )?;
        Ok(Hierarchy::new(subjects, topics, subtopics))
    }

    fn has_content(&self, kind: ContentKind, subtopic: &SubtopicId) -> Result<bool, StoreError> {
        let request = self.request(Method::GET, kind.table()).query(&[
            ("select", "id".to_string()),
            ("subtopic_id", format!("eq.{subtopic}")),
            ("limit", "1".to_string()),
        ]);
        let rows: Vec<Value> = self.send(request)?.json().map_err(decode_error)?;
        Ok(!rows.is_empty())
    }

    fn count_content(&self, kind: ContentKind) -> Result<u64, StoreError> {
        let request = self
            .request(Method::GET, kind.table())
            .query(&[("select", "id"), ("limit", "1")])
            .header("Prefer", "count=exact");
        let response = self.send(request)?;
        response
            .headers()
            .get("content-range")
            .and_then(|v| v.to_str().ok())
            .and_then(parse_content_range_total)
            .ok_or_else(|| StoreError::Decode("missing Content-Range count".to_string()))
    }

    fn list_content(&self, kind: ContentKind) -> Result<Vec<ContentRow>, StoreError> {
        let [first, second] = kind.text_fields();
        let select = format!("id,subtopic_id,{first},{second},difficulty,created_at");
        let raw: Vec<Value> = self.fetch_all(kind.table(), &select, "created_at.asc,id.asc")?;

        let mut rows: Vec<ContentRow> = raw
            .iter()
            .filter_map(|value| match row_from_json(kind, value) {
                Ok(row) => Some(row),
                Err(e) => {
                    warn!(table = kind.table(), error = %e, "skipping undecodable row");
                    None
                }
            })
            .collect();
        rows.sort_by_key(|row| row.created_at);
        Ok(rows)
    }

    fn delete_content(&self, kind: ContentKind, ids: &[RowId]) -> Result<usize, StoreError> {
        let mut deleted = 0;
        for batch in ids.chunks(ID_BATCH) {
            let request = self
                .request(Method::DELETE, kind.table())
                .query(&[("id", in_filter(batch)), ("select", "id".to_string())])
                .header("Prefer", "return=representation");
            let removed: Vec<Value> = self.send(request)?.json().map_err(decode_error)?;
            deleted += removed.len();
        }
        Ok(deleted)
    }

    fn reassign_subtopic(
        &self,
        kind: ContentKind,
        from: &SubtopicId,
        to: &SubtopicId,
    ) -> Result<usize, StoreError> {
        let request = self
            .request(Method::PATCH, kind.table())
            .query(&[("subtopic_id", format!("eq.{from}")), ("select", "id".to_string())])
            .header("Prefer", "return=representation")
            .json(&serde_json::json!({ "subtopic_id": to }));
        let updated: Vec<Value> = self.send(request)?.json().map_err(decode_error)?;
        Ok(updated.len())
    }

    /// Runs the statement through the `exec_sql(sql text)` database function,
    /// which must be installed in the hosted project.
    fn execute_statement(&self, sql: &str) -> Result<(), StoreError> {
        let request = self
            .request(Method::POST, "rpc/exec_sql")
            .json(&serde_json::json!({ "sql": sql }));
        self.send(request)?;
        Ok(())
    }
}

/// Body parse failures are decode errors; anything else while reading the
/// body is still a network failure.
fn decode_error(e: reqwest::Error) -> StoreError {
    if e.is_decode() {
        StoreError::Decode(format!("unexpected response body: {e}"))
    } else {
        StoreError::Network(e)
    }
}

/// Builds a PostgREST `in.(...)` filter with every id double-quoted.
///
/// # Examples
///
/// ```
/// use revkit::models::RowId;
/// use revkit::rest::in_filter;
///
/// let ids = [RowId::new("a"), RowId::new("b,c")];
/// assert_eq!(in_filter(&ids), r#"in.("a","b,c")"#);
/// ```
pub fn in_filter(ids: &[RowId]) -> String {
    let quoted = ids
        .iter()
        .map(|id| format!("\"{}\"", id.as_str().replace('\\', "\\\\").replace('"', "\\\"")))
        .collect::<Vec<_>>()
        .join(",");
    format!("in.({quoted})")
}

/// Extracts the total from a `Content-Range` header (`0-0/42`, `*/0`).
pub fn parse_content_range_total(header: &str) -> Option<u64> {
    header.rsplit_once('/')?.1.trim().parse().ok()
}

/// Decodes one content row from a PostgREST JSON object.
pub fn row_from_json(kind: ContentKind, value: &Value) -> Result<ContentRow, StoreError> {
    let [first, second] = kind.text_fields();
    let text = |field: &str| -> Result<String, StoreError> {
        match value.get(field) {
            Some(Value::String(s)) => Ok(s.clone()),
            Some(Value::Null) | None if field == second => Ok(String::new()),
            Some(Value::Null) | None => Err(StoreError::Decode(format!(
                "{} row is missing '{field}'",
                kind.table()
            ))),
            Some(other) => Ok(other.to_string()),
        }
    };

    let id = text("id")?;
    let created_at_raw = text("created_at")?;
    let created_at = parse_timestamp(&created_at_raw).ok_or_else(|| {
        StoreError::Decode(format!("created_at '{created_at_raw}' of {} row {id}", kind.table()))
    })?;
    let difficulty = match value.get("difficulty").and_then(Value::as_str) {
        Some(raw) => raw.parse::<Difficulty>().map_err(StoreError::Decode)?,
        None => Difficulty::default(),
    };

    Ok(ContentRow {
        subtopic_id: SubtopicId::new(text("subtopic_id")?),
        primary: text(first)?,
        secondary: text(second)?,
        id: RowId::new(id),
        kind,
        difficulty,
        created_at,
    })
}
