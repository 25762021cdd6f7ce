//! The data-store seam every maintenance operation goes through.
//!
//! Operations receive a `&dyn ContentStore` explicitly; nothing in the crate
//! holds a process-wide client.

use thiserror::Error;

use crate::models::{ContentKind, ContentRow, Hierarchy, RowId, SubtopicId};

/// Errors that can occur while talking to a content store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Local SQLite failures
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Network-related errors (connection failures, DNS resolution, timeouts)
    #[error("Network error: {0}")]
    Network(#[source] reqwest::Error),

    /// HTTP errors with status code and response body
    #[error("HTTP error: status {status}: {body}")]
    Http { status: u16, body: String },

    /// A value read from the store could not be decoded
    #[error("Decode error: {0}")]
    Decode(String),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid URL configuration error
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// A required configuration value is absent
    #[error("Missing configuration: {0}")]
    MissingConfig(&'static str),
}

/// Table-oriented access to the syllabus hierarchy and its content.
///
/// This trait is implemented by the local SQLite [`Database`](crate::Database)
/// and the hosted [`RestStore`](crate::rest::RestStore), and lets tests run
/// every operation against an in-memory database.
pub trait ContentStore {
    /// Loads every subject, topic and subtopic.
    fn hierarchy(&self) -> Result<Hierarchy, StoreError>;

    /// Returns whether at least one row of `kind` references `subtopic`.
    ///
    /// Implementations stop after the first matching row.
    fn has_content(&self, kind: ContentKind, subtopic: &SubtopicId) -> Result<bool, StoreError>;

    /// Counts all rows of `kind`.
    fn count_content(&self, kind: ContentKind) -> Result<u64, StoreError>;

    /// Lists all rows of `kind`, oldest first.
    ///
    /// A row whose timestamp or difficulty cannot be decoded is logged and
    /// left out rather than failing the whole listing.
    fn list_content(&self, kind: ContentKind) -> Result<Vec<ContentRow>, StoreError>;

    /// Deletes the rows with the given ids, returning how many were removed.
    fn delete_content(&self, kind: ContentKind, ids: &[RowId]) -> Result<usize, StoreError>;

    /// Points every row of `kind` referencing `from` at `to` instead.
    fn reassign_subtopic(
        &self,
        kind: ContentKind,
        from: &SubtopicId,
        to: &SubtopicId,
    ) -> Result<usize, StoreError>;

    /// Executes a single raw SQL statement.
    fn execute_statement(&self, sql: &str) -> Result<(), StoreError>;
}
