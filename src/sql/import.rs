use std::path::Path;

use anyhow::{Context, Result};
use tracing::{debug, warn};

use super::split_statements;
use crate::store::ContentStore;
use crate::utils::preview;

/// Error messages that signal an expected no-op rather than a real failure.
const BENIGN_MARKERS: &[&str] = &[
    "no rows",
    "already exists",
    "duplicate key",
    "unique constraint failed",
];

/// A statement that failed during import.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatementFailure {
    /// 0-based position in the script.
    pub index: usize,
    pub preview: String,
    pub message: String,
    /// Whether the failure is an expected no-op (e.g. re-inserting an existing row).
    pub benign: bool,
}

/// Summary of an import run.
#[derive(Debug, Clone, Default)]
pub struct ImportReport {
    pub total: usize,
    pub executed: usize,
    pub failures: Vec<StatementFailure>,
}

impl ImportReport {
    pub fn benign_failures(&self) -> usize {
        self.failures.iter().filter(|f| f.benign).count()
    }

    pub fn real_failures(&self) -> impl Iterator<Item = &StatementFailure> {
        self.failures.iter().filter(|f| !f.benign)
    }
}

/// Returns whether an error message describes an expected no-op.
pub fn is_benign_failure(message: &str) -> bool {
    let message = message.to_lowercase();
    BENIGN_MARKERS.iter().any(|marker| message.contains(marker))
}

/// Executes statements one at a time, collecting failures instead of stopping.
pub fn import_statements(store: &dyn ContentStore, statements: &[String]) -> ImportReport {
    let mut report = ImportReport {
        total: statements.len(),
        ..Default::default()
    };

    for (index, statement) in statements.iter().enumerate() {
        match store.execute_statement(statement) {
            Ok(()) => {
                debug!(index, "executed statement");
                report.executed += 1;
            }
            Err(e) => {
                let message = e.to_string();
                let benign = is_benign_failure(&message);
                if !benign {
                    warn!(index, error = %message, "statement failed");
                }
                report.failures.push(StatementFailure {
                    index,
                    preview: preview(statement, 80),
                    message,
                    benign,
                });
            }
        }
    }

    report
}

/// Reads, splits and imports the script at `path`.
///
/// # Errors
///
/// Returns an error only if the file cannot be read or tokenized; statement
/// failures are collected in the report.
pub fn import_file(store: &dyn ContentStore, path: &Path) -> Result<ImportReport> {
    let sql = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read SQL file: {}", path.display()))?;
    let statements = split_statements(&sql)
        .with_context(|| format!("Failed to tokenize SQL file: {}", path.display()))?;
    Ok(import_statements(store, &statements))
}
