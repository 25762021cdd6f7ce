//! Duplicate reconciliation for content tables.
//!
//! Rows are walked oldest first; the first row seen for a [`DedupKey`] is kept
//! and every later row with the same key is deleted in one batch.

mod key;

use std::collections::HashSet;

use tracing::{debug, info};

use crate::models::{ContentKind, ContentRow, RowId};
use crate::store::{ContentStore, StoreError};

pub use key::{DedupKey, normalize_text};

/// Which rows to keep and which to delete for one content table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DedupPlan {
    pub kept: Vec<RowId>,
    pub duplicates: Vec<RowId>,
}

impl DedupPlan {
    pub fn is_empty(&self) -> bool {
        self.duplicates.is_empty()
    }
}

/// Result of reconciling one content table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DedupOutcome {
    pub kind: ContentKind,
    pub scanned: usize,
    pub duplicates_found: usize,
    pub deleted: usize,
}

/// Partitions rows into keepers and duplicates.
///
/// `rows` must already be ordered oldest first; the earliest row of every key
/// is the one kept. Exactly `rows.len() - distinct keys` rows end up in
/// `duplicates`.
pub fn find_duplicates(rows: &[ContentRow]) -> DedupPlan {
    let mut seen = HashSet::new();
    let mut plan = DedupPlan::default();

    for row in rows {
        if seen.insert(DedupKey::for_row(row)) {
            plan.kept.push(row.id.clone());
        } else {
            debug!(kind = %row.kind, id = %row.id, subtopic = %row.subtopic_id, "duplicate row");
            plan.duplicates.push(row.id.clone());
        }
    }

    plan
}

/// Deletes duplicate rows of `kind`, keeping the oldest row per key.
///
/// With `dry_run` set, duplicates are counted but nothing is deleted.
/// The scan and the delete are not wrapped in one transaction.
pub fn reconcile_duplicates(
    store: &dyn ContentStore,
    kind: ContentKind,
    dry_run: bool,
) -> Result<DedupOutcome, StoreError> {
    let mut rows = store.list_content(kind)?;
    // Stable: rows sharing a timestamp keep the store's order
    rows.sort_by_key(|row| row.created_at);

    let plan = find_duplicates(&rows);
    info!(
        kind = %kind,
        scanned = rows.len(),
        duplicates = plan.duplicates.len(),
        "scanned for duplicates"
    );

    let deleted = if dry_run || plan.is_empty() {
        0
    } else {
        store.delete_content(kind, &plan.duplicates)?
    };

    Ok(DedupOutcome {
        kind,
        scanned: rows.len(),
        duplicates_found: plan.duplicates.len(),
        deleted,
    })
}
