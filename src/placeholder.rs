//! Detection and removal of unfinished template text in content rows.
//!
//! Matching favours recall over precision: any row with a placeholder marker
//! in either text field is reported, and in delete mode removed outright.
//! Review the report before deleting.

use std::collections::{BTreeMap, HashMap};

use regex::Regex;
use tracing::{info, warn};

use crate::models::{ContentKind, RowId, SubtopicId};
use crate::store::{ContentStore, StoreError};
use crate::utils::preview;

const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const YELLOW: &str = "\x1b[33m";
const RESET: &str = "\x1b[0m";

/// Placeholder markers as (label, case-insensitive pattern).
///
/// Word boundaries keep legitimate words such as "conceptual" or "todos"
/// from matching.
pub const PLACEHOLDER_PATTERNS: &[(&str, &str)] = &[
    ("concept-N", r"\bconcept\s+\d+\b"),
    ("todo", r"\btodo\b"),
    ("tbd", r"\btbd\b"),
    ("coming soon", r"\bcoming\s+soon\b"),
    ("part-N", r"\(\s*part\s+\d+\s*\)"),
    ("placeholder", r"\bplaceholder\b"),
    ("lorem ipsum", r"\blorem\s+ipsum\b"),
    ("insert-here", r"\[\s*insert\b[^\]]*\]"),
];

/// Compiled placeholder pattern set.
pub struct PlaceholderDetector {
    patterns: Vec<(&'static str, Regex)>,
}

impl PlaceholderDetector {
    /// Compiles [`PLACEHOLDER_PATTERNS`].
    pub fn new() -> Result<Self, regex::Error> {
        let patterns = PLACEHOLDER_PATTERNS
            .iter()
            .map(|(label, pattern)| {
                Regex::new(&format!("(?i){pattern}")).map(|regex| (*label, regex))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { patterns })
    }

    /// Returns the label of the first pattern matching `text`.
    ///
    /// # Examples
    ///
    /// ```
    /// use revkit::placeholder::PlaceholderDetector;
    ///
    /// let detector = PlaceholderDetector::new().unwrap();
    /// assert_eq!(detector.find("Explain concept 1"), Some("concept-N"));
    /// assert_eq!(detector.find("conceptual framework"), None);
    /// ```
    pub fn find(&self, text: &str) -> Option<&'static str> {
        self.patterns
            .iter()
            .find(|(_, regex)| regex.is_match(text))
            .map(|(label, _)| *label)
    }
}

/// A content row containing placeholder text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceholderMatch {
    pub kind: ContentKind,
    pub row_id: RowId,
    pub subtopic_id: SubtopicId,
    /// "Subject > Topic > Subtopic", or the bare subtopic id when unknown.
    pub path: String,
    pub field: &'static str,
    pub pattern: &'static str,
    pub preview: String,
}

/// Result of scanning the content tables.
#[derive(Debug, Clone, Default)]
pub struct PlaceholderScan {
    pub matches: Vec<PlaceholderMatch>,
    /// Tables that could not be scanned.
    pub errors: Vec<String>,
}

impl PlaceholderScan {
    /// Groups matches by subtopic path.
    pub fn by_subtopic(&self) -> BTreeMap<&str, Vec<&PlaceholderMatch>> {
        let mut groups: BTreeMap<&str, Vec<&PlaceholderMatch>> = BTreeMap::new();
        for m in &self.matches {
            groups.entry(m.path.as_str()).or_default().push(m);
        }
        groups
    }
}

/// Result of deleting matched rows.
#[derive(Debug, Clone, Default)]
pub struct PlaceholderDeletion {
    pub deleted: usize,
    pub errors: Vec<String>,
}

/// Scans both text fields of every content row for placeholder markers.
///
/// A row is reported once, for the first field that matches. A table that
/// fails to load is logged and skipped.
pub fn scan_placeholders(
    store: &dyn ContentStore,
    detector: &PlaceholderDetector,
) -> Result<PlaceholderScan, StoreError> {
    let hierarchy = store.hierarchy()?;
    let paths: HashMap<&SubtopicId, String> = hierarchy
        .subtopics()
        .iter()
        .map(|s| (&s.id, hierarchy.path(s)))
        .collect();

    let mut scan = PlaceholderScan::default();
    for kind in ContentKind::ALL {
        let rows = match store.list_content(kind) {
            Ok(rows) => rows,
            Err(e) => {
                warn!(kind = %kind, error = %e, "skipping table");
                scan.errors.push(format!("{}: {e}", kind.table()));
                continue;
            }
        };

        for row in &rows {
            let hit = row
                .text_fields()
                .into_iter()
                .find_map(|(field, text)| detector.find(text).map(|p| (field, p, text)));

            if let Some((field, pattern, text)) = hit {
                scan.matches.push(PlaceholderMatch {
                    kind,
                    row_id: row.id.clone(),
                    subtopic_id: row.subtopic_id.clone(),
                    path: paths
                        .get(&row.subtopic_id)
                        .cloned()
                        .unwrap_or_else(|| row.subtopic_id.to_string()),
                    field,
                    pattern,
                    preview: preview(text, 60),
                });
            }
        }
    }

    info!(matches = scan.matches.len(), "placeholder scan finished");
    Ok(scan)
}

/// Deletes every row in `scan`, one batch per content kind.
///
/// A failed batch is logged and recorded; remaining kinds are still processed.
pub fn delete_placeholders(store: &dyn ContentStore, scan: &PlaceholderScan) -> PlaceholderDeletion {
    let mut by_kind: BTreeMap<ContentKind, Vec<RowId>> = BTreeMap::new();
    for m in &scan.matches {
        by_kind.entry(m.kind).or_default().push(m.row_id.clone());
    }

    let mut outcome = PlaceholderDeletion::default();
    for (kind, ids) in by_kind {
        match store.delete_content(kind, &ids) {
            Ok(n) => {
                info!(kind = %kind, deleted = n, "deleted placeholder rows");
                outcome.deleted += n;
            }
            Err(e) => {
                warn!(kind = %kind, error = %e, "failed to delete placeholder rows");
                outcome.errors.push(format!("{}: {e}", kind.table()));
            }
        }
    }
    outcome
}

/// Prints matches grouped by subtopic.
pub fn print_placeholder_report(scan: &PlaceholderScan) {
    println!("{}Placeholder content{}", BOLD, RESET);
    println!();

    if scan.matches.is_empty() {
        println!("  No placeholder content found");
    }

    for (path, matches) in scan.by_subtopic() {
        println!("{}{}{} ({})", BOLD, path, RESET, matches.len());
        for m in matches {
            println!(
                "  {}[{}]{} {} {}.{}: {}",
                YELLOW, m.pattern, RESET, m.kind, m.row_id, m.field, m.preview
            );
        }
    }

    for error in &scan.errors {
        println!("  {}skipped {}{}", DIM, error, RESET);
    }
}
