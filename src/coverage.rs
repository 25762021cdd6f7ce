//! Content coverage auditing.
//!
//! Walks every subtopic of the hierarchy and probes each required content
//! table for at least one row, reporting the kinds each subtopic lacks.

use std::collections::BTreeMap;

use tracing::{info, warn};

use crate::models::{ContentKind, SubtopicId};
use crate::store::{ContentStore, StoreError};

// ANSI color codes for terminal output
const GREEN: &str = "\x1b[32m";
const RED: &str = "\x1b[31m";
const YELLOW: &str = "\x1b[33m";
const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";

/// A subtopic lacking one or more required content kinds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverageGap {
    pub subtopic_id: SubtopicId,
    /// "Subject > Topic > Subtopic"
    pub path: String,
    pub missing: Vec<ContentKind>,
}

/// Outcome of a coverage audit.
#[derive(Debug, Clone, Default)]
pub struct CoverageReport {
    pub total_subtopics: usize,
    /// Gaps ordered by path.
    pub gaps: Vec<CoverageGap>,
    /// Total rows per content kind across all subtopics.
    pub content_totals: BTreeMap<ContentKind, u64>,
    /// Subtopics whose existence checks failed and were skipped.
    pub errors: Vec<String>,
}

impl CoverageReport {
    /// Subtopics with at least one row of every required kind.
    pub fn complete_subtopics(&self) -> usize {
        self.total_subtopics - self.gaps.len() - self.errors.len()
    }

    /// Returns the gap recorded for a subtopic, if any.
    pub fn gap_for(&self, subtopic: &SubtopicId) -> Option<&CoverageGap> {
        self.gaps.iter().find(|gap| &gap.subtopic_id == subtopic)
    }
}

/// Audits every subtopic for the required content kinds.
///
/// Read-only. A failed existence check skips that subtopic and records the
/// error; loading the hierarchy or counting tables failing aborts the audit.
pub fn audit_coverage(store: &dyn ContentStore) -> Result<CoverageReport, StoreError> {
    let hierarchy = store.hierarchy()?;
    let mut report = CoverageReport {
        total_subtopics: hierarchy.subtopics().len(),
        ..Default::default()
    };

    for kind in ContentKind::ALL {
        report.content_totals.insert(kind, store.count_content(kind)?);
    }

    for subtopic in hierarchy.subtopics() {
        let path = hierarchy.path(subtopic);
        match missing_kinds(store, &subtopic.id) {
            Ok(missing) if missing.is_empty() => {}
            Ok(missing) => report.gaps.push(CoverageGap {
                subtopic_id: subtopic.id.clone(),
                path,
                missing,
            }),
            Err(e) => {
                warn!(subtopic = %subtopic.id, path = %path, error = %e, "coverage check failed");
                report.errors.push(format!("{path}: {e}"));
            }
        }
    }

    report.gaps.sort_by(|a, b| a.path.cmp(&b.path));
    info!(
        subtopics = report.total_subtopics,
        gaps = report.gaps.len(),
        "coverage audit finished"
    );
    Ok(report)
}

fn missing_kinds(
    store: &dyn ContentStore,
    subtopic: &SubtopicId,
) -> Result<Vec<ContentKind>, StoreError> {
    let mut missing = Vec::new();
    for kind in ContentKind::REQUIRED {
        if !store.has_content(kind, subtopic)? {
            missing.push(kind);
        }
    }
    Ok(missing)
}

// ============================================================================
// Pretty Printing
// ============================================================================

/// Prints the coverage report.
pub fn print_coverage_report(report: &CoverageReport) {
    println!("{}Content coverage{}", BOLD, RESET);
    println!();

    println!("{}Totals{}", BOLD, RESET);
    for (kind, total) in &report.content_totals {
        println!("  {:<20} {:>6}", format!("{}s:", capitalize(&kind.to_string())), total);
    }
    println!();

    let complete = report.complete_subtopics();
    let color = if report.gaps.is_empty() { GREEN } else { YELLOW };
    println!(
        "{}Subtopics{}  {}{}{} of {} complete",
        BOLD, RESET, color, complete, RESET, report.total_subtopics
    );

    for gap in &report.gaps {
        let missing = gap
            .missing
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        println!("  {}\u{2717}{} {}", RED, RESET, gap.path);
        println!("    {}missing: {}{}", DIM, missing, RESET);
    }

    if !report.errors.is_empty() {
        println!();
        println!("{}Skipped ({}){}", YELLOW, report.errors.len(), RESET);
        for error in &report.errors {
            println!("  {}{}{}", DIM, error, RESET);
        }
    }
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
