//! Remapping content from superseded subtopics onto their replacements.
//!
//! When the hierarchy is re-seeded with new ids but the same names, content
//! rows still reference the old subtopics. Each superseded subtopic is matched
//! to the one current subtopic with the same name under the same subject, and
//! every content table is repointed.

use std::collections::{HashMap, HashSet};

use tracing::{info, warn};

use crate::dedup::normalize_text;
use crate::models::{ContentKind, Hierarchy, SubjectId, Subtopic, SubtopicId};
use crate::store::{ContentStore, StoreError};

/// Replacement lookup result for one superseded subtopic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Replacement<'a> {
    Unique(&'a Subtopic),
    /// No subtopic of that name exists under the subject, or the superseded
    /// subtopic itself is unknown.
    NotFound,
    /// More than one candidate; carries the candidate count.
    Ambiguous(usize),
}

/// One superseded subtopic whose content was moved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemapMove {
    pub from: SubtopicId,
    pub to: SubtopicId,
    pub path: String,
    pub rows_moved: usize,
}

/// Summary of a remap run.
#[derive(Debug, Clone, Default)]
pub struct RemapOutcome {
    pub moves: Vec<RemapMove>,
    /// Superseded subtopics skipped for having zero or several candidates.
    pub not_found: usize,
    pub errors: Vec<String>,
}

impl RemapOutcome {
    pub fn rows_moved(&self) -> usize {
        self.moves.iter().map(|m| m.rows_moved).sum()
    }
}

/// Finds subtopics superseded by a newer copy of themselves.
///
/// Subtopics form a group when they share a subject, a topic name and a
/// subtopic name (names trimmed and case-insensitive); every member except
/// the most recently created is superseded. Same-named subtopics under
/// differently named topics are distinct and never grouped. Subtopics without
/// a resolvable topic or subject are ignored.
pub fn detect_superseded(hierarchy: &Hierarchy) -> Vec<SubtopicId> {
    let mut groups: HashMap<(&SubjectId, String, String), Vec<&Subtopic>> = HashMap::new();
    for subtopic in hierarchy.subtopics() {
        let (Some(subject), Some(topic)) = (
            hierarchy.subject_of(subtopic),
            topic_name(hierarchy, subtopic),
        ) else {
            continue;
        };
        groups
            .entry((subject, topic, normalize_text(&subtopic.name)))
            .or_default()
            .push(subtopic);
    }

    let mut superseded = Vec::new();
    for mut group in groups.into_values().filter(|g| g.len() > 1) {
        group.sort_by_key(|s| s.created_at);
        group.pop();
        superseded.extend(group.into_iter().map(|s| s.id.clone()));
    }
    superseded.sort();
    superseded
}

fn topic_name(hierarchy: &Hierarchy, subtopic: &Subtopic) -> Option<String> {
    hierarchy
        .topic(&subtopic.topic_id)
        .map(|topic| normalize_text(&topic.name))
}

/// Looks up the current subtopic that replaces `old`.
///
/// Candidates share `old`'s normalized name and subject, and are neither
/// `old` itself nor listed in `superseded`. When some candidates also sit
/// under a topic with `old`'s topic name, only those are considered.
pub fn find_replacement<'a>(
    hierarchy: &'a Hierarchy,
    old: &SubtopicId,
    superseded: &HashSet<&SubtopicId>,
) -> Replacement<'a> {
    let Some(old_subtopic) = hierarchy.subtopic(old) else {
        return Replacement::NotFound;
    };
    let Some(subject) = hierarchy.subject_of(old_subtopic) else {
        return Replacement::NotFound;
    };
    let name = normalize_text(&old_subtopic.name);

    let candidates: Vec<&Subtopic> = hierarchy
        .subtopics()
        .iter()
        .filter(|s| &s.id != old && !superseded.contains(&s.id))
        .filter(|s| normalize_text(&s.name) == name)
        .filter(|s| hierarchy.subject_of(s) == Some(subject))
        .collect();

    let old_topic = topic_name(hierarchy, old_subtopic);
    let same_topic: Vec<&Subtopic> = candidates
        .iter()
        .copied()
        .filter(|s| old_topic.is_some() && topic_name(hierarchy, s) == old_topic)
        .collect();
    let candidates = if same_topic.is_empty() { candidates } else { same_topic };

    match candidates.as_slice() {
        [] => Replacement::NotFound,
        [only] => Replacement::Unique(*only),
        many => Replacement::Ambiguous(many.len()),
    }
}

/// Repoints content of superseded subtopics to their replacements.
///
/// An empty `superseded` list means "detect automatically"; repeated ids are
/// processed once. Subtopics with no
/// unique replacement are skipped and counted in `not_found`. A failed update
/// for one table is logged and the remaining tables are still processed.
pub fn remap_content(
    store: &dyn ContentStore,
    superseded: &[SubtopicId],
) -> Result<RemapOutcome, StoreError> {
    let hierarchy = store.hierarchy()?;
    let superseded = if superseded.is_empty() {
        let detected = detect_superseded(&hierarchy);
        info!(count = detected.len(), "detected superseded subtopics");
        detected
    } else {
        let mut seen = HashSet::new();
        superseded
            .iter()
            .filter(|id| seen.insert(*id))
            .cloned()
            .collect()
    };
    let excluded: HashSet<&SubtopicId> = superseded.iter().collect();

    let mut outcome = RemapOutcome::default();
    for old in &superseded {
        let new = match find_replacement(&hierarchy, old, &excluded) {
            Replacement::Unique(new) => new,
            Replacement::NotFound => {
                warn!(subtopic = %old, "no replacement subtopic found");
                outcome.not_found += 1;
                continue;
            }
            Replacement::Ambiguous(count) => {
                warn!(subtopic = %old, candidates = count, "ambiguous replacement, skipping");
                outcome.not_found += 1;
                continue;
            }
        };

        let mut rows_moved = 0;
        for kind in ContentKind::ALL {
            match store.reassign_subtopic(kind, old, &new.id) {
                Ok(n) => rows_moved += n,
                Err(e) => {
                    warn!(kind = %kind, from = %old, to = %new.id, error = %e, "reassign failed");
                    outcome.errors.push(format!("{} {old} -> {}: {e}", kind.table(), new.id));
                }
            }
        }

        let path = hierarchy.path(new);
        info!(from = %old, to = %new.id, rows = rows_moved, path = %path, "remapped subtopic");
        outcome.moves.push(RemapMove {
            from: old.clone(),
            to: new.id.clone(),
            path,
            rows_moved,
        });
    }

    Ok(outcome)
}
