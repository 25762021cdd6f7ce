use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::{ContentKind, Difficulty, RowId, SubtopicId};

/// A single row from one of the content tables.
///
/// The two text columns are exposed positionally; `kind.text_fields()` names
/// them (e.g. `front`/`back` for flashcards).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentRow {
    pub id: RowId,
    pub kind: ContentKind,
    pub subtopic_id: SubtopicId,
    pub primary: String,
    pub secondary: String,
    pub difficulty: Difficulty,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl ContentRow {
    /// Returns the text fields in column order alongside their column names.
    pub fn text_fields(&self) -> [(&'static str, &str); 2] {
        let [first, second] = self.kind.text_fields();
        [(first, &self.primary), (second, &self.secondary)]
    }
}

/// A content row to be inserted; the store assigns the id.
///
/// # Examples
///
/// ```
/// use revkit::models::{ContentKind, Difficulty, NewContent};
///
/// let card = NewContent::new(ContentKind::Flashcard, "s1", "Q1", "A1")
///     .difficulty(Difficulty::Hard);
///
/// assert_eq!(card.primary, "Q1");
/// assert_eq!(card.difficulty, Difficulty::Hard);
/// assert!(card.created_at.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewContent {
    pub kind: ContentKind,
    pub subtopic_id: SubtopicId,
    pub primary: String,
    pub secondary: String,
    pub difficulty: Difficulty,
    pub created_at: Option<OffsetDateTime>,
}

impl NewContent {
    pub fn new(
        kind: ContentKind,
        subtopic_id: impl Into<SubtopicId>,
        primary: impl Into<String>,
        secondary: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            subtopic_id: subtopic_id.into(),
            primary: primary.into(),
            secondary: secondary.into(),
            difficulty: Difficulty::default(),
            created_at: None,
        }
    }

    /// Sets the difficulty rating.
    pub fn difficulty(mut self, difficulty: Difficulty) -> Self {
        self.difficulty = difficulty;
        self
    }

    /// Sets an explicit creation timestamp instead of the store's default.
    pub fn created_at(mut self, created_at: OffsetDateTime) -> Self {
        self.created_at = Some(created_at);
        self
    }
}
