use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A category of study material attached to subtopics.
///
/// Each kind lives in its own table and carries two free-text columns. The
/// first one or two of those columns define the row's identity for duplicate
/// detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    Flashcard,
    PracticeQuestion,
    RecallPrompt,
    Note,
    QuizQuestion,
}

impl ContentKind {
    /// Every content kind, in table order.
    pub const ALL: [ContentKind; 5] = [
        Self::Flashcard,
        Self::PracticeQuestion,
        Self::RecallPrompt,
        Self::Note,
        Self::QuizQuestion,
    ];

    /// Kinds a subtopic must have at least one row of to count as complete.
    pub const REQUIRED: [ContentKind; 4] = [
        Self::Flashcard,
        Self::PracticeQuestion,
        Self::RecallPrompt,
        Self::Note,
    ];

    /// Name of the table holding rows of this kind.
    pub fn table(self) -> &'static str {
        match self {
            Self::Flashcard => "flashcards",
            Self::PracticeQuestion => "practice_questions",
            Self::RecallPrompt => "recall_prompts",
            Self::Note => "notes",
            Self::QuizQuestion => "quiz_questions",
        }
    }

    /// The two free-text columns, primary first.
    pub fn text_fields(self) -> [&'static str; 2] {
        match self {
            Self::Flashcard => ["front", "back"],
            Self::PracticeQuestion => ["question", "answer"],
            Self::RecallPrompt => ["prompt", "answer"],
            Self::Note => ["title", "content"],
            Self::QuizQuestion => ["question", "answer"],
        }
    }

    /// How many leading text fields make up the duplicate-detection key.
    pub fn dedup_field_count(self) -> usize {
        match self {
            Self::Flashcard => 2,
            _ => 1,
        }
    }

    pub fn is_required(self) -> bool {
        Self::REQUIRED.contains(&self)
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Flashcard => "flashcard",
            Self::PracticeQuestion => "practice question",
            Self::RecallPrompt => "recall prompt",
            Self::Note => "note",
            Self::QuizQuestion => "quiz question",
        };
        f.write_str(label)
    }
}

/// Error returned when a content kind name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown content kind '{0}' (expected one of: flashcards, practice_questions, recall_prompts, notes, quiz_questions)")]
pub struct UnknownContentKind(pub String);

impl FromStr for ContentKind {
    type Err = UnknownContentKind;

    /// Accepts either the table name or the singular kind name, with hyphens
    /// or underscores, in any case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|kind| {
                let singular = kind.table().trim_end_matches('s');
                normalized == kind.table() || normalized == singular
            })
            .ok_or_else(|| UnknownContentKind(s.to_string()))
    }
}
