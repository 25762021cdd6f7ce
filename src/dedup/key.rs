use crate::models::{ContentRow, SubtopicId};

/// Identity of a content row for duplicate detection.
///
/// Two rows are duplicates when they hang off the same subtopic and their
/// defining text fields are equal after normalization. The key is hashed as a
/// structured value, so text containing any separator sequence cannot collide
/// with a different split of fields.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DedupKey {
    pub subtopic_id: SubtopicId,
    pub fields: Vec<String>,
}

impl DedupKey {
    /// Builds the key for a row from its kind's defining fields.
    ///
    /// # Examples
    ///
    /// ```
    /// use revkit::dedup::DedupKey;
    /// use revkit::models::{ContentKind, ContentRow, Difficulty};
    /// use time::macros::datetime;
    ///
    /// let row = ContentRow {
    ///     id: "r1".into(),
    ///     kind: ContentKind::Flashcard,
    ///     subtopic_id: "s1".into(),
    ///     primary: "  What is ATP? ".into(),
    ///     secondary: "Energy CURRENCY".into(),
    ///     difficulty: Difficulty::Easy,
    ///     created_at: datetime!(2024-01-01 0:00 UTC),
    /// };
    ///
    /// let key = DedupKey::for_row(&row);
    /// assert_eq!(key.fields, vec!["what is atp?", "energy currency"]);
    /// ```
    pub fn for_row(row: &ContentRow) -> Self {
        let texts = [&row.primary, &row.secondary];
        Self {
            subtopic_id: row.subtopic_id.clone(),
            fields: texts
                .into_iter()
                .take(row.kind.dedup_field_count())
                .map(|text| normalize_text(text))
                .collect(),
        }
    }
}

/// Lower-cases and trims a text field.
pub fn normalize_text(text: &str) -> String {
    text.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ContentKind, Difficulty};
    use time::macros::datetime;

    fn row(kind: ContentKind, subtopic: &str, primary: &str, secondary: &str) -> ContentRow {
        ContentRow {
            id: "r".into(),
            kind,
            subtopic_id: subtopic.into(),
            primary: primary.into(),
            secondary: secondary.into(),
            difficulty: Difficulty::Medium,
            created_at: datetime!(2024-01-01 0:00 UTC),
        }
    }

    #[test]
    fn keys_ignore_case_and_surrounding_whitespace() {
        let a = DedupKey::for_row(&row(ContentKind::Flashcard, "s1", "Q1", "A1"));
        let b = DedupKey::for_row(&row(ContentKind::Flashcard, "s1", " q1\n", "a1 "));
        assert_eq!(a, b);
    }

    #[test]
    fn keys_differ_across_subtopics() {
        let a = DedupKey::for_row(&row(ContentKind::Flashcard, "s1", "Q1", "A1"));
        let b = DedupKey::for_row(&row(ContentKind::Flashcard, "s2", "Q1", "A1"));
        assert_ne!(a, b);
    }

    #[test]
    fn separator_text_cannot_forge_a_collision() {
        let a = DedupKey::for_row(&row(ContentKind::Flashcard, "s1", "a|||b", "c"));
        let b = DedupKey::for_row(&row(ContentKind::Flashcard, "s1", "a", "b|||c"));
        assert_ne!(a, b);
    }

    #[test]
    fn single_field_kinds_ignore_secondary_text() {
        let a = DedupKey::for_row(&row(ContentKind::PracticeQuestion, "s1", "Define pH", "x"));
        let b = DedupKey::for_row(&row(ContentKind::PracticeQuestion, "s1", "define ph", "y"));
        assert_eq!(a, b);
        assert_eq!(a.fields.len(), 1);
    }

    #[test]
    fn inner_whitespace_is_significant() {
        assert_ne!(normalize_text("a  b"), normalize_text("a b"));
    }
}
