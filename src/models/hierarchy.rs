use std::collections::HashMap;

use serde::{Deserialize, Deserializer, Serialize};
use time::OffsetDateTime;

use super::{SubjectId, SubtopicId, TopicId};

/// Root category of the syllabus (e.g. "Biology").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    pub id: SubjectId,
    pub name: String,
    pub slug: String,
}

/// A topic within exactly one subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topic {
    pub id: TopicId,
    pub name: String,
    pub slug: String,
    pub subject_id: SubjectId,
}

/// Leaf of the syllabus hierarchy; all content rows attach here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subtopic {
    pub id: SubtopicId,
    pub name: String,
    pub slug: String,
    pub topic_id: TopicId,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub learning_objectives: Vec<String>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub created_at: Option<OffsetDateTime>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

/// The full Subject → Topic → Subtopic tree as loaded from a store.
///
/// Subtopics keep the order they were loaded in; subjects and topics are
/// indexed by id for ancestor lookups.
#[derive(Debug, Clone, Default)]
pub struct Hierarchy {
    subjects: HashMap<SubjectId, Subject>,
    topics: HashMap<TopicId, Topic>,
    subtopics: Vec<Subtopic>,
}

impl Hierarchy {
    pub fn new(subjects: Vec<Subject>, topics: Vec<Topic>, subtopics: Vec<Subtopic>) -> Self {
        Self {
            subjects: subjects.into_iter().map(|s| (s.id.clone(), s)).collect(),
            topics: topics.into_iter().map(|t| (t.id.clone(), t)).collect(),
            subtopics,
        }
    }

    pub fn subtopics(&self) -> &[Subtopic] {
        &self.subtopics
    }

    pub fn subtopic(&self, id: &SubtopicId) -> Option<&Subtopic> {
        self.subtopics.iter().find(|s| &s.id == id)
    }

    pub fn topic(&self, id: &TopicId) -> Option<&Topic> {
        self.topics.get(id)
    }

    pub fn subject(&self, id: &SubjectId) -> Option<&Subject> {
        self.subjects.get(id)
    }

    /// Resolves the subject a subtopic belongs to by joining through its topic.
    pub fn subject_of(&self, subtopic: &Subtopic) -> Option<&SubjectId> {
        self.topics.get(&subtopic.topic_id).map(|t| &t.subject_id)
    }

    /// Human-readable "Subject > Topic > Subtopic" path.
    ///
    /// Ancestors that cannot be resolved are rendered as `?`.
    pub fn path(&self, subtopic: &Subtopic) -> String {
        let topic = self.topics.get(&subtopic.topic_id);
        let subject = topic.and_then(|t| self.subjects.get(&t.subject_id));

        format!(
            "{} > {} > {}",
            subject.map_or("?", |s| s.name.as_str()),
            topic.map_or("?", |t| t.name.as_str()),
            subtopic.name
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Hierarchy {
        Hierarchy::new(
            vec![Subject {
                id: "bio".into(),
                name: "Biology".into(),
                slug: "biology".into(),
            }],
            vec![Topic {
                id: "cells".into(),
                name: "Cells".into(),
                slug: "cells".into(),
                subject_id: "bio".into(),
            }],
            vec![
                Subtopic {
                    id: "mito".into(),
                    name: "Mitochondria".into(),
                    slug: "mitochondria".into(),
                    topic_id: "cells".into(),
                    description: None,
                    learning_objectives: vec![],
                    created_at: None,
                },
                Subtopic {
                    id: "lost".into(),
                    name: "Orphan".into(),
                    slug: "orphan".into(),
                    topic_id: "gone".into(),
                    description: None,
                    learning_objectives: vec![],
                    created_at: None,
                },
            ],
        )
    }

    #[test]
    fn path_joins_all_three_levels() {
        let h = sample();
        let sub = h.subtopic(&"mito".into()).unwrap();
        assert_eq!(h.path(sub), "Biology > Cells > Mitochondria");
    }

    #[test]
    fn path_marks_unresolved_ancestors() {
        let h = sample();
        let sub = h.subtopic(&"lost".into()).unwrap();
        assert_eq!(h.path(sub), "? > ? > Orphan");
        assert_eq!(h.subject_of(sub), None);
    }

    #[test]
    fn subtopic_deserializes_null_objectives_as_empty() {
        let json = r#"{
            "id": "s1", "name": "Osmosis", "slug": "osmosis", "topic_id": "t1",
            "description": null, "learning_objectives": null,
            "created_at": "2024-03-01T10:00:00Z"
        }"#;
        let sub: Subtopic = serde_json::from_str(json).unwrap();
        assert!(sub.learning_objectives.is_empty());
        assert!(sub.created_at.is_some());
    }
}
