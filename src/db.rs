mod schema;

use std::path::Path;

use anyhow::Result;
use rusqlite::{Connection, params, params_from_iter};
use time::OffsetDateTime;
use tracing::warn;

use crate::models::{
    ContentKind, ContentRow, Difficulty, Hierarchy, NewContent, RowId, Subject, SubjectId, Subtopic,
    SubtopicId, Topic, TopicId,
};
use crate::store::{ContentStore, StoreError};
use crate::utils::{format_timestamp, parse_timestamp, slugify};

use schema::INITIAL_SCHEMA;

/// SQLite bounds the number of bound parameters per statement.
const DELETE_BATCH: usize = 500;

/// Local SQLite content store.
///
/// Mirrors the hosted schema so SQL dumps can be imported and every
/// maintenance operation can run offline.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Opens an in-memory SQLite database.
    ///
    /// Automatically initializes the schema on connection open.
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.initialize_schema()?;
        Ok(db)
    }

    /// Opens a file-based SQLite database at the given path.
    ///
    /// Creates the database file if it does not exist.
    /// Automatically initializes the schema on connection open.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.initialize_schema()?;
        Ok(db)
    }

    /// Initializes the database schema.
    ///
    /// Uses IF NOT EXISTS for idempotent execution.
    fn initialize_schema(&self) -> Result<()> {
        self.conn.execute("PRAGMA foreign_keys = ON", [])?;
        self.conn.execute_batch(INITIAL_SCHEMA)?;
        Ok(())
    }

    /// Returns a reference to the underlying connection.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Inserts a subject; the slug is derived from the name.
    pub fn insert_subject(&self, name: &str) -> Result<SubjectId, StoreError> {
        let id: String = self.conn.query_row(
            "INSERT INTO subjects (name, slug) VALUES (?1, ?2) RETURNING id",
            params![name, slugify(name)],
            |row| row.get(0),
        )?;
        Ok(SubjectId::new(id))
    }

    /// Inserts a topic under `subject`.
    pub fn insert_topic(&self, subject: &SubjectId, name: &str) -> Result<TopicId, StoreError> {
        let id: String = self.conn.query_row(
            "INSERT INTO topics (name, slug, subject_id) VALUES (?1, ?2, ?3) RETURNING id",
            params![name, slugify(name), subject.as_str()],
            |row| row.get(0),
        )?;
        Ok(TopicId::new(id))
    }

    /// Inserts a subtopic under `topic`.
    ///
    /// `created_at` defaults to the current time when `None`.
    pub fn insert_subtopic(
        &self,
        topic: &TopicId,
        name: &str,
        created_at: Option<OffsetDateTime>,
    ) -> Result<SubtopicId, StoreError> {
        let created_at = format_timestamp(created_at.unwrap_or_else(OffsetDateTime::now_utc));
        let id: String = self.conn.query_row(
            "INSERT INTO subtopics (name, slug, topic_id, created_at)
             VALUES (?1, ?2, ?3, ?4) RETURNING id",
            params![name, slugify(name), topic.as_str(), created_at],
            |row| row.get(0),
        )?;
        Ok(SubtopicId::new(id))
    }

    /// Inserts a content row, returning its generated id.
    pub fn insert_content(&self, content: &NewContent) -> Result<RowId, StoreError> {
        let [first, second] = content.kind.text_fields();
        let created_at = format_timestamp(content.created_at.unwrap_or_else(OffsetDateTime::now_utc));
        let sql = format!(
            "INSERT INTO {} (subtopic_id, {first}, {second}, difficulty, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5) RETURNING id",
            content.kind.table()
        );
        let id: String = self.conn.query_row(
            &sql,
            params![
                content.subtopic_id.as_str(),
                content.primary,
                content.secondary,
                content.difficulty.as_str(),
                created_at
            ],
            |row| row.get(0),
        )?;
        Ok(RowId::new(id))
    }

    fn load_subjects(&self) -> Result<Vec<Subject>, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, slug FROM subjects ORDER BY name")?;
        let subjects = stmt.query_map([], |row| {
            Ok(Subject {
                id: SubjectId::new(row.get::<_, String>(0)?),
                name: row.get(1)?,
                slug: row.get(2)?,
            })
        })?;
        subjects.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    fn load_topics(&self) -> Result<Vec<Topic>, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, slug, subject_id FROM topics ORDER BY name")?;
        let topics = stmt.query_map([], |row| {
            Ok(Topic {
                id: TopicId::new(row.get::<_, String>(0)?),
                name: row.get(1)?,
                slug: row.get(2)?,
                subject_id: SubjectId::new(row.get::<_, String>(3)?),
            })
        })?;
        topics.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    fn load_subtopics(&self) -> Result<Vec<Subtopic>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, slug, topic_id, description, learning_objectives, created_at
             FROM subtopics ORDER BY name, created_at",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, Option<String>>(4)?,
                row.get::<_, String>(5)?,
                row.get::<_, String>(6)?,
            ))
        })?;

        let mut subtopics = Vec::new();
        for row_result in rows {
            let (id, name, slug, topic_id, description, objectives, created_at) = row_result?;
            let learning_objectives: Vec<String> = match serde_json::from_str(&objectives) {
                Ok(list) => list,
                Err(e) => {
                    warn!(subtopic = %id, error = %e, "ignoring unreadable learning_objectives");
                    Vec::new()
                }
            };
            subtopics.push(Subtopic {
                created_at: parse_timestamp(&created_at),
                id: SubtopicId::new(id),
                name,
                slug,
                topic_id: TopicId::new(topic_id),
                description,
                learning_objectives,
            });
        }
        Ok(subtopics)
    }
}

impl ContentStore for Database {
    fn hierarchy(&self) -> Result<Hierarchy, StoreError> {
        Ok(Hierarchy::new(
            self.load_subjects()?,
            self.load_topics()?,
            self.load_subtopics()?,
        ))
    }

    fn has_content(&self, kind: ContentKind, subtopic: &SubtopicId) -> Result<bool, StoreError> {
        let sql = format!(
            "SELECT EXISTS(SELECT 1 FROM {} WHERE subtopic_id = ?1 LIMIT 1)",
            kind.table()
        );
        let exists: bool = self
            .conn
            .query_row(&sql, [subtopic.as_str()], |row| row.get(0))?;
        Ok(exists)
    }

    fn count_content(&self, kind: ContentKind) -> Result<u64, StoreError> {
        let sql = format!("SELECT COUNT(*) FROM {}", kind.table());
        let count: i64 = self.conn.query_row(&sql, [], |row| row.get(0))?;
        Ok(count.max(0) as u64)
    }

    fn list_content(&self, kind: ContentKind) -> Result<Vec<ContentRow>, StoreError> {
        let [first, second] = kind.text_fields();
        let sql = format!(
            "SELECT id, subtopic_id, {first}, {second}, difficulty, created_at
             FROM {} ORDER BY created_at, rowid",
            kind.table()
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, String>(4)?,
                row.get::<_, String>(5)?,
            ))
        })?;

        let mut content = Vec::new();
        for row_result in rows {
            let (id, subtopic_id, primary, secondary, difficulty, raw_created_at) = row_result?;
            let Some(created_at) = parse_timestamp(&raw_created_at) else {
                warn!(
                    table = kind.table(),
                    id = %id,
                    created_at = %raw_created_at,
                    "skipping row with unreadable created_at"
                );
                continue;
            };
            let difficulty = match difficulty.parse::<Difficulty>() {
                Ok(difficulty) => difficulty,
                Err(e) => {
                    warn!(
                        table = kind.table(),
                        id = %id,
                        error = %e,
                        "skipping row with unreadable difficulty"
                    );
                    continue;
                }
            };
            content.push(ContentRow {
                difficulty,
                id: RowId::new(id),
                kind,
                subtopic_id: SubtopicId::new(subtopic_id),
                primary,
                secondary,
                created_at,
            });
        }

        // Text ordering can disagree with time ordering across offsets
        content.sort_by_key(|row| row.created_at);
        Ok(content)
    }

    fn delete_content(&self, kind: ContentKind, ids: &[RowId]) -> Result<usize, StoreError> {
        if ids.is_empty() {
            return Ok(0);
        }

        let tx = self.conn.unchecked_transaction()?;
        let mut deleted = 0;
        for batch in ids.chunks(DELETE_BATCH) {
            let placeholders = vec!["?"; batch.len()].join(", ");
            let sql = format!(
                "DELETE FROM {} WHERE id IN ({placeholders})",
                kind.table()
            );
            deleted += tx.execute(&sql, params_from_iter(batch.iter().map(RowId::as_str)))?;
        }
        tx.commit()?;
        Ok(deleted)
    }

    fn reassign_subtopic(
        &self,
        kind: ContentKind,
        from: &SubtopicId,
        to: &SubtopicId,
    ) -> Result<usize, StoreError> {
        let sql = format!(
            "UPDATE {} SET subtopic_id = ?2 WHERE subtopic_id = ?1",
            kind.table()
        );
        Ok(self.conn.execute(&sql, params![from.as_str(), to.as_str()])?)
    }

    fn execute_statement(&self, sql: &str) -> Result<(), StoreError> {
        self.conn.execute_batch(sql)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests;
