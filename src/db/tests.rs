use super::*;
use crate::models::Difficulty;
use tempfile::tempdir;
use time::macros::datetime;

fn seeded() -> (Database, SubtopicId) {
    let db = Database::in_memory().unwrap();
    let subject = db.insert_subject("Biology").unwrap();
    let topic = db.insert_topic(&subject, "Cells").unwrap();
    let subtopic = db.insert_subtopic(&topic, "Osmosis", None).unwrap();
    (db, subtopic)
}

#[test]
fn in_memory_opens_successfully() {
    let result = Database::in_memory();
    assert!(result.is_ok());
}

#[test]
fn schema_tables_exist() {
    let db = Database::in_memory().unwrap();

    let tables: Vec<String> = db
        .connection()
        .prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
        .unwrap()
        .query_map([], |row| row.get(0))
        .unwrap()
        .filter_map(|r| r.ok())
        .collect();

    for table in ["subjects", "topics", "subtopics"] {
        assert!(tables.contains(&table.to_string()), "missing {table}");
    }
    for kind in ContentKind::ALL {
        assert!(tables.contains(&kind.table().to_string()), "missing {}", kind.table());
    }
}

#[test]
fn foreign_keys_enabled() {
    let db = Database::in_memory().unwrap();

    let fk_enabled: i32 = db
        .connection()
        .query_row("PRAGMA foreign_keys", [], |row| row.get(0))
        .unwrap();

    assert_eq!(fk_enabled, 1);
}

#[test]
fn content_must_reference_existing_subtopic() {
    let db = Database::in_memory().unwrap();

    let result = db.insert_content(&NewContent::new(ContentKind::Flashcard, "missing", "Q", "A"));

    assert!(result.is_err(), "foreign key should reject dangling subtopic_id");
}

#[test]
fn reopen_is_idempotent() {
    let dir = tempdir().unwrap();
    let db_path = dir.path().join("content.db");

    {
        let db = Database::open(&db_path).unwrap();
        db.insert_subject("Physics").unwrap();
    }

    let db2 = Database::open(&db_path).unwrap();
    let hierarchy = db2.hierarchy().unwrap();
    assert!(hierarchy.subtopics().is_empty());

    let count: i64 = db2
        .connection()
        .query_row("SELECT COUNT(*) FROM subjects", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 1);
}

#[test]
fn hierarchy_resolves_paths() {
    let (db, subtopic) = seeded();

    let hierarchy = db.hierarchy().unwrap();
    let sub = hierarchy.subtopic(&subtopic).unwrap();

    assert_eq!(hierarchy.path(sub), "Biology > Cells > Osmosis");
    assert_eq!(sub.slug, "osmosis");
    assert!(sub.created_at.is_some());
}

#[test]
fn hierarchy_reads_learning_objectives_json() {
    let (db, subtopic) = seeded();
    db.connection()
        .execute(
            "UPDATE subtopics SET learning_objectives = ?1 WHERE id = ?2",
            params![r#"["Define osmosis","Describe turgor"]"#, subtopic.as_str()],
        )
        .unwrap();

    let hierarchy = db.hierarchy().unwrap();
    let sub = hierarchy.subtopic(&subtopic).unwrap();

    assert_eq!(sub.learning_objectives, vec!["Define osmosis", "Describe turgor"]);
}

#[test]
fn has_content_checks_one_table_per_kind() {
    let (db, subtopic) = seeded();
    db.insert_content(&NewContent::new(ContentKind::Note, subtopic.clone(), "Osmosis", "..."))
        .unwrap();

    assert!(db.has_content(ContentKind::Note, &subtopic).unwrap());
    assert!(!db.has_content(ContentKind::Flashcard, &subtopic).unwrap());
}

#[test]
fn list_content_returns_oldest_first() {
    let (db, subtopic) = seeded();
    let newer = db
        .insert_content(
            &NewContent::new(ContentKind::Flashcard, subtopic.clone(), "Q2", "A2")
                .created_at(datetime!(2024-02-01 0:00 UTC)),
        )
        .unwrap();
    let older = db
        .insert_content(
            &NewContent::new(ContentKind::Flashcard, subtopic.clone(), "Q1", "A1")
                .difficulty(Difficulty::Hard)
                .created_at(datetime!(2024-01-01 0:00 UTC)),
        )
        .unwrap();

    let rows = db.list_content(ContentKind::Flashcard).unwrap();

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].id, older);
    assert_eq!(rows[0].difficulty, Difficulty::Hard);
    assert_eq!(rows[1].id, newer);
}

#[test]
fn list_content_orders_postgres_timestamps_by_instant() {
    let (db, subtopic) = seeded();
    db.connection()
        .execute_batch(&format!(
            "INSERT INTO notes (id, subtopic_id, title, created_at) VALUES
                ('late', '{s}', 'B', '2024-01-01 12:00:00+02'),
                ('early', '{s}', 'A', '2024-01-01T09:00:00Z');",
            s = subtopic
        ))
        .unwrap();

    let rows = db.list_content(ContentKind::Note).unwrap();

    let ids: Vec<&str> = rows.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["early", "late"]);
}

#[test]
fn delete_content_removes_only_listed_ids() {
    let (db, subtopic) = seeded();
    let keep = db
        .insert_content(&NewContent::new(ContentKind::RecallPrompt, subtopic.clone(), "a", ""))
        .unwrap();
    let drop1 = db
        .insert_content(&NewContent::new(ContentKind::RecallPrompt, subtopic.clone(), "b", ""))
        .unwrap();
    let drop2 = db
        .insert_content(&NewContent::new(ContentKind::RecallPrompt, subtopic.clone(), "c", ""))
        .unwrap();

    let deleted = db
        .delete_content(ContentKind::RecallPrompt, &[drop1, drop2, RowId::new("nope")])
        .unwrap();

    assert_eq!(deleted, 2);
    let remaining = db.list_content(ContentKind::RecallPrompt).unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id, keep);
}

#[test]
fn delete_content_with_no_ids_is_a_no_op() {
    let (db, _) = seeded();
    assert_eq!(db.delete_content(ContentKind::Note, &[]).unwrap(), 0);
}

#[test]
fn reassign_subtopic_moves_rows() {
    let (db, old) = seeded();
    let hierarchy = db.hierarchy().unwrap();
    let topic = hierarchy.subtopic(&old).unwrap().topic_id.clone();
    let new = db.insert_subtopic(&topic, "Osmosis", None).unwrap();
    db.insert_content(&NewContent::new(ContentKind::QuizQuestion, old.clone(), "Q", "A"))
        .unwrap();
    db.insert_content(&NewContent::new(ContentKind::QuizQuestion, old.clone(), "Q2", "A2"))
        .unwrap();

    let moved = db
        .reassign_subtopic(ContentKind::QuizQuestion, &old, &new)
        .unwrap();

    assert_eq!(moved, 2);
    assert!(!db.has_content(ContentKind::QuizQuestion, &old).unwrap());
    assert!(db.has_content(ContentKind::QuizQuestion, &new).unwrap());
}

#[test]
fn count_content_counts_whole_table() {
    let (db, subtopic) = seeded();
    for i in 0..3 {
        db.insert_content(&NewContent::new(
            ContentKind::PracticeQuestion,
            subtopic.clone(),
            format!("Q{i}"),
            "",
        ))
        .unwrap();
    }

    assert_eq!(db.count_content(ContentKind::PracticeQuestion).unwrap(), 3);
    assert_eq!(db.count_content(ContentKind::Note).unwrap(), 0);
}

#[test]
fn execute_statement_runs_raw_sql() {
    let db = Database::in_memory().unwrap();

    db.execute_statement("INSERT INTO subjects (id, name, slug) VALUES ('s', 'Maths', 'maths')")
        .unwrap();

    let hierarchy = db.hierarchy().unwrap();
    assert_eq!(hierarchy.subject(&"s".into()).unwrap().name, "Maths");
}

#[test]
fn execute_statement_surfaces_sql_errors() {
    let db = Database::in_memory().unwrap();

    let err = db.execute_statement("INSERT INTO nowhere VALUES (1)").unwrap_err();

    assert!(err.to_string().contains("no such table"));
}
