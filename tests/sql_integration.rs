use std::fs;

use anyhow::Result;
use revkit::models::ContentKind;
use revkit::sql::{import_file, split_statements, write_chunks};
use revkit::{ContentStore, Database};
use tempfile::TempDir;

fn seed_script(cards: usize) -> String {
    let mut sql = String::from(
        "-- seed biology\n\
         INSERT INTO subjects (id, name, slug) VALUES ('sub-bio', 'Biology', 'biology');\n\
         INSERT INTO topics (id, name, slug, subject_id) VALUES ('top-cells', 'Cells', 'cells', 'sub-bio');\n\
         INSERT INTO subtopics (id, name, slug, topic_id) VALUES ('st-osm', 'Osmosis', 'osmosis', 'top-cells');\n",
    );
    for i in 0..cards {
        sql.push_str(&format!(
            "INSERT INTO flashcards (subtopic_id, front, back) VALUES ('st-osm', 'Card {i}; part', 'It''s answer {i}');\n"
        ));
    }
    sql
}

#[test]
fn test_chunks_reproduce_original_statement_sequence() -> Result<()> {
    // Arrange
    let dir = TempDir::new()?;
    let input = dir.path().join("seed.sql");
    let script = seed_script(22);
    fs::write(&input, &script)?;
    let out_dir = dir.path().join("chunks");

    // Act
    let written = write_chunks(&input, Some(&out_dir), 10)?;

    // Assert: 25 statements in batches of 10
    assert_eq!(written.len(), 3);
    assert!(written[0].ends_with("seed_part1.sql"));
    assert!(written[2].ends_with("seed_part3.sql"));

    let mut rejoined = Vec::new();
    for path in &written {
        let chunk = split_statements(&fs::read_to_string(path)?)?;
        assert!(chunk.len() <= 10);
        rejoined.extend(chunk);
    }
    assert_eq!(rejoined, split_statements(&script)?);
    Ok(())
}

#[test]
fn test_zero_batch_size_is_rejected() -> Result<()> {
    let dir = TempDir::new()?;
    let input = dir.path().join("seed.sql");
    fs::write(&input, seed_script(1))?;

    assert!(write_chunks(&input, None, 0).is_err());
    Ok(())
}

#[test]
fn test_import_then_reimport_reports_benign_failures() -> Result<()> {
    let dir = TempDir::new()?;
    let input = dir.path().join("seed.sql");
    fs::write(&input, seed_script(5))?;
    let db = Database::in_memory()?;

    let first = import_file(&db, &input)?;
    assert_eq!(first.total, 8);
    assert_eq!(first.executed, 8);
    assert!(first.failures.is_empty());
    assert_eq!(db.count_content(ContentKind::Flashcard)?, 5);

    // Hierarchy rows collide on their primary keys; flashcards get fresh ids
    let second = import_file(&db, &input)?;
    assert_eq!(second.benign_failures(), 3);
    assert_eq!(second.real_failures().count(), 0);
    assert_eq!(db.count_content(ContentKind::Flashcard)?, 10);
    Ok(())
}

#[test]
fn test_unterminated_script_fails_to_import() -> Result<()> {
    let dir = TempDir::new()?;
    let input = dir.path().join("broken.sql");
    fs::write(&input, "INSERT INTO notes (title) VALUES ('oops);")?;
    let db = Database::in_memory()?;

    assert!(import_file(&db, &input).is_err());
    Ok(())
}
