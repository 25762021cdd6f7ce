use anyhow::Result;
use revkit::Database;
use revkit::coverage::audit_coverage;
use revkit::models::{ContentKind, NewContent, SubtopicId};

fn add(db: &Database, sub: &SubtopicId, kind: ContentKind) -> Result<()> {
    db.insert_content(&NewContent::new(kind, sub.clone(), "Some real text", "More text"))?;
    Ok(())
}

#[test]
fn test_coverage_reports_missing_kinds_per_subtopic() -> Result<()> {
    // Arrange: one complete subtopic, one partial, one empty
    let db = Database::in_memory()?;
    let subject = db.insert_subject("Physics")?;
    let topic = db.insert_topic(&subject, "Waves")?;
    let complete = db.insert_subtopic(&topic, "Reflection", None)?;
    let partial = db.insert_subtopic(&topic, "Refraction", None)?;
    let empty = db.insert_subtopic(&topic, "Diffraction", None)?;

    for kind in ContentKind::REQUIRED {
        add(&db, &complete, kind)?;
    }
    add(&db, &partial, ContentKind::Flashcard)?;
    add(&db, &partial, ContentKind::Note)?;
    // Quiz questions alone do not count towards coverage
    add(&db, &empty, ContentKind::QuizQuestion)?;

    // Act
    let report = audit_coverage(&db)?;

    // Assert
    assert_eq!(report.total_subtopics, 3);
    assert_eq!(report.complete_subtopics(), 1);
    assert!(report.gap_for(&complete).is_none());

    let partial_gap = report.gap_for(&partial).expect("partial subtopic has a gap");
    assert_eq!(
        partial_gap.missing,
        vec![ContentKind::PracticeQuestion, ContentKind::RecallPrompt]
    );
    assert_eq!(partial_gap.path, "Physics > Waves > Refraction");

    let empty_gap = report.gap_for(&empty).expect("empty subtopic has a gap");
    assert_eq!(empty_gap.missing.len(), ContentKind::REQUIRED.len());

    assert_eq!(report.content_totals[&ContentKind::Flashcard], 2);
    assert_eq!(report.content_totals[&ContentKind::QuizQuestion], 1);
    assert!(report.errors.is_empty());
    Ok(())
}

#[test]
fn test_empty_hierarchy_has_no_gaps() -> Result<()> {
    let db = Database::in_memory()?;

    let report = audit_coverage(&db)?;

    assert_eq!(report.total_subtopics, 0);
    assert!(report.gaps.is_empty());
    Ok(())
}
