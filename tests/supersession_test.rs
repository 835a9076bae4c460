mod helpers;

use helpers::{embedding_at_similarity, insert_learning, test_db, test_embedding};
use mnemo::error::MnemoError;
use mnemo::memory::recall::recall;
use mnemo::memory::stats::memory_stats;
use mnemo::memory::store::{store_learning, StoreOutcome};
use mnemo::memory::supersede::{supersede, SupersedeOutcome};
use mnemo::memory::types::LearningDraft;

#[test]
fn full_lifecycle_store_recall_supersede() {
    let mut conn = test_db();

    // Store learning A and recall it with a nearby query vector
    let a = insert_learning(
        &mut conn,
        "preference",
        "Use 4-space indentation",
        &test_embedding(0),
    );
    let query = embedding_at_similarity(0.85);
    let response = recall(&conn, &query, 0.5, 5).unwrap();
    assert_eq!(response.count, 1);
    assert_eq!(response.memories[0].id, a);
    assert!(response.memories[0].similarity >= 0.5);

    // Store B superseding A
    let draft_b = LearningDraft {
        learning_type: "preference".to_string(),
        content: "Use tabs for indentation".to_string(),
        supersedes: Some(a),
        ..Default::default()
    };
    let b = match store_learning(&mut conn, &draft_b, &embedding_at_similarity(0.7), 0.92).unwrap() {
        StoreOutcome::Stored { id } => id,
        other => panic!("unexpected {other:?}"),
    };

    // Recall now excludes A and includes B
    let response = recall(&conn, &query, 0.3, 5).unwrap();
    let ids: Vec<i64> = response.memories.iter().map(|m| m.id).collect();
    assert!(!ids.contains(&a), "superseded learning must not be recalled");
    assert!(ids.contains(&b));

    // Stats reflect the supersession
    let stats = memory_stats(&conn, None).unwrap();
    assert_eq!(stats.total_learnings, 2);
    assert!(stats.superseded_learnings >= 1);
    assert_eq!(
        stats.active_learnings,
        stats.total_learnings - stats.superseded_learnings
    );
}

#[test]
fn explicit_supersede_is_idempotent_by_report() {
    let mut conn = test_db();
    let a = insert_learning(&mut conn, "fact", "v1", &test_embedding(0));
    let b = insert_learning(&mut conn, "fact", "v2", &test_embedding(1));
    let c = insert_learning(&mut conn, "fact", "v3", &test_embedding(2));

    assert_eq!(
        supersede(&conn, a, b).unwrap(),
        SupersedeOutcome::Superseded { old_id: a, new_id: b }
    );

    // Repeat with the same target
    assert_eq!(
        supersede(&conn, a, b).unwrap(),
        SupersedeOutcome::AlreadySuperseded { old_id: a, superseded_by: b }
    );

    // Repeat with a different target — still reports the original
    assert_eq!(
        supersede(&conn, a, c).unwrap(),
        SupersedeOutcome::AlreadySuperseded { old_id: a, superseded_by: b }
    );
}

#[test]
fn self_supersession_is_a_conflict() {
    let mut conn = test_db();
    let a = insert_learning(&mut conn, "fact", "v1", &test_embedding(0));
    assert!(matches!(
        supersede(&conn, a, a),
        Err(MnemoError::SelfSupersession(id)) if id == a
    ));
}

#[test]
fn supersede_unknown_ids_is_not_found() {
    let mut conn = test_db();
    let a = insert_learning(&mut conn, "fact", "v1", &test_embedding(0));
    assert!(matches!(supersede(&conn, 404, a), Err(MnemoError::NotFound(404))));
    assert!(matches!(supersede(&conn, a, 404), Err(MnemoError::NotFound(404))));
}

#[test]
fn superseded_learning_still_visible_to_duplicate_scan() {
    let mut conn = test_db();
    let a = insert_learning(&mut conn, "fact", "old version", &test_embedding(0));
    let b = insert_learning(&mut conn, "fact", "new version", &test_embedding(1));
    supersede(&conn, a, b).unwrap();

    // Recall excludes A...
    let recalled = recall(&conn, &test_embedding(0), 0.5, 5).unwrap();
    assert!(recalled.memories.iter().all(|m| m.id != a));

    // ...but a candidate matching A is still rejected as a duplicate.
    let draft = LearningDraft {
        learning_type: "fact".to_string(),
        content: "old version resubmitted".to_string(),
        ..Default::default()
    };
    let outcome = store_learning(&mut conn, &draft, &test_embedding(0), 0.92).unwrap();
    match outcome {
        StoreOutcome::Duplicate { existing_id, .. } => assert_eq!(existing_id, a),
        other => panic!("expected duplicate against superseded row, got {other:?}"),
    }
}

#[test]
fn creation_time_supersedes_missing_target_keeps_new_learning() {
    let mut conn = test_db();
    let draft = LearningDraft {
        learning_type: "fact".to_string(),
        content: "replaces a ghost".to_string(),
        supersedes: Some(12345),
        ..Default::default()
    };
    let outcome = store_learning(&mut conn, &draft, &test_embedding(0), 0.92).unwrap();
    let id = match outcome {
        StoreOutcome::Stored { id } => id,
        other => panic!("unexpected {other:?}"),
    };

    let recalled = recall(&conn, &test_embedding(0), 0.5, 5).unwrap();
    assert_eq!(recalled.memories[0].id, id);
}
