mod helpers;

use helpers::{insert_learning, similar_embedding, test_db, test_embedding};
use mnemo::memory::store::{store_learning, StoreOutcome};
use mnemo::memory::types::LearningDraft;

fn draft(content: &str) -> LearningDraft {
    LearningDraft {
        learning_type: "preference".to_string(),
        content: content.to_string(),
        ..Default::default()
    }
}

#[test]
fn near_duplicate_is_reported_not_stored() {
    let mut conn = test_db();
    let emb = test_embedding(0);
    let existing = insert_learning(&mut conn, "preference", "User prefers dark mode", &emb);

    let outcome = store_learning(
        &mut conn,
        &draft("User prefers dark theme"),
        &similar_embedding(&emb),
        0.92,
    )
    .unwrap();

    match outcome {
        StoreOutcome::Duplicate { existing_id, similarity } => {
            assert_eq!(existing_id, existing);
            assert!(similarity >= 0.92);
        }
        other => panic!("expected duplicate outcome, got {other:?}"),
    }

    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM learnings", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 1, "duplicate must not create a new row");
}

#[test]
fn distant_embeddings_are_not_duplicates() {
    let mut conn = test_db();
    let a = insert_learning(&mut conn, "preference", "A memory about dogs", &test_embedding(0));
    let b = insert_learning(&mut conn, "preference", "A memory about cats", &test_embedding(20));
    assert_ne!(a, b);
}

#[test]
fn first_scanned_duplicate_wins_when_several_match() {
    let mut conn = test_db();
    let emb = test_embedding(0);
    // Store two rows that both clear the threshold against the probe. The
    // scan order is ascending by id, so the earlier row must be reported
    // even though the later one matches more closely.
    let first = match store_learning(&mut conn, &draft("first stored"), &similar_embedding(&emb), 0.9999)
        .unwrap()
    {
        StoreOutcome::Stored { id } => id,
        other => panic!("unexpected {other:?}"),
    };
    store_learning(&mut conn, &draft("second stored"), &emb, 0.9999).unwrap();

    let outcome = store_learning(&mut conn, &draft("probe"), &emb, 0.9).unwrap();
    match outcome {
        StoreOutcome::Duplicate { existing_id, similarity } => {
            assert_eq!(existing_id, first);
            assert!(similarity < 1.0, "first match reported, not the best match");
        }
        other => panic!("expected duplicate outcome, got {other:?}"),
    }
}

#[test]
fn threshold_is_respected_exactly() {
    let mut conn = test_db();
    let emb = test_embedding(0);
    insert_learning(&mut conn, "fact", "original", &emb);

    // Identical vector with threshold 1.0: cosine of a vector with itself
    // is 1.0 within float tolerance, so this must dedup.
    let outcome = store_learning(&mut conn, &draft("identical"), &emb, 1.0).unwrap();
    assert!(matches!(outcome, StoreOutcome::Duplicate { .. }));
}
