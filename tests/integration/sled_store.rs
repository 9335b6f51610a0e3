//! Durable store behavior across reopen

use loafer::error::StorageError;
use loafer::store::{SessionStore, SledSessionStore};
use loafer::types::{KeyEventKind, Role, SessionStatus, SummaryKind};
use serde_json::json;
use std::collections::BTreeMap;
use tempfile::TempDir;

#[test]
fn session_history_survives_reopen() {
    let temp = TempDir::new().unwrap();
    let session_id = {
        let store = SledSessionStore::open(temp.path()).unwrap();
        let metadata = BTreeMap::from([("player_name".to_string(), json!("Ada"))]);
        let session = store.create_session(42, metadata).unwrap();
        store.append_message(&session.id, Role::Assistant, "opening", 10).unwrap();
        store.append_message(&session.id, Role::User, "choice", 4).unwrap();
        store
            .insert_summary(&session.id, "they slacked", 3, 2, SummaryKind::Auto)
            .unwrap();
        store
            .insert_key_event(&session.id, KeyEventKind::ActionChoice, json!({"choice_text": "nap"}))
            .unwrap();
        store.flush().unwrap();
        session.id
    };

    let store = SledSessionStore::open(temp.path()).unwrap();
    let session = store.get_session(&session_id).unwrap().unwrap();
    assert_eq!(session.seed, 42);
    assert_eq!(session.metadata_str("player_name"), Some("Ada"));

    let messages = store.list_messages(&session_id, None).unwrap();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].content, "opening");
    assert_eq!(store.list_summaries(&session_id).unwrap()[0].message_count, 2);
    assert_eq!(
        store
            .list_key_events_by_type(&session_id, KeyEventKind::ActionChoice)
            .unwrap()
            .len(),
        1
    );
    assert!(store
        .list_key_events_by_type(&session_id, KeyEventKind::GameOver)
        .unwrap()
        .is_empty());
}

#[test]
fn message_sequence_continues_after_reopen() {
    let temp = TempDir::new().unwrap();
    let session_id = {
        let store = SledSessionStore::open(temp.path()).unwrap();
        let session = store.create_session(1, BTreeMap::new()).unwrap();
        for i in 0..3 {
            store.append_message(&session.id, Role::User, &format!("m{i}"), 1).unwrap();
        }
        store.flush().unwrap();
        session.id
    };

    let store = SledSessionStore::open(temp.path()).unwrap();
    store.append_message(&session_id, Role::User, "m3", 1).unwrap();
    let recent = store.list_messages(&session_id, Some(2)).unwrap();
    let contents: Vec<_> = recent.iter().map(|m| m.content.as_str()).collect();
    assert_eq!(contents, vec!["m2", "m3"]);
}

#[test]
fn closed_sessions_stay_closed() {
    let temp = TempDir::new().unwrap();
    let store = SledSessionStore::open(temp.path()).unwrap();
    let session = store.create_session(5, BTreeMap::new()).unwrap();
    store
        .update_session_status(&session.id, SessionStatus::Completed)
        .unwrap();

    let err = store
        .update_session_status(&session.id, SessionStatus::Active)
        .unwrap_err();
    assert!(matches!(err, StorageError::InvalidStatusTransition { .. }));
}

#[test]
fn sessions_list_newest_first() {
    let temp = TempDir::new().unwrap();
    let store = SledSessionStore::open(temp.path()).unwrap();
    let first = store.create_session(1, BTreeMap::new()).unwrap();
    std::thread::sleep(std::time::Duration::from_millis(5));
    let second = store.create_session(2, BTreeMap::new()).unwrap();

    let ids: Vec<_> = store.list_sessions().unwrap().into_iter().map(|s| s.id).collect();
    assert_eq!(ids, vec![second.id, first.id]);
}
