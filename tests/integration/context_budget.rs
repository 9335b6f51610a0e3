//! Bounded context assembly through the orchestrator

use crate::integration::support::{orchestrator_with, CannedProvider};
use loafer::config::LoaferConfig;
use loafer::context::SUMMARY_PREFIX;
use loafer::error::TransportFailure;
use loafer::store::SessionStore;
use loafer::types::{KeyEventKind, Role};
use serde_json::json;
use std::collections::BTreeMap;

#[tokio::test]
async fn empty_session_has_empty_context() {
    let (store, orchestrator) =
        orchestrator_with(CannedProvider::new(vec![Ok("unused".into())]), &LoaferConfig::default());
    let session = store.create_session(1, BTreeMap::new()).unwrap();

    let context = orchestrator
        .get_context_for_generation(&session.id, 1000)
        .await
        .unwrap();
    assert!(context.is_empty());
    assert!(store.list_summaries(&session.id).unwrap().is_empty());
}

#[tokio::test]
async fn oversized_history_compacts_oldest_half() {
    let provider = CannedProvider::new(vec![Ok("They hid in the stairwell.".into())]);
    let (store, orchestrator) = orchestrator_with(provider.clone(), &LoaferConfig::default());
    let session = store.create_session(2, BTreeMap::new()).unwrap();
    store
        .insert_key_event(
            &session.id,
            KeyEventKind::ActionChoice,
            json!({"choice_id": "c1", "choice_text": "Refill the coffee slowly"}),
        )
        .unwrap();
    for i in 0..12 {
        let role = if i % 2 == 0 { Role::User } else { Role::Assistant };
        store
            .append_message(&session.id, role, &format!("turn {i}"), 100)
            .unwrap();
    }

    let context = orchestrator
        .get_context_for_generation(&session.id, 1000)
        .await
        .unwrap();

    let summaries = store.list_summaries(&session.id).unwrap();
    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].message_count, 6);
    assert!(summaries[0].summary_text.contains("Refill the coffee slowly"));
    assert_eq!(provider.calls(), 1);

    assert_eq!(context.len(), 7);
    assert_eq!(context[0].role, Role::System);
    assert!(context[0].content.starts_with(SUMMARY_PREFIX));
    assert_eq!(context[1].content, "turn 6");
    assert_eq!(context[6].content, "turn 11");
}

#[tokio::test]
async fn verbose_summary_keeps_context_within_budget() {
    let provider = CannedProvider::new(vec![Ok("The stairwell was quiet. ".repeat(40))]);
    let (store, orchestrator) = orchestrator_with(provider, &LoaferConfig::default());
    let session = store.create_session(5, BTreeMap::new()).unwrap();
    for i in 0..12 {
        let role = if i % 2 == 0 { Role::User } else { Role::Assistant };
        store
            .append_message(&session.id, role, &format!("turn {i}"), 100)
            .unwrap();
    }

    let context = orchestrator
        .get_context_for_generation(&session.id, 1000)
        .await
        .unwrap();

    let summaries = store.list_summaries(&session.id).unwrap();
    let messages = store.list_messages(&session.id, None).unwrap();
    let covered: usize = summaries.iter().map(|s| s.message_count).sum();
    let total: usize = summaries.iter().map(|s| s.tokens).sum::<usize>()
        + messages[covered..].iter().map(|m| m.tokens).sum::<usize>();
    assert!(total <= 1000, "context holds {total} tokens");
    assert_eq!(context.len(), summaries.len() + messages.len() - covered);
    assert!(context[0].content.starts_with(SUMMARY_PREFIX));
}

#[tokio::test]
async fn decisions_are_not_repeated_across_summaries() {
    let provider = CannedProvider::new(vec![Ok("They hid in the stairwell.".into())]);
    let (store, orchestrator) = orchestrator_with(provider, &LoaferConfig::default());
    let session = store.create_session(6, BTreeMap::new()).unwrap();
    let mut turn = 0;
    for decision in ["Refill the coffee slowly", "Reorganize the stapler drawer"] {
        store
            .insert_key_event(
                &session.id,
                KeyEventKind::ActionChoice,
                json!({"choice_id": "c1", "choice_text": decision}),
            )
            .unwrap();
        for _ in 0..12 {
            let role = if turn % 2 == 0 { Role::User } else { Role::Assistant };
            store
                .append_message(&session.id, role, &format!("turn {turn}"), 100)
                .unwrap();
            turn += 1;
        }
        orchestrator
            .get_context_for_generation(&session.id, 1000)
            .await
            .unwrap();
    }

    let summaries = store.list_summaries(&session.id).unwrap();
    assert!(summaries.len() >= 2);
    for decision in ["Refill the coffee slowly", "Reorganize the stapler drawer"] {
        let seen = summaries
            .iter()
            .filter(|s| s.summary_text.contains(decision))
            .count();
        assert_eq!(seen, 1, "{decision}");
    }
}

#[tokio::test]
async fn compression_failure_returns_unreduced_context() {
    let provider = CannedProvider::new(vec![Err(TransportFailure::Unreachable("down".into()))]);
    let (store, orchestrator) = orchestrator_with(provider, &LoaferConfig::default());
    let session = store.create_session(3, BTreeMap::new()).unwrap();
    for i in 0..12 {
        store
            .append_message(&session.id, Role::User, &format!("turn {i}"), 100)
            .unwrap();
    }

    let context = orchestrator
        .get_context_for_generation(&session.id, 1000)
        .await
        .unwrap();
    assert_eq!(context.len(), 12);
    assert!(store.list_summaries(&session.id).unwrap().is_empty());
}

#[tokio::test]
async fn rebuild_never_compacts() {
    let (store, orchestrator) =
        orchestrator_with(CannedProvider::new(vec![Ok("short".into())]), &LoaferConfig::default());
    let session = store.create_session(4, BTreeMap::new()).unwrap();
    for i in 0..12 {
        store
            .append_message(&session.id, Role::User, &format!("turn {i}"), 100)
            .unwrap();
    }

    let full = orchestrator.rebuild_full_context(&session.id).unwrap();
    assert_eq!(full.len(), 12);
    assert!(store.list_summaries(&session.id).unwrap().is_empty());

    orchestrator
        .get_context_for_generation(&session.id, 1000)
        .await
        .unwrap();
    let rebuilt = orchestrator.rebuild_full_context(&session.id).unwrap();
    assert_eq!(rebuilt.len(), 7);
    assert!(rebuilt[0].content.starts_with(SUMMARY_PREFIX));
}
