//! End-to-end turn resolution with provider failures

use crate::integration::support::{orchestrator_with, valid_reply, CannedProvider};
use loafer::config::LoaferConfig;
use loafer::error::{ApiError, TransportFailure};
use loafer::generation::{
    ContentValidator, Rejection, RequestKind, TurnSource, TurnState, ValidatorConfig,
};
use loafer::store::SessionStore;
use loafer::types::{KeyEventKind, SessionStatus};
use std::time::Duration;

fn assert_contract_clean(payload: &loafer::generation::GenerationPayload) {
    let report = ContentValidator::default().validate_payload(payload);
    assert!(report.ok, "violations: {:?}", report.violations);
    let choices = payload.choices().len();
    assert!((3..=6).contains(&choices));
    let terms = ValidatorConfig::default().disallowed_terms;
    for choice in payload.choices() {
        assert!(terms.iter().all(|t| !choice.text.contains(t.as_str())));
    }
}

#[tokio::test(start_paused = true)]
async fn slow_provider_times_out_into_fallback() {
    let provider = CannedProvider::slow(Duration::from_secs(600));
    let (_store, orchestrator) = orchestrator_with(provider.clone(), &LoaferConfig::default());

    let outcome = orchestrator.generate_initial_turn("Ada", "normal", 77).await;

    assert_eq!(outcome.source, TurnSource::Fallback);
    assert!(matches!(
        outcome.rejection,
        Some(Rejection::Transport(TransportFailure::Timeout(_)))
    ));
    assert_eq!(provider.calls(), 1);
    assert_eq!(outcome.trace.states().last(), Some(&TurnState::Done));
    assert!(outcome.trace.states().contains(&TurnState::Fallback));
    assert_contract_clean(&outcome.payload);
}

#[tokio::test]
async fn fallback_is_stable_for_a_seed() {
    let provider = CannedProvider::new(vec![Err(TransportFailure::Unreachable("offline".into()))]);
    let (_store, orchestrator) = orchestrator_with(provider, &LoaferConfig::default());

    let first = orchestrator.generate_initial_turn("Ada", "normal", 5).await;
    let second = orchestrator.generate_initial_turn("Ada", "normal", 5).await;
    assert_eq!(first.payload, second.payload);
}

#[tokio::test]
async fn fenced_provider_reply_is_accepted() {
    let body = format!("Here you go:\n```json\n{}\n```", valid_reply(9, RequestKind::Initial));
    let provider = CannedProvider::new(vec![Ok(body)]);
    let (_store, orchestrator) = orchestrator_with(provider, &LoaferConfig::default());

    let outcome = orchestrator.generate_initial_turn("Ada", "normal", 9).await;
    assert_eq!(outcome.source, TurnSource::Generated);
    assert!(outcome.rejection.is_none());
}

#[tokio::test]
async fn session_plays_through_offline() {
    let provider = CannedProvider::new(vec![Err(TransportFailure::Unreachable("offline".into()))]);
    let (store, orchestrator) = orchestrator_with(provider, &LoaferConfig::default());

    let (session, opening) = orchestrator
        .start_session("Ada", "normal", Some(31))
        .await
        .unwrap();
    assert_eq!(opening.source, TurnSource::Fallback);

    let mut payload = opening.payload;
    for _ in 0..3 {
        if payload.is_game_over() {
            break;
        }
        let choice = payload.choices()[0].id.clone();
        let outcome = orchestrator.resolve_turn(&session.id, &choice).await.unwrap();
        assert_contract_clean(&outcome.payload);
        payload = outcome.payload;
    }

    let decisions = store
        .list_key_events_by_type(&session.id, KeyEventKind::ActionChoice)
        .unwrap();
    assert!(!decisions.is_empty());
    assert!(decisions[0].data.get("state_snapshot").is_some());

    let err = orchestrator
        .resolve_turn(&session.id, "no_such_choice")
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::UnknownChoice { .. }));
}

#[tokio::test]
async fn abandoned_session_rejects_turns() {
    let provider = CannedProvider::new(vec![Err(TransportFailure::Unreachable("offline".into()))]);
    let (_store, orchestrator) = orchestrator_with(provider, &LoaferConfig::default());
    let (session, opening) = orchestrator
        .start_session("Ada", "normal", Some(8))
        .await
        .unwrap();

    let abandoned = orchestrator.abandon_session(&session.id).unwrap();
    assert_eq!(abandoned.status, SessionStatus::Abandoned);

    let choice = opening.payload.choices()[0].id.clone();
    let err = orchestrator.resolve_turn(&session.id, &choice).await.unwrap_err();
    assert!(matches!(err, ApiError::SessionClosed(_)));
}

#[tokio::test]
async fn concurrent_sessions_resolve_independently() {
    let provider = CannedProvider::new(vec![Err(TransportFailure::Unreachable("offline".into()))]);
    let (store, orchestrator) = orchestrator_with(provider, &LoaferConfig::default());

    let starts = futures::future::join_all(
        (0..4u64).map(|seed| orchestrator.start_session("Ada", "normal", Some(seed))),
    )
    .await;
    let sessions: Vec<_> = starts.into_iter().map(|r| r.unwrap()).collect();

    let turns = futures::future::join_all(sessions.iter().map(|(session, opening)| {
        let choice = opening.payload.choices()[0].id.clone();
        let orchestrator = &orchestrator;
        async move { orchestrator.resolve_turn(&session.id, &choice).await }
    }))
    .await;

    for ((session, _), turn) in sessions.iter().zip(turns) {
        turn.unwrap();
        assert_eq!(store.list_messages(&session.id, None).unwrap().len(), 3);
    }
}
