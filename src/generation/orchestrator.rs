//! Generation Orchestrator
//!
//! The turn-resolution state machine and the only component collaborators talk to.
//!
//! ```text
//! BuildingContext -> Calling -> Extracting -> Validating -> Done
//!                       \            \             \
//!                        +------------+-------------+--> Fallback -> Done
//! ```
//!
//! Every resolution ends in `Done` with a contract-valid payload: provider problems of any
//! kind are recorded as a [`Rejection`] and replaced by deterministic fallback content.
//! Only storage errors escape.

use crate::config::LoaferConfig;
use crate::context::{
    CharRatioEstimator, ContextBuilder, MessageLog, Summarizer, TokenEstimator, TokenStats,
};
use crate::error::{ApiError, MalformedOutput, StorageError, TransportFailure};
use crate::generation::cache::{CacheKey, ResponseCache};
use crate::generation::client::{GenerationClient, GenerationConfig, Limits};
use crate::generation::extract;
use crate::generation::fallback::{FallbackEngine, SessionFacts};
use crate::generation::payload::{GenerationPayload, PlayerState, RequestKind};
use crate::generation::prompts;
use crate::generation::validate::{ContentValidator, Violation};
use crate::provider::{ModelProviderClient, ProviderFactory};
use crate::store::SessionStore;
use crate::types::{ContextEntry, KeyEventKind, Role, Seed, Session, SessionStatus};
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, info_span, Instrument};

/// Stats kept within `0..=100` when choice effects are applied
const BOUNDED_STATS: [&str; 4] = ["energy", "chill", "progress", "suspicion"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnState {
    BuildingContext,
    Calling,
    Extracting,
    Validating,
    Fallback,
    Done,
}

impl TurnState {
    pub fn as_str(self) -> &'static str {
        match self {
            TurnState::BuildingContext => "building_context",
            TurnState::Calling => "calling",
            TurnState::Extracting => "extracting",
            TurnState::Validating => "validating",
            TurnState::Fallback => "fallback",
            TurnState::Done => "done",
        }
    }
}

impl fmt::Display for TurnState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TraceStep {
    pub state: TurnState,
    /// Time spent in `state`
    pub elapsed_ms: u64,
}

/// Ordered record of the states a resolution passed through
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TurnTrace {
    pub steps: Vec<TraceStep>,
}

impl TurnTrace {
    pub fn states(&self) -> Vec<TurnState> {
        self.steps.iter().map(|s| s.state).collect()
    }

    pub fn total_ms(&self) -> u64 {
        self.steps.iter().map(|s| s.elapsed_ms).sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnSource {
    Generated,
    Cached,
    Fallback,
}

impl fmt::Display for TurnSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TurnSource::Generated => "generated",
            TurnSource::Cached => "cached",
            TurnSource::Fallback => "fallback",
        })
    }
}

/// Why provider output was not used
#[derive(Debug, Clone, PartialEq)]
pub enum Rejection {
    Transport(TransportFailure),
    Malformed(MalformedOutput),
    ContentContract(Vec<Violation>),
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::Transport(failure) => write!(f, "transport: {}", failure),
            Rejection::Malformed(malformed) => write!(f, "malformed: {}", malformed.reason),
            Rejection::ContentContract(violations) => {
                write!(f, "content contract: {} violation(s)", violations.len())
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct TurnOutcome {
    pub payload: GenerationPayload,
    pub source: TurnSource,
    pub rejection: Option<Rejection>,
    pub trace: TurnTrace,
}

/// Records state transitions with timings and debug events.
struct Transitions {
    trace: TurnTrace,
    current: TurnState,
    entered: Instant,
}

impl Transitions {
    fn start() -> Self {
        debug!(state = %TurnState::BuildingContext, "Entering state");
        Self {
            trace: TurnTrace::default(),
            current: TurnState::BuildingContext,
            entered: Instant::now(),
        }
    }

    fn enter(&mut self, next: TurnState) {
        let elapsed_ms = self.entered.elapsed().as_millis() as u64;
        debug!(state = %self.current, elapsed_ms, "Leaving state");
        self.trace.steps.push(TraceStep {
            state: self.current,
            elapsed_ms,
        });
        debug!(state = %next, "Entering state");
        self.current = next;
        self.entered = Instant::now();
    }

    fn finish(mut self) -> TurnTrace {
        self.enter(TurnState::Done);
        self.trace.steps.push(TraceStep {
            state: TurnState::Done,
            elapsed_ms: 0,
        });
        self.trace
    }
}

/// One provider request and what to fall back on
struct TurnRequest<'a> {
    kind: RequestKind,
    seed: Seed,
    context: &'a [ContextEntry],
    instruction: String,
    limits: Limits,
    cache_key: CacheKey,
    facts: SessionFacts,
}

/// Turn-resolution entry point.
///
/// Shared across tasks behind an `Arc`. Callers must keep at most one resolution in
/// flight per session; different sessions are independent.
pub struct GenerationOrchestrator {
    store: Arc<dyn SessionStore>,
    client: Arc<GenerationClient>,
    context: ContextBuilder,
    log: MessageLog,
    validator: ContentValidator,
    fallback: FallbackEngine,
    cache: ResponseCache,
    generation: GenerationConfig,
}

impl GenerationOrchestrator {
    pub fn new(
        store: Arc<dyn SessionStore>,
        provider: Arc<dyn ModelProviderClient>,
        config: &LoaferConfig,
    ) -> Self {
        let estimator: Arc<dyn TokenEstimator> =
            Arc::new(CharRatioEstimator::new(config.context.chars_per_token));
        let client = Arc::new(GenerationClient::new(
            provider,
            Limits::from(&config.summary),
        ));
        let summarizer = Summarizer::new(store.clone(), client.clone(), estimator.clone());
        let context = ContextBuilder::new(
            store.clone(),
            summarizer,
            config.context.clone(),
            config.summary.clone(),
        );

        Self {
            log: MessageLog::new(store.clone(), estimator),
            store,
            client,
            context,
            validator: ContentValidator::new(config.validator.clone()),
            fallback: FallbackEngine::with_required_stats(config.validator.required_stats.clone()),
            cache: ResponseCache::from_config(&config.cache),
            generation: config.generation.clone(),
        }
    }

    /// Build with the provider client described by `config.provider`.
    pub fn from_config(
        config: &LoaferConfig,
        store: Arc<dyn SessionStore>,
    ) -> Result<Self, ApiError> {
        let provider = ProviderFactory::create_client(&config.provider)?;
        Ok(Self::new(store, provider, config))
    }

    pub fn store(&self) -> &Arc<dyn SessionStore> {
        &self.store
    }

    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    pub fn fallback(&self) -> &FallbackEngine {
        &self.fallback
    }

    pub fn validator(&self) -> &ContentValidator {
        &self.validator
    }

    /// Configured default context budget
    pub fn token_budget(&self) -> usize {
        self.context.config().token_budget
    }

    pub async fn generate_initial_turn(
        &self,
        actor_name: &str,
        difficulty: &str,
        seed: Seed,
    ) -> TurnOutcome {
        self.resolve(TurnRequest {
            kind: RequestKind::Initial,
            seed,
            context: &[],
            instruction: prompts::initial_instruction(actor_name, difficulty, seed),
            limits: self.generation.initial_limits(),
            cache_key: CacheKey::initial(seed, actor_name, difficulty),
            facts: SessionFacts::new(actor_name, difficulty),
        })
        .await
    }

    pub async fn generate_next_turn(
        &self,
        context: &[ContextEntry],
        action: &str,
        seed: Seed,
    ) -> TurnOutcome {
        let facts = SessionFacts {
            last_action: Some(action.to_string()),
            ..Default::default()
        };
        self.generate_next_turn_with_facts(context, action, seed, facts)
            .await
    }

    /// As [`Self::generate_next_turn`], with session facts for the fallback path.
    pub async fn generate_next_turn_with_facts(
        &self,
        context: &[ContextEntry],
        action: &str,
        seed: Seed,
        facts: SessionFacts,
    ) -> TurnOutcome {
        self.resolve(TurnRequest {
            kind: RequestKind::Continuation,
            seed,
            context,
            instruction: prompts::next_instruction(action),
            limits: self.generation.turn_limits(),
            cache_key: CacheKey::continuation(seed, context, action),
            facts,
        })
        .await
    }

    pub async fn get_context_for_generation(
        &self,
        session_id: &str,
        budget: usize,
    ) -> Result<Vec<ContextEntry>, StorageError> {
        self.context.build_context(session_id, budget).await
    }

    pub fn rebuild_full_context(&self, session_id: &str) -> Result<Vec<ContextEntry>, StorageError> {
        self.context.rebuild_full_context(session_id)
    }

    pub fn token_stats(&self, session_id: &str) -> Result<TokenStats, StorageError> {
        self.log.token_stats(session_id)
    }

    /// Create a session, generate its opening turn and log it.
    pub async fn start_session(
        &self,
        actor_name: &str,
        difficulty: &str,
        seed: Option<Seed>,
    ) -> Result<(Session, TurnOutcome), ApiError> {
        let seed = seed.unwrap_or_else(rand::random);
        let metadata = BTreeMap::from([
            ("player_name".to_string(), json!(actor_name)),
            ("difficulty".to_string(), json!(difficulty)),
        ]);
        let session = self.store.create_session(seed, metadata)?;
        info!(session_id = %session.id, seed, "Session started");

        let outcome = self
            .generate_initial_turn(actor_name, difficulty, seed)
            .instrument(info_span!("session", session_id = %session.id))
            .await;
        self.log
            .append(&session.id, Role::Assistant, &payload_text(&outcome.payload)?)?;
        Ok((session, outcome))
    }

    /// Resolve one player choice for a stored session.
    ///
    /// Builds context, generates the next turn, then records the choice as an
    /// `action_choice` key event followed by the user and assistant messages. A game
    /// over marks the session completed.
    pub async fn resolve_turn(
        &self,
        session_id: &str,
        choice: &str,
    ) -> Result<TurnOutcome, ApiError> {
        let session = self
            .store
            .get_session(session_id)?
            .ok_or_else(|| StorageError::SessionNotFound(session_id.to_string()))?;
        if session.status != SessionStatus::Active {
            return Err(ApiError::SessionClosed(session_id.to_string()));
        }

        let previous = self.latest_payload(session_id)?;
        let unknown = || ApiError::UnknownChoice {
            session_id: session_id.to_string(),
            choice: choice.to_string(),
        };
        let selected = previous
            .as_ref()
            .and_then(|payload| payload.find_choice(choice))
            .cloned()
            .ok_or_else(unknown)?;
        let snapshot = previous
            .as_ref()
            .map(|payload| apply_effects(payload.player_state(), &selected.effects))
            .unwrap_or_default();
        let turn = self
            .store
            .list_key_events_by_type(session_id, KeyEventKind::ActionChoice)?
            .len() as u64
            + 1;

        let span = info_span!("session", session_id, turn);
        let context = self
            .get_context_for_generation(session_id, self.token_budget())
            .instrument(span.clone())
            .await?;
        let facts = SessionFacts {
            player_name: session.metadata_str("player_name").unwrap_or_default().to_string(),
            difficulty: session.metadata_str("difficulty").unwrap_or_default().to_string(),
            turn,
            last_action: Some(selected.text.clone()),
            player_state: Some(snapshot.clone()),
        };
        let outcome = self
            .generate_next_turn_with_facts(&context, &selected.text, session.seed, facts)
            .instrument(span)
            .await;

        self.store.insert_key_event(
            session_id,
            KeyEventKind::ActionChoice,
            json!({
                "choice_id": selected.id,
                "choice_text": selected.text,
                "state_snapshot": snapshot,
            }),
        )?;
        self.log.append(
            session_id,
            Role::User,
            &prompts::next_instruction(&selected.text),
        )?;
        self.log
            .append(session_id, Role::Assistant, &payload_text(&outcome.payload)?)?;

        if outcome.payload.is_game_over() {
            self.store.insert_key_event(
                session_id,
                KeyEventKind::GameOver,
                json!({ "reason": outcome.payload.game_over_reason(), "turn": turn }),
            )?;
            self.store
                .update_session_status(session_id, SessionStatus::Completed)?;
            info!(session_id, turn, "Game over; session completed");
        }

        Ok(outcome)
    }

    /// Mark an active session abandoned.
    pub fn abandon_session(&self, session_id: &str) -> Result<Session, StorageError> {
        self.store
            .update_session_status(session_id, SessionStatus::Abandoned)
    }

    /// Most recent assistant payload of the session, if any.
    pub fn latest_payload(&self, session_id: &str) -> Result<Option<GenerationPayload>, StorageError> {
        let messages = self.log.list(session_id, None)?;
        let Some(message) = messages.iter().rev().find(|m| m.role == Role::Assistant) else {
            return Ok(None);
        };
        let value: Value = serde_json::from_str(&message.content)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        GenerationPayload::from_value(RequestKind::Continuation, value)
            .map(Some)
            .map_err(|e| StorageError::Serialization(e.to_string()))
    }

    async fn resolve(&self, request: TurnRequest<'_>) -> TurnOutcome {
        let span = info_span!("turn", kind = %request.kind, seed = request.seed);
        self.resolve_inner(request).instrument(span).await
    }

    async fn resolve_inner(&self, request: TurnRequest<'_>) -> TurnOutcome {
        let started = Instant::now();
        let mut machine = Transitions::start();

        if let Some(payload) = self.cache.get(&request.cache_key) {
            debug!(digest = %request.cache_key.digest, "Cache hit");
            return self.done(machine, payload, TurnSource::Cached, None, started);
        }

        machine.enter(TurnState::Calling);
        let rejection = match self
            .client
            .generate(
                prompts::SYSTEM_PROMPT,
                request.context,
                Some(&request.instruction),
                request.limits,
            )
            .await
        {
            Err(failure) => Rejection::Transport(failure),
            Ok(raw) => {
                machine.enter(TurnState::Extracting);
                match extract::decode(&raw) {
                    Err(malformed) => Rejection::Malformed(malformed),
                    Ok(value) => {
                        machine.enter(TurnState::Validating);
                        match self.validator.accept(value, request.kind) {
                            Err(violations) => Rejection::ContentContract(violations),
                            Ok(payload) => {
                                self.cache.insert(request.cache_key, payload.clone());
                                return self.done(
                                    machine,
                                    payload,
                                    TurnSource::Generated,
                                    None,
                                    started,
                                );
                            }
                        }
                    }
                }
            }
        };

        info!(reason = %rejection, "Provider output rejected; using fallback content");
        machine.enter(TurnState::Fallback);
        let payload = self
            .fallback
            .synthesize(request.seed, request.kind, &request.facts);
        self.done(machine, payload, TurnSource::Fallback, Some(rejection), started)
    }

    fn done(
        &self,
        machine: Transitions,
        payload: GenerationPayload,
        source: TurnSource,
        rejection: Option<Rejection>,
        started: Instant,
    ) -> TurnOutcome {
        let trace = machine.finish();
        info!(
            source = %source,
            choices = payload.choices().len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Turn resolved"
        );
        TurnOutcome {
            payload,
            source,
            rejection,
            trace,
        }
    }
}

/// Apply a choice's effects to a state snapshot and advance the turn counter.
fn apply_effects(state: &PlayerState, effects: &BTreeMap<String, i64>) -> PlayerState {
    let mut next = state.clone();
    for (stat, delta) in effects {
        let value = next.entry(stat.clone()).or_insert(0);
        *value = value.saturating_add(*delta);
        if BOUNDED_STATS.contains(&stat.as_str()) {
            *value = (*value).clamp(0, 100);
        }
    }
    *next.entry("turn".to_string()).or_insert(0) += 1;
    next
}

fn payload_text(payload: &GenerationPayload) -> Result<String, StorageError> {
    serde_json::to_string(payload).map_err(|e| StorageError::Serialization(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{ChatMessage, CompletionOptions, CompletionResponse, TokenUsage};
    use crate::store::InMemorySessionStore;
    use async_trait::async_trait;
    use parking_lot::Mutex;

    /// Replies with a fixed script, one entry per call; the last entry repeats.
    struct ScriptedProvider {
        replies: Mutex<Vec<Result<String, TransportFailure>>>,
        calls: Mutex<usize>,
    }

    impl ScriptedProvider {
        fn new(replies: Vec<Result<String, TransportFailure>>) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(replies),
                calls: Mutex::new(0),
            })
        }

        fn calls(&self) -> usize {
            *self.calls.lock()
        }
    }

    #[async_trait]
    impl ModelProviderClient for ScriptedProvider {
        async fn complete(
            &self,
            _messages: Vec<ChatMessage>,
            _options: CompletionOptions,
        ) -> Result<CompletionResponse, TransportFailure> {
            *self.calls.lock() += 1;
            let mut replies = self.replies.lock();
            let reply = if replies.len() > 1 {
                replies.remove(0)
            } else {
                replies[0].clone()
            };
            reply.map(|content| CompletionResponse {
                content,
                model: "scripted".into(),
                usage: TokenUsage::default(),
                finish_reason: None,
            })
        }

        fn provider_name(&self) -> &str {
            "scripted"
        }

        fn model_name(&self) -> &str {
            "scripted"
        }
    }

    fn continuation_json() -> String {
        json!({
            "story_context": "The boss walks by.",
            "choices": [
                {"id": "a", "text": "Look busy", "effects": {"energy": -5}},
                {"id": "b", "text": "Nap", "effects": {"energy": 10, "suspicion": 20}},
                {"id": "c", "text": "Chat", "effects": {"connection": 5}}
            ],
            "player_state": {"energy": 90, "chill": 50, "progress": 5, "suspicion": 0, "connection": 0, "blackmail": 0}
        })
        .to_string()
    }

    fn orchestrator(provider: Arc<ScriptedProvider>) -> GenerationOrchestrator {
        let store: Arc<dyn SessionStore> = Arc::new(InMemorySessionStore::new());
        GenerationOrchestrator::new(store, provider, &LoaferConfig::default())
    }

    #[tokio::test]
    async fn valid_output_is_generated_and_cached() {
        let provider = ScriptedProvider::new(vec![Ok(format!("```json\n{}\n```", continuation_json()))]);
        let orchestrator = orchestrator(provider.clone());

        let first = orchestrator.generate_next_turn(&[], "nap", 1).await;
        assert_eq!(first.source, TurnSource::Generated);
        assert!(first.rejection.is_none());
        assert_eq!(
            first.trace.states(),
            vec![
                TurnState::BuildingContext,
                TurnState::Calling,
                TurnState::Extracting,
                TurnState::Validating,
                TurnState::Done
            ]
        );

        let second = orchestrator.generate_next_turn(&[], "nap", 1).await;
        assert_eq!(second.source, TurnSource::Cached);
        assert_eq!(second.payload, first.payload);
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test]
    async fn transport_failure_falls_back() {
        let provider = ScriptedProvider::new(vec![Err(TransportFailure::Unreachable("down".into()))]);
        let outcome = orchestrator(provider)
            .generate_initial_turn("Ada", "normal", 42)
            .await;
        assert_eq!(outcome.source, TurnSource::Fallback);
        assert!(matches!(outcome.rejection, Some(Rejection::Transport(_))));
        assert_eq!(
            outcome.trace.states(),
            vec![
                TurnState::BuildingContext,
                TurnState::Calling,
                TurnState::Fallback,
                TurnState::Done
            ]
        );
        assert_eq!(outcome.payload.kind(), RequestKind::Initial);
    }

    #[tokio::test]
    async fn malformed_output_falls_back() {
        let provider = ScriptedProvider::new(vec![Ok("no json here".into())]);
        let outcome = orchestrator(provider).generate_next_turn(&[], "nap", 1).await;
        assert!(matches!(outcome.rejection, Some(Rejection::Malformed(_))));
        assert_eq!(outcome.source, TurnSource::Fallback);
    }

    #[tokio::test]
    async fn contract_violations_are_exposed() {
        let provider = ScriptedProvider::new(vec![Ok(r#"{"story_context": "x", "choices": []}"#.into())]);
        let orchestrator = orchestrator(provider);
        let outcome = orchestrator.generate_next_turn(&[], "nap", 1).await;
        let Some(Rejection::ContentContract(violations)) = &outcome.rejection else {
            panic!("expected contract rejection, got {:?}", outcome.rejection);
        };
        assert!(violations.iter().any(|v| v.field == "choices"));
        assert!(violations.iter().any(|v| v.field == "player_state"));
        assert!(orchestrator.cache().is_empty());
        assert!(orchestrator.validator().validate_payload(&outcome.payload).ok);
    }

    #[tokio::test]
    async fn session_flow_persists_turns() {
        let provider = ScriptedProvider::new(vec![
            Err(TransportFailure::Unreachable("down".into())),
            Ok(continuation_json()),
        ]);
        let orchestrator = orchestrator(provider);
        let (session, opening) = orchestrator
            .start_session("Ada", "normal", Some(7))
            .await
            .unwrap();
        assert_eq!(session.seed, 7);
        assert_eq!(opening.source, TurnSource::Fallback);

        let outcome = orchestrator
            .resolve_turn(&session.id, "choice_work_7")
            .await
            .unwrap();
        assert_eq!(outcome.source, TurnSource::Generated);

        let store = orchestrator.store();
        let messages = store.list_messages(&session.id, None).unwrap();
        let roles: Vec<_> = messages.iter().map(|m| m.role).collect();
        assert_eq!(roles, vec![Role::Assistant, Role::User, Role::Assistant]);

        let events = store
            .list_key_events_by_type(&session.id, KeyEventKind::ActionChoice)
            .unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].data["choice_id"], "choice_work_7");
        assert_eq!(events[0].data["state_snapshot"]["energy"], 90);
        assert_eq!(events[0].data["state_snapshot"]["progress"], 15);

        // The generated turn's choices are now the valid ones.
        let next = orchestrator.resolve_turn(&session.id, "Nap").await.unwrap();
        assert_eq!(next.source, TurnSource::Generated);
        let events = store
            .list_key_events_by_type(&session.id, KeyEventKind::ActionChoice)
            .unwrap();
        assert_eq!(events[1].data["choice_id"], "b");
        assert_eq!(events[1].data["state_snapshot"]["suspicion"], 20);
    }

    #[tokio::test]
    async fn unknown_choice_and_closed_session() {
        let provider = ScriptedProvider::new(vec![Err(TransportFailure::EmptyBody)]);
        let orchestrator = orchestrator(provider);
        let (session, _) = orchestrator.start_session("Ada", "normal", Some(3)).await.unwrap();

        let err = orchestrator.resolve_turn(&session.id, "dance").await.unwrap_err();
        assert!(matches!(err, ApiError::UnknownChoice { .. }));

        orchestrator.abandon_session(&session.id).unwrap();
        let err = orchestrator
            .resolve_turn(&session.id, "choice_work_3")
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::SessionClosed(_)));

        let err = orchestrator.resolve_turn("missing", "x").await.unwrap_err();
        assert!(matches!(
            err,
            ApiError::StorageError(StorageError::SessionNotFound(_))
        ));
    }

    #[tokio::test]
    async fn game_over_completes_session() {
        let mut over: Value = serde_json::from_str(&continuation_json()).unwrap();
        over["is_game_over"] = json!(true);
        over["game_over_reason"] = json!("Fired");
        let provider = ScriptedProvider::new(vec![
            Err(TransportFailure::EmptyBody),
            Ok(over.to_string()),
        ]);
        let orchestrator = orchestrator(provider);
        let (session, _) = orchestrator.start_session("Ada", "normal", Some(5)).await.unwrap();
        let outcome = orchestrator
            .resolve_turn(&session.id, "choice_slack_5")
            .await
            .unwrap();
        assert!(outcome.payload.is_game_over());

        let stored = orchestrator.store().get_session(&session.id).unwrap().unwrap();
        assert_eq!(stored.status, SessionStatus::Completed);
        let events = orchestrator
            .store()
            .list_key_events_by_type(&session.id, KeyEventKind::GameOver)
            .unwrap();
        assert_eq!(events[0].data["reason"], "Fired");
    }

    #[test]
    fn effects_are_clamped() {
        let state = PlayerState::from([("energy".to_string(), 5), ("salary".to_string(), 5000)]);
        let effects = BTreeMap::from([
            ("energy".to_string(), -20),
            ("salary".to_string(), -6000),
        ]);
        let next = apply_effects(&state, &effects);
        assert_eq!(next["energy"], 0);
        assert_eq!(next["salary"], -1000);
        assert_eq!(next["turn"], 1);
    }
}
