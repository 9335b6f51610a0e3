//! Shared helpers for integration tests

use async_trait::async_trait;
use loafer::config::LoaferConfig;
use loafer::error::TransportFailure;
use loafer::generation::{FallbackEngine, GenerationOrchestrator, RequestKind, SessionFacts};
use loafer::provider::{
    ChatMessage, CompletionOptions, CompletionResponse, ModelProviderClient, TokenUsage,
};
use loafer::store::InMemorySessionStore;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

/// Provider that replays canned replies, optionally after a delay.
pub struct CannedProvider {
    replies: Mutex<Vec<Result<String, TransportFailure>>>,
    delay: Option<Duration>,
    calls: Mutex<usize>,
}

impl CannedProvider {
    pub fn new(replies: Vec<Result<String, TransportFailure>>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies),
            delay: None,
            calls: Mutex::new(0),
        })
    }

    pub fn slow(delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(vec![Ok("{}".to_string())]),
            delay: Some(delay),
            calls: Mutex::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        *self.calls.lock()
    }
}

#[async_trait]
impl ModelProviderClient for CannedProvider {
    async fn complete(
        &self,
        _messages: Vec<ChatMessage>,
        _options: CompletionOptions,
    ) -> Result<CompletionResponse, TransportFailure> {
        *self.calls.lock() += 1;
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let reply = {
            let mut replies = self.replies.lock();
            if replies.len() > 1 {
                replies.remove(0)
            } else {
                replies[0].clone()
            }
        };
        reply.map(|content| CompletionResponse {
            content,
            model: "canned".into(),
            usage: TokenUsage::default(),
            finish_reason: Some("stop".into()),
        })
    }

    fn provider_name(&self) -> &str {
        "canned"
    }

    fn model_name(&self) -> &str {
        "canned"
    }
}

pub fn orchestrator_with(
    provider: Arc<CannedProvider>,
    config: &LoaferConfig,
) -> (Arc<InMemorySessionStore>, GenerationOrchestrator) {
    let store = Arc::new(InMemorySessionStore::new());
    let orchestrator = GenerationOrchestrator::new(store.clone(), provider, config);
    (store, orchestrator)
}

/// A contract-valid reply body for `kind`, as a provider would send it.
pub fn valid_reply(seed: u64, kind: RequestKind) -> String {
    let facts = SessionFacts {
        turn: 1,
        ..SessionFacts::new("Ada", "normal")
    };
    let payload = FallbackEngine::default().synthesize(seed, kind, &facts);
    serde_json::to_string(&payload).unwrap()
}
