//! Generation domain: provider calls, extraction, the content contract, deterministic
//! fallback and the turn-resolution state machine.

pub mod cache;
pub mod client;
pub mod extract;
pub mod fallback;
pub mod orchestrator;
pub mod payload;
pub mod prompts;
pub mod validate;

pub use cache::{CacheConfig, CacheKey, ResponseCache};
pub use client::{GenerationClient, GenerationConfig, Limits};
pub use fallback::{FallbackEngine, SessionFacts, WeightedPool};
pub use orchestrator::{
    GenerationOrchestrator, Rejection, TraceStep, TurnOutcome, TurnSource, TurnState, TurnTrace,
};
pub use payload::{
    Choice, CompanyInfo, ContinuationTurn, GameMeta, GenerationPayload, InitialTurn,
    MagicalElement, Npc, PlayerState, RequestKind,
};
pub use validate::{ContentValidator, ValidationReport, ValidatorConfig, Violation, ViolationKind};
