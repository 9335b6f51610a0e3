//! Loafer: Resilient Turn Generation
//!
//! Turn-by-turn content for an office-survival narrative game. A bounded-memory context
//! manager keeps session history inside a token budget, a generation pipeline calls a
//! text provider and enforces a content contract, and a seeded fallback engine
//! reproduces equivalent content offline whenever the pipeline cannot.

pub mod cli;
pub mod config;
pub mod context;
pub mod error;
pub mod generation;
pub mod logging;
pub mod provider;
pub mod store;
pub mod types;
