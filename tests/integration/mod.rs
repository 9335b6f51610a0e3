//! Integration tests for loafer

mod cli_commands;
mod context_budget;
mod orchestrator_fallback;
mod provider_http;
mod sled_store;
pub mod support;
