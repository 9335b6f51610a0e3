//! CLI domain: parse, route, output and presentation only.
//! No turn logic; the single route table dispatches to the orchestrator.

mod output;
mod parse;
mod presentation;
mod route;

pub use output::map_error;
pub use parse::{Cli, Commands};
pub use presentation::{
    format_context_text, format_payload_text, format_section_heading, format_sessions_text,
    format_stats_text, format_turn_json, format_turn_text, format_validation_report, to_json,
};
pub use route::RunContext;
