//! CLI presentation: text and JSON formatting for turns, contexts and statistics.

use crate::context::TokenStats;
use crate::error::ApiError;
use crate::generation::{GenerationPayload, TurnOutcome, TurnSource, ValidationReport};
use crate::types::{ContextEntry, Session};
use comfy_table::presets::UTF8_BORDERS_ONLY;
use comfy_table::Table;
use owo_colors::OwoColorize;
use serde::Serialize;
use serde_json::json;

/// Format a section heading with bold/underline.
pub fn format_section_heading(title: &str) -> String {
    format!("{}", title.bold().underline())
}

pub fn to_json<T: Serialize>(value: &T) -> Result<String, ApiError> {
    serde_json::to_string_pretty(value)
        .map_err(|e| ApiError::ConfigError(format!("Failed to serialize output: {}", e)))
}

fn source_label(source: TurnSource) -> String {
    match source {
        TurnSource::Generated => format!("{}", "generated".green()),
        TurnSource::Cached => format!("{}", "cached".cyan()),
        TurnSource::Fallback => format!("{}", "fallback".yellow()),
    }
}

/// Story, stats and choices of one payload.
pub fn format_payload_text(payload: &GenerationPayload) -> String {
    let mut out = String::new();
    if let GenerationPayload::Initial(turn) = payload {
        out.push_str(&format!(
            "{}\n  {} ({})\n\n",
            format_section_heading("Company"),
            turn.company_info.name,
            turn.company_info.company_type
        ));
        let mut table = Table::new();
        table.load_preset(UTF8_BORDERS_ONLY);
        table.set_header(vec!["Name", "Role", "Personality"]);
        for npc in &turn.npcs {
            table.add_row(vec![npc.name.clone(), npc.role.clone(), npc.personality.clone()]);
        }
        out.push_str(&format!("{}\n{}\n\n", format_section_heading("People"), table));
    }

    out.push_str(&format!(
        "{}\n{}\n\n",
        format_section_heading("Story"),
        payload.story_context()
    ));

    let stats = payload
        .player_state()
        .iter()
        .map(|(stat, value)| format!("{}={}", stat, value))
        .collect::<Vec<_>>()
        .join("  ");
    out.push_str(&format!("{}\n  {}\n\n", format_section_heading("Stats"), stats));

    if payload.is_game_over() {
        out.push_str(&format!(
            "{}\n  {}\n",
            "GAME OVER".red().bold(),
            payload.game_over_reason().unwrap_or("The game has ended.")
        ));
        return out;
    }

    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["Id", "Choice", "Effects"]);
    for choice in payload.choices() {
        let effects = choice
            .effects
            .iter()
            .map(|(stat, delta)| format!("{}{:+}", stat, delta))
            .collect::<Vec<_>>()
            .join(" ");
        table.add_row(vec![choice.id.clone(), choice.text.clone(), effects]);
    }
    out.push_str(&format!("{}\n{}\n", format_section_heading("Choices"), table));
    out
}

pub fn format_turn_text(session_id: Option<&str>, outcome: &TurnOutcome) -> String {
    let mut out = String::new();
    if let Some(id) = session_id {
        out.push_str(&format!("Session: {}\n", id));
    }
    out.push_str(&format!(
        "Source: {} ({} ms)\n",
        source_label(outcome.source),
        outcome.trace.total_ms()
    ));
    if let Some(rejection) = &outcome.rejection {
        out.push_str(&format!("Provider output rejected: {}\n", rejection.dimmed()));
    }
    out.push('\n');
    out.push_str(&format_payload_text(&outcome.payload));
    out
}

pub fn format_turn_json(session_id: Option<&str>, outcome: &TurnOutcome) -> Result<String, ApiError> {
    to_json(&json!({
        "session_id": session_id,
        "source": outcome.source,
        "rejection": outcome.rejection.as_ref().map(|r| r.to_string()),
        "trace": outcome.trace,
        "payload": outcome.payload,
    }))
}

pub fn format_context_text(entries: &[ContextEntry]) -> String {
    if entries.is_empty() {
        return "Context is empty.\n".to_string();
    }
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["#", "Role", "Content"]);
    for (i, entry) in entries.iter().enumerate() {
        table.add_row(vec![
            i.to_string(),
            entry.role.to_string(),
            truncate(&entry.content, 120),
        ]);
    }
    format!("{}\n", table)
}

pub fn format_stats_text(session: &Session, stats: &TokenStats, summaries: usize) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["Field", "Value"]);
    table.add_row(vec!["Status".to_string(), session.status.to_string()]);
    table.add_row(vec!["Seed".to_string(), session.seed.to_string()]);
    table.add_row(vec!["Messages".to_string(), stats.total_messages.to_string()]);
    table.add_row(vec!["Tokens".to_string(), stats.total_tokens.to_string()]);
    table.add_row(vec![
        "Avg tokens/message".to_string(),
        format!("{:.1}", stats.avg_tokens_per_message),
    ]);
    table.add_row(vec!["Summaries".to_string(), summaries.to_string()]);
    format!(
        "{}\n{}\n",
        format_section_heading(&format!("Session {}", session.id)),
        table
    )
}

pub fn format_sessions_text(sessions: &[Session]) -> String {
    if sessions.is_empty() {
        return "No sessions.\n".to_string();
    }
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["Id", "Player", "Status", "Seed", "Created"]);
    for session in sessions {
        table.add_row(vec![
            session.id.clone(),
            session.metadata_str("player_name").unwrap_or("-").to_string(),
            session.status.to_string(),
            session.seed.to_string(),
            session.created_at.format("%Y-%m-%d %H:%M").to_string(),
        ]);
    }
    format!("{}\n", table)
}

pub fn format_validation_report(report: &ValidationReport) -> String {
    if report.ok {
        return format!("{}\n", "Payload passes the content contract".green());
    }
    let mut out = format!("{}\n", "Payload violates the content contract".red());
    for violation in &report.violations {
        out.push_str(&format!("  - {}\n", violation));
    }
    out
}

fn truncate(text: &str, max_chars: usize) -> String {
    let flat = text.replace('\n', " ");
    if flat.chars().count() <= max_chars {
        flat
    } else {
        let cut: String = flat.chars().take(max_chars).collect();
        format!("{}...", cut)
    }
}
