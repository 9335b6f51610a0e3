//! Route table driven through parsed command lines

use clap::Parser;
use loafer::cli::{Cli, RunContext};
use loafer::error::ApiError;
use serde_json::Value;
use std::fs;
use tempfile::TempDir;

fn workspace() -> (TempDir, RunContext) {
    let temp = TempDir::new().unwrap();
    let config = temp.path().join("loafer.toml");
    fs::write(
        &config,
        "[provider]\nprovider_type = \"offline\"\n\n[storage]\nstore_path = \"state\"\n",
    )
    .unwrap();
    let context = RunContext::new(temp.path().to_path_buf(), Some(config)).unwrap();
    (temp, context)
}

fn run(context: &RunContext, args: &[&str]) -> Result<String, ApiError> {
    let mut argv = vec!["loafer"];
    argv.extend_from_slice(args);
    let cli = Cli::try_parse_from(argv).unwrap();
    context.execute(&cli.command)
}

#[test]
fn start_then_turn_offline() {
    let (temp, context) = workspace();
    assert!(temp.path().join("state").exists());

    let started: Value = serde_json::from_str(
        &run(&context, &["start", "--name", "Ada", "--seed", "12", "--format", "json"]).unwrap(),
    )
    .unwrap();
    assert_eq!(started["source"], "fallback");
    let session_id = started["session_id"].as_str().unwrap().to_string();
    let choice_id = started["payload"]["choices"][0]["id"].as_str().unwrap().to_string();

    let turn: Value = serde_json::from_str(
        &run(&context, &["turn", &session_id, &choice_id, "--format", "json"]).unwrap(),
    )
    .unwrap();
    assert!(turn["payload"]["story_context"].is_string());

    let stats: Value =
        serde_json::from_str(&run(&context, &["stats", &session_id, "--format", "json"]).unwrap())
            .unwrap();
    assert_eq!(stats["stats"]["total_messages"], 3);

    let sessions = run(&context, &["sessions"]).unwrap();
    assert!(sessions.contains(&session_id));

    let rebuilt = run(&context, &["rebuild", &session_id]).unwrap();
    assert!(rebuilt.contains("The player chose"));
}

#[test]
fn unknown_session_is_not_found() {
    let (_temp, context) = workspace();
    let err = run(&context, &["context", "missing"]).unwrap_err();
    assert!(loafer::cli::map_error(&err).contains("Session not found"));
}

#[test]
fn fallback_check_reports_clean_payload() {
    let (_temp, context) = workspace();
    let out = run(
        &context,
        &["fallback", "--seed", "3", "--kind", "continuation", "--turn", "4", "--check"],
    )
    .unwrap();
    assert!(out.contains("passes the content contract"));

    let err = run(&context, &["fallback", "--seed", "3", "--kind", "sideways"]).unwrap_err();
    assert!(matches!(err, ApiError::ConfigError(_)));
}

#[test]
fn config_masks_api_key() {
    let temp = TempDir::new().unwrap();
    let config = temp.path().join("loafer.toml");
    fs::write(
        &config,
        "[provider]\nprovider_type = \"ollama\"\napi_key = \"sk-secret\"\n",
    )
    .unwrap();
    let context = RunContext::new(temp.path().to_path_buf(), Some(config)).unwrap();

    let out = run(&context, &["config"]).unwrap();
    assert!(out.contains("********"));
    assert!(!out.contains("sk-secret"));
}

#[test]
fn invalid_config_is_rejected() {
    let temp = TempDir::new().unwrap();
    let config = temp.path().join("loafer.toml");
    fs::write(&config, "[cache]\nenabled = true\ncapacity = 0\n").unwrap();
    let err = RunContext::new(temp.path().to_path_buf(), Some(config))
        .err()
        .unwrap();
    assert!(matches!(err, ApiError::ConfigError(_)));
}
