//! CLI route: single route table and run context. Dispatches to the orchestrator and
//! presentation.

use crate::cli::parse::Commands;
use crate::cli::presentation::{
    format_context_text, format_payload_text, format_sessions_text, format_stats_text,
    format_turn_json, format_turn_text, format_validation_report, to_json,
};
use crate::config::{ConfigLoader, LoaferConfig};
use crate::error::{ApiError, StorageError};
use crate::generation::{GenerationOrchestrator, RequestKind, SessionFacts, TurnOutcome};
use crate::store::{SessionStore, SledSessionStore};
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::runtime::Runtime;
use tracing::info;

/// Runtime context for CLI execution: workspace, configuration and the orchestrator.
pub struct RunContext {
    config: LoaferConfig,
    config_path: Option<PathBuf>,
    workspace_root: PathBuf,
    store: Arc<SledSessionStore>,
    orchestrator: GenerationOrchestrator,
    runtime: Runtime,
}

impl RunContext {
    /// Create run context from workspace root and optional config path.
    pub fn new(workspace_root: PathBuf, config_path: Option<PathBuf>) -> Result<Self, ApiError> {
        let config = match &config_path {
            Some(path) => ConfigLoader::load_from_file(path)?,
            None => ConfigLoader::load(&workspace_root)?,
        };
        config.validate().map_err(|errors| {
            ApiError::ConfigError(
                errors
                    .iter()
                    .map(|e| e.to_string())
                    .collect::<Vec<_>>()
                    .join("; "),
            )
        })?;

        let store_path = config.storage.resolve_store_path(&workspace_root);
        std::fs::create_dir_all(&store_path).map_err(StorageError::IoError)?;
        let store = Arc::new(SledSessionStore::open(&store_path)?);
        let orchestrator = GenerationOrchestrator::from_config(&config, store.clone())?;

        let runtime = Runtime::new()
            .map_err(|e| ApiError::ConfigError(format!("Failed to create runtime: {}", e)))?;

        info!(
            store = %store_path.display(),
            provider = ?config.provider.provider_type,
            "Run context ready"
        );
        Ok(Self {
            config,
            config_path,
            workspace_root,
            store,
            orchestrator,
            runtime,
        })
    }

    pub fn orchestrator(&self) -> &GenerationOrchestrator {
        &self.orchestrator
    }

    pub fn execute(&self, command: &Commands) -> Result<String, ApiError> {
        let output = match command {
            Commands::Start {
                name,
                difficulty,
                seed,
                format,
            } => self.handle_start(name, difficulty, *seed, format),
            Commands::Turn {
                session,
                choice,
                format,
            } => self.handle_turn(session, choice, format),
            Commands::Play {
                session,
                name,
                difficulty,
                seed,
            } => self.handle_play(session.as_deref(), name, difficulty, *seed),
            Commands::Context {
                session,
                budget,
                format,
            } => self.handle_context(session, *budget, format),
            Commands::Rebuild { session, format } => self.handle_rebuild(session, format),
            Commands::Stats { session, format } => self.handle_stats(session, format),
            Commands::Sessions { format } => self.handle_sessions(format),
            Commands::Fallback {
                seed,
                kind,
                name,
                difficulty,
                turn,
                last_action,
                check,
            } => self.handle_fallback(
                *seed,
                kind,
                name,
                difficulty,
                *turn,
                last_action.as_deref(),
                *check,
            ),
            Commands::Abandon { session } => self.handle_abandon(session),
            Commands::Config { validate } => self.handle_config(*validate),
        };
        self.store.flush()?;
        output
    }

    fn handle_start(
        &self,
        name: &str,
        difficulty: &str,
        seed: Option<u64>,
        format: &str,
    ) -> Result<String, ApiError> {
        let (session, outcome) = self
            .runtime
            .block_on(self.orchestrator.start_session(name, difficulty, seed))?;
        render_turn(Some(&session.id), &outcome, format)
    }

    fn handle_turn(&self, session_id: &str, choice: &str, format: &str) -> Result<String, ApiError> {
        let outcome = self
            .runtime
            .block_on(self.orchestrator.resolve_turn(session_id, choice))?;
        render_turn(Some(session_id), &outcome, format)
    }

    fn handle_play(
        &self,
        session_id: Option<&str>,
        name: &str,
        difficulty: &str,
        seed: Option<u64>,
    ) -> Result<String, ApiError> {
        use dialoguer::Select;

        let (session_id, mut payload) = match session_id {
            Some(id) => {
                let payload = self.orchestrator.latest_payload(id)?.ok_or_else(|| {
                    ApiError::StorageError(StorageError::SessionNotFound(id.to_string()))
                })?;
                println!("{}", format_payload_text(&payload));
                (id.to_string(), payload)
            }
            None => {
                let (session, outcome) = self
                    .runtime
                    .block_on(self.orchestrator.start_session(name, difficulty, seed))?;
                println!("{}", format_turn_text(Some(&session.id), &outcome));
                (session.id, outcome.payload)
            }
        };

        let mut turns = 0usize;
        while !payload.is_game_over() {
            let mut items: Vec<String> = payload.choices().iter().map(|c| c.text.clone()).collect();
            items.push("Quit".to_string());
            let selection = Select::new()
                .with_prompt("What do you do?")
                .items(&items)
                .default(0)
                .interact()
                .map_err(|e| ApiError::ConfigError(format!("Failed to get user input: {}", e)))?;
            let Some(choice) = payload.choices().get(selection) else {
                break;
            };
            let choice_id = choice.id.clone();
            let outcome = self
                .runtime
                .block_on(self.orchestrator.resolve_turn(&session_id, &choice_id))?;
            println!("{}", format_turn_text(None, &outcome));
            payload = outcome.payload;
            turns += 1;
        }

        Ok(format!(
            "Played {} turn(s) in session {}{}",
            turns,
            session_id,
            if payload.is_game_over() { " (game over)" } else { "" }
        ))
    }

    fn handle_abandon(&self, session_id: &str) -> Result<String, ApiError> {
        let session = self.orchestrator.abandon_session(session_id)?;
        Ok(format!("Session {} is now {}", session.id, session.status))
    }

    fn handle_context(
        &self,
        session_id: &str,
        budget: Option<usize>,
        format: &str,
    ) -> Result<String, ApiError> {
        self.require_session(session_id)?;
        let budget = budget.unwrap_or_else(|| self.orchestrator.token_budget());
        let entries = self
            .runtime
            .block_on(self.orchestrator.get_context_for_generation(session_id, budget))?;
        match format {
            "json" => to_json(&entries),
            _ => Ok(format_context_text(&entries)),
        }
    }

    fn handle_rebuild(&self, session_id: &str, format: &str) -> Result<String, ApiError> {
        self.require_session(session_id)?;
        let entries = self.orchestrator.rebuild_full_context(session_id)?;
        match format {
            "json" => to_json(&entries),
            _ => Ok(format_context_text(&entries)),
        }
    }

    fn handle_stats(&self, session_id: &str, format: &str) -> Result<String, ApiError> {
        let session = self.require_session(session_id)?;
        let stats = self.orchestrator.token_stats(session_id)?;
        let summaries = self.store.list_summaries(session_id)?.len();
        match format {
            "json" => to_json(&json!({
                "session": session,
                "stats": stats,
                "summaries": summaries,
            })),
            _ => Ok(format_stats_text(&session, &stats, summaries)),
        }
    }

    fn handle_sessions(&self, format: &str) -> Result<String, ApiError> {
        let sessions = self.store.list_sessions()?;
        match format {
            "json" => to_json(&sessions),
            _ => Ok(format_sessions_text(&sessions)),
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn handle_fallback(
        &self,
        seed: u64,
        kind: &str,
        name: &str,
        difficulty: &str,
        turn: u64,
        last_action: Option<&str>,
        check: bool,
    ) -> Result<String, ApiError> {
        let kind = match kind {
            "initial" => RequestKind::Initial,
            "continuation" => RequestKind::Continuation,
            other => {
                return Err(ApiError::ConfigError(format!(
                    "Unknown kind '{}': expected initial or continuation",
                    other
                )))
            }
        };
        let facts = SessionFacts {
            turn,
            last_action: last_action.map(str::to_string),
            ..SessionFacts::new(name, difficulty)
        };
        let payload = self.orchestrator.fallback().synthesize(seed, kind, &facts);
        let mut out = to_json(&payload)?;
        if check {
            let report = self.orchestrator.validator().validate_payload(&payload);
            out.push('\n');
            out.push_str(&format_validation_report(&report));
        }
        Ok(out)
    }

    fn handle_config(&self, validate: bool) -> Result<String, ApiError> {
        if validate {
            // Construction already rejected an invalid configuration.
            return Ok(format!(
                "Configuration is valid (source: {})",
                self.config_source()
            ));
        }
        let mut config = self.config.clone();
        if config.provider.api_key.is_some() {
            config.provider.api_key = Some("********".to_string());
        }
        toml::to_string_pretty(&config)
            .map(|text| format!("# source: {}\n{}", self.config_source(), text))
            .map_err(|e| ApiError::ConfigError(format!("Failed to render configuration: {}", e)))
    }

    fn config_source(&self) -> String {
        match &self.config_path {
            Some(path) => path.display().to_string(),
            None => format!("layered from {}", self.workspace_root.display()),
        }
    }

    fn require_session(&self, session_id: &str) -> Result<crate::types::Session, ApiError> {
        self.store
            .get_session(session_id)?
            .ok_or_else(|| StorageError::SessionNotFound(session_id.to_string()).into())
    }
}

fn render_turn(session_id: Option<&str>, outcome: &TurnOutcome, format: &str) -> Result<String, ApiError> {
    match format {
        "json" => format_turn_json(session_id, outcome),
        _ => Ok(format_turn_text(session_id, outcome)),
    }
}
