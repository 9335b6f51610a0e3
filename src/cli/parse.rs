//! CLI parse: clap types for loafer. No behavior; definitions only.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Loafer CLI - inspect and play office-survival sessions
#[derive(Parser)]
#[command(name = "loafer")]
#[command(about = "Resilient turn generation for an office-survival narrative game")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Workspace root directory
    #[arg(long, default_value = ".")]
    pub workspace: PathBuf,

    /// Configuration file path (overrides default config loading)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging (default: off)
    #[arg(long, default_value = "false")]
    pub verbose: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file)
    #[arg(long)]
    pub log_output: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start a session and show its opening turn
    Start {
        /// Player name
        #[arg(long, default_value = "Player")]
        name: String,
        /// Difficulty label
        #[arg(long, default_value = "normal")]
        difficulty: String,
        /// Fixed seed (random when omitted)
        #[arg(long)]
        seed: Option<u64>,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Resolve one choice for a session
    Turn {
        /// Session id
        session: String,
        /// Choice id or exact choice text
        choice: String,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Play interactively until game over or quit
    Play {
        /// Resume an existing session instead of starting one
        #[arg(long)]
        session: Option<String>,
        #[arg(long, default_value = "Player")]
        name: String,
        #[arg(long, default_value = "normal")]
        difficulty: String,
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Mark an active session abandoned
    Abandon { session: String },
    /// Show the bounded context for the next provider call (may summarize)
    Context {
        session: String,
        /// Token budget (defaults to context.token_budget)
        #[arg(long)]
        budget: Option<usize>,
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Show every summary and every unsummarized message, without compaction
    Rebuild {
        session: String,
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Show message and token statistics for a session
    Stats {
        session: String,
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// List stored sessions, newest first
    Sessions {
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Synthesize offline fallback content for a seed
    Fallback {
        #[arg(long)]
        seed: u64,
        /// Request kind (initial or continuation)
        #[arg(long, default_value = "initial")]
        kind: String,
        #[arg(long, default_value = "Player")]
        name: String,
        #[arg(long, default_value = "normal")]
        difficulty: String,
        /// Turn number (continuation only)
        #[arg(long, default_value = "1")]
        turn: u64,
        /// Last player action (continuation only)
        #[arg(long)]
        last_action: Option<String>,
        /// Validate the synthesized payload and report violations
        #[arg(long)]
        check: bool,
    },
    /// Show the effective configuration
    Config {
        /// Only validate; print problems instead of the configuration
        #[arg(long)]
        validate: bool,
    },
}
