//! Context domain: message log, token estimation, summarization and bounded context assembly.

pub mod builder;
pub mod log;
pub mod summarizer;
pub mod token;

pub use builder::{ContextBuilder, ContextConfig, SUMMARY_PREFIX};
pub use log::{MessageLog, TokenStats};
pub use summarizer::{format_summary, NarrativeCompressor, SummarizeError, Summarizer, SummaryConfig};
pub use token::{CharRatioEstimator, TokenEstimator};
