//! Configuration System
//!
//! Layered configuration for turn generation: built-in defaults, the user-level file,
//! workspace files and `LOAFER__SECTION__KEY` environment overrides. Every section has
//! serde defaults so a missing file or section is never an error.

use crate::context::{ContextConfig, SummaryConfig};
use crate::generation::{CacheConfig, GenerationConfig, ValidatorConfig};
use crate::logging::LoggingConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub use crate::provider::{ProviderConfig, ProviderType};

mod facade;
mod merge;
mod sources;

pub use facade::ConfigLoader;

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoaferConfig {
    #[serde(default)]
    pub provider: ProviderConfig,

    #[serde(default)]
    pub generation: GenerationConfig,

    #[serde(default)]
    pub summary: SummaryConfig,

    #[serde(default)]
    pub context: ContextConfig,

    #[serde(default)]
    pub validator: ValidatorConfig,

    #[serde(default)]
    pub cache: CacheConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Storage location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// sled database directory; relative paths resolve against the workspace root
    #[serde(default = "default_store_path")]
    pub store_path: PathBuf,
}

fn default_store_path() -> PathBuf {
    PathBuf::from(".loafer/store")
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            store_path: default_store_path(),
        }
    }
}

impl StorageConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.store_path.as_os_str().is_empty() {
            return Err("Store path cannot be empty".to_string());
        }
        Ok(())
    }

    pub fn resolve_store_path(&self, workspace_root: &Path) -> PathBuf {
        if self.store_path.is_absolute() {
            self.store_path.clone()
        } else {
            workspace_root.join(&self.store_path)
        }
    }
}

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub section: &'static str,
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.section, self.message)
    }
}

impl std::error::Error for ValidationError {}

impl LoaferConfig {
    /// Validate the entire configuration, collecting every problem.
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let checks: [(&'static str, Result<(), String>); 7] = [
            ("provider", self.provider.validate()),
            ("generation", self.generation.validate()),
            ("summary", self.summary.validate()),
            ("context", self.context.validate()),
            ("validator", self.validator.validate()),
            ("cache", self.cache.validate()),
            ("storage", self.storage.validate()),
        ];

        let errors: Vec<ValidationError> = checks
            .into_iter()
            .filter_map(|(section, result)| {
                result.err().map(|message| ValidationError { section, message })
            })
            .collect();

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
