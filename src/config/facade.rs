//! Entry points for loading configuration.

use super::merge::merge_policy;
use super::sources::{environment, global_file, workspace_file};
use super::LoaferConfig;
use config::{ConfigError, File};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Loads [`LoaferConfig`] from its layered sources
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration for a workspace.
    ///
    /// Precedence (lowest to highest): defaults, user file, `config/config.toml`,
    /// `config/{LOAFER_ENV}.toml`, `LOAFER__*` environment variables.
    pub fn load(workspace_root: &Path) -> Result<LoaferConfig, ConfigError> {
        let builder = merge_policy::builder_with_defaults()?;
        let builder = global_file::add_to_builder(builder)?;
        let builder = workspace_file::add_to_builder(builder, workspace_root)?;
        let builder = environment::add_to_builder(builder);

        let config: LoaferConfig = builder.build()?.try_deserialize()?;
        debug!(
            workspace = %workspace_root.display(),
            provider = ?config.provider.provider_type,
            "Configuration loaded"
        );
        Ok(config)
    }

    /// Load configuration from a single file on top of the defaults.
    pub fn load_from_file(path: &Path) -> Result<LoaferConfig, ConfigError> {
        merge_policy::builder_with_defaults()?
            .add_source(File::from(path))
            .build()?
            .try_deserialize()
    }

    /// User-level config file location, whether or not it exists.
    pub fn xdg_config_path() -> Option<PathBuf> {
        global_file::global_config_path()
    }
}
