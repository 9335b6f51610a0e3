//! Workspace config files under `<workspace>/config/`

use config::builder::DefaultState;
use config::{ConfigBuilder, ConfigError, File};
use std::path::{Path, PathBuf};
use tracing::debug;

const ENV_NAME_VAR: &str = "LOAFER_ENV";
const DEFAULT_ENV_NAME: &str = "development";

/// Candidate files in merge order: the base file, then the one for the active environment.
pub fn candidate_paths(workspace_root: &Path, env_name: Option<&str>) -> [PathBuf; 2] {
    let dir = workspace_root.join("config");
    let env_name = env_name.unwrap_or(DEFAULT_ENV_NAME);
    [dir.join("config.toml"), dir.join(format!("{}.toml", env_name))]
}

pub fn add_to_builder(
    builder: ConfigBuilder<DefaultState>,
    workspace_root: &Path,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    let env_name = std::env::var(ENV_NAME_VAR).ok().filter(|name| !name.is_empty());
    let found = candidate_paths(workspace_root, env_name.as_deref())
        .into_iter()
        .filter(|path| path.is_file());

    Ok(found.fold(builder, |builder, path| {
        debug!(config_path = %path.display(), "Workspace configuration file found");
        builder.add_source(File::from(path).required(false))
    }))
}
