//! Merge rules: defaults, override order, conflict handling.
//!
//! Later sources replace earlier ones key by key; tables merge, arrays replace.

use config::builder::DefaultState;
use config::Config;
use config::ConfigBuilder;
use config::ConfigError;

/// Create a Config builder with merge policy defaults applied.
pub fn builder_with_defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Config::builder()
        .set_default("provider.provider_type", "offline")?
        .set_default("context.token_budget", 12000)?
        .set_default("context.recent_window", 100)?
        .set_default("storage.store_path", ".loafer/store")
}
