pub mod routes;
pub mod start;
pub mod status;

use std::path::PathBuf;

use miniultimax_core::config::{load_config, Config, ConfigSource};

/// File config with the environment applied on top
pub fn effective_config(path: Option<PathBuf>) -> anyhow::Result<(Config, ConfigSource)> {
    let (mut config, source) = load_config(path)?;
    config.apply_process_env()?;
    Ok((config, source))
}
