// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::model::ToolchainDefaults;
use crate::errors::{CompwatchError, Result};

/// Environment variable consulted when `--config` is not given.
pub const CONFIG_ENV: &str = "COMPWATCH_CONFIG";

/// Load toolchain defaults from a TOML file.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<ToolchainDefaults> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|e| {
        CompwatchError::ConfigError(format!("reading {}: {e}", path.display()))
    })?;

    let defaults: ToolchainDefaults = toml::from_str(&contents)?;
    debug!(path = %path.display(), ?defaults, "loaded toolchain defaults");

    Ok(defaults)
}

/// Load defaults from the explicit path, or from `COMPWATCH_CONFIG`.
///
/// With neither set, built-in defaults apply.
pub fn load_defaults(explicit: Option<&Path>) -> Result<ToolchainDefaults> {
    let path = explicit
        .map(Path::to_path_buf)
        .or_else(|| std::env::var_os(CONFIG_ENV).map(PathBuf::from));

    match path {
        Some(p) => load_from_path(p),
        None => Ok(ToolchainDefaults::default()),
    }
}
