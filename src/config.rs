//! Location of the ssh config file to edit.

use crate::error::{ConfigError, Result};
use std::path::{Path, PathBuf};

/// Config file location relative to the home directory
pub const DEFAULT_CONFIG_PATH: &str = ".ssh/config";

/// Environment variable name for overriding the config path
pub const CONFIG_PATH_ENV_VAR: &str = "SSHCONF_FILE";

/// Picks the config path: an explicit path first, then the environment
/// variable, then `~/.ssh/config`.
pub fn resolve_config_path(explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }
    if let Some(path) = std::env::var_os(CONFIG_PATH_ENV_VAR).filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(path));
    }
    dirs::home_dir()
        .map(|home| home.join(DEFAULT_CONFIG_PATH))
        .ok_or(ConfigError::NoHomeDir)
}
