//! Error types for loading, editing and saving the ssh config file

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read (missing, permissions, not UTF-8)
    #[error("failed to read config file '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The previous file state could not be saved; the primary file is left alone
    #[error("failed to back up '{}' to '{}': {source}", path.display(), backup.display())]
    Backup {
        path: PathBuf,
        backup: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write config file '{}': {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Invalid search pattern
    #[error("invalid pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// `set` needs key/value pairs
    #[error("expected key/value pairs, got {count} argument(s)")]
    OddArguments { count: usize },

    /// Host name that would not read back as the same `Host` line
    #[error("invalid host name {name:?}")]
    InvalidHost { name: String },

    /// Setting name or value that cannot be written as a single line
    #[error("invalid setting {key:?} = {value:?}")]
    InvalidSetting { key: String, value: String },

    #[error("could not determine the home directory")]
    NoHomeDir,
}
