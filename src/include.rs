//! Resolution of `Include` directives to the files they name.
//!
//! Included files are listed, never parsed or written.

use crate::ssh_config::SshConfig;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Existing files referenced by the `Include` directives of `config`, which
/// was read from `config_path`. Each file is reported once, in directive order.
pub fn resolve_includes(config: &SshConfig, config_path: &Path) -> Vec<PathBuf> {
    let mut seen = HashSet::new();
    let mut files = Vec::new();

    for pattern in config.include_patterns() {
        for path in expand_pattern(pattern, config_path) {
            let canonical = path.canonicalize().unwrap_or_else(|_| path.clone());
            if seen.insert(canonical) {
                files.push(path);
            }
        }
    }

    files
}

fn expand_pattern(pattern: &str, config_path: &Path) -> Vec<PathBuf> {
    // Expand ~ to home directory
    let expanded = match pattern.strip_prefix("~/") {
        Some(rest) => match dirs::home_dir() {
            Some(home) => home.join(rest),
            None => PathBuf::from(pattern),
        },
        None => PathBuf::from(pattern),
    };

    // Relative paths are relative to the config file's directory
    let include_path = if expanded.is_relative() {
        match config_path.parent() {
            Some(parent) => parent.join(expanded),
            None => expanded,
        }
    } else {
        expanded
    };

    let pattern_str = include_path.to_string_lossy().to_string();
    match glob::glob(&pattern_str) {
        Ok(paths) => {
            let mut matches: Vec<PathBuf> = paths
                .filter_map(|entry| match entry {
                    Ok(path) => Some(path),
                    Err(e) => {
                        warn!("skipping unreadable include match: {}", e);
                        None
                    }
                })
                .filter(|path| path.is_file())
                .collect();
            matches.sort();
            debug!("include '{}' matched {} file(s)", pattern, matches.len());
            matches
        }
        Err(e) => {
            // Not a valid glob; try it as a plain file name
            debug!("include '{}' is not a glob ({}), checking as a file", pattern, e);
            if include_path.is_file() {
                vec![include_path]
            } else {
                Vec::new()
            }
        }
    }
}
