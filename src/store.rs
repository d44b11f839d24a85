//! Reading the config file and writing it back with a backup.

use crate::error::{ConfigError, Result};
use crate::ssh_config::SshConfig;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;

/// Appended to the config path to name the backup file.
pub const BACKUP_SUFFIX: &str = "~";

pub fn load(path: &Path) -> Result<SshConfig> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    debug!("read {} byte(s) from {}", content.len(), path.display());
    Ok(SshConfig::parse(&content))
}

pub fn backup_path(path: &Path) -> PathBuf {
    let mut backup = path.as_os_str().to_owned();
    backup.push(BACKUP_SUFFIX);
    PathBuf::from(backup)
}

/// Copies the current file to its backup, then atomically replaces it with
/// `config`. Nothing is written when the backup fails. Returns the backup path.
pub fn save(config: &SshConfig, path: &Path) -> Result<PathBuf> {
    // Write through symlinks rather than replacing them
    let target = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());

    let backup = backup_path(path);
    fs::copy(&target, &backup).map_err(|source| ConfigError::Backup {
        path: path.to_path_buf(),
        backup: backup.clone(),
        source,
    })?;
    debug!("backed up {} to {}", path.display(), backup.display());

    write_atomic(&target, config.dump().as_bytes())?;
    debug!("wrote {}", target.display());
    Ok(backup)
}

fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let write_error = |source: std::io::Error| ConfigError::Write {
        path: path.to_path_buf(),
        source,
    };

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut temp = NamedTempFile::new_in(dir).map_err(write_error)?;
    temp.write_all(contents).map_err(write_error)?;

    // Keep the original file mode
    if let Ok(metadata) = fs::metadata(path) {
        temp.as_file()
            .set_permissions(metadata.permissions())
            .map_err(write_error)?;
    }
    temp.as_file().sync_all().map_err(write_error)?;
    temp.persist(path).map_err(|e| write_error(e.error))?;
    Ok(())
}
