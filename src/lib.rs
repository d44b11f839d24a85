//! # sshconf
//!
//! Query and edit the OpenSSH client config file while keeping every line
//! that an edit does not touch byte-identical.
//!
//! ```text
//! file text ── SshConfig::parse ──► SshConfig ── set/unset/rm/copy ──► SshConfig::dump ──► file text
//! ```

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod highlight;
pub mod include;
pub mod line;
pub mod logging;
pub mod section;
pub mod ssh_config;
pub mod store;

pub use error::{ConfigError, Result};
pub use section::{DELETE_MARKER, KeyMatch, Section};
pub use ssh_config::{LineEnding, SshConfig};
