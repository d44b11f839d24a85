use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "sshconf",
    version,
    about = "Query and edit ~/.ssh/config without disturbing its formatting",
    arg_required_else_help = true
)]
pub struct Cli {
    /// Config file to edit [default: $SSHCONF_FILE or ~/.ssh/config]
    #[arg(short, long, global = true, value_name = "PATH")]
    pub file: Option<PathBuf>,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Print the resulting file instead of saving it
    #[arg(short = 'n', long, global = true)]
    pub dry_run: bool,

    /// Highlight search matches
    #[arg(long, global = true, value_enum, default_value_t = ColorChoice::Auto)]
    pub color: ColorChoice,

    /// Match setting names literally instead of as patterns
    #[arg(long, global = true)]
    pub literal_keys: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Print the whole file
    Dump,
    /// Print every host, sorted by name
    List,
    /// Print one host section
    Show { host: String },
    /// Print hosts whose name or settings match a regular expression
    #[command(visible_alias = "find")]
    Search { pattern: String },
    /// Print one setting of a host
    Get { host: String, key: String },
    /// Create or update a host; a value of "-" removes the setting
    Set {
        host: String,
        /// Key/value pairs
        #[arg(
            required = true,
            num_args = 2..,
            value_names = ["KEY", "VALUE"],
            allow_hyphen_values = true
        )]
        settings: Vec<String>,
    },
    /// Remove one setting from a host
    Unset { host: String, key: String },
    /// Remove a host section
    #[command(visible_aliases = ["del", "delete"])]
    Rm { host: String },
    /// Duplicate a host, rewriting its Hostname
    #[command(visible_alias = "copy")]
    Cp { old: String, new: String },
    /// List files referenced by Include directives
    Includes,
}

impl Command {
    /// Commands that save the file after running.
    pub fn writes(&self) -> bool {
        matches!(
            self,
            Command::Set { .. } | Command::Unset { .. } | Command::Rm { .. } | Command::Cp { .. }
        )
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorChoice {
    Auto,
    Always,
    Never,
}

impl ColorChoice {
    pub fn enabled(self) -> bool {
        match self {
            ColorChoice::Always => true,
            ColorChoice::Never => false,
            ColorChoice::Auto => atty::is(atty::Stream::Stdout),
        }
    }
}
