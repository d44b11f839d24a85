//! Runs one CLI command against an in-memory config.

use crate::cli::Command;
use crate::error::Result;
use crate::highlight::highlight;
use crate::include::resolve_includes;
use crate::ssh_config::{SshConfig, compile_pattern, settings_from_args};
use std::path::Path;
use tracing::debug;

/// What a command printed and whether it changed the document.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Outcome {
    pub output: String,
    pub changed: bool,
}

impl Outcome {
    fn print(output: String) -> Self {
        Self {
            output,
            changed: false,
        }
    }
}

pub struct Context<'a> {
    pub config_path: &'a Path,
    pub highlight: bool,
}

pub fn execute(config: &mut SshConfig, command: &Command, ctx: &Context<'_>) -> Result<Outcome> {
    let newline = config.line_ending().as_str();
    debug!("executing {:?}", command);

    let outcome = match command {
        Command::Dump => Outcome::print(config.dump()),
        Command::List => Outcome::print(
            config
                .list()
                .into_iter()
                .map(|line| line + newline)
                .collect(),
        ),
        Command::Show { host } => Outcome::print(
            config
                .show(host)
                .map(|text| text + newline)
                .unwrap_or_default(),
        ),
        Command::Search { pattern } => {
            let re = compile_pattern(pattern)?;
            let mut output = String::new();
            for section in config.search(&re) {
                // Matching is per line, so highlighting is too
                for line in section.lines() {
                    if ctx.highlight {
                        output.push_str(&highlight(line, &re));
                    } else {
                        output.push_str(line);
                    }
                    output.push_str(newline);
                }
            }
            Outcome::print(output)
        }
        Command::Get { host, key } => Outcome::print(
            config
                .get(host, key)
                .map(|value| format!("{value}{newline}"))
                .unwrap_or_default(),
        ),
        Command::Set { host, settings } => {
            let pairs = settings_from_args(settings)?;
            let before = config.show(host);
            let section = config.set(host, &pairs)?;
            let after = section.render(newline);
            Outcome {
                changed: before.as_deref() != Some(after.as_str()),
                output: after + newline,
            }
        }
        Command::Unset { host, key } => {
            let changed = config.unset(host, key);
            Outcome {
                output: config
                    .show(host)
                    .map(|text| text + newline)
                    .unwrap_or_default(),
                changed,
            }
        }
        Command::Rm { host } => Outcome {
            output: String::new(),
            changed: config.rm(host),
        },
        Command::Cp { old, new } => {
            let changed = config.copy(old, new)?;
            Outcome {
                output: if changed {
                    config
                        .show(new)
                        .map(|text| text + newline)
                        .unwrap_or_default()
                } else {
                    String::new()
                },
                changed,
            }
        }
        Command::Includes => Outcome::print(
            resolve_includes(config, ctx.config_path)
                .into_iter()
                .map(|path| format!("{}{newline}", path.display()))
                .collect(),
        ),
    };

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConfigError;

    const SAMPLE: &str = "Host web1\n    Hostname web1.example.com\n    User admin\nHost db1\n    Hostname db1.internal\n";

    fn run(config: &mut SshConfig, command: Command) -> Outcome {
        let ctx = Context {
            config_path: Path::new("/nonexistent/config"),
            highlight: false,
        };
        execute(config, &command, &ctx).unwrap()
    }

    #[test]
    fn test_list_and_show() {
        let mut config = SshConfig::parse(SAMPLE);
        assert_eq!(run(&mut config, Command::List).output, "Host db1\nHost web1\n");
        assert_eq!(
            run(&mut config, Command::Show { host: "db1".into() }).output,
            "Host db1\n    Hostname db1.internal\n"
        );
        assert_eq!(run(&mut config, Command::Show { host: "ghost".into() }), Outcome::default());
    }

    #[test]
    fn test_set_reports_change() {
        let mut config = SshConfig::parse(SAMPLE);
        let outcome = run(
            &mut config,
            Command::Set {
                host: "db1".into(),
                settings: vec!["Port".into(), "5432".into()],
            },
        );
        assert!(outcome.changed);
        assert_eq!(
            outcome.output,
            "Host db1\n    Hostname db1.internal\n    Port 5432\n"
        );

        let again = run(
            &mut config,
            Command::Set {
                host: "db1".into(),
                settings: vec!["Port".into(), "5432".into()],
            },
        );
        assert!(!again.changed);
    }

    #[test]
    fn test_set_odd_arguments_fails() {
        let mut config = SshConfig::parse(SAMPLE);
        let ctx = Context {
            config_path: Path::new("config"),
            highlight: false,
        };
        let command = Command::Set {
            host: "db1".into(),
            settings: vec!["Port".into(), "22".into(), "User".into()],
        };
        assert!(matches!(
            execute(&mut config, &command, &ctx),
            Err(ConfigError::OddArguments { count: 3 })
        ));
        assert_eq!(config.dump(), SAMPLE);
    }

    #[test]
    fn test_search_highlight() {
        let mut config = SshConfig::parse(SAMPLE);
        let ctx = Context {
            config_path: Path::new("config"),
            highlight: true,
        };
        let command = Command::Search {
            pattern: "admin".into(),
        };
        let outcome = execute(&mut config, &command, &ctx).unwrap();
        assert!(outcome.output.starts_with("Host web1\n"));
        assert!(outcome.output.contains("User \x1b[1m\x1b[31madmin\x1b[0m"));
        assert!(!outcome.output.contains("db1"));
    }

    #[test]
    fn test_search_highlights_anchored_patterns() {
        let mut config = SshConfig::parse(SAMPLE);
        let ctx = Context {
            config_path: Path::new("config"),
            highlight: true,
        };
        let command = Command::Search {
            pattern: "internal$".into(),
        };
        let outcome = execute(&mut config, &command, &ctx).unwrap();
        assert_eq!(
            outcome.output,
            "Host db1\n    Hostname db1.\x1b[1m\x1b[31minternal\x1b[0m\n"
        );

        let command = Command::Search {
            pattern: "^    User".into(),
        };
        let outcome = execute(&mut config, &command, &ctx).unwrap();
        assert_eq!(
            outcome.output,
            "Host web1\n    Hostname web1.example.com\n\x1b[1m\x1b[31m    User\x1b[0m admin\n"
        );
    }

    #[test]
    fn test_set_invalid_host_fails() {
        let mut config = SshConfig::parse(SAMPLE);
        let ctx = Context {
            config_path: Path::new("config"),
            highlight: false,
        };
        let command = Command::Set {
            host: " ".into(),
            settings: vec!["User".into(), "x".into()],
        };
        assert!(matches!(
            execute(&mut config, &command, &ctx),
            Err(ConfigError::InvalidHost { .. })
        ));
        assert_eq!(config.dump(), SAMPLE);
    }

    #[test]
    fn test_get() {
        let mut config = SshConfig::parse(SAMPLE);
        let outcome = run(
            &mut config,
            Command::Get {
                host: "web1".into(),
                key: "hostname".into(),
            },
        );
        assert_eq!(outcome.output, "web1.example.com\n");
    }

    #[test]
    fn test_rm_and_cp() {
        let mut config = SshConfig::parse(SAMPLE);
        let outcome = run(
            &mut config,
            Command::Cp {
                old: "web1".into(),
                new: "web2".into(),
            },
        );
        assert!(outcome.changed);
        assert!(outcome.output.contains("Hostname web2.example.com"));

        assert!(run(&mut config, Command::Rm { host: "db1".into() }).changed);
        assert!(!run(&mut config, Command::Rm { host: "db1".into() }).changed);
        assert_eq!(run(&mut config, Command::List).output, "Host web1\nHost web2\n");
    }

    #[test]
    fn test_unset_unknown_host_is_noop() {
        let mut config = SshConfig::parse(SAMPLE);
        let outcome = run(
            &mut config,
            Command::Unset {
                host: "ghost".into(),
                key: "User".into(),
            },
        );
        assert_eq!(outcome, Outcome::default());
        assert_eq!(config.dump(), SAMPLE);
    }
}
