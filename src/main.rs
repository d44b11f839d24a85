use anyhow::{Context as _, Result};
use clap::Parser;
use sshconf::cli::Cli;
use sshconf::commands::{self, Context};
use sshconf::config::resolve_config_path;
use sshconf::logging::init_logging;
use sshconf::{KeyMatch, store};
use std::io::Write;

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config_path = resolve_config_path(cli.file.as_deref())?;
    tracing::debug!("using config file {}", config_path.display());

    // An unreadable file aborts before any command runs
    let mut config = store::load(&config_path)?;
    if cli.literal_keys {
        config.set_key_match(KeyMatch::Literal);
    }

    let ctx = Context {
        config_path: &config_path,
        highlight: cli.color.enabled(),
    };
    let outcome = commands::execute(&mut config, &cli.command, &ctx)?;

    let mut stdout = std::io::stdout().lock();
    if cli.command.writes() {
        if !outcome.changed {
            tracing::debug!("{:?} left the document unchanged", cli.command);
        }
        if cli.dry_run {
            tracing::info!("dry run, not saving {}", config_path.display());
            stdout.write_all(config.dump().as_bytes())?;
            return Ok(());
        }
        let backup = store::save(&config, &config_path)
            .with_context(|| format!("not saving {}", config_path.display()))?;
        tracing::info!(
            "saved {} (previous version in {})",
            config_path.display(),
            backup.display()
        );
    }

    stdout.write_all(outcome.output.as_bytes())?;
    stdout.flush()?;
    Ok(())
}
