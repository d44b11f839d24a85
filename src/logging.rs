use tracing_subscriber::EnvFilter;

/// Create an environment filter based on verbosity level
pub fn create_env_filter(verbosity: u8) -> EnvFilter {
    if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        verbosity_filter(verbosity)
    }
}

/// Filter used when `RUST_LOG` is not set
fn verbosity_filter(verbosity: u8) -> EnvFilter {
    match verbosity {
        0 => EnvFilter::new("sshconf=warn"),
        1 => EnvFilter::new("sshconf=info"),
        2 => EnvFilter::new("sshconf=debug"),
        _ => EnvFilter::new("sshconf=trace"),
    }
}

/// Initialize logging to stderr so that stdout carries only command output.
pub fn init_logging(verbosity: u8) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(create_env_filter(verbosity))
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
