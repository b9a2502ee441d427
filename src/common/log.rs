//! Logging init: structured `tracing` output on stderr.

use anyhow::Result;
use tracing_subscriber::EnvFilter;

/// Default filter for a given `-v` count. `RUST_LOG` always wins.
pub fn default_filter(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "warn,shorturl_rs=info",
        _ => "warn,shorturl_rs=debug",
    }
}

/// Initialize logging to stderr. Returns Err if a subscriber is already
/// installed so the caller can carry on without one.
pub fn init_logging(verbosity: u8) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(verbosity)));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(false)
        .try_init()
        .map_err(anyhow::Error::msg)?;

    tracing::debug!("logging initialized");

    Ok(())
}
