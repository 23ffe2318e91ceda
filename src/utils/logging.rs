//! Structured logging setup on top of `tracing-subscriber`.
//!
//! The library only emits `tracing` events; installing a subscriber is left to
//! the application. [`init_logging`] is the one-call setup for binaries and
//! tests that just want the configured level on stdout.

use crate::config::LoggingConfig;
use crate::error::{constants, ProtocolError, Result};
use tracing::info;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

/// Install a global fmt subscriber for `config`.
///
/// `RUST_LOG` directives take precedence over `config.log_level`. Fails with
/// [`ProtocolError::ConfigError`] if a global subscriber is already set.
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(config.log_level).into())
        .from_env_lossy();

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    let installed = if config.json_format {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    installed.map_err(|e| {
        ProtocolError::ConfigError(format!("{}: {e}", constants::ERR_GLOBAL_SUBSCRIBER))
    })?;

    info!(app = %config.app_name, level = %config.log_level, "Logging initialized");
    Ok(())
}
