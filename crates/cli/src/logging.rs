//! Logging setup for CLI commands

use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::{Directive, LevelFilter};

/// Parse log level from config string
fn parse_log_level(level: &str) -> Option<tracing::Level> {
  match level.to_lowercase().as_str() {
    "off" => None,
    "error" => Some(tracing::Level::ERROR),
    "warn" => Some(tracing::Level::WARN),
    "info" => Some(tracing::Level::INFO),
    "debug" => Some(tracing::Level::DEBUG),
    "trace" => Some(tracing::Level::TRACE),
    _ => Some(tracing::Level::INFO),
  }
}

/// Initialize console logging.
///
/// `RUST_LOG` overrides the configured level; `verbose` forces debug.
pub fn init_cli_logging(log_level: &str, verbose: bool) {
  let directive: Directive = if verbose {
    tracing::Level::DEBUG.into()
  } else {
    match parse_log_level(log_level) {
      Some(level) => level.into(),
      None => LevelFilter::OFF.into(),
    }
  };

  let env_filter = EnvFilter::builder().with_default_directive(directive).from_env_lossy();

  tracing_subscriber::fmt()
    .with_env_filter(env_filter)
    .with_target(false)
    .with_writer(std::io::stderr)
    .init();
}
