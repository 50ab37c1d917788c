use std::time::Duration;

use sellerdesk_domain::{Result, SellerDeskError};
use tracing::{info, warn};
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

/// Environment variable that switches output to JSON lines.
pub const LOG_FORMAT_ENV: &str = "SELLERDESK_LOG_FORMAT";

/// Subscriber settings for the process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    /// Directive used when `RUST_LOG` is unset or invalid.
    pub default_directive: String,
    /// Emit one JSON object per event instead of human-readable lines.
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { default_directive: "info".to_string(), json: false }
    }
}

impl LoggingConfig {
    /// Defaults, with `SELLERDESK_LOG_FORMAT=json` enabling JSON output.
    pub fn from_env() -> Self {
        let json = std::env::var(LOG_FORMAT_ENV)
            .map(|value| value.trim().eq_ignore_ascii_case("json"))
            .unwrap_or(false);
        Self { json, ..Self::default() }
    }
}

/// Filter honouring `RUST_LOG`, falling back to the configured directive.
pub fn env_filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.default_directive))
}

/// Install the global subscriber. Events go to stderr.
///
/// # Errors
/// Returns `SellerDeskError::Internal` if a global subscriber is already set.
pub fn init(config: &LoggingConfig) -> Result<()> {
    let filter = env_filter(config);
    let registry = tracing_subscriber::registry().with(filter);

    let result = if config.json {
        registry.with(fmt::layer().json().with_writer(std::io::stderr)).try_init()
    } else {
        registry.with(fmt::layer().with_target(true).with_writer(std::io::stderr)).try_init()
    };

    result.map_err(|e| SellerDeskError::Internal(format!("failed to install tracing subscriber: {e}")))
}

/// Log the outcome of an operation with structured fields.
///
/// `command` should be a stable identifier such as `"inventory::query"`;
/// never pass request payloads or credentials.
#[inline]
pub fn log_command_execution(command: &str, elapsed: Duration, error: Option<&SellerDeskError>) {
    let duration_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);

    match error {
        None => info!(command, duration_ms, "command_execution_success"),
        Some(err) => warn!(
            command,
            duration_ms,
            error_type = err.label(),
            error = %err,
            "command_execution_failure"
        ),
    }
}
