//! Tracing subscriber initialization.
//!
//! Binaries call [`init_tracing`] once at start-up; libraries only emit
//! `tracing` events and never install a subscriber themselves.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::{CandgigResult, ConfigError};

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "candgig=info,warn";

/// Telemetry configuration from environment variables.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// Emit JSON lines instead of human-readable output.
    pub json: bool,
    /// Filter directive used when `RUST_LOG` is unset.
    pub default_filter: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            json: std::env::var("CANDGIG_LOG_JSON")
                .map(|s| s == "true" || s == "1")
                .unwrap_or(false),
            default_filter: DEFAULT_FILTER.to_string(),
        }
    }
}

/// Initialize the global tracing subscriber.
pub fn init_tracing(config: &TelemetryConfig) -> CandgigResult<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.default_filter));

    let registry = tracing_subscriber::registry().with(env_filter);

    let result = if config.json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .try_init()
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .try_init()
    };

    result.map_err(|e| ConfigError::InvalidValue {
        field: "tracing".to_string(),
        value: config.default_filter.clone(),
        reason: format!("Failed to init subscriber: {}", e),
    })?;

    tracing::debug!(json = config.json, "Tracing initialized");
    Ok(())
}
