//! CandGig Core - Shared Types
//!
//! Error taxonomy, configuration and tracing setup shared by the menu
//! builder and the cache worker. Contains no menu or caching logic.

pub mod config;
pub mod error;
pub mod telemetry;

pub use config::{ThemeConfig, WorkerConfig, DEFAULT_DYNAMIC_MANIFEST, DEFAULT_STATIC_MANIFEST};
pub use error::{
    CacheError, CandgigError, CandgigResult, ConfigError, EventError, FeedError, LifecycleError,
    MenuError, NetworkError,
};
pub use telemetry::{init_tracing, TelemetryConfig};
