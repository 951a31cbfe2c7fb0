//! Error types for CandGig operations

use thiserror::Error;

/// Menu construction errors.
///
/// These are always recovered locally by the builder: the offending entry
/// is skipped and the rest of the menu is still built.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MenuError {
    #[error("Menu entry at position {position} has an empty label")]
    EmptyLabel { position: usize },

    #[error("Menu entry '{label}' has no href")]
    MissingHref { label: String },
}

/// Cache storage errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CacheError {
    #[error("Cache partition not found: {name}")]
    PartitionNotFound { name: String },

    #[error("Cache storage lock poisoned")]
    LockPoisoned,

    #[error("Cache backend failure: {reason}")]
    Backend { reason: String },
}

/// Network errors raised by the fetch capability.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum NetworkError {
    #[error("Network unreachable for {url}: {reason}")]
    Unreachable { url: String, reason: String },

    #[error("Invalid request URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Request to {url} returned status {status}")]
    UnsuccessfulStatus { url: String, status: u16 },
}

/// Worker lifecycle errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LifecycleError {
    #[error("Invalid lifecycle transition from {from} to {to}")]
    InvalidTransition { from: String, to: String },

    #[error("Install failed while pre-caching {url}: {reason}")]
    InstallFailed { url: String, reason: String },
}

/// Post feed errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FeedError {
    #[error("Feed request for label '{label}' failed with status {status}: {message}")]
    RequestFailed {
        label: String,
        status: u16,
        message: String,
    },

    #[error("Invalid feed response for label '{label}': {reason}")]
    InvalidResponse { label: String, reason: String },
}

/// Configuration errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required configuration field: {field}")]
    MissingRequired { field: String },

    #[error("Invalid value for {field}: {value} - {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },
}

/// Errors decoding events delivered to the worker.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EventError {
    #[error("Malformed push payload: {reason}")]
    MalformedPush { reason: String },
}

/// Master error type for all CandGig errors.
#[derive(Debug, Clone, Error)]
pub enum CandgigError {
    #[error("Menu error: {0}")]
    Menu(#[from] MenuError),

    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    #[error("Lifecycle error: {0}")]
    Lifecycle(#[from] LifecycleError),

    #[error("Feed error: {0}")]
    Feed(#[from] FeedError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Event error: {0}")]
    Event(#[from] EventError),
}

/// Result type alias for CandGig operations.
pub type CandgigResult<T> = Result<T, CandgigError>;

// =============================================================================
// TESTS
// =============================================================================
