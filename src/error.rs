//! Error types for stacknag
//!
//! Library code returns `crate::error::Result<T>` with `StackNagError`. The
//! binary converts to `anyhow::Error` at the CLI boundary and maps the
//! underlying error back to an exit code through `exit_codes`.
//!
//! ## Taxonomy
//!
//! - Startup: `Config`, `PriceIndexMissing`, `PriceIndexInvalid`. Nothing has
//!   been fetched or sent yet when these surface.
//! - Request: `InvalidEvent`, `UnsupportedBuildPhase`. The whole invocation
//!   is rejected before any collaborator is called.
//! - Index completeness: `PriceNotFound`. An online resource has no price,
//!   which means the index is stale.
//! - Index construction: `DuplicateClass`, `PriceParse`, `Catalog`.
//! - Collaborators: `Aws`, `CloudProvider`, `Http`, `Notification`.
//!
//! Per-resource gaps (no database, no volumes, a bucket without a size
//! sample) are not errors at all; they are zero contributions.
//!
//! ## Retry Awareness
//!
//! `IsRetryable` decides what `RetryPolicy` retries. Only transport-level
//! failures are retryable: `CloudProvider`, `Io`, `Retryable`, and HTTP
//! timeouts or connect failures.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for stacknag
#[derive(Error, Debug)]
pub enum StackNagError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Price index is missing at {}. Run `stacknag build-index` to regenerate it", path.display())]
    PriceIndexMissing { path: PathBuf },

    #[error("Price index at {} is unreadable: {reason}", path.display())]
    PriceIndexInvalid { path: PathBuf, reason: String },

    #[error("No {category} price for {class} in the price index (run `stacknag build-index`)")]
    PriceNotFound { category: String, class: String },

    #[error("Duplicate {category} class after filtering: {class} (tighten the {category} rule set)")]
    DuplicateClass { category: String, class: String },

    #[error("Invalid on-demand price for SKU {sku}: {reason}")]
    PriceParse { sku: String, reason: String },

    #[error("Catalog error: {0}")]
    Catalog(String),

    #[error("Received invalid event: {0}")]
    InvalidEvent(String),

    #[error("Unsupported build phase {phase} for project {project}")]
    UnsupportedBuildPhase { project: String, phase: String },

    #[error("Stack {stack} reports {count} database instances, expected at most one")]
    MultipleDatabases { stack: String, count: usize },

    #[error("Cloud provider error: {provider} - {message}")]
    CloudProvider {
        provider: String,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("AWS SDK error: {0}")]
    Aws(String),

    #[error("Notification error: {0}")]
    Notification(String),

    #[error("Retryable error (attempt {attempt}/{max_attempts}): {reason}")]
    Retryable {
        attempt: u32,
        max_attempts: u32,
        reason: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required setting: {0}")]
    MissingField(String),

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Failed to parse config: {0}")]
    ParseError(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, StackNagError>;

/// Trait for determining if an error is retryable
///
/// Used by `RetryPolicy` implementations to determine whether an error
/// should trigger a retry attempt.
pub trait IsRetryable {
    fn is_retryable(&self) -> bool;
}

impl IsRetryable for StackNagError {
    fn is_retryable(&self) -> bool {
        match self {
            StackNagError::Retryable { .. }
            | StackNagError::CloudProvider { .. }
            | StackNagError::Io(_) => true,
            StackNagError::Http(e) => e.is_timeout() || e.is_connect(),
            _ => false,
        }
    }
}
