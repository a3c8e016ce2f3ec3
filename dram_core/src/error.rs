//! Error types for the dram_core library.
//!
//! Only the persistence, configuration and import surface is fallible. The
//! calculators and the aggregation engine clamp and guard instead of erroring.

use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for dram_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Input failed a construction precondition
    #[error("Validation error: {0}")]
    Validation(String),

    /// Event store error
    #[error("Store error: {0}")]
    Store(String),

    /// CSV import row could not be turned into an event
    #[error("Import error: {0}")]
    Import(String),

    /// Event or preset id does not exist in the store
    #[error("Not found: {0}")]
    NotFound(String),
}
