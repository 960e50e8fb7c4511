//! Error types for roster loading and lookup.
//!
//! Only loading can fail. Searching never returns an error: an empty or
//! unclassifiable query simply yields no results.

use miette::Diagnostic;
use thiserror::Error;

/// Result type alias for roster operations.
pub type Result<T> = std::result::Result<T, RosterError>;

#[derive(Error, Debug, Diagnostic)]
pub enum RosterError {
    // =========================================================================
    // Source Errors
    // =========================================================================

    #[error("Network error: {0}")]
    #[diagnostic(
        code("ROSTER::NETWORK"),
        help("Check connectivity to the dataset host or use --local-dir")
    )]
    Network(#[from] reqwest::Error),

    #[error("Request to {url} failed with HTTP {status}")]
    #[diagnostic(code("ROSTER::HTTP_STATUS"))]
    Http { url: String, status: u16 },

    #[error("IO error: {0}")]
    #[diagnostic(code("ROSTER::IO"))]
    Io(#[from] std::io::Error),

    #[error("Malformed JSON document: {0}")]
    #[diagnostic(code("ROSTER::PARSE"))]
    Parse(#[from] serde_json::Error),

    #[error("Load task aborted: {0}")]
    #[diagnostic(code("ROSTER::TASK"))]
    Task(String),

    // =========================================================================
    // Input Errors
    // =========================================================================

    #[error("Unknown partition: {0}")]
    #[diagnostic(
        code("ROSTER::INVALID_PARTITION"),
        help("Use one of 2021, 2022, 2023, 2024 (or 21..24), or \"all\"")
    )]
    InvalidPartition(String),

    #[error("Unknown search mode: {0}")]
    #[diagnostic(
        code("ROSTER::INVALID_MODE"),
        help("Use one of auto, id, name, initials, fulltext")
    )]
    InvalidMode(String),

    #[error("Configuration error: {0}")]
    #[diagnostic(code("ROSTER::CONFIG"))]
    Config(String),
}

impl RosterError {
    /// Whether retrying the same load could succeed. Loads are retried once
    /// on a transient failure.
    pub fn is_transient(&self) -> bool {
        match self {
            RosterError::Network(_) | RosterError::Io(_) => true,
            RosterError::Http { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }
}
