//! Typed errors for the matching library.
//!
//! Uses `thiserror` for library errors (not `anyhow`). Row-level failures
//! (`ParseFailure`, `SelectionError`, `SuggestionError`) are kept apart from
//! `MatchError` because the pipeline records them per row instead of aborting.

use thiserror::Error;

/// Errors that abort a whole run.
#[derive(Debug, Error)]
pub enum MatchError {
    /// A required column is absent from the input table
    #[error("required column '{column}' not found in the input table")]
    MissingColumn { column: String },

    /// Reading or writing a CSV table failed
    #[error("table error: {0}")]
    Table(#[from] csv::Error),

    /// File system error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// Process database failed
    #[error("database error: {0}")]
    Database(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// LCA engine failed
    #[error("LCA engine error: {0}")]
    Engine(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Invalid configuration
    #[error("config error: {0}")]
    Config(String),
}

/// Errors returned by a chat backend.
#[derive(Debug, Error)]
pub enum ChatError {
    /// The backend could not be reached or answered with an error
    #[error("chat backend error: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// No chat backend is configured (offline runs)
    #[error("chat backend unavailable: {0}")]
    Unavailable(String),
}

/// The alternative-term suggester could not get an answer.
#[derive(Debug, Error)]
#[error("alternative-term suggestion failed for '{activity}': {source}")]
pub struct SuggestionError {
    pub activity: String,
    #[source]
    pub source: ChatError,
}

/// The final selection among candidates could not be made.
#[derive(Debug, Error)]
pub enum SelectionError {
    /// The chat call behind the selection failed
    #[error("selection failed for row {row}: {source}")]
    Backend {
        row: usize,
        #[source]
        source: ChatError,
    },
}

/// A resolved label could not be split into process, location and unit.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("row {row}: cannot parse '{label}' into process, location and unit ({reason})")]
pub struct ParseFailure {
    pub row: usize,
    pub label: String,
    pub reason: String,
}

/// Result type alias for matching operations.
pub type Result<T> = std::result::Result<T, MatchError>;
