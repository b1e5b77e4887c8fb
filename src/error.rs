use thiserror::Error;

use crate::domain::error::DomainError;

/// Configuration-related errors with structured variants.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[source] toml::de::Error),
}

/// An uploaded table cannot be used at all.
///
/// Terminal for the current upload: the user has to fix the file and upload
/// it again.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("missing required column '{column}' (found: {})", .available.join(", "))]
    MissingColumn {
        column: &'static str,
        available: Vec<String>,
    },

    #[error("no value in column '{column}' could be read as a date ({rows} rows)")]
    UnparseableDateColumn { column: String, rows: usize },

    #[error("table has no header row")]
    EmptyHeader,
}

/// Snapshot store failures.
///
/// All of these are recoverable: a failed write never leaves partial state,
/// so the action can be retried as is.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("store query failed: {0}")]
    Query(String),

    #[error("malformed store data at {location}: {reason}")]
    Malformed { location: String, reason: String },

    #[error("store I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("prompt error: {0}")]
    Prompt(String),
}

impl Error {
    /// Whether retrying the same action may succeed.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Error::Store(_) | Error::Io(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<dialoguer::Error> for Error {
    fn from(err: dialoguer::Error) -> Self {
        Error::Prompt(err.to_string())
    }
}
