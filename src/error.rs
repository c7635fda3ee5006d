//! Error types for the floe crate

use thiserror::Error;

/// Main error type for the floe crate
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error("map has no rows")]
    EmptyMap,

    #[error("map row {row} has {got} cells, expected {expected}")]
    InconsistentRowLength {
        row: usize,
        expected: usize,
        got: usize,
    },

    #[error("invalid cell character '{character}' at row {row}, column {col}")]
    InvalidCellCharacter {
        character: char,
        row: usize,
        col: usize,
    },

    #[error("unknown built-in map '{name}'. Expected one of: {expected}")]
    UnknownMap { name: String, expected: String },

    #[error("state {state} is out of range (state count {state_count})")]
    StateOutOfRange { state: usize, state_count: usize },

    #[error("{name} {value} must be a finite value in [0, 1]")]
    InvalidLearningParam { name: &'static str, value: f64 },

    #[error("{name} must be at least 1 millisecond")]
    InvalidDelay { name: &'static str },

    #[error(
        "q-table is {got_states}x{got_actions}, expected {expected_states}x{expected_actions}"
    )]
    QTableDimensionMismatch {
        expected_states: usize,
        expected_actions: usize,
        got_states: usize,
        got_actions: usize,
    },

    #[error("an intervention is already in flight")]
    InterventionInFlight,

    #[error("intervention source state {got} does not match the agent position {expected}")]
    InterventionMismatch { expected: usize, got: usize },

    #[error("no announced action for state {state}")]
    NoAnnouncedAction { state: usize },

    #[error("invalid intervention rule '{input}'. Expected one of: {expected}")]
    ParseInterventionRule { input: String, expected: String },

    #[error("invalid action '{input}'. Expected one of: left, down, right, up")]
    ParseAction { input: String },

    #[error("failed to {operation}: {source}")]
    Io {
        operation: String,
        #[source]
        source: std::io::Error,
    },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("failed to {operation}: {message}")]
    SerializationContext { operation: String, message: String },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("progress bar template error: {message}")]
    ProgressBarTemplate { message: String },
}

/// Convenience type alias for Results using the crate's Error type
pub type Result<T> = std::result::Result<T, Error>;

impl From<std::io::Error> for Error {
    fn from(source: std::io::Error) -> Self {
        Error::Io {
            operation: "IO operation".to_string(),
            source,
        }
    }
}
