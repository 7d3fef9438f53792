//! Error types for the absence rating engine.
//!
//! Only conditions that stop a pipeline run are errors. Row-level data
//! quality problems are never raised; they are counted in the
//! [`CleaningReport`](crate::models::CleaningReport) instead.

use thiserror::Error;

/// The main error type for the absence rating engine.
///
/// # Example
///
/// ```
/// use absence_rating::error::EngineError;
///
/// let error = EngineError::ConfigNotFound {
///     path: "/missing/rating.yaml".to_string(),
/// };
/// assert_eq!(error.to_string(), "Configuration file not found: /missing/rating.yaml");
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// One or more required columns are absent from the input table.
    #[error("Missing required columns: {}", missing_columns.join(", "))]
    Schema {
        /// The canonical names of the missing columns.
        missing_columns: Vec<String>,
    },

    /// A rating or cleaning parameter is outside its documented bound.
    #[error("Invalid parameter '{field}': {message}")]
    Parameter {
        /// The offending parameter.
        field: String,
        /// Why the value was rejected.
        message: String,
    },

    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;
