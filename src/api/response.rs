//! Response types for the absence rating API.
//!
//! This module defines the success envelope, the error response structures
//! and the mapping from engine errors to HTTP status codes.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::calculation::HeaderRename;
use crate::error::EngineError;
use crate::models::{
    CleanedRecord, CleaningReport, PeriodEmployeeAggregate, PeriodRollup, RatingResult,
};

/// Successful response from the `/rate` endpoint.
///
/// Everything below `duration_us` is deterministic for a given request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RatingResponse {
    /// Unique identifier for this invocation.
    pub calculation_id: Uuid,
    /// When the invocation completed.
    pub timestamp: DateTime<Utc>,
    /// Version of the engine that produced the result.
    pub engine_version: String,
    /// Wall-clock time spent in the pipeline, in microseconds.
    pub duration_us: u64,
    /// Headers renamed to their canonical names.
    pub header_renames: Vec<HeaderRename>,
    /// Rows surviving every cleaning stage, with recomputed day values.
    pub cleaned: Vec<CleanedRecord>,
    /// What each cleaning stage did.
    pub report: CleaningReport,
    /// Day totals per period and employee.
    pub aggregate: PeriodEmployeeAggregate,
    /// Staff and day totals per period.
    pub period_rollups: Vec<PeriodRollup>,
    /// Tiers, costs and premium.
    pub rating: RatingResult,
}

/// API error response structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Optional details about the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    /// Creates a new API error with details.
    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: Some(details.into()),
        }
    }

    /// Creates a malformed JSON error response.
    pub fn malformed_json(message: impl Into<String>) -> Self {
        Self::new("MALFORMED_JSON", message)
    }
}

/// API error with HTTP status code.
pub struct ApiErrorResponse {
    /// The HTTP status code.
    pub status: StatusCode,
    /// The error body.
    pub error: ApiError,
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.error)).into_response()
    }
}

impl From<EngineError> for ApiErrorResponse {
    fn from(error: EngineError) -> Self {
        let message = error.to_string();
        match error {
            EngineError::Schema { missing_columns } => ApiErrorResponse {
                status: StatusCode::BAD_REQUEST,
                error: ApiError::with_details(
                    "SCHEMA_ERROR",
                    message,
                    format!("Required columns absent from the table header: {:?}", missing_columns),
                ),
            },
            EngineError::Parameter { field, .. } => ApiErrorResponse {
                status: StatusCode::BAD_REQUEST,
                error: ApiError::with_details(
                    "PARAMETER_ERROR",
                    message,
                    format!("Check the '{}' rating parameter", field),
                ),
            },
            EngineError::ConfigNotFound { path } => ApiErrorResponse {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                error: ApiError::with_details(
                    "CONFIG_ERROR",
                    "Configuration error",
                    format!("Configuration file not found: {}", path),
                ),
            },
            EngineError::ConfigParseError { path, message } => ApiErrorResponse {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                error: ApiError::with_details(
                    "CONFIG_ERROR",
                    "Configuration parse error",
                    format!("Failed to parse {}: {}", path, message),
                ),
            },
        }
    }
}
