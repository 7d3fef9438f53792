//! Request types for the absence rating API.
//!
//! This module defines the JSON request structure for the `/rate` endpoint.

use serde::{Deserialize, Serialize};

use crate::config::{CleaningRules, RatingParameters};
use crate::models::RawTable;

/// Request body for the `/rate` endpoint.
///
/// Carries the raw absence table and optional overrides for the loaded
/// configuration. Headers may use any spelling the alias table knows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RatingRequest {
    /// The raw absence table.
    pub table: RawTable,
    /// Replaces the configured rating parameters for this request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<RatingParameters>,
    /// Replaces the configured cleaning rules for this request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cleaning: Option<CleaningRules>,
}
