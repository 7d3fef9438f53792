//! HTTP request handlers for the absence rating API.
//!
//! This module contains the handler functions for all API endpoints.

use std::time::Instant;

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::{StatusCode, header},
    response::IntoResponse,
    routing::post,
};
use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::calculation::{normalize_headers, run_pipeline};
use crate::config::PipelineConfig;

use super::request::RatingRequest;
use super::response::{ApiError, ApiErrorResponse, RatingResponse};
use super::state::AppState;

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/rate", post(rate_handler))
        .with_state(state)
}

/// Handler for POST /rate endpoint.
///
/// Normalizes the table headers, runs the full pipeline with the request's
/// overrides layered over the loaded configuration, and returns the result.
async fn rate_handler(
    State(state): State<AppState>,
    payload: Result<Json<RatingRequest>, JsonRejection>,
) -> impl IntoResponse {
    // Generate correlation ID for request tracking
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing rating request");

    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => {
            let error = match rejection {
                JsonRejection::JsonDataError(err) => {
                    let body_text = err.body_text();
                    warn!(
                        correlation_id = %correlation_id,
                        error = %body_text,
                        "JSON data error"
                    );
                    ApiError::malformed_json(body_text)
                }
                JsonRejection::JsonSyntaxError(err) => {
                    warn!(
                        correlation_id = %correlation_id,
                        error = %err,
                        "JSON syntax error"
                    );
                    ApiError::malformed_json(format!("Invalid JSON syntax: {}", err))
                }
                JsonRejection::MissingJsonContentType(_) => {
                    ApiError::new("MISSING_CONTENT_TYPE", "Content-Type must be application/json")
                }
                _ => ApiError::malformed_json("Failed to parse request body"),
            };
            return (
                StatusCode::BAD_REQUEST,
                [(header::CONTENT_TYPE, "application/json")],
                Json(error),
            )
                .into_response();
        }
    };

    let defaults = state.config().config();
    let config = PipelineConfig {
        rating: request.rating.unwrap_or_else(|| defaults.rating.clone()),
        cleaning: request.cleaning.unwrap_or_else(|| defaults.cleaning.clone()),
    };

    let start_time = Instant::now();
    let mapped = normalize_headers(request.table);
    match run_pipeline(&mapped.table, &config) {
        Ok(output) => {
            let duration_us = u64::try_from(start_time.elapsed().as_micros()).unwrap_or(u64::MAX);
            info!(
                correlation_id = %correlation_id,
                input_rows = output.report.input_rows,
                output_rows = output.report.output_rows,
                total_premium = %output.rating.premium.total_premium,
                duration_us,
                "Rating completed successfully"
            );
            let response = RatingResponse {
                calculation_id: correlation_id,
                timestamp: Utc::now(),
                engine_version: env!("CARGO_PKG_VERSION").to_string(),
                duration_us,
                header_renames: mapped.renames,
                cleaned: output.cleaned,
                report: output.report,
                aggregate: output.aggregate,
                period_rollups: output.period_rollups,
                rating: output.rating,
            };
            (
                StatusCode::OK,
                [(header::CONTENT_TYPE, "application/json")],
                Json(response),
            )
                .into_response()
        }
        Err(err) => {
            warn!(
                correlation_id = %correlation_id,
                error = %err,
                "Rating failed"
            );
            let api_error: ApiErrorResponse = err.into();
            (
                api_error.status,
                [(header::CONTENT_TYPE, "application/json")],
                Json(api_error.error),
            )
                .into_response()
        }
    }
}
