//! HTTP API module for the absence rating engine.
//!
//! This module exposes the cleaning and rating pipeline over HTTP:
//! `POST /rate` runs one pipeline invocation over a JSON table.

mod handlers;
mod request;
mod response;
mod state;

pub use handlers::create_router;
pub use request::RatingRequest;
pub use response::{ApiError, ApiErrorResponse, RatingResponse};
pub use state::AppState;
