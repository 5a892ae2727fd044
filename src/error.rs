//! Error types for the quote service
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ErrorResponse;

// == Source Error ==
/// Transport-level failure talking to an upstream provider.
///
/// Missing or malformed fields in a response that did arrive are not errors;
/// clients report those as `None`.
#[derive(Error, Debug)]
pub enum SourceError {
    /// Timeout, DNS, connection reset or body read failure
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Provider could not be reached for another reason
    #[error("Source unavailable: {0}")]
    Unavailable(String),
}

// == App Error ==
/// Errors surfaced at the HTTP boundary.
#[derive(Error, Debug)]
pub enum AppError {
    /// Malformed caller input
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::InvalidRequest(msg) => (StatusCode::BAD_REQUEST, msg),
        };

        (status, Json(ErrorResponse::new(message))).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for HTTP handlers.
pub type Result<T> = std::result::Result<T, AppError>;
