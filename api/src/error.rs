//! HTTP mapping for every failure a handler can return.
//!
//! This is the only place status codes are chosen. Store failures are logged
//! with their detail and answered with a generic message.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use todo_core::{StoreError, ValidationError};

pub const NOT_FOUND_DETAIL: &str = "Todo not found";
pub const INTERNAL_DETAIL: &str = "Internal server error";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Todo not found")]
    NotFound,

    /// The request body or path could not be turned into a valid input.
    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    /// The blocking store task panicked or was cancelled.
    #[error("store task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::Validation(err.to_string())
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    detail: &'a str,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match &self {
            ApiError::NotFound => {
                tracing::debug!("todo not found");
                (StatusCode::NOT_FOUND, NOT_FOUND_DETAIL.to_string())
            }
            ApiError::Validation(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg.clone()),
            ApiError::Store(_) | ApiError::Task(_) => {
                tracing::error!(error = %self, "store call failed");
                (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_DETAIL.to_string())
            }
        };
        (status, Json(ErrorBody { detail: &detail })).into_response()
    }
}
