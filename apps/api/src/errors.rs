use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
///
/// Errors on the mandatory pipeline backbone (PREP, REINDEX, SEARCH, HYDRATE)
/// surface as one of the `Upstream*` variants with stage-identifying detail.
/// Failures inside individual analysis tasks never reach this type — they are
/// downgraded to empty defaults at the call site.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Generative service error: {0}")]
    UpstreamGeneration(String),

    #[error("Vector index error: {0}")]
    UpstreamIndex(String),

    #[error("Listings source error: {0}")]
    UpstreamListings(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::UpstreamGeneration(msg) => {
                tracing::error!("Generative service error: {msg}");
                (
                    StatusCode::BAD_GATEWAY,
                    "GENERATION_ERROR",
                    format!("Generative service failed: {msg}"),
                )
            }
            AppError::UpstreamIndex(msg) => {
                tracing::error!("Vector index error: {msg}");
                (
                    StatusCode::BAD_GATEWAY,
                    "INDEX_ERROR",
                    format!("Vector index failed: {msg}"),
                )
            }
            AppError::UpstreamListings(msg) => {
                tracing::error!("Listings source error: {msg}");
                (
                    StatusCode::BAD_GATEWAY,
                    "LISTINGS_ERROR",
                    format!("Listings source failed: {msg}"),
                )
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "A database error occurred".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
