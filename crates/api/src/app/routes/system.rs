use axum::http::StatusCode;

use crate::app::errors::ApiError;

pub async fn health() -> StatusCode {
    StatusCode::OK
}

/// Unknown paths get the same 404 envelope as unknown drinks.
pub async fn not_found() -> ApiError {
    ApiError::NotFound
}
