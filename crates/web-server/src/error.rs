use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use database::DbError;
use engine::RefreshError;
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Refresh failed: {0}")]
    Refresh(#[from] RefreshError),
    #[error("Database error: {0}")]
    Database(#[from] DbError),
    #[error("Country not found")]
    NotFound,
}

/// Converts our custom `AppError` into an HTTP response.
///
/// Failures report a stable error kind; storage internals are logged here
/// and never leak into the response body.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message, details) = match self {
            AppError::Refresh(RefreshError::SourceUnavailable(details)) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "External data source unavailable".to_string(),
                Some(details),
            ),
            AppError::Refresh(RefreshError::Apply(db_err)) => {
                tracing::error!(error = ?db_err, "Refresh apply stage failed.");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Could not apply the refresh pass".to_string(),
                    None,
                )
            }
            AppError::Database(DbError::NotFound) | AppError::NotFound => (
                StatusCode::NOT_FOUND,
                "Country not found".to_string(),
                None,
            ),
            AppError::Database(DbError::Validation(details)) => (
                StatusCode::BAD_REQUEST,
                "Validation failed".to_string(),
                Some(details),
            ),
            AppError::Database(db_err) => {
                tracing::error!(error = ?db_err, "Database error.");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                    None,
                )
            }
        };

        let body = match details {
            Some(details) => Json(json!({ "error": error_message, "details": details })),
            None => Json(json!({ "error": error_message })),
        };
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_unavailable_maps_to_503() {
        let err = AppError::Refresh(RefreshError::SourceUnavailable(
            "Could not fetch the exchange-rate table".to_string(),
        ));
        assert_eq!(err.into_response().status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn not_found_maps_to_404() {
        assert_eq!(
            AppError::NotFound.into_response().status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::Database(DbError::NotFound).into_response().status(),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn validation_maps_to_400() {
        let err = AppError::Database(DbError::Validation("Population".to_string()));
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn storage_failures_map_to_500_without_leaking() {
        let err = AppError::Database(DbError::ConnectionError(sqlx_like_error()));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    fn sqlx_like_error() -> sqlx::Error {
        sqlx::Error::PoolTimedOut
    }
}
