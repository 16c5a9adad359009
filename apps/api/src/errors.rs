use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::assessment::ScoringError;
use crate::custom::CustomConfigError;
use crate::matching::{JobProfileError, MappingError};

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unprocessable entity: {0}")]
    UnprocessableEntity(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<ScoringError> for AppError {
    fn from(e: ScoringError) -> Self {
        AppError::UnprocessableEntity(e.to_string())
    }
}

impl From<CustomConfigError> for AppError {
    fn from(e: CustomConfigError) -> Self {
        AppError::Validation(e.to_string())
    }
}

impl From<JobProfileError> for AppError {
    fn from(e: JobProfileError) -> Self {
        AppError::Validation(e.to_string())
    }
}

impl From<MappingError> for AppError {
    fn from(e: MappingError) -> Self {
        AppError::Internal(e.into())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::UnprocessableEntity(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "UNPROCESSABLE_ENTITY",
                msg.clone(),
            ),
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_errors_map_to_client_statuses() {
        let unsupported: AppError = ScoringError::UnsupportedInstrument("BIG5".to_string()).into();
        assert_eq!(unsupported.into_response().status(), StatusCode::UNPROCESSABLE_ENTITY);

        let config: AppError = CustomConfigError::NoGradeBands.into();
        assert_eq!(config.into_response().status(), StatusCode::BAD_REQUEST);

        let profile: AppError = JobProfileError::Empty("Backend Engineer".to_string()).into();
        assert_eq!(profile.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_mapping_error_is_internal() {
        let err: AppError = MappingError::NoFactors("logic".to_string()).into();
        assert!(matches!(err, AppError::Internal(_)));
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
