//! Error handling for the application

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::pricing::responses::PricingErrorResponse;

/// Application error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Not found")]
    NotFound,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Rule catalog unavailable: {0}")]
    CatalogUnavailable(String),

    #[error("Invalid catalog data: {0}")]
    CatalogInvalid(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match &self {
            AppError::NotFound => (StatusCode::NOT_FOUND, "not_found", "Not found"),
            AppError::Database(e) => {
                tracing::error!("Database error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "database_error",
                    "Database error",
                )
            }
            AppError::CatalogUnavailable(msg) => {
                tracing::error!("Rule catalog unavailable: {}", msg);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "catalog_unavailable",
                    "Rule catalog unavailable",
                )
            }
            AppError::CatalogInvalid(e) => {
                tracing::error!("Invalid catalog data: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "catalog_invalid",
                    "Invalid catalog data",
                )
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "Internal error",
                )
            }
        };

        let body = Json(PricingErrorResponse {
            error_type: error_type.to_string(),
            message: message.to_string(),
            details: None,
        });

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
