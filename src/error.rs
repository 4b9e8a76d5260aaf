use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

use crate::forms::FieldErrors;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] sea_orm::DbErr),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Invalid fields: {0}")]
    InvalidFields(FieldErrors),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unsupported media type: {0}")]
    UnsupportedMediaType(String),

    #[error("Storage error: {0}")]
    StorageError(#[from] std::io::Error),

    #[error("External API error: {0}")]
    ExternalApiError(String),

    #[error("Internal server error: {0}")]
    InternalError(String),

    #[error("HTTP request error: {0}")]
    ReqwestError(#[from] reqwest::Error),

    #[error("JSON serialization/deserialization error: {0}")]
    SerdeJsonError(#[from] serde_json::Error),
}

impl AppError {
    /// Rebuilds the server's error taxonomy from a failed API response.
    pub fn from_status(status: u16, message: String) -> Self {
        match status {
            400 => AppError::ValidationError(message),
            404 => AppError::NotFound(message),
            _ => AppError::ExternalApiError(format!("{status}: {message}")),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, AppError::NotFound(_))
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_)
            | AppError::InvalidFields(_)
            | AppError::UnsupportedMediaType(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = match self {
            AppError::ValidationError(msg) => {
                log::warn!("Validation error: {msg}");
                json!({ "message": "Validation failed", "error": msg })
            }
            AppError::InvalidFields(fields) => {
                log::warn!("Invalid fields: {fields}");
                json!({ "message": "Validation failed", "error": fields })
            }
            AppError::UnsupportedMediaType(msg) => {
                log::warn!("Rejected upload: {msg}");
                json!({ "message": "Invalid file type", "error": msg })
            }
            AppError::NotFound(msg) => json!({ "message": msg, "error": "NOT_FOUND" }),
            AppError::DatabaseError(err) => {
                log::error!("Database error: {err}");
                json!({ "message": "Internal server error", "error": "Database error" })
            }
            AppError::StorageError(err) => {
                log::error!("Storage error: {err}");
                json!({ "message": "Internal server error", "error": "Storage error" })
            }
            _ => {
                log::error!("Internal error: {self}");
                json!({ "message": "Internal server error", "error": "Internal server error" })
            }
        };

        HttpResponse::build(self.status_code()).json(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            AppError::ValidationError("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::UnsupportedMediaType("text/plain".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::NotFound("gone".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::InternalError("boom".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_from_status() {
        assert!(matches!(
            AppError::from_status(400, "bad".into()),
            AppError::ValidationError(m) if m == "bad"
        ));
        assert!(AppError::from_status(404, "missing".into()).is_not_found());
        assert!(matches!(
            AppError::from_status(500, "oops".into()),
            AppError::ExternalApiError(_)
        ));
    }
}
