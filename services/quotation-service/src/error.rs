use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

// Struktur response error yang konsisten untuk semua endpoint
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

// Enum untuk semua jenis error yang mungkin terjadi di quotation service
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Unauthorized error: {0}")]
    UnauthorizedError(String),

    #[error("Forbidden error: {0}")]
    ForbiddenError(String),

    #[error("Not found: {0}")]
    NotFoundError(String),

    #[error("Conflict: {0}")]
    ConflictError(String),

    #[error("Email error: {0}")]
    EmailError(String),

    #[error("Token error: {0}")]
    TokenError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

// Konversi dari error validator derive
impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::ValidationError(err.to_string())
    }
}

// Konversi dari JWT error di shared library
impl From<shared::utils::jwt::JwtError> for AppError {
    fn from(err: shared::utils::jwt::JwtError) -> Self {
        AppError::TokenError(err.to_string())
    }
}

fn debug_details(detail: String) -> Option<String> {
    if cfg!(debug_assertions) {
        Some(detail)
    } else {
        None
    }
}

// Implementasi IntoResponse untuk AppError agar bisa langsung digunakan sebagai response di axum
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_type, message, details) = match &self {
            AppError::DatabaseError(e) => {
                tracing::error!("Database error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "database_error",
                    "Terjadi kesalahan pada database".to_string(),
                    debug_details(e.to_string()),
                )
            }
            AppError::ValidationError(msg) => (
                StatusCode::BAD_REQUEST,
                "validation_error",
                msg.clone(),
                None,
            ),
            AppError::UnauthorizedError(msg) => (
                StatusCode::UNAUTHORIZED,
                "unauthorized",
                msg.clone(),
                None,
            ),
            AppError::ForbiddenError(msg) => (
                StatusCode::FORBIDDEN,
                "forbidden",
                msg.clone(),
                None,
            ),
            AppError::NotFoundError(msg) => {
                (StatusCode::NOT_FOUND, "not_found", msg.clone(), None)
            }
            AppError::ConflictError(msg) => {
                tracing::warn!("Conflict: {}", msg);
                (StatusCode::CONFLICT, "conflict", msg.clone(), None)
            }
            AppError::EmailError(msg) => {
                tracing::error!("Email error: {}", msg);
                (
                    StatusCode::BAD_GATEWAY,
                    "email_error",
                    "Email gagal dikirim, silakan coba lagi".to_string(),
                    debug_details(msg.clone()),
                )
            }
            AppError::TokenError(msg) => (
                StatusCode::UNAUTHORIZED,
                "token_error",
                "Token tidak valid atau sudah kadaluarsa".to_string(),
                debug_details(msg.clone()),
            ),
            AppError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "Terjadi kesalahan yang tidak terduga".to_string(),
                    debug_details(msg.clone()),
                )
            }
        };

        let error_response = ErrorResponse {
            success: false,
            error: error_type.to_string(),
            message,
            details,
        };

        (status, Json(error_response)).into_response()
    }
}

// Helper functions untuk membuat error dengan mudah
impl AppError {
    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::ValidationError(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        AppError::NotFoundError(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        AppError::ConflictError(msg.into())
    }

    pub fn email(msg: impl Into<String>) -> Self {
        AppError::EmailError(msg.into())
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        AppError::UnauthorizedError(msg.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        AppError::ForbiddenError(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        AppError::InternalError(msg.into())
    }

    /// Unique violation dari Postgres dipetakan jadi conflict
    pub fn from_write(err: sqlx::Error, conflict_message: &str) -> Self {
        match &err {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                AppError::conflict(conflict_message)
            }
            _ => AppError::DatabaseError(err),
        }
    }
}

// Type alias untuk Result dengan AppError sebagai error type
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            AppError::validation("x").into_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::conflict("x").into_response().status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::not_found("x").into_response().status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::email("smtp down").into_response().status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            AppError::internal("boom").into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
