use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use minisite_core::error::CoreError;
use minisite_versioning::VersioningError;
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and adds HTTP-specific variants.
/// Implements [`IntoResponse`] to produce consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `minisite_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A storage failure reported by one of the versioning coordinators.
    #[error(transparent)]
    Versioning(VersioningError),

    /// A database error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl From<VersioningError> for AppError {
    fn from(err: VersioningError) -> Self {
        match err {
            VersioningError::Core(core) => AppError::Core(core),
            other => AppError::Versioning(other),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            // --- CoreError variants ---
            AppError::Core(core) => match core {
                CoreError::NotFound { entity, id } => (
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    format!("{entity} with id {id} not found"),
                ),
                CoreError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
                CoreError::Ownership { site_id, .. } => (
                    StatusCode::FORBIDDEN,
                    "FORBIDDEN",
                    format!("Not allowed to edit site {site_id}"),
                ),
                CoreError::InvalidState(msg) => {
                    (StatusCode::CONFLICT, "INVALID_STATE", msg.clone())
                }
                CoreError::ConcurrencyConflict { site_id, expected } => (
                    StatusCode::CONFLICT,
                    "CONCURRENCY_CONFLICT",
                    format!(
                        "Site {site_id} was modified concurrently (expected site_version {expected}); reload and retry"
                    ),
                ),
                CoreError::Unauthorized(msg) => {
                    (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone())
                }
                CoreError::Internal(msg) => {
                    tracing::error!(error = %msg, "Internal core error");
                    internal_error("INTERNAL_ERROR")
                }
            },

            // --- Coordinator storage failures ---
            AppError::Versioning(err) => {
                let cause = std::error::Error::source(err).map(ToString::to_string);
                tracing::error!(error = %err, cause = ?cause, "Versioning operation failed");
                match err {
                    VersioningError::PublishFailed { .. } => internal_error("PUBLISH_FAILED"),
                    _ => internal_error("INTERNAL_ERROR"),
                }
            }

            // --- Database errors ---
            AppError::Database(err) => classify_sqlx_error(err),

            // --- HTTP-specific errors ---
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                internal_error("INTERNAL_ERROR")
            }
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

fn internal_error(code: &'static str) -> (StatusCode, &'static str, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        code,
        "An internal error occurred".to_string(),
    )
}

/// Classify a sqlx error into an HTTP status, error code, and message.
///
/// - `RowNotFound` maps to 404.
/// - Unique constraint violations (constraint name starting with `uq_`) map to 409.
/// - Everything else maps to 500 with a sanitized message.
fn classify_sqlx_error(err: &sqlx::Error) -> (StatusCode, &'static str, String) {
    match err {
        sqlx::Error::RowNotFound => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            "Resource not found".to_string(),
        ),
        sqlx::Error::Database(db_err) => {
            if minisite_db::is_unique_violation(err) {
                let constraint = db_err.constraint().unwrap_or("unknown");
                if constraint.starts_with("uq_") {
                    return (
                        StatusCode::CONFLICT,
                        "CONFLICT",
                        format!("Duplicate value violates unique constraint: {constraint}"),
                    );
                }
            }
            tracing::error!(error = %db_err, "Database error");
            internal_error("INTERNAL_ERROR")
        }
        other => {
            tracing::error!(error = %other, "Database error");
            internal_error("INTERNAL_ERROR")
        }
    }
}
