//! Tests for `AppError` → HTTP response mapping.
//!
//! These call `IntoResponse` directly on `AppError` values; no server or
//! database is needed.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use http_body_util::BodyExt;
use minisite_api::error::AppError;
use minisite_core::error::CoreError;
use minisite_versioning::VersioningError;

async fn error_to_response(err: AppError) -> (StatusCode, serde_json::Value) {
    let response = err.into_response();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    (status, json)
}

#[tokio::test]
async fn not_found_error_returns_404() {
    let err = AppError::Core(CoreError::NotFound {
        entity: "SiteVersion",
        id: 42,
    });

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["code"], "NOT_FOUND");
    assert_eq!(json["error"], "SiteVersion with id 42 not found");
}

#[tokio::test]
async fn validation_error_returns_400() {
    let (status, json) =
        error_to_response(AppError::Core(CoreError::Validation("bad label".into()))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert_eq!(json["error"], "bad label");
}

#[tokio::test]
async fn ownership_error_returns_403() {
    let err = AppError::Core(CoreError::Ownership {
        actor_id: 9,
        site_id: 3,
    });

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(json["code"], "FORBIDDEN");
}

#[tokio::test]
async fn invalid_state_and_conflict_are_distinguishable() {
    let (status, json) = error_to_response(AppError::Core(CoreError::InvalidState(
        "already published".into(),
    )))
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["code"], "INVALID_STATE");

    let (status, json) = error_to_response(AppError::Core(CoreError::ConcurrencyConflict {
        site_id: 3,
        expected: 4,
    }))
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["code"], "CONCURRENCY_CONFLICT");
}

#[tokio::test]
async fn unauthorized_error_returns_401() {
    let (status, json) =
        error_to_response(AppError::Core(CoreError::Unauthorized("no token".into()))).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn versioning_core_errors_are_unwrapped() {
    let err: AppError = VersioningError::invalid_state("not a draft").into();
    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["code"], "INVALID_STATE");
}

#[tokio::test]
async fn publish_failure_is_sanitized() {
    let err: AppError = VersioningError::PublishFailed {
        site_id: 1,
        version_id: 2,
        source: sqlx::Error::PoolTimedOut,
    }
    .into();

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["code"], "PUBLISH_FAILED");
    assert_eq!(json["error"], "An internal error occurred");
}

#[tokio::test]
async fn persistence_failure_is_sanitized() {
    let err: AppError = VersioningError::Persistence {
        operation: "insert draft",
        source: sqlx::Error::PoolClosed,
    }
    .into();

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["code"], "INTERNAL_ERROR");
}

#[tokio::test]
async fn row_not_found_returns_404() {
    let (status, json) = error_to_response(AppError::Database(sqlx::Error::RowNotFound)).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["code"], "NOT_FOUND");
}

#[tokio::test]
async fn bad_request_error_returns_400() {
    let (status, json) = error_to_response(AppError::BadRequest("blank slug".into())).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "BAD_REQUEST");
    assert_eq!(json["error"], "blank slug");
}
