//! Handlers for site versions: drafting, publishing, and rollback.
//!
//! The handlers are a thin shell over the versioning coordinators; every rule
//! (ownership, draft-only edits, the `site_version` check) is enforced there.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use minisite_core::types::DbId;
use minisite_versioning::{DraftInput, PublishRequest};
use serde::{Deserialize, Serialize};

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::query::PaginationParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for the publish endpoint.
#[derive(Debug, Deserialize)]
pub struct PublishBody {
    /// The `site_version` the client last saw.
    pub expected_site_version: i64,
}

#[derive(Debug, Serialize)]
pub struct NextVersionNumber {
    pub next_version_number: i32,
}

// ---------------------------------------------------------------------------
// GET /sites/{site_id}/versions
// ---------------------------------------------------------------------------

/// Version history of a site, newest first.
pub async fn list_versions(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(site_id): Path<DbId>,
    Query(params): Query<PaginationParams>,
) -> AppResult<impl IntoResponse> {
    let versions = state
        .drafts
        .find_by_site(site_id, auth.user_id, params.limit, params.offset)
        .await?;

    tracing::debug!(count = versions.len(), site_id, "Listed site versions");

    Ok(Json(DataResponse { data: versions }))
}

// ---------------------------------------------------------------------------
// POST /sites/{site_id}/versions
// ---------------------------------------------------------------------------

pub async fn create_version(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(site_id): Path<DbId>,
    Json(body): Json<DraftInput>,
) -> AppResult<impl IntoResponse> {
    let version = state
        .drafts
        .create_draft(site_id, body, auth.user_id)
        .await?;

    Ok((StatusCode::CREATED, Json(DataResponse { data: version })))
}

// ---------------------------------------------------------------------------
// GET /sites/{site_id}/versions/next-number
// ---------------------------------------------------------------------------

pub async fn next_version_number(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(site_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let next_version_number = state
        .drafts
        .next_version_number(site_id, auth.user_id)
        .await?;

    Ok(Json(DataResponse {
        data: NextVersionNumber {
            next_version_number,
        },
    }))
}

// ---------------------------------------------------------------------------
// GET /sites/{site_id}/versions/editing
// ---------------------------------------------------------------------------

/// The draft an editor should open: the newest draft, or a fresh copy of the
/// published version.
pub async fn editing_version(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(site_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let version = state
        .drafts
        .draft_for_editing(site_id, auth.user_id)
        .await?;

    Ok(Json(DataResponse { data: version }))
}

// ---------------------------------------------------------------------------
// GET /sites/{site_id}/versions/{id}
// ---------------------------------------------------------------------------

pub async fn get_version(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((site_id, id)): Path<(DbId, DbId)>,
) -> AppResult<impl IntoResponse> {
    let version = state.drafts.find_by_id(site_id, id, auth.user_id).await?;
    Ok(Json(DataResponse { data: version }))
}

// ---------------------------------------------------------------------------
// PUT /sites/{site_id}/versions/{id}
// ---------------------------------------------------------------------------

pub async fn update_version(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((site_id, id)): Path<(DbId, DbId)>,
    Json(body): Json<DraftInput>,
) -> AppResult<impl IntoResponse> {
    let version = state
        .drafts
        .update_draft(site_id, id, body, auth.user_id)
        .await?;

    Ok(Json(DataResponse { data: version }))
}

// ---------------------------------------------------------------------------
// POST /sites/{site_id}/versions/{id}/publish
// ---------------------------------------------------------------------------

pub async fn publish_version(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((site_id, id)): Path<(DbId, DbId)>,
    Json(body): Json<PublishBody>,
) -> AppResult<impl IntoResponse> {
    let outcome = state
        .publisher
        .publish(PublishRequest {
            site_id,
            version_id: id,
            actor_id: auth.user_id,
            expected_site_version: body.expected_site_version,
        })
        .await?;

    Ok(Json(DataResponse { data: outcome }))
}

// ---------------------------------------------------------------------------
// POST /sites/{site_id}/versions/{id}/rollback
// ---------------------------------------------------------------------------

/// Copy version `id` into a new draft. Nothing is published.
pub async fn rollback_version(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((site_id, id)): Path<(DbId, DbId)>,
) -> AppResult<impl IntoResponse> {
    let version = state.rollbacks.rollback(site_id, id, auth.user_id).await?;

    Ok((StatusCode::CREATED, Json(DataResponse { data: version })))
}
