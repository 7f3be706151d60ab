//! Handlers for sites and their cached published projection.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use minisite_core::error::CoreError;
use minisite_core::search::{clamp_limit, clamp_offset, DEFAULT_HISTORY_LIMIT, MAX_HISTORY_LIMIT};
use minisite_core::types::DbId;
use minisite_db::models::site::CreateSite;
use minisite_db::repositories::SiteRepo;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::query::PaginationParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for `POST /sites`. The caller becomes the owner.
#[derive(Debug, Deserialize)]
pub struct CreateSiteRequest {
    pub business_slug: Option<String>,
    pub location_slug: Option<String>,
}

// ---------------------------------------------------------------------------
// POST /sites
// ---------------------------------------------------------------------------

pub async fn create_site(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<CreateSiteRequest>,
) -> AppResult<impl IntoResponse> {
    for slug in [&body.business_slug, &body.location_slug].into_iter().flatten() {
        if slug.trim().is_empty() {
            return Err(AppError::BadRequest("Slugs must not be blank".into()));
        }
    }

    let site = SiteRepo::create(
        &state.pool,
        &CreateSite {
            owner_id: auth.user_id,
            business_slug: body.business_slug,
            location_slug: body.location_slug,
        },
    )
    .await?;

    tracing::info!(site_id = site.id, owner_id = auth.user_id, "Site created");

    Ok((StatusCode::CREATED, Json(DataResponse { data: site })))
}

// ---------------------------------------------------------------------------
// GET /sites
// ---------------------------------------------------------------------------

/// List the caller's own sites.
pub async fn list_sites(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<PaginationParams>,
) -> AppResult<impl IntoResponse> {
    let limit = clamp_limit(params.limit, DEFAULT_HISTORY_LIMIT, MAX_HISTORY_LIMIT);
    let offset = clamp_offset(params.offset);
    let sites = SiteRepo::list_by_owner(&state.pool, auth.user_id, limit, offset).await?;

    tracing::debug!(count = sites.len(), owner_id = auth.user_id, "Listed sites");

    Ok(Json(DataResponse { data: sites }))
}

// ---------------------------------------------------------------------------
// GET /sites/{site_id}
// ---------------------------------------------------------------------------

/// The site projection, served from the projection cache.
pub async fn get_site(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(site_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let site = state.site_cache.get_or_load(&state.pool, site_id).await?;

    if !state.policy.can_edit(auth.user_id, &site) {
        return Err(CoreError::Ownership {
            actor_id: auth.user_id,
            site_id,
        }
        .into());
    }

    Ok(Json(DataResponse { data: site }))
}
