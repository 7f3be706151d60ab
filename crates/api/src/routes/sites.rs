//! Route definitions for sites and site versions.
//!
//! ```text
//! GET  /                                 list_sites
//! POST /                                 create_site
//! GET  /{site_id}                        get_site
//! GET  /{site_id}/versions               list_versions
//! POST /{site_id}/versions               create_version
//! GET  /{site_id}/versions/next-number   next_version_number
//! GET  /{site_id}/versions/editing       editing_version
//! GET  /{site_id}/versions/{id}          get_version
//! PUT  /{site_id}/versions/{id}          update_version
//! POST /{site_id}/versions/{id}/publish  publish_version
//! POST /{site_id}/versions/{id}/rollback rollback_version
//! ```

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{sites, versions};
use crate::state::AppState;

/// Site routes, mounted at `/sites`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(sites::list_sites).post(sites::create_site))
        .route("/{site_id}", get(sites::get_site))
        .route(
            "/{site_id}/versions",
            get(versions::list_versions).post(versions::create_version),
        )
        // Static segments must come before `/{id}`.
        .route(
            "/{site_id}/versions/next-number",
            get(versions::next_version_number),
        )
        .route("/{site_id}/versions/editing", get(versions::editing_version))
        .route(
            "/{site_id}/versions/{id}",
            get(versions::get_version).put(versions::update_version),
        )
        .route(
            "/{site_id}/versions/{id}/publish",
            post(versions::publish_version),
        )
        .route(
            "/{site_id}/versions/{id}/rollback",
            post(versions::rollback_version),
        )
}
