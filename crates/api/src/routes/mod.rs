pub mod health;
pub mod sites;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /sites                                         list own sites, create site
/// /sites/{site_id}                               site projection (cached)
/// /sites/{site_id}/versions                      history, create draft
/// /sites/{site_id}/versions/next-number          peek next version number
/// /sites/{site_id}/versions/editing              draft to edit
/// /sites/{site_id}/versions/{id}                 get, update draft
/// /sites/{site_id}/versions/{id}/publish         publish (POST)
/// /sites/{site_id}/versions/{id}/rollback        copy into new draft (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new().nest("/sites", sites::router())
}
