//! Publishing: promote a draft to the single published version of its site
//! and refresh the site projection, all in one transaction.

use std::sync::Arc;

use minisite_core::error::CoreError;
use minisite_core::types::DbId;
use minisite_core::version::ensure_publishable;
use minisite_db::models::site::Site;
use minisite_db::models::site_version::SiteVersion;
use minisite_db::repositories::{SiteRepo, SiteVersionRepo};
use minisite_db::DbPool;
use serde::{Deserialize, Serialize};
use sqlx::PgConnection;

use crate::cache::SiteProjectionCache;
use crate::error::{VersioningError, VersioningResult};
use crate::policy::{load_editable_site, AuthorizationPolicy};
use crate::tx;

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PublishRequest {
    pub site_id: DbId,
    pub version_id: DbId,
    pub actor_id: DbId,
    /// The `site_version` the caller last observed.
    pub expected_site_version: i64,
}

/// Result of a committed publish.
#[derive(Debug, Clone, Serialize)]
pub struct PublishOutcome {
    /// The refreshed projection, with `site_version` bumped by one.
    pub site: Site,
    pub version: SiteVersion,
    /// The previously published version, now a superseded draft.
    pub demoted_version_id: Option<DbId>,
}

pub struct PublishCoordinator {
    pool: DbPool,
    policy: Arc<dyn AuthorizationPolicy>,
    cache: Arc<SiteProjectionCache>,
}

impl PublishCoordinator {
    pub fn new(
        pool: DbPool,
        policy: Arc<dyn AuthorizationPolicy>,
        cache: Arc<SiteProjectionCache>,
    ) -> Self {
        Self {
            pool,
            policy,
            cache,
        }
    }

    /// Publish `request.version_id`.
    ///
    /// Ownership, version state, and the expected `site_version` are checked
    /// up front so rejected requests never open a transaction. The same
    /// checks are repeated under row locks inside the transaction: the site
    /// row first, then the version row.
    pub async fn publish(&self, request: PublishRequest) -> VersioningResult<PublishOutcome> {
        let PublishRequest {
            site_id,
            version_id,
            actor_id,
            expected_site_version,
        } = request;

        let site = load_editable_site(&self.pool, self.policy.as_ref(), site_id, actor_id).await?;
        let version = SiteVersionRepo::find_by_id(&self.pool, version_id)
            .await
            .map_err(VersioningError::persistence("load version"))?
            .ok_or_else(|| VersioningError::not_found("SiteVersion", version_id))?;
        check_preconditions(&site, &version, expected_site_version)?;

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|source| VersioningError::PublishFailed {
                site_id,
                version_id,
                source,
            })?;
        let result = Self::apply(&mut tx, site_id, version_id, expected_site_version).await;
        let outcome = tx::finish(tx, result, "publish version", |source| {
            VersioningError::PublishFailed {
                site_id,
                version_id,
                source,
            }
        })
        .await?;

        self.cache.invalidate(site_id).await;

        tracing::info!(
            site_id,
            version_id,
            version_number = outcome.version.version_number,
            demoted_version_id = ?outcome.demoted_version_id,
            site_version = outcome.site.site_version,
            actor_id,
            "Version published"
        );
        Ok(outcome)
    }

    async fn apply(
        conn: &mut PgConnection,
        site_id: DbId,
        version_id: DbId,
        expected_site_version: i64,
    ) -> VersioningResult<PublishOutcome> {
        let failed = |source: sqlx::Error| VersioningError::PublishFailed {
            site_id,
            version_id,
            source,
        };

        let site = SiteRepo::lock_by_id(conn, site_id)
            .await
            .map_err(failed)?
            .ok_or_else(|| VersioningError::not_found("Site", site_id))?;
        let version = SiteVersionRepo::lock_by_id(conn, version_id)
            .await
            .map_err(failed)?
            .ok_or_else(|| VersioningError::not_found("SiteVersion", version_id))?;
        check_preconditions(&site, &version, expected_site_version)?;

        let demoted_version_id = SiteVersionRepo::demote_published(conn, site_id)
            .await
            .map_err(failed)?;
        let version = SiteVersionRepo::promote_to_published(conn, site_id, version_id)
            .await
            .map_err(failed)?
            .ok_or_else(|| {
                VersioningError::invalid_state(format!("Version {version_id} is not a draft"))
            })?;

        let mut site =
            SiteRepo::apply_published_version(conn, site_id, &version, expected_site_version)
                .await
                .map_err(failed)?
                .ok_or(CoreError::ConcurrencyConflict {
                    site_id,
                    expected: expected_site_version,
                })?;

        if let Some(geo) = version.location() {
            site = SiteRepo::update_location_point(conn, site_id, geo)
                .await
                .map_err(failed)?
                .ok_or_else(|| VersioningError::not_found("Site", site_id))?;
        }

        Ok(PublishOutcome {
            site,
            version,
            demoted_version_id,
        })
    }
}

/// Version state is checked before the counter: a loser of a race to publish
/// the same draft sees `InvalidState`, not a conflict.
fn check_preconditions(
    site: &Site,
    version: &SiteVersion,
    expected_site_version: i64,
) -> VersioningResult<()> {
    if version.site_id != site.id {
        return Err(VersioningError::invalid_state(format!(
            "Version {} does not belong to site {}",
            version.id, site.id
        )));
    }
    ensure_publishable(version.version_number, &version.status)?;
    if site.site_version != expected_site_version {
        tracing::debug!(
            site_id = site.id,
            expected_site_version,
            actual_site_version = site.site_version,
            "Stale site_version on publish"
        );
        return Err(CoreError::ConcurrencyConflict {
            site_id: site.id,
            expected: expected_site_version,
        }
        .into());
    }
    Ok(())
}
