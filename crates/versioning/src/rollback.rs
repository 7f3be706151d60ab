use std::sync::Arc;

use minisite_core::types::DbId;
use minisite_core::version::{rollback_comment, rollback_label};
use minisite_db::models::site_version::{SaveVersion, SiteVersion};
use minisite_db::repositories::SiteVersionRepo;
use minisite_db::DbPool;

use crate::drafts::insert_draft;
use crate::error::{VersioningError, VersioningResult};
use crate::policy::{load_editable_site, AuthorizationPolicy};
use crate::tx;

/// Restores old content by copying a prior version into a new draft.
///
/// Nothing is published: the copy goes live only through a later publish.
/// The live site and every existing version row are left untouched.
pub struct RollbackCoordinator {
    pool: DbPool,
    policy: Arc<dyn AuthorizationPolicy>,
}

impl RollbackCoordinator {
    pub fn new(pool: DbPool, policy: Arc<dyn AuthorizationPolicy>) -> Self {
        Self { pool, policy }
    }

    pub async fn rollback(
        &self,
        site_id: DbId,
        source_version_id: DbId,
        actor_id: DbId,
    ) -> VersioningResult<SiteVersion> {
        load_editable_site(&self.pool, self.policy.as_ref(), site_id, actor_id).await?;

        let source = SiteVersionRepo::find_by_id(&self.pool, source_version_id)
            .await
            .map_err(VersioningError::persistence("load rollback source"))?
            .ok_or_else(|| VersioningError::not_found("SiteVersion", source_version_id))?;
        if source.site_id != site_id {
            tracing::warn!(
                site_id,
                source_version_id,
                source_site_id = source.site_id,
                "Rollback source belongs to another site"
            );
            return Err(VersioningError::invalid_state(format!(
                "Version {source_version_id} does not belong to site {site_id}"
            )));
        }

        let save = SaveVersion::copy_of(
            &source,
            0,
            rollback_label(source.version_number),
            rollback_comment(source.version_number),
            actor_id,
        );
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(VersioningError::persistence("begin rollback"))?;
        let result = insert_draft(&mut tx, save).await;
        let version = tx::finish(
            tx,
            result,
            "rollback",
            VersioningError::persistence("commit rollback"),
        )
        .await?;

        tracing::info!(
            site_id,
            source_version_id,
            source_version_number = source.version_number,
            version_id = version.id,
            version_number = version.version_number,
            actor_id,
            "Rollback draft created"
        );
        Ok(version)
    }
}
