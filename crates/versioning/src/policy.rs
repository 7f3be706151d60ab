//! Authorization policy for site edits.
//!
//! The coordinators never hard-code ownership rules; they ask an injected
//! [`AuthorizationPolicy`] whether the actor may edit the site.

use std::collections::HashSet;

use minisite_core::error::CoreError;
use minisite_core::types::DbId;
use minisite_db::models::site::Site;
use minisite_db::repositories::SiteRepo;
use minisite_db::DbPool;

use crate::error::{VersioningError, VersioningResult};

/// Decides whether an actor may author, publish, or roll back a site.
pub trait AuthorizationPolicy: Send + Sync {
    fn can_edit(&self, actor_id: DbId, site: &Site) -> bool;
}

/// Only the site's owner may edit it.
#[derive(Debug, Clone, Copy, Default)]
pub struct SiteOwnerPolicy;

impl AuthorizationPolicy for SiteOwnerPolicy {
    fn can_edit(&self, actor_id: DbId, site: &Site) -> bool {
        site.owner_id == actor_id
    }
}

/// The owner, or any of a fixed set of administrator accounts.
#[derive(Debug, Clone, Default)]
pub struct OwnerOrAdminPolicy {
    admin_ids: HashSet<DbId>,
}

impl OwnerOrAdminPolicy {
    pub fn new(admin_ids: impl IntoIterator<Item = DbId>) -> Self {
        Self {
            admin_ids: admin_ids.into_iter().collect(),
        }
    }
}

impl AuthorizationPolicy for OwnerOrAdminPolicy {
    fn can_edit(&self, actor_id: DbId, site: &Site) -> bool {
        site.owner_id == actor_id || self.admin_ids.contains(&actor_id)
    }
}

/// Load a site and check that `actor_id` may edit it.
pub(crate) async fn load_editable_site(
    pool: &DbPool,
    policy: &dyn AuthorizationPolicy,
    site_id: DbId,
    actor_id: DbId,
) -> VersioningResult<Site> {
    let site = SiteRepo::find_by_id(pool, site_id)
        .await
        .map_err(VersioningError::persistence("load site"))?
        .ok_or_else(|| VersioningError::not_found("Site", site_id))?;

    if !policy.can_edit(actor_id, &site) {
        tracing::warn!(site_id, actor_id, "Actor is not allowed to edit site");
        return Err(CoreError::Ownership { actor_id, site_id }.into());
    }
    Ok(site)
}
