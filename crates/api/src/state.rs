use std::sync::Arc;
use std::time::Duration;

use minisite_db::DbPool;
use minisite_versioning::{
    AuthorizationPolicy, DraftAuthoringService, OwnerOrAdminPolicy, PublishCoordinator,
    RollbackCoordinator, SiteOwnerPolicy, SiteProjectionCache,
};

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable: everything is behind `Arc` or is a pool handle.
#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub config: Arc<ServerConfig>,
    pub policy: Arc<dyn AuthorizationPolicy>,
    /// Published site projections, invalidated by the publish coordinator.
    pub site_cache: Arc<SiteProjectionCache>,
    pub drafts: Arc<DraftAuthoringService>,
    pub publisher: Arc<PublishCoordinator>,
    pub rollbacks: Arc<RollbackCoordinator>,
}

impl AppState {
    /// Wire the coordinators around one pool, one policy, and one cache.
    pub fn new(pool: DbPool, config: ServerConfig) -> Self {
        let policy: Arc<dyn AuthorizationPolicy> = if config.admin_user_ids.is_empty() {
            Arc::new(SiteOwnerPolicy)
        } else {
            Arc::new(OwnerOrAdminPolicy::new(config.admin_user_ids.iter().copied()))
        };
        let site_cache = Arc::new(SiteProjectionCache::new(Duration::from_secs(
            config.site_cache_ttl_secs,
        )));

        Self {
            drafts: Arc::new(DraftAuthoringService::new(pool.clone(), Arc::clone(&policy))),
            publisher: Arc::new(PublishCoordinator::new(
                pool.clone(),
                Arc::clone(&policy),
                Arc::clone(&site_cache),
            )),
            rollbacks: Arc::new(RollbackCoordinator::new(pool.clone(), Arc::clone(&policy))),
            pool,
            config: Arc::new(config),
            policy,
            site_cache,
        }
    }
}
