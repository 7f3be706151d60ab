use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use minisite_core::types::DbId;
use minisite_db::models::site::Site;
use minisite_db::repositories::SiteRepo;
use minisite_db::DbPool;
use tokio::sync::RwLock;

use crate::error::{VersioningError, VersioningResult};

struct CachedSite {
    site: Site,
    loaded_at: Instant,
}

/// Read-through cache of site projections keyed by site id.
///
/// Entries expire after `ttl`. The publish coordinator invalidates a site's
/// entry after every successful commit, so readers never see a projection
/// older than the last publish made through this process. Designed to be
/// wrapped in `Arc` and shared across the application.
///
/// Every invalidation bumps a generation counter. A read-through load that
/// started before an invalidation does not store its result.
pub struct SiteProjectionCache {
    ttl: Duration,
    generation: AtomicU64,
    entries: RwLock<HashMap<DbId, CachedSite>>,
}

impl SiteProjectionCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            generation: AtomicU64::new(0),
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Return the cached projection when it has not expired. An expired
    /// entry is evicted.
    pub async fn get(&self, site_id: DbId) -> Option<Site> {
        {
            let entries = self.entries.read().await;
            match entries.get(&site_id) {
                None => return None,
                Some(cached) if cached.loaded_at.elapsed() < self.ttl => {
                    return Some(cached.site.clone());
                }
                Some(_) => {}
            }
        }

        let mut entries = self.entries.write().await;
        if entries
            .get(&site_id)
            .is_some_and(|cached| cached.loaded_at.elapsed() >= self.ttl)
        {
            entries.remove(&site_id);
            tracing::debug!(site_id, "Expired site projection evicted");
        }
        None
    }

    /// Store a projection, purging any expired entries.
    pub async fn insert(&self, site: Site) {
        let mut entries = self.entries.write().await;
        self.store(&mut entries, site);
    }

    fn store(&self, entries: &mut HashMap<DbId, CachedSite>, site: Site) {
        let ttl = self.ttl;
        entries.retain(|_, cached| cached.loaded_at.elapsed() < ttl);
        let cached = CachedSite {
            site,
            loaded_at: Instant::now(),
        };
        entries.insert(cached.site.id, cached);
    }

    fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// Store `site` only if nothing was invalidated since `generation` was
    /// read. Returns whether the entry was stored.
    async fn insert_if_current(&self, site: Site, generation: u64) -> bool {
        let mut entries = self.entries.write().await;
        if self.generation() != generation {
            tracing::debug!(
                site_id = site.id,
                "Discarded projection loaded before invalidation"
            );
            return false;
        }
        self.store(&mut entries, site);
        true
    }

    /// Return the cached projection, loading it from the database on a miss.
    pub async fn get_or_load(&self, pool: &DbPool, site_id: DbId) -> VersioningResult<Site> {
        if let Some(site) = self.get(site_id).await {
            return Ok(site);
        }

        let generation = self.generation();
        let site = SiteRepo::find_by_id(pool, site_id)
            .await
            .map_err(VersioningError::persistence("load site projection"))?
            .ok_or_else(|| VersioningError::not_found("Site", site_id))?;
        self.insert_if_current(site.clone(), generation).await;
        Ok(site)
    }

    pub async fn invalidate(&self, site_id: DbId) {
        let mut entries = self.entries.write().await;
        self.generation.fetch_add(1, Ordering::AcqRel);
        if entries.remove(&site_id).is_some() {
            tracing::debug!(site_id, "Site projection cache entry invalidated");
        }
    }

    pub async fn clear(&self) {
        let mut entries = self.entries.write().await;
        self.generation.fetch_add(1, Ordering::AcqRel);
        entries.clear();
    }

    /// Number of entries, including expired ones not yet evicted.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;

    fn site(id: DbId, site_version: i64) -> Site {
        Site {
            id,
            owner_id: 1,
            current_published_version_id: None,
            site_version,
            last_version_number: 0,
            status: "draft".to_string(),
            business_slug: None,
            location_slug: None,
            payload: json!({}),
            title: None,
            name: None,
            city: None,
            region: None,
            country_code: None,
            postal_code: None,
            site_template: None,
            palette: None,
            industry: None,
            default_locale: None,
            search_terms: None,
            latitude: None,
            longitude: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn insert_then_get_returns_entry() {
        let cache = SiteProjectionCache::new(Duration::from_secs(60));
        cache.insert(site(1, 3)).await;

        let cached = cache.get(1).await.expect("entry should be cached");
        assert_eq!(cached.site_version, 3);
        assert!(cache.get(2).await.is_none());
    }

    #[tokio::test]
    async fn invalidate_removes_entry() {
        let cache = SiteProjectionCache::new(Duration::from_secs(60));
        cache.insert(site(1, 0)).await;
        cache.insert(site(2, 0)).await;

        cache.invalidate(1).await;
        assert!(cache.get(1).await.is_none());
        assert_eq!(cache.len().await, 1);

        cache.clear().await;
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn zero_ttl_never_serves_entries() {
        let cache = SiteProjectionCache::new(Duration::ZERO);
        cache.insert(site(1, 0)).await;
        assert!(cache.get(1).await.is_none());
    }

    #[tokio::test]
    async fn expired_entries_are_evicted() {
        let cache = SiteProjectionCache::new(Duration::ZERO);
        cache.insert(site(1, 0)).await;
        assert!(cache.get(1).await.is_none());
        assert!(cache.is_empty().await);

        cache.insert(site(2, 0)).await;
        cache.insert(site(3, 0)).await;
        assert_eq!(cache.len().await, 1, "insert purges expired entries");
    }

    #[tokio::test]
    async fn load_started_before_invalidate_is_not_stored() {
        let cache = SiteProjectionCache::new(Duration::from_secs(60));

        // A reader misses and starts loading site 1 at site_version 4...
        let generation = cache.generation();
        // ...a publish commits and invalidates before the reader stores it.
        cache.invalidate(1).await;

        assert!(!cache.insert_if_current(site(1, 4), generation).await);
        assert!(cache.get(1).await.is_none());

        let generation = cache.generation();
        assert!(cache.insert_if_current(site(1, 5), generation).await);
        assert_eq!(cache.get(1).await.map(|s| s.site_version), Some(5));
    }
}
