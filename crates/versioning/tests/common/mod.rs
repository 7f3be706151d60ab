//! Shared helpers for versioning integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use minisite_db::models::site::{CreateSite, Site};
use minisite_db::repositories::{SiteRepo, SiteVersionRepo};
use minisite_versioning::{
    DraftAuthoringService, DraftInput, PublishCoordinator, RollbackCoordinator,
    SiteOwnerPolicy, SiteProjectionCache,
};
use serde_json::{json, Value};
use sqlx::PgPool;

pub const OWNER: i64 = 1;
pub const STRANGER: i64 = 99;

pub struct Services {
    pub drafts: DraftAuthoringService,
    pub publisher: PublishCoordinator,
    pub rollbacks: RollbackCoordinator,
    pub cache: Arc<SiteProjectionCache>,
}

pub fn services(pool: &PgPool) -> Services {
    let policy = Arc::new(SiteOwnerPolicy);
    let cache = Arc::new(SiteProjectionCache::new(Duration::from_secs(300)));
    Services {
        drafts: DraftAuthoringService::new(pool.clone(), policy.clone()),
        publisher: PublishCoordinator::new(pool.clone(), policy.clone(), cache.clone()),
        rollbacks: RollbackCoordinator::new(pool.clone(), policy),
        cache,
    }
}

pub async fn create_site(pool: &PgPool, slug: &str) -> Site {
    SiteRepo::create(
        pool,
        &CreateSite {
            owner_id: OWNER,
            business_slug: Some(format!("biz-{slug}")),
            location_slug: Some(format!("loc-{slug}")),
        },
    )
    .await
    .unwrap()
}

pub async fn reload_site(pool: &PgPool, site_id: i64) -> Site {
    SiteRepo::find_by_id(pool, site_id).await.unwrap().unwrap()
}

pub async fn published_count(pool: &PgPool, site_id: i64) -> i64 {
    SiteVersionRepo::count_published_for_site(pool, site_id)
        .await
        .unwrap()
}

/// Sections for a bakery in Austin with coordinates.
pub fn bakery_sections(title: &str) -> Value {
    json!({
        "seo": { "title": title },
        "business": { "name": "Sunrise Bakery", "city": "Austin", "country": "us" },
        "brand": { "industry": "bakery" },
        "contact": { "lat": 30.2672, "lng": -97.7431 }
    })
}

/// Sections without any coordinates.
pub fn plain_sections(title: &str) -> Value {
    json!({
        "seo": { "title": title },
        "business": { "name": "Sunrise Bakery", "city": "Dallas" }
    })
}

pub fn input(label: &str, payload: Value) -> DraftInput {
    DraftInput {
        label: Some(label.to_string()),
        comment: None,
        payload,
    }
}
