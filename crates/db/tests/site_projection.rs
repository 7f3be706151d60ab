//! Integration tests for the site projection (`SiteRepo`).

use minisite_core::payload::{DisplayFields, GeoPoint};
use minisite_db::models::site::CreateSite;
use minisite_db::models::site_version::{SaveVersion, SiteVersion};
use minisite_db::repositories::{SiteRepo, SiteVersionRepo};
use serde_json::json;
use sqlx::PgPool;

fn new_site(owner_id: i64, slug: &str) -> CreateSite {
    CreateSite {
        owner_id,
        business_slug: Some(format!("biz-{slug}")),
        location_slug: Some(format!("loc-{slug}")),
    }
}

async fn insert_version(pool: &PgPool, site_id: i64, title: &str) -> SiteVersion {
    let mut tx = pool.begin().await.unwrap();
    let number = SiteVersionRepo::allocate_next_version_number(&mut tx, site_id)
        .await
        .unwrap();
    let input = SaveVersion {
        id: None,
        site_id,
        version_number: number,
        label: None,
        comment: None,
        payload: json!({ "seo": { "title": title } }),
        fields: DisplayFields {
            title: Some(title.to_string()),
            city: Some("Austin".to_string()),
            ..DisplayFields::default()
        },
        source_version_id: None,
        created_by: 1,
    };
    let version = SiteVersionRepo::save(&mut tx, &input).await.unwrap().unwrap();
    tx.commit().await.unwrap();
    version
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_site_defaults(pool: PgPool) {
    let site = SiteRepo::create(&pool, &new_site(3, "create")).await.unwrap();

    assert_eq!(site.owner_id, 3);
    assert_eq!(site.site_version, 0);
    assert_eq!(site.last_version_number, 0);
    assert!(!site.is_published());
    assert!(site.current_published_version_id.is_none());
    assert!(site.location().is_none());
    assert_eq!(site.payload, json!({}));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_duplicate_slugs_rejected(pool: PgPool) {
    SiteRepo::create(&pool, &new_site(1, "dup")).await.unwrap();
    let err = SiteRepo::create(&pool, &new_site(2, "dup")).await.unwrap_err();
    assert!(minisite_db::is_unique_violation(&err));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_list_by_owner(pool: PgPool) {
    SiteRepo::create(&pool, &new_site(5, "a")).await.unwrap();
    SiteRepo::create(&pool, &new_site(5, "b")).await.unwrap();
    SiteRepo::create(&pool, &new_site(6, "c")).await.unwrap();

    let sites = SiteRepo::list_by_owner(&pool, 5, 50, 0).await.unwrap();
    assert_eq!(sites.len(), 2);
    assert!(sites.iter().all(|s| s.owner_id == 5));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_apply_published_version_bumps_counter(pool: PgPool) {
    let site = SiteRepo::create(&pool, &new_site(1, "apply")).await.unwrap();
    let version = insert_version(&pool, site.id, "Fresh").await;

    let mut conn = pool.acquire().await.unwrap();
    let updated = SiteRepo::apply_published_version(&mut conn, site.id, &version, 0)
        .await
        .unwrap()
        .expect("expected counter matches");

    assert_eq!(updated.site_version, 1);
    assert_eq!(updated.title.as_deref(), Some("Fresh"));
    assert_eq!(updated.city.as_deref(), Some("Austin"));
    assert_eq!(updated.current_published_version_id, Some(version.id));
    assert_eq!(updated.payload, version.payload);
    assert!(updated.is_published());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_apply_published_version_with_stale_counter(pool: PgPool) {
    let site = SiteRepo::create(&pool, &new_site(1, "stale")).await.unwrap();
    let version = insert_version(&pool, site.id, "Fresh").await;

    let mut conn = pool.acquire().await.unwrap();
    let result = SiteRepo::apply_published_version(&mut conn, site.id, &version, 4)
        .await
        .unwrap();
    assert!(result.is_none());

    let reloaded = SiteRepo::find_by_id(&pool, site.id).await.unwrap().unwrap();
    assert_eq!(reloaded.site_version, 0);
    assert!(reloaded.title.is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_update_location_point_round_trips(pool: PgPool) {
    let site = SiteRepo::create(&pool, &new_site(1, "geo")).await.unwrap();

    let mut conn = pool.acquire().await.unwrap();
    let geo = GeoPoint {
        lat: 51.5072,
        lng: -0.1276,
    };
    let updated = SiteRepo::update_location_point(&mut conn, site.id, geo)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(updated.location(), Some(geo));
}
