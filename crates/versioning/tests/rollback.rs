//! Integration tests for `RollbackCoordinator`.

mod common;

use assert_matches::assert_matches;
use common::*;
use minisite_core::error::CoreError;
use minisite_versioning::{PublishRequest, VersioningError};
use sqlx::PgPool;

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_rollback_creates_draft_copy(pool: PgPool) {
    let svc = services(&pool);
    let site = create_site(&pool, "rollback").await;
    let v1 = svc
        .drafts
        .create_draft(site.id, input("One", bakery_sections("Original")), OWNER)
        .await
        .unwrap();
    svc.publisher
        .publish(PublishRequest {
            site_id: site.id,
            version_id: v1.id,
            actor_id: OWNER,
            expected_site_version: 0,
        })
        .await
        .unwrap();
    let v2 = svc
        .drafts
        .create_draft(site.id, input("Two", plain_sections("Changed")), OWNER)
        .await
        .unwrap();
    let published = svc
        .publisher
        .publish(PublishRequest {
            site_id: site.id,
            version_id: v2.id,
            actor_id: OWNER,
            expected_site_version: 1,
        })
        .await
        .unwrap();

    let v3 = svc.rollbacks.rollback(site.id, v1.id, OWNER).await.unwrap();

    assert_eq!(v3.version_number, 3);
    assert!(v3.is_draft());
    assert!(v3.is_rollback());
    assert_eq!(v3.source_version_id, Some(v1.id));
    assert_eq!(v3.label.as_deref(), Some("Rollback to v1"));
    assert_eq!(v3.comment.as_deref(), Some("Rollback from version 1"));
    assert_eq!(v3.payload, v1.payload);
    assert_eq!(v3.display_fields(), v1.display_fields());

    // The live site is untouched until the copy is published.
    let site_now = reload_site(&pool, site.id).await;
    assert_eq!(site_now.site_version, 2);
    assert_eq!(site_now.current_published_version_id, Some(v2.id));
    assert_eq!(site_now.payload, published.site.payload);
    assert_eq!(published_count(&pool, site.id).await, 1);

    let restored = svc
        .publisher
        .publish(PublishRequest {
            site_id: site.id,
            version_id: v3.id,
            actor_id: OWNER,
            expected_site_version: 2,
        })
        .await
        .unwrap();
    assert_eq!(restored.site.payload, v1.payload);
    assert_eq!(restored.site.title.as_deref(), Some("Original"));
    assert_eq!(restored.demoted_version_id, Some(v2.id));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_rollback_of_draft_is_allowed(pool: PgPool) {
    let svc = services(&pool);
    let site = create_site(&pool, "draft-source").await;
    let v1 = svc
        .drafts
        .create_draft(site.id, input("One", plain_sections("Draft")), OWNER)
        .await
        .unwrap();

    let v2 = svc.rollbacks.rollback(site.id, v1.id, OWNER).await.unwrap();
    assert_eq!(v2.version_number, 2);
    assert_eq!(v2.payload, v1.payload);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_rollback_to_foreign_version_is_invalid_state(pool: PgPool) {
    let svc = services(&pool);
    let site = create_site(&pool, "a").await;
    let other = create_site(&pool, "b").await;
    let foreign = svc
        .drafts
        .create_draft(other.id, input("Other", plain_sections("Other")), OWNER)
        .await
        .unwrap();

    let err = svc
        .rollbacks
        .rollback(site.id, foreign.id, OWNER)
        .await
        .unwrap_err();
    assert_matches!(err, VersioningError::Core(CoreError::InvalidState(_)));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_rollback_unknown_source_is_not_found(pool: PgPool) {
    let svc = services(&pool);
    let site = create_site(&pool, "unknown").await;

    let err = svc.rollbacks.rollback(site.id, 9999, OWNER).await.unwrap_err();
    assert_matches!(err, VersioningError::Core(CoreError::NotFound { .. }));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_rollback_by_non_owner_rejected(pool: PgPool) {
    let svc = services(&pool);
    let site = create_site(&pool, "guarded").await;
    let v1 = svc
        .drafts
        .create_draft(site.id, input("One", plain_sections("Guarded")), OWNER)
        .await
        .unwrap();

    let err = svc
        .rollbacks
        .rollback(site.id, v1.id, STRANGER)
        .await
        .unwrap_err();
    assert_matches!(err, VersioningError::Core(CoreError::Ownership { .. }));
}
