//! Draft authoring: create, edit, and read site versions.

use std::sync::Arc;

use minisite_core::error::CoreError;
use minisite_core::payload::{derive_display_fields, empty_payload, merge_sections};
use minisite_core::search::{clamp_limit, clamp_offset, DEFAULT_HISTORY_LIMIT, MAX_HISTORY_LIMIT};
use minisite_core::types::DbId;
use minisite_core::version::{
    editing_draft_comment, editing_draft_label, ensure_editable, validate_comment,
    validate_label,
};
use minisite_db::models::site_version::{SaveVersion, SiteVersion};
use minisite_db::repositories::SiteVersionRepo;
use minisite_db::DbPool;
use serde::Deserialize;
use serde_json::Value;
use sqlx::PgConnection;

use crate::error::{VersioningError, VersioningResult};
use crate::policy::{load_editable_site, AuthorizationPolicy};
use crate::tx;

/// Author-supplied content for a new or edited draft.
///
/// `payload` holds only the sections being written; they are merged over the
/// draft's existing payload (or the empty skeleton for a new draft).
#[derive(Debug, Clone, Deserialize)]
pub struct DraftInput {
    pub label: Option<String>,
    pub comment: Option<String>,
    #[serde(default = "empty_sections")]
    pub payload: Value,
}

fn empty_sections() -> Value {
    Value::Object(Default::default())
}

impl Default for DraftInput {
    fn default() -> Self {
        Self {
            label: None,
            comment: None,
            payload: empty_sections(),
        }
    }
}

impl DraftInput {
    pub fn validate(&self) -> Result<(), CoreError> {
        validate_label(self.label.as_deref())?;
        validate_comment(self.comment.as_deref())
    }
}

/// Insert a new draft row, reserving its version number in the same
/// transaction. `input.version_number` is overwritten.
pub(crate) async fn insert_draft(
    conn: &mut PgConnection,
    mut input: SaveVersion,
) -> VersioningResult<SiteVersion> {
    let site_id = input.site_id;
    input.version_number = SiteVersionRepo::allocate_next_version_number(conn, site_id)
        .await
        .map_err(|err| match err {
            sqlx::Error::RowNotFound => VersioningError::not_found("Site", site_id),
            source => VersioningError::Persistence {
                operation: "allocate version number",
                source,
            },
        })?;

    SiteVersionRepo::save(conn, &input)
        .await
        .map_err(VersioningError::persistence("insert draft"))?
        .ok_or_else(|| CoreError::Internal("draft insert returned no row".to_string()).into())
}

/// Creates and edits drafts, and serves the version history of a site.
///
/// Every operation checks the injected policy before touching version rows.
pub struct DraftAuthoringService {
    pool: DbPool,
    policy: Arc<dyn AuthorizationPolicy>,
}

impl DraftAuthoringService {
    pub fn new(pool: DbPool, policy: Arc<dyn AuthorizationPolicy>) -> Self {
        Self { pool, policy }
    }

    /// Create a new draft on top of the empty payload skeleton.
    pub async fn create_draft(
        &self,
        site_id: DbId,
        input: DraftInput,
        actor_id: DbId,
    ) -> VersioningResult<SiteVersion> {
        load_editable_site(&self.pool, self.policy.as_ref(), site_id, actor_id).await?;
        input.validate()?;

        let payload = merge_sections(&empty_payload(), &input.payload)?;
        let fields = derive_display_fields(&payload)?;
        let save = SaveVersion {
            id: None,
            site_id,
            version_number: 0,
            label: input.label,
            comment: input.comment,
            payload,
            fields,
            source_version_id: None,
            created_by: actor_id,
        };

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(VersioningError::persistence("begin create draft"))?;
        let result = insert_draft(&mut tx, save).await;
        let version = tx::finish(
            tx,
            result,
            "create draft",
            VersioningError::persistence("commit create draft"),
        )
        .await?;

        tracing::info!(
            site_id,
            version_id = version.id,
            version_number = version.version_number,
            actor_id,
            "Draft created"
        );
        Ok(version)
    }

    /// Merge new sections into an existing draft and re-derive its mirrored
    /// fields. Published versions are immutable.
    pub async fn update_draft(
        &self,
        site_id: DbId,
        version_id: DbId,
        input: DraftInput,
        actor_id: DbId,
    ) -> VersioningResult<SiteVersion> {
        load_editable_site(&self.pool, self.policy.as_ref(), site_id, actor_id).await?;
        input.validate()?;

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(VersioningError::persistence("begin update draft"))?;
        let result = Self::rewrite_draft(&mut tx, site_id, version_id, input).await;
        let version = tx::finish(
            tx,
            result,
            "update draft",
            VersioningError::persistence("commit update draft"),
        )
        .await?;

        tracing::info!(
            site_id,
            version_id,
            version_number = version.version_number,
            actor_id,
            "Draft updated"
        );
        Ok(version)
    }

    async fn rewrite_draft(
        conn: &mut PgConnection,
        site_id: DbId,
        version_id: DbId,
        input: DraftInput,
    ) -> VersioningResult<SiteVersion> {
        let current = SiteVersionRepo::lock_by_id(conn, version_id)
            .await
            .map_err(VersioningError::persistence("lock draft"))?
            .ok_or_else(|| VersioningError::not_found("SiteVersion", version_id))?;
        if current.site_id != site_id {
            return Err(VersioningError::invalid_state(format!(
                "Version {version_id} does not belong to site {site_id}"
            )));
        }
        ensure_editable(current.version_number, &current.status, current.published_at)?;

        let payload = merge_sections(&current.payload, &input.payload)?;
        let fields = derive_display_fields(&payload)?;
        let save = SaveVersion {
            id: Some(version_id),
            site_id,
            version_number: current.version_number,
            label: input.label.or(current.label),
            comment: input.comment.or(current.comment),
            payload,
            fields,
            source_version_id: current.source_version_id,
            created_by: current.created_by,
        };

        SiteVersionRepo::save(conn, &save)
            .await
            .map_err(VersioningError::persistence("update draft"))?
            .ok_or_else(|| {
                VersioningError::invalid_state(format!(
                    "Version {version_id} is no longer a draft"
                ))
            })
    }

    /// Return the version an editor should work on.
    ///
    /// When the newest version is a never-published draft it is returned as
    /// is. Otherwise (published, or superseded by a later publish) a fresh
    /// draft copying the newest version is created, so editing never touches
    /// content that has been live.
    pub async fn draft_for_editing(
        &self,
        site_id: DbId,
        actor_id: DbId,
    ) -> VersioningResult<SiteVersion> {
        load_editable_site(&self.pool, self.policy.as_ref(), site_id, actor_id).await?;

        let latest = SiteVersionRepo::find_latest_for_site(&self.pool, site_id)
            .await
            .map_err(VersioningError::persistence("load latest version"))?
            .ok_or_else(|| {
                VersioningError::invalid_state(format!("Site {site_id} has no versions yet"))
            })?;
        if latest.is_draft() && !latest.is_superseded() {
            return Ok(latest);
        }

        let save = SaveVersion::copy_of(
            &latest,
            0,
            editing_draft_label(latest.version_number),
            editing_draft_comment(latest.version_number),
            actor_id,
        );
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(VersioningError::persistence("begin editing draft"))?;
        let result = insert_draft(&mut tx, save).await;
        let version = tx::finish(
            tx,
            result,
            "create editing draft",
            VersioningError::persistence("commit editing draft"),
        )
        .await?;

        tracing::info!(
            site_id,
            source_version_id = latest.id,
            version_id = version.id,
            version_number = version.version_number,
            actor_id,
            "Editing draft created from previously published version"
        );
        Ok(version)
    }

    /// Load one version of a site. Versions of other sites are reported as
    /// not found.
    pub async fn find_by_id(
        &self,
        site_id: DbId,
        version_id: DbId,
        actor_id: DbId,
    ) -> VersioningResult<SiteVersion> {
        load_editable_site(&self.pool, self.policy.as_ref(), site_id, actor_id).await?;

        SiteVersionRepo::find_by_id(&self.pool, version_id)
            .await
            .map_err(VersioningError::persistence("load version"))?
            .filter(|v| v.site_id == site_id)
            .ok_or_else(|| VersioningError::not_found("SiteVersion", version_id))
    }

    /// Version history, newest version number first.
    pub async fn find_by_site(
        &self,
        site_id: DbId,
        actor_id: DbId,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> VersioningResult<Vec<SiteVersion>> {
        load_editable_site(&self.pool, self.policy.as_ref(), site_id, actor_id).await?;

        let limit = clamp_limit(limit, DEFAULT_HISTORY_LIMIT, MAX_HISTORY_LIMIT);
        let offset = clamp_offset(offset);
        SiteVersionRepo::find_by_site(&self.pool, site_id, limit, offset)
            .await
            .map_err(VersioningError::persistence("list versions"))
    }

    /// Preview of the number the next draft will receive. Nothing is
    /// reserved.
    pub async fn next_version_number(&self, site_id: DbId, actor_id: DbId) -> VersioningResult<i32> {
        load_editable_site(&self.pool, self.policy.as_ref(), site_id, actor_id).await?;

        SiteVersionRepo::next_version_number(&self.pool, site_id)
            .await
            .map_err(VersioningError::persistence("peek version number"))?
            .ok_or_else(|| VersioningError::not_found("Site", site_id))
    }
}
