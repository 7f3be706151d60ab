//! Repository for the `site_versions` table (the version store).

use minisite_core::types::DbId;
use sqlx::{PgConnection, PgExecutor};

use crate::models::site_version::{SaveVersion, SiteVersion};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, site_id, version_number, status, label, comment, payload, \
    title, name, city, region, country_code, postal_code, site_template, palette, \
    industry, default_locale, search_terms, latitude, longitude, source_version_id, \
    created_by, created_at, updated_at, published_at";

/// Provides persistence and status-transition queries for site versions.
///
/// Pure persistence: business rules live in the coordinators. The only
/// guards here are the ones the schema itself expresses (draft-only updates,
/// draft-only promotion).
pub struct SiteVersionRepo;

impl SiteVersionRepo {
    // ── Version numbers ──────────────────────────────────────────────

    /// Reserve the next version number for a site.
    ///
    /// Bumps the per-site counter on the `sites` row, so the row lock taken by
    /// the `UPDATE` serializes concurrent allocations for the same site. Call
    /// it inside the transaction that inserts the version; the
    /// `(site_id, version_number)` unique constraint backs it up.
    ///
    /// Returns `RowNotFound` if the site does not exist.
    pub async fn allocate_next_version_number(
        conn: &mut PgConnection,
        site_id: DbId,
    ) -> Result<i32, sqlx::Error> {
        let row: (i32,) = sqlx::query_as(
            "UPDATE sites SET last_version_number = GREATEST( \
                 last_version_number, \
                 (SELECT COALESCE(MAX(version_number), 0) FROM site_versions WHERE site_id = $1) \
             ) + 1 \
             WHERE id = $1 \
             RETURNING last_version_number",
        )
        .bind(site_id)
        .fetch_one(conn)
        .await?;
        tracing::debug!(site_id, version_number = row.0, "Allocated version number");
        Ok(row.0)
    }

    /// Peek at the number the next allocation would return, without reserving it.
    ///
    /// Returns `None` if the site does not exist.
    pub async fn next_version_number(
        executor: impl PgExecutor<'_>,
        site_id: DbId,
    ) -> Result<Option<i32>, sqlx::Error> {
        let row: Option<(i32,)> = sqlx::query_as(
            "SELECT GREATEST(s.last_version_number, COALESCE(MAX(v.version_number), 0)) + 1 \
             FROM sites s \
             LEFT JOIN site_versions v ON v.site_id = s.id \
             WHERE s.id = $1 \
             GROUP BY s.last_version_number",
        )
        .bind(site_id)
        .fetch_optional(executor)
        .await?;
        Ok(row.map(|r| r.0))
    }

    // ── Save ─────────────────────────────────────────────────────────

    /// Insert `input` as a new draft when `id` is `None`, otherwise rewrite
    /// the content of the draft with that id.
    ///
    /// Returns `None` when updating and no never-published draft with the
    /// given id exists for the site. Published and superseded rows are never
    /// rewritten.
    pub async fn save(
        conn: &mut PgConnection,
        input: &SaveVersion,
    ) -> Result<Option<SiteVersion>, sqlx::Error> {
        match input.id {
            None => Self::insert(conn, input).await.map(Some),
            Some(id) => Self::update_draft(conn, id, input).await,
        }
    }

    async fn insert(conn: &mut PgConnection, input: &SaveVersion) -> Result<SiteVersion, sqlx::Error> {
        let query = format!(
            "INSERT INTO site_versions
                (site_id, version_number, status, label, comment, payload,
                 title, name, city, region, country_code, postal_code, site_template,
                 palette, industry, default_locale, search_terms, latitude, longitude,
                 source_version_id, created_by)
             VALUES ($1, $2, 'draft', $3, $4, $5, $6, $7, $8, $9, $10, $11, $12,
                     $13, $14, $15, $16, $17, $18, $19, $20)
             RETURNING {COLUMNS}"
        );
        let fields = &input.fields;
        sqlx::query_as::<_, SiteVersion>(&query)
            .bind(input.site_id)
            .bind(input.version_number)
            .bind(&input.label)
            .bind(&input.comment)
            .bind(&input.payload)
            .bind(&fields.title)
            .bind(&fields.name)
            .bind(&fields.city)
            .bind(&fields.region)
            .bind(&fields.country_code)
            .bind(&fields.postal_code)
            .bind(&fields.site_template)
            .bind(&fields.palette)
            .bind(&fields.industry)
            .bind(&fields.default_locale)
            .bind(&fields.search_terms)
            .bind(fields.geo.map(|g| g.lat))
            .bind(fields.geo.map(|g| g.lng))
            .bind(input.source_version_id)
            .bind(input.created_by)
            .fetch_one(conn)
            .await
    }

    async fn update_draft(
        conn: &mut PgConnection,
        id: DbId,
        input: &SaveVersion,
    ) -> Result<Option<SiteVersion>, sqlx::Error> {
        let query = format!(
            "UPDATE site_versions SET
                label = $3, comment = $4, payload = $5,
                title = $6, name = $7, city = $8, region = $9, country_code = $10,
                postal_code = $11, site_template = $12, palette = $13, industry = $14,
                default_locale = $15, search_terms = $16, latitude = $17, longitude = $18,
                updated_at = NOW()
             WHERE id = $1 AND site_id = $2 AND status = 'draft' AND published_at IS NULL
             RETURNING {COLUMNS}"
        );
        let fields = &input.fields;
        sqlx::query_as::<_, SiteVersion>(&query)
            .bind(id)
            .bind(input.site_id)
            .bind(&input.label)
            .bind(&input.comment)
            .bind(&input.payload)
            .bind(&fields.title)
            .bind(&fields.name)
            .bind(&fields.city)
            .bind(&fields.region)
            .bind(&fields.country_code)
            .bind(&fields.postal_code)
            .bind(&fields.site_template)
            .bind(&fields.palette)
            .bind(&fields.industry)
            .bind(&fields.default_locale)
            .bind(&fields.search_terms)
            .bind(fields.geo.map(|g| g.lat))
            .bind(fields.geo.map(|g| g.lng))
            .fetch_optional(conn)
            .await
    }

    // ── Reads ────────────────────────────────────────────────────────

    /// Find a version by its internal ID.
    pub async fn find_by_id(
        executor: impl PgExecutor<'_>,
        id: DbId,
    ) -> Result<Option<SiteVersion>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM site_versions WHERE id = $1");
        sqlx::query_as::<_, SiteVersion>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// Find a version by ID and take a row lock on it for the rest of the
    /// transaction.
    pub async fn lock_by_id(
        conn: &mut PgConnection,
        id: DbId,
    ) -> Result<Option<SiteVersion>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM site_versions WHERE id = $1 FOR UPDATE");
        sqlx::query_as::<_, SiteVersion>(&query)
            .bind(id)
            .fetch_optional(conn)
            .await
    }

    /// List a site's versions, newest (highest version number) first.
    pub async fn find_by_site(
        executor: impl PgExecutor<'_>,
        site_id: DbId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<SiteVersion>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM site_versions
             WHERE site_id = $1
             ORDER BY version_number DESC
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, SiteVersion>(&query)
            .bind(site_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(executor)
            .await
    }

    /// The site's currently published version, if any.
    pub async fn find_published_for_site(
        executor: impl PgExecutor<'_>,
        site_id: DbId,
    ) -> Result<Option<SiteVersion>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM site_versions WHERE site_id = $1 AND status = 'published'"
        );
        sqlx::query_as::<_, SiteVersion>(&query)
            .bind(site_id)
            .fetch_optional(executor)
            .await
    }

    /// The site's highest-numbered version regardless of status.
    pub async fn find_latest_for_site(
        executor: impl PgExecutor<'_>,
        site_id: DbId,
    ) -> Result<Option<SiteVersion>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM site_versions
             WHERE site_id = $1
             ORDER BY version_number DESC
             LIMIT 1"
        );
        sqlx::query_as::<_, SiteVersion>(&query)
            .bind(site_id)
            .fetch_optional(executor)
            .await
    }

    /// The site's highest-numbered draft.
    pub async fn find_latest_draft_for_site(
        executor: impl PgExecutor<'_>,
        site_id: DbId,
    ) -> Result<Option<SiteVersion>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM site_versions
             WHERE site_id = $1 AND status = 'draft'
             ORDER BY version_number DESC
             LIMIT 1"
        );
        sqlx::query_as::<_, SiteVersion>(&query)
            .bind(site_id)
            .fetch_optional(executor)
            .await
    }

    /// Number of published versions for a site (0 or 1 when healthy).
    pub async fn count_published_for_site(
        executor: impl PgExecutor<'_>,
        site_id: DbId,
    ) -> Result<i64, sqlx::Error> {
        let row: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM site_versions WHERE site_id = $1 AND status = 'published'",
        )
        .bind(site_id)
        .fetch_one(executor)
        .await?;
        Ok(row.0)
    }

    // ── Status transitions ───────────────────────────────────────────

    /// Demote the site's published version back to draft.
    ///
    /// Returns the demoted version's id, or `None` when nothing was published
    /// (first-ever publish). `published_at` is left in place.
    pub async fn demote_published(
        conn: &mut PgConnection,
        site_id: DbId,
    ) -> Result<Option<DbId>, sqlx::Error> {
        let row: Option<(DbId,)> = sqlx::query_as(
            "UPDATE site_versions SET status = 'draft', updated_at = NOW() \
             WHERE site_id = $1 AND status = 'published' \
             RETURNING id",
        )
        .bind(site_id)
        .fetch_optional(conn)
        .await?;
        Ok(row.map(|r| r.0))
    }

    /// Promote a draft of `site_id` to published and stamp `published_at`.
    ///
    /// Returns `None` if `version_id` is not a draft of that site.
    pub async fn promote_to_published(
        conn: &mut PgConnection,
        site_id: DbId,
        version_id: DbId,
    ) -> Result<Option<SiteVersion>, sqlx::Error> {
        let query = format!(
            "UPDATE site_versions SET status = 'published', published_at = NOW(), updated_at = NOW() \
             WHERE id = $1 AND site_id = $2 AND status = 'draft' \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, SiteVersion>(&query)
            .bind(version_id)
            .bind(site_id)
            .fetch_optional(conn)
            .await
    }
}
