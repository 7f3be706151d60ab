//! Repository for the `sites` table (the denormalized site projection).

use minisite_core::payload::GeoPoint;
use minisite_core::types::DbId;
use sqlx::{PgConnection, PgExecutor};

use crate::models::site::{CreateSite, Site};
use crate::models::site_version::SiteVersion;

/// Column list shared across queries. The spatial point is split back into
/// its latitude (y) and longitude (x) components.
const COLUMNS: &str = "id, owner_id, current_published_version_id, site_version, \
    last_version_number, status, business_slug, location_slug, payload, title, name, \
    city, region, country_code, postal_code, site_template, palette, industry, \
    default_locale, search_terms, location_point[1] AS latitude, \
    location_point[0] AS longitude, created_at, updated_at";

/// Provides CRUD and projection-refresh operations for sites.
pub struct SiteRepo;

impl SiteRepo {
    /// Insert a new, never-published site with `site_version = 0`.
    pub async fn create(
        executor: impl PgExecutor<'_>,
        input: &CreateSite,
    ) -> Result<Site, sqlx::Error> {
        let query = format!(
            "INSERT INTO sites (owner_id, business_slug, location_slug)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Site>(&query)
            .bind(input.owner_id)
            .bind(&input.business_slug)
            .bind(&input.location_slug)
            .fetch_one(executor)
            .await
    }

    /// Find a site by its internal ID.
    pub async fn find_by_id(
        executor: impl PgExecutor<'_>,
        id: DbId,
    ) -> Result<Option<Site>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM sites WHERE id = $1");
        sqlx::query_as::<_, Site>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// Find a site and hold its row lock until the transaction ends.
    ///
    /// Publishing takes this lock first, which serializes publishes per site.
    pub async fn lock_by_id(conn: &mut PgConnection, id: DbId) -> Result<Option<Site>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM sites WHERE id = $1 FOR UPDATE");
        sqlx::query_as::<_, Site>(&query)
            .bind(id)
            .fetch_optional(conn)
            .await
    }

    /// List sites owned by a user, most recently updated first.
    pub async fn list_by_owner(
        executor: impl PgExecutor<'_>,
        owner_id: DbId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Site>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM sites
             WHERE owner_id = $1
             ORDER BY updated_at DESC, id DESC
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, Site>(&query)
            .bind(owner_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(executor)
            .await
    }

    /// Overwrite the projection with `version`'s payload and mirrored fields,
    /// point it at that version, and bump `site_version` by one.
    ///
    /// The write is conditional on `site_version = expected_site_version`;
    /// returns `None` when the counter has moved (or the site is gone).
    /// The location point is not touched here.
    pub async fn apply_published_version(
        conn: &mut PgConnection,
        site_id: DbId,
        version: &SiteVersion,
        expected_site_version: i64,
    ) -> Result<Option<Site>, sqlx::Error> {
        let query = format!(
            "UPDATE sites SET
                payload = $3, title = $4, name = $5, city = $6, region = $7,
                country_code = $8, postal_code = $9, site_template = $10, palette = $11,
                industry = $12, default_locale = $13, search_terms = $14,
                current_published_version_id = $15,
                status = 'published',
                site_version = site_version + 1,
                updated_at = NOW()
             WHERE id = $1 AND site_version = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Site>(&query)
            .bind(site_id)
            .bind(expected_site_version)
            .bind(&version.payload)
            .bind(&version.title)
            .bind(&version.name)
            .bind(&version.city)
            .bind(&version.region)
            .bind(&version.country_code)
            .bind(&version.postal_code)
            .bind(&version.site_template)
            .bind(&version.palette)
            .bind(&version.industry)
            .bind(&version.default_locale)
            .bind(&version.search_terms)
            .bind(version.id)
            .fetch_optional(conn)
            .await
    }

    /// Set the site's spatial point (stored as `point(lng, lat)`).
    pub async fn update_location_point(
        conn: &mut PgConnection,
        site_id: DbId,
        geo: GeoPoint,
    ) -> Result<Option<Site>, sqlx::Error> {
        let query = format!(
            "UPDATE sites SET location_point = point($2, $3) \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Site>(&query)
            .bind(site_id)
            .bind(geo.lng)
            .bind(geo.lat)
            .fetch_optional(conn)
            .await
    }
}
