//! Site version entity model and DTOs.

use minisite_core::payload::{DisplayFields, GeoPoint};
use minisite_core::types::{DbId, Timestamp};
use minisite_core::version::{self, STATUS_DRAFT, STATUS_PUBLISHED};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `site_versions` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SiteVersion {
    pub id: DbId,
    pub site_id: DbId,
    pub version_number: i32,
    pub status: String,
    pub label: Option<String>,
    pub comment: Option<String>,
    pub payload: serde_json::Value,
    pub title: Option<String>,
    pub name: Option<String>,
    pub city: Option<String>,
    pub region: Option<String>,
    pub country_code: Option<String>,
    pub postal_code: Option<String>,
    pub site_template: Option<String>,
    pub palette: Option<String>,
    pub industry: Option<String>,
    pub default_locale: Option<String>,
    pub search_terms: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    /// For rollbacks and editing copies: the version this one was copied from.
    pub source_version_id: Option<DbId>,
    pub created_by: DbId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub published_at: Option<Timestamp>,
}

impl SiteVersion {
    pub fn is_draft(&self) -> bool {
        self.status == STATUS_DRAFT
    }

    pub fn is_published(&self) -> bool {
        self.status == STATUS_PUBLISHED
    }

    pub fn is_rollback(&self) -> bool {
        self.source_version_id.is_some()
    }

    /// A draft that used to be the live version.
    pub fn is_superseded(&self) -> bool {
        version::is_superseded(&self.status, self.published_at)
    }

    pub fn location(&self) -> Option<GeoPoint> {
        GeoPoint::from_parts(self.latitude, self.longitude)
    }

    pub fn display_fields(&self) -> DisplayFields {
        DisplayFields {
            title: self.title.clone(),
            name: self.name.clone(),
            city: self.city.clone(),
            region: self.region.clone(),
            country_code: self.country_code.clone(),
            postal_code: self.postal_code.clone(),
            site_template: self.site_template.clone(),
            palette: self.palette.clone(),
            industry: self.industry.clone(),
            default_locale: self.default_locale.clone(),
            search_terms: self.search_terms.clone(),
            geo: self.location(),
        }
    }
}

/// Input for [`SiteVersionRepo::save`](crate::repositories::SiteVersionRepo::save).
///
/// `id: None` inserts a new draft row; `id: Some(_)` rewrites the content of
/// an existing draft.
#[derive(Debug, Clone)]
pub struct SaveVersion {
    pub id: Option<DbId>,
    pub site_id: DbId,
    pub version_number: i32,
    pub label: Option<String>,
    pub comment: Option<String>,
    pub payload: serde_json::Value,
    pub fields: DisplayFields,
    pub source_version_id: Option<DbId>,
    pub created_by: DbId,
}

impl SaveVersion {
    /// An unpersisted draft duplicating `source`'s payload, mirrored fields,
    /// and coordinates, with lineage pointing back at it.
    pub fn copy_of(
        source: &SiteVersion,
        version_number: i32,
        label: String,
        comment: String,
        created_by: DbId,
    ) -> Self {
        Self {
            id: None,
            site_id: source.site_id,
            version_number,
            label: Some(label),
            comment: Some(comment),
            payload: source.payload.clone(),
            fields: source.display_fields(),
            source_version_id: Some(source.id),
            created_by,
        }
    }
}
