//! Site projection entity model and DTOs.

use minisite_core::payload::{DisplayFields, GeoPoint};
use minisite_core::types::{DbId, Timestamp};
use minisite_core::version::STATUS_PUBLISHED;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `sites` table.
///
/// The display columns, `payload`, and the location are a cached copy of the
/// currently published version; only the publish coordinator writes them.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Site {
    pub id: DbId,
    pub owner_id: DbId,
    pub current_published_version_id: Option<DbId>,
    /// Optimistic-concurrency counter, bumped by exactly one per publish.
    pub site_version: i64,
    /// Highest version number handed out for this site.
    pub last_version_number: i32,
    pub status: String,
    pub business_slug: Option<String>,
    pub location_slug: Option<String>,
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
    /// `location_point` y component.
    pub latitude: Option<f64>,
    /// `location_point` x component.
    pub longitude: Option<f64>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Site {
    pub fn is_published(&self) -> bool {
        self.status == STATUS_PUBLISHED
    }

    pub fn location(&self) -> Option<GeoPoint> {
        GeoPoint::from_parts(self.latitude, self.longitude)
    }

    /// The mirrored display columns as a comparable value.
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

/// DTO for registering a new site. The projection starts empty with
/// `site_version = 0` until its first publish.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateSite {
    pub owner_id: DbId,
    pub business_slug: Option<String>,
    pub location_slug: Option<String>,
}
