//! Site payload skeleton, section merging, and mirrored display-field derivation.
//!
//! The payload is an opaque JSON document owned by the presentation layer.
//! Only a handful of scalar fields are read back out of it: they are mirrored
//! onto the version row (and, at publish time, onto the site row) so listings
//! and lookups never have to parse the document.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::error::CoreError;
use crate::search::build_search_terms;

/// Upper bound on the serialized payload size, in bytes.
pub const MAX_PAYLOAD_BYTES: usize = 1_000_000;

/// Palette used when the author has not picked one.
pub const DEFAULT_PALETTE: &str = "blue";

// ---------------------------------------------------------------------------
// Column limits (mirror the `sites` / `site_versions` schema)
// ---------------------------------------------------------------------------

const MAX_TITLE: usize = 200;
const MAX_NAME: usize = 200;
const MAX_CITY: usize = 120;
const MAX_REGION: usize = 120;
const MAX_POSTAL_CODE: usize = 20;
const MAX_TEMPLATE: usize = 32;
const MAX_PALETTE: usize = 24;
const MAX_INDUSTRY: usize = 40;
const MAX_LOCALE: usize = 10;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// A WGS84 coordinate pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    /// Build a point, rejecting out-of-range or non-finite coordinates.
    pub fn new(lat: f64, lng: f64) -> Result<Self, CoreError> {
        if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
            return Err(CoreError::Validation(format!(
                "Latitude must be between -90 and 90, got {lat}"
            )));
        }
        if !lng.is_finite() || !(-180.0..=180.0).contains(&lng) {
            return Err(CoreError::Validation(format!(
                "Longitude must be between -180 and 180, got {lng}"
            )));
        }
        Ok(Self { lat, lng })
    }

    /// Pair up optional columns; a point exists only when both halves do.
    pub fn from_parts(lat: Option<f64>, lng: Option<f64>) -> Option<Self> {
        match (lat, lng) {
            (Some(lat), Some(lng)) => Some(Self { lat, lng }),
            _ => None,
        }
    }
}

/// Scalar fields duplicated out of the payload onto version and site rows.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DisplayFields {
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
    pub geo: Option<GeoPoint>,
}

// ---------------------------------------------------------------------------
// Skeleton & merge
// ---------------------------------------------------------------------------

/// The section layout every new site starts from.
pub fn empty_payload() -> Value {
    json!({
        "business": { "name": "", "city": "", "region": "", "country": "", "postal": "" },
        "seo": { "title": "", "description": "", "keywords": "", "favicon": "", "search_terms": "" },
        "brand": { "name": "", "logo": "", "industry": "", "palette": DEFAULT_PALETTE },
        "settings": { "template": "", "locale": "" },
        "hero": {
            "badge": "",
            "heading": "",
            "subheading": "",
            "image": "",
            "imageAlt": "",
            "ctas": [],
            "rating": { "value": "", "count": "" }
        },
        "about": { "html": "" },
        "contact": {
            "phone": { "text": "", "link": "" },
            "whatsapp": { "text": "", "link": "" },
            "email": "",
            "website": { "text": "", "link": "" },
            "lat": null,
            "lng": null
        },
        "services": { "title": "Services", "listing": [] },
        "social": { "facebook": "", "instagram": "", "x": "", "youtube": "", "linkedin": "" },
        "gallery": []
    })
}

/// Validate that an author-supplied document is a JSON object of sane size.
pub fn validate_payload(payload: &Value) -> Result<(), CoreError> {
    if !payload.is_object() {
        return Err(CoreError::Validation(
            "Payload must be a JSON object of sections".into(),
        ));
    }
    let size = payload.to_string().len();
    if size > MAX_PAYLOAD_BYTES {
        return Err(CoreError::Validation(format!(
            "Payload must be at most {MAX_PAYLOAD_BYTES} bytes, got {size}"
        )));
    }
    Ok(())
}

/// Merge `sections` onto `base`.
///
/// Object sections present on both sides are merged key by key, with the
/// incoming keys winning. Every other section is replaced wholesale. Sections
/// absent from `sections` are kept as they are.
pub fn merge_sections(base: &Value, sections: &Value) -> Result<Value, CoreError> {
    validate_payload(sections)?;

    let mut merged: Map<String, Value> = match base {
        Value::Object(map) => map.clone(),
        _ => Map::new(),
    };

    if let Value::Object(incoming) = sections {
        for (key, value) in incoming {
            match (merged.get_mut(key), value) {
                (Some(Value::Object(existing)), Value::Object(update)) => {
                    for (k, v) in update {
                        existing.insert(k.clone(), v.clone());
                    }
                }
                _ => {
                    merged.insert(key.clone(), value.clone());
                }
            }
        }
    }

    let merged = Value::Object(merged);
    validate_payload(&merged)?;
    Ok(merged)
}

// ---------------------------------------------------------------------------
// Display-field derivation
// ---------------------------------------------------------------------------

/// Derive the mirrored display fields from a payload.
///
/// Blank strings become `None`. Country codes are upper-cased and must be two
/// ASCII letters. Coordinates are read from `contact.lat` / `contact.lng`
/// (numbers or numeric strings) and must be supplied together.
pub fn derive_display_fields(payload: &Value) -> Result<DisplayFields, CoreError> {
    let title = text(payload, "seo", "title", MAX_TITLE)?;
    let name = match text(payload, "business", "name", MAX_NAME)? {
        Some(name) => Some(name),
        None => text(payload, "brand", "name", MAX_NAME)?,
    };
    let city = text(payload, "business", "city", MAX_CITY)?;
    let region = text(payload, "business", "region", MAX_REGION)?;
    let country_code = country_code(payload)?;
    let postal_code = text(payload, "business", "postal", MAX_POSTAL_CODE)?;
    let site_template = text(payload, "settings", "template", MAX_TEMPLATE)?;
    let palette = text(payload, "brand", "palette", MAX_PALETTE)?;
    let industry = text(payload, "brand", "industry", MAX_INDUSTRY)?;
    let default_locale = text(payload, "settings", "locale", MAX_LOCALE)?;

    let search_terms = match text(payload, "seo", "search_terms", usize::MAX)? {
        Some(explicit) => build_search_terms(&[Some(&explicit)]),
        None => build_search_terms(&[
            name.as_deref(),
            city.as_deref(),
            industry.as_deref(),
            palette.as_deref(),
            title.as_deref(),
        ]),
    };

    let geo = match (
        coordinate(payload, "lat")?,
        coordinate(payload, "lng")?,
    ) {
        (Some(lat), Some(lng)) => Some(GeoPoint::new(lat, lng)?),
        (None, None) => None,
        _ => {
            return Err(CoreError::Validation(
                "contact.lat and contact.lng must be supplied together".into(),
            ))
        }
    };

    Ok(DisplayFields {
        title,
        name,
        city,
        region,
        country_code,
        postal_code,
        site_template,
        palette,
        industry,
        default_locale,
        search_terms,
        geo,
    })
}

fn section_value<'a>(payload: &'a Value, section: &str, key: &str) -> Option<&'a Value> {
    payload.get(section).and_then(|s| s.get(key))
}

fn text(
    payload: &Value,
    section: &str,
    key: &str,
    max: usize,
) -> Result<Option<String>, CoreError> {
    let Some(value) = section_value(payload, section, key) else {
        return Ok(None);
    };
    let raw = match value {
        Value::Null => return Ok(None),
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => {
            return Err(CoreError::Validation(format!(
                "{section}.{key} must be a string"
            )))
        }
    };
    if raw.is_empty() {
        return Ok(None);
    }
    if raw.chars().count() > max {
        return Err(CoreError::Validation(format!(
            "{section}.{key} must be at most {max} characters"
        )));
    }
    Ok(Some(raw))
}

fn country_code(payload: &Value) -> Result<Option<String>, CoreError> {
    let Some(code) = text(payload, "business", "country", usize::MAX)? else {
        return Ok(None);
    };
    if code.len() != 2 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(CoreError::Validation(format!(
            "business.country must be a two-letter ISO code, got '{code}'"
        )));
    }
    Ok(Some(code.to_ascii_uppercase()))
}

fn coordinate(payload: &Value, key: &str) -> Result<Option<f64>, CoreError> {
    match section_value(payload, "contact", key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => Ok(n.as_f64()),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(Value::String(s)) => s.trim().parse::<f64>().map(Some).map_err(|_| {
            CoreError::Validation(format!("contact.{key} must be numeric, got '{s}'"))
        }),
        Some(_) => Err(CoreError::Validation(format!(
            "contact.{key} must be numeric"
        ))),
    }
}
