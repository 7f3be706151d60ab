//! Normalized search terms and list pagination helpers.

// ---------------------------------------------------------------------------
// Pagination defaults
// ---------------------------------------------------------------------------

/// Default number of versions per history page.
pub const DEFAULT_HISTORY_LIMIT: i64 = 50;

/// Maximum number of versions per history page.
pub const MAX_HISTORY_LIMIT: i64 = 200;

/// Clamp a user-provided limit to `[1, max]`, using `default` when absent.
pub fn clamp_limit(limit: Option<i64>, default: i64, max: i64) -> i64 {
    limit.unwrap_or(default).max(1).min(max)
}

/// Clamp a user-provided offset to non-negative.
pub fn clamp_offset(offset: Option<i64>) -> i64 {
    offset.unwrap_or(0).max(0)
}

// ---------------------------------------------------------------------------
// Search terms
// ---------------------------------------------------------------------------

/// Build the lowercase `search_terms` column from the mirrored display fields.
///
/// Empty parts are skipped and runs of whitespace collapse to a single space.
pub fn build_search_terms(parts: &[Option<&str>]) -> Option<String> {
    let joined = parts
        .iter()
        .flatten()
        .flat_map(|p| p.split_whitespace())
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ");

    if joined.is_empty() {
        None
    } else {
        Some(joined)
    }
}
