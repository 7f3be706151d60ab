//! Version status, lifecycle rules, and generated labels.
//!
//! A version starts as a draft, is promoted to published exactly once via
//! the publish coordinator, and is demoted back to draft when a newer version
//! replaces it. A demoted version keeps its `published_at` stamp, which is how
//! history views tell a superseded snapshot apart from a fresh draft.

use crate::error::CoreError;
use crate::types::Timestamp;

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

pub const STATUS_DRAFT: &str = "draft";
pub const STATUS_PUBLISHED: &str = "published";

/// Returns `true` when a draft row was previously the live version.
pub fn is_superseded(status: &str, published_at: Option<Timestamp>) -> bool {
    status == STATUS_DRAFT && published_at.is_some()
}

/// Ensure a version may be published: only drafts can be promoted.
pub fn ensure_publishable(version_number: i32, status: &str) -> Result<(), CoreError> {
    if status != STATUS_DRAFT {
        return Err(CoreError::InvalidState(format!(
            "Only draft versions can be published; v{version_number} is {status}"
        )));
    }
    Ok(())
}

/// Ensure a version may be edited in place. Published rows are immutable, and
/// so are superseded drafts: once live, a snapshot stays as it was.
pub fn ensure_editable(
    version_number: i32,
    status: &str,
    published_at: Option<Timestamp>,
) -> Result<(), CoreError> {
    if status != STATUS_DRAFT {
        return Err(CoreError::InvalidState(format!(
            "Version v{version_number} is {status} and can no longer be edited; create a new draft"
        )));
    }
    if is_superseded(status, published_at) {
        return Err(CoreError::InvalidState(format!(
            "Version v{version_number} was previously published and can no longer be edited; create a new draft"
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Generated labels
// ---------------------------------------------------------------------------

/// Maximum length of a version label (`site_versions.label`).
pub const MAX_LABEL_LENGTH: usize = 120;

/// Maximum length of a version comment.
pub const MAX_COMMENT_LENGTH: usize = 2000;

pub fn rollback_label(source_version_number: i32) -> String {
    format!("Rollback to v{source_version_number}")
}

pub fn rollback_comment(source_version_number: i32) -> String {
    format!("Rollback from version {source_version_number}")
}

pub fn editing_draft_label(source_version_number: i32) -> String {
    format!("Draft from v{source_version_number}")
}

pub fn editing_draft_comment(source_version_number: i32) -> String {
    format!("Created from version {source_version_number} for editing")
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validate an optional author-supplied label (non-blank, <= 120 chars).
pub fn validate_label(label: Option<&str>) -> Result<(), CoreError> {
    let Some(label) = label else {
        return Ok(());
    };
    if label.trim().is_empty() {
        return Err(CoreError::Validation(
            "Version label must not be blank".into(),
        ));
    }
    if label.chars().count() > MAX_LABEL_LENGTH {
        return Err(CoreError::Validation(format!(
            "Version label must be at most {MAX_LABEL_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Validate an optional comment (<= 2000 chars).
pub fn validate_comment(comment: Option<&str>) -> Result<(), CoreError> {
    if let Some(comment) = comment {
        if comment.chars().count() > MAX_COMMENT_LENGTH {
            return Err(CoreError::Validation(format!(
                "Version comment must be at most {MAX_COMMENT_LENGTH} characters"
            )));
        }
    }
    Ok(())
}
