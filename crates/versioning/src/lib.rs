//! Draft authoring, publishing, and rollback for minisite versions.
//!
//! Each coordinator owns a pool handle and an injected [`AuthorizationPolicy`].
//! Ownership and state checks run before any transaction is opened; every
//! multi-statement write runs in one transaction that is rolled back
//! explicitly on failure.

pub mod cache;
pub mod drafts;
pub mod error;
pub mod policy;
pub mod publish;
pub mod rollback;
mod tx;

pub use cache::SiteProjectionCache;
pub use drafts::{DraftAuthoringService, DraftInput};
pub use error::{VersioningError, VersioningResult};
pub use policy::{AuthorizationPolicy, OwnerOrAdminPolicy, SiteOwnerPolicy};
pub use publish::{PublishCoordinator, PublishOutcome, PublishRequest};
pub use rollback::RollbackCoordinator;
