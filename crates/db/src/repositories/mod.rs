//! Repository layer.
//!
//! `SiteRepo` owns the denormalized site projection; `SiteVersionRepo` is the
//! version store.

pub mod site_repo;
pub mod site_version_repo;

pub use site_repo::SiteRepo;
pub use site_version_repo::SiteVersionRepo;
