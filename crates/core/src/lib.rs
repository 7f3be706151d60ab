//! Domain logic for minisite versioning.
//!
//! This crate has no IO dependencies so it can be shared by the persistence
//! layer, the coordinators, and the HTTP shell alike.

pub mod error;
pub mod payload;
pub mod search;
pub mod types;
pub mod version;
