//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - `Deserialize`/plain DTOs for inserts and updates

pub mod site;
pub mod site_version;
