pub mod sites;
pub mod versions;
