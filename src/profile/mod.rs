//! Conversion Profiles
//!
//! Named, TOML-defined mode configurations selected with `--profile`.

pub mod registry;
pub mod schema;

pub use registry::ProfileRegistry;
pub use schema::{Profile, ProfileFile, ProfileMeta, ProfileSource};
