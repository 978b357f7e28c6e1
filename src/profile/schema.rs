//! Profile Schema Types

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::signal::Mode;

/// Root profile file structure (matches TOML)
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct ProfileFile {
    pub profile: ProfileMeta,
    pub mode: Mode,
}

/// Profile metadata
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct ProfileMeta {
    pub name: String,
    pub description: Option<String>,
}

/// Where a profile was loaded from. Later sources win on name clashes.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum ProfileSource {
    BuiltIn,
    File(PathBuf),
}

/// Runtime profile
#[derive(Debug, Clone, PartialEq)]
pub struct Profile {
    pub name: String,
    pub description: Option<String>,
    pub mode: Mode,
    pub source: ProfileSource,
}

impl Profile {
    pub fn from_file(file: ProfileFile, source: ProfileSource) -> Self {
        Self {
            name: file.profile.name,
            description: file.profile.description,
            mode: file.mode,
            source,
        }
    }
}
