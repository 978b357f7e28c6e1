//! Profile Registry
//!
//! Built-in profiles are embedded in the binary; user profiles are TOML files
//! read from profile directories and override built-ins of the same name.

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use super::schema::{Profile, ProfileFile, ProfileSource};

const BUILT_IN: [(&str, &str); 4] = [
    ("fdm", include_str!("../../resources/profiles/fdm.toml")),
    ("laser", include_str!("../../resources/profiles/laser.toml")),
    ("laser-dual", include_str!("../../resources/profiles/laser-dual.toml")),
    ("metal", include_str!("../../resources/profiles/metal.toml")),
];

/// In-memory profile registry
#[derive(Debug, Clone, Default)]
pub struct ProfileRegistry {
    profiles: HashMap<String, Profile>,
}

impl ProfileRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding only the embedded profiles
    pub fn with_built_ins() -> Self {
        let mut registry = Self::new();
        registry.add_built_ins();
        registry
    }

    /// Built-ins, then the user config directory, then `extra_dirs` in order
    pub fn load(extra_dirs: &[PathBuf]) -> Result<Self> {
        let mut registry = Self::with_built_ins();
        for dir in Self::default_dirs().iter().chain(extra_dirs) {
            registry.load_dir(dir)?;
        }
        Ok(registry)
    }

    /// `<config dir>/gcode2as/profiles`
    pub fn default_dirs() -> Vec<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join("gcode2as").join("profiles"))
            .into_iter()
            .collect()
    }

    pub fn add(&mut self, profile: Profile) {
        if let Some(previous) = self.profiles.insert(profile.name.clone(), profile) {
            log::debug!("profile '{}' overridden", previous.name);
        }
    }

    fn add_built_ins(&mut self) {
        for (name, content) in BUILT_IN {
            match Self::parse(content, ProfileSource::BuiltIn) {
                Ok(profile) => self.add(profile),
                Err(e) => log::warn!("Failed to parse built-in profile {name}: {e:#}"),
            }
        }
    }

    /// Parse profile TOML
    pub fn parse(content: &str, source: ProfileSource) -> Result<Profile> {
        let file: ProfileFile = toml::from_str(content).with_context(|| match &source {
            ProfileSource::File(path) => {
                format!("Failed to parse profile TOML: {}", path.display())
            }
            ProfileSource::BuiltIn => "Failed to parse built-in profile TOML".to_string(),
        })?;
        Ok(Profile::from_file(file, source))
    }

    /// Load a single profile file
    pub fn load_file(&mut self, path: &Path) -> Result<()> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read profile file: {}", path.display()))?;
        let profile = Self::parse(&content, ProfileSource::File(path.to_path_buf()))?;
        self.add(profile);
        Ok(())
    }

    /// Load every `*.toml` file of `dir`. A missing directory is not an
    /// error; a malformed file is logged and skipped. Returns the number of
    /// profiles loaded.
    pub fn load_dir(&mut self, dir: &Path) -> Result<usize> {
        if !dir.exists() {
            return Ok(0);
        }

        let entries = std::fs::read_dir(dir)
            .with_context(|| format!("Failed to read profile directory: {}", dir.display()))?;

        let mut paths: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.extension().and_then(|s| s.to_str()) == Some("toml"))
            .collect();
        paths.sort();

        let mut loaded = 0;
        for path in paths {
            match self.load_file(&path) {
                Ok(()) => loaded += 1,
                Err(e) => log::warn!("Skipping profile {}: {e:#}", path.display()),
            }
        }

        log::debug!("loaded {loaded} profiles from {}", dir.display());
        Ok(loaded)
    }

    pub fn get(&self, name: &str) -> Option<&Profile> {
        self.profiles.get(name)
    }

    /// Profile names, sorted
    pub fn list(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.profiles.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }
}
