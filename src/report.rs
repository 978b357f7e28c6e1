//! JSON run report written with `--report`.

use anyhow::{Context, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::convert::ConversionStats;
use crate::diagnostics::{Diagnostic, tally};

#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub input: PathBuf,
    pub output: PathBuf,
    pub program: String,
    pub mode: String,
    pub profile: Option<String>,
    /// False when the run stopped early and the output is partial
    pub complete: bool,
    pub stats: ConversionStats,
    pub errors: usize,
    pub warnings: usize,
    pub diagnostics: Vec<Diagnostic>,
    /// Source lines still buffered when the run stopped
    pub pending_lines: Vec<usize>,
}

impl RunReport {
    /// Fill the severity counters from `diagnostics`
    pub fn with_diagnostics(mut self, diagnostics: Vec<Diagnostic>) -> Self {
        let (errors, warnings, _) = tally(&diagnostics);
        self.errors = errors;
        self.warnings = warnings;
        self.diagnostics = diagnostics;
        self
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("Failed to serialize run report")?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write run report: {}", path.display()))
    }
}
