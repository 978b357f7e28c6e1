//! Conversion Diagnostics
//!
//! Non-fatal findings collected while parsing and converting. They are
//! returned alongside the result instead of being printed as they happen.

use serde::Serialize;

/// Severity of a diagnostic message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

/// A finding attached to a source line
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    pub line: usize,
    pub message: String,
    pub severity: Severity,
}

impl Diagnostic {
    pub fn error(line: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            message: message.into(),
            severity: Severity::Error,
        }
    }

    pub fn warning(line: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            message: message.into(),
            severity: Severity::Warning,
        }
    }

    pub fn info(line: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            message: message.into(),
            severity: Severity::Info,
        }
    }

    /// Forward this diagnostic to the `log` facade at the matching level
    pub fn log(&self) {
        match self.severity {
            Severity::Error => log::error!("line {}: {}", self.line, self.message),
            Severity::Warning => log::warn!("line {}: {}", self.line, self.message),
            Severity::Info => log::debug!("line {}: {}", self.line, self.message),
        }
    }
}

/// Counts diagnostics by severity: (errors, warnings, infos)
pub fn tally(diagnostics: &[Diagnostic]) -> (usize, usize, usize) {
    diagnostics
        .iter()
        .fold((0, 0, 0), |(e, w, i), d| match d.severity {
            Severity::Error => (e + 1, w, i),
            Severity::Warning => (e, w + 1, i),
            Severity::Info => (e, w, i + 1),
        })
}
