//! Errors raised by the conversion engine.

use thiserror::Error;

/// State-machine contract violations that end a conversion run
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConversionError {
    #[error("invalid weld state at line {line}: the weld move list is empty")]
    EmptyWeldRun { line: usize },
    #[error("invalid weld state at line {line}: the weld run has no starting rapid move")]
    MissingWeldStart { line: usize },
}

impl ConversionError {
    /// Source line the violation was detected on
    pub fn line(&self) -> usize {
        match self {
            ConversionError::EmptyWeldRun { line } | ConversionError::MissingWeldStart { line } => {
                *line
            }
        }
    }
}
