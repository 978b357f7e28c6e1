//! gcode2as
//!
//! Converts G-code toolpaths (3D printing, laser cutting, wire arc metal
//! deposition) into Kawasaki AS robot programs.
//!
//! This library provides:
//! - G-code parsing
//! - Conversion of motion into robot statements with mode-specific tool signals
//! - AS text rendering and program sectioning
//! - Profiles and configuration management

pub mod config;
pub mod convert;
pub mod diagnostics;
pub mod emit;
pub mod error;
pub mod parser;
pub mod profile;
pub mod program;
pub mod report;
pub mod signal;

// Re-exports for the public API
pub use config::Config;
pub use convert::{Conversion, ConversionOptions, Converter, Incomplete, convert};
pub use diagnostics::{Diagnostic, Severity};
pub use emit::{Emitter, Statement};
pub use error::ConversionError;
pub use parser::{MotionCommand, ParsedProgram, parse_line, parse_program};
pub use profile::{Profile, ProfileRegistry};
pub use program::assemble;
pub use signal::Mode;
