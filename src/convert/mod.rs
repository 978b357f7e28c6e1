//! Conversion
//!
//! Turns the parsed command stream into robot statements. See
//! [`engine::Converter`] for the driver.

pub mod engine;
pub mod simplify;
pub mod state;

pub use engine::{Conversion, Converter, Incomplete};
pub use simplify::PathSimplifier;
pub use state::{ConversionStats, Point, PositionTracker, ResolvedCommand, TrackedState};

use crate::parser::MotionCommand;
use crate::signal::Mode;

/// Minimum distance in mm between two emitted linear moves
pub const DEFAULT_MIN_DISTANCE: f64 = 2.0;

/// Maximum statements per robot program before the output is split
pub const DEFAULT_MAX_SECTION_SIZE: usize = 1000;

/// Everything that controls a single conversion run
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionOptions {
    pub mode: Mode,
    pub min_distance: f64,
    /// Constant speed replacing every source feed rate
    pub speed_override: Option<f64>,
    /// Annotate moves with the full source line instead of its comment
    pub verbose: bool,
    /// Spiralized output: z changes alone do not force a move
    pub vase_mode: bool,
    /// Negate z (part built upside down)
    pub inverted: bool,
    pub max_section_size: usize,
}

impl Default for ConversionOptions {
    fn default() -> Self {
        Self {
            mode: Mode::default(),
            min_distance: DEFAULT_MIN_DISTANCE,
            speed_override: None,
            verbose: false,
            vase_mode: false,
            inverted: false,
            max_section_size: DEFAULT_MAX_SECTION_SIZE,
        }
    }
}

/// Convert `commands` with `options` from a fresh machine state
pub fn convert(
    commands: impl IntoIterator<Item = MotionCommand>,
    options: &ConversionOptions,
) -> Result<Conversion, Box<Incomplete>> {
    Converter::new(options).convert(commands)
}
