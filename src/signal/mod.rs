//! Signal Sequencing
//!
//! Each process mode decides when the tool is switched on and off relative
//! to motion. The engine talks to the active mode only through
//! [`SignalSequencer`], chosen once from the [`Mode`] configuration.

pub mod extrusion;
pub mod laser;
pub mod weld;

pub use extrusion::ExtrusionSequencer;
pub use laser::LaserSequencer;
pub use weld::{WeldPhase, WeldSequencer};

use serde::{Deserialize, Serialize};

use crate::convert::state::{ResolvedCommand, TrackedState};
use crate::emit::Statement;
use crate::error::ConversionError;
use crate::parser::MotionCommand;

/// Output of processing one resolved command
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sequenced {
    /// Statements that must precede the command's own motion
    pub statements: Vec<Statement>,
    /// Whether the engine should emit a motion statement for the command
    pub emit_motion: bool,
}

impl Sequenced {
    pub fn motion(statements: Vec<Statement>) -> Self {
        Self {
            statements,
            emit_motion: true,
        }
    }

    pub fn without_motion(statements: Vec<Statement>) -> Self {
        Self {
            statements,
            emit_motion: false,
        }
    }
}

/// Mode-specific tool activation logic
pub trait SignalSequencer {
    /// Statements placed at the very start of the program
    fn preamble(&self) -> Vec<Statement> {
        Vec::new()
    }

    /// Handle one rapid or linear move
    fn process(
        &mut self,
        resolved: &ResolvedCommand,
        state: &mut TrackedState,
    ) -> Result<Sequenced, ConversionError>;

    /// Statements needed to leave the tool in a safe state at end of stream
    fn finish(&mut self, state: &mut TrackedState) -> Result<Vec<Statement>, ConversionError>;

    /// Commands buffered but not yet translated
    fn pending(&self) -> Vec<MotionCommand> {
        Vec::new()
    }
}

pub(crate) fn default_pulse() -> f64 {
    0.1
}

pub(crate) fn default_welding_speed() -> f64 {
    15.0
}

pub(crate) fn default_condition() -> u8 {
    1
}

/// Extruder signal numbers (FDM printing)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtrusionSignals {
    pub extrude_signal: u16,
    pub retract_signal: u16,
    /// Retraction pulse length in seconds
    #[serde(default = "default_pulse")]
    pub retract_pulse: f64,
}

/// Laser signal numbers. With `off_signal` set the laser is driven by two
/// pulsed signals instead of one latched signal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaserSignals {
    pub signal: u16,
    #[serde(default)]
    pub off_signal: Option<u16>,
    #[serde(default = "default_pulse")]
    pub pulse: f64,
}

/// Welding card settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeldSettings {
    #[serde(default = "default_welding_speed")]
    pub welding_speed: f64,
    /// Welding condition number used by W1SET/W2SET
    #[serde(default = "default_condition")]
    pub condition: u8,
}

/// Process mode and its tool configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Mode {
    Extrusion(ExtrusionSignals),
    Laser(LaserSignals),
    Weld(WeldSettings),
}

impl Default for Mode {
    fn default() -> Self {
        Mode::Extrusion(ExtrusionSignals {
            extrude_signal: 2001,
            retract_signal: 2002,
            retract_pulse: default_pulse(),
        })
    }
}

impl Mode {
    pub fn name(&self) -> &'static str {
        match self {
            Mode::Extrusion(_) => "extrusion",
            Mode::Laser(_) => "laser",
            Mode::Weld(_) => "weld",
        }
    }

    /// Build the sequencer for this mode
    pub fn sequencer(&self) -> Box<dyn SignalSequencer> {
        match self {
            Mode::Extrusion(signals) => Box::new(ExtrusionSequencer::new(signals.clone())),
            Mode::Laser(signals) => Box::new(LaserSequencer::new(signals.clone())),
            Mode::Weld(settings) => Box::new(WeldSequencer::new(settings.clone())),
        }
    }

    /// Override the primary signal (extrude or laser-on). Returns false when
    /// the mode has no such signal.
    pub fn set_primary_signal(&mut self, number: u16) -> bool {
        match self {
            Mode::Extrusion(signals) => signals.extrude_signal = number,
            Mode::Laser(signals) => signals.signal = number,
            Mode::Weld(_) => return false,
        }
        true
    }

    /// Override the secondary signal (retract or laser-off)
    pub fn set_secondary_signal(&mut self, number: u16) -> bool {
        match self {
            Mode::Extrusion(signals) => signals.retract_signal = number,
            Mode::Laser(signals) => signals.off_signal = Some(number),
            Mode::Weld(_) => return false,
        }
        true
    }

    /// Signal numbers in use, for validation
    pub fn signals(&self) -> Vec<u16> {
        match self {
            Mode::Extrusion(s) => vec![s.extrude_signal, s.retract_signal],
            Mode::Laser(s) => std::iter::once(s.signal).chain(s.off_signal).collect(),
            Mode::Weld(_) => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_from_toml() {
        let mode: Mode = toml::from_str(
            r#"
kind = "laser"
signal = 5
off_signal = 6
"#,
        )
        .expect("parse mode");

        assert_eq!(
            mode,
            Mode::Laser(LaserSignals {
                signal: 5,
                off_signal: Some(6),
                pulse: 0.1,
            })
        );
        assert_eq!(mode.signals(), vec![5, 6]);
    }

    #[test]
    fn test_weld_defaults() {
        let mode: Mode = toml::from_str("kind = \"weld\"").expect("parse mode");
        assert_eq!(
            mode,
            Mode::Weld(WeldSettings {
                welding_speed: 15.0,
                condition: 1,
            })
        );
    }

    #[test]
    fn test_signal_overrides() {
        let mut mode = Mode::default();
        assert!(mode.set_primary_signal(1));
        assert!(mode.set_secondary_signal(2));
        assert_eq!(mode.signals(), vec![1, 2]);

        let mut weld = Mode::Weld(WeldSettings {
            welding_speed: 10.0,
            condition: 2,
        });
        assert!(!weld.set_primary_signal(1));
    }
}
