//! Extrusion mode (FDM printing).
//!
//! The extruder is latched on by its signal while the E value grows and
//! released as soon as a move stops extruding. Retractions additionally pulse
//! the retract signal.

use super::{ExtrusionSignals, Sequenced, SignalSequencer};
use crate::convert::state::{ResolvedCommand, TrackedState};
use crate::emit::Statement;
use crate::error::ConversionError;

#[derive(Debug, Clone)]
pub struct ExtrusionSequencer {
    signals: ExtrusionSignals,
}

impl ExtrusionSequencer {
    pub fn new(signals: ExtrusionSignals) -> Self {
        Self { signals }
    }

    fn activate(&self) -> Statement {
        Statement::Signal {
            number: self.signals.extrude_signal,
            on: true,
        }
    }

    fn deactivate(&self) -> Statement {
        Statement::Signal {
            number: self.signals.extrude_signal,
            on: false,
        }
    }
}

impl SignalSequencer for ExtrusionSequencer {
    fn process(
        &mut self,
        resolved: &ResolvedCommand,
        state: &mut TrackedState,
    ) -> Result<Sequenced, ConversionError> {
        let mut statements = Vec::new();

        match resolved.command.amount {
            Some(amount) if amount > state.amount => {
                if !state.tool_on {
                    statements.push(self.activate());
                    state.tool_on = true;
                }
            }
            Some(amount) if amount < state.amount => {
                if state.tool_on {
                    statements.push(self.deactivate());
                }
                statements.push(Statement::Pulse {
                    number: self.signals.retract_signal,
                    duration: self.signals.retract_pulse,
                });
                state.tool_on = false;
            }
            // Unchanged or missing amount: the move does not extrude
            _ => {
                if state.tool_on {
                    statements.push(self.deactivate());
                    state.tool_on = false;
                }
            }
        }

        if let Some(amount) = resolved.command.amount {
            state.amount = amount;
        }

        Ok(Sequenced::motion(statements))
    }

    fn finish(&mut self, state: &mut TrackedState) -> Result<Vec<Statement>, ConversionError> {
        if state.tool_on {
            state.tool_on = false;
            return Ok(vec![self.deactivate()]);
        }
        Ok(Vec::new())
    }
}
