//! Laser mode.
//!
//! The laser only fires during linear moves: it is switched on by the first
//! linear move of a run and switched off by the rapid move that ends it.

use super::{LaserSignals, Sequenced, SignalSequencer};
use crate::convert::state::{ResolvedCommand, TrackedState};
use crate::emit::Statement;
use crate::error::ConversionError;
use crate::parser::CommandKind;

#[derive(Debug, Clone)]
pub struct LaserSequencer {
    signals: LaserSignals,
}

impl LaserSequencer {
    pub fn new(signals: LaserSignals) -> Self {
        Self { signals }
    }

    fn turn_on(&self) -> Statement {
        match self.signals.off_signal {
            Some(_) => Statement::Pulse {
                number: self.signals.signal,
                duration: self.signals.pulse,
            },
            None => Statement::Signal {
                number: self.signals.signal,
                on: true,
            },
        }
    }

    fn turn_off(&self) -> Statement {
        match self.signals.off_signal {
            Some(off) => Statement::Pulse {
                number: off,
                duration: self.signals.pulse,
            },
            None => Statement::Signal {
                number: self.signals.signal,
                on: false,
            },
        }
    }
}

impl SignalSequencer for LaserSequencer {
    fn process(
        &mut self,
        resolved: &ResolvedCommand,
        state: &mut TrackedState,
    ) -> Result<Sequenced, ConversionError> {
        let mut statements = Vec::new();

        match resolved.command.kind {
            CommandKind::Rapid if state.tool_on => {
                statements.push(self.turn_off());
                state.tool_on = false;
            }
            CommandKind::Linear if resolved.moved && !state.tool_on => {
                statements.push(self.turn_on());
                state.tool_on = true;
            }
            _ => {}
        }

        Ok(Sequenced::motion(statements))
    }

    fn finish(&mut self, state: &mut TrackedState) -> Result<Vec<Statement>, ConversionError> {
        if state.tool_on {
            state.tool_on = false;
            return Ok(vec![self.turn_off()]);
        }
        Ok(Vec::new())
    }
}
