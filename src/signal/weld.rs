//! Weld mode (wire arc additive manufacturing).
//!
//! Welding statements are only valid as a contiguous block: one `LWS` start
//! point, any number of `LWC` continuation points and one `LWE` end point.
//! Linear moves are therefore buffered into a run, and a run is flushed by
//! the rapid move that follows it. The rapid move preceding a run becomes the
//! run's start point; a rapid followed by another rapid is an ordinary move.

use super::{Sequenced, SignalSequencer, WeldSettings};
use crate::convert::state::{ResolvedCommand, TrackedState};
use crate::emit::{Note, Statement};
use crate::error::ConversionError;
use crate::parser::{CommandKind, MotionCommand};

/// Deferral state between commands
#[derive(Debug, Clone, Default, PartialEq)]
pub enum WeldPhase {
    #[default]
    Idle,
    /// A rapid move waiting to learn whether it starts a weld
    PendingRapid(ResolvedCommand),
    /// Linear moves collected since the last rapid move
    Buffering {
        start: Option<ResolvedCommand>,
        run: Vec<ResolvedCommand>,
    },
}

#[derive(Debug, Clone)]
pub struct WeldSequencer {
    settings: WeldSettings,
    phase: WeldPhase,
}

impl WeldSequencer {
    pub fn new(settings: WeldSettings) -> Self {
        Self {
            settings,
            phase: WeldPhase::Idle,
        }
    }

    pub fn phase(&self) -> &WeldPhase {
        &self.phase
    }

    /// Translate a buffered run into its weld block. `line` is reported when
    /// the run is unusable.
    pub fn flush_run(
        start: Option<&ResolvedCommand>,
        run: &[ResolvedCommand],
        line: usize,
    ) -> Result<Vec<Statement>, ConversionError> {
        let Some((last, interior)) = run.split_last() else {
            return Err(ConversionError::EmptyWeldRun { line });
        };
        let Some(start) = start else {
            return Err(ConversionError::MissingWeldStart { line });
        };

        let mut statements = Vec::with_capacity(run.len() + 1);
        statements.push(Statement::WeldStart {
            target: start.target,
            note: Some(Note::from(&start.command)),
        });
        statements.extend(interior.iter().map(|weld| Statement::WeldContinue {
            target: weld.target,
            note: Some(Note::from(&weld.command)),
        }));
        statements.push(Statement::WeldEnd {
            target: last.target,
            note: Some(Note::from(&last.command)),
        });

        log::debug!(
            "flushed weld run of {} moves ending at line {}",
            run.len(),
            last.command.line
        );

        Ok(statements)
    }

    /// Flush whatever the current phase holds. On error the phase is left
    /// untouched so the buffered commands can still be reported.
    fn flush_phase(&mut self, line: usize) -> Result<Vec<Statement>, ConversionError> {
        match &self.phase {
            WeldPhase::Idle => Ok(Vec::new()),
            WeldPhase::PendingRapid(rapid) => {
                let statement = Statement::Move {
                    target: rapid.target,
                    note: Some(Note::from(&rapid.command)),
                };
                self.phase = WeldPhase::Idle;
                Ok(vec![statement])
            }
            WeldPhase::Buffering { start, run } => {
                let statements = Self::flush_run(start.as_ref(), run, line)?;
                self.phase = WeldPhase::Idle;
                Ok(statements)
            }
        }
    }
}

impl SignalSequencer for WeldSequencer {
    fn preamble(&self) -> Vec<Statement> {
        vec![
            Statement::Banner("WELDING CONDITIONS".to_string()),
            Statement::WeldConditions {
                condition: self.settings.condition,
                speed: self.settings.welding_speed,
            },
            Statement::Banner(String::new()),
        ]
    }

    fn process(
        &mut self,
        resolved: &ResolvedCommand,
        _state: &mut TrackedState,
    ) -> Result<Sequenced, ConversionError> {
        match resolved.command.kind {
            CommandKind::Rapid => {
                let statements = self.flush_phase(resolved.command.line)?;
                self.phase = WeldPhase::PendingRapid(resolved.clone());
                Ok(Sequenced::without_motion(statements))
            }
            CommandKind::Linear if resolved.command.has_coordinates() => {
                self.phase = match std::mem::take(&mut self.phase) {
                    WeldPhase::Idle => WeldPhase::Buffering {
                        start: None,
                        run: vec![resolved.clone()],
                    },
                    WeldPhase::PendingRapid(rapid) => WeldPhase::Buffering {
                        start: Some(rapid),
                        run: vec![resolved.clone()],
                    },
                    WeldPhase::Buffering { start, mut run } => {
                        run.push(resolved.clone());
                        WeldPhase::Buffering { start, run }
                    }
                };
                Ok(Sequenced::without_motion(Vec::new()))
            }
            // Feed or amount only: irrelevant to the weld path
            _ => Ok(Sequenced::without_motion(Vec::new())),
        }
    }

    fn finish(&mut self, _state: &mut TrackedState) -> Result<Vec<Statement>, ConversionError> {
        let line = match &self.phase {
            WeldPhase::Buffering { run, .. } => run.last().map_or(0, |r| r.command.line),
            _ => 0,
        };
        self.flush_phase(line)
    }

    fn pending(&self) -> Vec<MotionCommand> {
        match &self.phase {
            WeldPhase::Idle => Vec::new(),
            WeldPhase::PendingRapid(rapid) => vec![rapid.command.clone()],
            WeldPhase::Buffering { start, run } => start
                .iter()
                .chain(run.iter())
                .map(|r| r.command.clone())
                .collect(),
        }
    }
}
