//! Conversion Engine
//!
//! Drives one conversion run: resolves every command against the tracked
//! state, lets the active sequencer place tool signals, elides short linear
//! moves and collects the resulting statements.

use thiserror::Error;

use super::simplify::PathSimplifier;
use super::state::{ConversionStats, PositionTracker, ResolvedCommand, TrackedState};
use super::ConversionOptions;
use crate::diagnostics::Diagnostic;
use crate::emit::{Emitter, Note, Statement};
use crate::error::ConversionError;
use crate::parser::{CommandKind, MotionCommand};
use crate::signal::SignalSequencer;

/// Result of a conversion run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Conversion {
    pub statements: Vec<Statement>,
    pub stats: ConversionStats,
    pub diagnostics: Vec<Diagnostic>,
}

impl Conversion {
    /// Render every statement with `emitter`. A welding block, from `LWS` up
    /// to its `LWE`, is joined into one entry so sectioning keeps it whole.
    pub fn render(&self, emitter: &Emitter) -> Vec<String> {
        let mut rendered = Vec::with_capacity(self.statements.len());
        let mut block: Option<String> = None;

        for statement in &self.statements {
            let text = emitter.render(statement);
            if let Statement::WeldStart { .. } = statement {
                rendered.extend(block.replace(text));
                continue;
            }
            let Some(open) = block.as_mut() else {
                rendered.push(text);
                continue;
            };
            open.push_str(&text);
            if let Statement::WeldEnd { .. } = statement {
                rendered.extend(block.take());
            }
        }
        rendered.extend(block);
        rendered
    }
}

/// A run that stopped on an invariant violation. Carries everything produced
/// up to that point plus the commands still buffered.
#[derive(Debug, Error)]
#[error("conversion stopped after {} statements", .partial.statements.len())]
pub struct Incomplete {
    #[source]
    pub error: ConversionError,
    pub partial: Conversion,
    pub pending: Vec<MotionCommand>,
}

pub struct Converter {
    tracker: PositionTracker,
    simplifier: PathSimplifier,
    sequencer: Box<dyn SignalSequencer>,
    speed_override: Option<f64>,
    state: TrackedState,
    statements: Vec<Statement>,
    /// Last elided linear move, emitted if a signal must follow it
    deferred: Option<ResolvedCommand>,
    diagnostics: Vec<Diagnostic>,
}

impl Converter {
    pub fn new(options: &ConversionOptions) -> Self {
        Self::with_state(options, TrackedState::default())
    }

    /// Start from an explicit initial machine state
    pub fn with_state(options: &ConversionOptions, state: TrackedState) -> Self {
        Self::with_sequencer(options, options.mode.sequencer(), state)
    }

    pub fn with_sequencer(
        options: &ConversionOptions,
        sequencer: Box<dyn SignalSequencer>,
        state: TrackedState,
    ) -> Self {
        Self {
            tracker: PositionTracker::new(options.inverted),
            simplifier: PathSimplifier::new(options.min_distance, options.vase_mode),
            sequencer,
            speed_override: options.speed_override,
            state,
            statements: Vec::new(),
            deferred: None,
            diagnostics: Vec::new(),
        }
    }

    /// Convert a whole command stream
    pub fn convert<I>(mut self, commands: I) -> Result<Conversion, Box<Incomplete>>
    where
        I: IntoIterator<Item = MotionCommand>,
    {
        self.start();

        for command in commands {
            if let Err(error) = self.step(command) {
                return Err(self.fail(error));
            }
        }

        match self.finish() {
            Ok(()) => Ok(self.into_conversion()),
            Err(error) => Err(self.fail(error)),
        }
    }

    fn start(&mut self) {
        if let Some(speed) = self.speed_override {
            self.statements.push(Statement::Speed(speed));
            self.state.emitted_feed = Some(speed);
        }
        let preamble = self.sequencer.preamble();
        self.statements.extend(preamble);
    }

    fn step(&mut self, command: MotionCommand) -> Result<(), ConversionError> {
        self.state.stats.commands += 1;

        match &command.kind {
            CommandKind::Rapid | CommandKind::Linear => self.motion(command)?,
            CommandKind::Comment => {
                if let Some(text) = command.comment.filter(|text| !text.is_empty()) {
                    self.statements.push(Statement::Comment(text));
                }
            }
            CommandKind::SetPosition => {
                if let Some(amount) = command.amount {
                    self.state.amount = amount;
                }
                if command.has_coordinates() {
                    self.diagnostics.push(Diagnostic::warning(
                        command.line,
                        "G92 coordinates are ignored, only E is applied",
                    ));
                }
            }
            CommandKind::Unsupported(code) => {
                self.state.stats.skipped += 1;
                self.diagnostics.push(unsupported(code, &command));
            }
        }

        Ok(())
    }

    fn motion(&mut self, command: MotionCommand) -> Result<(), ConversionError> {
        let resolved = self.tracker.resolve(command, &mut self.state);
        let sequenced = self.sequencer.process(&resolved, &mut self.state)?;

        if !sequenced.statements.is_empty() {
            self.flush_deferred();
            self.statements.extend(sequenced.statements);
        }

        if !sequenced.emit_motion || !resolved.moved {
            return Ok(());
        }

        if resolved.command.kind == CommandKind::Linear
            && self.simplifier.should_skip(&resolved, &mut self.state)
        {
            log::trace!("line {}: move elided", resolved.command.line);
            self.state.stats.omitted += 1;
            self.deferred = Some(resolved);
            return Ok(());
        }

        // Any deferred move is absorbed by this one
        self.deferred = None;
        self.emit_move(resolved);
        Ok(())
    }

    fn emit_move(&mut self, resolved: ResolvedCommand) {
        if self.speed_override.is_none() {
            if let Some(feed) = resolved.feed.filter(|f| self.state.emitted_feed != Some(*f)) {
                self.statements.push(Statement::Speed(feed));
                self.state.emitted_feed = Some(feed);
            }
        }

        self.statements.push(Statement::Move {
            target: resolved.target,
            note: Some(Note::from(&resolved.command)),
        });
        self.state.mark_emitted(resolved.target);
    }

    fn flush_deferred(&mut self) {
        if let Some(deferred) = self.deferred.take() {
            self.state.stats.omitted = self.state.stats.omitted.saturating_sub(1);
            self.emit_move(deferred);
        }
    }

    fn finish(&mut self) -> Result<(), ConversionError> {
        self.flush_deferred();
        let closing = self.sequencer.finish(&mut self.state)?;
        self.statements.extend(closing);
        Ok(())
    }

    fn fail(self, error: ConversionError) -> Box<Incomplete> {
        let pending = self.sequencer.pending();
        let mut partial = self.into_conversion();
        partial
            .diagnostics
            .push(Diagnostic::error(error.line(), error.to_string()));

        Box::new(Incomplete {
            error,
            partial,
            pending,
        })
    }

    fn into_conversion(self) -> Conversion {
        let mut stats = self.state.stats;
        stats.emitted = self.statements.len();

        log::debug!(
            "conversion finished: {} commands, {} statements, {} omitted, {} skipped",
            stats.commands,
            stats.emitted,
            stats.omitted,
            stats.skipped
        );

        Conversion {
            statements: self.statements,
            stats,
            diagnostics: self.diagnostics,
        }
    }
}

fn unsupported(code: &str, command: &MotionCommand) -> Diagnostic {
    let is_arc = code
        .strip_prefix('G')
        .and_then(|n| n.parse::<f64>().ok())
        .is_some_and(|n| n == 2.0 || n == 3.0);

    if is_arc {
        Diagnostic::warning(
            command.line,
            format!("arc move {code} is not supported, command dropped"),
        )
    } else if code.is_empty() {
        Diagnostic::warning(
            command.line,
            format!("'{command}' has no command word, dropped"),
        )
    } else {
        Diagnostic::info(
            command.line,
            format!("{code} has no AS equivalent, command dropped"),
        )
    }
}
