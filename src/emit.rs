//! Statement Emitter
//!
//! Logical target-dialect operations and their Kawasaki AS text. Rendering is
//! pure: the same statement always produces the same text.

use crate::convert::state::Point;
use crate::parser::MotionCommand;

/// Width teach pendants display; banner comments are padded to it.
pub const TP_LINE_WIDTH: usize = 76;

/// Source information carried by motion statements for inline annotation
#[derive(Debug, Clone, PartialEq)]
pub struct Note {
    pub raw: String,
    pub comment: Option<String>,
}

impl From<&MotionCommand> for Note {
    fn from(command: &MotionCommand) -> Self {
        Self {
            raw: command.raw.clone(),
            comment: command.comment.clone(),
        }
    }
}

/// One logical statement of the output program
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// Linear interpolated move to an absolute point
    Move { target: Point, note: Option<Note> },
    /// Feed rate in mm/min, kept until changed
    Speed(f64),
    /// Switch a dedicated output signal on or off
    Signal { number: u16, on: bool },
    /// Pulse an output signal for `duration` seconds
    Pulse { number: u16, duration: f64 },
    Comment(String),
    /// Comment padded with `*` up to [`TP_LINE_WIDTH`]
    Banner(String),
    WeldStart { target: Point, note: Option<Note> },
    WeldContinue { target: Point, note: Option<Note> },
    WeldEnd { target: Point, note: Option<Note> },
    /// Welding condition block, rendered as two lines that stay together
    WeldConditions { condition: u8, speed: f64 },
    /// Call a sub-program
    Call(String),
}

/// Renders statements into AS text
#[derive(Debug, Clone, Copy, Default)]
pub struct Emitter {
    /// Append the source line to every motion statement
    pub verbose: bool,
}

impl Emitter {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    /// Render one statement; every line of the result ends with `\n`.
    pub fn render(&self, statement: &Statement) -> String {
        match statement {
            Statement::Move { target, note } => {
                self.annotated(format!("LMOVE {}", shift(target)), note.as_ref())
            }
            Statement::Speed(speed) => format!("SPEED {} MM/MIN ALWAYS\n", number(*speed)),
            Statement::Signal { number, on: true } => format!("SIGNAL {number}\n"),
            Statement::Signal { number, on: false } => format!("SIGNAL -{number}\n"),
            Statement::Pulse { number: signal, duration } => {
                format!("PULSE {signal}, {}\n", number(*duration))
            }
            Statement::Comment(text) => format!("; {text}\n"),
            Statement::Banner(text) => banner(text),
            Statement::WeldStart { target, note } => {
                self.annotated(format!("LWS {}", shift(target)), note.as_ref())
            }
            Statement::WeldContinue { target, note } => {
                self.annotated(format!("LWC {}, 1", shift(target)), note.as_ref())
            }
            Statement::WeldEnd { target, note } => {
                self.annotated(format!("LWE {}, 1, 1", shift(target)), note.as_ref())
            }
            Statement::WeldConditions { condition, speed } => format!(
                "W1SET {condition} = {}, 1, 1, 0, 0\nW2SET {condition} = 0.1, 1, 1\n",
                number(*speed)
            ),
            Statement::Call(name) => format!("CALL {name}\n"),
        }
    }

    pub fn render_all(&self, statements: &[Statement]) -> Vec<String> {
        statements.iter().map(|s| self.render(s)).collect()
    }

    fn annotated(&self, mut line: String, note: Option<&Note>) -> String {
        if let Some(note) = note {
            if self.verbose && !note.raw.is_empty() {
                line.push_str(" ; ");
                line.push_str(&note.raw);
            } else if let Some(comment) = note.comment.as_deref().filter(|c| !c.is_empty()) {
                line.push_str(" ; ");
                line.push_str(comment);
            }
        }
        line.push('\n');
        line
    }
}

fn shift(target: &Point) -> String {
    format!(
        "SHIFT(a BY {}, {}, {})",
        number(target.x),
        number(target.y),
        number(target.z)
    )
}

fn banner(text: &str) -> String {
    let width = text.chars().count();
    if width > TP_LINE_WIDTH {
        format!("; {text}\n")
    } else {
        format!("; {text}{}\n", "*".repeat(TP_LINE_WIDTH - width))
    }
}

/// Format a number in its shortest exact form; `-0` prints as `0`.
pub fn number(value: f64) -> String {
    if value == 0.0 {
        return "0".to_string();
    }
    value.to_string()
}
