//! Motion Command
//!
//! One parsed source instruction. Created once per source line by the parser
//! and consumed exactly once, in source order, by the conversion engine.

use std::fmt;

/// The kind of instruction a source line carries
#[derive(Debug, Clone, PartialEq)]
pub enum CommandKind {
    /// G0 rapid positioning
    Rapid,
    /// G1 linear move
    Linear,
    /// G92 set position (only the tool amount is honoured)
    SetPosition,
    /// A line holding nothing but a comment
    Comment,
    /// Any other command word, kept for diagnostics (e.g. "G2", "M104")
    Unsupported(String),
}

/// One instruction from the source stream
#[derive(Debug, Clone, PartialEq)]
pub struct MotionCommand {
    /// 1-based source line number, 0 for synthetic commands
    pub line: usize,
    pub kind: CommandKind,
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub z: Option<f64>,
    /// Feed rate (F word)
    pub feed: Option<f64>,
    /// Tool amount (E word), the extrusion volume
    pub amount: Option<f64>,
    /// Trailing comment, or the whole comment for comment-only lines
    pub comment: Option<String>,
    /// Source text without the line terminator
    pub raw: String,
}

impl MotionCommand {
    pub fn new(kind: CommandKind) -> Self {
        Self {
            line: 0,
            kind,
            x: None,
            y: None,
            z: None,
            feed: None,
            amount: None,
            comment: None,
            raw: String::new(),
        }
    }

    pub fn rapid() -> Self {
        Self::new(CommandKind::Rapid)
    }

    pub fn linear() -> Self {
        Self::new(CommandKind::Linear)
    }

    pub fn comment_only(text: impl Into<String>) -> Self {
        let mut command = Self::new(CommandKind::Comment);
        command.comment = Some(text.into());
        command
    }

    /// Sets all three coordinates
    pub fn at(self, x: f64, y: f64, z: f64) -> Self {
        self.x(x).y(y).z(z)
    }

    pub fn x(mut self, value: f64) -> Self {
        self.x = Some(value);
        self
    }

    pub fn y(mut self, value: f64) -> Self {
        self.y = Some(value);
        self
    }

    pub fn z(mut self, value: f64) -> Self {
        self.z = Some(value);
        self
    }

    pub fn feed(mut self, value: f64) -> Self {
        self.feed = Some(value);
        self
    }

    pub fn amount(mut self, value: f64) -> Self {
        self.amount = Some(value);
        self
    }

    pub fn with_comment(mut self, text: impl Into<String>) -> Self {
        self.comment = Some(text.into());
        self
    }

    pub fn with_raw(mut self, raw: impl Into<String>) -> Self {
        self.raw = raw.into();
        self
    }

    pub fn on_line(mut self, line: usize) -> Self {
        self.line = line;
        self
    }

    /// True when at least one of X, Y, Z is present
    pub fn has_coordinates(&self) -> bool {
        self.x.is_some() || self.y.is_some() || self.z.is_some()
    }
}

impl fmt::Display for MotionCommand {
    /// Writes the raw source when known, otherwise a normalised G-code line.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.raw.is_empty() {
            return write!(f, "{}", self.raw);
        }

        let mut words: Vec<String> = Vec::new();
        match &self.kind {
            CommandKind::Rapid => words.push("G0".to_string()),
            CommandKind::Linear => words.push("G1".to_string()),
            CommandKind::SetPosition => words.push("G92".to_string()),
            CommandKind::Unsupported(code) if !code.is_empty() => words.push(code.clone()),
            CommandKind::Unsupported(_) | CommandKind::Comment => {}
        }
        for (letter, value) in [
            ('X', self.x),
            ('Y', self.y),
            ('Z', self.z),
            ('E', self.amount),
            ('F', self.feed),
        ] {
            if let Some(value) = value {
                words.push(format!("{letter}{value}"));
            }
        }
        if let Some(comment) = &self.comment {
            words.push(format!(";{comment}"));
        }

        write!(f, "{}", words.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_sets_fields() {
        let command = MotionCommand::linear().at(1.0, 2.0, 3.0).feed(1200.0).amount(0.5);
        assert_eq!(command.kind, CommandKind::Linear);
        assert_eq!((command.x, command.y, command.z), (Some(1.0), Some(2.0), Some(3.0)));
        assert_eq!(command.feed, Some(1200.0));
        assert_eq!(command.amount, Some(0.5));
        assert!(command.has_coordinates());
    }

    #[test]
    fn test_pure_extrusion_has_no_coordinates() {
        let command = MotionCommand::linear().amount(-0.8).feed(2100.0);
        assert!(!command.has_coordinates());
    }

    #[test]
    fn test_display_prefers_raw() {
        let command = MotionCommand::rapid().x(1.0).with_raw("G0 X1.000 ; travel");
        assert_eq!(command.to_string(), "G0 X1.000 ; travel");
    }

    #[test]
    fn test_display_synthetic() {
        let command = MotionCommand::linear().x(5.0).amount(1.5);
        assert_eq!(command.to_string(), "G1 X5 E1.5");
    }
}
