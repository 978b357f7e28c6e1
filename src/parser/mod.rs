//! G-code Parser
//!
//! Turns source text into [`MotionCommand`] records, one per non-empty line.
//! Malformed numbers are reported as diagnostics and the affected word is
//! dropped; the command itself is still produced.

pub mod command;
pub mod lexer;

pub use command::{CommandKind, MotionCommand};
pub use lexer::{tokenize_line, Token, TokenKind};

use crate::diagnostics::Diagnostic;

/// Result of parsing a single line
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedLine {
    /// `None` for empty or whitespace-only lines
    pub command: Option<MotionCommand>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Result of parsing a whole program
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedProgram {
    pub commands: Vec<MotionCommand>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Parse a single line of G-code; `number` is the 1-based line number.
pub fn parse_line(number: usize, line: &str) -> ParsedLine {
    let raw = line.trim_end_matches(['\r', '\n']);
    let tokens = tokenize_line(raw);
    let mut diagnostics = Vec::new();

    if tokens.is_empty() {
        return ParsedLine {
            command: None,
            diagnostics,
        };
    }

    let comment = tokens
        .iter()
        .filter_map(Token::comment_text)
        .find(|text| !text.is_empty())
        .map(str::to_string);

    let has_words = tokens.iter().any(|t| t.kind != TokenKind::Comment);
    if !has_words {
        let command = MotionCommand::comment_only(comment.unwrap_or_default())
            .with_raw(raw)
            .on_line(number);
        return ParsedLine {
            command: Some(command),
            diagnostics,
        };
    }

    let kind = tokens
        .iter()
        .find(|t| t.kind == TokenKind::Command)
        .map(|t| command_kind(t.text))
        .unwrap_or_else(|| CommandKind::Unsupported(String::new()));

    // Words of unsupported commands are never read
    let parameters = if matches!(kind, CommandKind::Unsupported(_)) {
        &[][..]
    } else {
        &tokens[..]
    };

    let mut command = MotionCommand::new(kind).with_raw(raw).on_line(number);
    command.comment = comment;

    for token in parameters.iter().filter(|t| t.kind == TokenKind::Parameter) {
        let Some(letter) = token.letter() else {
            continue;
        };
        let slot = match letter {
            'X' => &mut command.x,
            'Y' => &mut command.y,
            'Z' => &mut command.z,
            'F' => &mut command.feed,
            'E' => &mut command.amount,
            _ => continue,
        };
        match token.value().parse::<f64>() {
            Ok(value) if value.is_finite() => *slot = Some(value),
            _ => diagnostics.push(Diagnostic::warning(
                number,
                format!("invalid value '{}' for {letter}, word ignored", token.value()),
            )),
        }
    }

    ParsedLine {
        command: Some(command),
        diagnostics,
    }
}

/// Parse a complete program, skipping empty lines
pub fn parse_program(text: &str) -> ParsedProgram {
    let mut program = ParsedProgram::default();

    for (index, line) in text.lines().enumerate() {
        let parsed = parse_line(index + 1, line);
        program.diagnostics.extend(parsed.diagnostics);
        if let Some(command) = parsed.command {
            program.commands.push(command);
        }
    }

    log::debug!(
        "parsed {} commands ({} diagnostics)",
        program.commands.len(),
        program.diagnostics.len()
    );

    program
}

/// Map a command word to its kind; G0/G00 and G1/G01 are the same command.
fn command_kind(word: &str) -> CommandKind {
    let letter = word
        .chars()
        .next()
        .map(|c| c.to_ascii_uppercase())
        .unwrap_or_default();
    let number = word[1..].parse::<f64>().ok();

    match (letter, number) {
        ('G', Some(n)) if n == 0.0 => CommandKind::Rapid,
        ('G', Some(n)) if n == 1.0 => CommandKind::Linear,
        ('G', Some(n)) if n == 92.0 => CommandKind::SetPosition,
        _ => CommandKind::Unsupported(word.to_ascii_uppercase()),
    }
}
