//! Program Assembler
//!
//! Wraps rendered statements into `.PROGRAM`/`.END` blocks. Controllers limit
//! program length, so long outputs are split into numbered sections that a
//! driver program calls in order.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use crate::emit::{Emitter, Statement};

static INVALID_NAME_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9_]").expect("valid name pattern"));

/// One `.PROGRAM` block
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub name: String,
    /// Rendered statements, each ending with `\n`
    pub body: Vec<String>,
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, ".PROGRAM {}", self.name)?;
        for statement in &self.body {
            for line in statement.lines() {
                writeln!(f, "\t{line}")?;
            }
        }
        writeln!(f, ".END")
    }
}

/// Split rendered statements into sections of at most `max_section_size`
/// lines. Each entry stays whole, so an entry longer than the limit gets a
/// section of its own. Returns a single section named `name` when the output
/// fits.
pub fn sections(statements: &[String], name: &str, max_section_size: usize) -> Vec<Section> {
    let max = max_section_size.max(1);
    let total: usize = statements.iter().map(|s| line_count(s)).sum();

    if total < max {
        return vec![Section {
            name: name.to_string(),
            body: statements.to_vec(),
        }];
    }

    let mut bodies: Vec<Vec<String>> = Vec::new();
    let mut body = Vec::new();
    let mut lines = 0;

    for statement in statements {
        let count = line_count(statement);
        if lines + count > max && !body.is_empty() {
            bodies.push(std::mem::take(&mut body));
            lines = 0;
        }
        if count > max {
            log::warn!("{count} line block exceeds the section size of {max}");
        }
        body.push(statement.clone());
        lines += count;
    }
    if !body.is_empty() {
        bodies.push(body);
    }

    bodies
        .into_iter()
        .enumerate()
        .map(|(index, body)| Section {
            name: format!("{name}_{index}"),
            body,
        })
        .collect()
}

fn line_count(statement: &str) -> usize {
    statement.lines().count().max(1)
}

/// Assemble the final program text
pub fn assemble(statements: &[String], name: &str, max_section_size: usize) -> String {
    let parts = sections(statements, name, max_section_size);

    if let [single] = parts.as_slice() {
        if single.name == name {
            return single.to_string();
        }
    }

    log::info!("program split into {} sections", parts.len());

    let emitter = Emitter::default();
    let driver = Section {
        name: name.to_string(),
        body: parts
            .iter()
            .map(|section| emitter.render(&Statement::Call(section.name.clone())))
            .collect(),
    };

    let mut out = String::new();
    for section in &parts {
        out.push_str(&section.to_string());
        out.push('\n');
    }
    out.push_str(&driver.to_string());
    out
}

/// Make `name` a valid AS program name
pub fn sanitize_program_name(name: &str) -> String {
    let mut clean = INVALID_NAME_CHARS.replace_all(name, "_").into_owned();

    if !clean.starts_with(|c: char| c.is_ascii_alphabetic()) {
        clean.insert(0, 'p');
    }
    clean
}
