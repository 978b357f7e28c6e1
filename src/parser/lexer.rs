//! G-code Lexer
//!
//! Splits one source line into command words, parameter words and comments.
//! Words are a letter followed by a numeric literal, so packed input such as
//! `G1X10Y5` tokenizes the same as `G1 X10 Y5`.

/// Token types in G-code
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TokenKind {
    /// Command word like "G1", "M104"
    Command,
    /// Parameter word like "X10", "E0.4"
    Parameter,
    /// Comment (semicolon or parenthetical)
    Comment,
}

/// A token with its text content
#[derive(Debug, Clone, PartialEq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub text: &'a str,
}

impl Token<'_> {
    /// Uppercased word letter, `None` for comments
    pub fn letter(&self) -> Option<char> {
        match self.kind {
            TokenKind::Comment => None,
            _ => self.text.chars().next().map(|c| c.to_ascii_uppercase()),
        }
    }

    /// Numeric part of a word (everything after the letter)
    pub fn value(&self) -> &str {
        match self.kind {
            TokenKind::Comment => "",
            _ => &self.text[1..],
        }
    }

    /// Comment text without its delimiters and surrounding whitespace
    pub fn comment_text(&self) -> Option<&str> {
        if self.kind != TokenKind::Comment {
            return None;
        }
        let inner = if let Some(stripped) = self.text.strip_prefix(';') {
            stripped
        } else {
            let stripped = self.text.strip_prefix('(').unwrap_or(self.text);
            stripped.strip_suffix(')').unwrap_or(stripped)
        };
        Some(inner.trim())
    }
}

/// Tokenize a line of G-code
pub fn tokenize_line(line: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut chars = line.char_indices().peekable();

    while let Some((start_idx, ch)) = chars.next() {
        match ch {
            ' ' | '\t' | '\r' | '\n' => continue,

            // Rest of the line is a comment
            ';' => {
                tokens.push(Token {
                    kind: TokenKind::Comment,
                    text: &line[start_idx..],
                });
                break;
            }

            '(' => {
                let mut end_idx = line.len();
                for (idx, ch) in chars.by_ref() {
                    if ch == ')' {
                        end_idx = idx + 1;
                        break;
                    }
                }
                tokens.push(Token {
                    kind: TokenKind::Comment,
                    text: &line[start_idx..end_idx],
                });
            }

            c if c.is_ascii_alphabetic() => {
                let mut end_idx = start_idx + 1;
                while let Some(&(idx, next_ch)) = chars.peek() {
                    if next_ch.is_ascii_digit() || matches!(next_ch, '.' | '-' | '+') {
                        end_idx = idx + 1;
                        chars.next();
                    } else {
                        break;
                    }
                }

                let text = &line[start_idx..end_idx];
                let kind = if is_command(text) {
                    TokenKind::Command
                } else {
                    TokenKind::Parameter
                };
                tokens.push(Token { kind, text });
            }

            // Checksums, line-number separators and stray characters
            _ => continue,
        }
    }

    tokens
}

/// G, M and T words are commands, everything else is a parameter.
fn is_command(text: &str) -> bool {
    text.chars()
        .next()
        .is_some_and(|c| matches!(c.to_ascii_uppercase(), 'G' | 'M' | 'T'))
}
