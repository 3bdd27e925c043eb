//! G-code line parser
//!
//! Parses the subset of G-code the generator emits and the post-processing
//! passes accept. A line is one of:
//!
//! - blank
//! - a comment: starts with `;`, or starts with `(` and ends with `)`
//! - a command whose first token is `G0`..`G4` (optionally zero padded),
//!   `G20`, `G21`, `G28`, `G90`, `G91`, `G92` or `M<digits>`
//!
//! Anything after the opcode is read leniently: `<letter><number>` words are
//! collected, a `;` or `(` starts a trailing comment, other tokens are kept
//! aside without failing the line.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Parse failure for one line
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown opcode '{token}'")]
pub struct ParseError {
    /// The first token of the line
    pub token: String,
}

/// Opcodes of the accepted grammar
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Opcode {
    /// `G0`
    Rapid,
    /// `G1`
    Linear,
    /// `G2`
    ArcClockwise,
    /// `G3`
    ArcCounterClockwise,
    /// `G4`
    Dwell,
    /// `G20`
    Inches,
    /// `G21`
    Millimeters,
    /// `G28`
    Home,
    /// `G90`
    Absolute,
    /// `G91`
    Relative,
    /// `G92`
    SetPosition,
    /// `M<n>`, digits kept as written
    Machine(String),
}

impl Opcode {
    /// Parse the first token of a line
    pub fn parse(token: &str) -> Option<Self> {
        let upper = token.to_ascii_uppercase();
        let (letter, digits) = upper.split_at(upper.chars().next()?.len_utf8());
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }

        match letter {
            "M" => Some(Self::Machine(digits.to_string())),
            "G" => match digits {
                "0" | "00" => Some(Self::Rapid),
                "1" | "01" => Some(Self::Linear),
                "2" | "02" => Some(Self::ArcClockwise),
                "3" | "03" => Some(Self::ArcCounterClockwise),
                "4" | "04" => Some(Self::Dwell),
                "20" => Some(Self::Inches),
                "21" => Some(Self::Millimeters),
                "28" => Some(Self::Home),
                "90" => Some(Self::Absolute),
                "91" => Some(Self::Relative),
                "92" => Some(Self::SetPosition),
                _ => None,
            },
            _ => None,
        }
    }

    /// Motion opcodes carry coordinates
    pub fn is_motion(&self) -> bool {
        matches!(
            self,
            Self::Rapid | Self::Linear | Self::ArcClockwise | Self::ArcCounterClockwise
        )
    }

    pub fn is_arc(&self) -> bool {
        matches!(self, Self::ArcClockwise | Self::ArcCounterClockwise)
    }
}

/// A `<letter><number>` word
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Word {
    /// Upper-case address letter
    pub letter: char,
    /// Value
    pub value: f64,
}

/// A parsed line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ParsedLine {
    /// Empty or whitespace only
    Blank,
    /// Whole-line comment, delimiters stripped
    Comment(String),
    /// Command line
    Command {
        /// First token
        opcode: Opcode,
        /// Address words after the opcode
        words: Vec<Word>,
        /// Trailing comment
        comment: Option<String>,
        /// Tokens that are neither words nor comments
        extra: Vec<String>,
    },
}

impl ParsedLine {
    /// Opcode of a command line
    pub fn opcode(&self) -> Option<&Opcode> {
        match self {
            Self::Command { opcode, .. } => Some(opcode),
            _ => None,
        }
    }

    /// Value of the first word with `letter`
    pub fn word(&self, letter: char) -> Option<f64> {
        match self {
            Self::Command { words, .. } => words
                .iter()
                .find(|w| w.letter == letter.to_ascii_uppercase())
                .map(|w| w.value),
            _ => None,
        }
    }
}

/// Parse one line of G-code
pub fn parse_line(line: &str) -> Result<ParsedLine, ParseError> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Ok(ParsedLine::Blank);
    }
    if let Some(text) = trimmed.strip_prefix(';') {
        return Ok(ParsedLine::Comment(text.trim().to_string()));
    }
    if trimmed.starts_with('(') && trimmed.ends_with(')') && trimmed.len() >= 2 {
        let inner = &trimmed[1..trimmed.len() - 1];
        return Ok(ParsedLine::Comment(inner.trim().to_string()));
    }

    let (token, rest) = match trimmed.find(char::is_whitespace) {
        Some(at) => (&trimmed[..at], &trimmed[at..]),
        None => (trimmed, ""),
    };
    let opcode = Opcode::parse(token).ok_or_else(|| ParseError {
        token: token.to_string(),
    })?;

    let (body, comment) = split_comment(rest);
    let mut words = Vec::new();
    let mut extra = Vec::new();
    for part in body.split_whitespace() {
        match parse_word(part) {
            Some(word) => words.push(word),
            None => extra.push(part.to_string()),
        }
    }

    Ok(ParsedLine::Command {
        opcode,
        words,
        comment,
        extra,
    })
}

/// Parse every line, reporting the 1-based number of the first failure
pub fn parse_program<S: AsRef<str>>(lines: &[S]) -> Result<Vec<ParsedLine>, (usize, ParseError)> {
    lines
        .iter()
        .enumerate()
        .map(|(i, line)| parse_line(line.as_ref()).map_err(|e| (i + 1, e)))
        .collect()
}

/// Split off a trailing `;` or `(` comment
pub(crate) fn split_comment(text: &str) -> (&str, Option<String>) {
    match text.find([';', '(']) {
        Some(at) => {
            let comment = text[at + 1..].trim().trim_end_matches(')').trim();
            (&text[..at], Some(comment.to_string()))
        }
        None => (text, None),
    }
}

fn parse_word(part: &str) -> Option<Word> {
    let mut chars = part.chars();
    let letter = chars.next()?;
    if !letter.is_ascii_alphabetic() {
        return None;
    }
    let number = chars.as_str();
    let starts_ok = number
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_digit() || matches!(c, '-' | '+' | '.'));
    if !starts_ok {
        return None;
    }
    let value: f64 = number.parse().ok()?;
    value.is_finite().then_some(Word {
        letter: letter.to_ascii_uppercase(),
        value,
    })
}
