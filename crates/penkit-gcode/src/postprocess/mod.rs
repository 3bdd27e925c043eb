//! Text-level passes over existing programs
//!
//! These work on lines rather than typed commands so that they apply to
//! programs penkit did not generate, as long as the lines validate.

mod border;
mod rescale;
mod travel;

pub use border::{BorderExcision, SCAN_LINES};
pub use rescale::{program_bounds, RescaleOutcome, Rescaler};
pub use travel::{TravelReducer, TravelStats};

use crate::parser::split_comment;

/// Tool state implied by a line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ToolChange {
    Up,
    Down,
}

/// Recognizes the configured tool-up and tool-down lines
///
/// When both commands share their first word (servo pens driven by
/// `M3 S<angle>`) the whole command is compared, otherwise the first word
/// alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ToolOpcodes {
    up: Vec<String>,
    down: Vec<String>,
}

impl ToolOpcodes {
    pub(crate) fn new(cmd_up: &str, cmd_down: &str) -> Self {
        Self {
            up: words(cmd_up),
            down: words(cmd_down),
        }
    }

    pub(crate) fn classify(&self, line: &str) -> Option<ToolChange> {
        let tokens = words(split_comment(line).0);
        let first = tokens.first()?;

        if self.up.first() != self.down.first() {
            if self.up.first() == Some(first) {
                return Some(ToolChange::Up);
            }
            if self.down.first() == Some(first) {
                return Some(ToolChange::Down);
            }
            return None;
        }

        match (tokens == self.up, tokens == self.down) {
            (true, false) => Some(ToolChange::Up),
            (false, true) => Some(ToolChange::Down),
            _ => None,
        }
    }
}

fn words(text: &str) -> Vec<String> {
    text.split_whitespace().map(normalize_word).collect()
}

/// Upper-case a word and drop leading zeros from an integer value: `m03` is `M3`
fn normalize_word(word: &str) -> String {
    let upper = word.to_ascii_uppercase();
    let mut chars = upper.chars();
    match chars.next() {
        Some(letter) if letter.is_ascii_alphabetic() => {
            let digits = chars.as_str();
            if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
                let trimmed = digits.trim_start_matches('0');
                format!("{}{}", letter, if trimmed.is_empty() { "0" } else { trimmed })
            } else {
                upper
            }
        }
        _ => upper,
    }
}
