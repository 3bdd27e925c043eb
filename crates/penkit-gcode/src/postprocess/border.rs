//! Reference-frame removal
//!
//! Generated programs may open with a traced rectangle around the drawing
//! area. The frame has a fixed shape:
//!
//! ```text
//! G0, G4, G0, G4, tool-down, G4, G1 (four or more), G4, tool-up, G4
//! ```
//!
//! and has to lie entirely within the first [`SCAN_LINES`] command lines.
//! Comments and blank lines do not count towards the window, so the header
//! comments of a generated program never push its frame out.

use super::{ToolChange, ToolOpcodes};
use crate::parser::{parse_line, Opcode, ParsedLine};
use std::ops::Range;

/// Command lines that may hold the frame
pub const SCAN_LINES: usize = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Rapid,
    Linear,
    Dwell,
    Down,
    Up,
    Other,
}

/// Finds and removes the reference frame
#[derive(Debug, Clone)]
pub struct BorderExcision {
    tools: ToolOpcodes,
}

impl BorderExcision {
    /// Excision for the given tool commands
    pub fn new(cmd_up: &str, cmd_down: &str) -> Self {
        Self {
            tools: ToolOpcodes::new(cmd_up, cmd_down),
        }
    }

    /// `None` for comments and blank lines
    fn kind(&self, line: &str) -> Option<Kind> {
        match self.tools.classify(line) {
            Some(ToolChange::Down) => return Some(Kind::Down),
            Some(ToolChange::Up) => return Some(Kind::Up),
            None => {}
        }
        match parse_line(line) {
            Ok(ParsedLine::Blank | ParsedLine::Comment(_)) => None,
            Ok(ParsedLine::Command { opcode, .. }) => Some(match opcode {
                Opcode::Rapid => Kind::Rapid,
                Opcode::Linear => Kind::Linear,
                Opcode::Dwell => Kind::Dwell,
                _ => Kind::Other,
            }),
            Err(_) => Some(Kind::Other),
        }
    }

    /// Line range of the frame, if the program has one
    pub fn find<S: AsRef<str>>(&self, lines: &[S]) -> Option<Range<usize>> {
        let commands: Vec<(usize, Kind)> = lines
            .iter()
            .enumerate()
            .filter_map(|(i, l)| self.kind(l.as_ref()).map(|k| (i, k)))
            .take(SCAN_LINES)
            .collect();
        let kinds: Vec<Kind> = commands.iter().map(|(_, k)| *k).collect();

        (0..kinds.len()).find_map(|start| {
            let len = match_frame(&kinds[start..])?;
            Some(commands[start].0..commands[start + len - 1].0 + 1)
        })
    }

    /// Drop the frame, returning the remaining lines and how many were removed
    pub fn excise<S: AsRef<str>>(&self, lines: &[S]) -> (Vec<String>, usize) {
        let frame = self.find(lines);
        let kept: Vec<String> = lines
            .iter()
            .enumerate()
            .filter(|(i, _)| !frame.as_ref().is_some_and(|r| r.contains(i)))
            .map(|(_, l)| l.as_ref().to_string())
            .collect();

        let removed = lines.len() - kept.len();
        if removed > 0 {
            tracing::info!("Removed reference frame ({} lines)", removed);
        } else {
            tracing::debug!("No reference frame found");
        }
        (kept, removed)
    }
}

/// Length of the frame at the start of `kinds`
fn match_frame(kinds: &[Kind]) -> Option<usize> {
    use Kind::*;

    const OPENING: [Kind; 6] = [Rapid, Dwell, Rapid, Dwell, Down, Dwell];
    const CLOSING: [Kind; 3] = [Dwell, Up, Dwell];

    if !kinds.starts_with(&OPENING) {
        return None;
    }
    let draws = kinds[OPENING.len()..]
        .iter()
        .take_while(|k| **k == Linear)
        .count();
    if draws < 4 {
        return None;
    }
    let closing_at = OPENING.len() + draws;
    kinds[closing_at..]
        .starts_with(&CLOSING)
        .then_some(closing_at + CLOSING.len())
}
