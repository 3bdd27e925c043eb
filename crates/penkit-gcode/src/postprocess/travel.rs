//! Travel-move reduction
//!
//! While the tool is up, a `G1` only travels. Rewriting it as `G0` lets the
//! machine move at rapid speed. The tool state starts unknown and only an
//! explicit tool-up line enables rewriting.

use super::{ToolChange, ToolOpcodes};
use crate::parser::{split_comment, Opcode};
use serde::{Deserialize, Serialize};

/// What a reduction pass did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TravelStats {
    /// `G1` lines seen
    pub linear_moves: usize,
    /// `G1` lines rewritten as `G0`
    pub rewritten: usize,
}

impl TravelStats {
    /// Share of linear moves that were rewritten
    pub fn rate(&self) -> f64 {
        if self.linear_moves == 0 {
            0.0
        } else {
            self.rewritten as f64 / self.linear_moves as f64
        }
    }
}

/// Rewrites tool-up `G1` moves as `G0`
#[derive(Debug, Clone)]
pub struct TravelReducer {
    tools: ToolOpcodes,
}

impl TravelReducer {
    /// Reducer for the given tool commands
    pub fn new(cmd_up: &str, cmd_down: &str) -> Self {
        Self {
            tools: ToolOpcodes::new(cmd_up, cmd_down),
        }
    }

    /// Rewrite a program
    pub fn reduce<S: AsRef<str>>(&self, lines: &[S]) -> (Vec<String>, TravelStats) {
        let mut stats = TravelStats::default();
        let mut tool_up = false;

        let out = lines
            .iter()
            .map(|line| {
                let line = line.as_ref();
                match self.tools.classify(line) {
                    Some(ToolChange::Up) => tool_up = true,
                    Some(ToolChange::Down) => tool_up = false,
                    None => {}
                }

                let Some((indent, rest)) = linear_move(line) else {
                    return line.to_string();
                };
                stats.linear_moves += 1;
                if tool_up {
                    stats.rewritten += 1;
                    format!("{}G0{}", indent, rest)
                } else {
                    line.to_string()
                }
            })
            .collect();

        tracing::debug!(
            "Travel reduction: {} of {} linear moves rewritten",
            stats.rewritten,
            stats.linear_moves
        );
        (out, stats)
    }
}

/// Split a `G1` line into its indentation and everything after the opcode
fn linear_move(line: &str) -> Option<(&str, &str)> {
    let code = split_comment(line).0;
    let body = code.trim_start();
    let indent = &line[..code.len() - body.len()];
    let token_len = body.find(char::is_whitespace).unwrap_or(body.len());
    (Opcode::parse(&body[..token_len]) == Some(Opcode::Linear))
        .then(|| (indent, &line[indent.len() + token_len..]))
}
