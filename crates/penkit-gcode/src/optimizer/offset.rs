//! Program translation

use super::{OptimizationMetrics, Optimized, Optimizer};
use crate::command::GcodeCommand;

/// Shifts every absolute move by a fixed offset
///
/// Arc center offsets are relative to the arc start, which moves with the
/// program, so `I`/`J` stay as they are: the absolute center is shifted by
/// exactly the offset. Adding the offset to `I`/`J` as well would move the
/// center twice. Incremental moves are untouched.
///
/// In relative mode the offset is read as a fractional scale instead:
/// coordinates become `x * (1 + dx)` and `y * (1 + dy)`, and arc offsets
/// scale the same way.
#[derive(Debug, Clone)]
pub struct OffsetShift {
    dx: f64,
    dy: f64,
    relative: bool,
}

impl OffsetShift {
    /// Create the stage
    pub fn new(dx: f64, dy: f64, relative: bool) -> Self {
        Self { dx, dy, relative }
    }

    fn map(&self, x: f64, y: f64) -> (f64, f64) {
        if self.relative {
            (x * (1.0 + self.dx), y * (1.0 + self.dy))
        } else {
            (x + self.dx, y + self.dy)
        }
    }
}

impl Optimizer for OffsetShift {
    fn name(&self) -> &str {
        "offset_shift"
    }

    fn description(&self) -> &str {
        "Translates absolute moves by a fixed offset"
    }

    fn process(&self, commands: Vec<GcodeCommand>) -> Optimized {
        let mut shifted = 0;
        let commands = commands
            .into_iter()
            .map(|command| match command {
                GcodeCommand::RapidMove { x, y } => {
                    shifted += 1;
                    let (x, y) = self.map(x, y);
                    GcodeCommand::RapidMove { x, y }
                }
                GcodeCommand::LinearMove { x, y, feed } => {
                    shifted += 1;
                    let (x, y) = self.map(x, y);
                    GcodeCommand::LinearMove { x, y, feed }
                }
                GcodeCommand::Arc {
                    x,
                    y,
                    i,
                    j,
                    clockwise,
                    feed,
                } => {
                    shifted += 1;
                    let (x, y) = self.map(x, y);
                    let (i, j) = if self.relative {
                        (i * (1.0 + self.dx), j * (1.0 + self.dy))
                    } else {
                        (i, j)
                    };
                    GcodeCommand::Arc {
                        x,
                        y,
                        i,
                        j,
                        clockwise,
                        feed,
                    }
                }
                other => other,
            })
            .collect();

        Optimized {
            commands,
            metrics: OptimizationMetrics {
                commands_shifted: shifted,
                ..Default::default()
            },
        }
    }

    fn is_enabled(&self) -> bool {
        self.dx != 0.0 || self.dy != 0.0
    }
}
