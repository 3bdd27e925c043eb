//! G-code command types and their text form

use penkit_core::Point;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Decimal places used for every emitted coordinate
pub const COORD_DECIMALS: usize = 3;

/// Format a coordinate with three decimals, never as `-0.000`
pub fn format_coord(value: f64) -> String {
    let text = format!("{:.*}", COORD_DECIMALS, value);
    if text.starts_with('-') && text[1..].chars().all(|c| c == '0' || c == '.') {
        text[1..].to_string()
    } else {
        text
    }
}

/// Round a value to the emitted precision
pub fn round_coord(value: f64) -> f64 {
    let scale = 10f64.powi(COORD_DECIMALS as i32);
    let rounded = (value * scale).round() / scale;
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

/// A single G-code command
///
/// Every variant knows how to render itself as one line of text. Coordinates
/// are in millimeters; arcs carry their center as an offset from the start
/// point the way `G2`/`G3` expect it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GcodeCommand {
    /// `G0` travel to an absolute position
    RapidMove { x: f64, y: f64 },
    /// `G1` draw to an absolute position
    LinearMove { x: f64, y: f64, feed: Option<f64> },
    /// `G2` (clockwise) or `G3` arc to an absolute position
    Arc {
        x: f64,
        y: f64,
        i: f64,
        j: f64,
        clockwise: bool,
        feed: Option<f64>,
    },
    /// Incremental move, valid between `G91` and `G90`
    RelativeMove {
        dx: f64,
        dy: f64,
        feed: Option<f64>,
        rapid: bool,
    },
    /// `G4` pause in seconds
    Dwell { seconds: f64 },
    /// Lift the tool
    ToolUp { opcode: String },
    /// Lower the tool
    ToolDown { opcode: String },
    /// `;` comment line
    Comment { text: String },
    /// Modal word emitted verbatim (`G21`, `G90`, `G91`, `G28`)
    Modal { code: String },
}

impl GcodeCommand {
    /// Rapid move to `p`
    pub fn rapid(p: Point) -> Self {
        Self::RapidMove { x: p.x, y: p.y }
    }

    /// Linear draw to `p`
    pub fn linear(p: Point, feed: Option<f64>) -> Self {
        Self::LinearMove {
            x: p.x,
            y: p.y,
            feed,
        }
    }

    /// Comment line
    pub fn comment(text: impl Into<String>) -> Self {
        Self::Comment { text: text.into() }
    }

    /// Modal word
    pub fn modal(code: impl Into<String>) -> Self {
        Self::Modal { code: code.into() }
    }

    /// Render the command as one line of G-code
    pub fn to_line(&self) -> String {
        match self {
            Self::RapidMove { x, y } => {
                format!("G0 X{} Y{}", format_coord(*x), format_coord(*y))
            }
            Self::LinearMove { x, y, feed } => format!(
                "G1 X{} Y{}{}",
                format_coord(*x),
                format_coord(*y),
                feed_word(*feed)
            ),
            Self::Arc {
                x,
                y,
                i,
                j,
                clockwise,
                feed,
            } => format!(
                "{} X{} Y{} I{} J{}{}",
                if *clockwise { "G2" } else { "G3" },
                format_coord(*x),
                format_coord(*y),
                format_coord(*i),
                format_coord(*j),
                feed_word(*feed)
            ),
            Self::RelativeMove {
                dx,
                dy,
                feed,
                rapid,
            } => format!(
                "{} X{} Y{}{}",
                if *rapid { "G0" } else { "G1" },
                format_coord(*dx),
                format_coord(*dy),
                if *rapid { String::new() } else { feed_word(*feed) }
            ),
            Self::Dwell { seconds } => format!("G4 P{:.3}", seconds.max(0.0)),
            Self::ToolUp { opcode } | Self::ToolDown { opcode } => opcode.trim().to_string(),
            Self::Comment { text } => format!("; {}", text.replace(['\n', '\r'], " ")),
            Self::Modal { code } => code.clone(),
        }
    }

    /// Absolute end point, for commands that have one
    pub fn end_point(&self) -> Option<Point> {
        match self {
            Self::RapidMove { x, y }
            | Self::LinearMove { x, y, .. }
            | Self::Arc { x, y, .. } => Some(Point::new(*x, *y)),
            _ => None,
        }
    }

    /// Feed carried by a drawing command
    pub fn feed(&self) -> Option<f64> {
        match self {
            Self::LinearMove { feed, .. }
            | Self::Arc { feed, .. }
            | Self::RelativeMove { feed, .. } => *feed,
            _ => None,
        }
    }

    /// True for commands that move the tool while it may be down
    pub fn is_draw(&self) -> bool {
        matches!(
            self,
            Self::LinearMove { .. } | Self::Arc { .. } | Self::RelativeMove { rapid: false, .. }
        )
    }

    /// True for any command that changes the position
    pub fn is_motion(&self) -> bool {
        matches!(
            self,
            Self::RapidMove { .. }
                | Self::LinearMove { .. }
                | Self::Arc { .. }
                | Self::RelativeMove { .. }
        )
    }

    /// Position after executing this command from `from`
    pub fn position_after(&self, from: Point) -> Point {
        match self {
            Self::RelativeMove { dx, dy, .. } => Point::new(from.x + dx, from.y + dy),
            other => other.end_point().unwrap_or(from),
        }
    }
}

impl fmt::Display for GcodeCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_line())
    }
}

fn feed_word(feed: Option<f64>) -> String {
    match feed {
        Some(feed) => format!(" F{:.0}", feed),
        None => String::new(),
    }
}

/// Render a command list as text lines
pub fn to_lines(commands: &[GcodeCommand]) -> Vec<String> {
    commands.iter().map(GcodeCommand::to_line).collect()
}

/// Two feeds may share a move when either is unset or they render equally
pub fn feeds_compatible(a: Option<f64>, b: Option<f64>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => format!("{:.0}", a) == format!("{:.0}", b),
        _ => true,
    }
}
