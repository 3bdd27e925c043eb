//! # G-code Builder
//!
//! Accumulates typed commands for a whole program. Each stroke follows the
//! same protocol:
//!
//! 1. lift the tool if it is down (dwell, tool-up, dwell)
//! 2. rapid to the first point unless already there
//! 3. dwell, tool-down, dwell
//! 4. draw every remaining point with a curvature-driven feed
//!
//! The tool is lifted lazily, so the last stroke is closed by
//! [`GcodeBuilder::finish`] instead of an inter-stroke block.

use crate::command::{round_coord, GcodeCommand};
use crate::feed::FeedSelector;
use penkit_core::{Point, Polyline};

/// Points closer than this are treated as the same position
pub const POSITION_TOLERANCE: f64 = 1e-4;

/// Builder configuration
#[derive(Debug, Clone, PartialEq)]
pub struct BuilderConfig {
    /// Tool-down command line
    pub cmd_down: String,
    /// Tool-up command line
    pub cmd_up: String,
    /// Pause around tool changes
    pub dwell_seconds: f64,
    /// Feed selection
    pub feed: FeedSelector,
    /// Draw with `G91` incremental moves
    pub relative_moves: bool,
    /// Retrace every stroke backwards before lifting
    pub double_pass: bool,
    /// Travel back to the origin at the end
    pub return_home: bool,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            cmd_down: "M3 S255".to_string(),
            cmd_up: "M5".to_string(),
            dwell_seconds: 0.15,
            feed: FeedSelector::default(),
            relative_moves: false,
            double_pass: false,
            return_home: false,
        }
    }
}

/// Values printed in the program header
#[derive(Debug, Clone, PartialEq)]
pub struct ProgramHeader {
    /// Source document name
    pub source: String,
    /// Number of strokes in the program
    pub strokes: usize,
    /// Millimeters per document unit after placement
    pub scale: f64,
}

/// Program builder
#[derive(Debug, Clone)]
pub struct GcodeBuilder {
    config: BuilderConfig,
    commands: Vec<GcodeCommand>,
    position: Option<Point>,
    tool_down: bool,
    strokes: usize,
}

impl GcodeBuilder {
    /// Create an empty builder; the tool is assumed up
    pub fn new(config: BuilderConfig) -> Self {
        Self {
            config,
            commands: Vec::new(),
            position: None,
            tool_down: false,
            strokes: 0,
        }
    }

    /// Builder configuration
    pub fn config(&self) -> &BuilderConfig {
        &self.config
    }

    /// Commands emitted so far
    pub fn commands(&self) -> &[GcodeCommand] {
        &self.commands
    }

    /// Strokes drawn so far
    pub fn stroke_count(&self) -> usize {
        self.strokes
    }

    /// Whether the tool is currently down
    pub fn tool_is_down(&self) -> bool {
        self.tool_down
    }

    /// Emit header comments, millimeter units and absolute positioning
    pub fn header(&mut self, header: &ProgramHeader) -> &mut Self {
        let generated = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");
        self.commands.extend([
            GcodeCommand::comment(format!("penkit {}", env!("CARGO_PKG_VERSION"))),
            GcodeCommand::comment(format!("generated {}", generated)),
            GcodeCommand::comment(format!("source: {}", header.source)),
            GcodeCommand::comment(format!(
                "strokes: {}, scale: {:.4}",
                header.strokes, header.scale
            )),
        ]);
        self.preamble()
    }

    /// Emit `G21` and `G90` without comments
    pub fn preamble(&mut self) -> &mut Self {
        self.commands.push(GcodeCommand::modal("G21"));
        self.commands.push(GcodeCommand::modal("G90"));
        self
    }

    /// Draw the reference frame around a `width` x `height` area at the origin
    ///
    /// The block is recognized and removed again by
    /// [`BorderExcision`](crate::postprocess::BorderExcision).
    pub fn reference_frame(&mut self, width: f64, height: f64) -> &mut Self {
        self.lift();
        let corner = Point::new(width, height);
        self.commands.push(GcodeCommand::rapid(Point::origin()));
        self.dwell();
        self.commands.push(GcodeCommand::rapid(corner));
        self.lower();

        let feed = Some((self.config.feed.base_feed * self.config.feed.tool_multiplier).round());
        let ring = [
            Point::new(0.0, height),
            Point::origin(),
            Point::new(width, 0.0),
            corner,
        ];
        for (k, p) in ring.iter().enumerate() {
            self.commands
                .push(GcodeCommand::linear(*p, if k == 0 { feed } else { None }));
        }
        self.position = Some(corner);

        self.dwell();
        self.commands.push(GcodeCommand::ToolUp {
            opcode: self.config.cmd_up.clone(),
        });
        self.tool_down = false;
        self.dwell();
        self
    }

    /// Draw one stroke
    ///
    /// Consecutive points closer than [`POSITION_TOLERANCE`] collapse into
    /// one. Strokes with fewer than two distinct points are skipped.
    pub fn stroke(&mut self, points: &[Point]) -> &mut Self {
        let points = dedup(points);
        if points.len() < 2 {
            tracing::debug!("Skipping stroke with {} distinct points", points.len());
            return self;
        }

        self.lift();
        let start = points[0];
        let moved = self
            .position
            .is_none_or(|p| p.distance_to(&start) > POSITION_TOLERANCE);
        if moved {
            self.commands.push(GcodeCommand::rapid(start));
            self.position = Some(start);
        }
        self.lower();

        if self.config.relative_moves {
            self.commands.push(GcodeCommand::modal("G91"));
        }
        let mut last_feed = None;
        self.draw(&points, &mut last_feed);
        if self.config.double_pass {
            let back: Vec<Point> = points.iter().rev().copied().collect();
            self.draw(&back, &mut last_feed);
        }
        if self.config.relative_moves {
            self.commands.push(GcodeCommand::modal("G90"));
        }

        self.strokes += 1;
        self
    }

    /// Draw every polyline in order
    pub fn strokes<'a>(&mut self, polylines: impl IntoIterator<Item = &'a Polyline>) -> &mut Self {
        for polyline in polylines {
            self.stroke(&polyline.points);
        }
        self
    }

    /// Close the program and hand out the commands
    pub fn finish(mut self) -> Vec<GcodeCommand> {
        if self.tool_down {
            self.dwell();
            self.commands.push(GcodeCommand::ToolUp {
                opcode: self.config.cmd_up.clone(),
            });
            self.tool_down = false;
        }
        if self.config.return_home {
            self.commands.push(GcodeCommand::rapid(Point::origin()));
        }
        tracing::debug!(
            "Built program: {} commands, {} strokes",
            self.commands.len(),
            self.strokes
        );
        self.commands
    }

    fn draw(&mut self, points: &[Point], last_feed: &mut Option<f64>) {
        let feeds = self.config.feed.feeds_for(points);
        for (p, feed) in points[1..].iter().zip(feeds) {
            let emitted = if *last_feed == Some(feed) {
                None
            } else {
                Some(feed)
            };
            *last_feed = Some(feed);

            let command = if self.config.relative_moves {
                let from = self.position.unwrap_or(points[0]);
                GcodeCommand::RelativeMove {
                    dx: round_coord(round_coord(p.x) - round_coord(from.x)),
                    dy: round_coord(round_coord(p.y) - round_coord(from.y)),
                    feed: emitted,
                    rapid: false,
                }
            } else {
                GcodeCommand::linear(*p, emitted)
            };
            self.commands.push(command);
            self.position = Some(*p);
        }
    }

    fn dwell(&mut self) {
        self.commands.push(GcodeCommand::Dwell {
            seconds: self.config.dwell_seconds,
        });
    }

    fn lower(&mut self) {
        self.dwell();
        self.commands.push(GcodeCommand::ToolDown {
            opcode: self.config.cmd_down.clone(),
        });
        self.dwell();
        self.tool_down = true;
    }

    fn lift(&mut self) {
        if self.tool_down {
            self.dwell();
            self.commands.push(GcodeCommand::ToolUp {
                opcode: self.config.cmd_up.clone(),
            });
            self.dwell();
            self.tool_down = false;
        }
    }
}

fn dedup(points: &[Point]) -> Vec<Point> {
    let mut out: Vec<Point> = Vec::with_capacity(points.len());
    for p in points {
        match out.last() {
            Some(last) if last.distance_to(p) <= POSITION_TOLERANCE => {}
            _ => out.push(*p),
        }
    }
    out
}
