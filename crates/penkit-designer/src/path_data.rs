//! SVG path data parser
//!
//! Accepts the SVG 1.1 grammar: `M L H V C S Q T A Z` in absolute and
//! relative form, implicit command repetition, and compact number and flag
//! syntax such as `1.5.5` or `a1 1 0 00 10 10`.

use penkit_core::{Point, Segment};
use thiserror::Error;

/// Error raised when path data cannot be parsed
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message} at offset {offset}")]
pub struct PathDataError {
    /// Byte offset into the path data
    pub offset: usize,
    /// What was expected or found
    pub message: String,
}

impl PathDataError {
    fn new(offset: usize, message: impl Into<String>) -> Self {
        Self {
            offset,
            message: message.into(),
        }
    }
}

/// Parse a `d` attribute into segments
///
/// Subpaths are concatenated in order; a moveto shows up as a discontinuity
/// between consecutive segments. Zero-length line and arc segments are
/// omitted.
pub fn parse_path_data(data: &str) -> Result<Vec<Segment>, PathDataError> {
    PathDataParser::new(data).run()
}

struct Cursor<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(data: &'a str) -> Self {
        Self {
            bytes: data.as_bytes(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn skip_separators(&mut self) {
        while let Some(b) = self.peek() {
            if b.is_ascii_whitespace() || b == b',' {
                self.pos += 1;
            } else {
                break;
            }
        }
    }

    fn at_end(&mut self) -> bool {
        self.skip_separators();
        self.pos >= self.bytes.len()
    }

    fn command(&mut self) -> Option<u8> {
        self.skip_separators();
        match self.peek() {
            Some(b) if b"MmLlHhVvCcSsQqTtAaZz".contains(&b) => {
                self.pos += 1;
                Some(b)
            }
            _ => None,
        }
    }

    fn has_number(&mut self) -> bool {
        self.skip_separators();
        matches!(self.peek(), Some(b) if b.is_ascii_digit() || b == b'.' || b == b'-' || b == b'+')
    }

    fn number(&mut self) -> Result<f64, PathDataError> {
        self.skip_separators();
        let start = self.pos;

        if matches!(self.peek(), Some(b'+') | Some(b'-')) {
            self.pos += 1;
        }
        let mut digits = self.eat_digits();
        if self.peek() == Some(b'.') {
            self.pos += 1;
            digits += self.eat_digits();
        }
        if digits == 0 {
            self.pos = start;
            return Err(PathDataError::new(start, "expected a number"));
        }

        if matches!(self.peek(), Some(b'e') | Some(b'E')) {
            let mark = self.pos;
            self.pos += 1;
            if matches!(self.peek(), Some(b'+') | Some(b'-')) {
                self.pos += 1;
            }
            if self.eat_digits() == 0 {
                self.pos = mark;
            }
        }

        let text = std::str::from_utf8(&self.bytes[start..self.pos])
            .map_err(|_| PathDataError::new(start, "invalid number"))?;
        let value: f64 = text
            .parse()
            .map_err(|_| PathDataError::new(start, format!("invalid number '{}'", text)))?;
        if !value.is_finite() {
            return Err(PathDataError::new(start, format!("number out of range '{}'", text)));
        }
        Ok(value)
    }

    fn flag(&mut self) -> Result<bool, PathDataError> {
        self.skip_separators();
        match self.peek() {
            Some(b'0') => {
                self.pos += 1;
                Ok(false)
            }
            Some(b'1') => {
                self.pos += 1;
                Ok(true)
            }
            _ => Err(PathDataError::new(self.pos, "expected an arc flag (0 or 1)")),
        }
    }

    fn eat_digits(&mut self) -> usize {
        let start = self.pos;
        while matches!(self.peek(), Some(b) if b.is_ascii_digit()) {
            self.pos += 1;
        }
        self.pos - start
    }
}

struct PathDataParser<'a> {
    cursor: Cursor<'a>,
    segments: Vec<Segment>,
    current: Point,
    subpath_start: Point,
    last_cubic_ctrl: Option<Point>,
    last_quad_ctrl: Option<Point>,
}

impl<'a> PathDataParser<'a> {
    fn new(data: &'a str) -> Self {
        Self {
            cursor: Cursor::new(data),
            segments: Vec::new(),
            current: Point::origin(),
            subpath_start: Point::origin(),
            last_cubic_ctrl: None,
            last_quad_ctrl: None,
        }
    }

    fn run(mut self) -> Result<Vec<Segment>, PathDataError> {
        let mut started = false;
        while !self.cursor.at_end() {
            let offset = self.cursor.pos;
            let cmd = self.cursor.command().ok_or_else(|| {
                let found = self.cursor.peek().map(char::from).unwrap_or(' ');
                PathDataError::new(offset, format!("unexpected '{}'", found))
            })?;
            if !started && !matches!(cmd, b'M' | b'm') {
                return Err(PathDataError::new(offset, "path data must begin with a moveto"));
            }
            started = true;
            self.execute(cmd)?;
        }
        Ok(self.segments)
    }

    fn execute(&mut self, cmd: u8) -> Result<(), PathDataError> {
        let relative = cmd.is_ascii_lowercase();
        match cmd.to_ascii_uppercase() {
            b'M' => {
                let p = self.read_point(relative)?;
                self.move_to(p);
                // Further coordinate pairs are implicit linetos
                while self.cursor.has_number() {
                    let p = self.read_point(relative)?;
                    self.line_to(p);
                }
            }
            b'L' => loop {
                let p = self.read_point(relative)?;
                self.line_to(p);
                if !self.cursor.has_number() {
                    break;
                }
            },
            b'H' => loop {
                let mut x = self.cursor.number()?;
                if relative {
                    x += self.current.x;
                }
                self.line_to(Point::new(x, self.current.y));
                if !self.cursor.has_number() {
                    break;
                }
            },
            b'V' => loop {
                let mut y = self.cursor.number()?;
                if relative {
                    y += self.current.y;
                }
                self.line_to(Point::new(self.current.x, y));
                if !self.cursor.has_number() {
                    break;
                }
            },
            b'C' => loop {
                let c1 = self.read_point(relative)?;
                let c2 = self.read_point(relative)?;
                let end = self.read_point(relative)?;
                self.cubic_to(c1, c2, end);
                if !self.cursor.has_number() {
                    break;
                }
            },
            b'S' => loop {
                let c1 = self.reflect(self.last_cubic_ctrl);
                let c2 = self.read_point(relative)?;
                let end = self.read_point(relative)?;
                self.cubic_to(c1, c2, end);
                if !self.cursor.has_number() {
                    break;
                }
            },
            b'Q' => loop {
                let c = self.read_point(relative)?;
                let end = self.read_point(relative)?;
                self.quad_to(c, end);
                if !self.cursor.has_number() {
                    break;
                }
            },
            b'T' => loop {
                let c = self.reflect(self.last_quad_ctrl);
                let end = self.read_point(relative)?;
                self.quad_to(c, end);
                if !self.cursor.has_number() {
                    break;
                }
            },
            b'A' => loop {
                let rx = self.cursor.number()?.abs();
                let ry = self.cursor.number()?.abs();
                let rotation = self.cursor.number()?.to_radians();
                let large_arc = self.cursor.flag()?;
                let sweep = self.cursor.flag()?;
                let end = self.read_point(relative)?;
                self.arc_to(rx, ry, rotation, large_arc, sweep, end);
                if !self.cursor.has_number() {
                    break;
                }
            },
            b'Z' => self.close(),
            other => {
                return Err(PathDataError::new(
                    self.cursor.pos,
                    format!("unknown command '{}'", char::from(other)),
                ))
            }
        }
        Ok(())
    }

    fn read_point(&mut self, relative: bool) -> Result<Point, PathDataError> {
        let x = self.cursor.number()?;
        let y = self.cursor.number()?;
        Ok(if relative {
            Point::new(self.current.x + x, self.current.y + y)
        } else {
            Point::new(x, y)
        })
    }

    fn reflect(&self, ctrl: Option<Point>) -> Point {
        match ctrl {
            Some(c) => self.current * 2.0 - c,
            None => self.current,
        }
    }

    fn move_to(&mut self, p: Point) {
        self.current = p;
        self.subpath_start = p;
        self.clear_controls();
    }

    fn line_to(&mut self, p: Point) {
        if p != self.current {
            self.segments.push(Segment::line(self.current, p));
        }
        self.current = p;
        self.clear_controls();
    }

    fn cubic_to(&mut self, c1: Point, c2: Point, end: Point) {
        let segment = Segment::CubicBezier {
            start: self.current,
            c1,
            c2,
            end,
        };
        if !segment.is_degenerate() {
            self.segments.push(segment);
        }
        self.current = end;
        self.last_cubic_ctrl = Some(c2);
        self.last_quad_ctrl = None;
    }

    fn quad_to(&mut self, c: Point, end: Point) {
        let segment = Segment::QuadraticBezier {
            start: self.current,
            c,
            end,
        };
        if !segment.is_degenerate() {
            self.segments.push(segment);
        }
        self.current = end;
        self.last_quad_ctrl = Some(c);
        self.last_cubic_ctrl = None;
    }

    fn arc_to(&mut self, rx: f64, ry: f64, rotation: f64, large_arc: bool, sweep: bool, end: Point) {
        if end == self.current {
            self.clear_controls();
            return;
        }
        if rx == 0.0 || ry == 0.0 {
            self.line_to(end);
            return;
        }
        self.segments.push(Segment::EllipticalArc {
            start: self.current,
            end,
            radii: (rx, ry),
            rotation,
            large_arc,
            sweep,
        });
        self.current = end;
        self.clear_controls();
    }

    fn close(&mut self) {
        let start = self.subpath_start;
        self.line_to(start);
    }

    fn clear_controls(&mut self) {
        self.last_cubic_ctrl = None;
        self.last_quad_ctrl = None;
    }
}
