//! Program rescaling
//!
//! Measures the extent of an existing program and scales its coordinates
//! uniformly so that it fits a target area, then checks the result against
//! the target and the plotter envelope.

use crate::command::format_coord;
use crate::parser::{parse_line, split_comment, Opcode};
use penkit_core::{BoundingBox, Error, Point, Result, ValidationError};
use regex::{Captures, Regex};

/// Slack for coordinates rounded to three decimals
const FIT_TOLERANCE: f64 = 2e-3;

/// Extent below which a dimension counts as zero
const MIN_EXTENT: f64 = 1e-9;

/// Bounds of every point a program visits
///
/// Tracks `G90`/`G91` and modal coordinates over `G0`..`G3`. Arcs add the
/// full box of their circle (center `start + (I, J)`). Lines that do not
/// parse are skipped. `None` when no motion is found.
pub fn program_bounds<S: AsRef<str>>(lines: &[S]) -> Option<BoundingBox> {
    let mut bbox = BoundingBox::empty();
    let mut position = Point::origin();
    let mut absolute = true;
    let mut moved = false;

    for line in lines {
        let Ok(parsed) = parse_line(line.as_ref()) else {
            continue;
        };
        let Some(opcode) = parsed.opcode() else {
            continue;
        };
        match opcode {
            Opcode::Absolute => absolute = true,
            Opcode::Relative => absolute = false,
            op if op.is_motion() => {
                let (x, y) = (parsed.word('X'), parsed.word('Y'));
                let target = if absolute {
                    Point::new(x.unwrap_or(position.x), y.unwrap_or(position.y))
                } else {
                    position + Point::new(x.unwrap_or(0.0), y.unwrap_or(0.0))
                };

                if matches!(op, Opcode::ArcClockwise | Opcode::ArcCounterClockwise) {
                    let offset = Point::new(
                        parsed.word('I').unwrap_or(0.0),
                        parsed.word('J').unwrap_or(0.0),
                    );
                    let center = position + offset;
                    let r = offset.norm();
                    bbox.include(&Point::new(center.x - r, center.y - r));
                    bbox.include(&Point::new(center.x + r, center.y + r));
                }

                bbox.include(&target);
                position = target;
                moved = true;
            }
            _ => {}
        }
    }

    moved.then_some(bbox)
}

/// Result of a rescale
#[derive(Debug, Clone, PartialEq)]
pub struct RescaleOutcome {
    /// Rewritten program
    pub lines: Vec<String>,
    /// Uniform factor applied
    pub factor: f64,
    /// Extent before scaling
    pub before: BoundingBox,
    /// Extent after scaling
    pub after: BoundingBox,
}

/// Fits programs into a target area
#[derive(Debug, Clone)]
pub struct Rescaler {
    target: (f64, f64),
    plotter: (f64, f64),
    motion: Regex,
    word: Regex,
}

impl Rescaler {
    /// Rescaler for a target area inside a plotter envelope, both in mm
    pub fn new(target: (f64, f64), plotter: (f64, f64)) -> Result<Self> {
        for (name, (w, h)) in [("target", target), ("plotter", plotter)] {
            if !(w > 0.0 && h > 0.0) {
                return Err(ValidationError::InvalidArea {
                    name: name.to_string(),
                    width: w,
                    height: h,
                }
                .into());
            }
        }
        if target.0 > plotter.0 || target.1 > plotter.1 {
            return Err(ValidationError::TargetExceedsPlotter {
                target_width: target.0,
                target_height: target.1,
                max_width: plotter.0,
                max_height: plotter.1,
            }
            .into());
        }

        let motion = Regex::new(r"^\s*(?i:G0?[0-3])(?:\s|$)")
            .map_err(|e| Error::other(format!("motion pattern: {}", e)))?;
        let word = Regex::new(r"(?i)\b([XYIJ])\s*([-+]?(?:[0-9]+\.?[0-9]*|\.[0-9]+))")
            .map_err(|e| Error::other(format!("coordinate pattern: {}", e)))?;

        Ok(Self {
            target,
            plotter,
            motion,
            word,
        })
    }

    /// Largest uniform factor that fits `bbox` into the target
    pub fn factor_for(&self, bbox: &BoundingBox) -> Result<f64> {
        let (w, h) = (bbox.width(), bbox.height());
        if w <= MIN_EXTENT && h <= MIN_EXTENT {
            return Err(ValidationError::EmptyProgram.into());
        }
        let fx = if w > MIN_EXTENT { self.target.0 / w } else { f64::INFINITY };
        let fy = if h > MIN_EXTENT { self.target.1 / h } else { f64::INFINITY };
        Ok(fx.min(fy))
    }

    /// Multiply `X`, `Y`, `I` and `J` on motion lines by `factor`
    ///
    /// Comments and every other word are kept as written. A factor of 1
    /// returns the program unchanged.
    pub fn apply<S: AsRef<str>>(&self, lines: &[S], factor: f64) -> Vec<String> {
        if factor == 1.0 {
            return lines.iter().map(|l| l.as_ref().to_string()).collect();
        }

        lines
            .iter()
            .map(|line| {
                let line = line.as_ref();
                let code = split_comment(line).0;
                if !self.motion.is_match(code) {
                    return line.to_string();
                }
                let scaled = self.word.replace_all(code, |caps: &Captures| {
                    let value: f64 = caps[2].parse().unwrap_or(0.0);
                    format!("{}{}", &caps[1], format_coord(value * factor))
                });
                format!("{}{}", scaled, &line[code.len()..])
            })
            .collect()
    }

    /// Check that an extent fits the target and lies inside the plotter
    pub fn check_fits(&self, bbox: &BoundingBox) -> Result<()> {
        let (w, h) = (bbox.width(), bbox.height());
        let out_of = |limit: &str, (lw, lh): (f64, f64)| ValidationError::OutOfBounds {
            width: w,
            height: h,
            limit: limit.to_string(),
            limit_width: lw,
            limit_height: lh,
        };

        if w > self.target.0 + FIT_TOLERANCE || h > self.target.1 + FIT_TOLERANCE {
            return Err(out_of("target", self.target).into());
        }
        if bbox.min_x < -FIT_TOLERANCE
            || bbox.min_y < -FIT_TOLERANCE
            || bbox.max_x > self.plotter.0 + FIT_TOLERANCE
            || bbox.max_y > self.plotter.1 + FIT_TOLERANCE
        {
            return Err(out_of("plotter", self.plotter).into());
        }
        Ok(())
    }

    /// Measure, scale and check a program
    pub fn rescale<S: AsRef<str>>(&self, lines: &[S]) -> Result<RescaleOutcome> {
        let before = program_bounds(lines).ok_or(ValidationError::EmptyProgram)?;
        let factor = self.factor_for(&before)?;
        let lines = self.apply(lines, factor);
        let after = program_bounds(&lines).ok_or(ValidationError::EmptyProgram)?;
        self.check_fits(&after)?;

        tracing::info!(
            "Rescaled {:.3}x{:.3} mm to {:.3}x{:.3} mm (factor {:.4})",
            before.width(),
            before.height(),
            after.width(),
            after.height(),
            factor
        );
        Ok(RescaleOutcome {
            lines,
            factor,
            before,
            after,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rescaler() -> Rescaler {
        Rescaler::new((50.0, 100.0), (300.0, 420.0)).unwrap()
    }

    #[test]
    fn test_bounds_absolute_and_relative() {
        let bbox = program_bounds(&["G21", "G0 X10 Y5", "G91", "G1 X5 Y-2", "G90", "G1 Y20"]).unwrap();
        assert_eq!(bbox, BoundingBox::new(10.0, 3.0, 15.0, 20.0));
    }

    #[test]
    fn test_bounds_include_arc_circle() {
        let bbox = program_bounds(&["G0 X10 Y0", "G3 X-10 Y0 I-10 J0"]).unwrap();
        assert_eq!(bbox, BoundingBox::new(-10.0, -10.0, 10.0, 10.0));
    }

    #[test]
    fn test_bounds_without_motion() {
        assert!(program_bounds(&["G21", "; nothing", "M5"]).is_none());
    }

    #[test]
    fn test_factor_limited_by_tighter_axis() {
        let r = rescaler();
        assert_eq!(r.factor_for(&BoundingBox::new(0.0, 0.0, 100.0, 100.0)).unwrap(), 0.5);
        assert_eq!(r.factor_for(&BoundingBox::new(0.0, 0.0, 25.0, 0.0)).unwrap(), 2.0);
        assert!(matches!(
            r.factor_for(&BoundingBox::new(3.0, 3.0, 3.0, 3.0)),
            Err(Error::Validation(ValidationError::EmptyProgram))
        ));
    }

    #[test]
    fn test_apply_rewrites_motion_words_only() {
        let out = rescaler().apply(
            &["G1 X10 Y-4 F1500 ; X99", "G2 X1 Y1 I2 J0", "G4 P0.150", "M3 S255", "(X10)"],
            0.5,
        );
        assert_eq!(out[0], "G1 X5.000 Y-2.000 F1500 ; X99");
        assert_eq!(out[1], "G2 X0.500 Y0.500 I1.000 J0.000");
        assert_eq!(out[2], "G4 P0.150");
        assert_eq!(out[3], "M3 S255");
        assert_eq!(out[4], "(X10)");
    }

    #[test]
    fn test_unit_factor_is_identity() {
        let lines = ["G1 X10.12345 Y3", "G0 X1"];
        assert_eq!(rescaler().apply(&lines, 1.0), lines.to_vec());
    }

    #[test]
    fn test_rescale_fits_target() {
        let out = rescaler()
            .rescale(&["G0 X0 Y0", "G1 X100 Y0", "G1 X100 Y200", "G1 X0 Y200"])
            .unwrap();
        assert_eq!(out.factor, 0.5);
        assert_eq!(out.lines[2], "G1 X50.000 Y100.000");
        assert_eq!(out.after, BoundingBox::new(0.0, 0.0, 50.0, 100.0));
    }

    #[test]
    fn test_negative_coordinates_leave_plotter() {
        let err = rescaler().rescale(&["G0 X-10 Y0", "G1 X10 Y10"]).unwrap_err();
        assert!(matches!(
            err,
            Error::Validation(ValidationError::OutOfBounds { ref limit, .. }) if limit == "plotter"
        ));
    }

    #[test]
    fn test_invalid_areas() {
        assert!(matches!(
            Rescaler::new((0.0, 10.0), (300.0, 420.0)),
            Err(Error::Validation(ValidationError::InvalidArea { .. }))
        ));
        assert!(matches!(
            Rescaler::new((400.0, 10.0), (300.0, 420.0)),
            Err(Error::Validation(ValidationError::TargetExceedsPlotter { .. }))
        ));
    }
}
