//! # Affine Fitting
//!
//! Places sampled strokes on the plotter bed.
//!
//! User units become millimeters through the document scale, then the
//! drawing is optionally mirrored about its center line, rotated a quarter
//! turn clockwise, fitted to the target area, clamped to the plotter
//! envelope, centered and offset. Overflow of the target area is reported,
//! never fatal.

use crate::import::SvgDocument;
use penkit_core::geometry::polylines_bounding_box;
use penkit_core::{BoundingBox, Point, Polyline, MM_PER_PX};

const FIT_EPSILON: f64 = 1e-9;

/// Millimeters per user unit for one document
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DocumentScale {
    /// CSS pixels per user unit
    pub px_per_unit: f64,
    /// Millimeters per user unit
    pub mm_per_unit: f64,
    /// User-space point mapped to the origin (the viewBox corner)
    pub origin: Point,
}

impl DocumentScale {
    /// One user unit per millimeter
    pub fn identity() -> Self {
        Self {
            px_per_unit: 1.0 / MM_PER_PX,
            mm_per_unit: 1.0,
            origin: Point::origin(),
        }
    }

    /// Derive the scale from `viewBox` and `width`
    ///
    /// A physical width gives `width_mm / (viewBox_width * 25.4 / 96)` pixels
    /// per unit, a unitless or px width gives `width / viewBox_width`. When
    /// either attribute is missing one user unit is taken as one millimeter
    /// and a warning is returned.
    pub fn from_document(doc: &SvgDocument) -> (Self, Option<String>) {
        let Some(view_box) = doc.view_box.filter(|vb| !vb.is_degenerate()) else {
            return (
                Self::identity(),
                Some(format!(
                    "{}: no usable viewBox, assuming 1 user unit = 1 mm",
                    doc.source_name
                )),
            );
        };
        let origin = Point::new(view_box.x, view_box.y);

        let Some(width) = doc.width.filter(|w| w.value > 0.0) else {
            return (
                Self { origin, ..Self::identity() },
                Some(format!(
                    "{}: no usable width, assuming 1 user unit = 1 mm",
                    doc.source_name
                )),
            );
        };

        // Computed in millimeters first so that 100mm over a 100-unit
        // viewBox is exactly 1 mm per unit
        let mm_per_unit = if width.unit.is_physical() {
            width.to_mm() / view_box.width
        } else {
            width.value / view_box.width * MM_PER_PX
        };

        (
            Self {
                px_per_unit: mm_per_unit / MM_PER_PX,
                mm_per_unit,
                origin,
            },
            None,
        )
    }

    /// Map a user-space point to millimeters
    pub fn apply(&self, p: Point) -> Point {
        (p - self.origin) * self.mm_per_unit
    }
}

/// Placement options, all in millimeters
#[derive(Debug, Clone, PartialEq)]
pub struct Placement {
    pub plotter_area: [f64; 2],
    pub target_area: [f64; 2],
    pub mirror_vertical: bool,
    pub rotate_90_clockwise: bool,
    /// Scale the drawing to fill the target area
    pub fit_to_target: bool,
    pub center_in_area: bool,
    pub offset: [f64; 2],
}

impl Default for Placement {
    fn default() -> Self {
        Self {
            plotter_area: [300.0, 420.0],
            target_area: [210.0, 297.0],
            mirror_vertical: true,
            rotate_90_clockwise: false,
            fit_to_target: false,
            center_in_area: false,
            offset: [0.0, 0.0],
        }
    }
}

impl Placement {
    /// Size of a `width` x `height` drawing after the optional rotation
    pub fn oriented_size(&self, width: f64, height: f64) -> (f64, f64) {
        if self.rotate_90_clockwise {
            (height, width)
        } else {
            (width, height)
        }
    }

    /// Factor applied on top of the document scale to an oriented drawing
    /// of the given size, and whether the plotter envelope forced it down
    pub fn factor_for(&self, width: f64, height: f64) -> (f64, bool) {
        let mut factor = if self.fit_to_target {
            fit_factor(width, height, self.target_area).unwrap_or(1.0)
        } else {
            1.0
        };

        let (w, h) = (width * factor, height * factor);
        let [max_w, max_h] = self.plotter_area;
        if w > max_w + FIT_EPSILON || h > max_h + FIT_EPSILON {
            factor *= (max_w / w).min(max_h / h);
            return (factor, true);
        }
        (factor, false)
    }
}

/// What placement did to the drawing
#[derive(Debug, Clone, PartialEq)]
pub struct PlacementReport {
    /// Millimeters per user unit after fitting and clamping
    pub mm_per_unit: f64,
    /// Extra factor applied on top of the document scale
    pub factor: f64,
    /// True if the drawing was shrunk to fit the plotter
    pub clamped: bool,
    /// Final bounds, `None` for an empty drawing
    pub bounds: Option<BoundingBox>,
    pub warnings: Vec<String>,
}

/// Transform `strokes` from user units to plotter millimeters in place
pub fn place_strokes(
    strokes: &mut [Polyline],
    scale: &DocumentScale,
    placement: &Placement,
) -> PlacementReport {
    let mut report = PlacementReport {
        mm_per_unit: scale.mm_per_unit,
        factor: 1.0,
        clamped: false,
        bounds: None,
        warnings: Vec::new(),
    };

    map_all(strokes, |p| scale.apply(p));
    let Some(bbox) = polylines_bounding_box(strokes) else {
        return report;
    };

    if placement.mirror_vertical {
        let cy = bbox.center().y;
        map_all(strokes, |p| Point::new(p.x, 2.0 * cy - p.y));
    }

    if placement.rotate_90_clockwise {
        let shift = bbox.max_x;
        map_all(strokes, |p| Point::new(p.y, shift - p.x));
    }

    let mut bbox = current_bounds(strokes, bbox);

    if placement.fit_to_target {
        let min = Point::new(bbox.min_x, bbox.min_y);
        map_all(strokes, |p| p - min);
        bbox = current_bounds(strokes, bbox);
    }

    let [max_w, max_h] = placement.plotter_area;
    let (factor, clamped) = placement.factor_for(bbox.width(), bbox.height());
    if clamped {
        report.clamped = true;
        tracing::info!(
            "Drawing exceeds plotter area {}x{} mm, scaling by {:.4}",
            max_w,
            max_h,
            factor
        );
    }

    if (factor - 1.0).abs() > f64::EPSILON {
        map_all(strokes, |p| p * factor);
        bbox = current_bounds(strokes, bbox);
    }

    if placement.center_in_area {
        let target_center = Point::new(placement.target_area[0] / 2.0, placement.target_area[1] / 2.0);
        let shift = target_center - bbox.center();
        map_all(strokes, |p| p + shift);
    }

    let offset = Point::new(placement.offset[0], placement.offset[1]);
    if offset != Point::origin() {
        map_all(strokes, |p| p + offset);
    }

    let bounds = current_bounds(strokes, bbox);
    let target = BoundingBox::new(0.0, 0.0, placement.target_area[0], placement.target_area[1]);
    let plotter = BoundingBox::new(0.0, 0.0, max_w, max_h);
    if !target.contains_box(&bounds, 1e-6) {
        report.warnings.push(format!(
            "drawing bounds ({:.3}, {:.3})-({:.3}, {:.3}) exceed the target area {}x{} mm",
            bounds.min_x, bounds.min_y, bounds.max_x, bounds.max_y, placement.target_area[0], placement.target_area[1]
        ));
    }
    if !plotter.contains_box(&bounds, 1e-6) {
        report.warnings.push(format!(
            "drawing bounds ({:.3}, {:.3})-({:.3}, {:.3}) exceed the plotter area {}x{} mm",
            bounds.min_x, bounds.min_y, bounds.max_x, bounds.max_y, max_w, max_h
        ));
    }
    for warning in &report.warnings {
        tracing::warn!("{}", warning);
    }

    report.factor = factor;
    report.mm_per_unit = scale.mm_per_unit * factor;
    report.bounds = Some(bounds);
    report
}

fn fit_factor(width: f64, height: f64, area: [f64; 2]) -> Option<f64> {
    let fx = (width > FIT_EPSILON).then(|| area[0] / width);
    let fy = (height > FIT_EPSILON).then(|| area[1] / height);
    match (fx, fy) {
        (Some(x), Some(y)) => Some(x.min(y)),
        (Some(f), None) | (None, Some(f)) => Some(f),
        (None, None) => None,
    }
}

fn map_all<F>(strokes: &mut [Polyline], f: F)
where
    F: Fn(Point) -> Point,
{
    for stroke in strokes.iter_mut() {
        stroke.map_points(&f);
    }
}

fn current_bounds(strokes: &[Polyline], fallback: BoundingBox) -> BoundingBox {
    polylines_bounding_box(strokes).unwrap_or(fallback)
}
