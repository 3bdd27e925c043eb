//! Paths and sampled polylines.

use super::point::{BoundingBox, Point};
use super::segment::Segment;
use serde::{Deserialize, Serialize};

/// Continuity tolerance between consecutive segments (1 µm).
pub const CONTINUITY_TOLERANCE: f64 = 1e-3;

/// Parameter steps used when estimating the bounds of a curve.
const BOUNDS_STEPS: usize = 16;

/// An ordered sequence of segments
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Path {
    /// Segments in drawing order
    pub segments: Vec<Segment>,
}

impl Path {
    /// Create a path from segments
    pub fn new(segments: Vec<Segment>) -> Self {
        Self { segments }
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Start of the first segment
    pub fn start(&self) -> Option<Point> {
        self.segments.first().map(Segment::start)
    }

    /// End of the last segment
    pub fn end(&self) -> Option<Point> {
        self.segments.last().map(Segment::end)
    }

    /// True if every segment starts where the previous one ended
    pub fn is_continuous(&self) -> bool {
        self.segments
            .windows(2)
            .all(|w| w[0].end().approx_eq(&w[1].start(), CONTINUITY_TOLERANCE))
    }

    /// True if the path ends where it starts
    pub fn is_closed(&self) -> bool {
        match (self.start(), self.end()) {
            (Some(s), Some(e)) => s.approx_eq(&e, CONTINUITY_TOLERANCE),
            _ => false,
        }
    }

    /// Split into maximal continuous runs
    ///
    /// A continuous path is returned unchanged as the only element.
    pub fn split_discontinuous(&self) -> Vec<Path> {
        let mut paths = Vec::new();
        let mut current: Vec<Segment> = Vec::new();

        for segment in &self.segments {
            if let Some(last) = current.last() {
                if !last.end().approx_eq(&segment.start(), CONTINUITY_TOLERANCE) {
                    paths.push(Path::new(std::mem::take(&mut current)));
                }
            }
            current.push(*segment);
        }
        if !current.is_empty() {
            paths.push(Path::new(current));
        }
        paths
    }

    /// Total length of all segments
    pub fn length(&self) -> f64 {
        self.segments.iter().map(Segment::length).sum()
    }

    /// Bounds of the path, estimated by sampling curves
    pub fn bounding_box(&self) -> Option<BoundingBox> {
        let mut bbox = BoundingBox::empty();
        for segment in &self.segments {
            if segment.is_line() {
                bbox.include(&segment.start());
                bbox.include(&segment.end());
            } else {
                for i in 0..=BOUNDS_STEPS {
                    bbox.include(&segment.point(i as f64 / BOUNDS_STEPS as f64));
                }
            }
        }
        (!bbox.is_empty()).then_some(bbox)
    }

    /// True if every segment is a straight line
    pub fn is_polyline(&self) -> bool {
        self.segments.iter().all(Segment::is_line)
    }
}

/// A sampled stroke: the points the pen visits while down
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Polyline {
    /// Points in drawing order
    pub points: Vec<Point>,
}

impl Polyline {
    pub fn new(points: Vec<Point>) -> Self {
        Self { points }
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn start(&self) -> Option<Point> {
        self.points.first().copied()
    }

    pub fn end(&self) -> Option<Point> {
        self.points.last().copied()
    }

    /// Sum of distances between consecutive points
    pub fn length(&self) -> f64 {
        self.points
            .windows(2)
            .map(|w| w[0].distance_to(&w[1]))
            .sum()
    }

    pub fn bounding_box(&self) -> Option<BoundingBox> {
        BoundingBox::from_points(self.points.iter())
    }

    /// Same points, opposite direction
    pub fn reversed(&self) -> Polyline {
        Polyline::new(self.points.iter().rev().copied().collect())
    }

    /// Apply `f` to every point
    pub fn map_points<F>(&mut self, f: F)
    where
        F: Fn(Point) -> Point,
    {
        for p in &mut self.points {
            *p = f(*p);
        }
    }
}

/// Bounds of a set of polylines
pub fn polylines_bounding_box(polylines: &[Polyline]) -> Option<BoundingBox> {
    BoundingBox::from_points(polylines.iter().flat_map(|p| p.points.iter()))
}
