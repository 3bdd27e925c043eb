//! Geometry primitives shared by every stage of the pipeline.

mod path;
mod point;
mod segment;

pub use path::{polylines_bounding_box, Path, Polyline, CONTINUITY_TOLERANCE};
pub use point::{BoundingBox, Point, POINT_TOLERANCE};
pub use segment::Segment;
