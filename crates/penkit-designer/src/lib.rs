//! # penkit Designer
//!
//! Everything between an SVG file and a list of plotter strokes in
//! millimeters.
//!
//! ## Stages
//!
//! - **Import**: root attributes and `<path>` geometry ([`import`],
//!   [`path_data`])
//! - **Filtering**: zero-length paths, caller predicates, the viewBox
//!   border ([`filter`])
//! - **Sampling**: adaptive point sequences per segment ([`sampling`])
//! - **Primitive detection**: circles, rectangles and ellipses replaced by
//!   evenly spaced point sets ([`primitives`], [`strokes`])
//! - **Placement**: user units to millimeters, mirror, rotation, fitting
//!   and clamping ([`transform`])
//! - **Ordering**: nearest-neighbour and length-weighted stroke tours
//!   ([`ordering`])
//!
//! ```text
//! SvgDocument ── PathFilter ── StrokeBuilder ── place_strokes ── ordering
//!                               (detect ∪ sample)
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use penkit_designer::{PathFilter, SamplingParams, StrokeBuilder, SvgImporter};
//!
//! let svg = r#"<svg viewBox="0 0 100 100" width="100mm"><path d="M10,10 L90,10"/></svg>"#;
//! let doc = SvgImporter::new()?.import_str(svg, "line.svg")?;
//! let kept = PathFilter::new().apply(doc.paths.clone(), doc.view_box.as_ref()).kept;
//! let strokes = StrokeBuilder::new(SamplingParams::default()).build_all(&kept);
//! assert_eq!(strokes.len(), 1);
//! # Ok::<(), penkit_core::Error>(())
//! ```

pub mod filter;
pub mod import;
pub mod ordering;
pub mod path_data;
pub mod primitives;
pub mod sampling;
pub mod strokes;
pub mod transform;

pub use filter::{is_svg_border, FilterOutcome, PathFilter, Rejection};
pub use import::{SvgDocument, SvgImporter, ViewBox};
pub use ordering::{apply_order, greedy_order, length_weighted_order, travel_distance};
pub use path_data::{parse_path_data, PathDataError};
pub use primitives::{fit_ellipse, EllipseFit, Primitive, PrimitiveDetector};
pub use sampling::{sample_path, sample_segment, SamplingParams};
pub use strokes::{Stroke, StrokeBuilder};
pub use transform::{place_strokes, DocumentScale, Placement, PlacementReport};
