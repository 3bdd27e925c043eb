//! # Path Filtering
//!
//! Removes paths that should not be drawn: zero-length paths, paths a
//! caller-supplied predicate rejects, and the rectangle that merely outlines
//! the document's viewBox.

use crate::import::ViewBox;
use crate::primitives::polygon_corners;
use penkit_core::{Path, ProcessingError};

/// Paths shorter than this are dropped.
pub const MIN_PATH_LENGTH: f64 = 1e-9;

/// Default relative tolerance of the border detector.
pub const DEFAULT_BORDER_TOLERANCE: f64 = 0.05;

type PathPredicate = Box<dyn Fn(&Path) -> bool + Send + Sync>;

/// Why a path was dropped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    ZeroLength,
    Predicate,
    SvgBorder,
}

/// Outcome of a filter run
#[derive(Debug, Clone, Default)]
pub struct FilterOutcome {
    /// Paths kept, in input order
    pub kept: Vec<Path>,
    /// Index into the input and reason for each dropped path
    pub rejected: Vec<(usize, Rejection)>,
}

impl FilterOutcome {
    pub fn count(&self, reason: Rejection) -> usize {
        self.rejected.iter().filter(|(_, r)| *r == reason).count()
    }
}

/// Path filter
pub struct PathFilter {
    predicate: Option<PathPredicate>,
    remove_svg_border: bool,
    border_tolerance: f64,
}

impl PathFilter {
    pub fn new() -> Self {
        Self {
            predicate: None,
            remove_svg_border: true,
            border_tolerance: DEFAULT_BORDER_TOLERANCE,
        }
    }

    /// Keep only paths for which `predicate` returns true
    pub fn with_predicate<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&Path) -> bool + Send + Sync + 'static,
    {
        self.predicate = Some(Box::new(predicate));
        self
    }

    pub fn with_svg_border_removal(mut self, enabled: bool, tolerance: f64) -> Self {
        self.remove_svg_border = enabled;
        self.border_tolerance = tolerance;
        self
    }

    pub fn apply(&self, paths: Vec<Path>, view_box: Option<&ViewBox>) -> FilterOutcome {
        let mut outcome = FilterOutcome::default();

        for (index, path) in paths.into_iter().enumerate() {
            let rejection = if path.is_empty() || path.length() <= MIN_PATH_LENGTH {
                Some(Rejection::ZeroLength)
            } else if self.predicate.as_ref().is_some_and(|keep| !keep(&path)) {
                Some(Rejection::Predicate)
            } else if self.remove_svg_border
                && view_box.is_some_and(|vb| is_svg_border(&path, vb, self.border_tolerance))
            {
                Some(Rejection::SvgBorder)
            } else {
                None
            };

            match rejection {
                Some(reason) => {
                    tracing::debug!("Dropping path #{}: {:?}", index, reason);
                    outcome.rejected.push((index, reason));
                }
                None => outcome.kept.push(path),
            }
        }

        if outcome.count(Rejection::SvgBorder) > 0 {
            tracing::info!("Removed SVG border rectangle");
        }
        outcome
    }
}

impl Default for PathFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for PathFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PathFilter")
            .field("has_predicate", &self.predicate.is_some())
            .field("remove_svg_border", &self.remove_svg_border)
            .field("border_tolerance", &self.border_tolerance)
            .finish()
    }
}

/// True if `path` is a closed four-sided rectangle outlining `view_box`
///
/// Each edge must match the viewBox within `tolerance` times the viewBox
/// extent on that axis. A degenerate viewBox never matches.
pub fn is_svg_border(path: &Path, view_box: &ViewBox, tolerance: f64) -> bool {
    if view_box.is_degenerate() {
        let e = ProcessingError::DegenerateViewBox {
            width: view_box.width,
            height: view_box.height,
        };
        tracing::debug!("{}", e);
        return false;
    }
    if !path.is_closed() || !path.is_polyline() || polygon_corners(path).len() != 4 {
        return false;
    }
    let Some(bounds) = path.bounding_box() else {
        return false;
    };

    let target = view_box.bounds();
    let tx = tolerance * view_box.width;
    let ty = tolerance * view_box.height;
    (bounds.min_x - target.min_x).abs() <= tx
        && (bounds.max_x - target.max_x).abs() <= tx
        && (bounds.min_y - target.min_y).abs() <= ty
        && (bounds.max_y - target.max_y).abs() <= ty
}
