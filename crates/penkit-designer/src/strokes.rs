//! Path to stroke conversion: primitive detection with sampling as the
//! fallback.

use crate::primitives::{signed_area, Primitive, PrimitiveDetector};
use crate::sampling::{sample_path, SamplingParams};
use penkit_core::{Path, Polyline};

/// One stroke and the primitive it was recognized as, if any
#[derive(Debug, Clone, PartialEq)]
pub struct Stroke {
    pub polyline: Polyline,
    pub primitive: Option<Primitive>,
}

/// Converts continuous paths into strokes
#[derive(Debug, Clone)]
pub struct StrokeBuilder {
    params: SamplingParams,
    detector: Option<PrimitiveDetector>,
}

impl StrokeBuilder {
    pub fn new(params: SamplingParams) -> Self {
        Self {
            params,
            detector: Some(PrimitiveDetector::default()),
        }
    }

    /// Enable or disable primitive detection
    pub fn with_detection(mut self, detector: Option<PrimitiveDetector>) -> Self {
        self.detector = detector;
        self
    }

    pub fn params(&self) -> &SamplingParams {
        &self.params
    }

    pub fn build(&self, path: &Path) -> Stroke {
        let samples = sample_path(path, &self.params);

        let primitive = self
            .detector
            .as_ref()
            .and_then(|detector| detector.detect(path, &samples));

        let points = match (&primitive, path.start()) {
            (Some(primitive), Some(start)) => {
                let ccw = signed_area(&samples) >= 0.0;
                let points = primitive.points(start, ccw, self.params.min_segment_length);
                tracing::debug!(
                    "Path recognized as {}: {} samples -> {} points",
                    primitive.kind(),
                    samples.len(),
                    points.len()
                );
                points
            }
            _ => samples,
        };

        Stroke {
            polyline: Polyline::new(points),
            primitive,
        }
    }

    pub fn build_all(&self, paths: &[Path]) -> Vec<Stroke> {
        paths.iter().map(|path| self.build(path)).collect()
    }
}
