//! # Segment Sampling
//!
//! Turns segments into point sequences for the pen to visit.
//!
//! - Lines contribute their two endpoints.
//! - Bézier curves start from `max(ceil(length / max_segment_length), 2)`
//!   samples and every interval is densified according to the local
//!   curvature at its midpoint.
//! - Arcs are sampled uniformly in parameter with a count driven by swept
//!   angle and radius.
//!
//! Curve samples always start at `point(0)`, end at `point(1)` and are no
//! further than `max_segment_length` apart. Numerical trouble falls back to
//! ten uniform samples.

use penkit_core::{Path, Point, ProcessingError, Segment};

/// Step for the first derivative estimate.
const DERIVATIVE_STEP: f64 = 1e-6;

/// Step for the second derivative estimate. Smaller steps drown in
/// cancellation error.
const SECOND_DERIVATIVE_STEP: f64 = 1e-4;

/// Samples taken by the uniform fallback.
pub const UNIFORM_SAMPLES: usize = 10;

const MAX_EXTRA_POINTS: usize = 256;
const MAX_SAMPLES: usize = 100_000;
const MAX_REFINE_ROUNDS: usize = 8;

/// Sampling parameters, all lengths in the units of the segment
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplingParams {
    /// Upper bound on the distance between consecutive curve samples
    pub max_segment_length: f64,
    /// Target spacing on arcs and primitives
    pub min_segment_length: f64,
    /// Scales how many points curvature adds
    pub curvature_factor: f64,
}

impl Default for SamplingParams {
    fn default() -> Self {
        Self {
            max_segment_length: 0.5,
            min_segment_length: 0.2,
            curvature_factor: 1.0,
        }
    }
}

impl SamplingParams {
    fn arc_spacing(&self) -> f64 {
        if self.min_segment_length > 0.0 && self.min_segment_length.is_finite() {
            self.min_segment_length
        } else {
            self.max_segment_length
        }
    }
}

/// Sample one segment
pub fn sample_segment(segment: &Segment, params: &SamplingParams) -> Vec<Point> {
    let sampled = match segment {
        Segment::Line { start, end } => return vec![*start, *end],
        Segment::CubicBezier { .. } | Segment::QuadraticBezier { .. } => {
            sample_bezier(segment, params)
        }
        Segment::EllipticalArc { .. } => sample_arc(segment, params),
    };

    match sampled {
        Ok(points) => points,
        Err(e) => {
            tracing::debug!("{}; using uniform sampling", e);
            uniform_samples(segment, UNIFORM_SAMPLES, params.max_segment_length)
        }
    }
}

/// Sample a whole path
///
/// Joints shared by consecutive segments appear once.
pub fn sample_path(path: &Path, params: &SamplingParams) -> Vec<Point> {
    let mut points: Vec<Point> = Vec::new();
    for segment in &path.segments {
        let samples = sample_segment(segment, params);
        let skip = match (points.last(), samples.first()) {
            (Some(last), Some(first)) if last.approx_eq(first, 1e-9) => 1,
            _ => 0,
        };
        points.extend(samples.into_iter().skip(skip));
    }
    points
}

/// Evenly spaced samples in parameter, refined to respect `max_spacing`
pub fn uniform_samples(segment: &Segment, count: usize, max_spacing: f64) -> Vec<Point> {
    let ts = uniform_parameters(count.max(2));
    let ts = enforce_spacing(segment, ts, max_spacing);
    ts.into_iter().map(|t| segment.point(t)).collect()
}

/// Local curvature `|p''| / (1 + |p'|²)^1.5` by symmetric finite differences
pub fn curvature_at(segment: &Segment, t: f64) -> f64 {
    let t = t.clamp(SECOND_DERIVATIVE_STEP, 1.0 - SECOND_DERIVATIVE_STEP);

    let h1 = DERIVATIVE_STEP;
    let d1 = (segment.point(t + h1) - segment.point(t - h1)) * (1.0 / (2.0 * h1));

    let h2 = SECOND_DERIVATIVE_STEP;
    let d2 = (segment.point(t + h2) - segment.point(t) * 2.0 + segment.point(t - h2))
        * (1.0 / (h2 * h2));

    d2.norm() / (1.0 + d1.dot(&d1)).powf(1.5)
}

fn sample_bezier(segment: &Segment, params: &SamplingParams) -> Result<Vec<Point>, ProcessingError> {
    let length = segment.length();
    let initial = sample_count(length / params.max_segment_length, segment)?;
    let base = uniform_parameters(initial);

    let mut ts = Vec::with_capacity(base.len() * 2);
    ts.push(0.0);
    for w in base.windows(2) {
        let (t0, t1) = (w[0], w[1]);
        let kappa = curvature_at(segment, (t0 + t1) / 2.0);
        let chord = segment.point(t0).distance_to(&segment.point(t1));
        let extra = (kappa * chord * params.curvature_factor).ceil();
        if !extra.is_finite() {
            return Err(ProcessingError::NonFinite(format!(
                "curvature of {} segment",
                segment.kind()
            )));
        }

        let extra = (extra.max(0.0) as usize).min(MAX_EXTRA_POINTS);
        for j in 1..=extra {
            ts.push(t0 + (t1 - t0) * j as f64 / (extra + 1) as f64);
        }
        ts.push(t1);
    }

    finish(segment, enforce_spacing(segment, ts, params.max_segment_length))
}

fn sample_arc(segment: &Segment, params: &SamplingParams) -> Result<Vec<Point>, ProcessingError> {
    let Some((sweep, radius)) = segment.arc_sweep() else {
        return Ok(vec![segment.start(), segment.end()]);
    };

    let count = sample_count(sweep.abs() * radius / params.arc_spacing(), segment)?;
    let ts = uniform_parameters(count);
    finish(segment, enforce_spacing(segment, ts, params.max_segment_length))
}

fn sample_count(ratio: f64, segment: &Segment) -> Result<usize, ProcessingError> {
    if !ratio.is_finite() {
        return Err(ProcessingError::NonFinite(format!(
            "sample count of {} segment",
            segment.kind()
        )));
    }
    Ok((ratio.ceil().max(0.0) as usize).clamp(2, MAX_SAMPLES))
}

fn finish(segment: &Segment, ts: Vec<f64>) -> Result<Vec<Point>, ProcessingError> {
    let points: Vec<Point> = ts.into_iter().map(|t| segment.point(t)).collect();
    if points.iter().all(Point::is_finite) {
        Ok(points)
    } else {
        Err(ProcessingError::NonFinite(format!(
            "samples of {} segment",
            segment.kind()
        )))
    }
}

fn uniform_parameters(count: usize) -> Vec<f64> {
    let last = (count - 1) as f64;
    (0..count).map(|i| i as f64 / last).collect()
}

/// Split parameter intervals whose chord exceeds `max_spacing`
fn enforce_spacing(segment: &Segment, mut ts: Vec<f64>, max_spacing: f64) -> Vec<f64> {
    if !(max_spacing > 0.0 && max_spacing.is_finite()) {
        return ts;
    }

    for _ in 0..MAX_REFINE_ROUNDS {
        let mut refined = Vec::with_capacity(ts.len());
        let mut changed = false;
        refined.push(ts[0]);

        for w in ts.windows(2) {
            let gap = segment.point(w[0]).distance_to(&segment.point(w[1]));
            if gap > max_spacing {
                let pieces = ((gap / max_spacing).ceil() as usize).clamp(2, MAX_SAMPLES);
                for j in 1..pieces {
                    refined.push(w[0] + (w[1] - w[0]) * j as f64 / pieces as f64);
                }
                changed = true;
            }
            refined.push(w[1]);
        }

        ts = refined;
        if !changed || ts.len() > MAX_SAMPLES {
            break;
        }
    }
    ts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: f64, y: f64) -> Point {
        Point::new(x, y)
    }

    fn arch() -> Segment {
        Segment::CubicBezier {
            start: p(0.0, 0.0),
            c1: p(0.0, 10.0),
            c2: p(10.0, 10.0),
            end: p(10.0, 0.0),
        }
    }

    fn params(max: f64, cf: f64) -> SamplingParams {
        SamplingParams {
            max_segment_length: max,
            min_segment_length: 0.2,
            curvature_factor: cf,
        }
    }

    fn max_gap(points: &[Point]) -> f64 {
        points
            .windows(2)
            .map(|w| w[0].distance_to(&w[1]))
            .fold(0.0, f64::max)
    }

    #[test]
    fn test_line_gives_endpoints() {
        let seg = Segment::line(p(0.0, 0.0), p(100.0, 0.0));
        assert_eq!(sample_segment(&seg, &params(1.0, 1.0)), vec![p(0.0, 0.0), p(100.0, 0.0)]);
    }

    #[test]
    fn test_bezier_contract() {
        let seg = arch();
        let points = sample_segment(&seg, &params(1.0, 1.0));
        assert_eq!(points.first(), Some(&seg.point(0.0)));
        assert_eq!(points.last(), Some(&seg.point(1.0)));
        assert!(max_gap(&points) <= 1.0 + 1e-9);
    }

    #[test]
    fn test_curvature_factor_adds_points() {
        let seg = arch();
        let flat = sample_segment(&seg, &params(1.0, 0.0)).len();
        let curved = sample_segment(&seg, &params(1.0, 1000.0)).len();
        assert!(curved > flat, "{} <= {}", curved, flat);
    }

    #[test]
    fn test_point_count_monotone_in_curvature_factor() {
        let seg = arch();
        let counts: Vec<usize> = [0.0, 10.0, 100.0, 1000.0, 10000.0]
            .iter()
            .map(|&cf| sample_segment(&seg, &params(1.0, cf)).len())
            .collect();
        assert!(counts.windows(2).all(|w| w[0] <= w[1]), "{:?}", counts);
    }

    #[test]
    fn test_shorter_spacing_adds_points() {
        let seg = arch();
        let coarse = sample_segment(&seg, &params(2.0, 0.0)).len();
        let fine = sample_segment(&seg, &params(0.5, 0.0)).len();
        assert!(fine > coarse, "{} <= {}", fine, coarse);
    }

    #[test]
    fn test_curvature_of_straight_cubic_is_zero() {
        let seg = Segment::CubicBezier {
            start: p(0.0, 0.0),
            c1: p(1.0, 0.0),
            c2: p(2.0, 0.0),
            end: p(3.0, 0.0),
        };
        assert!(curvature_at(&seg, 0.5) < 1e-6);
        assert!(curvature_at(&arch(), 0.5) > 0.0);
    }

    #[test]
    fn test_arc_count_follows_sweep() {
        let half_circle = Segment::EllipticalArc {
            start: p(0.0, 0.0),
            end: p(20.0, 0.0),
            radii: (10.0, 10.0),
            rotation: 0.0,
            large_arc: false,
            sweep: true,
        };
        let points = sample_segment(&half_circle, &params(5.0, 1.0));
        // pi * 10 / 0.2
        assert_eq!(points.len(), 158);
        assert_eq!(points[0], p(0.0, 0.0));
        assert_eq!(points[points.len() - 1], p(20.0, 0.0));
        for q in &points {
            assert!((q.distance_to(&p(10.0, 0.0)) - 10.0).abs() < 1e-6);
        }
    }

    #[test]
    fn test_path_joints_not_repeated() {
        let path = Path::new(vec![
            Segment::line(p(0.0, 0.0), p(10.0, 0.0)),
            Segment::line(p(10.0, 0.0), p(10.0, 10.0)),
        ]);
        assert_eq!(
            sample_path(&path, &params(1.0, 1.0)),
            vec![p(0.0, 0.0), p(10.0, 0.0), p(10.0, 10.0)]
        );
    }

    #[test]
    fn test_uniform_samples() {
        let seg = arch();
        let points = uniform_samples(&seg, UNIFORM_SAMPLES, 100.0);
        assert_eq!(points.len(), UNIFORM_SAMPLES);
        assert_eq!(points[0], seg.start());
        assert_eq!(points[9], seg.end());
    }
}
