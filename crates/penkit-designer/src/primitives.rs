//! # Primitive Detection
//!
//! Recognizes closed paths that are circles, rectangles or ellipses and
//! replaces their samples with an evenly spaced point set.
//!
//! Detectors run in the order circle, rectangle, ellipse. Any numerical
//! trouble means "not a primitive"; detection never fails a conversion.

use nalgebra::{Matrix3, Vector3};
use penkit_core::{Path, Point, ProcessingError};
use std::f64::consts::{FRAC_PI_2, PI, TAU};

/// Samples required before a path is considered round.
pub const MIN_PRIMITIVE_SAMPLES: usize = 20;

/// Fewest points emitted for a round primitive.
pub const MIN_PRIMITIVE_POINTS: usize = 8;

/// A recognized primitive
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Primitive {
    Circle {
        center: Point,
        radius: f64,
    },
    /// Corners in path order
    Rectangle {
        corners: [Point; 4],
    },
    Ellipse {
        center: Point,
        rx: f64,
        ry: f64,
        /// Rotation of the rx axis in radians
        rotation: f64,
    },
}

impl Primitive {
    pub fn kind(&self) -> &'static str {
        match self {
            Primitive::Circle { .. } => "circle",
            Primitive::Rectangle { .. } => "rectangle",
            Primitive::Ellipse { .. } => "ellipse",
        }
    }

    /// Evenly spaced closed point set around the primitive
    ///
    /// Starts at (or, for round primitives, nearest to) `start` and keeps
    /// the orientation given by `counter_clockwise`.
    pub fn points(&self, start: Point, counter_clockwise: bool, spacing: f64) -> Vec<Point> {
        let direction = if counter_clockwise { 1.0 } else { -1.0 };

        match *self {
            Primitive::Circle { center, radius } => {
                let n = point_count(TAU * radius, spacing);
                let a0 = (start.y - center.y).atan2(start.x - center.x);
                let step = direction * TAU / n as f64;
                close_ring(
                    (0..n)
                        .map(|k| {
                            let a = a0 + step * k as f64;
                            Point::new(center.x + radius * a.cos(), center.y + radius * a.sin())
                        })
                        .collect(),
                )
            }
            Primitive::Ellipse {
                center,
                rx,
                ry,
                rotation,
            } => {
                let n = point_count(ramanujan_perimeter(rx, ry), spacing);
                let (sin, cos) = rotation.sin_cos();
                let d = start - center;
                let u = d.x * cos + d.y * sin;
                let v = -d.x * sin + d.y * cos;
                let t0 = (v / ry).atan2(u / rx);
                let step = direction * TAU / n as f64;
                close_ring(
                    (0..n)
                        .map(|k| {
                            let t = t0 + step * k as f64;
                            let (ex, ey) = (rx * t.cos(), ry * t.sin());
                            Point::new(center.x + ex * cos - ey * sin, center.y + ex * sin + ey * cos)
                        })
                        .collect(),
                )
            }
            Primitive::Rectangle { corners } => {
                let first = (0..4)
                    .min_by(|&a, &b| {
                        corners[a]
                            .distance_to(&start)
                            .total_cmp(&corners[b].distance_to(&start))
                    })
                    .unwrap_or(0);
                close_ring((0..4).map(|k| corners[(first + k) % 4]).collect())
            }
        }
    }
}

/// Primitive detector with its tolerances
#[derive(Debug, Clone, PartialEq)]
pub struct PrimitiveDetector {
    /// Allowed relative deviation of each radius from the mean
    pub circle_tolerance: f64,
    /// Allowed relative difference between opposite sides
    pub rectangle_side_tolerance: f64,
    /// Allowed deviation of each corner from 90 degrees
    pub rectangle_angle_tolerance_deg: f64,
    /// Allowed deviation from the unit normalized ellipse radius
    pub ellipse_tolerance: f64,
}

impl Default for PrimitiveDetector {
    fn default() -> Self {
        Self {
            circle_tolerance: 0.05,
            rectangle_side_tolerance: 0.05,
            rectangle_angle_tolerance_deg: 5.0,
            ellipse_tolerance: 0.1,
        }
    }
}

impl PrimitiveDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run the detectors in order, returning the first match
    pub fn detect(&self, path: &Path, samples: &[Point]) -> Option<Primitive> {
        self.detect_circle(path, samples)
            .or_else(|| self.detect_rectangle(path))
            .or_else(|| self.detect_ellipse(path, samples))
    }

    pub fn detect_circle(&self, path: &Path, samples: &[Point]) -> Option<Primitive> {
        if !path.is_closed() {
            return None;
        }
        let ring = open_ring(samples);
        if ring.len() < MIN_PRIMITIVE_SAMPLES {
            return None;
        }

        let center = centroid(ring)?;
        let radius = ring.iter().map(|p| p.distance_to(&center)).sum::<f64>() / ring.len() as f64;
        if !(radius > f64::EPSILON && radius.is_finite()) {
            return None;
        }

        ring.iter()
            .all(|p| (p.distance_to(&center) - radius).abs() <= self.circle_tolerance * radius)
            .then_some(Primitive::Circle { center, radius })
    }

    pub fn detect_rectangle(&self, path: &Path) -> Option<Primitive> {
        if !path.is_closed() || !path.is_polyline() {
            return None;
        }
        let corners = polygon_corners(path);
        let [a, b, c, d] = <[Point; 4]>::try_from(corners).ok()?;

        let sides = [a.distance_to(&b), b.distance_to(&c), c.distance_to(&d), d.distance_to(&a)];
        if sides.iter().any(|s| *s <= f64::EPSILON) {
            return None;
        }
        let similar = |x: f64, y: f64| (x - y).abs() <= self.rectangle_side_tolerance * x.max(y);
        if !similar(sides[0], sides[2]) || !similar(sides[1], sides[3]) {
            return None;
        }

        let corners = [a, b, c, d];
        let square = (0..4).all(|i| {
            let prev = corners[(i + 3) % 4];
            let next = corners[(i + 1) % 4];
            let u = prev - corners[i];
            let v = next - corners[i];
            let cos = (u.dot(&v) / (u.norm() * v.norm())).clamp(-1.0, 1.0);
            (cos.acos().to_degrees() - 90.0).abs() <= self.rectangle_angle_tolerance_deg
        });
        square.then_some(Primitive::Rectangle { corners })
    }

    pub fn detect_ellipse(&self, path: &Path, samples: &[Point]) -> Option<Primitive> {
        if !path.is_closed() {
            return None;
        }
        let ring = open_ring(samples);
        if ring.len() < MIN_PRIMITIVE_SAMPLES {
            return None;
        }

        let fit = match fit_ellipse(ring) {
            Ok(fit) => fit,
            Err(e) => {
                tracing::debug!("{}", e);
                return None;
            }
        };
        (fit.max_deviation <= self.ellipse_tolerance).then_some(Primitive::Ellipse {
            center: fit.center,
            rx: fit.rx,
            ry: fit.ry,
            rotation: fit.rotation,
        })
    }
}

/// Result of a direct least-squares ellipse fit
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EllipseFit {
    pub center: Point,
    pub rx: f64,
    pub ry: f64,
    pub rotation: f64,
    /// Largest `|ρ - 1|` over the input, ρ being the normalized radius
    pub max_deviation: f64,
}

/// Direct least-squares ellipse fit (Fitzgibbon, in the numerically stable
/// Halíř–Flusser form)
pub fn fit_ellipse(points: &[Point]) -> Result<EllipseFit, ProcessingError> {
    let fail = |reason: &str| ProcessingError::EllipseFit(reason.to_string());

    if points.len() < 6 {
        return Err(fail("at least 6 points required"));
    }
    let mean = centroid(points).ok_or_else(|| fail("empty point set"))?;
    let scale = points
        .iter()
        .map(|p| (p.x - mean.x).abs().max((p.y - mean.y).abs()))
        .fold(0.0, f64::max);
    if !(scale > f64::EPSILON && scale.is_finite()) {
        return Err(fail("degenerate point set"));
    }
    let normalized: Vec<(f64, f64)> = points
        .iter()
        .map(|p| ((p.x - mean.x) / scale, (p.y - mean.y) / scale))
        .collect();

    let mut s1 = Matrix3::<f64>::zeros();
    let mut s2 = Matrix3::<f64>::zeros();
    let mut s3 = Matrix3::<f64>::zeros();
    for &(x, y) in &normalized {
        let quad = Vector3::new(x * x, x * y, y * y);
        let lin = Vector3::new(x, y, 1.0);
        s1 += quad * quad.transpose();
        s2 += quad * lin.transpose();
        s3 += lin * lin.transpose();
    }

    let s3_inv = s3.try_inverse().ok_or_else(|| fail("singular scatter matrix"))?;
    let t = -(s3_inv * s2.transpose());
    let reduced = s1 + s2 * t;
    // Premultiply by the inverse of the constraint matrix [[0,0,2],[0,-1,0],[2,0,0]]
    let m = Matrix3::new(
        reduced[(2, 0)] / 2.0,
        reduced[(2, 1)] / 2.0,
        reduced[(2, 2)] / 2.0,
        -reduced[(1, 0)],
        -reduced[(1, 1)],
        -reduced[(1, 2)],
        reduced[(0, 0)] / 2.0,
        reduced[(0, 1)] / 2.0,
        reduced[(0, 2)] / 2.0,
    );

    let quadratic = m
        .complex_eigenvalues()
        .iter()
        .filter(|ev| ev.im.abs() <= 1e-9 * (1.0 + ev.re.abs()))
        .filter_map(|ev| null_vector(&(m - Matrix3::identity() * ev.re)))
        .find(|v| 4.0 * v[0] * v[2] - v[1] * v[1] > 0.0)
        .ok_or_else(|| fail("no elliptic solution"))?;
    let linear = t * quadratic;

    let (a, b, c) = (quadratic[0], quadratic[1], quadratic[2]);
    let (d, e, f) = (linear[0], linear[1], linear[2]);

    let den = b * b - 4.0 * a * c;
    if den.abs() <= f64::EPSILON {
        return Err(fail("parabolic conic"));
    }
    let x0 = (2.0 * c * d - b * e) / den;
    let y0 = (2.0 * a * e - b * d) / den;
    let f0 = a * x0 * x0 + b * x0 * y0 + c * y0 * y0 + d * x0 + e * y0 + f;

    let rotation = 0.5 * b.atan2(a - c);
    let (sin, cos) = rotation.sin_cos();
    let l1 = a * cos * cos + b * cos * sin + c * sin * sin;
    let l2 = a * sin * sin - b * cos * sin + c * cos * cos;
    let (r1, r2) = (-f0 / l1, -f0 / l2);
    if !(r1 > 0.0 && r2 > 0.0 && r1.is_finite() && r2.is_finite()) {
        return Err(fail("imaginary axes"));
    }
    let (rx, ry) = (r1.sqrt(), r2.sqrt());

    let max_deviation = normalized
        .iter()
        .map(|&(x, y)| {
            let (dx, dy) = (x - x0, y - y0);
            let u = (dx * cos + dy * sin) / rx;
            let v = (-dx * sin + dy * cos) / ry;
            ((u * u + v * v).sqrt() - 1.0).abs()
        })
        .fold(0.0, f64::max);

    // Report the major axis as rx with rotation in (-pi/2, pi/2]
    let (mut rx, mut ry, mut rotation) = (rx, ry, rotation);
    if rx < ry {
        std::mem::swap(&mut rx, &mut ry);
        rotation += FRAC_PI_2;
    }
    while rotation > FRAC_PI_2 {
        rotation -= PI;
    }
    while rotation <= -FRAC_PI_2 {
        rotation += PI;
    }

    Ok(EllipseFit {
        center: Point::new(mean.x + x0 * scale, mean.y + y0 * scale),
        rx: rx * scale,
        ry: ry * scale,
        rotation,
        max_deviation,
    })
}

/// Ramanujan's approximation of an ellipse perimeter
pub fn ramanujan_perimeter(rx: f64, ry: f64) -> f64 {
    PI * (3.0 * (rx + ry) - ((3.0 * rx + ry) * (rx + 3.0 * ry)).sqrt())
}

/// Shoelace area, positive for counter-clockwise rings
pub fn signed_area(points: &[Point]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }
    (0..n)
        .map(|i| points[i].cross(&points[(i + 1) % n]))
        .sum::<f64>()
        / 2.0
}

/// Vertices of a closed polyline path with colinear runs collapsed
pub fn polygon_corners(path: &Path) -> Vec<Point> {
    let mut vertices: Vec<Point> = Vec::with_capacity(path.len());
    for segment in &path.segments {
        let p = segment.start();
        if vertices.last().map_or(true, |last| !last.approx_eq(&p, 1e-9)) {
            vertices.push(p);
        }
    }
    while vertices.len() > 1 && vertices[0].approx_eq(&vertices[vertices.len() - 1], 1e-9) {
        vertices.pop();
    }

    let mut i = 0;
    while vertices.len() > 3 && i < vertices.len() {
        let n = vertices.len();
        let prev = vertices[(i + n - 1) % n];
        let next = vertices[(i + 1) % n];
        let u = vertices[i] - prev;
        let v = next - vertices[i];
        let straight = u.cross(&v).abs() <= 1e-6 * u.norm() * v.norm() && u.dot(&v) > 0.0;
        if straight {
            vertices.remove(i);
            i = i.saturating_sub(1);
        } else {
            i += 1;
        }
    }
    vertices
}

fn point_count(perimeter: f64, spacing: f64) -> usize {
    let n = (perimeter / spacing).ceil();
    if n.is_finite() && n > 0.0 {
        (n as usize).clamp(MIN_PRIMITIVE_POINTS, 1_000_000)
    } else {
        MIN_PRIMITIVE_POINTS
    }
}

fn close_ring(mut points: Vec<Point>) -> Vec<Point> {
    if let Some(first) = points.first().copied() {
        points.push(first);
    }
    points
}

/// Samples without the closing duplicate
fn open_ring(samples: &[Point]) -> &[Point] {
    match samples {
        [first, rest @ .., last] if first.approx_eq(last, 1e-6) && !rest.is_empty() => {
            &samples[..samples.len() - 1]
        }
        _ => samples,
    }
}

fn centroid(points: &[Point]) -> Option<Point> {
    if points.is_empty() {
        return None;
    }
    let sum = points.iter().fold(Point::origin(), |acc, p| acc + *p);
    Some(sum * (1.0 / points.len() as f64))
}

fn null_vector(a: &Matrix3<f64>) -> Option<Vector3<f64>> {
    let rows = [
        a.row(0).transpose(),
        a.row(1).transpose(),
        a.row(2).transpose(),
    ];
    let v = [
        rows[0].cross(&rows[1]),
        rows[0].cross(&rows[2]),
        rows[1].cross(&rows[2]),
    ]
    .into_iter()
    .max_by(|x, y| x.norm().total_cmp(&y.norm()))?;
    let norm = v.norm();
    (norm > f64::EPSILON).then(|| v / norm)
}
