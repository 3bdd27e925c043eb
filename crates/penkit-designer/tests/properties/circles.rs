use penkit_core::{Path, Point, Segment};
use penkit_designer::{Primitive, PrimitiveDetector};
use proptest::prelude::*;
use std::f64::consts::TAU;

fn circle_ring(center: Point, radius: f64, n: usize, phase: f64) -> Vec<Point> {
    (0..=n)
        .map(|k| {
            let a = phase + TAU * (k % n) as f64 / n as f64;
            Point::new(center.x + radius * a.cos(), center.y + radius * a.sin())
        })
        .collect()
}

proptest! {
    #[test]
    fn circle_detector_recovers_center_and_radius(
        cx in -200.0f64..200.0,
        cy in -200.0f64..200.0,
        radius in 0.5f64..100.0,
        n in 20usize..90,
        phase in 0.0f64..6.28,
    ) {
        let center = Point::new(cx, cy);
        let ring = circle_ring(center, radius, n, phase);
        let path = Path::new(ring.windows(2).map(|w| Segment::line(w[0], w[1])).collect());

        match PrimitiveDetector::new().detect(&path, &ring) {
            Some(Primitive::Circle { center: c, radius: r }) => {
                prop_assert!(c.distance_to(&center) <= 0.01 * radius);
                prop_assert!((r - radius).abs() <= 0.05 * radius);
            }
            other => prop_assert!(false, "expected circle, got {:?}", other),
        }
    }
}
