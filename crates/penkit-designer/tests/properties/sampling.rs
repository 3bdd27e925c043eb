use penkit_core::{Point, Segment};
use penkit_designer::{sample_segment, SamplingParams};
use proptest::prelude::*;

fn check_contract(segment: &Segment, params: &SamplingParams) -> Result<(), TestCaseError> {
    let points = sample_segment(segment, params);
    prop_assert!(points.len() >= 2);
    prop_assert_eq!(points[0], segment.point(0.0));
    prop_assert_eq!(points[points.len() - 1], segment.point(1.0));
    for w in points.windows(2) {
        let gap = w[0].distance_to(&w[1]);
        prop_assert!(
            gap <= params.max_segment_length + 1e-9,
            "gap {} exceeds {}",
            gap,
            params.max_segment_length
        );
    }
    Ok(())
}

fn coord() -> impl Strategy<Value = f64> {
    -100.0f64..100.0
}

fn point() -> impl Strategy<Value = Point> {
    (coord(), coord()).prop_map(|(x, y)| Point::new(x, y))
}

proptest! {
    #[test]
    fn cubic_samples_respect_spacing(
        start in point(),
        c1 in point(),
        c2 in point(),
        end in point(),
        max in 0.5f64..5.0,
        cf in 0.0f64..2.0,
    ) {
        let segment = Segment::CubicBezier { start, c1, c2, end };
        let params = SamplingParams {
            max_segment_length: max,
            min_segment_length: 0.2,
            curvature_factor: cf,
        };
        check_contract(&segment, &params)?;
    }

    #[test]
    fn quadratic_samples_respect_spacing(
        start in point(),
        c in point(),
        end in point(),
        max in 0.5f64..5.0,
    ) {
        let segment = Segment::QuadraticBezier { start, c, end };
        check_contract(&segment, &SamplingParams { max_segment_length: max, ..SamplingParams::default() })?;
    }

    #[test]
    fn arc_samples_respect_spacing(
        start in point(),
        end in point(),
        rx in 1.0f64..80.0,
        ry in 1.0f64..80.0,
        rotation in 0.0f64..3.0,
        large_arc in any::<bool>(),
        sweep in any::<bool>(),
    ) {
        prop_assume!(start.distance_to(&end) > 1e-3);
        let segment = Segment::EllipticalArc { start, end, radii: (rx, ry), rotation, large_arc, sweep };
        let params = SamplingParams {
            max_segment_length: 2.0,
            min_segment_length: 1.0,
            curvature_factor: 1.0,
        };
        check_contract(&segment, &params)?;
    }
}
