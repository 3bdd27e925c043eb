use penkit_core::{Point, Segment};

#[test]
fn test_quarter_arc_matches_circle() {
    let arc = Segment::EllipticalArc {
        start: Point::new(10.0, 0.0),
        end: Point::new(0.0, 10.0),
        radii: (10.0, 10.0),
        rotation: 0.0,
        large_arc: false,
        sweep: true,
    };
    for i in 0..=8 {
        let p = arc.point(i as f64 / 8.0);
        assert!((p.norm() - 10.0).abs() < 1e-6, "point {:?} off the circle", p);
    }
    let quarter = std::f64::consts::PI * 5.0;
    assert!((arc.length() - quarter).abs() < 0.01);
}

#[test]
fn test_zero_radius_arc_is_a_line() {
    let arc = Segment::EllipticalArc {
        start: Point::new(0.0, 0.0),
        end: Point::new(10.0, 0.0),
        radii: (0.0, 0.0),
        rotation: 0.0,
        large_arc: false,
        sweep: false,
    };
    assert_eq!(arc.point(0.5), Point::new(5.0, 0.0));
    assert!(arc.arc_sweep().is_none());
}
