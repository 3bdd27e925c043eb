use penkit_core::{Path, Point, Segment};
use proptest::prelude::*;

fn polyline_path(points: &[(f64, f64)]) -> Path {
    Path::new(
        points
            .windows(2)
            .map(|w| Segment::line(Point::from(w[0]), Point::from(w[1])))
            .collect(),
    )
}

#[test]
fn test_subpaths_become_separate_paths() {
    let mut path = polyline_path(&[(0.0, 0.0), (10.0, 0.0)]);
    path.segments
        .extend(polyline_path(&[(20.0, 0.0), (30.0, 0.0), (30.0, 5.0)]).segments);

    let parts = path.split_discontinuous();
    assert_eq!(parts.len(), 2);
    assert_eq!(parts[0].len(), 1);
    assert_eq!(parts[1].len(), 2);
    assert_eq!(parts[1].end(), Some(Point::new(30.0, 5.0)));
}

proptest! {
    #[test]
    fn prop_split_parts_are_continuous(
        coords in prop::collection::vec((-100.0f64..100.0, -100.0f64..100.0), 2..12),
        jumps in prop::collection::vec(any::<bool>(), 12),
    ) {
        // Build a path whose segments either chain or jump to a fresh start.
        let mut segments = Vec::new();
        let mut cursor = Point::from(coords[0]);
        for (i, w) in coords.windows(2).enumerate() {
            let start = if jumps[i] { Point::new(w[0].0 + 500.0, w[0].1) } else { cursor };
            let end = Point::from(w[1]);
            segments.push(Segment::line(start, end));
            cursor = end;
        }
        let path = Path::new(segments.clone());

        let parts = path.split_discontinuous();
        let total: usize = parts.iter().map(Path::len).sum();
        prop_assert_eq!(total, segments.len());
        for part in &parts {
            prop_assert!(part.is_continuous());
            prop_assert!(!part.is_empty());
        }
    }
}
