use penkit_core::Point;
use penkit_gcode::{to_lines, BorderExcision, BuilderConfig, GcodeBuilder, Rescaler, TravelReducer};
use proptest::prelude::*;

fn line() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("M5".to_string()),
        Just("M3 S255".to_string()),
        Just("G4 P0.150".to_string()),
        Just("; note".to_string()),
        (0.0f64..100.0, 0.0f64..100.0).prop_map(|(x, y)| format!("G1 X{:.3} Y{:.3}", x, y)),
        (0.0f64..100.0, 0.0f64..100.0).prop_map(|(x, y)| format!("G01 X{:.3} Y{:.3} F900", x, y)),
        (0.0f64..100.0, 0.0f64..100.0).prop_map(|(x, y)| format!("G0 X{:.3} Y{:.3}", x, y)),
    ]
}

proptest! {
    #[test]
    fn travel_reduction_is_idempotent(lines in prop::collection::vec(line(), 0..40)) {
        let reducer = TravelReducer::new("M5", "M3 S255");
        let (once, first) = reducer.reduce(&lines);
        let (twice, second) = reducer.reduce(&once);
        prop_assert_eq!(&once, &twice);
        prop_assert_eq!(second.rewritten, 0);
        prop_assert_eq!(once.len(), lines.len());
        prop_assert!(first.rewritten <= first.linear_moves);
    }

    #[test]
    fn unit_factor_leaves_text_alone(lines in prop::collection::vec(line(), 0..40)) {
        let rescaler = Rescaler::new((100.0, 100.0), (300.0, 300.0)).unwrap();
        prop_assert_eq!(rescaler.apply(&lines, 1.0), lines);
    }

    #[test]
    fn excision_without_frame_removes_nothing(
        strokes in prop::collection::vec(
            prop::collection::vec((0.0f64..100.0, 0.0f64..100.0), 2..6),
            0..5,
        )
    ) {
        let mut builder = GcodeBuilder::new(BuilderConfig::default());
        builder.preamble();
        for s in &strokes {
            let points: Vec<Point> = s.iter().map(|&(x, y)| Point::new(x, y)).collect();
            builder.stroke(&points);
        }
        let lines = to_lines(&builder.finish());
        let (kept, removed) = BorderExcision::new("M5", "M3 S255").excise(&lines);
        prop_assert_eq!(removed, 0);
        prop_assert_eq!(kept, lines);
    }
}
