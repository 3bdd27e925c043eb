use penkit_core::Point;
use penkit_gcode::{
    to_lines, BuilderConfig, ChainConfig, GcodeBuilder, GcodeValidator, OptimizerChain,
};
use proptest::prelude::*;

fn stroke() -> impl Strategy<Value = Vec<Point>> {
    prop::collection::vec((0.0f64..200.0, 0.0f64..200.0), 2..12)
        .prop_map(|pts| pts.into_iter().map(|(x, y)| Point::new(x, y)).collect())
}

fn program(strokes: &[Vec<Point>]) -> Vec<penkit_gcode::GcodeCommand> {
    let mut builder = GcodeBuilder::new(BuilderConfig::default());
    builder.preamble();
    for s in strokes {
        builder.stroke(s);
    }
    builder.finish()
}

proptest! {
    #[test]
    fn chain_never_lengthens(strokes in prop::collection::vec(stroke(), 1..6), plan in any::<bool>()) {
        let commands = program(&strokes);
        let config = ChainConfig { plan_paths: plan, ..ChainConfig::default() };
        let optimized = OptimizerChain::standard(&config).run(commands.clone());
        prop_assert!(optimized.commands.len() <= commands.len());
    }

    #[test]
    fn optimized_programs_validate(strokes in prop::collection::vec(stroke(), 1..6)) {
        let optimized = OptimizerChain::standard(&ChainConfig::default()).run(program(&strokes));
        let validator = GcodeValidator::new().unwrap();
        prop_assert!(validator.validate(&to_lines(&optimized.commands)).is_ok());
    }

    #[test]
    fn tool_changes_stay_balanced(strokes in prop::collection::vec(stroke(), 1..6)) {
        let lines = to_lines(&OptimizerChain::standard(&ChainConfig::default()).run(program(&strokes)).commands);
        let downs = lines.iter().filter(|l| *l == "M3 S255").count();
        let ups = lines.iter().filter(|l| *l == "M5").count();
        prop_assert_eq!(downs, ups);
    }
}
