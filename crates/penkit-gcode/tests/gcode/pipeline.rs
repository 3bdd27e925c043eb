use penkit_core::Point;
use penkit_gcode::{
    parse_line, to_lines, BuilderConfig, ChainConfig, FeedSelector, GcodeBuilder, GcodeCommand,
    GcodeValidator, Opcode, OptimizerChain,
};

fn p(x: f64, y: f64) -> Point {
    Point::new(x, y)
}

fn build(strokes: &[Vec<Point>]) -> Vec<GcodeCommand> {
    let mut builder = GcodeBuilder::new(BuilderConfig::default());
    builder.preamble();
    for stroke in strokes {
        builder.stroke(stroke);
    }
    builder.finish()
}

fn arcs(lines: &[String]) -> usize {
    lines
        .iter()
        .filter(|l| parse_line(l).ok().and_then(|p| p.opcode().map(Opcode::is_arc)) == Some(true))
        .count()
}

fn count(lines: &[String], wanted: &str) -> usize {
    lines.iter().filter(|l| *l == wanted).count()
}

#[test]
fn single_line_draws_once() {
    let commands = build(&[vec![p(10.0, 10.0), p(90.0, 10.0)]]);
    let optimized = OptimizerChain::standard(&ChainConfig::default()).run(commands);
    assert!(optimized.metrics.is_empty());

    let lines = to_lines(&optimized.commands);
    let rapid = lines.iter().position(|l| l == "G0 X10.000 Y10.000").unwrap();
    let down = lines.iter().position(|l| l == "M3 S255").unwrap();
    let draw = lines.iter().position(|l| l == "G1 X90.000 Y10.000 F1500").unwrap();
    let up = lines.iter().position(|l| l == "M5").unwrap();
    assert!(rapid < down && down < draw && draw < up);
    assert!(lines.iter().any(|l| l == "G21"));
    assert_eq!(arcs(&lines), 0);
}

#[test]
fn disjoint_strokes_cycle_the_tool_twice() {
    let commands = build(&[
        vec![p(0.0, 0.0), p(10.0, 0.0)],
        vec![p(20.0, 0.0), p(30.0, 0.0)],
    ]);
    let lines = to_lines(&OptimizerChain::standard(&ChainConfig::default()).run(commands).commands);

    assert_eq!(count(&lines, "M3 S255"), 2);
    assert_eq!(count(&lines, "M5"), 2);

    let first_draw = lines.iter().position(|l| l.starts_with("G1 X10.000 Y0.000")).unwrap();
    let hop = lines.iter().position(|l| l == "G0 X20.000 Y0.000").unwrap();
    let second_down = lines.iter().rposition(|l| l == "M3 S255").unwrap();
    assert!(first_draw < hop && hop < second_down);
}

#[test]
fn straight_run_collapses_to_endpoints() {
    let commands = build(&[vec![p(0.0, 0.0), p(5.0, 0.0), p(10.0, 0.0), p(15.0, 0.0)]]);
    let optimized = OptimizerChain::standard(&ChainConfig::default()).run(commands);

    let draws: Vec<&GcodeCommand> = optimized.commands.iter().filter(|c| c.is_draw()).collect();
    assert_eq!(draws.len(), 1);
    assert_eq!(draws[0].end_point(), Some(p(15.0, 0.0)));
    assert_eq!(optimized.metrics.segments_removed, 2);
}

#[test]
fn generated_programs_validate() {
    let config = BuilderConfig {
        relative_moves: true,
        double_pass: true,
        return_home: true,
        ..BuilderConfig::default()
    };
    let mut builder = GcodeBuilder::new(config);
    builder
        .preamble()
        .reference_frame(200.0, 150.0)
        .stroke(&[p(10.0, 10.0), p(20.0, 15.0), p(30.0, 10.0)])
        .stroke(&[p(50.0, 50.0), p(60.0, 60.0)]);
    let lines = to_lines(&builder.finish());

    let validator = GcodeValidator::new().unwrap();
    assert_eq!(validator.validate(&lines), Ok(()));
}

#[test]
fn arcs_survive_validation() {
    let points: Vec<Point> = (0..3)
        .map(|k| {
            let a = k as f64 * 0.1;
            p(50.0 + 10.0 * a.cos(), 50.0 + 10.0 * a.sin())
        })
        .collect();
    // constant feed so both moves share one
    let mut builder = GcodeBuilder::new(BuilderConfig {
        feed: FeedSelector::new(1500.0).with_curvature(0.0, 0.4),
        ..BuilderConfig::default()
    });
    builder.stroke(&points);
    let optimized = OptimizerChain::standard(&ChainConfig::default()).run(builder.finish());
    assert_eq!(optimized.metrics.arcs_created, 1);
    let metrics = serde_json::to_value(optimized.metrics).unwrap();
    assert_eq!(metrics["arcs_created"], 1);

    let lines = to_lines(&optimized.commands);
    assert!(lines.iter().any(|l| l.starts_with("G3 ")));
    assert_eq!(arcs(&lines), 1);
    assert!(GcodeValidator::new().unwrap().validate(&lines).is_ok());
}
