use penkit_camtools::SvgPlotter;
use penkit_gcode::{parse_line, program_bounds, BorderExcision, GcodeValidator, Opcode};
use penkit_core::BoundingBox;
use penkit_settings::Config;

fn svg(body: &str) -> String {
    format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 100 100" width="100mm">{}</svg>"#,
        body
    )
}

fn convert(config: Config, body: &str) -> Vec<String> {
    SvgPlotter::new(config)
        .unwrap()
        .convert_str(&svg(body), "test.svg", |_, _| {})
        .unwrap()
        .lines
}

fn position(lines: &[String], wanted: &str) -> usize {
    lines
        .iter()
        .position(|l| l == wanted)
        .unwrap_or_else(|| panic!("missing '{}' in {:#?}", wanted, lines))
}

fn arcs(lines: &[String]) -> usize {
    lines
        .iter()
        .filter(|l| parse_line(l).ok().and_then(|p| p.opcode().map(Opcode::is_arc)) == Some(true))
        .count()
}

fn draws(lines: &[String]) -> Vec<&String> {
    lines.iter().filter(|l| l.starts_with("G1 ")).collect()
}

#[test]
fn single_line_in_millimeters() {
    let lines = convert(Config::default(), r#"<path d="M10,10 L90,10"/>"#);

    let rapid = position(&lines, "G0 X10.000 Y10.000");
    let down = position(&lines, "M3 S255");
    let draw = position(&lines, "G1 X90.000 Y10.000 F1500");
    let up = position(&lines, "M5");
    assert!(rapid < down && down < draw && draw < up);

    assert_eq!(draws(&lines).len(), 1);
    assert_eq!(arcs(&lines), 0);
}

#[test]
fn svg_border_is_filtered() {
    let mut config = Config::default();
    config.sampling.detect_primitives = false;
    config.compression.use_arcs = false;
    config.feed_curvature.curvature_factor = 0.0;

    let lines = convert(
        config,
        r#"<path d="M0,0 L100,0 L100,100 L0,100 Z"/><path d="M20,20 L80,20 L50,70 Z"/>"#,
    );

    assert_eq!(lines.iter().filter(|l| *l == "M3 S255").count(), 1);
    assert_eq!(
        program_bounds(&lines),
        Some(BoundingBox::new(20.0, 20.0, 80.0, 70.0))
    );
    // y is flipped about the drawing's center line
    position(&lines, "G0 X20.000 Y70.000");
    let last = draws(&lines).last().unwrap().to_string();
    assert!(last.starts_with("G1 X20.000 Y70.000"), "{}", last);
}

#[test]
fn discontinuous_path_becomes_two_strokes() {
    let lines = convert(Config::default(), r#"<path d="M0,0 L10,0 M20,0 L30,0"/>"#);

    assert_eq!(lines.iter().filter(|l| *l == "M3 S255").count(), 2);
    assert_eq!(lines.iter().filter(|l| *l == "M5").count(), 2);

    let first_up = position(&lines, "M5");
    let hop = position(&lines, "G0 X20.000 Y0.000");
    assert!(first_up < hop);
}

#[test]
fn straight_run_collapses() {
    let body = r#"<path d="M0,0 L5,0 L10,0 L15,0"/>"#;
    let lines = convert(Config::default(), body);
    let drawn = draws(&lines);
    assert_eq!(drawn.len(), 1);
    assert!(drawn[0].starts_with("G1 X15.000 Y0.000"));

    let mut uncompressed = Config::default();
    uncompressed.compression.enabled = false;
    let lines = convert(uncompressed, body);
    assert!(draws(&lines).len() > 1);
}

#[test]
fn reference_frame_round_trip() {
    let config = Config {
        draw_reference_frame: true,
        ..Config::default()
    };
    let lines = convert(config.clone(), r#"<path d="M10,10 L90,10"/>"#);
    assert!(GcodeValidator::new().unwrap().validate(&lines).is_ok());

    let (kept, removed) = BorderExcision::new(&config.cmd_up, &config.cmd_down).excise(&lines);
    assert_eq!(removed, 13);
    assert_eq!(
        program_bounds(&kept),
        Some(BoundingBox::new(10.0, 10.0, 90.0, 10.0))
    );
}

#[test]
fn oversized_drawing_is_clamped() {
    let mut config = Config::default();
    config.plotter_max_area_mm = [50.0, 50.0];
    config.target_write_area_mm = [50.0, 50.0];

    let conversion = SvgPlotter::new(config)
        .unwrap()
        .convert_str(&svg(r#"<path d="M0,0 L100,0"/>"#), "wide.svg", |_, _| {})
        .unwrap();
    assert!(conversion.report.clamped);
    assert!((conversion.report.factor - 0.5).abs() < 1e-9);
    let bounds = program_bounds(&conversion.lines).unwrap();
    assert!(bounds.max_x <= 50.0 + 1e-6);
}
