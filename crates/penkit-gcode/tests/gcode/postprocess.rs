use penkit_core::{BoundingBox, Error, Point, ValidationError};
use penkit_gcode::{
    program_bounds, to_lines, BorderExcision, BuilderConfig, GcodeBuilder, GcodeValidator,
    Rescaler, TravelReducer,
};

fn framed_program() -> Vec<String> {
    let mut builder = GcodeBuilder::new(BuilderConfig::default());
    builder
        .preamble()
        .reference_frame(120.0, 80.0)
        .stroke(&[Point::new(10.0, 10.0), Point::new(40.0, 10.0)])
        .stroke(&[Point::new(50.0, 20.0), Point::new(50.0, 60.0)]);
    to_lines(&builder.finish())
}

#[test]
fn rescale_halves_a_tall_program() {
    let input = [
        "G21",
        "G90",
        "G0 X0 Y0",
        "M3 S255",
        "G1 X100 Y0 F1500",
        "G1 X100 Y200",
        "G0 X100 Y100",
        "G2 X0 Y100 I-50 J0",
        "M5",
    ];
    let rescaler = Rescaler::new((50.0, 100.0), (300.0, 420.0)).unwrap();
    let out = rescaler.rescale(&input).unwrap();

    assert_eq!(out.factor, 0.5);
    assert_eq!(out.lines[4], "G1 X50.000 Y0.000 F1500");
    assert_eq!(out.lines[7], "G2 X0.000 Y50.000 I-25.000 J0.000");
    assert_eq!(out.lines[3], "M3 S255");
    assert!(out.after.width() <= 50.0 + 1e-9 && out.after.height() <= 100.0 + 1e-9);
    assert!(GcodeValidator::new().unwrap().validate(&out.lines).is_ok());
}

#[test]
fn rescale_rejects_programs_without_motion() {
    let rescaler = Rescaler::new((50.0, 100.0), (300.0, 420.0)).unwrap();
    assert!(matches!(
        rescaler.rescale(&["G21", "M5"]),
        Err(Error::Validation(ValidationError::EmptyProgram))
    ));
}

#[test]
fn travel_reduction_rewrites_one_move() {
    let reducer = TravelReducer::new("M5", "M3 S255");
    let (out, stats) = reducer.reduce(&["M5", "G1 X10 Y10", "M3 S255", "G1 X20 Y20"]);
    assert_eq!(out.join("\n"), "M5\nG0 X10 Y10\nM3 S255\nG1 X20 Y20");
    assert_eq!(stats.rewritten, 1);
}

#[test]
fn generated_frame_is_excised() {
    let lines = framed_program();
    let excision = BorderExcision::new("M5", "M3 S255");
    let (kept, removed) = excision.excise(&lines);
    assert_eq!(removed, 13);

    let bbox = program_bounds(&kept).unwrap();
    assert_eq!(bbox, BoundingBox::new(10.0, 10.0, 50.0, 60.0));
    assert_eq!(kept.iter().filter(|l| *l == "M3 S255").count(), 2);
}

#[test]
fn unframed_program_is_untouched() {
    let mut builder = GcodeBuilder::new(BuilderConfig::default());
    builder
        .preamble()
        .stroke(&[Point::new(10.0, 10.0), Point::new(40.0, 10.0)]);
    let lines = to_lines(&builder.finish());
    let (kept, removed) = BorderExcision::new("M5", "M3 S255").excise(&lines);
    assert_eq!(removed, 0);
    assert_eq!(kept, lines);
}
