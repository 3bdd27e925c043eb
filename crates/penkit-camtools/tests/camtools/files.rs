use penkit_camtools::{GcodeFileTools, InputSource, OutputTarget, SvgPlotter};
use penkit_core::{AppEvent, Error, EventBus, EventBusConfig, EventFilter, GcodeEvent, ValidationError};
use penkit_settings::Config;
use std::fs;
use std::sync::Arc;

const TALL_PROGRAM: &str = "G21
G90
G0 X0 Y0
M3 S255
G1 X100 Y0 F1500
G1 X100 Y200
G0 X100 Y100
G2 X0 Y100 I-50 J0
M5
";

fn history_bus() -> Arc<EventBus> {
    Arc::new(EventBus::with_config(EventBusConfig {
        enable_history: true,
        max_history_size: 16,
    }))
}

#[test]
fn rescale_file_into_directory() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("tall.gcode");
    fs::write(&input, TALL_PROGRAM).unwrap();

    let bus = history_bus();
    let tools = GcodeFileTools::new(Config::default())
        .unwrap()
        .with_event_bus(bus.clone());
    let (outcome, written) = tools
        .rescale(
            &InputSource::File(input),
            &OutputTarget::Directory(dir.path().join("out")),
            Some([50.0, 100.0]),
        )
        .unwrap();

    assert_eq!(outcome.factor, 0.5);
    let written = written.unwrap();
    assert_eq!(written, dir.path().join("out").join("tall_rescaled.gcode"));
    let content = fs::read_to_string(&written).unwrap();
    assert!(content.contains("G1 X50.000 Y0.000 F1500\n"));
    assert!(content.contains("G2 X0.000 Y50.000 I-25.000 J0.000\n"));

    assert_eq!(
        bus.history(),
        vec![AppEvent::Gcode(GcodeEvent::Rescaled {
            output: written,
            factor: 0.5
        })]
    );
}

#[test]
fn optimize_file_in_place_of_explicit_output() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("moves.gcode");
    let output = dir.path().join("moves_fast.gcode");
    fs::write(&input, "M5\nG1 X10 Y10\nM3 S255\nG1 X20 Y20\n").unwrap();
    fs::write(&output, "stale").unwrap();

    let (outcome, written) = GcodeFileTools::new(Config::default())
        .unwrap()
        .optimize(&InputSource::File(input), &OutputTarget::File(output.clone()))
        .unwrap();

    assert_eq!(outcome.stats.rewritten, 1);
    assert_eq!(written, Some(output.clone()));
    assert_eq!(
        fs::read_to_string(&output).unwrap(),
        "M5\nG0 X10 Y10\nM3 S255\nG1 X20 Y20\n"
    );
}

#[test]
fn rejected_program_leaves_no_output() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("bad.gcode");
    fs::write(&input, "G21\nhello\n").unwrap();
    let out_dir = dir.path().join("out");

    let bus = history_bus();
    let err = GcodeFileTools::new(Config::default())
        .unwrap()
        .with_event_bus(bus.clone())
        .optimize(&InputSource::File(input), &OutputTarget::Directory(out_dir.clone()))
        .unwrap_err();

    assert!(matches!(
        err,
        Error::Validation(ValidationError::InvalidGcodeLine { line_number: 2, .. })
    ));
    assert!(!out_dir.exists());
    assert!(matches!(bus.history().as_slice(), [AppEvent::Error(e)] if e.exit_code == 1));
}

#[test]
fn conversion_writes_unique_names() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("line.svg");
    fs::write(
        &input,
        r#"<svg viewBox="0 0 100 100" width="100mm"><path d="M10,10 L90,10"/></svg>"#,
    )
    .unwrap();

    let plotter = SvgPlotter::new(Config::default()).unwrap();
    let target = OutputTarget::Directory(dir.path().to_path_buf());
    let source = InputSource::File(input);
    let first = plotter.convert_to(&source, &target, |_, _| {}).unwrap();
    let second = plotter.convert_to(&source, &target, |_, _| {}).unwrap();

    assert_eq!(first.output, Some(dir.path().join("line.gcode")));
    assert_eq!(second.output, Some(dir.path().join("line_1.gcode")));
    assert_eq!(first.lines, second.lines);
}

#[test]
fn unsupported_input_maps_to_exit_code_three() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("drawing.png");
    fs::write(&input, "not an svg").unwrap();

    let bus = Arc::new(EventBus::new());
    let codes = Arc::new(std::sync::Mutex::new(Vec::new()));
    let sink = codes.clone();
    bus.subscribe(EventFilter::All, move |event| {
        if let AppEvent::Error(e) = event {
            sink.lock().unwrap().push(e.exit_code);
        }
    });

    let err = SvgPlotter::new(Config::default())
        .unwrap()
        .with_event_bus(bus)
        .convert_to(&InputSource::File(input), &OutputTarget::Stdout, |_, _| {})
        .unwrap_err();
    assert_eq!(err.exit_code(), 3);
    assert_eq!(*codes.lock().unwrap(), vec![3]);
}

#[test]
fn optimize_strips_generated_frame() {
    let dir = tempfile::tempdir().unwrap();
    let svg = dir.path().join("framed.svg");
    fs::write(
        &svg,
        r#"<svg viewBox="0 0 100 100" width="100mm"><path d="M10,10 L90,10"/></svg>"#,
    )
    .unwrap();
    let config = Config {
        draw_reference_frame: true,
        ..Config::default()
    };

    let report = SvgPlotter::new(config.clone())
        .unwrap()
        .convert_to(
            &InputSource::File(svg),
            &OutputTarget::Directory(dir.path().to_path_buf()),
            |_, _| {},
        )
        .unwrap();
    let generated = report.output.unwrap();

    let (outcome, _) = GcodeFileTools::new(config)
        .unwrap()
        .optimize(
            &InputSource::File(generated.clone()),
            &OutputTarget::File(dir.path().join("clean.gcode")),
        )
        .unwrap();

    assert_eq!(outcome.frame_lines_removed, 13);
    let before = fs::read_to_string(&generated).unwrap().lines().count();
    assert_eq!(outcome.lines.len(), before - 13);
    assert!(!outcome.lines.iter().any(|l| l == "G0 X0.000 Y0.000"));
}
