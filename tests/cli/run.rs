use clap::Parser;
use penkit::app::{self, exit, Outcome};
use penkit::Cli;
use std::fs;
use std::path::Path;

fn cli(config_dir: &Path, args: &[&str]) -> Cli {
    let config = config_dir.join("config.json");
    let mut argv = vec!["penkit", "--config", config.to_str().unwrap()];
    argv.extend_from_slice(args);
    Cli::try_parse_from(argv).unwrap()
}

#[test]
fn batch_conversion_into_directory() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("line.svg");
    fs::write(
        &input,
        r#"<svg viewBox="0 0 100 100" width="100mm"><path d="M10,10 L90,10"/></svg>"#,
    )
    .unwrap();
    let out = dir.path().join("out");

    let args = cli(
        dir.path(),
        &[
            "--no-interactive",
            "--input",
            input.to_str().unwrap(),
            "--output",
            &format!("{}/", out.display()),
        ],
    );
    let (outcome, _) = app::run(&args).unwrap();

    let written = out.join("line.gcode");
    assert_eq!(
        outcome,
        Outcome::Converted {
            source: "line.svg".to_string(),
            strokes: 1,
            lines: fs::read_to_string(&written).unwrap().lines().count(),
            output: Some(written.clone()),
        }
    );
}

#[test]
fn batch_rescale() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("square.gcode");
    fs::write(&input, "G21\nG90\nG0 X0 Y0\nM3 S255\nG1 X100 Y0 F1500\nG1 X100 Y100\nM5\n").unwrap();
    let output = dir.path().join("small.gcode");

    let args = cli(
        dir.path(),
        &[
            "--no-interactive",
            "--input",
            input.to_str().unwrap(),
            "--output",
            output.to_str().unwrap(),
            "--rescale",
            "25",
        ],
    );
    let (outcome, lang) = app::run(&args).unwrap();
    assert_eq!(
        outcome,
        Outcome::Rescaled {
            factor: 0.25,
            output: Some(output.clone()),
        }
    );
    assert!(fs::read_to_string(&output)
        .unwrap()
        .contains("G1 X25.000 Y25.000"));
    assert!(app::summary(&outcome, lang).starts_with("Rescaled by 0.2500"));
}

#[test]
fn invalid_program_exits_with_one() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("bad.gcode");
    fs::write(&input, "G21\nT2\n").unwrap();

    let args = cli(
        dir.path(),
        &[
            "--no-interactive",
            "--optimize",
            "--input",
            input.to_str().unwrap(),
            "--output",
            "-",
        ],
    );
    let err = app::run(&args).unwrap_err();
    assert_eq!(app::exit_code(&err), exit::VALIDATION);
}

#[test]
fn unknown_preset_exits_with_one() {
    let dir = tempfile::tempdir().unwrap();
    let args = cli(dir.path(), &["--surface-preset", "napkin", "--save-config"]);
    let err = app::run(&args).unwrap_err();
    assert_eq!(app::exit_code(&err), exit::VALIDATION);
}

#[test]
fn save_config_only() {
    let dir = tempfile::tempdir().unwrap();
    let args = cli(dir.path(), &["--save-config", "--tool", "marker", "--lang", "es"]);
    let (outcome, lang) = app::run(&args).unwrap();

    let path = dir.path().join("config.json");
    assert_eq!(outcome, Outcome::SettingsSaved(path.clone()));
    assert_eq!(lang, penkit_settings::Language::Es);

    let saved = penkit_settings::Config::load_from_file(&path).unwrap();
    assert_eq!(saved.tool_type, penkit_settings::ToolType::Marker);
}
