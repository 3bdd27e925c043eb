//! One invocation of the command: settings, mode selection, reporting

use crate::cli::{Cli, UsageError};
use crate::i18n::{self, Msg};
use anyhow::Context;
use penkit_camtools::{GcodeFileTools, InputSource, OutputTarget, SvgPlotter};
use penkit_core::{AppEvent, EventBus, EventCategory, EventFilter, SettingsEvent};
use penkit_settings::{Config, ConfigSource, Language, SettingsPersistence};
use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Exit codes
pub mod exit {
    pub const SUCCESS: u8 = 0;
    pub const VALIDATION: u8 = 1;
    pub const USAGE: u8 = 2;
    pub const UNSUPPORTED_INPUT: u8 = 3;
    pub const UNEXPECTED: u8 = 99;
}

/// What the invocation did
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Converted {
        source: String,
        strokes: usize,
        lines: usize,
        output: Option<PathBuf>,
    },
    Rescaled {
        factor: f64,
        output: Option<PathBuf>,
    },
    Optimized {
        rewritten: usize,
        rate: f64,
        output: Option<PathBuf>,
    },
    /// Only the settings were saved
    SettingsSaved(PathBuf),
}

/// Map a failure to its exit code
pub fn exit_code(error: &anyhow::Error) -> u8 {
    for cause in error.chain() {
        if let Some(e) = cause.downcast_ref::<penkit_core::Error>() {
            return match e.exit_code() {
                1 => exit::VALIDATION,
                3 => exit::UNSUPPORTED_INPUT,
                _ => exit::UNEXPECTED,
            };
        }
        if cause.downcast_ref::<UsageError>().is_some() {
            return exit::USAGE;
        }
        if cause.downcast_ref::<penkit_settings::SettingsError>().is_some() {
            return exit::VALIDATION;
        }
    }
    exit::UNEXPECTED
}

/// Language for messages printed before the settings are loaded
pub fn language_hint(cli: &Cli) -> Language {
    cli.lang.unwrap_or_default()
}

/// Settings with command-line overrides applied, and where they came from
pub fn load_settings(cli: &Cli) -> anyhow::Result<(Config, SettingsPersistence, ConfigSource)> {
    let persistence = match &cli.config {
        Some(path) => SettingsPersistence::new(path.clone()),
        None => match SettingsPersistence::at_default_location() {
            Ok(p) => p,
            Err(e) => {
                warn!("{}; using ./config.json", e);
                SettingsPersistence::new("config.json")
            }
        },
    };

    let (mut config, source) = persistence
        .load()
        .with_context(|| format!("loading settings from {}", persistence.path().display()))?;
    match source.path() {
        Some(path) => info!("Settings from {}", path.display()),
        None => debug!("Using built-in settings"),
    }

    if let Some(tool) = cli.tool {
        config.tool_type = tool;
    }
    if let Some(double_pass) = cli.double_pass() {
        config.pen_double_pass = double_pass;
    }
    if let Some(lang) = cli.lang {
        config.language = lang;
    }
    if let Some(preset) = &cli.surface_preset {
        config.apply_surface_preset(preset)?;
    }
    for fixed in config.sanitize() {
        warn!("{}", fixed);
    }
    Ok((config, persistence, source))
}

/// Run the command described by `cli`
///
/// Returns what was done and the configured message language.
pub fn run(cli: &Cli) -> anyhow::Result<(Outcome, Language)> {
    let (config, persistence, source) = load_settings(cli)?;
    let lang = config.language;
    execute(cli, config, persistence, source).map(|outcome| (outcome, lang))
}

fn execute(
    cli: &Cli,
    config: Config,
    persistence: SettingsPersistence,
    source: ConfigSource,
) -> anyhow::Result<Outcome> {
    let lang = config.language;

    let bus = Arc::new(EventBus::new());
    bus.subscribe(
        EventFilter::Categories(vec![
            EventCategory::Gcode,
            EventCategory::Settings,
            EventCategory::Error,
        ]),
        |event| debug!("event: {}", event.description()),
    );
    bus.publish(AppEvent::Settings(SettingsEvent::Loaded {
        path: source.path().map(|p| p.to_path_buf()),
    }));

    if cli.save_config {
        persistence.save(&config)?;
        let path = persistence.path().to_path_buf();
        bus.publish(AppEvent::Settings(SettingsEvent::Saved { path: path.clone() }));
        if cli.input.is_none() {
            return Ok(Outcome::SettingsSaved(path));
        }
    }

    let stdin = std::io::stdin();
    let mut prompts = stdin.lock();
    let input = resolve(cli.input.as_deref(), cli.interactive(), lang, Msg::PromptInput, &mut prompts)?
        .ok_or(UsageError::Missing("--input"))?;
    let output = resolve(cli.output.as_deref(), cli.interactive(), lang, Msg::PromptOutput, &mut prompts)?
        .ok_or(UsageError::Missing("--output"))?;
    drop(prompts);

    let input = InputSource::parse(&input);
    let output = OutputTarget::parse(&output);

    if cli.optimize {
        let tools = GcodeFileTools::new(config)?.with_event_bus(bus);
        let (outcome, written) = tools.optimize(&input, &output)?;
        return Ok(Outcome::Optimized {
            rewritten: outcome.stats.rewritten,
            rate: outcome.stats.rate(),
            output: written,
        });
    }

    if let Some(target) = cli.rescale {
        let tools = GcodeFileTools::new(config)?.with_event_bus(bus);
        let (outcome, written) = tools.rescale(&input, &output, Some(target))?;
        return Ok(Outcome::Rescaled {
            factor: outcome.factor,
            output: written,
        });
    }

    let plotter = SvgPlotter::new(config)?.with_event_bus(bus);
    let mut reported = 0;
    let report = plotter.convert_to(&input, &output, |current, total| {
        let percent = current * 100 / total.max(1);
        if percent >= reported + 10 || current == total {
            reported = percent;
            debug!("Ordering strokes: {}/{} ({}%)", current, total, percent);
        }
    })?;
    for warning in &report.warnings {
        eprintln!("{}: {}", i18n::text(lang, Msg::Warning), warning);
    }
    debug!("{}", serde_json::to_string(&report)?);

    Ok(Outcome::Converted {
        source: report.source,
        strokes: report.strokes,
        lines: report.lines,
        output: report.output,
    })
}

/// User-facing summary of an outcome
pub fn summary(outcome: &Outcome, lang: Language) -> String {
    let target = |output: &Option<PathBuf>| match output {
        Some(path) => path.display().to_string(),
        None => i18n::text(lang, Msg::Stdout).to_string(),
    };
    match outcome {
        Outcome::Converted {
            source,
            strokes,
            lines,
            output,
        } => i18n::format(lang, Msg::Converted, &[source, strokes, lines, &target(output)]),
        Outcome::Rescaled { factor, output } => {
            i18n::format(lang, Msg::Rescaled, &[factor, &target(output)])
        }
        Outcome::Optimized {
            rewritten,
            rate,
            output,
        } => i18n::format(
            lang,
            Msg::Optimized,
            &[rewritten, &format!("{:.1}", rate * 100.0), &target(output)],
        ),
        Outcome::SettingsSaved(path) => {
            i18n::format(lang, Msg::SettingsSaved, &[&path.display()])
        }
    }
}

/// A value from the command line, or asked for on stdin
fn resolve<R: BufRead>(
    given: Option<&str>,
    interactive: bool,
    lang: Language,
    prompt: Msg,
    reader: &mut R,
) -> anyhow::Result<Option<String>> {
    if let Some(value) = given {
        return Ok(Some(value.to_string()));
    }
    if !interactive {
        return Ok(None);
    }

    let mut stderr = std::io::stderr();
    write!(stderr, "{}", i18n::text(lang, prompt))?;
    stderr.flush()?;

    let mut line = String::new();
    reader.read_line(&mut line).context("reading from stdin")?;
    let value = line.trim();
    Ok((!value.is_empty()).then(|| value.to_string()))
}
