//! SVG to pen-plotter G-code conversion
//!
//! Runs the whole pipeline for one document:
//!
//! ```text
//! scale ─ filter ─ strokes ─ placement ─ ordering ─ builder ─ optimizer chain ─ validate
//! ```
//!
//! Progress is reported while strokes are ordered, which dominates the run
//! time on large drawings.

use crate::mapping;
use crate::output::{InputSource, OutputTarget};
use penkit_core::{
    AppEvent, BoundingBox, ConversionEvent, ErrorEvent, EventBus, GcodeEvent, Polyline,
    Result, ValidationError,
};
use penkit_designer::{
    apply_order, greedy_order, length_weighted_order, place_strokes, travel_distance,
    DocumentScale, PathFilter, Rejection, StrokeBuilder, SvgDocument, SvgImporter,
};
use penkit_gcode::{
    to_lines, GcodeBuilder, GcodeValidator, OptimizationMetrics, OptimizerChain, ProgramHeader,
};
use penkit_settings::{Config, OrderingStrategy};
use serde::Serialize;
use std::path::{Path as FsPath, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// What a conversion did
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConversionReport {
    /// Name of the source document
    pub source: String,
    /// Written file, `None` for stdout or in-memory conversions
    pub output: Option<PathBuf>,
    /// Continuous paths in the document
    pub paths_total: usize,
    /// Paths left after filtering
    pub paths_kept: usize,
    /// Whether the viewBox border was dropped
    pub border_removed: bool,
    /// Strokes drawn
    pub strokes: usize,
    /// Strokes recognized as circles, rectangles or ellipses
    pub primitives: usize,
    /// Lines in the final program
    pub lines: usize,
    /// Millimeters per document unit after placement
    pub mm_per_unit: f64,
    /// Factor applied on top of the document scale
    pub factor: f64,
    /// Whether the plotter envelope forced the drawing down
    pub clamped: bool,
    /// Drawing bounds on the plotter bed
    pub bounds: Option<BoundingBox>,
    /// Pen-up travel in document order, millimeters
    pub travel_before_mm: f64,
    /// Pen-up travel after ordering, millimeters
    pub travel_after_mm: f64,
    /// Optimizer chain counters
    pub metrics: OptimizationMetrics,
    /// Recoverable problems met along the way
    pub warnings: Vec<String>,
}

/// A converted program and its report
#[derive(Debug, Clone)]
pub struct Conversion {
    pub lines: Vec<String>,
    pub report: ConversionReport,
}

/// Converts SVG documents into plotter programs
pub struct SvgPlotter {
    config: Config,
    importer: SvgImporter,
    validator: GcodeValidator,
    events: Option<Arc<EventBus>>,
}

impl SvgPlotter {
    /// Create a plotter for `config`
    ///
    /// Invalid settings are replaced by their defaults with a warning.
    pub fn new(mut config: Config) -> Result<Self> {
        for fixed in config.sanitize() {
            warn!("{}", fixed);
        }
        Ok(Self {
            config,
            importer: SvgImporter::new()?,
            validator: GcodeValidator::new()?,
            events: None,
        })
    }

    /// Publish conversion events on `bus`
    pub fn with_event_bus(mut self, bus: Arc<EventBus>) -> Self {
        self.events = Some(bus);
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    fn publish(&self, event: AppEvent) {
        if let Some(bus) = &self.events {
            bus.publish(event);
        }
    }

    /// Convert an imported document
    ///
    /// `progress(current, total)` is called while strokes are ordered.
    pub fn convert_document<F>(&self, doc: SvgDocument, mut progress: F) -> Result<Conversion>
    where
        F: FnMut(usize, usize),
    {
        let config = &self.config;
        let mut warnings = Vec::new();

        let (scale, scale_warning) = DocumentScale::from_document(&doc);
        if let Some(w) = scale_warning {
            warn!("{}", w);
            warnings.push(w);
        }

        let paths_total = doc.paths.len();
        let filtered = PathFilter::new()
            .with_svg_border_removal(config.remove_svg_border, config.border_detection_tolerance)
            .apply(doc.paths, doc.view_box.as_ref());
        let border_removed = filtered.count(Rejection::SvgBorder) > 0;
        let paths = filtered.kept;
        debug!("{} of {} paths kept", paths.len(), paths_total);
        if paths.is_empty() {
            return Err(ValidationError::EmptyProgram.into());
        }

        // Spacings are chosen before placement, so the final size is
        // predicted from the raw bounds
        let placement = mapping::placement(config);
        let predicted = paths
            .iter()
            .filter_map(|p| p.bounding_box())
            .reduce(|a, b| a.union(&b))
            .map(|bbox| {
                let (w, h) = placement.oriented_size(
                    bbox.width() * scale.mm_per_unit,
                    bbox.height() * scale.mm_per_unit,
                );
                placement.factor_for(w, h).0
            })
            .unwrap_or(1.0);
        let params = mapping::sampling_params(config, scale.mm_per_unit * predicted);

        let strokes = StrokeBuilder::new(params)
            .with_detection(mapping::detector(config))
            .build_all(&paths);
        let primitives = strokes.iter().filter(|s| s.primitive.is_some()).count();
        let mut polylines: Vec<Polyline> = strokes
            .into_iter()
            .map(|s| s.polyline)
            .filter(|p| p.len() >= 2)
            .collect();
        if polylines.is_empty() {
            return Err(ValidationError::EmptyProgram.into());
        }

        let placed = place_strokes(&mut polylines, &scale, &placement);
        warnings.extend(placed.warnings.iter().cloned());

        let travel_before_mm = travel_distance(&polylines);
        let total = polylines.len();
        let order = match config.ordering {
            OrderingStrategy::None => {
                progress(total, total);
                (0..total).collect()
            }
            OrderingStrategy::Greedy => greedy_order(&polylines, &mut progress),
            OrderingStrategy::LengthWeighted => length_weighted_order(&polylines, &mut progress),
        };
        let polylines = apply_order(polylines, &order);
        let travel_after_mm = travel_distance(&polylines);
        debug!(
            "Travel {:.1} mm -> {:.1} mm ({:?})",
            travel_before_mm, travel_after_mm, config.ordering
        );

        let mut builder = GcodeBuilder::new(mapping::builder_config(config));
        builder.header(&ProgramHeader {
            source: doc.source_name.clone(),
            strokes: polylines.len(),
            scale: placed.mm_per_unit,
        });
        if config.draw_reference_frame {
            let [w, h] = config.target_write_area_mm;
            builder.reference_frame(w, h);
        }
        builder.strokes(&polylines);
        let drawn = builder.stroke_count();
        let commands = builder.finish();

        let optimized = OptimizerChain::standard(&mapping::chain_config(config)).run(commands);
        let lines = to_lines(&optimized.commands);
        self.validator.validate(&lines)?;

        info!(
            "{}: {} strokes, {} lines ({})",
            doc.source_name,
            drawn,
            lines.len(),
            optimized.metrics
        );

        let report = ConversionReport {
            source: doc.source_name,
            output: None,
            paths_total,
            paths_kept: paths.len(),
            border_removed,
            strokes: drawn,
            primitives,
            lines: lines.len(),
            mm_per_unit: placed.mm_per_unit,
            factor: placed.factor,
            clamped: placed.clamped,
            bounds: placed.bounds,
            travel_before_mm,
            travel_after_mm,
            metrics: optimized.metrics,
            warnings,
        };
        Ok(Conversion { lines, report })
    }

    /// Convert SVG text
    pub fn convert_str<F>(&self, content: &str, source_name: &str, progress: F) -> Result<Conversion>
    where
        F: FnMut(usize, usize),
    {
        let doc = self.importer.import_str(content, source_name)?;
        self.convert_document(doc, progress)
    }

    /// Convert an SVG file
    pub fn convert_file<F>(&self, path: &FsPath, progress: F) -> Result<Conversion>
    where
        F: FnMut(usize, usize),
    {
        let doc = self.importer.import_file(path)?;
        self.convert_document(doc, progress)
    }

    /// Convert `input` and write the program to `output`
    ///
    /// Publishes started, progress and generated events, or an error event
    /// when the conversion fails.
    pub fn convert_to<F>(
        &self,
        input: &InputSource,
        output: &OutputTarget,
        mut progress: F,
    ) -> Result<ConversionReport>
    where
        F: FnMut(usize, usize),
    {
        let source = input.display_name();
        self.publish(AppEvent::Conversion(ConversionEvent::Started {
            source: source.clone(),
        }));

        let result = self.run(input, output, |current, total| {
            self.publish(AppEvent::Conversion(ConversionEvent::Progress { current, total }));
            progress(current, total);
        });

        match &result {
            Ok(report) => self.publish(AppEvent::Gcode(GcodeEvent::Generated {
                source,
                output: report.output.clone().unwrap_or_else(|| PathBuf::from("-")),
                lines: report.lines,
                strokes: report.strokes,
            })),
            Err(e) => self.publish(AppEvent::Error(ErrorEvent {
                message: e.to_string(),
                exit_code: e.exit_code(),
            })),
        }
        result
    }

    fn run<F>(&self, input: &InputSource, output: &OutputTarget, progress: F) -> Result<ConversionReport>
    where
        F: FnMut(usize, usize),
    {
        let conversion = match input {
            InputSource::File(path) => self.convert_file(path, progress)?,
            InputSource::Stdin => {
                let content = input.read_to_string()?;
                self.convert_str(&content, &input.display_name(), progress)?
            }
        };
        let mut report = conversion.report;
        report.output = output.write(&conversion.lines, &input.stem())?;
        if let Some(path) = &report.output {
            info!("Wrote {}", path.display());
        }
        Ok(report)
    }
}

impl std::fmt::Debug for SvgPlotter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SvgPlotter")
            .field("config", &self.config)
            .field("events", &self.events.is_some())
            .finish()
    }
}
