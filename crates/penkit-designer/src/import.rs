//! # SVG Import
//!
//! Reads an SVG document into [`SvgDocument`]: the root `viewBox`, `width`
//! and `height` attributes plus the geometry of every `<path>` element.
//! Other elements are ignored.
//!
//! Each `d` attribute is parsed by [`crate::path_data`] and split into
//! continuous paths, so a subpath introduced by a moveto becomes a path of
//! its own.

use crate::path_data::parse_path_data;
use penkit_core::{BoundingBox, Error, Length, Path, Result, ValidationError};
use regex::Regex;
use std::fs;
use std::path::Path as FsPath;
use std::str::FromStr;

/// The `viewBox` attribute: user-space window of the document
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl ViewBox {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// True unless both extents are strictly positive
    pub fn is_degenerate(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }

    /// Bounds covered by the viewBox in user units
    pub fn bounds(&self) -> BoundingBox {
        BoundingBox::new(self.x, self.y, self.x + self.width, self.y + self.height)
    }
}

impl FromStr for ViewBox {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let values: Vec<f64> = s
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|part| !part.is_empty())
            .map(|part| part.parse::<f64>().map_err(|_| format!("invalid number '{}'", part)))
            .collect::<std::result::Result<_, _>>()?;

        match values.as_slice() {
            [x, y, w, h] if values.iter().all(|v| v.is_finite()) => Ok(ViewBox::new(*x, *y, *w, *h)),
            [_, _, _, _] => Err("non-finite value".to_string()),
            _ => Err(format!("expected 4 numbers, found {}", values.len())),
        }
    }
}

/// An imported SVG document
#[derive(Debug, Clone, PartialEq)]
pub struct SvgDocument {
    /// File name or `<stdin>`, used in messages
    pub source_name: String,
    pub view_box: Option<ViewBox>,
    pub width: Option<Length>,
    pub height: Option<Length>,
    /// Continuous paths in document order
    pub paths: Vec<Path>,
}

impl SvgDocument {
    /// Total number of segments over all paths
    pub fn segment_count(&self) -> usize {
        self.paths.iter().map(Path::len).sum()
    }
}

/// SVG importer
///
/// Holds the compiled patterns; build once and reuse for many documents.
#[derive(Debug, Clone)]
pub struct SvgImporter {
    root_tag: Regex,
    path_tag: Regex,
    d_attr: Regex,
    view_box_attr: Regex,
    width_attr: Regex,
    height_attr: Regex,
}

impl SvgImporter {
    pub fn new() -> Result<Self> {
        Ok(Self {
            root_tag: compile(r"(?s)<svg\b([^>]*)>")?,
            path_tag: compile(r"(?s)<path\b([^>]*)>")?,
            d_attr: attribute_pattern("d")?,
            view_box_attr: attribute_pattern("viewBox")?,
            width_attr: attribute_pattern("width")?,
            height_attr: attribute_pattern("height")?,
        })
    }

    /// Import a file from disk
    ///
    /// Files with an extension other than `.svg` are rejected as unsupported.
    pub fn import_file(&self, path: &FsPath) -> Result<SvgDocument> {
        let display = path.display().to_string();

        if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
            if !ext.eq_ignore_ascii_case("svg") {
                return Err(ValidationError::UnsupportedInput {
                    path: display,
                    reason: format!("expected an .svg file, got .{}", ext),
                }
                .into());
            }
        }

        let content = fs::read_to_string(path).map_err(|e| ValidationError::UnreadableInput {
            path: display.clone(),
            reason: e.to_string(),
        })?;

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or(display);
        self.import_str(&content, &name)
    }

    /// Import a document held in memory
    pub fn import_str(&self, content: &str, source_name: &str) -> Result<SvgDocument> {
        let root = self
            .root_tag
            .captures(content)
            .and_then(|c| c.get(1))
            .ok_or_else(|| ValidationError::UnsupportedInput {
                path: source_name.to_string(),
                reason: "missing <svg> root element".to_string(),
            })?
            .as_str();

        let view_box = self.attribute(&self.view_box_attr, root).and_then(|raw| {
            raw.parse::<ViewBox>()
                .map_err(|e| {
                    tracing::warn!("{}: ignoring viewBox '{}': {}", source_name, raw, e);
                })
                .ok()
        });
        let width = self.length_attribute(&self.width_attr, root, "width", source_name);
        let height = self.length_attribute(&self.height_attr, root, "height", source_name);

        let mut paths = Vec::new();
        for (index, tag) in self.path_tag.captures_iter(content).enumerate() {
            let attrs = tag.get(1).map(|m| m.as_str()).unwrap_or_default();
            let Some(data) = self.attribute(&self.d_attr, attrs) else {
                tracing::debug!("{}: <path> #{} has no d attribute", source_name, index);
                continue;
            };

            let segments = parse_path_data(data).map_err(|e| ValidationError::MalformedPathData {
                source_name: source_name.to_string(),
                reason: format!("path #{}: {}", index, e),
            })?;
            if segments.is_empty() {
                continue;
            }
            paths.extend(Path::new(segments).split_discontinuous());
        }

        let document = SvgDocument {
            source_name: source_name.to_string(),
            view_box,
            width,
            height,
            paths,
        };
        tracing::debug!(
            "{}: {} paths, {} segments, viewBox {:?}, width {:?}",
            source_name,
            document.paths.len(),
            document.segment_count(),
            document.view_box,
            document.width
        );
        Ok(document)
    }

    fn attribute<'t>(&self, pattern: &Regex, tag: &'t str) -> Option<&'t str> {
        pattern
            .captures(tag)
            .and_then(|c| c.get(1).or_else(|| c.get(2)))
            .map(|m| m.as_str())
    }

    fn length_attribute(
        &self,
        pattern: &Regex,
        tag: &str,
        name: &str,
        source_name: &str,
    ) -> Option<Length> {
        let raw = self.attribute(pattern, tag)?;
        match raw.parse::<Length>() {
            Ok(length) => Some(length),
            Err(e) => {
                tracing::warn!("{}: ignoring {} '{}': {}", source_name, name, raw, e);
                None
            }
        }
    }
}

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|e| Error::other(format!("invalid pattern {}: {}", pattern, e)))
}

fn attribute_pattern(name: &str) -> Result<Regex> {
    compile(&format!(
        r#"(?:^|\s){}\s*=\s*(?:"([^"]*)"|'([^']*)')"#,
        regex::escape(name)
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use penkit_core::{LengthUnit, Point};

    fn importer() -> SvgImporter {
        SvgImporter::new().unwrap()
    }

    #[test]
    fn test_root_attributes() {
        let svg = r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 100 50" width="100mm" height='50mm'>
            <path d="M10,10 L90,10"/>
        </svg>"#;
        let doc = importer().import_str(svg, "line.svg").unwrap();

        assert_eq!(doc.view_box, Some(ViewBox::new(0.0, 0.0, 100.0, 50.0)));
        assert_eq!(doc.width, Some(Length::new(100.0, LengthUnit::Mm)));
        assert_eq!(doc.height, Some(Length::new(50.0, LengthUnit::Mm)));
        assert_eq!(doc.paths.len(), 1);
        assert_eq!(doc.paths[0].start(), Some(Point::new(10.0, 10.0)));
    }

    #[test]
    fn test_discontinuous_path_is_split() {
        let svg = r#"<svg><path d="M0,0 L10,0 M20,0 L30,0"/></svg>"#;
        let doc = importer().import_str(svg, "split.svg").unwrap();
        assert_eq!(doc.paths.len(), 2);
        assert_eq!(doc.view_box, None);
    }

    #[test]
    fn test_id_attribute_is_not_path_data() {
        let svg = r#"<svg><path id="x1" d="M0,0 L1,1"/><path id="empty"/></svg>"#;
        let doc = importer().import_str(svg, "ids.svg").unwrap();
        assert_eq!(doc.paths.len(), 1);
    }

    #[test]
    fn test_missing_root_is_unsupported() {
        let err = importer().import_str("<html></html>", "page.html").unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn test_malformed_path_names_source() {
        let err = importer()
            .import_str(r#"<svg><path d="M0 0 L5"/></svg>"#, "broken.svg")
            .unwrap_err();
        assert!(err.to_string().contains("broken.svg"));
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn test_bad_attributes_are_ignored() {
        let svg = r#"<svg viewBox="0 0 100" width="100%"><path d="M0,0 L1,1"/></svg>"#;
        let doc = importer().import_str(svg, "attrs.svg").unwrap();
        assert_eq!(doc.view_box, None);
        assert_eq!(doc.width, None);
    }

    #[test]
    fn test_view_box_parsing() {
        assert_eq!(
            "0,0,210,297".parse::<ViewBox>(),
            Ok(ViewBox::new(0.0, 0.0, 210.0, 297.0))
        );
        assert!("0 0 a 1".parse::<ViewBox>().is_err());
        assert!(ViewBox::new(0.0, 0.0, 0.0, 10.0).is_degenerate());
    }
}
