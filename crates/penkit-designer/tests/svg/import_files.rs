use penkit_core::{Error, ValidationError};
use penkit_designer::SvgImporter;
use std::fs;
use tempfile::TempDir;

const LINE_SVG: &str =
    r#"<svg viewBox="0 0 100 100" width="100mm"><path d="M10,10 L90,10"/></svg>"#;

#[test]
fn test_import_file_uses_file_name() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("line.svg");
    fs::write(&path, LINE_SVG).unwrap();

    let doc = SvgImporter::new().unwrap().import_file(&path).unwrap();
    assert_eq!(doc.source_name, "line.svg");
    assert_eq!(doc.paths.len(), 1);
}

#[test]
fn test_uppercase_extension_accepted() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("LINE.SVG");
    fs::write(&path, LINE_SVG).unwrap();
    assert!(SvgImporter::new().unwrap().import_file(&path).is_ok());
}

#[test]
fn test_missing_file_is_unreadable() {
    let dir = TempDir::new().unwrap();
    let err = SvgImporter::new()
        .unwrap()
        .import_file(&dir.path().join("absent.svg"))
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Validation(ValidationError::UnreadableInput { .. })
    ));
    assert_eq!(err.exit_code(), 1);
}

#[test]
fn test_other_extension_is_unsupported() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("drawing.dxf");
    fs::write(&path, "0\nSECTION\n").unwrap();
    let err = SvgImporter::new().unwrap().import_file(&path).unwrap_err();
    assert_eq!(err.exit_code(), 3);
}

#[test]
fn test_multiple_path_elements_keep_document_order() {
    let svg = r#"<svg viewBox="0 0 10 10">
        <g><path d="M1,1 L2,2"/></g>
        <path
            d="M5,5 l1,0 l0,1 z"
            fill="none"/>
    </svg>"#;
    let doc = SvgImporter::new().unwrap().import_str(svg, "two.svg").unwrap();
    assert_eq!(doc.paths.len(), 2);
    assert_eq!(doc.paths[1].len(), 3);
    assert!(doc.paths[1].is_closed());
}
