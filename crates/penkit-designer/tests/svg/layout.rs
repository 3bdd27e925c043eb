use penkit_core::{Point, Polyline};
use penkit_designer::{
    greedy_order, place_strokes, DocumentScale, PathFilter, Placement, SamplingParams,
    StrokeBuilder, SvgImporter,
};

fn strokes_for(svg: &str, placement: &Placement) -> Vec<Polyline> {
    let doc = SvgImporter::new().unwrap().import_str(svg, "layout.svg").unwrap();
    let kept = PathFilter::new()
        .apply(doc.paths.clone(), doc.view_box.as_ref())
        .kept;
    let mut strokes: Vec<Polyline> = StrokeBuilder::new(SamplingParams::default())
        .build_all(&kept)
        .into_iter()
        .map(|s| s.polyline)
        .collect();
    let (scale, _) = DocumentScale::from_document(&doc);
    place_strokes(&mut strokes, &scale, placement);
    strokes
}

#[test]
fn test_single_line_lands_at_absolute_millimeters() {
    let svg = r#"<svg viewBox="0 0 100 100" width="100mm"><path d="M10,10 L90,10"/></svg>"#;
    let strokes = strokes_for(svg, &Placement::default());
    assert_eq!(strokes.len(), 1);
    assert_eq!(
        strokes[0].points,
        vec![Point::new(10.0, 10.0), Point::new(90.0, 10.0)]
    );
}

#[test]
fn test_border_is_dropped_and_triangle_kept() {
    let svg = r#"<svg viewBox="0 0 100 100" width="100mm">
        <path d="M0,0 H100 V100 H0 Z"/>
        <path d="M20,20 L80,20 L50,70 Z"/>
    </svg>"#;
    let placement = Placement {
        mirror_vertical: false,
        ..Placement::default()
    };
    let strokes = strokes_for(svg, &placement);
    assert_eq!(strokes.len(), 1);
    assert_eq!(
        strokes[0].points,
        vec![
            Point::new(20.0, 20.0),
            Point::new(80.0, 20.0),
            Point::new(50.0, 70.0),
            Point::new(20.0, 20.0),
        ]
    );
}

#[test]
fn test_mirror_flips_y_of_svg_drawing() {
    // SVG y grows downward: the upper stroke in the file ends up on top
    let svg = r#"<svg viewBox="0 0 100 100" width="100mm">
        <path d="M10,10 L20,10"/>
        <path d="M10,40 L20,40"/>
    </svg>"#;
    let strokes = strokes_for(svg, &Placement::default());
    assert_eq!(strokes[0].points[0], Point::new(10.0, 40.0));
    assert_eq!(strokes[1].points[0], Point::new(10.0, 10.0));
}

#[test]
fn test_split_subpaths_are_ordered_by_proximity() {
    let svg = r#"<svg viewBox="0 0 100 100" width="100mm">
        <path d="M0,0 L10,0 M50,0 L60,0 M20,0 L30,0"/>
    </svg>"#;
    let strokes = strokes_for(svg, &Placement::default());
    assert_eq!(strokes.len(), 3);
    assert_eq!(greedy_order(&strokes, |_, _| {}), vec![0, 2, 1]);
}
