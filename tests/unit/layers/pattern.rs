use super::*;

use crate::layers::ResourcePaths;

fn style(cell_size: u32) -> PolyPattern {
    serde_json::from_value(serde_json::json!({ "cell_size": cell_size })).unwrap()
}

fn build_kind(kind: PatternKind, size: Size) -> Layer {
    let resources = ResourcePaths::default();
    build(
        &PatternLayer { pattern: kind },
        &LayerContext::new(size, &resources),
    )
    .unwrap()
}

#[test]
fn triangle_cells_have_unit_sides() {
    let cells = triangle_grid(Size::new(60, 60), &style(10));
    assert!(!cells.is_empty());
    for cell in &cells {
        assert_eq!(cell.vertices.len(), 3);
        let side = (cell.vertices[1] - cell.vertices[0]).hypot();
        assert!((side - 10.0).abs() < 1e-9, "{side}");
        assert!(in_bounds(Size::new(60, 60), 10.0, cell.center));
    }
}

#[test]
fn full_turn_matches_no_turn() {
    let mut turned = style(10);
    turned.angle = 360.0;
    assert_eq!(
        triangle_grid(Size::new(40, 30), &style(10)),
        triangle_grid(Size::new(40, 30), &turned)
    );
    assert_eq!(
        hexagon_grid(Size::new(40, 30), &style(10)),
        hexagon_grid(Size::new(40, 30), &turned)
    );
}

#[test]
fn flat_triangles_cover_the_canvas() {
    let mut s = style(10);
    s.facecolor = Some(Rgb::new(255, 0, 0));
    let layer = build_kind(PatternKind::Triangles(s), Size::new(40, 40));
    for p in layer.paint().pixels() {
        assert!(p.0[3] > 0);
        assert!(p.0[0] >= 250 && p.0[1] == 0 && p.0[2] == 0, "{p:?}");
    }
    assert!(layer.spec().pixels().all(|p| p.0[3] == 0));
}

#[test]
fn flat_hexagons_cover_the_canvas() {
    let mut s = style(12);
    s.facecolor = Some(Rgb::new(0, 0, 255));
    s.facespec = Some(SpecColor(Rgb::new(0, 127, 0)));
    let layer = build_kind(PatternKind::Hexagons(s), Size::new(40, 40));
    assert!(layer.paint().pixels().all(|p| p.0[3] > 0));
    assert!(layer.spec().pixels().all(|p| p.0[3] > 0 && p.0[1] >= 120));
}

#[test]
fn unstyled_pattern_is_transparent() {
    let layer = build_kind(PatternKind::Triangles(style(10)), Size::new(20, 20));
    assert_eq!(layer, Layer::empty(Size::new(20, 20)));
}

#[test]
fn edges_only_leave_cell_interiors_empty() {
    let mut s = style(20);
    s.edgecolor = Some(Rgb::WHITE);
    s.edgewidth = 1;
    let layer = build_kind(PatternKind::Triangles(s), Size::new(60, 60));
    let transparent = layer.paint().pixels().filter(|p| p.0[3] == 0).count();
    let drawn = layer.paint().pixels().filter(|p| p.0[3] > 0).count();
    assert!(transparent > 0 && drawn > 0);
}

#[test]
fn gradient_colormap_varies_across_the_canvas() {
    let s: PolyPattern = serde_json::from_value(serde_json::json!({
        "cell_size": 8,
        "face_cmap": {"type": "LINEAR_SEGMENTED", "colors": ["#000000", "#FFFFFF"]},
        "face_cfunc": {"type": "GRADIENT", "direction": [1, 0]}
    }))
    .unwrap();
    let layer = build_kind(PatternKind::Hexagons(s), Size::new(64, 32));
    let left = layer.paint().get_pixel(2, 16).0[0];
    let right = layer.paint().get_pixel(61, 16).0[0];
    assert!(left < right, "{left} vs {right}");
}
