use super::*;
use kurbo::{PathEl, Shape};

fn square(size: f64) -> Vec<Point> {
    vec![
        Point::new(0.0, 0.0),
        Point::new(size, 0.0),
        Point::new(size, size),
        Point::new(0.0, size),
    ]
}

#[test]
fn zero_radii_trace_the_sharp_polygon() {
    let verts = square(10.0);
    let path = compute_path(&verts, &[0.0; 4]).unwrap();
    let els: Vec<PathEl> = path.elements().to_vec();
    assert_eq!(
        els,
        vec![
            PathEl::MoveTo(verts[0]),
            PathEl::LineTo(verts[1]),
            PathEl::LineTo(verts[2]),
            PathEl::LineTo(verts[3]),
            PathEl::ClosePath,
        ]
    );
}

#[test]
fn rounded_square_area_matches_quarter_circles() {
    let path = compute_path(&square(100.0), &[25.0; 4]).unwrap();
    let expected = 100.0 * 100.0 - (4.0 - std::f64::consts::PI) * 25.0 * 25.0;
    assert!(
        (path.area().abs() - expected).abs() < 0.5,
        "area {} vs {expected}",
        path.area()
    );
}

#[test]
fn winding_direction_does_not_change_silhouette() {
    let ccw = square(100.0);
    let mut cw = ccw.clone();
    cw.reverse();
    let a = compute_path(&ccw, &[10.0, 20.0, 30.0, 5.0]).unwrap();
    let b = compute_path(&cw, &[5.0, 30.0, 20.0, 10.0]).unwrap();
    assert!((a.area().abs() - b.area().abs()).abs() < 1e-3);
    assert!(a.area().signum() != b.area().signum());
}

#[test]
fn rounded_corner_stays_inside_the_sharp_polygon() {
    let path = compute_path(&square(100.0), &[25.0; 4]).unwrap();
    let bbox = path.bounding_box();
    assert!(bbox.x0 >= -1e-9 && bbox.y0 >= -1e-9);
    assert!(bbox.x1 <= 100.0 + 1e-9 && bbox.y1 <= 100.0 + 1e-9);
    // The corner itself is cut off.
    assert!(!path.contains(Point::new(1.0, 1.0)));
    assert!(path.contains(Point::new(50.0, 50.0)));
}

#[test]
fn tangent_points_lie_on_the_edges() {
    let path = compute_path(&square(100.0), &[25.0, 0.0, 0.0, 0.0]).unwrap();
    let els = path.elements();
    // The first corner is rounded: the path starts at the entry tangent on edge (0,100)-(0,0).
    assert_eq!(els[0], PathEl::MoveTo(Point::new(0.0, 25.0)));
    let PathEl::CurveTo(_, _, end) = els[1] else {
        panic!("expected an arc segment, got {:?}", els[1]);
    };
    let last_arc_end = els
        .iter()
        .take_while(|el| !matches!(el, PathEl::LineTo(_)))
        .filter_map(|el| match el {
            PathEl::CurveTo(_, _, p) => Some(*p),
            _ => None,
        })
        .last()
        .unwrap_or(end);
    assert!((last_arc_end - Point::new(25.0, 0.0)).hypot() < 1e-9);
}

#[test]
fn collinear_vertices_stay_sharp() {
    let verts = vec![
        Point::new(0.0, 0.0),
        Point::new(50.0, 0.0),
        Point::new(100.0, 0.0),
        Point::new(100.0, 100.0),
    ];
    let path = compute_path(&verts, &[0.0, 40.0, 0.0, 0.0]).unwrap();
    assert!(path.elements().contains(&PathEl::LineTo(Point::new(50.0, 0.0))));
    assert!((path.area().abs() - 5000.0).abs() < 1e-9);
}

#[test]
fn duplicates_are_removed_cyclically() {
    let verts = vec![
        Point::new(0.0, 0.0),
        Point::new(0.0, 0.0),
        Point::new(10.0, 0.0),
        Point::new(10.0, 10.0),
        Point::new(0.0, 0.0),
    ];
    let path = compute_path(&verts, &[0.0; 5]).unwrap();
    let lines = path
        .elements()
        .iter()
        .filter(|el| matches!(el, PathEl::LineTo(_)))
        .count();
    assert_eq!(lines, 2);
}

#[test]
fn degenerate_inputs_are_rejected() {
    let two = vec![Point::new(0.0, 0.0), Point::new(1.0, 1.0), Point::new(0.0, 0.0)];
    assert!(matches!(
        compute_path(&two, &[0.0; 3]),
        Err(LiveryError::DegenerateGeometry(_))
    ));
    assert!(matches!(
        compute_path(&square(1.0), &[0.0; 3]),
        Err(LiveryError::DegenerateGeometry(_))
    ));
    assert!(matches!(
        compute_path(&square(1.0), &[0.0, -1.0, 0.0, 0.0]),
        Err(LiveryError::DegenerateGeometry(_))
    ));
}

#[test]
fn reflex_corner_is_filled_in_either_winding() {
    let ell = vec![
        Point::new(0.0, 0.0),
        Point::new(100.0, 0.0),
        Point::new(100.0, 50.0),
        Point::new(50.0, 50.0),
        Point::new(50.0, 100.0),
        Point::new(0.0, 100.0),
    ];
    // Five convex corners lose (1 - pi/4) r^2 each, the reflex corner gains it back once.
    let cut = (1.0 - std::f64::consts::FRAC_PI_4) * 100.0;
    let expected = 7500.0 - 4.0 * cut;

    let mut reversed = ell.clone();
    reversed.reverse();
    for verts in [ell, reversed] {
        let path = compute_path(&verts, &[10.0; 6]).unwrap();
        assert!(
            (path.area().abs() - expected).abs() < 0.5,
            "area {} vs {expected}",
            path.area()
        );
        // The fillet at (50, 50) bulges outside the sharp polygon.
        assert!(path.contains(Point::new(51.0, 51.0)));
        assert!(!path.contains(Point::new(58.0, 58.0)));
    }
}
