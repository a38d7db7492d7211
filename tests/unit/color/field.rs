use super::*;

fn row(n: usize) -> Vec<Point> {
    (0..n).map(|i| Point::new(i as f64, 0.0)).collect()
}

#[test]
fn gradient_spans_range_along_direction() {
    let f: ColorFunction =
        serde_json::from_str(r#"{"type":"GRADIENT","direction":[1,0]}"#).unwrap();
    let v = f.evaluate(&row(5));
    assert_eq!(v, vec![0.0, 0.25, 0.5, 0.75, 1.0]);

    let rev = Gradient {
        direction: [-2.0, 0.0],
        range: [10.0, 20.0],
    };
    assert_eq!(rev.evaluate(&row(3)), vec![20.0, 15.0, 10.0]);
}

#[test]
fn gradient_perpendicular_to_points_is_constant() {
    let g = Gradient {
        direction: [0.0, 1.0],
        range: [0.3, 1.0],
    };
    assert!(g.evaluate(&row(4)).iter().all(|v| *v == 0.3));
}

#[test]
fn random_uniform_is_seeded_and_in_range() {
    let r = RandomUniform {
        seed: 7,
        range: [2.0, 3.0],
    };
    let a = r.evaluate(&row(50));
    let b = r.evaluate(&row(50));
    assert_eq!(a, b);
    assert!(a.iter().all(|v| (2.0..3.0).contains(v)));

    let other = RandomUniform {
        seed: 8,
        range: [2.0, 3.0],
    };
    assert_ne!(a, other.evaluate(&row(50)));
}

#[test]
fn composed_sums_then_standardizes() {
    let f: ColorFunction = serde_json::from_str(
        r#"{"type":"COMPOSED","color_functions":[
            {"type":"GRADIENT","direction":[1,0]},
            {"type":"GRADIENT","direction":[1,0],"range":[0,3]}
        ]}"#,
    )
    .unwrap();
    f.validate().unwrap();
    assert_eq!(f.evaluate(&row(3)), vec![0.0, 0.5, 1.0]);
}

#[test]
fn validation_rejects_bad_configs() {
    let zero = ColorFunction::Gradient(Gradient {
        direction: [0.0, 0.0],
        range: [0.0, 1.0],
    });
    assert!(zero.validate().is_err());
    let empty = ColorFunction::Composed(Composed {
        color_functions: vec![],
        range: [0.0, 1.0],
    });
    assert!(empty.validate().is_err());
    assert!(
        serde_json::from_str::<ColorFunction>(r#"{"type":"GRADIENT","direction":[1,0],"x":1}"#)
            .is_err()
    );
}

fn grid(n: usize) -> Vec<Point> {
    (0..n * n)
        .map(|i| Point::new((i % n) as f64 * 0.7, (i / n) as f64 * 1.3))
        .collect()
}

#[test]
fn simplex_noise_is_seeded_and_spans_range() {
    let f: ColorFunction = serde_json::from_str(
        r#"{"type":"SIMPLEX_NOISE","length_scale":[5,8],"seed":3,"range":[-1,2]}"#,
    )
    .unwrap();
    f.validate().unwrap();
    let pts = grid(12);
    let a = f.evaluate(&pts);
    assert_eq!(a, f.evaluate(&pts));

    let lo = a.iter().cloned().fold(f64::INFINITY, f64::min);
    let hi = a.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    assert!((lo + 1.0).abs() < 1e-9, "{lo}");
    assert!((hi - 2.0).abs() < 1e-9, "{hi}");

    let reseeded = SimplexNoise {
        length_scale: [5.0, 8.0],
        angle: 0.0,
        seed: 4,
        range: [-1.0, 2.0],
    };
    assert_ne!(a, reseeded.evaluate(&pts));
}

#[test]
fn simplex_noise_angle_rotates_the_sample_grid() {
    let upright = SimplexNoise {
        length_scale: [4.0, 4.0],
        angle: 0.0,
        seed: 11,
        range: [0.0, 1.0],
    };
    let turned = SimplexNoise {
        angle: 90.0,
        ..upright.clone()
    };
    let pts = grid(10);
    // A quarter turn samples (x, y) where the upright field samples (-y, x).
    let moved: Vec<Point> = pts.iter().map(|p| Point::new(-p.y, p.x)).collect();
    for (a, b) in turned.evaluate(&pts).iter().zip(upright.evaluate(&moved)) {
        assert!((a - b).abs() < 1e-9, "{a} vs {b}");
    }
}

#[test]
fn simplex_noise_rejects_degenerate_length_scale() {
    for scale in [[0.0, 1.0], [1.0, f64::NAN], [f64::INFINITY, 2.0]] {
        let f = ColorFunction::SimplexNoise(SimplexNoise {
            length_scale: scale,
            angle: 0.0,
            seed: 0,
            range: [0.0, 1.0],
        });
        assert!(f.validate().is_err(), "{scale:?}");
    }
    assert!(
        serde_json::from_str::<ColorFunction>(r#"{"type":"SIMPLEX_NOISE","seed":1}"#).is_err()
    );
}
