use super::*;

use std::path::PathBuf;

use crate::foundation::core::Size;
use crate::region::tree::{Mask, NamedRegionTree};

fn quadrants() -> Template {
    let size = Size::new(200, 200);
    let mut tree = NamedRegionTree::new(size);
    tree.insert("segments.left", Mask::from_fn(size, |x, _| x < 100))
        .unwrap();
    tree.insert("segments.right", Mask::from_fn(size, |x, _| x >= 100))
        .unwrap();
    tree.insert("segments.top", Mask::from_fn(size, |_, y| y < 100))
        .unwrap();
    tree.insert("segments.bottom", Mask::from_fn(size, |_, y| y >= 100))
        .unwrap();
    Template::in_memory("quadrants", tree).unwrap()
}

fn config(json: serde_json::Value) -> LiveryConfig {
    serde_json::from_value(json).unwrap()
}

fn build(cfg: &LiveryConfig, opts: BuildOpts) -> LiveryResult<Layer> {
    LiveryBuilder::with_template(cfg, quadrants(), opts)?.build()
}

#[test]
fn single_solid_section_fills_canvas() {
    let cfg = config(serde_json::json!({
        "template": "quadrants",
        "sections": [{"layers": [{"type": "SOLID", "color": [255, 0, 0], "spec": [0, 255, 0]}]}]
    }));
    let livery = build(&cfg, BuildOpts::default()).unwrap();
    assert_eq!(livery.size(), Size::new(200, 200));
    assert!(livery.paint().pixels().all(|p| p.0 == [255, 0, 0, 255]));
    assert!(livery.spec().pixels().all(|p| p.0 == [0, 255, 0, 255]));
}

#[test]
fn selected_section_lands_in_its_bbox() {
    let cfg = config(serde_json::json!({
        "template": "quadrants",
        "sections": [
            {"layers": [{"type": "SOLID", "color": "#FF0000"}]},
            {"section": "segments.left & segments.top",
             "layers": [{"type": "SOLID", "color": "#0000FF", "spec": "CHROME"}]}
        ]
    }));
    let livery = build(&cfg, BuildOpts::default()).unwrap();
    for (x, y, p) in livery.paint().enumerate_pixels() {
        let expected = if x < 100 && y < 100 {
            [0, 0, 255, 255]
        } else {
            [255, 0, 0, 255]
        };
        assert_eq!(p.0, expected, "({x},{y})");
    }
    assert_eq!(livery.spec().get_pixel(10, 10).0, [255, 0, 0, 255]);
    assert_eq!(livery.spec().get_pixel(150, 10).0[3], 0);
}

#[test]
fn non_rectangular_selection_is_clipped_by_its_mask() {
    let cfg = config(serde_json::json!({
        "template": "quadrants",
        "sections": [
            {"section": "~(segments.right & segments.bottom)",
             "layers": [{"type": "SOLID", "color": "#00FF00"}]}
        ]
    }));
    let livery = build(&cfg, BuildOpts::default()).unwrap();
    assert_eq!(livery.paint().get_pixel(50, 150).0, [0, 255, 0, 255]);
    assert_eq!(livery.paint().get_pixel(150, 50).0, [0, 255, 0, 255]);
    assert_eq!(livery.paint().get_pixel(150, 150).0, [0, 0, 0, 0]);
}

#[test]
fn layers_fold_in_declared_order() {
    let cfg = config(serde_json::json!({
        "template": "quadrants",
        "sections": [{"layers": [
            {"type": "SOLID", "color": "#FF0000"},
            {"type": "SOLID", "color": "#00FF00"}
        ]}]
    }));
    let livery = build(&cfg, BuildOpts::default()).unwrap();
    assert!(livery.paint().pixels().all(|p| p.0 == [0, 255, 0, 255]));
}

#[test]
fn final_mask_clips_the_livery() {
    let cfg = config(serde_json::json!({
        "template": "quadrants",
        "sections": [{"layers": [{"type": "SOLID", "color": "#FF0000"}]}],
        "final_mask": "segments.left"
    }));
    let livery = build(&cfg, BuildOpts::default()).unwrap();
    assert_eq!(livery.paint().get_pixel(99, 0).0, [255, 0, 0, 255]);
    assert_eq!(livery.paint().get_pixel(100, 0).0, [0, 0, 0, 0]);
}

#[test]
fn brighten_by_spec_is_opt_in() {
    let sections = serde_json::json!([{"layers": [
        {"type": "SOLID", "color": [100, 100, 100], "spec": [255, 0, 0]}
    ]}]);
    let plain = config(serde_json::json!({"template": "quadrants", "sections": sections.clone()}));
    let toned = config(serde_json::json!({
        "template": "quadrants", "sections": sections, "brighten_by_spec": {}
    }));
    let plain = build(&plain, BuildOpts::default()).unwrap();
    let toned = build(&toned, BuildOpts::default()).unwrap();
    assert_eq!(plain.paint().get_pixel(0, 0).0, [100, 100, 100, 255]);
    assert_eq!(toned.paint().get_pixel(0, 0).0, [147, 147, 147, 255]);
    assert_eq!(plain.spec(), toned.spec());
}

#[test]
fn full_and_empty_selections_fail() {
    let full = config(serde_json::json!({
        "template": "quadrants",
        "sections": [{"section": "segments", "layers": []}]
    }));
    let err = build(&full, BuildOpts::default()).unwrap_err();
    assert!(matches!(err, LiveryError::FullSelection(_)), "{err}");

    let empty = config(serde_json::json!({
        "template": "quadrants",
        "sections": [{"section": "segments.left & segments.right", "layers": []}]
    }));
    let err = build(&empty, BuildOpts::default()).unwrap_err();
    assert!(matches!(err, LiveryError::EmptySelection(_)), "{err}");
}

#[test]
fn parallel_matches_sequential() {
    let cfg = config(serde_json::json!({
        "template": "quadrants",
        "sections": [
            {"layers": [
                {"type": "SOLID", "color": "#102030"},
                {"type": "PATCH", "vertices": [[-30, -30], [30, -30], [0, 40]], "radii": 5,
                 "facecolor": "#FFFFFF", "edgecolor": "#000000",
                 "facespec": "METALLIC", "edgespec": "MATTE", "edgewidth": 3}
            ]},
            {"section": "segments.right", "layers": [
                {"type": "PATTERN", "pattern": {"type": "TRIANGLES", "triangle_size": 15,
                 "facecolor": "#AA0000", "edgecolor": "#000000", "edgewidth": 1}}
            ]}
        ]
    }));
    let sequential = build(&cfg, BuildOpts::default()).unwrap();
    let parallel = build(
        &cfg,
        BuildOpts {
            threading: BuildThreading {
                parallel: true,
                threads: Some(2),
            },
            ..BuildOpts::default()
        },
    )
    .unwrap();
    assert_eq!(sequential, parallel);
}

#[test]
fn zero_threads_is_rejected() {
    let cfg = config(serde_json::json!({"template": "quadrants", "sections": []}));
    let opts = BuildOpts {
        threading: BuildThreading {
            parallel: true,
            threads: Some(0),
        },
        ..BuildOpts::default()
    };
    let err = build(&cfg, opts).unwrap_err();
    assert!(matches!(err, LiveryError::Validation(_)), "{err}");
}

#[test]
fn cache_resumes_to_the_same_livery() {
    let dir = PathBuf::from("target").join("unit-pipeline").join("cache");
    let _ = std::fs::remove_dir_all(&dir);
    let cfg = config(serde_json::json!({
        "template": "quadrants",
        "sections": [
            {"layers": [{"type": "SOLID", "color": "#FF0000"}]},
            {"section": "segments.bottom", "layers": [{"type": "SOLID", "color": "#00FF00"}]}
        ],
        "final_mask": "segments.left"
    }));
    let opts = BuildOpts {
        cache: CacheMode::Enabled { dir: dir.clone() },
        ..BuildOpts::default()
    };

    let uncached = build(&cfg, BuildOpts::default()).unwrap();
    let first = build(&cfg, opts.clone()).unwrap();
    assert_eq!(first, uncached);

    let template = quadrants();
    let chain = hash_chain(&template.content_hash, &cfg.sections).unwrap();
    let cache = LayerCache::new(&dir);
    assert!(cache.contains(&chain[1]).unwrap());
    assert!(cache.contains(&chain[2]).unwrap());
    // Snapshots hold the livery before the final mask.
    let snapshot = cache.load(&chain[2], template.size).unwrap().unwrap();
    assert_eq!(snapshot.paint().get_pixel(150, 50).0, [255, 0, 0, 255]);

    let second = build(&cfg, opts).unwrap();
    assert_eq!(second, uncached);
}

#[test]
fn invalid_config_is_rejected_before_building() {
    let cfg = config(serde_json::json!({
        "template": " ",
        "sections": []
    }));
    assert!(LiveryBuilder::with_template(&cfg, quadrants(), BuildOpts::default()).is_err());
}
