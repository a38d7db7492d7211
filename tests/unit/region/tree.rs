use super::*;

fn quadrant_tree() -> NamedRegionTree {
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
    tree
}

#[test]
fn resolve_leaf_returns_its_mask() {
    let tree = quadrant_tree();
    let left = tree.resolve("segments.left").unwrap();
    assert!(left.get(0, 0));
    assert!(left.get(99, 199));
    assert!(!left.get(100, 0));
    assert_eq!(left.count(), 100 * 200);
}

#[test]
fn resolve_group_is_union_of_leaves() {
    let tree = quadrant_tree();
    let all = tree.resolve("segments").unwrap();
    assert!(all.is_full());
}

#[test]
fn unknown_region_lists_sorted_names() {
    let tree = quadrant_tree();
    let err = tree.resolve("segments.wing").unwrap_err();
    let LiveryError::UnknownRegion { available, .. } = err else {
        panic!("expected UnknownRegion, got {err:?}");
    };
    assert_eq!(
        available,
        "segments\nsegments.bottom\nsegments.left\nsegments.right\nsegments.top"
    );
}

#[test]
fn resolving_through_a_leaf_is_unknown() {
    let tree = quadrant_tree();
    assert!(matches!(
        tree.resolve("segments.left.inner"),
        Err(LiveryError::UnknownRegion { .. })
    ));
}

#[test]
fn insert_rejects_wrong_size_and_duplicates() {
    let mut tree = quadrant_tree();
    assert!(matches!(
        tree.insert("x", Mask::new(Size::new(10, 10), true)),
        Err(LiveryError::SizeMismatch(_))
    ));
    assert!(
        tree.insert("segments.left", Mask::new(Size::new(200, 200), true))
            .is_err()
    );
    assert!(
        tree.insert("segments.left.deeper", Mask::new(Size::new(200, 200), true))
            .is_err()
    );
}

#[test]
fn bbox_is_tight_and_half_open() {
    let size = Size::new(20, 10);
    let m = Mask::from_fn(size, |x, y| (3..7).contains(&x) && (2..5).contains(&y));
    assert_eq!(m.bbox(), Some(BBox::new(3, 2, 7, 5).unwrap()));
    assert_eq!(Mask::new(size, false).bbox(), None);
}

#[test]
fn crop_extracts_sub_rectangle() {
    let size = Size::new(4, 4);
    let m = Mask::from_fn(size, |x, y| x == y);
    let c = m.crop(BBox::new(1, 1, 3, 3).unwrap()).unwrap();
    assert_eq!(c.size(), Size::new(2, 2));
    assert_eq!(c.bits(), &[true, false, false, true]);
    assert!(m.crop(BBox::new(0, 0, 5, 4).unwrap()).is_err());
}

#[test]
fn from_alpha_only_counts_fully_opaque() {
    let mut img = image::RgbaImage::new(2, 1);
    img.put_pixel(0, 0, image::Rgba([0, 0, 0, 255]));
    img.put_pixel(1, 0, image::Rgba([0, 0, 0, 254]));
    let m = Mask::from_alpha(&img);
    assert_eq!(m.bits(), &[true, false]);
}
