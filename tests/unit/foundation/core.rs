use super::*;

#[test]
fn rgb_accepts_hex_ints_and_floats() {
    let hex: Rgb = serde_json::from_str("\"#FF8000\"").unwrap();
    assert_eq!(hex, Rgb::new(255, 128, 0));

    let ints: Rgb = serde_json::from_str("[0, 1, 2]").unwrap();
    assert_eq!(ints, Rgb::new(0, 1, 2));

    let floats: Rgb = serde_json::from_str("[0.0, 0.5, 1.0]").unwrap();
    assert_eq!(floats, Rgb::new(0, 127, 255));
}

#[test]
fn rgb_rejects_out_of_range_and_bad_hex() {
    assert!(serde_json::from_str::<Rgb>("[0, 256, 0]").is_err());
    assert!(serde_json::from_str::<Rgb>("[0.0, 1.5, 0.0]").is_err());
    assert!(serde_json::from_str::<Rgb>("\"#12345\"").is_err());
    assert!(serde_json::from_str::<Rgb>("\"123456\"").is_err());
    assert!(serde_json::from_str::<Rgb>("[1, 2]").is_err());
}

#[test]
fn rgb_serializes_as_int_triple() {
    let s = serde_json::to_string(&Rgb::new(1, 2, 3)).unwrap();
    assert_eq!(s, "[1,2,3]");
    assert_eq!(Rgb::new(255, 0, 16).to_hex(), "#FF0010");
}

#[test]
fn bbox_extent_and_validation() {
    let b = BBox::new(10, 20, 30, 60).unwrap();
    assert_eq!(b.size(), Size::new(20, 40));
    assert_eq!(b.origin(), (10, 20));
    assert!(b.fits_within(Size::new(30, 60)));
    assert!(!b.fits_within(Size::new(29, 60)));
    assert!(BBox::new(5, 0, 4, 1).is_err());
    assert_eq!(BBox::full(Size::new(7, 9)).size(), Size::new(7, 9));
}
