use super::*;

#[test]
fn mul_div255_variants_align() {
    for x in [0u16, 1, 127, 255] {
        for y in [0u16, 1, 127, 255] {
            assert_eq!(u16::from(mul_div255_u8(x, y)), mul_div255_u16(x, y));
        }
    }
}

#[test]
fn premul_roundtrip_is_exact_for_opaque_and_transparent() {
    let opaque = [12, 200, 99, 255];
    assert_eq!(unpremul_rgba8(premul_rgba8(opaque)), opaque);
    assert_eq!(unpremul_rgba8(premul_rgba8([40, 50, 60, 0])), [0, 0, 0, 0]);
}

#[test]
fn unpremul_of_half_alpha_recovers_color() {
    let straight = [200, 100, 0, 128];
    let back = unpremul_rgba8(premul_rgba8(straight));
    for i in 0..3 {
        assert!((i32::from(back[i]) - i32::from(straight[i])).abs() <= 1);
    }
    assert_eq!(back[3], 128);
}

#[test]
fn cross3_sign_follows_turn_direction() {
    let a = kurbo::Point::new(0.0, 0.0);
    let b = kurbo::Point::new(1.0, 0.0);
    assert!(cross3(a, b, kurbo::Point::new(1.0, 1.0)) > 0.0);
    assert!(cross3(a, b, kurbo::Point::new(1.0, -1.0)) < 0.0);
    assert_eq!(cross3(a, b, kurbo::Point::new(2.0, 0.0)), 0.0);
}
