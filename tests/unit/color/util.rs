use super::*;

#[test]
fn zero_factor_is_identity() {
    let c = Rgb::new(200, 13, 77);
    assert_eq!(brighten(c, 0.0), c);
    assert_eq!(darken(c, 0.0), c);
}

#[test]
fn full_factor_reaches_extremes() {
    let c = Rgb::new(200, 13, 77);
    assert_eq!(brighten(c, 1.0), Rgb::WHITE);
    assert_eq!(darken(c, 1.0), Rgb::BLACK);
    assert_eq!(brighten(c, 7.0), Rgb::WHITE);
    assert_eq!(darken(c, -3.0), c);
}

#[test]
fn half_factor_truncates() {
    assert_eq!(brighten(Rgb::BLACK, 0.5), Rgb::new(127, 127, 127));
    assert_eq!(darken(Rgb::new(101, 100, 0), 0.5), Rgb::new(50, 50, 0));
}

#[test]
fn spread_is_dark_then_bright() {
    let [lo, hi] = color_spread(Rgb::new(100, 100, 100), 0.2);
    assert_eq!(lo, Rgb::new(80, 80, 80));
    assert_eq!(hi, Rgb::new(131, 131, 131));
}
