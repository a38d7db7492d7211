use crate::foundation::core::Rgb;

/// Blends each channel toward `target` by `factor` in `[0, 1]`, truncating like config floats.
fn blend_toward(color: Rgb, target: f64, factor: f64) -> Rgb {
    let f = factor.clamp(0.0, 1.0);
    let mix = |c: u8| {
        let v = f64::from(c) * (1.0 - f) + target * f;
        (v + 1e-9).floor().clamp(0.0, 255.0) as u8
    };
    Rgb::new(mix(color.r), mix(color.g), mix(color.b))
}

/// Moves `color` toward white; `1.0` yields white.
pub fn brighten(color: Rgb, factor: f64) -> Rgb {
    blend_toward(color, 255.0, factor)
}

/// Moves `color` toward black; `1.0` yields black.
pub fn darken(color: Rgb, factor: f64) -> Rgb {
    blend_toward(color, 0.0, factor)
}

/// `[darken(color, spread), brighten(color, spread)]`.
pub fn color_spread(color: Rgb, spread: f64) -> [Rgb; 2] {
    [darken(color, spread), brighten(color, spread)]
}

#[cfg(test)]
#[path = "../../tests/unit/color/util.rs"]
mod tests;
