pub(crate) fn mul_div255_u16(x: u16, y: u16) -> u16 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u16
}

pub(crate) fn mul_div255_u8(x: u16, y: u16) -> u8 {
    mul_div255_u16(x, y) as u8
}

pub(crate) fn premul_rgba8(px: [u8; 4]) -> [u8; 4] {
    let a = u16::from(px[3]);
    [
        mul_div255_u8(u16::from(px[0]), a),
        mul_div255_u8(u16::from(px[1]), a),
        mul_div255_u8(u16::from(px[2]), a),
        px[3],
    ]
}

pub(crate) fn unpremul_rgba8(px: [u8; 4]) -> [u8; 4] {
    let a = u32::from(px[3]);
    if a == 0 {
        return [0, 0, 0, 0];
    }
    if a == 255 {
        return px;
    }
    let un = |c: u8| -> u8 { ((u32::from(c) * 255 + a / 2) / a).min(255) as u8 };
    [un(px[0]), un(px[1]), un(px[2]), px[3]]
}

/// 2D cross product of `(b - a)` and `(c - a)`; twice the signed triangle area.
pub(crate) fn cross3(a: kurbo::Point, b: kurbo::Point, c: kurbo::Point) -> f64 {
    (b - a).cross(c - a)
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;
