use image::RgbaImage;

use crate::foundation::error::{LiveryError, LiveryResult};
use crate::region::tree::Mask;

/// Straight (non-premultiplied) RGBA8 pixel.
pub type Rgba8 = [u8; 4];

/// Porter-Duff source-over on straight alpha.
///
/// A transparent `src` returns `dst` untouched; an opaque `src` or a transparent `dst`
/// returns `src` untouched, so identity composites stay bit-exact.
pub fn over(dst: Rgba8, src: Rgba8) -> Rgba8 {
    if src[3] == 0 {
        return dst;
    }
    if src[3] == 255 || dst[3] == 0 {
        return src;
    }

    let sa = f32::from(src[3]) / 255.0;
    let da = f32::from(dst[3]) / 255.0;
    let out_a = sa + da * (1.0 - sa);

    let mut out = [0u8; 4];
    for i in 0..3 {
        let c = (f32::from(src[i]) * sa + f32::from(dst[i]) * da * (1.0 - sa)) / out_a;
        out[i] = c.round().clamp(0.0, 255.0) as u8;
    }
    out[3] = (out_a * 255.0).round().clamp(0.0, 255.0) as u8;
    out
}

/// Composites `src` over `dst` with `src`'s top-left at `dest`; out-of-bounds parts are clipped.
pub fn over_in_place(dst: &mut RgbaImage, src: &RgbaImage, dest: (i64, i64)) {
    let (dw, dh) = (i64::from(dst.width()), i64::from(dst.height()));
    let (sw, sh) = (i64::from(src.width()), i64::from(src.height()));

    let x_start = dest.0.max(0);
    let y_start = dest.1.max(0);
    let x_end = (dest.0 + sw).min(dw);
    let y_end = (dest.1 + sh).min(dh);
    if x_start >= x_end || y_start >= y_end {
        return;
    }

    for y in y_start..y_end {
        for x in x_start..x_end {
            let s = src.get_pixel((x - dest.0) as u32, (y - dest.1) as u32).0;
            let d = dst.get_pixel_mut(x as u32, y as u32);
            d.0 = over(d.0, s);
        }
    }
}

/// Zeroes every pixel whose mask bit differs from `keep`.
pub fn mask_in_place(img: &mut RgbaImage, mask: &Mask, keep: bool) -> LiveryResult<()> {
    let size = mask.size();
    if img.width() != size.width || img.height() != size.height {
        return Err(LiveryError::size_mismatch(format!(
            "mask of {size} cannot apply to a {}x{} raster",
            img.width(),
            img.height()
        )));
    }
    for (px, bit) in img.pixels_mut().zip(mask.bits()) {
        if *bit != keep {
            px.0 = [0, 0, 0, 0];
        }
    }
    Ok(())
}

/// Scales RGB by `factor` (clamped), leaving alpha alone.
pub fn scale_rgb(px: Rgba8, factor: f32) -> Rgba8 {
    let s = |c: u8| (f32::from(c) * factor).round().clamp(0.0, 255.0) as u8;
    [s(px[0]), s(px[1]), s(px[2]), px[3]]
}

#[cfg(test)]
#[path = "../../tests/unit/raster/composite.rs"]
mod tests;
