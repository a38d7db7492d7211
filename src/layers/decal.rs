use std::borrow::Cow;

use image::imageops::{self, FilterType};

use crate::config::model::{DecalKind, DecalLayer, DecalMirror, NamedDecal};
use crate::foundation::core::Size;
use crate::foundation::error::{LiveryError, LiveryResult};
use crate::layers::{LayerContext, ResourcePaths, logo};
use crate::raster::layer::{Axis, Layer, SpecSource};
use crate::template::loader::normalize_rel_path;

pub fn build(cfg: &DecalLayer, ctx: &LayerContext<'_>) -> LiveryResult<Layer> {
    let decal = match &cfg.decal {
        DecalKind::Named(n) => named_decal(n, ctx.resources)?,
        DecalKind::Logo(l) => logo::logo_layer(l)?,
    };

    // Config positions are y-up; raster rows grow downward.
    let pos = [cfg.pos[0] as f64, -(cfg.pos[1] as f64)];
    let mut layer = place(Layer::empty(ctx.size), &decal, cfg.rotate, pos)?;
    if let Some(m) = &cfg.mirror {
        let (mirror_pos, mirror_rotate) = mirror_placement(pos, cfg.rotate, m);
        layer = place(layer, &decal, mirror_rotate, mirror_pos)?;
    }
    Ok(layer)
}

/// Loads `<decals>/<name>.png`, resized and optionally recolored.
pub fn named_decal(cfg: &NamedDecal, resources: &ResourcePaths) -> LiveryResult<Layer> {
    let rel = normalize_rel_path(&format!("{}.png", cfg.name))?;
    let path = resources.decals.join(rel);
    let img = image::open(&path)
        .map_err(|e| LiveryError::image(format!("open decal '{}': {e}", path.display())))?
        .to_rgba8();

    let target = resized_extent(Size::new(img.width(), img.height()), cfg.size)?;
    let mut img = imageops::resize(&img, target.width, target.height, FilterType::CatmullRom);
    if let Some(color) = cfg.color {
        for px in img.pixels_mut() {
            px.0[..3].copy_from_slice(&<[u8; 3]>::from(color));
        }
    }

    let spec = cfg.spec.map_or(SpecSource::None, |s| SpecSource::Flat(s.0));
    Layer::from_image(img, spec)
}

/// Target extent for a decal; a missing side follows the source aspect ratio, truncated.
pub fn resized_extent(source: Size, requested: [Option<u32>; 2]) -> LiveryResult<Size> {
    if source.is_empty() {
        return Err(LiveryError::image(format!("decal image is empty ({source})")));
    }
    let (w, h) = (f64::from(source.width), f64::from(source.height));
    let size = match requested {
        [Some(tw), Some(th)] => Size::new(tw, th),
        [None, Some(th)] => Size::new((w / h * f64::from(th)) as u32, th),
        [Some(tw), None] => Size::new(tw, (h / w * f64::from(tw)) as u32),
        [None, None] => {
            return Err(LiveryError::validation(
                "decal size needs at least one of width or height",
            ));
        }
    };
    if size.is_empty() {
        return Err(LiveryError::validation(format!(
            "decal resizes to an empty {size} image"
        )));
    }
    Ok(size)
}

/// Mirrored position (raster orientation) and rotation for a decal's twin.
pub fn mirror_placement(pos: [f64; 2], rotate: f64, m: &DecalMirror) -> ([f64; 2], f64) {
    let off = m.offset as f64;
    let (reflect, offset) = match m.axis {
        Axis::Y => ([-1.0, 1.0], [off, 0.0]),
        // Raster y grows downward, so the pivot flips sign.
        Axis::X => ([1.0, -1.0], [0.0, -off]),
    };
    let pos = [
        (pos[0] - offset[0]) * reflect[0] + offset[0],
        (pos[1] - offset[1]) * reflect[1] + offset[1],
    ];
    let rotate = if m.rotate { 180.0 - rotate } else { rotate };
    (pos, rotate)
}

/// Upper-left corner that centers an `extent`-sized decal at `pos`, relative to the layer center.
pub fn centered_origin(layer: Size, extent: Size, pos: [f64; 2]) -> (i64, i64) {
    let cx = pos[0] + f64::from(layer.width / 2);
    let cy = pos[1] + f64::from(layer.height / 2);
    (
        (cx - f64::from(extent.width) / 2.0).trunc() as i64,
        (cy - f64::from(extent.height) / 2.0).trunc() as i64,
    )
}

fn place(layer: Layer, decal: &Layer, rotate: f64, pos: [f64; 2]) -> LiveryResult<Layer> {
    let decal = if rotate != 0.0 {
        Cow::Owned(decal.rotate(rotate, true)?)
    } else {
        Cow::Borrowed(decal)
    };
    let dest = centered_origin(layer.size(), decal.size(), pos);
    Ok(layer.flatten(&decal, dest))
}

#[cfg(test)]
#[path = "../../tests/unit/layers/decal.rs"]
mod tests;
