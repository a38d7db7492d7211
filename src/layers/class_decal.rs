use image::RgbaImage;

use crate::config::model::ClassDecalLayer;
use crate::foundation::error::{LiveryError, LiveryResult};
use crate::layers::LayerContext;
use crate::raster::composite::over_in_place;
use crate::raster::layer::{Layer, SpecSource};
use crate::template::loader::{collect_pngs, normalize_rel_path};

/// Composites every PNG under `<template dir>/<class_name>/` in path order. The decal stays
/// registered to the template canvas, so a section only sees its own window of it.
pub fn build(cfg: &ClassDecalLayer, ctx: &LayerContext<'_>) -> LiveryResult<Layer> {
    let template_dir = ctx.template_dir.ok_or_else(|| {
        LiveryError::validation("CLASS_DECAL needs a template loaded from a directory")
    })?;
    let dir = template_dir.join(normalize_rel_path(&cfg.class_name)?);
    if !dir.is_dir() {
        return Err(LiveryError::validation(format!(
            "class decal '{}' not found at '{}'",
            cfg.class_name,
            dir.display()
        )));
    }

    let mut acc: Option<RgbaImage> = None;
    for (_, path) in collect_pngs(&dir)? {
        let img = image::open(&path)
            .map_err(|e| LiveryError::image(format!("open '{}': {e}", path.display())))?
            .to_rgba8();
        acc = Some(match acc {
            None => img,
            Some(mut base) => {
                over_in_place(&mut base, &img, (0, 0));
                base
            }
        });
    }
    let decal = acc.ok_or_else(|| {
        LiveryError::validation(format!(
            "class decal '{}' has no images in '{}'",
            cfg.class_name,
            dir.display()
        ))
    })?;

    let decal = Layer::from_image(decal, SpecSource::Flat(cfg.spec.0))?;
    Ok(Layer::empty(ctx.size).flatten(&decal, (-ctx.origin.0, -ctx.origin.1)))
}
