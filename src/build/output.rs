use std::path::{Path, PathBuf};

use image::ImageFormat;

use crate::config::model::OutputTarget;
use crate::foundation::error::{LiveryError, LiveryResult};
use crate::raster::layer::Layer;

/// `(car_<N>.tga, car_spec_<N>.tga)` under the target directory.
pub fn output_paths(target: &OutputTarget) -> (PathBuf, PathBuf) {
    let n = target.car_number;
    (
        target.paint_path.join(format!("car_{n}.tga")),
        target.paint_path.join(format!("car_spec_{n}.tga")),
    )
}

/// Writes the paint and spec rasters as RLE TGA files named for the car number.
#[tracing::instrument(skip(livery))]
pub fn save_livery(livery: &Layer, target: Option<&OutputTarget>) -> LiveryResult<(PathBuf, PathBuf)> {
    let target = target.ok_or_else(|| {
        LiveryError::MissingOutputTarget(
            "the config has no `output` block naming paint_path and car_number".into(),
        )
    })?;
    std::fs::create_dir_all(&target.paint_path).map_err(|e| {
        LiveryError::io(format!("create '{}': {e}", target.paint_path.display()))
    })?;

    let (paint, spec) = output_paths(target);
    save_image(livery.paint(), &paint, ImageFormat::Tga)?;
    save_image(livery.spec(), &spec, ImageFormat::Tga)?;
    tracing::info!(paint = %paint.display(), spec = %spec.display(), "saved livery");
    Ok((paint, spec))
}

/// Writes one raster in `format`, creating parent directories.
pub fn save_image(img: &image::RgbaImage, path: &Path, format: ImageFormat) -> LiveryResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .map_err(|e| LiveryError::io(format!("create '{}': {e}", parent.display())))?;
    }
    img.save_with_format(path, format)
        .map_err(|e| LiveryError::image(format!("write '{}': {e}", path.display())))
}

#[cfg(test)]
#[path = "../../tests/unit/build/output.rs"]
mod tests;
