use std::path::Path;

use image::RgbaImage;

use crate::config::model::{TextureKind, TextureLayer};
use crate::foundation::core::Size;
use crate::foundation::error::{LiveryError, LiveryResult};
use crate::layers::LayerContext;
use crate::raster::layer::Layer;

pub const CARBON_FIBER_DIR: &str = "carbon_fiber_2";

pub fn build(cfg: &TextureLayer, ctx: &LayerContext<'_>) -> LiveryResult<Layer> {
    match cfg.texture {
        TextureKind::CarbonFiber => {
            carbon_fiber(&ctx.resources.textures.join(CARBON_FIBER_DIR), ctx.size)
        }
    }
}

fn open_rgb(path: &Path) -> LiveryResult<image::RgbImage> {
    Ok(image::open(path)
        .map_err(|e| LiveryError::image(format!("open texture '{}': {e}", path.display())))?
        .to_rgb8())
}

/// Opaque texture paint; spec takes metallic from the red channel of `spec_metallic.jpg` and
/// roughness from the green channel of `spec_roughness.jpg`. Cropped from the top-left.
pub fn carbon_fiber(dir: &Path, size: Size) -> LiveryResult<Layer> {
    let texture = open_rgb(&dir.join("texture.jpg"))?;
    let metallic = open_rgb(&dir.join("spec_metallic.jpg"))?;
    let roughness = open_rgb(&dir.join("spec_roughness.jpg"))?;

    if texture.width() < size.width || texture.height() < size.height {
        return Err(LiveryError::validation(format!(
            "texture '{}' is {}x{}, smaller than the {size} layer",
            dir.display(),
            texture.width(),
            texture.height()
        )));
    }
    for (name, map) in [("spec_metallic", &metallic), ("spec_roughness", &roughness)] {
        if map.dimensions() != texture.dimensions() {
            return Err(LiveryError::size_mismatch(format!(
                "{name} is {:?} but the texture is {:?}",
                map.dimensions(),
                texture.dimensions()
            )));
        }
    }

    let paint = RgbaImage::from_fn(size.width, size.height, |x, y| {
        let [r, g, b] = texture.get_pixel(x, y).0;
        image::Rgba([r, g, b, 255])
    });
    let spec = RgbaImage::from_fn(size.width, size.height, |x, y| {
        image::Rgba([metallic.get_pixel(x, y).0[0], roughness.get_pixel(x, y).0[1], 0, 255])
    });
    Layer::new(paint, spec)
}
