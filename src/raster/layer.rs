use image::RgbaImage;
use image::imageops;

use crate::foundation::core::{Affine, BBox, Rgb, Size};
use crate::foundation::error::{LiveryError, LiveryResult};
use crate::raster::composite::{mask_in_place, over_in_place, scale_rgb};
use crate::raster::rasterize::Canvas;
use crate::region::tree::Mask;

/// Number of equal-width metallic bins used by [`Layer::brighten_by_spec`].
pub const BRIGHTEN_BINS: u32 = 16;

/// How a [`Layer::from_image`] spec is provided.
#[derive(Clone, Debug, Default)]
pub enum SpecSource {
    #[default]
    /// Transparent spec.
    None,
    /// Flat color over the paint's coverage, see [`Layer::set_spec`].
    Flat(Rgb),
    /// Explicit spec raster; must match the paint size.
    Raster(RgbaImage),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
/// Mirror axis. `X` flips rows top to bottom, `Y` flips columns left to right.
pub enum Axis {
    X,
    Y,
}

/// Co-registered paint and spec rasters. Every operation returns a new layer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Layer {
    paint: RgbaImage,
    spec: RgbaImage,
}

impl Layer {
    /// Pairs two rasters of equal size.
    pub fn new(paint: RgbaImage, spec: RgbaImage) -> LiveryResult<Self> {
        if paint.dimensions() != spec.dimensions() {
            return Err(LiveryError::size_mismatch(format!(
                "paint is {:?} but spec is {:?}",
                paint.dimensions(),
                spec.dimensions()
            )));
        }
        Ok(Self { paint, spec })
    }

    /// Fully transparent layer.
    pub fn empty(size: Size) -> Self {
        Self {
            paint: RgbaImage::new(size.width, size.height),
            spec: RgbaImage::new(size.width, size.height),
        }
    }

    /// Opaque `color` paint; opaque `spec` when given, transparent otherwise.
    pub fn from_color(size: Size, color: Rgb, spec: Option<Rgb>) -> Self {
        let paint = RgbaImage::from_pixel(size.width, size.height, color.with_alpha(255));
        let spec = match spec {
            Some(s) => RgbaImage::from_pixel(size.width, size.height, s.with_alpha(255)),
            None => RgbaImage::new(size.width, size.height),
        };
        Self { paint, spec }
    }

    /// Wraps an externally produced paint raster.
    pub fn from_image(image: RgbaImage, spec: SpecSource) -> LiveryResult<Self> {
        match spec {
            SpecSource::None => {
                let (w, h) = image.dimensions();
                Ok(Self {
                    paint: image,
                    spec: RgbaImage::new(w, h),
                })
            }
            SpecSource::Raster(spec) => Self::new(image, spec),
            SpecSource::Flat(color) => {
                let (w, h) = image.dimensions();
                Ok(Self {
                    paint: image,
                    spec: RgbaImage::new(w, h),
                }
                .set_spec(color))
            }
        }
    }

    pub fn size(&self) -> Size {
        Size::new(self.paint.width(), self.paint.height())
    }

    pub fn paint(&self) -> &RgbaImage {
        &self.paint
    }

    pub fn spec(&self) -> &RgbaImage {
        &self.spec
    }

    /// `(paint, spec)`.
    pub fn into_parts(self) -> (RgbaImage, RgbaImage) {
        (self.paint, self.spec)
    }

    /// Recolors paint everywhere and makes it opaque.
    pub fn set_color(&self, color: Rgb) -> Self {
        let size = self.size();
        Self {
            paint: RgbaImage::from_pixel(size.width, size.height, color.with_alpha(255)),
            spec: self.spec.clone(),
        }
    }

    /// Replaces spec RGB; spec coverage follows paint alpha.
    pub fn set_spec(&self, color: Rgb) -> Self {
        let mut spec = self.spec.clone();
        for (s, p) in spec.pixels_mut().zip(self.paint.pixels()) {
            *s = color.with_alpha(p.0[3]);
        }
        Self {
            paint: self.paint.clone(),
            spec,
        }
    }

    /// Zeroes pixels outside `region` (inside it when `invert`).
    pub fn mask(&self, region: &Mask, invert: bool) -> LiveryResult<Self> {
        let mut paint = self.paint.clone();
        let mut spec = self.spec.clone();
        mask_in_place(&mut paint, region, !invert)?;
        mask_in_place(&mut spec, region, !invert)?;
        Ok(Self { paint, spec })
    }

    /// Alpha-over composites `other` on top of `self` with its origin at `dest`.
    pub fn flatten(&self, other: &Layer, dest: (i64, i64)) -> Self {
        let mut paint = self.paint.clone();
        let mut spec = self.spec.clone();
        over_in_place(&mut paint, &other.paint, dest);
        over_in_place(&mut spec, &other.spec, dest);
        Self { paint, spec }
    }

    /// Sub-rectangle of both rasters; `bbox` must lie within the layer.
    pub fn crop(&self, bbox: BBox) -> LiveryResult<Self> {
        if !bbox.fits_within(self.size()) {
            return Err(LiveryError::size_mismatch(format!(
                "crop {bbox:?} exceeds layer of {}",
                self.size()
            )));
        }
        let (x, y, w, h) = (bbox.x0, bbox.y0, bbox.width(), bbox.height());
        Ok(Self {
            paint: imageops::crop_imm(&self.paint, x, y, w, h).to_image(),
            spec: imageops::crop_imm(&self.spec, x, y, w, h).to_image(),
        })
    }

    /// Rotates counter-clockwise by `angle` degrees about the center.
    ///
    /// Quarter turns that keep the canvas shape are exact pixel permutations; other angles
    /// are resampled bicubically.
    pub fn rotate(&self, angle: f64, expand: bool) -> LiveryResult<Self> {
        let turn = angle.rem_euclid(360.0);
        let size = self.size();
        let quarter = (turn / 90.0).round();
        if (turn - quarter * 90.0).abs() < 1e-9 {
            let q = quarter as u32 % 4;
            if q % 2 == 0 || expand || size.width == size.height {
                return Ok(Self {
                    paint: quarter_turn(&self.paint, q),
                    spec: quarter_turn(&self.spec, q),
                });
            }
        }

        let theta = angle.to_radians();
        let out_size = if expand {
            let (w, h) = (f64::from(size.width), f64::from(size.height));
            let (c, s) = (theta.cos().abs(), theta.sin().abs());
            Size::new(
                (w * c + h * s - 1e-6).ceil().max(1.0) as u32,
                (w * s + h * c - 1e-6).ceil().max(1.0) as u32,
            )
        } else {
            size
        };

        // Pixel rows grow downward, so a visual counter-clockwise turn is a negative angle.
        let transform = Affine::translate(out_size.center().to_vec2())
            * Affine::rotate(-theta)
            * Affine::translate(-size.center().to_vec2());

        let resample = |img: &RgbaImage| -> LiveryResult<RgbaImage> {
            let mut canvas = Canvas::new(out_size)?;
            canvas.set_transform(transform);
            canvas.draw_image(img)?;
            canvas.finish()
        };
        Ok(Self {
            paint: resample(&self.paint)?,
            spec: resample(&self.spec)?,
        })
    }

    /// Mirrors both rasters across the given axis of the image.
    pub fn mirror(&self, axis: Axis) -> Self {
        let flip = |img: &RgbaImage| match axis {
            Axis::X => imageops::flip_vertical(img),
            Axis::Y => imageops::flip_horizontal(img),
        };
        Self {
            paint: flip(&self.paint),
            spec: flip(&self.spec),
        }
    }

    /// Resizes both rasters with a Catmull-Rom filter.
    pub fn resize(&self, size: Size) -> LiveryResult<Self> {
        if size.is_empty() {
            return Err(LiveryError::validation(format!(
                "cannot resize a layer to {size}"
            )));
        }
        let filter = imageops::FilterType::CatmullRom;
        Ok(Self {
            paint: imageops::resize(&self.paint, size.width, size.height, filter),
            spec: imageops::resize(&self.spec, size.width, size.height, filter),
        })
    }

    /// Tone-maps paint by the spec metallic channel quantized into [`BRIGHTEN_BINS`] bins.
    ///
    /// Each bin is scaled by `a + b * bin / 255` and composited over an empty accumulator in
    /// ascending bin order. Bins are disjoint, so each pixel ends up as its own scaled value and fully
    /// transparent pixels come out as `[0, 0, 0, 0]`.
    pub fn brighten_by_spec(&self, a: f32, b: f32) -> Self {
        let width = 256 / BRIGHTEN_BINS;
        let mut paint = RgbaImage::new(self.paint.width(), self.paint.height());
        for ((out, p), s) in paint
            .pixels_mut()
            .zip(self.paint.pixels())
            .zip(self.spec.pixels())
        {
            // Compositing onto an empty accumulator drops fully transparent pixels.
            if p.0[3] == 0 {
                continue;
            }
            let bin = u32::from(s.0[0]) / width * width;
            let brightness = a + b * (bin as f32 / 255.0);
            out.0 = scale_rgb(p.0, brightness);
        }
        Self {
            paint,
            spec: self.spec.clone(),
        }
    }
}

/// Counter-clockwise quarter turns.
fn quarter_turn(img: &RgbaImage, q: u32) -> RgbaImage {
    match q {
        0 => img.clone(),
        1 => imageops::rotate270(img),
        2 => imageops::rotate180(img),
        _ => imageops::rotate90(img),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/raster/layer.rs"]
mod tests;
