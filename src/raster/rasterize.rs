use std::sync::Arc;

use image::RgbaImage;

use crate::foundation::core::{Affine, BezPath, Point, Size};
use crate::foundation::error::{LiveryError, LiveryResult};
use crate::foundation::math::{premul_rgba8, unpremul_rgba8};

/// Anti-aliased CPU drawing surface producing a straight-alpha raster.
pub struct Canvas {
    size: Size,
    width: u16,
    height: u16,
    ctx: vello_cpu::RenderContext,
}

impl Canvas {
    pub fn new(size: Size) -> LiveryResult<Self> {
        let (width, height) = size_to_u16(size)?;
        let mut ctx = vello_cpu::RenderContext::new(width, height);
        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        Ok(Self {
            size,
            width,
            height,
            ctx,
        })
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn set_transform(&mut self, transform: Affine) {
        self.ctx.set_transform(affine_to_cpu(transform));
    }

    pub fn fill(&mut self, path: &BezPath, color: image::Rgba<u8>) {
        let [r, g, b, a] = color.0;
        self.ctx
            .set_paint(vello_cpu::peniko::Color::from_rgba8(r, g, b, a));
        self.ctx.fill_path(&bezpath_to_cpu(path));
    }

    /// Strokes centered on the path; a non-positive width draws nothing.
    pub fn stroke(&mut self, path: &BezPath, width: f64, color: image::Rgba<u8>) {
        if width <= 0.0 {
            return;
        }
        let [r, g, b, a] = color.0;
        self.ctx
            .set_paint(vello_cpu::peniko::Color::from_rgba8(r, g, b, a));
        self.ctx.set_stroke(vello_cpu::kurbo::Stroke::new(width));
        self.ctx.stroke_path(&bezpath_to_cpu(path));
    }

    /// Draws `img` with its pixel grid mapped through the current transform, sampled bicubically.
    pub fn draw_image(&mut self, img: &RgbaImage) -> LiveryResult<()> {
        let pixmap = rgba_image_to_pixmap(img)?;
        let (w, h) = (f64::from(pixmap.width()), f64::from(pixmap.height()));
        self.ctx.set_paint(vello_cpu::Image {
            image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
            sampler: vello_cpu::peniko::ImageSampler {
                quality: vello_cpu::peniko::ImageQuality::High,
                ..Default::default()
            },
        });
        self.ctx
            .fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, w, h));
        Ok(())
    }

    pub fn finish(mut self) -> LiveryResult<RgbaImage> {
        let mut pixmap = vello_cpu::Pixmap::new(self.width, self.height);
        self.ctx.flush();
        self.ctx.render_to_pixmap(&mut pixmap);
        pixmap_to_rgba_image(&pixmap, self.size)
    }
}

/// Maps y-up coordinates with the origin at the bottom-left onto a raster of height `height`.
pub fn y_up(height: u32) -> Affine {
    Affine::new([1.0, 0.0, 0.0, -1.0, 0.0, f64::from(height)])
}

pub(crate) fn size_to_u16(size: Size) -> LiveryResult<(u16, u16)> {
    let w: u16 = size
        .width
        .try_into()
        .map_err(|_| LiveryError::validation(format!("raster width {} exceeds u16", size.width)))?;
    let h: u16 = size.height.try_into().map_err(|_| {
        LiveryError::validation(format!("raster height {} exceeds u16", size.height))
    })?;
    if w == 0 || h == 0 {
        return Err(LiveryError::validation(format!(
            "cannot rasterize onto an empty {size} canvas"
        )));
    }
    Ok((w, h))
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn point_to_cpu(p: Point) -> vello_cpu::kurbo::Point {
    vello_cpu::kurbo::Point::new(p.x, p.y)
}

fn bezpath_to_cpu(path: &BezPath) -> vello_cpu::kurbo::BezPath {
    use kurbo::PathEl;

    let mut out = vello_cpu::kurbo::BezPath::new();
    for &el in path.elements() {
        match el {
            PathEl::MoveTo(p) => out.move_to(point_to_cpu(p)),
            PathEl::LineTo(p) => out.line_to(point_to_cpu(p)),
            PathEl::QuadTo(p1, p2) => out.quad_to(point_to_cpu(p1), point_to_cpu(p2)),
            PathEl::CurveTo(p1, p2, p3) => {
                out.curve_to(point_to_cpu(p1), point_to_cpu(p2), point_to_cpu(p3));
            }
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

fn rgba_image_to_pixmap(img: &RgbaImage) -> LiveryResult<vello_cpu::Pixmap> {
    let (w, h) = size_to_u16(Size::new(img.width(), img.height()))?;

    let mut may_have_opacities = false;
    let mut pixels = Vec::with_capacity(img.width() as usize * img.height() as usize);
    for px in img.pixels() {
        let [r, g, b, a] = premul_rgba8(px.0);
        may_have_opacities |= a != 255;
        pixels.push(vello_cpu::peniko::color::PremulRgba8 { r, g, b, a });
    }

    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels,
        w,
        h,
        may_have_opacities,
    ))
}

fn pixmap_to_rgba_image(pixmap: &vello_cpu::Pixmap, size: Size) -> LiveryResult<RgbaImage> {
    let data: Vec<u8> = pixmap
        .data_as_u8_slice()
        .chunks_exact(4)
        .flat_map(|px| unpremul_rgba8([px[0], px[1], px[2], px[3]]))
        .collect();
    RgbaImage::from_raw(size.width, size.height, data)
        .ok_or_else(|| LiveryError::size_mismatch(format!("pixmap does not hold {size} pixels")))
}

#[cfg(test)]
#[path = "../../tests/unit/raster/rasterize.rs"]
mod tests;
