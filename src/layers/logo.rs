//! Vector logo decal: a stylized triangular mark with an accent stroke.

use crate::config::model::LogoDecal;
use crate::foundation::core::{Affine, BezPath, Point, Size, Vec2};
use crate::foundation::error::{LiveryError, LiveryResult};
use crate::raster::layer::Layer;
use crate::raster::rasterize::Canvas;
use crate::region::tree::Mask;

/// The geometry is laid out at this multiple of the target size; edge widths are in those units.
pub const SUPERSAMPLE: u32 = 4;

const BAR_RATIO: f64 = 0.18;
const ACCENT_RATIO: f64 = BAR_RATIO / 4.0;
const RADIUS_PAD: f64 = 0.1;

/// Outline and accent polygons in supersampled y-down units, plus the side of the square canvas
/// they live on.
struct LogoGeometry {
    main: Vec<Point>,
    aux: Vec<Point>,
    side: u32,
}

fn geometry(size: u32) -> LogoGeometry {
    let a = f64::from(size * SUPERSAMPLE);
    let b = a * BAR_RATIO;
    let c = a * ACCENT_RATIO;
    let h = 3f64.sqrt() / 2.0;

    let main = [
        Point::new(b, 0.0),
        Point::new(a - b, 0.0),
        Point::new(a - b / 2.0, h * b),
        Point::new(1.5 * b, h * b),
        Point::new((a + b) / 2.0, h * (a - b)),
        Point::new((a - b) / 2.0, h * (a - b)),
        Point::new(b / 2.0, h * b),
    ];

    let (sin60, cos60) = 60f64.to_radians().sin_cos();
    let accent = Vec2::new(-cos60 * c, sin60 * c);
    let mid = main[1].midpoint(main[5]);
    let aux = [
        mid + Vec2::new(b, 0.0) + accent,
        mid + accent,
        main[2] - Vec2::new(b, 0.0) + accent,
        main[2] + accent,
    ];

    // Circumscribing circle about the triangle's centroid, padded and snapped to whole pixels.
    let center = Point::new((a / 2.0).trunc(), (a / 2.0 / 3f64.sqrt()).trunc());
    let radius = (main[0] - center).hypot().trunc();
    let radius = (radius * (1.0 + RADIUS_PAD)).trunc();
    let shift = Vec2::new(radius - center.x, radius - center.y);

    LogoGeometry {
        main: main.iter().map(|p| *p + shift).collect(),
        aux: aux.iter().map(|p| *p + shift).collect(),
        side: (2.0 * radius) as u32,
    }
}

fn polygon(points: &[Point]) -> BezPath {
    let mut path = BezPath::new();
    for (i, p) in points.iter().enumerate() {
        if i == 0 {
            path.move_to(*p);
        } else {
            path.line_to(*p);
        }
    }
    path.close_path();
    path
}

/// Renders the logo and crops it to its visible extent.
pub fn logo_layer(cfg: &LogoDecal) -> LiveryResult<Layer> {
    let geo = geometry(cfg.size);
    let out_side = geo.side / SUPERSAMPLE;
    let out = Size::new(out_side, out_side);
    if out.is_empty() {
        return Err(LiveryError::degenerate(format!(
            "logo of size {} is too small to draw",
            cfg.size
        )));
    }

    let edgewidth = match cfg.edgeratio {
        Some(r) => f64::from(cfg.size) * r,
        None => cfg.edgewidth.map(f64::from).unwrap_or(0.0),
    }
    .trunc();

    // Flip to y-up and scale the supersampled layout down to the output grid.
    let k = f64::from(out_side) / f64::from(geo.side);
    let transform = Affine::new([k, 0.0, 0.0, -k, 0.0, f64::from(out_side)]);
    let main = polygon(&geo.main);
    let aux = polygon(&geo.aux);

    let render = |face: Option<image::Rgba<u8>>,
                  edge: Option<image::Rgba<u8>>|
     -> LiveryResult<image::RgbaImage> {
        let mut canvas = Canvas::new(out)?;
        canvas.set_transform(transform);
        if let Some(face) = face {
            canvas.fill(&main, face);
            canvas.fill(&aux, face);
        }
        if let Some(edge) = edge {
            canvas.stroke(&main, edgewidth * k, edge);
            canvas.stroke(&aux, edgewidth * k, edge);
        }
        canvas.finish()
    };

    let paint = render(
        Some(cfg.facecolor.with_alpha(255)),
        Some(cfg.edgecolor.with_alpha(255)),
    )?;
    let spec = render(
        cfg.facespec.map(|s| s.0.with_alpha(255)),
        cfg.edgespec.map(|s| s.0.with_alpha(255)),
    )?;

    let bbox = Mask::from_fn(out, |x, y| paint.get_pixel(x, y).0[3] > 0)
        .bbox()
        .ok_or_else(|| LiveryError::degenerate("logo rendered no visible pixels"))?;
    Layer::new(paint, spec)?.crop(bbox)
}

#[cfg(test)]
#[path = "../../tests/unit/layers/logo.rs"]
mod tests;
