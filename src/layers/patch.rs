use crate::config::model::{MirrorConfig, PatchLayer};
use crate::foundation::core::{Point, Size, Vec2};
use crate::foundation::error::{LiveryError, LiveryResult};
use crate::geometry::rounded::compute_path;
use crate::layers::LayerContext;
use crate::raster::layer::{Axis, Layer};
use crate::raster::rasterize::{Canvas, y_up};

pub fn build(cfg: &PatchLayer, ctx: &LayerContext<'_>) -> LiveryResult<Layer> {
    let mut vertices: Vec<Point> = cfg
        .vertices
        .iter()
        .map(|[x, y]| Point::new(*x as f64, *y as f64))
        .collect();
    let mut radii = cfg.radii_per_vertex();
    if let Some(m) = &cfg.mirror_vertices {
        mirror_vertices(&mut vertices, &mut radii, m)?;
    }

    let mut layer = draw_patch(ctx.size, &vertices, &radii, cfg)?;
    if let Some(m) = &cfg.mirror_patch {
        let (reflect, offset) = reflection(m);
        let mirrored: Vec<Point> = vertices
            .iter()
            .map(|v| {
                let d = v.to_vec2() - offset;
                (Vec2::new(d.x * reflect.x, d.y * reflect.y) + offset).to_point()
            })
            .collect();
        layer = layer.flatten(&draw_patch(ctx.size, &mirrored, &radii, cfg)?, (0, 0));
    }
    Ok(layer)
}

/// Appends the reversed vertex list reflected across `axis`, doubling the polygon into a
/// symmetric one.
pub fn mirror_vertices(
    vertices: &mut Vec<Point>,
    radii: &mut Vec<f64>,
    m: &MirrorConfig,
) -> LiveryResult<()> {
    if m.offset != 0 {
        return Err(LiveryError::validation(
            "mirror_vertices does not support a non-zero offset",
        ));
    }
    let reflected: Vec<Point> = vertices
        .iter()
        .rev()
        .map(|v| match m.axis {
            Axis::Y => Point::new(-v.x, v.y),
            Axis::X => Point::new(v.x, -v.y),
        })
        .collect();
    let reversed_radii: Vec<f64> = radii.iter().rev().copied().collect();
    vertices.extend(reflected);
    radii.extend(reversed_radii);
    Ok(())
}

/// Per-axis scale and pivot for a whole-patch mirror.
fn reflection(m: &MirrorConfig) -> (Vec2, Vec2) {
    let off = m.offset as f64;
    match m.axis {
        Axis::Y => (Vec2::new(-1.0, 1.0), Vec2::new(off, 0.0)),
        Axis::X => (Vec2::new(1.0, -1.0), Vec2::new(0.0, off)),
    }
}

/// Patch vertices are relative to the layer center, rounded half to even.
pub(crate) fn layer_center(size: Size) -> Vec2 {
    Vec2::new(
        (f64::from(size.width) / 2.0).round_ties_even(),
        (f64::from(size.height) / 2.0).round_ties_even(),
    )
}

fn draw_patch(
    size: Size,
    vertices: &[Point],
    radii: &[f64],
    cfg: &PatchLayer,
) -> LiveryResult<Layer> {
    let center = layer_center(size);
    let shifted: Vec<Point> = vertices.iter().map(|v| *v + center).collect();
    let path = compute_path(&shifted, radii)?;
    let width = f64::from(cfg.edgewidth);

    let render = |face: image::Rgba<u8>, edge: image::Rgba<u8>| -> LiveryResult<image::RgbaImage> {
        let mut canvas = Canvas::new(size)?;
        canvas.set_transform(y_up(size.height));
        canvas.fill(&path, face);
        canvas.stroke(&path, width, edge);
        canvas.finish()
    };

    let paint = render(
        cfg.facecolor.with_alpha(255),
        cfg.edgecolor.with_alpha(255),
    )?;
    let spec = render(
        cfg.facespec.0.with_alpha(255),
        cfg.edgespec.0.with_alpha(255),
    )?;
    Layer::new(paint, spec)
}

#[cfg(test)]
#[path = "../../tests/unit/layers/patch.rs"]
mod tests;
