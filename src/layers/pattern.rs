//! Tiled polygon patterns (triangles, hexagons) with per-cell colors.

use std::f64::consts::SQRT_2;

use image::RgbaImage;

use crate::color::field::{ColorFunction, ScalarField};
use crate::color::lookup::{ColorLookup, ColorMap};
use crate::config::model::{PatternKind, PatternLayer, PolyPattern, SpecColor};
use crate::foundation::core::{Affine, BezPath, Point, Rgb, Size};
use crate::foundation::error::LiveryResult;
use crate::layers::LayerContext;
use crate::raster::layer::Layer;
use crate::raster::rasterize::{Canvas, y_up};

const SQRT_3: f64 = 1.732_050_807_568_877_2;
/// Hexagons are drawn slightly oversized so neighbours overlap instead of leaving hairline gaps.
const HEX_OVERDRAW: f64 = 1.04;

/// One polygon of the grid, in y-up pixel coordinates.
#[derive(Clone, Debug, PartialEq)]
pub struct Cell {
    pub center: Point,
    pub vertices: Vec<Point>,
}

impl Cell {
    fn path(&self) -> BezPath {
        let mut path = BezPath::new();
        for (i, p) in self.vertices.iter().enumerate() {
            if i == 0 {
                path.move_to(*p);
            } else {
                path.line_to(*p);
            }
        }
        path.close_path();
        path
    }
}

pub fn build(cfg: &PatternLayer, ctx: &LayerContext<'_>) -> LiveryResult<Layer> {
    let style = cfg.pattern.style();
    let cells = match &cfg.pattern {
        PatternKind::Triangles(p) => triangle_grid(ctx.size, p),
        PatternKind::Hexagons(p) => hexagon_grid(ctx.size, p),
    };
    tracing::debug!(cells = cells.len(), "pattern grid");

    let paint = render(
        ctx.size,
        &cells,
        &Fill {
            flat: style.facecolor,
            cmap: style.face_cmap.as_ref(),
            cfunc: style.face_cfunc.as_ref(),
        },
        style.edgecolor,
        style.edgewidth,
    )?;
    let spec = render(
        ctx.size,
        &cells,
        &Fill {
            flat: style.facespec.map(|s: SpecColor| s.0),
            cmap: style.facespec_cmap.as_ref(),
            cfunc: style.facespec_cfunc.as_ref(),
        },
        style.edgespec.map(|s| s.0),
        style.edgewidth,
    )?;
    Layer::new(paint, spec)
}

/// Grid-space point rotated counter-clockwise by `angle` degrees and scaled by `scale`.
fn grid_transform(angle: f64, scale: f64) -> Affine {
    Affine::scale(scale) * Affine::rotate(angle.rem_euclid(360.0).to_radians())
}

/// Keeps cells whose center lies strictly within one cell size of the canvas.
fn in_bounds(size: Size, margin: f64, p: Point) -> bool {
    p.x > -margin
        && p.x < f64::from(size.width) + margin
        && p.y > -margin
        && p.y < f64::from(size.height) + margin
}

/// Alternating up/down triangles; `cell_size` is the side length.
pub fn triangle_grid(size: Size, p: &PolyPattern) -> Vec<Cell> {
    let t = f64::from(p.cell_size);
    let square = f64::from(size.width.max(size.height)) * SQRT_2;
    let n_x = (square / (t / 2.0)) as i64 + 2;
    let n_y = (square / (t * SQRT_3 / 2.0)) as i64 + 2;
    let grid = grid_transform(p.angle, t + f64::from(p.spacing));
    let unit = [
        Point::new(-0.5, -SQRT_3 / 4.0),
        Point::new(0.5, -SQRT_3 / 4.0),
        Point::new(0.0, SQRT_3 / 4.0),
    ];

    let mut cells = Vec::new();
    for i in -n_x..n_x {
        for j in -n_y..n_y {
            let center = grid * Point::new(i as f64 * 0.5, j as f64 * SQRT_3 / 2.0);
            if !in_bounds(size, t, center) {
                continue;
            }
            let up = (i + j).rem_euclid(2) == 0;
            let angle = if up { p.angle } else { p.angle + 180.0 };
            let shape = Affine::translate(center.to_vec2()) * grid_transform(angle, t);
            cells.push(Cell {
                center,
                vertices: unit.iter().map(|v| shape * *v).collect(),
            });
        }
    }
    cells
}

/// Offset-row hexagon grid; `cell_size` is the vertex-to-vertex diameter.
pub fn hexagon_grid(size: Size, p: &PolyPattern) -> Vec<Cell> {
    let s = f64::from(p.cell_size);
    let square = f64::from(size.width.max(size.height)) * SQRT_2;
    let n_x = (square / (1.5 * s)) as i64 + 2;
    let n_y = (square / (SQRT_3 / 4.0 * s)) as i64 + 2;
    let grid = grid_transform(p.angle, s + f64::from(p.spacing));
    let shape = grid_transform(p.angle, s * HEX_OVERDRAW);
    let unit = [
        Point::new(0.5, 0.0),
        Point::new(0.25, SQRT_3 / 4.0),
        Point::new(-0.25, SQRT_3 / 4.0),
        Point::new(-0.5, 0.0),
        Point::new(-0.25, -SQRT_3 / 4.0),
        Point::new(0.25, -SQRT_3 / 4.0),
    ];

    let mut cells = Vec::new();
    for i in -n_x..n_x {
        for j in -n_y..n_y {
            let x = i as f64 * 1.5 + j.rem_euclid(2) as f64 * 0.75;
            let center = grid * Point::new(x, j as f64 * SQRT_3 / 4.0);
            if !in_bounds(size, s, center) {
                continue;
            }
            let offset = center.to_vec2();
            cells.push(Cell {
                center,
                vertices: unit.iter().map(|v| shape * *v + offset).collect(),
            });
        }
    }
    cells
}

/// How cell faces are colored: a colormap driven by a scalar field, else a flat color, else not
/// at all.
struct Fill<'a> {
    flat: Option<Rgb>,
    cmap: Option<&'a ColorMap>,
    cfunc: Option<&'a ColorFunction>,
}

impl Fill<'_> {
    fn colors(&self, cells: &[Cell]) -> Option<Vec<Rgb>> {
        if let (Some(cmap), Some(cfunc)) = (self.cmap, self.cfunc) {
            let centers: Vec<Point> = cells.iter().map(|c| c.center).collect();
            return Some(
                cfunc
                    .evaluate(&centers)
                    .into_iter()
                    .map(|v| cmap.lookup(v))
                    .collect(),
            );
        }
        self.flat.map(|c| vec![c; cells.len()])
    }
}

fn render(
    size: Size,
    cells: &[Cell],
    fill: &Fill<'_>,
    edge: Option<Rgb>,
    edgewidth: u32,
) -> LiveryResult<RgbaImage> {
    let faces = fill.colors(cells);
    if faces.is_none() && edge.is_none() {
        return Ok(RgbaImage::new(size.width, size.height));
    }

    let mut canvas = Canvas::new(size)?;
    canvas.set_transform(y_up(size.height));
    let width = f64::from(edgewidth);
    for (i, cell) in cells.iter().enumerate() {
        let path = cell.path();
        if let Some(faces) = &faces {
            canvas.fill(&path, faces[i].with_alpha(255));
        }
        if let Some(edge) = edge {
            canvas.stroke(&path, width, edge.with_alpha(255));
        }
    }
    canvas.finish()
}

#[cfg(test)]
#[path = "../../tests/unit/layers/pattern.rs"]
mod tests;
