use kurbo::{Arc, BezPath, Point, Vec2};

use crate::foundation::error::{LiveryError, LiveryResult};
use crate::foundation::math::cross3;

/// Flattening tolerance for corner arcs, in pixels.
const ARC_TOLERANCE: f64 = 1e-3;

/// Which side of the line `a -> b` the point `c` lies on: -1, 0 or 1.
fn side(a: Point, b: Point, c: Point) -> i8 {
    let d = cross3(a, b, c);
    if d > 0.0 {
        1
    } else if d < 0.0 {
        -1
    } else {
        0
    }
}

/// Drops consecutive duplicates, treating the vertex list as a ring.
fn dedupe_cyclic(vertices: &[Point], radii: &[f64]) -> (Vec<Point>, Vec<f64>) {
    let mut pts: Vec<Point> = Vec::with_capacity(vertices.len());
    let mut rs: Vec<f64> = Vec::with_capacity(radii.len());
    for (p, r) in vertices.iter().zip(radii) {
        if pts.last() != Some(p) {
            pts.push(*p);
            rs.push(*r);
        }
    }
    while pts.len() > 1 && pts.last() == pts.first() {
        pts.pop();
        rs.pop();
    }
    (pts, rs)
}

/// Center of the circle of `radius` tangent to both edges meeting at `curr`.
fn find_center(prev: Point, curr: Point, next: Point, radius: f64) -> LiveryResult<Point> {
    let (p0, p1) = (prev.x, prev.y);
    let (c0, c1) = (curr.x, curr.y);
    let (n0, n1) = (next.x, next.y);

    let dp = radius * (c1 - p1).hypot(c0 - p0);
    let dn = radius * (c1 - n1).hypot(c0 - n0);
    let p = p1 * c0 - p0 * c1;
    let n = n1 * c0 - n0 * c1;

    // [[a, b], [c, d]] * center = rhs
    let (a, b, c, d) = (p1 - c1, c0 - p0, n1 - c1, c0 - n0);
    let det = a * d - b * c;
    if det == 0.0 || !det.is_finite() {
        return Err(LiveryError::degenerate(format!(
            "cannot place a corner arc at {curr:?}: neighbors are on a line"
        )));
    }

    let want = (side(prev, curr, next), side(next, curr, prev));
    for (sp, sn) in [(-1.0, -1.0), (-1.0, 1.0), (1.0, -1.0), (1.0, 1.0)] {
        let (rp, rn) = (p + sp * dp, n + sn * dn);
        let root = Point::new((rp * d - b * rn) / det, (a * rn - rp * c) / det);
        if (side(prev, curr, root), side(next, curr, root)) == want {
            return Ok(root);
        }
    }
    Err(LiveryError::degenerate(format!(
        "no corner arc of radius {radius} fits at {curr:?}"
    )))
}

/// Foot of the perpendicular from `center` onto the line through `from` and `to`.
fn project(from: Point, to: Point, center: Point) -> Point {
    let edge = to - from;
    from + edge * ((center - from).dot(edge) / edge.hypot2())
}

/// Arc from `start` to `end` around `center`, turning the way `start -> end` does.
fn corner_arc(center: Point, start: Point, end: Point) -> Arc {
    let angle = |p: Point| (p.y - center.y).atan2(p.x - center.x);
    let (a0, a1) = (angle(start), angle(end));
    let tau = std::f64::consts::TAU;
    let sweep = if side(center, start, end) < 0 {
        -(a0 - a1).rem_euclid(tau)
    } else {
        (a1 - a0).rem_euclid(tau)
    };
    let radius = (start - center).hypot();
    Arc::new(center, Vec2::new(radius, radius), a0, sweep, 0.0)
}

/// Builds a closed polygon path whose corners are rounded by the per-vertex `radii`.
///
/// A zero radius or a collinear neighborhood leaves a sharp corner at that vertex.
pub fn compute_path(vertices: &[Point], radii: &[f64]) -> LiveryResult<BezPath> {
    if radii.len() != vertices.len() {
        return Err(LiveryError::degenerate(format!(
            "{} radii given for {} vertices",
            radii.len(),
            vertices.len()
        )));
    }
    if let Some(r) = radii.iter().find(|r| !r.is_finite() || **r < 0.0) {
        return Err(LiveryError::degenerate(format!(
            "corner radius must be finite and non-negative, got {r}"
        )));
    }

    let (pts, rs) = dedupe_cyclic(vertices, radii);
    if pts.len() < 3 {
        return Err(LiveryError::degenerate(format!(
            "a polygon needs at least 3 distinct vertices, got {}",
            pts.len()
        )));
    }

    let n = pts.len();
    let mut path = BezPath::new();
    let mut started = false;
    let mut reach = |path: &mut BezPath, p: Point| {
        if started {
            path.line_to(p);
        } else {
            path.move_to(p);
            started = true;
        }
    };

    for i in 0..n {
        let prev = pts[(i + n - 1) % n];
        let curr = pts[i];
        let next = pts[(i + 1) % n];

        if rs[i] == 0.0 || cross3(prev, curr, next) == 0.0 {
            reach(&mut path, curr);
            continue;
        }

        let center = find_center(prev, curr, next, rs[i])?;
        let entry = project(prev, curr, center);
        let exit = project(next, curr, center);
        reach(&mut path, entry);
        corner_arc(center, entry, exit)
            .append_iter(ARC_TOLERANCE)
            .for_each(|el| path.push(el));
    }
    path.close_path();
    Ok(path)
}

#[cfg(test)]
#[path = "../../tests/unit/geometry/rounded.rs"]
mod tests;
