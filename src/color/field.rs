use noise::NoiseFn as _;
use rand::{Rng, SeedableRng};

use crate::foundation::core::{Point, Vec2};
use crate::foundation::error::{LiveryError, LiveryResult};

/// A scalar value per sample point, used to drive colormap lookups.
pub trait ScalarField {
    fn evaluate(&self, points: &[Point]) -> Vec<f64>;
}

fn default_range() -> [f64; 2] {
    [0.0, 1.0]
}

/// Rescales `data` to span `range` exactly; a constant field maps to `range[0]`.
fn standardize(mut data: Vec<f64>, range: [f64; 2]) -> Vec<f64> {
    let (lo, hi) = data
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(*v), hi.max(*v))
        });
    let span = hi - lo;
    for v in &mut data {
        let t = if span > 0.0 { (*v - lo) / span } else { 0.0 };
        *v = range[0] + t * (range[1] - range[0]);
    }
    data
}

/// Projection of each point onto `direction`.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Gradient {
    pub direction: [f64; 2],
    #[serde(default = "default_range")]
    pub range: [f64; 2],
}

impl ScalarField for Gradient {
    fn evaluate(&self, points: &[Point]) -> Vec<f64> {
        let dir = Vec2::new(self.direction[0], self.direction[1]).normalize();
        standardize(
            points.iter().map(|p| p.to_vec2().dot(dir)).collect(),
            self.range,
        )
    }
}

/// Seeded uniform noise, one draw per point in order.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RandomUniform {
    #[serde(default)]
    pub seed: u64,
    #[serde(default = "default_range")]
    pub range: [f64; 2],
}

impl ScalarField for RandomUniform {
    fn evaluate(&self, points: &[Point]) -> Vec<f64> {
        let mut rng = rand::rngs::StdRng::seed_from_u64(self.seed);
        let [lo, hi] = self.range;
        points
            .iter()
            .map(|_| lo + rng.gen_range(0.0..1.0) * (hi - lo))
            .collect()
    }
}

/// Seeded OpenSimplex noise sampled on rotated, per-axis scaled coordinates.
///
/// Points are rotated by `-angle` degrees (raster rows grow downward), divided by `length_scale`
/// on each axis, then the noise values are standardized to `range`.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SimplexNoise {
    pub length_scale: [f64; 2],
    #[serde(default)]
    pub angle: f64,
    #[serde(default)]
    pub seed: u32,
    #[serde(default = "default_range")]
    pub range: [f64; 2],
}

impl ScalarField for SimplexNoise {
    fn evaluate(&self, points: &[Point]) -> Vec<f64> {
        let noise = noise::OpenSimplex::new(self.seed);
        let (sin, cos) = (-self.angle.to_radians()).sin_cos();
        let [sx, sy] = self.length_scale;
        standardize(
            points
                .iter()
                .map(|p| {
                    let x = p.x * cos + p.y * sin;
                    let y = p.y * cos - p.x * sin;
                    noise.get([x / sx, y / sy])
                })
                .collect(),
            self.range,
        )
    }
}

/// Point-wise sum of several fields, standardized to `range`.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Composed {
    pub color_functions: Vec<ColorFunction>,
    #[serde(default = "default_range")]
    pub range: [f64; 2],
}

impl ScalarField for Composed {
    fn evaluate(&self, points: &[Point]) -> Vec<f64> {
        let mut sum = vec![0.0; points.len()];
        for f in &self.color_functions {
            for (acc, v) in sum.iter_mut().zip(f.evaluate(points)) {
                *acc += v;
            }
        }
        standardize(sum, self.range)
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ColorFunction {
    Gradient(Gradient),
    RandomUniform(RandomUniform),
    SimplexNoise(SimplexNoise),
    Composed(Composed),
}

impl ColorFunction {
    pub fn validate(&self) -> LiveryResult<()> {
        let check_range = |range: [f64; 2]| {
            if range.iter().all(|v| v.is_finite()) {
                Ok(())
            } else {
                Err(LiveryError::validation(format!(
                    "color function range must be finite, got {range:?}"
                )))
            }
        };
        match self {
            Self::Gradient(g) => {
                let d = Vec2::new(g.direction[0], g.direction[1]);
                if !d.is_finite() || d.hypot2() == 0.0 {
                    return Err(LiveryError::validation(
                        "gradient direction must be a finite non-zero vector",
                    ));
                }
                check_range(g.range)
            }
            Self::RandomUniform(r) => check_range(r.range),
            Self::SimplexNoise(n) => {
                if !n.angle.is_finite() {
                    return Err(LiveryError::validation(format!(
                        "simplex noise angle must be finite, got {}",
                        n.angle
                    )));
                }
                if n.length_scale.iter().any(|s| !s.is_finite() || *s == 0.0) {
                    return Err(LiveryError::validation(format!(
                        "simplex noise length_scale must be finite and non-zero, got {:?}",
                        n.length_scale
                    )));
                }
                check_range(n.range)
            }
            Self::Composed(c) => {
                if c.color_functions.is_empty() {
                    return Err(LiveryError::validation(
                        "composed color function needs at least one member",
                    ));
                }
                for f in &c.color_functions {
                    f.validate()?;
                }
                check_range(c.range)
            }
        }
    }
}

impl ScalarField for ColorFunction {
    fn evaluate(&self, points: &[Point]) -> Vec<f64> {
        match self {
            Self::Gradient(g) => g.evaluate(points),
            Self::RandomUniform(r) => r.evaluate(points),
            Self::SimplexNoise(n) => n.evaluate(points),
            Self::Composed(c) => c.evaluate(points),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/color/field.rs"]
mod tests;
