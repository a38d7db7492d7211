use crate::color::util::color_spread;
use crate::foundation::core::Rgb;
use crate::foundation::error::{LiveryError, LiveryResult};

/// Maps a scalar in `[0, 1]` to a color.
pub trait ColorLookup {
    fn lookup(&self, value: f64) -> Rgb;
}

fn default_levels() -> u32 {
    256
}

/// A colormap stop: a plain color, or a `{color, spread}` pair expanding to a darker and a
/// brighter stop.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum ColorEntry {
    Spread { color: Rgb, spread: f64 },
    Plain(Rgb),
}

/// Piecewise-linear colormap quantized to `n_levels` discrete colors.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LinearSegmented {
    pub colors: Vec<ColorEntry>,
    /// Interior stop positions; the outer stops sit at 0 and 1.
    #[serde(default)]
    pub segments: Option<Vec<f64>>,
    #[serde(default = "default_levels")]
    pub n_levels: u32,
}

impl LinearSegmented {
    /// Stops after spread expansion.
    pub fn stops(&self) -> Vec<Rgb> {
        let mut out = Vec::with_capacity(self.colors.len() * 2);
        for entry in &self.colors {
            match entry {
                ColorEntry::Plain(c) => out.push(*c),
                ColorEntry::Spread { color, spread } => out.extend(color_spread(*color, *spread)),
            }
        }
        out
    }

    fn positions(&self, count: usize) -> Vec<f64> {
        match &self.segments {
            Some(inner) if inner.len() + 2 == count => std::iter::once(0.0)
                .chain(inner.iter().copied())
                .chain(std::iter::once(1.0))
                .collect(),
            _ => (0..count)
                .map(|i| i as f64 / (count - 1) as f64)
                .collect(),
        }
    }

    pub fn validate(&self) -> LiveryResult<()> {
        let stops = self.stops();
        if stops.len() < 2 {
            return Err(LiveryError::validation(format!(
                "a colormap needs at least 2 colors, got {}",
                stops.len()
            )));
        }
        if self.n_levels < 2 {
            return Err(LiveryError::validation(format!(
                "n_levels must be at least 2, got {}",
                self.n_levels
            )));
        }
        if let Some(segments) = &self.segments {
            if segments.len() != stops.len() - 2 {
                return Err(LiveryError::validation(format!(
                    "{} colors need {} segments, got {}",
                    stops.len(),
                    stops.len() - 2,
                    segments.len()
                )));
            }
            let pos = self.positions(stops.len());
            if segments.iter().any(|s| !s.is_finite()) || pos.windows(2).any(|w| w[0] >= w[1]) {
                return Err(LiveryError::validation(
                    "segments must be strictly increasing inside (0, 1)",
                ));
            }
        }
        Ok(())
    }

    /// Color at continuous position `t`, before quantization.
    fn interpolate(stops: &[Rgb], pos: &[f64], t: f64) -> Rgb {
        let i = pos
            .windows(2)
            .position(|w| t <= w[1])
            .unwrap_or(pos.len().saturating_sub(2));
        let (a, b) = (stops[i], stops[i + 1]);
        let span = pos[i + 1] - pos[i];
        let f = if span > 0.0 {
            ((t - pos[i]) / span).clamp(0.0, 1.0)
        } else {
            0.0
        };
        let mix = |x: u8, y: u8| {
            (f64::from(x) + (f64::from(y) - f64::from(x)) * f)
                .round()
                .clamp(0.0, 255.0) as u8
        };
        Rgb::new(mix(a.r, b.r), mix(a.g, b.g), mix(a.b, b.b))
    }
}

impl ColorLookup for LinearSegmented {
    fn lookup(&self, value: f64) -> Rgb {
        let stops = self.stops();
        if stops.len() < 2 {
            return stops.first().copied().unwrap_or(Rgb::BLACK);
        }
        let pos = self.positions(stops.len());
        let n = self.n_levels.max(2);
        let v = if value.is_nan() { 0.0 } else { value };
        let level = ((v * f64::from(n)).floor().max(0.0) as u32).min(n - 1);
        let t = f64::from(level) / f64::from(n - 1);
        Self::interpolate(&stops, &pos, t)
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ColorMap {
    LinearSegmented(LinearSegmented),
}

impl ColorMap {
    pub fn validate(&self) -> LiveryResult<()> {
        match self {
            Self::LinearSegmented(m) => m.validate(),
        }
    }
}

impl ColorLookup for ColorMap {
    fn lookup(&self, value: f64) -> Rgb {
        match self {
            Self::LinearSegmented(m) => m.lookup(value),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/color/lookup.rs"]
mod tests;
