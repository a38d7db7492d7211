use crate::foundation::error::{LiveryError, LiveryResult};

pub use kurbo::{Affine, BezPath, Point, Rect, Vec2};

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn pixel_count(self) -> usize {
        self.width as usize * self.height as usize
    }

    pub fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn center(self) -> Point {
        Point::new(f64::from(self.width) / 2.0, f64::from(self.height) / 2.0)
    }
}

impl std::fmt::Display for Size {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Axis-aligned pixel rectangle, upper bounds exclusive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct BBox {
    pub x0: u32,
    pub y0: u32,
    pub x1: u32, // exclusive
    pub y1: u32, // exclusive
}

impl BBox {
    pub fn new(x0: u32, y0: u32, x1: u32, y1: u32) -> LiveryResult<Self> {
        if x0 > x1 || y0 > y1 {
            return Err(LiveryError::validation(format!(
                "bbox ({x0},{y0},{x1},{y1}) has negative extent"
            )));
        }
        Ok(Self { x0, y0, x1, y1 })
    }

    pub fn full(size: Size) -> Self {
        Self {
            x0: 0,
            y0: 0,
            x1: size.width,
            y1: size.height,
        }
    }

    pub fn width(self) -> u32 {
        self.x1 - self.x0
    }

    pub fn height(self) -> u32 {
        self.y1 - self.y0
    }

    pub fn size(self) -> Size {
        Size::new(self.width(), self.height())
    }

    pub fn origin(self) -> (i64, i64) {
        (i64::from(self.x0), i64::from(self.y0))
    }

    pub fn fits_within(self, size: Size) -> bool {
        self.x1 <= size.width && self.y1 <= size.height
    }
}

/// Straight (non-premultiplied) 8-bit RGB color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "ColorRepr", into = "[u8; 3]")]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Self = Self::new(0, 0, 0);
    pub const WHITE: Self = Self::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Converts unit floats the same way config input does: truncating `v * 255`.
    pub fn from_unit(r: f64, g: f64, b: f64) -> Self {
        fn to_u8(v: f64) -> u8 {
            (v.clamp(0.0, 1.0) * 255.0) as u8
        }
        Self::new(to_u8(r), to_u8(g), to_u8(b))
    }

    pub fn parse_hex(s: &str) -> LiveryResult<Self> {
        let hex = s
            .strip_prefix('#')
            .filter(|h| h.len() == 6 && h.bytes().all(|b| b.is_ascii_hexdigit()))
            .ok_or_else(|| {
                LiveryError::validation(format!("color string must be in the form #FFFFFF: '{s}'"))
            })?;
        let channel = |i: usize| {
            u8::from_str_radix(&hex[i..i + 2], 16)
                .map_err(|e| LiveryError::validation(format!("invalid hex color '{s}': {e}")))
        };
        Ok(Self::new(channel(0)?, channel(2)?, channel(4)?))
    }

    pub fn to_unit(self) -> [f64; 3] {
        [
            f64::from(self.r) / 255.0,
            f64::from(self.g) / 255.0,
            f64::from(self.b) / 255.0,
        ]
    }

    pub fn to_hex(self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }

    pub fn with_alpha(self, a: u8) -> image::Rgba<u8> {
        image::Rgba([self.r, self.g, self.b, a])
    }
}

impl From<Rgb> for [u8; 3] {
    fn from(c: Rgb) -> Self {
        [c.r, c.g, c.b]
    }
}

#[derive(serde::Deserialize)]
#[serde(untagged)]
pub(crate) enum ColorRepr {
    Hex(String),
    Ints(Vec<i64>),
    Floats(Vec<f64>),
}

impl TryFrom<ColorRepr> for Rgb {
    type Error = LiveryError;

    fn try_from(value: ColorRepr) -> Result<Self, Self::Error> {
        match value {
            ColorRepr::Hex(s) => Rgb::parse_hex(&s),
            ColorRepr::Ints(v) => {
                let [r, g, b] = <[i64; 3]>::try_from(v.as_slice()).map_err(|_| {
                    LiveryError::validation(format!("color must have 3 channels, got {}", v.len()))
                })?;
                let ch = |x: i64| {
                    u8::try_from(x).map_err(|_| {
                        LiveryError::validation(format!(
                            "integer color channels must be in the range 0-255, got {x}"
                        ))
                    })
                };
                Ok(Rgb::new(ch(r)?, ch(g)?, ch(b)?))
            }
            ColorRepr::Floats(v) => {
                let [r, g, b] = <[f64; 3]>::try_from(v.as_slice()).map_err(|_| {
                    LiveryError::validation(format!("color must have 3 channels, got {}", v.len()))
                })?;
                if [r, g, b].iter().any(|x| !(0.0..=1.0).contains(x)) {
                    return Err(LiveryError::validation(
                        "float color channels must be in the range 0-1",
                    ));
                }
                Ok(Rgb::from_unit(r, g, b))
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
