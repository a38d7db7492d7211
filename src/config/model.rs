use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use crate::color::field::ColorFunction;
use crate::color::lookup::ColorMap;
use crate::foundation::core::{ColorRepr, Rgb};
use crate::foundation::error::{LiveryError, LiveryResult};
use crate::raster::layer::Axis;

/// Named material finishes accepted wherever a spec color is expected.
pub const NAMED_FINISHES: [(&str, Rgb); 9] = [
    ("FLAT", Rgb::new(0, 204, 0)),
    ("MATTE", Rgb::new(0, 127, 0)),
    ("SATIN", Rgb::new(0, 51, 0)),
    ("GLOSS", Rgb::new(0, 0, 0)),
    ("CHROME", Rgb::new(255, 0, 0)),
    ("METALLIC", Rgb::new(229, 102, 0)),
    ("CANDY", Rgb::new(127, 25, 0)),
    ("PEARL", Rgb::new(153, 51, 0)),
    ("VELVET", Rgb::new(204, 255, 0)),
];

/// Looks up a finish by its upper-case name, e.g. `"CHROME"`.
pub fn named_finish(name: &str) -> Option<Rgb> {
    NAMED_FINISHES
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, c)| *c)
}

/// Spec-map color: any [`Rgb`] form, or a named finish.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "ColorRepr", into = "[u8; 3]")]
pub struct SpecColor(pub Rgb);

impl TryFrom<ColorRepr> for SpecColor {
    type Error = LiveryError;

    fn try_from(value: ColorRepr) -> Result<Self, Self::Error> {
        if let ColorRepr::Hex(s) = &value
            && let Some(c) = named_finish(s)
        {
            return Ok(Self(c));
        }
        Rgb::try_from(value).map(Self)
    }
}

impl From<SpecColor> for [u8; 3] {
    fn from(c: SpecColor) -> Self {
        c.0.into()
    }
}

impl From<SpecColor> for Rgb {
    fn from(c: SpecColor) -> Self {
        c.0
    }
}

/// Top-level livery description.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LiveryConfig {
    /// Template name, resolved by the [`TemplateLoader`](crate::template::loader::TemplateLoader).
    pub template: String,
    /// Built and folded in declared order.
    pub sections: Vec<SectionConfig>,
    /// Region expression; pixels outside it are cleared from the finished livery.
    #[serde(default)]
    pub final_mask: Option<String>,
    /// Where [`save_livery`](crate::build::output::save_livery) writes the TGA pair.
    #[serde(default, alias = "iracing_output")]
    pub output: Option<OutputTarget>,
    /// Metallic tone-mapping; off unless present.
    #[serde(default)]
    pub brighten_by_spec: Option<BrightenBySpec>,
}

/// Destination of `car_<N>.tga` and `car_spec_<N>.tga`.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputTarget {
    pub paint_path: PathBuf,
    pub car_number: u32,
}

fn default_brighten_a() -> f32 {
    1.0
}

fn default_brighten_b() -> f32 {
    0.5
}

/// Coefficients of `brightness = a + b * metallic / 255`.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BrightenBySpec {
    #[serde(default = "default_brighten_a")]
    pub a: f32,
    #[serde(default = "default_brighten_b")]
    pub b: f32,
}

impl Default for BrightenBySpec {
    fn default() -> Self {
        Self {
            a: default_brighten_a(),
            b: default_brighten_b(),
        }
    }
}

/// Ordered layers clipped to an optional region selector.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SectionConfig {
    /// Folded into the section in declared order.
    pub layers: Vec<LayerSpec>,
    /// Region expression; `None` targets the whole canvas.
    #[serde(default)]
    pub section: Option<String>,
}

/// One layer of a section, tagged by `type`.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LayerSpec {
    Solid(SolidLayer),
    Patch(PatchLayer),
    Decal(DecalLayer),
    Texture(TextureLayer),
    ClassDecal(ClassDecalLayer),
    Pattern(PatternLayer),
}

impl LayerSpec {
    /// The `type` tag, for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Solid(_) => "SOLID",
            Self::Patch(_) => "PATCH",
            Self::Decal(_) => "DECAL",
            Self::Texture(_) => "TEXTURE",
            Self::ClassDecal(_) => "CLASS_DECAL",
            Self::Pattern(_) => "PATTERN",
        }
    }
}

/// Opaque fill over the whole section.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SolidLayer {
    pub color: Rgb,
    #[serde(default)]
    pub spec: Option<SpecColor>,
}

/// Corner radius for every vertex, or one per vertex.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum Radii {
    Uniform(f64),
    PerVertex(Vec<f64>),
}

/// Reflection about an axis line placed `offset` pixels from the layer center.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MirrorConfig {
    pub axis: Axis,
    #[serde(default)]
    pub offset: i64,
}

/// Rounded polygon, vertices in y-up pixels relative to the layer center.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PatchLayer {
    /// Polygon corners in order; at least three distinct points.
    pub vertices: Vec<[i64; 2]>,
    pub facecolor: Rgb,
    pub edgecolor: Rgb,
    pub facespec: SpecColor,
    pub edgespec: SpecColor,
    /// Edge stroke width in pixels; zero skips the stroke.
    pub edgewidth: u32,
    #[serde(default)]
    pub radii: Option<Radii>,
    /// Draws a second, reflected copy of the patch.
    #[serde(default)]
    pub mirror_patch: Option<MirrorConfig>,
    /// Extends the vertex list with its reflection; `offset` must be 0.
    #[serde(default)]
    pub mirror_vertices: Option<MirrorConfig>,
}

impl PatchLayer {
    /// One radius per vertex.
    pub fn radii_per_vertex(&self) -> Vec<f64> {
        match &self.radii {
            None => vec![0.0; self.vertices.len()],
            Some(Radii::Uniform(r)) => vec![*r; self.vertices.len()],
            Some(Radii::PerVertex(rs)) => rs.clone(),
        }
    }
}

/// Places a reflected twin of a decal.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DecalMirror {
    pub axis: Axis,
    /// Use `180 - rotate` for the twin.
    #[serde(default)]
    pub rotate: bool,
    #[serde(default)]
    pub offset: i64,
}

/// An image or logo centered on a position in the layer.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DecalLayer {
    pub decal: DecalKind,
    /// Decal center in y-up pixels relative to the layer center.
    pub pos: [i64; 2],
    /// Counter-clockwise degrees; the canvas expands to fit.
    #[serde(default)]
    pub rotate: f64,
    #[serde(default)]
    pub mirror: Option<DecalMirror>,
}

/// Decal source, tagged by `type`.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DecalKind {
    Named(NamedDecal),
    Logo(LogoDecal),
}

/// PNG loaded from `<resources>/decals/<name>.png`.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NamedDecal {
    pub name: String,
    /// Replaces the RGB of every pixel, keeping alpha.
    #[serde(default)]
    pub color: Option<Rgb>,
    #[serde(default)]
    pub spec: Option<SpecColor>,
    /// `[width, height]`; a missing side keeps the aspect ratio.
    pub size: [Option<u32>; 2],
}

/// Vector logo rendered at `size` pixels square and cropped to its visible extent.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LogoDecal {
    pub size: u32,
    pub facecolor: Rgb,
    pub edgecolor: Rgb,
    /// Edge width in supersampled pixels; ignored when `edgeratio` is set.
    #[serde(default)]
    pub edgewidth: Option<u32>,
    /// Edge width as a fraction of `size`.
    #[serde(default)]
    pub edgeratio: Option<f64>,
    /// Spec layer stays transparent unless set.
    #[serde(default)]
    pub facespec: Option<SpecColor>,
    #[serde(default)]
    pub edgespec: Option<SpecColor>,
}

/// Bundled tileable textures.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TextureKind {
    CarbonFiber,
}

/// Texture cropped from the top-left of its source image.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TextureLayer {
    pub texture: TextureKind,
}

/// Class artwork stored next to the template regions.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClassDecalLayer {
    /// Directory under the template directory holding the PNGs.
    pub class_name: String,
    pub spec: SpecColor,
}

/// Tiled polygon grid.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PatternLayer {
    pub pattern: PatternKind,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PatternKind {
    Triangles(PolyPattern),
    Hexagons(PolyPattern),
}

impl PatternKind {
    /// Shared styling, whichever cell shape is tiled.
    pub fn style(&self) -> &PolyPattern {
        match self {
            Self::Triangles(p) | Self::Hexagons(p) => p,
        }
    }
}

/// Tiled polygon grid; faces take a flat color or a colormap driven by a color function.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PolyPattern {
    /// Triangle side or hexagon vertex-to-vertex diameter in pixels.
    #[serde(alias = "triangle_size", alias = "hexagon_size")]
    pub cell_size: u32,
    /// Counter-clockwise rotation of the grid in degrees.
    #[serde(default)]
    pub angle: f64,
    #[serde(default)]
    pub facecolor: Option<Rgb>,
    /// Colormap sampled by `face_cfunc` per cell; takes over from `facecolor`.
    #[serde(default)]
    pub face_cmap: Option<ColorMap>,
    #[serde(default)]
    pub face_cfunc: Option<ColorFunction>,
    #[serde(default)]
    pub edgecolor: Option<Rgb>,
    #[serde(default)]
    pub facespec: Option<SpecColor>,
    #[serde(default)]
    pub facespec_cmap: Option<ColorMap>,
    #[serde(default)]
    pub facespec_cfunc: Option<ColorFunction>,
    #[serde(default)]
    pub edgespec: Option<SpecColor>,
    /// Edge stroke width in pixels.
    #[serde(default)]
    pub edgewidth: u32,
    /// Extra pixels between neighboring cells.
    #[serde(default)]
    pub spacing: u32,
}

impl LiveryConfig {
    /// Parses and validates a JSON config.
    pub fn from_reader<R: std::io::Read>(r: R) -> LiveryResult<Self> {
        serde_json::from_reader(r)
            .map_err(|e| LiveryError::validation(format!("parse livery config JSON: {e}")))
    }

    pub fn from_json_str(s: &str) -> LiveryResult<Self> {
        serde_json::from_str(s)
            .map_err(|e| LiveryError::validation(format!("parse livery config JSON: {e}")))
    }

    pub fn from_path(path: impl AsRef<Path>) -> LiveryResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            LiveryError::validation(format!("open livery config '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Checks every section and layer; messages name the offending section and layer.
    pub fn validate(&self) -> LiveryResult<()> {
        if self.template.trim().is_empty() {
            return Err(LiveryError::validation("template must be non-empty"));
        }
        if let Some(m) = &self.final_mask
            && m.trim().is_empty()
        {
            return Err(LiveryError::validation(
                "final_mask must be non-empty when given",
            ));
        }
        if let Some(b) = &self.brighten_by_spec
            && !(b.a.is_finite() && b.b.is_finite())
        {
            return Err(LiveryError::validation(
                "brighten_by_spec coefficients must be finite",
            ));
        }
        for (i, section) in self.sections.iter().enumerate() {
            section
                .validate()
                .map_err(|e| LiveryError::validation(format!("section {i}: {e}")))?;
        }
        Ok(())
    }
}

impl SectionConfig {
    pub fn validate(&self) -> LiveryResult<()> {
        if let Some(s) = &self.section
            && s.trim().is_empty()
        {
            return Err(LiveryError::validation(
                "section selector must be non-empty when given",
            ));
        }
        for (j, layer) in self.layers.iter().enumerate() {
            layer.validate().map_err(|e| {
                LiveryError::validation(format!("layer {j} ({}): {e}", layer.kind()))
            })?;
        }
        Ok(())
    }
}

impl LayerSpec {
    pub fn validate(&self) -> LiveryResult<()> {
        match self {
            Self::Solid(_) | Self::Texture(_) => Ok(()),
            Self::Patch(p) => p.validate(),
            Self::Decal(d) => d.validate(),
            Self::ClassDecal(c) => {
                if c.class_name.trim().is_empty() {
                    return Err(LiveryError::validation("class_name must be non-empty"));
                }
                Ok(())
            }
            Self::Pattern(p) => p.pattern.style().validate(),
        }
    }
}

impl PatchLayer {
    fn validate(&self) -> LiveryResult<()> {
        if self.vertices.len() < 3 {
            return Err(LiveryError::validation(format!(
                "a patch needs at least 3 vertices, got {}",
                self.vertices.len()
            )));
        }
        match &self.radii {
            Some(Radii::PerVertex(rs)) if rs.len() != self.vertices.len() => {
                return Err(LiveryError::validation(format!(
                    "{} radii given for {} vertices",
                    rs.len(),
                    self.vertices.len()
                )));
            }
            _ => {}
        }
        if self.radii_per_vertex().iter().any(|r| !r.is_finite() || *r < 0.0) {
            return Err(LiveryError::validation(
                "patch radii must be finite and non-negative",
            ));
        }
        if let Some(m) = &self.mirror_vertices
            && m.offset != 0
        {
            return Err(LiveryError::validation(
                "mirror_vertices does not support a non-zero offset",
            ));
        }
        Ok(())
    }
}

impl DecalLayer {
    fn validate(&self) -> LiveryResult<()> {
        if !self.rotate.is_finite() {
            return Err(LiveryError::validation("decal rotate must be finite"));
        }
        match &self.decal {
            DecalKind::Named(n) => {
                if n.name.trim().is_empty() {
                    return Err(LiveryError::validation("decal name must be non-empty"));
                }
                if n.size == [None, None] {
                    return Err(LiveryError::validation(
                        "decal size needs at least one of width or height",
                    ));
                }
                if n.size.iter().flatten().any(|s| *s == 0) {
                    return Err(LiveryError::validation("decal size must be > 0"));
                }
            }
            DecalKind::Logo(l) => {
                if l.size == 0 {
                    return Err(LiveryError::validation("logo size must be > 0"));
                }
                if let Some(r) = l.edgeratio
                    && !(0.0..=1.0).contains(&r)
                {
                    return Err(LiveryError::validation(format!(
                        "logo edgeratio must be in 0..=1, got {r}"
                    )));
                }
            }
        }
        Ok(())
    }
}

impl PolyPattern {
    fn validate(&self) -> LiveryResult<()> {
        if self.cell_size == 0 {
            return Err(LiveryError::validation("pattern cell size must be > 0"));
        }
        if !self.angle.is_finite() {
            return Err(LiveryError::validation("pattern angle must be finite"));
        }
        let check = |what: &str,
                     flat: bool,
                     cmap: &Option<ColorMap>,
                     cfunc: &Option<ColorFunction>|
         -> LiveryResult<()> {
            if flat && cmap.is_some() {
                return Err(LiveryError::validation(format!(
                    "{what} color and colormap are mutually exclusive"
                )));
            }
            if cmap.is_some() != cfunc.is_some() {
                return Err(LiveryError::validation(format!(
                    "{what} colormap and color function must be given together"
                )));
            }
            if let Some(m) = cmap {
                m.validate()?;
            }
            if let Some(f) = cfunc {
                f.validate()?;
            }
            Ok(())
        };
        check(
            "face",
            self.facecolor.is_some(),
            &self.face_cmap,
            &self.face_cfunc,
        )?;
        check(
            "facespec",
            self.facespec.is_some(),
            &self.facespec_cmap,
            &self.facespec_cfunc,
        )
    }
}

#[cfg(test)]
#[path = "../../tests/unit/config/model.rs"]
mod tests;
