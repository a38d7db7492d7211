//! Layer builders: each [`LayerSpec`] variant renders into a [`Layer`] the size of its section.

use std::path::{Path, PathBuf};

use crate::config::model::LayerSpec;
use crate::foundation::core::Size;
use crate::foundation::error::{LiveryError, LiveryResult};
use crate::raster::layer::Layer;

pub mod class_decal;
pub mod decal;
pub mod logo;
pub mod patch;
pub mod pattern;
pub mod solid;
pub mod texture;

/// Environment variable overriding the resource root.
pub const RESOURCE_DIR_ENV: &str = "LIVERY_RESOURCE_DIR";
/// Resource root used when nothing else is configured.
pub const DEFAULT_RESOURCE_DIR: &str = "resources";

/// Where templates, decal images and textures are read from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResourcePaths {
    pub templates: PathBuf,
    pub decals: PathBuf,
    pub textures: PathBuf,
}

impl ResourcePaths {
    /// `<root>/templates`, `<root>/decals`, `<root>/textures`.
    pub fn from_root(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        Self {
            templates: root.join("templates"),
            decals: root.join("decals"),
            textures: root.join("textures"),
        }
    }

    /// Resource root from `LIVERY_RESOURCE_DIR`, else `./resources`.
    pub fn from_env() -> Self {
        match std::env::var_os(RESOURCE_DIR_ENV) {
            Some(root) if !root.is_empty() => Self::from_root(PathBuf::from(root)),
            _ => Self::from_root(DEFAULT_RESOURCE_DIR),
        }
    }
}

impl Default for ResourcePaths {
    fn default() -> Self {
        Self::from_root(DEFAULT_RESOURCE_DIR)
    }
}

/// Everything a builder may read besides its own config.
#[derive(Clone, Copy, Debug)]
pub struct LayerContext<'a> {
    /// Size of the section being built; every builder returns a layer of exactly this size.
    pub size: Size,
    /// Canvas position of the section's upper-left corner.
    pub origin: (i64, i64),
    pub resources: &'a ResourcePaths,
    pub template_dir: Option<&'a Path>,
}

impl<'a> LayerContext<'a> {
    pub fn new(size: Size, resources: &'a ResourcePaths) -> Self {
        Self {
            size,
            origin: (0, 0),
            resources,
            template_dir: None,
        }
    }
}

/// Builds one layer spec into a section-sized layer.
#[tracing::instrument(skip_all, fields(kind = spec.kind(), size = %ctx.size))]
pub fn build_layer(spec: &LayerSpec, ctx: &LayerContext<'_>) -> LiveryResult<Layer> {
    let layer = match spec {
        LayerSpec::Solid(cfg) => solid::build(cfg, ctx),
        LayerSpec::Patch(cfg) => patch::build(cfg, ctx),
        LayerSpec::Decal(cfg) => decal::build(cfg, ctx),
        LayerSpec::Texture(cfg) => texture::build(cfg, ctx),
        LayerSpec::ClassDecal(cfg) => class_decal::build(cfg, ctx),
        LayerSpec::Pattern(cfg) => pattern::build(cfg, ctx),
    }?;
    if layer.size() != ctx.size {
        return Err(LiveryError::size_mismatch(format!(
            "{} layer rendered at {} for a {} section",
            spec.kind(),
            layer.size(),
            ctx.size
        )));
    }
    Ok(layer)
}

#[cfg(test)]
#[path = "../../tests/unit/layers/mod.rs"]
mod tests;
