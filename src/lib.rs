#![forbid(unsafe_code)]
//! Declarative livery compositing.
//!
//! A [`LiveryConfig`] lists sections of layers. Each section is optionally clipped to a boolean
//! expression over the named regions of a [`Template`], its layers are rendered into co-registered
//! paint and spec rasters, and the sections are folded in order into the final [`Layer`].

pub mod build;
pub mod color;
pub mod config;
pub mod foundation;
pub mod geometry;
pub mod layers;
pub mod raster;
pub mod region;
pub mod template;

pub use build::{
    BuildOpts, BuildThreading, CacheMode, LayerCache, LiveryBuilder, build_livery, save_livery,
};
pub use config::model::{LayerSpec, LiveryConfig, SectionConfig};
pub use foundation::core::{BBox, Rgb, Size};
pub use foundation::error::{LiveryError, LiveryResult};
pub use geometry::rounded::compute_path;
pub use layers::ResourcePaths;
pub use raster::layer::{Axis, Layer, SpecSource};
pub use region::expr::{Selection, evaluate};
pub use region::tree::{Mask, NamedRegionTree, RegionNode};
pub use template::loader::{DirTemplateLoader, MemoryTemplateLoader, Template, TemplateLoader};
