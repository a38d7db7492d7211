use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use sha2::Digest as _;

use crate::foundation::core::Size;
use crate::foundation::error::{LiveryError, LiveryResult};
use crate::region::tree::{Mask, NamedRegionTree};

/// Subdirectory of a template directory holding the region masks.
pub const REGIONS_DIR: &str = "regions";

/// Resolved template: canvas size, region namespace and a content hash keying the layer cache.
#[derive(Clone, Debug)]
pub struct Template {
    pub name: String,
    pub size: Size,
    pub content_hash: String,
    pub regions: NamedRegionTree,
    /// On-disk template directory; class decals are looked up beneath it.
    pub dir: Option<PathBuf>,
}

impl Template {
    /// Builds a template from masks already in memory. The content hash covers the name, the
    /// region names and every mask bit.
    pub fn in_memory(name: impl Into<String>, regions: NamedRegionTree) -> LiveryResult<Self> {
        let name = name.into();
        let mut hasher = sha2::Sha256::new();
        hasher.update(name.as_bytes());
        hasher.update([0u8]);
        let size = regions.size();
        hasher.update(size.width.to_le_bytes());
        hasher.update(size.height.to_le_bytes());
        for region in regions.names() {
            let mask = regions.resolve(&region)?;
            hasher.update(region.as_bytes());
            hasher.update([0u8]);
            hasher.update(
                mask.bits()
                    .iter()
                    .map(|b| u8::from(*b))
                    .collect::<Vec<u8>>(),
            );
        }
        Ok(Self {
            name,
            size,
            content_hash: format!("{:x}", hasher.finalize()),
            regions,
            dir: None,
        })
    }
}

pub trait TemplateLoader: Send + Sync {
    fn load(&self, name: &str) -> LiveryResult<Template>;
}

/// Reads `<root>/<name>/regions/**.png`. Directories become groups, file stems become leaves, and a
/// pixel is inside a region when its alpha is 255.
#[derive(Clone, Debug)]
pub struct DirTemplateLoader {
    root: PathBuf,
}

impl DirTemplateLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl TemplateLoader for DirTemplateLoader {
    #[tracing::instrument(skip(self), fields(root = %self.root.display()))]
    fn load(&self, name: &str) -> LiveryResult<Template> {
        let rel = normalize_rel_path(name)?;
        let dir = self.root.join(&rel);
        let regions_dir = dir.join(REGIONS_DIR);
        if !regions_dir.is_dir() {
            return Err(LiveryError::validation(format!(
                "template '{name}' has no region directory at '{}'",
                regions_dir.display()
            )));
        }

        let files = collect_pngs(&regions_dir)?;
        if files.is_empty() {
            return Err(LiveryError::validation(format!(
                "template '{name}' defines no regions"
            )));
        }

        let mut hasher = sha2::Sha256::new();
        let mut images = Vec::with_capacity(files.len());
        for (rel_path, path) in &files {
            let bytes = std::fs::read(path)
                .map_err(|e| LiveryError::io(format!("read '{}': {e}", path.display())))?;
            hasher.update(rel_path.as_bytes());
            hasher.update([0u8]);
            hasher.update(&bytes);
            let img = image::load_from_memory(&bytes)
                .map_err(|e| LiveryError::image(format!("decode '{}': {e}", path.display())))?
                .to_rgba8();
            images.push((region_path(rel_path), img));
        }

        let size = images.iter().fold(Size::new(0, 0), |acc, (_, img)| {
            Size::new(acc.width.max(img.width()), acc.height.max(img.height()))
        });
        let mut regions = NamedRegionTree::new(size);
        for (region, img) in images {
            let mask = if img.dimensions() == (size.width, size.height) {
                Mask::from_alpha(&img)
            } else {
                Mask::from_fn(size, |x, y| {
                    x < img.width() && y < img.height() && img.get_pixel(x, y).0[3] == 255
                })
            };
            regions.insert(&region, mask)?;
        }

        tracing::debug!(regions = files.len(), %size, "loaded template");
        Ok(Template {
            name: name.to_string(),
            size,
            content_hash: format!("{:x}", hasher.finalize()),
            regions,
            dir: Some(dir),
        })
    }
}

/// Holds templates built in memory, keyed by name.
#[derive(Clone, Debug, Default)]
pub struct MemoryTemplateLoader {
    templates: BTreeMap<String, Template>,
}

impl MemoryTemplateLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, template: Template) {
        self.templates.insert(template.name.clone(), template);
    }
}

impl TemplateLoader for MemoryTemplateLoader {
    fn load(&self, name: &str) -> LiveryResult<Template> {
        self.templates.get(name).cloned().ok_or_else(|| {
            LiveryError::validation(format!(
                "unknown template '{name}'; available: {}",
                self.templates.keys().cloned().collect::<Vec<_>>().join(", ")
            ))
        })
    }
}

/// Normalizes a resource-relative path: `/` separators, no `.` segments, no absolute paths or
/// parent traversals.
pub(crate) fn normalize_rel_path(source: &str) -> LiveryResult<String> {
    let s = source.replace('\\', "/");
    if s.starts_with('/') {
        return Err(LiveryError::validation(format!(
            "resource paths must be relative: '{source}'"
        )));
    }

    let mut out = Vec::<&str>::new();
    for part in s.split('/') {
        if part.is_empty() || part == "." {
            continue;
        }
        if part == ".." {
            return Err(LiveryError::validation(format!(
                "resource paths must not contain '..': '{source}'"
            )));
        }
        out.push(part);
    }

    if out.is_empty() {
        return Err(LiveryError::validation("resource path must be non-empty"));
    }
    Ok(out.join("/"))
}

/// Recursively lists `*.png` files under `dir` as `(relative '/'-joined path, absolute path)`,
/// sorted by relative path.
pub(crate) fn collect_pngs(dir: &Path) -> LiveryResult<Vec<(String, PathBuf)>> {
    fn walk(base: &Path, dir: &Path, out: &mut Vec<(String, PathBuf)>) -> LiveryResult<()> {
        let entries = std::fs::read_dir(dir)
            .map_err(|e| LiveryError::io(format!("list '{}': {e}", dir.display())))?;
        for entry in entries {
            let path = entry
                .map_err(|e| LiveryError::io(format!("list '{}': {e}", dir.display())))?
                .path();
            if path.is_dir() {
                walk(base, &path, out)?;
                continue;
            }
            let is_png = path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case("png"));
            if !is_png {
                continue;
            }
            let rel = path
                .strip_prefix(base)
                .map_err(|e| LiveryError::io(format!("relativize '{}': {e}", path.display())))?
                .components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect::<Vec<_>>()
                .join("/");
            out.push((rel, path));
        }
        Ok(())
    }

    let mut out = Vec::new();
    walk(dir, dir, &mut out)?;
    out.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(out)
}

/// `body/front.png` -> `body.front`.
fn region_path(rel: &str) -> String {
    let stem = rel
        .rsplit_once('.')
        .map(|(stem, _ext)| stem)
        .unwrap_or(rel);
    stem.replace('/', ".")
}

#[cfg(test)]
#[path = "../../tests/unit/template/loader.rs"]
mod tests;
