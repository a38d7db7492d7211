//! Content-addressed snapshots of the livery after each section.
//!
//! Entry `i` is keyed by `chain[i + 1]`, where `chain[0]` is the template hash and each link hashes
//! the previous link together with the canonical JSON of one section. Entries live at
//! `<dir>/<key[..2]>/<key[2..]>/{paint,spec}.png` and are never rewritten once present.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use image::ImageFormat;
use sha2::Digest as _;

use crate::config::model::SectionConfig;
use crate::foundation::core::Size;
use crate::foundation::error::{LiveryError, LiveryResult};
use crate::raster::layer::Layer;

pub const CACHE_DIR_ENV: &str = "LIVERY_CACHE_DIR";
pub const DEFAULT_CACHE_DIR: &str = ".layer_cache";

const PAINT_FILE: &str = "paint.png";
const SPEC_FILE: &str = "spec.png";
const STAGING_DIR: &str = ".staging";

static STAGING_SEQ: AtomicU64 = AtomicU64::new(0);

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum CacheMode {
    #[default]
    Disabled,
    Enabled {
        dir: PathBuf,
    },
}

impl CacheMode {
    /// Enabled at `LIVERY_CACHE_DIR`, else `./.layer_cache`.
    pub fn enabled_from_env() -> Self {
        let dir = match std::env::var_os(CACHE_DIR_ENV) {
            Some(dir) if !dir.is_empty() => PathBuf::from(dir),
            _ => PathBuf::from(DEFAULT_CACHE_DIR),
        };
        Self::Enabled { dir }
    }
}

/// `chain[0]` is `template_hash`; `chain[i + 1]` is the lowercase hex SHA-256 of `chain[i]` followed
/// by the canonical (sorted-key) JSON of section `i`.
pub fn hash_chain(template_hash: &str, sections: &[SectionConfig]) -> LiveryResult<Vec<String>> {
    let mut chain = Vec::with_capacity(sections.len() + 1);
    chain.push(template_hash.to_string());
    for (i, section) in sections.iter().enumerate() {
        let canonical = serde_json::to_value(section)
            .map(|v| v.to_string())
            .map_err(|e| LiveryError::validation(format!("serialize section {i}: {e}")))?;
        let mut hasher = sha2::Sha256::new();
        hasher.update(chain[i].as_bytes());
        hasher.update(canonical.as_bytes());
        chain.push(format!("{:x}", hasher.finalize()));
    }
    Ok(chain)
}

#[derive(Clone, Debug)]
pub struct LayerCache {
    dir: PathBuf,
}

impl LayerCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn entry_path(&self, key: &str) -> LiveryResult<PathBuf> {
        match (key.get(..2), key.get(2..)) {
            (Some(shard), Some(rest)) if !rest.is_empty() => Ok(self.dir.join(shard).join(rest)),
            _ => Err(LiveryError::validation(format!(
                "cache key '{key}' is too short"
            ))),
        }
    }

    pub fn contains(&self, key: &str) -> LiveryResult<bool> {
        Ok(self.entry_path(key)?.is_dir())
    }

    /// Writes an entry through a staging directory renamed into place. An existing entry is left
    /// untouched.
    pub fn store(&self, key: &str, layer: &Layer) -> LiveryResult<()> {
        let dest = self.entry_path(key)?;
        if dest.is_dir() {
            return Ok(());
        }

        let staging = self.dir.join(STAGING_DIR).join(format!(
            "{key}-{}-{}",
            std::process::id(),
            STAGING_SEQ.fetch_add(1, Ordering::Relaxed)
        ));
        std::fs::create_dir_all(&staging)
            .map_err(|e| LiveryError::io(format!("create '{}': {e}", staging.display())))?;

        let written = write_png(layer.paint(), &staging.join(PAINT_FILE))
            .and_then(|()| write_png(layer.spec(), &staging.join(SPEC_FILE)))
            .and_then(|()| {
                let parent = dest.parent().unwrap_or(&self.dir);
                std::fs::create_dir_all(parent)
                    .map_err(|e| LiveryError::io(format!("create '{}': {e}", parent.display())))
            });
        if let Err(e) = written {
            let _ = std::fs::remove_dir_all(&staging);
            return Err(e);
        }

        if let Err(e) = std::fs::rename(&staging, &dest) {
            let _ = std::fs::remove_dir_all(&staging);
            // Another writer published the same entry first.
            if dest.is_dir() {
                return Ok(());
            }
            return Err(LiveryError::io(format!(
                "publish cache entry '{}': {e}",
                dest.display()
            )));
        }
        tracing::debug!(key, "cache entry written");
        Ok(())
    }

    /// `Ok(None)` when absent; `CorruptCache` when present but unreadable or the wrong size.
    pub fn load(&self, key: &str, expected: Size) -> LiveryResult<Option<Layer>> {
        let dir = self.entry_path(key)?;
        if !dir.is_dir() {
            return Ok(None);
        }
        let paint = read_png(&dir.join(PAINT_FILE))?;
        let spec = read_png(&dir.join(SPEC_FILE))?;
        for (name, img) in [("paint", &paint), ("spec", &spec)] {
            if img.dimensions() != (expected.width, expected.height) {
                return Err(LiveryError::corrupt_cache(format!(
                    "{name} in '{}' is {}x{}, expected {expected}",
                    dir.display(),
                    img.width(),
                    img.height()
                )));
            }
        }
        Layer::new(paint, spec)
            .map(Some)
            .map_err(|e| LiveryError::corrupt_cache(format!("'{}': {e}", dir.display())))
    }

    pub fn evict(&self, key: &str) -> LiveryResult<()> {
        let dir = self.entry_path(key)?;
        match std::fs::remove_dir_all(&dir) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(LiveryError::io(format!("evict '{}': {e}", dir.display()))),
        }
    }

    /// Most recent valid snapshot along `chain`, as `(sections already built, livery)`. Corrupt
    /// entries are evicted and the scan moves on to older ones.
    #[tracing::instrument(skip_all, fields(dir = %self.dir.display(), links = chain.len()))]
    pub fn latest(&self, chain: &[String], size: Size) -> LiveryResult<Option<(usize, Layer)>> {
        for done in (1..chain.len()).rev() {
            let key = &chain[done];
            match self.load(key, size) {
                Ok(Some(layer)) => {
                    tracing::debug!(key = %key, done, "cache hit");
                    return Ok(Some((done, layer)));
                }
                Ok(None) => {}
                Err(LiveryError::CorruptCache(msg)) => {
                    tracing::warn!(key = %key, "evicting corrupt cache entry: {msg}");
                    self.evict(key)?;
                }
                Err(e) => return Err(e),
            }
        }
        tracing::debug!("cache miss");
        Ok(None)
    }
}

fn write_png(img: &image::RgbaImage, path: &Path) -> LiveryResult<()> {
    img.save_with_format(path, ImageFormat::Png)
        .map_err(|e| LiveryError::image(format!("write '{}': {e}", path.display())))
}

fn read_png(path: &Path) -> LiveryResult<image::RgbaImage> {
    let bytes = std::fs::read(path)
        .map_err(|e| LiveryError::corrupt_cache(format!("read '{}': {e}", path.display())))?;
    image::load_from_memory_with_format(&bytes, ImageFormat::Png)
        .map(|img| img.to_rgba8())
        .map_err(|e| LiveryError::corrupt_cache(format!("decode '{}': {e}", path.display())))
}

#[cfg(test)]
#[path = "../../tests/unit/build/cache.rs"]
mod tests;
