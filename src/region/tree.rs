use std::collections::BTreeMap;

use crate::foundation::core::{BBox, Size};
use crate::foundation::error::{LiveryError, LiveryResult};

/// Binary pixel mask, row-major.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Mask {
    size: Size,
    bits: Vec<bool>,
}

impl Mask {
    /// Mask with every pixel set to `fill`.
    pub fn new(size: Size, fill: bool) -> Self {
        Self {
            size,
            bits: vec![fill; size.pixel_count()],
        }
    }

    /// Wraps row-major bits; the length must equal `width * height`.
    pub fn from_bits(size: Size, bits: Vec<bool>) -> LiveryResult<Self> {
        if bits.len() != size.pixel_count() {
            return Err(LiveryError::size_mismatch(format!(
                "mask of {size} needs {} bits, got {}",
                size.pixel_count(),
                bits.len()
            )));
        }
        Ok(Self { size, bits })
    }

    /// Mask set wherever `f(x, y)` holds.
    pub fn from_fn(size: Size, mut f: impl FnMut(u32, u32) -> bool) -> Self {
        let mut bits = Vec::with_capacity(size.pixel_count());
        for y in 0..size.height {
            for x in 0..size.width {
                bits.push(f(x, y));
            }
        }
        Self { size, bits }
    }

    /// A pixel is inside when its alpha is fully opaque.
    pub fn from_alpha(img: &image::RgbaImage) -> Self {
        let size = Size::new(img.width(), img.height());
        let bits = img.pixels().map(|p| p.0[3] == 255).collect();
        Self { size, bits }
    }

    pub fn size(&self) -> Size {
        self.size
    }

    /// `false` outside the mask.
    pub fn get(&self, x: u32, y: u32) -> bool {
        x < self.size.width
            && y < self.size.height
            && self.bits[y as usize * self.size.width as usize + x as usize]
    }

    pub fn bits(&self) -> &[bool] {
        &self.bits
    }

    /// Number of set pixels.
    pub fn count(&self) -> usize {
        self.bits.iter().filter(|b| **b).count()
    }

    pub fn is_empty(&self) -> bool {
        !self.bits.iter().any(|b| *b)
    }

    pub fn is_full(&self) -> bool {
        self.bits.iter().all(|b| *b)
    }

    /// Complement.
    pub fn not(&self) -> Self {
        Self {
            size: self.size,
            bits: self.bits.iter().map(|b| !b).collect(),
        }
    }

    /// Intersection; both masks must be the same size.
    pub fn and(&self, other: &Self) -> LiveryResult<Self> {
        self.zip_with(other, |a, b| a && b)
    }

    /// Union; both masks must be the same size.
    pub fn or(&self, other: &Self) -> LiveryResult<Self> {
        self.zip_with(other, |a, b| a || b)
    }

    fn zip_with(&self, other: &Self, f: impl Fn(bool, bool) -> bool) -> LiveryResult<Self> {
        if self.size != other.size {
            return Err(LiveryError::size_mismatch(format!(
                "cannot combine masks of {} and {}",
                self.size, other.size
            )));
        }
        Ok(Self {
            size: self.size,
            bits: self
                .bits
                .iter()
                .zip(&other.bits)
                .map(|(a, b)| f(*a, *b))
                .collect(),
        })
    }

    /// Tight bounding box of the set pixels, `None` when the mask is empty.
    pub fn bbox(&self) -> Option<BBox> {
        let w = self.size.width as usize;
        let (mut x0, mut y0, mut x1, mut y1) = (u32::MAX, u32::MAX, 0u32, 0u32);
        for (i, _) in self.bits.iter().enumerate().filter(|(_, b)| **b) {
            let (x, y) = ((i % w) as u32, (i / w) as u32);
            x0 = x0.min(x);
            y0 = y0.min(y);
            x1 = x1.max(x + 1);
            y1 = y1.max(y + 1);
        }
        (x0 != u32::MAX).then_some(BBox { x0, y0, x1, y1 })
    }

    /// Sub-mask covering `bbox`, which must lie within the mask.
    pub fn crop(&self, bbox: BBox) -> LiveryResult<Self> {
        if !bbox.fits_within(self.size) {
            return Err(LiveryError::size_mismatch(format!(
                "crop {bbox:?} exceeds mask of {}",
                self.size
            )));
        }
        Ok(Self::from_fn(bbox.size(), |x, y| {
            self.get(x + bbox.x0, y + bbox.y0)
        }))
    }
}

#[derive(Clone, Debug)]
/// Node of a [`NamedRegionTree`]: a mask, or a named group of children.
pub enum RegionNode {
    Leaf(Mask),
    Group(BTreeMap<String, RegionNode>),
}

impl RegionNode {
    fn collect_leaves<'a>(&'a self, out: &mut Vec<&'a Mask>) {
        match self {
            Self::Leaf(m) => out.push(m),
            Self::Group(children) => {
                for child in children.values() {
                    child.collect_leaves(out);
                }
            }
        }
    }
}

/// Read-only hierarchical namespace of region masks over one canvas.
#[derive(Clone, Debug)]
pub struct NamedRegionTree {
    size: Size,
    root: BTreeMap<String, RegionNode>,
}

impl NamedRegionTree {
    /// Empty tree whose masks all have `size`.
    pub fn new(size: Size) -> Self {
        Self {
            size,
            root: BTreeMap::new(),
        }
    }

    pub fn size(&self) -> Size {
        self.size
    }

    /// Inserts a leaf at a dotted path, creating intermediate groups.
    pub fn insert(&mut self, path: &str, mask: Mask) -> LiveryResult<()> {
        if mask.size() != self.size {
            return Err(LiveryError::size_mismatch(format!(
                "region '{path}' is {} but the canvas is {}",
                mask.size(),
                self.size
            )));
        }
        let parts: Vec<&str> = path.split('.').collect();
        if parts.iter().any(|p| p.is_empty()) {
            return Err(LiveryError::validation(format!(
                "invalid region path '{path}'"
            )));
        }
        let (leaf, groups) = parts
            .split_last()
            .ok_or_else(|| LiveryError::validation("empty region path"))?;

        let mut level = &mut self.root;
        for g in groups {
            let node = level
                .entry((*g).to_string())
                .or_insert_with(|| RegionNode::Group(BTreeMap::new()));
            level = match node {
                RegionNode::Group(children) => children,
                RegionNode::Leaf(_) => {
                    return Err(LiveryError::validation(format!(
                        "region path '{path}' descends into leaf '{g}'"
                    )));
                }
            };
        }
        if level.contains_key(*leaf) {
            return Err(LiveryError::validation(format!(
                "duplicate region '{path}'"
            )));
        }
        level.insert((*leaf).to_string(), RegionNode::Leaf(mask));
        Ok(())
    }

    /// Node at a dotted path such as `segments.left`.
    pub fn get(&self, path: &str) -> Option<&RegionNode> {
        let mut parts = path.split('.');
        let mut node = self.root.get(parts.next()?)?;
        for p in parts {
            match node {
                RegionNode::Group(children) => node = children.get(p)?,
                RegionNode::Leaf(_) => return None,
            }
        }
        Some(node)
    }

    /// Resolves a dotted name to a mask; groups resolve to the union of their leaves.
    pub fn resolve(&self, path: &str) -> LiveryResult<Mask> {
        let node = self
            .get(path)
            .ok_or_else(|| LiveryError::unknown_region(path, self.names().join("\n")))?;
        let mut leaves = Vec::new();
        node.collect_leaves(&mut leaves);

        let mut out = Mask::new(self.size, false);
        for leaf in leaves {
            out = out.or(leaf)?;
        }
        Ok(out)
    }

    /// All valid dotted names (groups and leaves), sorted.
    pub fn names(&self) -> Vec<String> {
        fn walk(prefix: &str, level: &BTreeMap<String, RegionNode>, out: &mut Vec<String>) {
            for (name, node) in level {
                let full = if prefix.is_empty() {
                    name.clone()
                } else {
                    format!("{prefix}.{name}")
                };
                if let RegionNode::Group(children) = node {
                    walk(&full, children, out);
                }
                out.push(full);
            }
        }
        let mut out = Vec::new();
        walk("", &self.root, &mut out);
        out.sort();
        out
    }
}

#[cfg(test)]
#[path = "../../tests/unit/region/tree.rs"]
mod tests;
