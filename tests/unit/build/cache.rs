use super::*;

use crate::config::model::{LayerSpec, SolidLayer};
use crate::foundation::core::Rgb;

fn scratch(name: &str) -> PathBuf {
    let dir = PathBuf::from("target").join("unit-cache").join(name);
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn solid(color: Rgb) -> SectionConfig {
    SectionConfig {
        layers: vec![LayerSpec::Solid(SolidLayer { color, spec: None })],
        section: None,
    }
}

fn sample_layer(size: Size) -> Layer {
    let paint = image::RgbaImage::from_fn(size.width, size.height, |x, y| {
        image::Rgba([x as u8, y as u8, 7, if (x + y) % 3 == 0 { 0 } else { 200 }])
    });
    let spec = image::RgbaImage::from_fn(size.width, size.height, |x, _| {
        image::Rgba([0, x as u8, 0, 255])
    });
    Layer::new(paint, spec).unwrap()
}

#[test]
fn chain_starts_with_template_and_is_deterministic() {
    let sections = vec![solid(Rgb::WHITE), solid(Rgb::BLACK)];
    let chain = hash_chain("abc", &sections).unwrap();
    assert_eq!(chain.len(), 3);
    assert_eq!(chain[0], "abc");
    assert!(chain[1..].iter().all(|k| k.len() == 64));
    assert_eq!(chain, hash_chain("abc", &sections).unwrap());

    // A change to one section alters its link and every later one.
    let edited = vec![solid(Rgb::WHITE), solid(Rgb::new(1, 0, 0))];
    let other = hash_chain("abc", &edited).unwrap();
    assert_eq!(chain[1], other[1]);
    assert_ne!(chain[2], other[2]);
    assert_ne!(chain[1], hash_chain("abd", &sections).unwrap()[1]);
}

#[test]
fn entry_path_is_sharded() {
    let cache = LayerCache::new("/tmp/c");
    assert_eq!(
        cache.entry_path("abcdef").unwrap(),
        PathBuf::from("/tmp/c/ab/cdef")
    );
    assert!(cache.entry_path("ab").is_err());
}

#[test]
fn store_then_load_is_bit_identical() {
    let cache = LayerCache::new(scratch("roundtrip"));
    let size = Size::new(9, 5);
    let layer = sample_layer(size);
    cache.store("0123456789", &layer).unwrap();
    assert!(cache.contains("0123456789").unwrap());
    assert_eq!(cache.load("0123456789", size).unwrap(), Some(layer));
    assert_eq!(cache.load("9999999999", size).unwrap(), None);
}

#[test]
fn wrong_size_is_corrupt() {
    let cache = LayerCache::new(scratch("size"));
    cache.store("aaaa", &sample_layer(Size::new(4, 4))).unwrap();
    let err = cache.load("aaaa", Size::new(5, 4)).unwrap_err();
    assert!(matches!(err, LiveryError::CorruptCache(_)), "{err}");
}

#[test]
fn latest_skips_and_evicts_corrupt_entries() {
    let cache = LayerCache::new(scratch("latest"));
    let size = Size::new(3, 3);
    let chain: Vec<String> = ["t", "k1k1", "k2k2", "k3k3"]
        .iter()
        .map(|s| s.to_string())
        .collect();

    assert!(cache.latest(&chain, size).unwrap().is_none());

    let older = sample_layer(size);
    cache.store("k1k1", &older).unwrap();
    cache.store("k2k2", &Layer::empty(size)).unwrap();
    std::fs::write(cache.entry_path("k2k2").unwrap().join("paint.png"), b"not a png").unwrap();

    let (done, layer) = cache.latest(&chain, size).unwrap().unwrap();
    assert_eq!(done, 1);
    assert_eq!(layer, older);
    assert!(!cache.contains("k2k2").unwrap());
}

#[test]
fn store_keeps_existing_entries() {
    let cache = LayerCache::new(scratch("immutable"));
    let size = Size::new(2, 2);
    let first = sample_layer(size);
    cache.store("keep", &first).unwrap();
    cache.store("keep", &Layer::empty(size)).unwrap();
    assert_eq!(cache.load("keep", size).unwrap(), Some(first));
}
