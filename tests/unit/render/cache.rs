use std::io::Cursor;

use super::*;

fn write_png(path: &Path, w: u32, h: u32, px: [u8; 4]) {
    let img = RgbaImage::from_pixel(w, h, image::Rgba(px));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    std::fs::write(path, buf).unwrap();
}

#[test]
fn same_key_prepares_once_and_shares_buffer() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("wear.png");
    write_png(&path, 8, 8, [200, 100, 50, 255]);

    let cache = OverlayCache::default();
    let key = LayerKey::new(&path, Size::new(4, 4), BlendMode::Multiply, Some(0.5));
    let a = cache.get_prepared(&key).unwrap().unwrap();
    let b = cache.get_prepared(&key).unwrap().unwrap();
    assert!(Arc::ptr_eq(&a, &b));
    assert_eq!(cache.prepare_count(), 1);
    assert_eq!(a.dimensions(), (4, 4));
    assert!(a.pixels().all(|p| p.0[3] == 128));
}

#[test]
fn missing_asset_is_none_and_not_cached() {
    let dir = tempfile::tempdir().unwrap();
    let cache = OverlayCache::default();
    let key = LayerKey::new(
        dir.path().join("nope.png"),
        Size::new(4, 4),
        BlendMode::Over,
        None,
    );
    assert!(cache.get_prepared(&key).unwrap().is_none());
    assert!(cache.is_empty());
    assert_eq!(cache.prepare_count(), 0);
}

#[test]
fn keys_distinguish_size_blend_and_opacity() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("mask.png");
    write_png(&path, 2, 2, [255, 255, 255, 255]);

    let cache = OverlayCache::default();
    let over = LayerKey::new(&path, Size::new(2, 2), BlendMode::Over, Some(0.5));
    let mask = LayerKey::new(&path, Size::new(2, 2), BlendMode::DestinationIn, Some(0.5));
    let bigger = LayerKey::new(&path, Size::new(3, 3), BlendMode::Over, Some(0.5));
    cache.get_prepared(&over).unwrap();
    cache.get_prepared(&mask).unwrap();
    cache.get_prepared(&bigger).unwrap();
    assert_eq!(cache.len(), 3);

    assert_eq!(
        LayerKey::new(&path, Size::new(2, 2), BlendMode::Over, None),
        LayerKey::new(&path, Size::new(2, 2), BlendMode::Over, Some(1.0))
    );
}

#[test]
fn capacity_evicts_least_recently_used() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("a.png");
    write_png(&path, 2, 2, [1, 2, 3, 255]);

    let cache = OverlayCache::new(Some(2));
    let k1 = LayerKey::new(&path, Size::new(1, 1), BlendMode::Over, None);
    let k2 = LayerKey::new(&path, Size::new(2, 2), BlendMode::Over, None);
    let k3 = LayerKey::new(&path, Size::new(3, 3), BlendMode::Over, None);
    cache.get_prepared(&k1).unwrap();
    cache.get_prepared(&k2).unwrap();
    cache.get_prepared(&k1).unwrap();
    cache.get_prepared(&k3).unwrap();
    assert_eq!(cache.len(), 2);
    assert_eq!(cache.prepare_count(), 3);

    // k1 was touched after k2, so k2 was the victim.
    cache.get_prepared(&k1).unwrap();
    assert_eq!(cache.prepare_count(), 3);
    cache.get_prepared(&k2).unwrap();
    assert_eq!(cache.prepare_count(), 4);
}
