use super::*;

fn layer(w: u32, h: u32, px: [u8; 4]) -> RgbaImage {
    RgbaImage::from_pixel(w, h, image::Rgba(px))
}

#[test]
fn over_opacity_0_is_noop() {
    let dst = [1, 2, 3, 4];
    let src = [200, 200, 200, 200];
    assert_eq!(over(dst, src, 0.0), dst);
}

#[test]
fn over_src_alpha_0_is_noop() {
    let dst = [10, 20, 30, 40];
    let src = [255, 255, 255, 0];
    assert_eq!(over(dst, src, 1.0), dst);
}

#[test]
fn over_src_opaque_replaces_dst() {
    let dst = [0, 0, 0, 255];
    let src = [255, 0, 0, 255];
    assert_eq!(over(dst, src, 1.0), src);
}

#[test]
fn multiply_white_and_screen_black_are_identity() {
    let dst = [120, 60, 30, 255];
    assert_eq!(
        blend_pixel(dst, [255, 255, 255, 255], BlendMode::Multiply),
        dst
    );
    assert_eq!(blend_pixel(dst, [0, 0, 0, 255], BlendMode::Screen), dst);
}

#[test]
fn soft_light_mid_gray_is_identity() {
    let dst = [200, 100, 20, 255];
    let out = blend_pixel(dst, [128, 128, 128, 255], BlendMode::SoftLight);
    for i in 0..3 {
        assert!((i32::from(out[i]) - i32::from(dst[i])).abs() <= 1, "{out:?}");
    }
    assert_eq!(out[3], 255);
}

#[test]
fn separable_modes_over_transparent_dst_show_source() {
    for mode in [
        BlendMode::Multiply,
        BlendMode::Screen,
        BlendMode::Overlay,
        BlendMode::SoftLight,
        BlendMode::HardLight,
    ] {
        assert_eq!(
            blend_pixel([0, 0, 0, 0], [10, 20, 30, 255], mode),
            [10, 20, 30, 255]
        );
    }
}

#[test]
fn destination_in_scales_dst_by_mask_alpha() {
    let dst = [100, 50, 20, 200];
    assert_eq!(
        blend_pixel(dst, [255, 255, 255, 255], BlendMode::DestinationIn),
        dst
    );
    assert_eq!(
        blend_pixel(dst, [255, 255, 255, 0], BlendMode::DestinationIn),
        [0, 0, 0, 0]
    );
}

#[test]
fn surface_background_and_unpremultiply() {
    let s = Surface::new(Size::new(2, 1), Background::Color([255, 0, 0, 128]));
    assert_eq!(s.pixel(0, 0), [128, 0, 0, 128]);
    let img = s.into_rgba_image();
    assert_eq!(img.get_pixel(1, 0).0, [255, 0, 0, 128]);
}

#[test]
fn composite_places_layer_at_offset() {
    let mut s = Surface::new(Size::new(4, 4), Background::Transparent);
    s.composite(
        &layer(2, 2, [0, 255, 0, 255]),
        PxRect::new(1, 2, 2, 2),
        BlendMode::Over,
    );
    assert_eq!(s.pixel(0, 0), [0, 0, 0, 0]);
    assert_eq!(s.pixel(1, 2), [0, 255, 0, 255]);
    assert_eq!(s.pixel(2, 3), [0, 255, 0, 255]);
    assert_eq!(s.pixel(3, 3), [0, 0, 0, 0]);
}

#[test]
fn composite_clips_negative_offsets() {
    let mut s = Surface::new(Size::new(2, 2), Background::Transparent);
    s.composite(
        &layer(2, 2, [9, 9, 9, 255]),
        PxRect::new(-1, -1, 2, 2),
        BlendMode::Over,
    );
    assert_eq!(s.pixel(0, 0), [9, 9, 9, 255]);
    assert_eq!(s.pixel(1, 1), [0, 0, 0, 0]);
}

#[test]
fn destination_in_clears_outside_its_rect() {
    let mut s = Surface::new(Size::new(3, 1), Background::Color([10, 10, 10, 255]));
    s.composite(
        &layer(1, 1, [255, 255, 255, 255]),
        PxRect::new(1, 0, 1, 1),
        BlendMode::DestinationIn,
    );
    assert_eq!(s.pixel(0, 0), [0, 0, 0, 0]);
    assert_eq!(s.pixel(1, 0), [10, 10, 10, 255]);
    assert_eq!(s.pixel(2, 0), [0, 0, 0, 0]);
}
