//! Per-layer raster preparation: fitting, grading, opacity, luminance masks, scanlines.
//!
//! Everything here works on straight-alpha `RgbaImage` buffers; conversion to the premultiplied
//! canvas happens in [`crate::render::composite`].

use image::{RgbaImage, imageops::FilterType};
use rayon::prelude::*;

use crate::foundation::core::Size;
use crate::foundation::math::{round_extent, round_px, unit_to_u8};
use crate::template::model::ColorGrade;

/// Distance between scanline bands, in canvas pixels.
pub const SCANLINE_PERIOD: u32 = 3;
/// Alpha of a scanline band.
pub const SCANLINE_ALPHA: u8 = 72;

const LUMA_R: f32 = 0.2126;
const LUMA_G: f32 = 0.7152;
const LUMA_B: f32 = 0.0722;

/// How the source is fitted into its target rectangle.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum FitMode {
    /// Fill the rectangle and crop the excess, centered.
    #[default]
    Cover,
    /// Fit inside the rectangle, centered on a transparent pad.
    Contain,
}

/// Resize `src` into exactly `target` using `fit`.
pub fn fit_into(src: &RgbaImage, target: Size, fit: FitMode) -> RgbaImage {
    let (sw, sh) = src.dimensions();
    if sw == 0 || sh == 0 || target.is_empty() {
        return RgbaImage::new(target.width, target.height);
    }
    if (sw, sh) == (target.width, target.height) {
        return src.clone();
    }

    let kx = f64::from(target.width) / f64::from(sw);
    let ky = f64::from(target.height) / f64::from(sh);

    match fit {
        FitMode::Cover => {
            let k = kx.max(ky);
            let rw = round_extent(f64::from(sw) * k, target.width);
            let rh = round_extent(f64::from(sh) * k, target.height);
            let resized = image::imageops::resize(src, rw, rh, FilterType::Lanczos3);
            let left = round_px(f64::from(rw - target.width) / 2.0) as u32;
            let top = round_px(f64::from(rh - target.height) / 2.0) as u32;
            crop(&resized, left, top, target)
        }
        FitMode::Contain => {
            let k = kx.min(ky);
            let rw = round_extent(f64::from(sw) * k, 1).min(target.width);
            let rh = round_extent(f64::from(sh) * k, 1).min(target.height);
            let resized = image::imageops::resize(src, rw, rh, FilterType::Lanczos3);
            let mut out = RgbaImage::new(target.width, target.height);
            let left = round_px(f64::from(target.width - rw) / 2.0);
            let top = round_px(f64::from(target.height - rh) / 2.0);
            image::imageops::replace(&mut out, &resized, left, top);
            out
        }
    }
}

/// Stretch `src` to exactly `target` (overlay assets are authored at canvas aspect).
pub fn resize_exact(src: &RgbaImage, target: Size) -> RgbaImage {
    if src.dimensions() == (target.width, target.height) {
        return src.clone();
    }
    image::imageops::resize(src, target.width, target.height, FilterType::Lanczos3)
}

/// Cut a `size` window starting at `(left, top)`; the window is clamped into `src`.
pub fn crop(src: &RgbaImage, left: u32, top: u32, size: Size) -> RgbaImage {
    let (sw, sh) = src.dimensions();
    let w = size.width.min(sw);
    let h = size.height.min(sh);
    let left = left.min(sw - w);
    let top = top.min(sh - h);
    image::imageops::crop_imm(src, left, top, w, h).to_image()
}

/// Apply the template's fixed color adjustment in place.
pub fn apply_grade(img: &mut RgbaImage, grade: &ColorGrade) {
    if grade.is_identity() {
        return;
    }
    let ColorGrade {
        brightness,
        saturation,
        linear_a,
        linear_b,
    } = *grade;
    let offset = linear_b / 255.0;

    img.par_chunks_exact_mut(4).for_each(|px| {
        let mut c = [
            f32::from(px[0]) / 255.0 * brightness,
            f32::from(px[1]) / 255.0 * brightness,
            f32::from(px[2]) / 255.0 * brightness,
        ];
        let luma = LUMA_R * c[0] + LUMA_G * c[1] + LUMA_B * c[2];
        for v in &mut c {
            *v = luma + (*v - luma) * saturation;
            *v = *v * linear_a + offset;
        }
        px[0] = unit_to_u8(c[0]);
        px[1] = unit_to_u8(c[1]);
        px[2] = unit_to_u8(c[2]);
    });
}

/// Scale the alpha channel by `opacity`; RGB is left untouched.
pub fn apply_opacity(img: &mut RgbaImage, opacity: f32) {
    if opacity >= 1.0 {
        return;
    }
    let opacity = opacity.max(0.0);
    for px in img.pixels_mut() {
        px.0[3] = (f32::from(px.0[3]) * opacity).round() as u8;
    }
}

/// Turn a layer into a destination-in mask: white RGB, alpha = luminance x own alpha.
pub fn luminance_mask(img: &mut RgbaImage) {
    for px in img.pixels_mut() {
        let [r, g, b, a] = px.0;
        let luma = LUMA_R * f32::from(r) + LUMA_G * f32::from(g) + LUMA_B * f32::from(b);
        let alpha = (luma * f32::from(a) / 255.0).round().clamp(0.0, 255.0) as u8;
        px.0 = [255, 255, 255, alpha];
    }
}

/// Synthetic horizontal scanlines sized to the poster slot.
pub fn scanline_layer(size: Size) -> RgbaImage {
    RgbaImage::from_fn(size.width, size.height, |_, y| {
        if y % SCANLINE_PERIOD == 0 {
            image::Rgba([0, 0, 0, SCANLINE_ALPHA])
        } else {
            image::Rgba([0, 0, 0, 0])
        }
    })
}

#[cfg(test)]
#[path = "../../tests/unit/render/layers.rs"]
mod tests;
