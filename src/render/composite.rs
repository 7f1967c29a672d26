use image::RgbaImage;
use rayon::prelude::*;

use crate::foundation::core::{Background, PxRect, Size};
use crate::foundation::math::{mul_div255_u8, unit_to_u8};
use crate::template::model::BlendMode;

/// Premultiplied RGBA8 pixel.
pub type PremulRgba8 = [u8; 4];

/// Premultiplied RGBA8 canvas that layers are composited onto.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Surface {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl Surface {
    /// Canvas of `size` filled with `background`.
    pub fn new(size: Size, background: Background) -> Self {
        let fill = premultiply(background.rgba8());
        let px = (size.width as usize) * (size.height as usize);
        let mut data = Vec::with_capacity(px * 4);
        for _ in 0..px {
            data.extend_from_slice(&fill);
        }
        Self {
            width: size.width,
            height: size.height,
            data,
        }
    }

    /// Canvas dimensions.
    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Premultiplied pixel at `(x, y)`.
    pub fn pixel(&self, x: u32, y: u32) -> PremulRgba8 {
        let i = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        [
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ]
    }

    /// Composite a straight-alpha `layer` with its top-left at `(rect.left, rect.top)`.
    ///
    /// `layer` must already be sized to `rect`. For [`BlendMode::DestinationIn`] everything
    /// outside the layer's rectangle is cleared.
    pub fn composite(&mut self, layer: &RgbaImage, rect: PxRect, mode: BlendMode) {
        let (lw, lh) = layer.dimensions();
        let width = self.width as usize;
        let row_bytes = width * 4;
        if row_bytes == 0 {
            return;
        }
        let left = i64::from(rect.left);
        let top = i64::from(rect.top);

        self.data
            .par_chunks_mut(row_bytes)
            .enumerate()
            .for_each(|(y, row)| {
                let ly = y as i64 - top;
                let row_hit = ly >= 0 && ly < i64::from(lh);
                for x in 0..width {
                    let lx = x as i64 - left;
                    let d = &mut row[x * 4..x * 4 + 4];
                    let hit = row_hit && lx >= 0 && lx < i64::from(lw);
                    if !hit {
                        if mode == BlendMode::DestinationIn {
                            d.fill(0);
                        }
                        continue;
                    }
                    let s = layer.get_pixel(lx as u32, ly as u32).0;
                    let out = blend_pixel([d[0], d[1], d[2], d[3]], s, mode);
                    d.copy_from_slice(&out);
                }
            });
    }

    /// Convert to a straight-alpha image for encoding.
    pub fn into_rgba_image(self) -> RgbaImage {
        let Self {
            width,
            height,
            mut data,
        } = self;
        for px in data.chunks_exact_mut(4) {
            let a = px[3];
            if a == 0 {
                px[..3].fill(0);
                continue;
            }
            for c in &mut px[..3] {
                *c = ((u32::from(*c) * 255 + u32::from(a) / 2) / u32::from(a)).min(255) as u8;
            }
        }
        // Buffer length is width * height * 4 by construction.
        RgbaImage::from_raw(width, height, data).unwrap_or_else(|| RgbaImage::new(width, height))
    }
}

/// Blend one straight-alpha source pixel onto a premultiplied destination pixel.
pub fn blend_pixel(dst: PremulRgba8, src: [u8; 4], mode: BlendMode) -> PremulRgba8 {
    match mode {
        BlendMode::Over => over(dst, premultiply(src), 1.0),
        BlendMode::DestinationIn => {
            let sa = u16::from(src[3]);
            [
                mul_div255_u8(u16::from(dst[0]), sa),
                mul_div255_u8(u16::from(dst[1]), sa),
                mul_div255_u8(u16::from(dst[2]), sa),
                mul_div255_u8(u16::from(dst[3]), sa),
            ]
        }
        _ => separable(dst, src, mode),
    }
}

/// Source-over on premultiplied pixels with an extra opacity multiplier.
pub fn over(dst: PremulRgba8, src: PremulRgba8, opacity: f32) -> PremulRgba8 {
    let opacity = opacity.clamp(0.0, 1.0);
    if opacity <= 0.0 || src[3] == 0 {
        return dst;
    }

    let op = ((opacity * 255.0).round() as i32).clamp(0, 255) as u16;
    let sa = mul_div255(u16::from(src[3]), op);
    if sa == 0 {
        return dst;
    }

    let inv = 255u16 - u16::from(sa);

    let mut out = [0u8; 4];
    out[3] = add_sat_u8(sa, mul_div255(u16::from(dst[3]), inv));

    for i in 0..3 {
        let sc = mul_div255(u16::from(src[i]), op);
        let dc = mul_div255(u16::from(dst[i]), inv);
        out[i] = add_sat_u8(sc, dc);
    }
    out
}

// W3C separable blend followed by source-over alpha composition.
fn separable(dst: PremulRgba8, src: [u8; 4], mode: BlendMode) -> PremulRgba8 {
    if src[3] == 0 {
        return dst;
    }
    let sa = f32::from(src[3]) / 255.0;
    let da = f32::from(dst[3]) / 255.0;

    let mut out = [0u8; 4];
    for i in 0..3 {
        let cs = f32::from(src[i]) / 255.0;
        let cb = if dst[3] == 0 {
            0.0
        } else {
            (f32::from(dst[i]) / 255.0 / da).min(1.0)
        };
        let mixed = blend_channel(cb, cs, mode);
        let co = sa * (1.0 - da) * cs + sa * da * mixed + (1.0 - sa) * da * cb;
        out[i] = unit_to_u8(co);
    }
    out[3] = unit_to_u8(sa + da * (1.0 - sa));
    out
}

fn blend_channel(cb: f32, cs: f32, mode: BlendMode) -> f32 {
    match mode {
        BlendMode::Over | BlendMode::DestinationIn => cs,
        BlendMode::Multiply => cb * cs,
        BlendMode::Screen => screen(cb, cs),
        BlendMode::Overlay => hard_light(cs, cb),
        BlendMode::HardLight => hard_light(cb, cs),
        BlendMode::SoftLight => {
            if cs <= 0.5 {
                cb - (1.0 - 2.0 * cs) * cb * (1.0 - cb)
            } else {
                let d = if cb <= 0.25 {
                    ((16.0 * cb - 12.0) * cb + 4.0) * cb
                } else {
                    cb.sqrt()
                };
                cb + (2.0 * cs - 1.0) * (d - cb)
            }
        }
    }
}

fn screen(cb: f32, cs: f32) -> f32 {
    cb + cs - cb * cs
}

fn hard_light(cb: f32, cs: f32) -> f32 {
    if cs <= 0.5 {
        cb * 2.0 * cs
    } else {
        screen(cb, 2.0 * cs - 1.0)
    }
}

pub(crate) fn premultiply(px: [u8; 4]) -> PremulRgba8 {
    let a = u16::from(px[3]);
    if a == 0 {
        return [0, 0, 0, 0];
    }
    [
        mul_div255(u16::from(px[0]), a),
        mul_div255(u16::from(px[1]), a),
        mul_div255(u16::from(px[2]), a),
        px[3],
    ]
}

fn mul_div255(x: u16, y: u16) -> u8 {
    mul_div255_u8(x, y)
}

fn add_sat_u8(a: u8, b: u8) -> u8 {
    a.saturating_add(b)
}

#[cfg(test)]
#[path = "../../tests/unit/render/composite.rs"]
mod tests;
