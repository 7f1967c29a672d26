use crate::foundation::core::{PxRect, Size};
use crate::foundation::math::{round_extent, round_px};
use crate::render::jitter::JitterPlan;
use crate::template::model::{OverlayLayer, Template};

/// Per-axis factors mapping template space onto the requested canvas.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScaleFactors {
    /// Horizontal factor.
    pub sx: f64,
    /// Vertical factor.
    pub sy: f64,
}

impl ScaleFactors {
    /// Identity scale.
    pub const ONE: Self = Self { sx: 1.0, sy: 1.0 };

    /// Factors taking `native` to `requested`, independently per axis.
    pub fn between(native: Size, requested: Size) -> Self {
        Self {
            sx: f64::from(requested.width) / f64::from(native.width),
            sy: f64::from(requested.height) / f64::from(native.height),
        }
    }
}

/// Template geometry rescaled onto a concrete canvas.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CanvasGeometry {
    /// Output canvas size.
    pub canvas: Size,
    /// Poster slot on the canvas.
    pub poster: PxRect,
    /// Factors used to get here.
    pub scale: ScaleFactors,
}

impl CanvasGeometry {
    /// Rescale `template` onto `requested` (or its native size).
    pub fn for_template(template: &Template, requested: Option<Size>) -> Self {
        let canvas = requested.unwrap_or(template.output);
        let scale = ScaleFactors::between(template.output, canvas);
        Self {
            canvas,
            poster: template.poster.scaled(scale.sx, scale.sy),
            scale,
        }
    }

    /// Placement of a layer on this canvas; `native` is the template's output size.
    pub fn layer_rect(&self, layer: &OverlayLayer, native: Size) -> PxRect {
        layer.rect_in(native).scaled(self.scale.sx, self.scale.sy)
    }
}

/// Where the poster gets rendered before the slot-sized window is cut out of it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PosterPlacement {
    /// Expanded rectangle the source is fitted into.
    pub render: Size,
    /// Left of the extraction window inside `render`.
    pub extract_left: u32,
    /// Top of the extraction window inside `render`.
    pub extract_top: u32,
}

impl PosterPlacement {
    /// Compute the render rectangle and the (clamped) extraction offsets for `slot`.
    ///
    /// The render rectangle is the zoomed slot plus twice the absolute jitter offset on each
    /// axis; the window starts centered and is shifted against the offset so positive offsets
    /// move the picture right/down.
    pub fn compute(slot: Size, jitter: &JitterPlan) -> Self {
        let zoom_w = round_extent(f64::from(slot.width) * jitter.scale, slot.width);
        let zoom_h = round_extent(f64::from(slot.height) * jitter.scale, slot.height);

        let pad_x = jitter.offset_x.unsigned_abs().min(u64::from(u32::MAX / 4)) as u32;
        let pad_y = jitter.offset_y.unsigned_abs().min(u64::from(u32::MAX / 4)) as u32;
        let render = Size::new(
            zoom_w.saturating_add(pad_x.saturating_mul(2)),
            zoom_h.saturating_add(pad_y.saturating_mul(2)),
        );

        let extract_left = window_start(render.width, slot.width, jitter.offset_x);
        let extract_top = window_start(render.height, slot.height, jitter.offset_y);

        Self {
            render,
            extract_left,
            extract_top,
        }
    }
}

fn window_start(render: u32, slot: u32, offset: i64) -> u32 {
    let max_start = i64::from(render.saturating_sub(slot));
    let centered = round_px(max_start as f64 / 2.0);
    (centered - offset).clamp(0, max_start) as u32
}

#[cfg(test)]
#[path = "../../tests/unit/render/geometry.rs"]
mod tests;
