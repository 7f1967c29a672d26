use crate::foundation::math::round_px;
use crate::render::geometry::ScaleFactors;
use crate::render::rng::SeededRng;
use crate::template::model::PosterJitter;

/// Horizontal bound multiplier while the vertical bias is active.
pub const VERTICAL_BIAS_X_FACTOR: f64 = 0.52;
/// Lower bound of the zoom draw (fraction of `maxScalePct`) while the vertical bias is active.
pub const VERTICAL_BIAS_SCALE_FLOOR: f64 = 0.38;

/// Resolved poster perturbation for one render.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct JitterPlan {
    /// Whether the activation draw passed.
    pub active: bool,
    /// Whether the vertical-bias draw passed.
    pub vertical_bias: bool,
    /// Horizontal shift in canvas pixels (positive moves the picture right).
    pub offset_x: i64,
    /// Vertical shift in canvas pixels (positive moves the picture down).
    pub offset_y: i64,
    /// Uniform zoom multiplier, `>= 1`.
    pub scale: f64,
}

impl JitterPlan {
    /// No perturbation.
    pub const NONE: Self = Self {
        active: false,
        vertical_bias: false,
        offset_x: 0,
        offset_y: 0,
        scale: 1.0,
    };

    /// Compute the plan for a template's jitter parameters and an optional seed.
    ///
    /// Without both parameters and a seed the result is [`JitterPlan::NONE`]. Draw order is
    /// fixed: activation, vertical bias, x offset, y offset, zoom.
    pub fn compute(params: Option<&PosterJitter>, seed: Option<&str>, scale: ScaleFactors) -> Self {
        let (Some(p), Some(seed)) = (params, seed) else {
            return Self::NONE;
        };

        let mut rng = SeededRng::new(seed);
        if rng.next_f64() >= p.chance {
            return Self::NONE;
        }
        let vertical_bias = rng.next_f64() < p.vertical_bias_chance;

        let (x_factor, y_factor, floor) = if vertical_bias {
            (
                VERTICAL_BIAS_X_FACTOR,
                p.vertical_bias_multiplier,
                VERTICAL_BIAS_SCALE_FLOOR,
            )
        } else {
            (1.0, 1.0, 0.0)
        };

        let bound_x = p.max_offset_x * scale.sx * x_factor;
        let bound_y = p.max_offset_y * scale.sy * y_factor;
        let offset_x = round_px((rng.next_f64() * 2.0 - 1.0) * bound_x);
        let offset_y = round_px((rng.next_f64() * 2.0 - 1.0) * bound_y);

        let t = floor + rng.next_f64() * (1.0 - floor);
        let zoom = 1.0 + p.max_scale_pct.max(0.0) * t;

        Self {
            active: true,
            vertical_bias,
            offset_x,
            offset_y,
            scale: zoom,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/jitter.rs"]
mod tests;
