use crate::foundation::core::{MAX_OUTPUT_SIDE, PxRect, Size};
use crate::foundation::error::{CoverError, CoverResult};

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
/// A named rendering recipe: canvas size, poster slot, and layered decoration.
///
/// All geometry is expressed in the template's own `output` coordinate space and is rescaled
/// per axis when rendering at a different size.
pub struct Template {
    /// Unique catalog key.
    pub id: String,
    /// Display label.
    pub name: String,
    /// Native canvas size.
    pub output: Size,
    /// Poster slot within the canvas.
    pub poster: PxRect,
    /// Composite the synthetic scanline layer over the poster slot.
    #[serde(default = "default_scanlines")]
    pub scanlines: bool,
    /// Seeded placement perturbation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poster_jitter: Option<PosterJitter>,
    /// Layers composited before the poster.
    #[serde(default)]
    pub underlays: Vec<OverlayLayer>,
    /// Layers composited after the poster.
    #[serde(default)]
    pub overlays: Vec<OverlayLayer>,
    /// Color adjustment applied to the poster image.
    #[serde(default)]
    pub grade: ColorGrade,
}

fn default_scanlines() -> bool {
    true
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
/// Parameters for seeded poster jitter.
pub struct PosterJitter {
    /// Probability in `[0, 1]` that jitter is applied at all.
    pub chance: f64,
    /// Horizontal offset bound in template pixels.
    pub max_offset_x: f64,
    /// Vertical offset bound in template pixels.
    pub max_offset_y: f64,
    /// Maximum extra zoom, e.g. `0.12` for up to 12%.
    pub max_scale_pct: f64,
    /// Probability in `[0, 1]` of the vertical-drift bias.
    #[serde(default)]
    pub vertical_bias_chance: f64,
    /// Vertical bound multiplier under bias (`>= 1`).
    #[serde(default = "default_bias_multiplier")]
    pub vertical_bias_multiplier: f64,
}

fn default_bias_multiplier() -> f64 {
    1.0
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
/// One compositing step above or below the poster.
pub struct OverlayLayer {
    /// Path under the asset root.
    pub public_path: String,
    /// Blend mode.
    #[serde(default)]
    pub blend: BlendMode,
    /// Alpha multiplier in `[0, 1]`; absent means source alpha unchanged.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f32>,
    /// Left edge override in template pixels.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub left: Option<i32>,
    /// Top edge override in template pixels.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top: Option<i32>,
    /// Width override in template pixels.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    /// Height override in template pixels.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
}

impl OverlayLayer {
    /// Full-canvas layer with the given blend mode.
    pub fn new(public_path: impl Into<String>, blend: BlendMode) -> Self {
        Self {
            public_path: public_path.into(),
            blend,
            opacity: None,
            left: None,
            top: None,
            width: None,
            height: None,
        }
    }

    /// Builder-style opacity setter.
    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = Some(opacity);
        self
    }

    /// Placement in template space; missing fields fall back to the full canvas.
    pub fn rect_in(&self, canvas: Size) -> PxRect {
        PxRect {
            left: self.left.unwrap_or(0),
            top: self.top.unwrap_or(0),
            width: self.width.unwrap_or(canvas.width),
            height: self.height.unwrap_or(canvas.height),
        }
    }
}

#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "kebab-case")]
/// Blend mode used when compositing a layer onto the canvas.
pub enum BlendMode {
    /// Source over destination.
    #[default]
    Over,
    /// Keep destination where the (luminance-masked) source is opaque.
    DestinationIn,
    /// Multiply.
    Multiply,
    /// Screen.
    Screen,
    /// Overlay.
    Overlay,
    /// Soft light (W3C formula).
    SoftLight,
    /// Hard light.
    HardLight,
}

impl BlendMode {
    /// Stable kebab-case name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Over => "over",
            Self::DestinationIn => "destination-in",
            Self::Multiply => "multiply",
            Self::Screen => "screen",
            Self::Overlay => "overlay",
            Self::SoftLight => "soft-light",
            Self::HardLight => "hard-light",
        }
    }

    /// Every mode, in declaration order.
    pub const ALL: [Self; 7] = [
        Self::Over,
        Self::DestinationIn,
        Self::Multiply,
        Self::Screen,
        Self::Overlay,
        Self::SoftLight,
        Self::HardLight,
    ];
}

impl std::str::FromStr for BlendMode {
    type Err = CoverError;

    fn from_str(s: &str) -> CoverResult<Self> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| CoverError::validation("blend", format!("unknown blend mode '{s}'")))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
/// Fixed color adjustment applied to the poster before extraction.
///
/// `brightness` multiplies RGB, `saturation` scales chroma around Rec.709 luma, then the
/// linear step maps each channel `c -> linear_a * c + linear_b` (`linear_b` in 0..255 units).
pub struct ColorGrade {
    /// Brightness multiplier.
    pub brightness: f32,
    /// Saturation multiplier.
    pub saturation: f32,
    /// Linear contrast multiplier.
    pub linear_a: f32,
    /// Linear offset.
    pub linear_b: f32,
}

impl ColorGrade {
    /// No-op grade.
    pub const IDENTITY: Self = Self {
        brightness: 1.0,
        saturation: 1.0,
        linear_a: 1.0,
        linear_b: 0.0,
    };

    /// Grade of the synthetic classic sleeve: a bright, punchy boost that survives the
    /// scanline soft-light pass.
    pub const CLASSIC: Self = Self {
        brightness: 1.04,
        saturation: 1.12,
        linear_a: 1.06,
        linear_b: -6.0,
    };

    /// Grade of the black-case mockup: gentler, the plastic screen pass already lifts blacks.
    pub const BLACK_CASE: Self = Self {
        brightness: 1.02,
        saturation: 1.06,
        linear_a: 1.04,
        linear_b: -4.0,
    };

    /// `true` when applying the grade cannot change any pixel.
    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }
}

impl Default for ColorGrade {
    fn default() -> Self {
        Self::CLASSIC
    }
}

impl Template {
    /// Validate authoring invariants for catalogs loaded from disk.
    pub fn validate(&self) -> CoverResult<()> {
        if self.id.trim().is_empty() {
            return Err(CoverError::config("template id must be non-empty"));
        }
        if self.output.is_empty() {
            return Err(CoverError::config(format!(
                "template '{}' output width/height must be > 0",
                self.id
            )));
        }
        if self.output.is_oversized() {
            return Err(CoverError::config(format!(
                "template '{}' output {} exceeds {MAX_OUTPUT_SIDE}px per side",
                self.id, self.output
            )));
        }
        if self.poster.width == 0 || self.poster.height == 0 {
            return Err(CoverError::config(format!(
                "template '{}' poster width/height must be > 0",
                self.id
            )));
        }
        if !self.poster.fits_within(self.output) {
            return Err(CoverError::config(format!(
                "template '{}' poster rect lies outside the output canvas",
                self.id
            )));
        }
        if let Some(j) = &self.poster_jitter {
            j.validate(&self.id)?;
        }
        for layer in self.underlays.iter().chain(&self.overlays) {
            validate_layer(layer).map_err(|msg| {
                CoverError::config(format!("template '{}' layer: {msg}", self.id))
            })?;
        }
        let g = &self.grade;
        for (name, v) in [
            ("brightness", g.brightness),
            ("saturation", g.saturation),
            ("linearA", g.linear_a),
            ("linearB", g.linear_b),
        ] {
            if !v.is_finite() {
                return Err(CoverError::config(format!(
                    "template '{}' grade.{name} must be finite",
                    self.id
                )));
            }
        }
        Ok(())
    }
}

impl PosterJitter {
    fn validate(&self, template_id: &str) -> CoverResult<()> {
        let unit = |v: f64| v.is_finite() && (0.0..=1.0).contains(&v);
        let non_neg = |v: f64| v.is_finite() && v >= 0.0;
        if !unit(self.chance) || !unit(self.vertical_bias_chance) {
            return Err(CoverError::config(format!(
                "template '{template_id}' jitter chances must be within [0, 1]"
            )));
        }
        if !non_neg(self.max_offset_x) || !non_neg(self.max_offset_y) {
            return Err(CoverError::config(format!(
                "template '{template_id}' jitter offsets must be finite and >= 0"
            )));
        }
        if !non_neg(self.max_scale_pct) {
            return Err(CoverError::config(format!(
                "template '{template_id}' jitter maxScalePct must be finite and >= 0"
            )));
        }
        if !self.vertical_bias_multiplier.is_finite() || self.vertical_bias_multiplier < 1.0 {
            return Err(CoverError::config(format!(
                "template '{template_id}' jitter verticalBiasMultiplier must be >= 1"
            )));
        }
        Ok(())
    }
}

/// Shared layer checks, used for template layers and ad-hoc request overlays.
pub(crate) fn validate_layer(layer: &OverlayLayer) -> Result<(), String> {
    if layer.public_path.trim().is_empty() {
        return Err("publicPath must be non-empty".to_string());
    }
    if let Some(o) = layer.opacity
        && (!o.is_finite() || !(0.0..=1.0).contains(&o))
    {
        return Err("opacity must be within [0, 1]".to_string());
    }
    if layer.width == Some(0) || layer.height == Some(0) {
        return Err("width/height overrides must be > 0".to_string());
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/template/model.rs"]
mod tests;
