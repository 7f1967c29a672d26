use std::{fmt, str::FromStr};

use crate::foundation::error::{CoverError, CoverResult};
use crate::foundation::math::{round_extent, round_px};

/// Largest accepted output width or height.
pub const MAX_OUTPUT_SIDE: u32 = 8192;

/// Pixel dimensions of a canvas or layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Size {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Size {
    /// Construct a size.
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// `true` when either side is zero.
    pub fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// `true` when either side exceeds [`MAX_OUTPUT_SIDE`].
    pub fn is_oversized(self) -> bool {
        self.width > MAX_OUTPUT_SIDE || self.height > MAX_OUTPUT_SIDE
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl FromStr for Size {
    type Err = CoverError;

    /// Parses `WIDTHxHEIGHT`, e.g. `800x1200`.
    fn from_str(s: &str) -> CoverResult<Self> {
        let (w, h) = s
            .trim()
            .split_once(['x', 'X'])
            .ok_or_else(|| CoverError::validation("size", "expected WIDTHxHEIGHT"))?;
        let width = w
            .trim()
            .parse::<u32>()
            .map_err(|_| CoverError::validation("size", "width must be a positive integer"))?;
        let height = h
            .trim()
            .parse::<u32>()
            .map_err(|_| CoverError::validation("size", "height must be a positive integer"))?;
        let size = Self { width, height };
        if size.is_empty() {
            return Err(CoverError::validation("size", "width/height must be > 0"));
        }
        Ok(size)
    }
}

/// Axis-aligned pixel rectangle in canvas space.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct PxRect {
    /// Left edge.
    pub left: i32,
    /// Top edge.
    pub top: i32,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl PxRect {
    /// Construct a rectangle.
    pub const fn new(left: i32, top: i32, width: u32, height: u32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Rectangle covering a whole canvas.
    pub const fn full(size: Size) -> Self {
        Self::new(0, 0, size.width, size.height)
    }

    /// Rectangle dimensions.
    pub fn size(self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Rescale each field independently by the per-axis factors, rounding each one.
    pub fn scaled(self, sx: f64, sy: f64) -> Self {
        Self {
            left: round_px(f64::from(self.left) * sx) as i32,
            top: round_px(f64::from(self.top) * sy) as i32,
            width: round_extent(f64::from(self.width) * sx, 1),
            height: round_extent(f64::from(self.height) * sy, 1),
        }
    }

    /// `true` when the rectangle lies fully inside `bounds`.
    pub fn fits_within(self, bounds: Size) -> bool {
        self.left >= 0
            && self.top >= 0
            && i64::from(self.left) + i64::from(self.width) <= i64::from(bounds.width)
            && i64::from(self.top) + i64::from(self.height) <= i64::from(bounds.height)
    }
}

/// Canvas fill behind all layers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Background {
    /// Fully transparent canvas.
    #[default]
    Transparent,
    /// Straight-alpha RGBA8 color.
    Color([u8; 4]),
}

impl Background {
    /// Straight-alpha fill color.
    pub fn rgba8(self) -> [u8; 4] {
        match self {
            Self::Transparent => [0, 0, 0, 0],
            Self::Color(c) => c,
        }
    }
}

impl FromStr for Background {
    type Err = CoverError;

    /// Accepts `transparent`, `#rrggbb` or `#rrggbbaa`.
    fn from_str(s: &str) -> CoverResult<Self> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("transparent") {
            return Ok(Self::Transparent);
        }
        let hex = s
            .strip_prefix('#')
            .ok_or_else(|| CoverError::validation("background", "expected 'transparent' or #hex"))?;
        if !(hex.len() == 6 || hex.len() == 8) || !hex.is_ascii() {
            return Err(CoverError::validation(
                "background",
                "hex color must be #rrggbb or #rrggbbaa",
            ));
        }
        let mut out = [0u8, 0, 0, 255];
        for (i, slot) in out.iter_mut().enumerate().take(hex.len() / 2) {
            *slot = u8::from_str_radix(&hex[i * 2..i * 2 + 2], 16)
                .map_err(|_| CoverError::validation("background", "invalid hex digit"))?;
        }
        Ok(Self::Color(out))
    }
}

impl fmt::Display for Background {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transparent => f.write_str("transparent"),
            Self::Color([r, g, b, a]) => write!(f, "#{r:02x}{g:02x}{b:02x}{a:02x}"),
        }
    }
}

impl serde::Serialize for Background {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> serde::Deserialize<'de> for Background {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
