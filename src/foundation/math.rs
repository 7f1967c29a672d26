/// 32-bit FNV-1a string hash, used to turn seed strings into generator state.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Fnv1a32(u32);

impl Fnv1a32 {
    pub(crate) const OFFSET_BASIS: u32 = 0x811c_9dc5;
    const PRIME: u32 = 0x0100_0193;

    pub(crate) fn new_default() -> Self {
        Self(Self::OFFSET_BASIS)
    }

    pub(crate) fn write_bytes(&mut self, bytes: &[u8]) {
        let mut h = self.0;
        for &b in bytes {
            h ^= u32::from(b);
            h = h.wrapping_mul(Self::PRIME);
        }
        self.0 = h;
    }

    pub(crate) fn finish(self) -> u32 {
        self.0
    }
}

pub(crate) fn mul_div255_u16(x: u16, y: u16) -> u16 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u16
}

pub(crate) fn mul_div255_u8(x: u16, y: u16) -> u8 {
    mul_div255_u16(x, y) as u8
}

/// Round a pixel measure with halves going toward positive infinity, saturating into `i64`.
pub(crate) fn round_px(v: f64) -> i64 {
    if v.is_finite() {
        (v + 0.5).floor() as i64
    } else {
        0
    }
}

/// Round a non-negative pixel extent, never below `min`.
pub(crate) fn round_extent(v: f64, min: u32) -> u32 {
    round_px(v).clamp(i64::from(min), i64::from(u32::MAX)) as u32
}

/// Convert a `[0, 1]` float channel to `u8` with rounding and inclusive clamping.
pub(crate) fn unit_to_u8(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}
