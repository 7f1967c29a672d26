use crate::foundation::math::Fnv1a32;

/// Deterministic `[0, 1)` stream derived from a seed string (FNV-1a 32 + Mulberry32).
///
/// Identical seeds always yield identical sequences; there is no time-based entropy.
#[derive(Clone, Debug)]
pub struct SeededRng {
    state: u32,
}

impl SeededRng {
    /// Seed the generator from a string.
    pub fn new(seed: &str) -> Self {
        let mut h = Fnv1a32::new_default();
        h.write_bytes(seed.as_bytes());
        Self { state: h.finish() }
    }

    /// Next raw 32-bit output.
    pub fn next_u32(&mut self) -> u32 {
        self.state = self.state.wrapping_add(0x6d2b_79f5);
        let mut t = self.state;
        t = (t ^ (t >> 15)).wrapping_mul(t | 1);
        t ^= t.wrapping_add((t ^ (t >> 7)).wrapping_mul(t | 61));
        t ^ (t >> 14)
    }

    /// Next value in `[0, 1)`.
    pub fn next_f64(&mut self) -> f64 {
        f64::from(self.next_u32()) / 4_294_967_296.0
    }
}

impl Iterator for SeededRng {
    type Item = f64;

    fn next(&mut self) -> Option<f64> {
        Some(self.next_f64())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/rng.rs"]
mod tests;
