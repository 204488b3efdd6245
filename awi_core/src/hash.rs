//! Content fingerprints for cached operators.
//!
//! FNV-1a is simple, fast, and has reasonable distribution properties. It is
//! not cryptographic; it only has to tell two targets apart so a cached
//! operator is not reused for the wrong one.

use core::hash::Hasher;

// FNV-1a constants
const FNV_OFFSET_64: u64 = 0xcbf29ce484222325;
const FNV_PRIME_64: u64 = 0x00000100000001b3;

/// Streaming FNV-1a 64-bit hasher.
#[derive(Debug, Clone, Copy)]
pub struct Fnv1a64 {
    state: u64,
}

impl Default for Fnv1a64 {
    fn default() -> Self {
        Self::new()
    }
}

impl Fnv1a64 {
    /// Create a hasher at the FNV offset basis.
    #[inline]
    pub const fn new() -> Self {
        Self {
            state: FNV_OFFSET_64,
        }
    }

    /// Feed the little-endian bits of an `f32`.
    #[inline]
    pub fn write_f32(&mut self, value: f32) {
        self.write(&value.to_bits().to_le_bytes());
    }

    /// Feed the little-endian bits of an `f64`.
    #[inline]
    pub fn write_f64(&mut self, value: f64) {
        self.write(&value.to_bits().to_le_bytes());
    }
}

impl Hasher for Fnv1a64 {
    #[inline]
    fn write(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.state ^= byte as u64;
            self.state = self.state.wrapping_mul(FNV_PRIME_64);
        }
    }

    #[inline]
    fn finish(&self) -> u64 {
        self.state
    }
}

/// Fingerprint of a target signal/image together with its dimensions.
///
/// Dimensions are hashed so that a `2 x 3` and a `3 x 2` image with the same
/// values do not collide.
pub fn fingerprint_f32<I>(dims: &[usize], values: I) -> u64
where
    I: IntoIterator<Item = f32>,
{
    let mut hasher = Fnv1a64::new();
    hasher.write_usize(dims.len());
    for &d in dims {
        hasher.write_u64(d as u64);
    }
    for v in values {
        hasher.write_f32(v);
    }
    hasher.finish()
}
