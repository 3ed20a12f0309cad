#![forbid(unsafe_code)]

//! Deterministic pseudo-noise.
//!
//! Positional effects (shake, jolt, wind, sick, natural typing cadence) need
//! "random" jitter that is identical on every run. Everything here is a pure
//! function of its inputs: a glyph index, a time step, and a salt.

/// SplitMix64 finalizer.
#[inline]
pub fn hash64(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9E37_79B9_7F4A_7C15);
    x = (x ^ (x >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    x = (x ^ (x >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    x ^ (x >> 31)
}

/// Combine a glyph index with a salt into one hash input.
#[inline]
fn mix(index: u64, salt: u64) -> u64 {
    hash64(index.wrapping_mul(0x2545_F491_4F6C_DD1D) ^ salt)
}

/// Uniform value in `[0, 1)` for `(index, salt)`.
#[inline]
pub fn unit(index: u64, salt: u64) -> f32 {
    // Top 24 bits give an exactly representable f32 mantissa.
    (mix(index, salt) >> 40) as f32 / (1u64 << 24) as f32
}

/// Uniform value in `[-1, 1)` for `(index, salt)`.
#[inline]
pub fn signed(index: u64, salt: u64) -> f32 {
    unit(index, salt) * 2.0 - 1.0
}

/// Smooth 1-D value noise in `[-1, 1]`.
///
/// Lattice points at integer `x` get a [`signed`] value; between them the
/// result is smoothstep-interpolated, so the output is continuous in `x`.
pub fn value_noise(x: f32, seed: u64) -> f32 {
    let floor = x.floor();
    let frac = x - floor;
    let i = floor as i64 as u64;
    let a = signed(i, seed);
    let b = signed(i.wrapping_add(1), seed);
    let t = frac * frac * (3.0 - 2.0 * frac);
    a + (b - a) * t
}
