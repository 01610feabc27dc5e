//! # Value Noise Implementation
//!
//! Cheap, deterministic 2D noise for organic flame motion.
//!
//! ## Why value noise over simplex?
//!
//! - Flames only need low-frequency wobble, not gradient quality
//! - One table read per corner, no gradient dot products
//! - Output is already in [0, 1), ready to scale widths and alphas
//!
//! ## Determinism Guarantee
//!
//! The lattice is filled from a ChaCha stream with a fixed seed, so every
//! run on every platform sees exactly the same values.

use std::sync::OnceLock;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Number of entries in the noise lattice.
pub const LATTICE_SIZE: usize = 512;

/// Mask applied to lattice coordinates and hashes.
const LATTICE_MASK: i32 = (LATTICE_SIZE as i32) - 1;

/// Row multiplier in the corner hash `(ix + iy * 37) & 511`.
const ROW_HASH: i32 = 37;

/// Octaves summed by [`ValueNoise::fbm`].
const FBM_OCTAVES: u32 = 3;

/// Amplitude of the first octave; each following octave halves it.
const FBM_BASE_AMPLITUDE: f32 = 0.5;

/// Domain shift between octaves, decorrelates them from the base lattice.
const FBM_OCTAVE_OFFSET: f32 = 100.0;

/// Upper bound of [`ValueNoise::fbm`]: 0.5 + 0.25 + 0.125.
pub const FBM_MAX: f32 = 0.875;

/// Seed for lattice generation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NoiseSeed(u64);

impl NoiseSeed {
    /// Creates a new noise seed.
    #[inline]
    #[must_use]
    pub const fn new(seed: u64) -> Self {
        Self(seed)
    }

    /// Returns the raw seed value.
    #[inline]
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }
}

impl Default for NoiseSeed {
    /// The literal every build ships with.
    fn default() -> Self {
        Self(0x4B41_424F_4F4D_0001)
    }
}

/// 2D value noise over a 512-entry lattice.
///
/// Produces smooth, continuous values in the range [0, 1).
///
/// # Performance
///
/// - O(1) per sample
/// - No allocations
/// - The whole lattice is 2 KiB and stays in L1
pub struct ValueNoise {
    /// Pseudo-random values in [0, 1), immutable after construction.
    lattice: [f32; LATTICE_SIZE],
}

impl ValueNoise {
    /// Builds a lattice from a seed.
    #[must_use]
    pub fn new(seed: NoiseSeed) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed.value());
        let mut lattice = [0.0_f32; LATTICE_SIZE];
        for value in &mut lattice {
            *value = rng.gen::<f32>();
        }
        Self { lattice }
    }

    /// Raw lattice values.
    #[must_use]
    pub fn lattice(&self) -> &[f32; LATTICE_SIZE] {
        &self.lattice
    }

    /// Lattice value for a wrapped integer corner.
    #[inline]
    fn corner(&self, ix: i32, iy: i32) -> f32 {
        let hash = ix.wrapping_add(iy.wrapping_mul(ROW_HASH)) & LATTICE_MASK;
        self.lattice[hash as usize]
    }

    /// Samples value noise at the given coordinates.
    ///
    /// # Returns
    ///
    /// A value in the range [0, 1).
    #[must_use]
    pub fn sample(&self, x: f32, y: f32) -> f32 {
        let x0 = x.floor();
        let y0 = y.floor();
        let ix = (x0 as i32) & LATTICE_MASK;
        let iy = (y0 as i32) & LATTICE_MASK;

        let fx = smoothstep(x - x0);
        let fy = smoothstep(y - y0);

        let top_left = self.corner(ix, iy);
        let top_right = self.corner(ix + 1, iy);
        let bottom_left = self.corner(ix, iy + 1);
        let bottom_right = self.corner(ix + 1, iy + 1);

        let top = top_left + (top_right - top_left) * fx;
        let bottom = bottom_left + (bottom_right - bottom_left) * fx;
        top + (bottom - top) * fy
    }

    /// Three-octave fractal Brownian motion.
    ///
    /// Each octave doubles frequency and halves amplitude, starting at 0.5.
    /// Octave `n + 1` samples at `(2x + 100, 2y + 100)` relative to octave `n`.
    ///
    /// # Returns
    ///
    /// A value in [0, [`FBM_MAX`]).
    #[must_use]
    pub fn fbm(&self, x: f32, y: f32) -> f32 {
        let mut total = 0.0;
        let mut amplitude = FBM_BASE_AMPLITUDE;
        let (mut x, mut y) = (x, y);

        for _ in 0..FBM_OCTAVES {
            total += self.sample(x, y) * amplitude;
            x = x * 2.0 + FBM_OCTAVE_OFFSET;
            y = y * 2.0 + FBM_OCTAVE_OFFSET;
            amplitude *= 0.5;
        }

        total
    }
}

impl Default for ValueNoise {
    fn default() -> Self {
        Self::new(NoiseSeed::default())
    }
}

/// The process-wide lattice, built from [`NoiseSeed::default`] on first use.
pub fn noise_field() -> &'static ValueNoise {
    static FIELD: OnceLock<ValueNoise> = OnceLock::new();
    FIELD.get_or_init(|| {
        tracing::debug!(entries = LATTICE_SIZE, "noise lattice initialised");
        ValueNoise::default()
    })
}

/// [`ValueNoise::sample`] on the shared lattice.
#[inline]
#[must_use]
pub fn noise(x: f32, y: f32) -> f32 {
    noise_field().sample(x, y)
}

/// [`ValueNoise::fbm`] on the shared lattice.
#[inline]
#[must_use]
pub fn fbm(x: f32, y: f32) -> f32 {
    noise_field().fbm(x, y)
}

/// Hermite easing `t * t * (3 - 2t)` for `t` in [0, 1].
#[inline]
#[must_use]
pub fn smoothstep(t: f32) -> f32 {
    t * t * (3.0 - 2.0 * t)
}

/// Smoothstep of `x` between two edges, clamped to [0, 1].
#[inline]
#[must_use]
pub fn smoothstep_range(edge0: f32, edge1: f32, x: f32) -> f32 {
    if edge1 <= edge0 {
        return if x < edge0 { 0.0 } else { 1.0 };
    }
    smoothstep(((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_determinism() {
        let noise1 = ValueNoise::new(NoiseSeed::new(12345));
        let noise2 = ValueNoise::new(NoiseSeed::new(12345));

        // Same seed should produce identical results
        for i in 0..100 {
            let x = i as f32 * 0.1;
            let y = i as f32 * 0.17;
            assert_eq!(
                noise1.sample(x, y).to_bits(),
                noise2.sample(x, y).to_bits(),
                "Noise should be deterministic"
            );
            assert_eq!(noise1.fbm(x, y).to_bits(), noise2.fbm(x, y).to_bits());
        }
    }

    #[test]
    fn test_different_seeds_different_lattices() {
        let noise1 = ValueNoise::new(NoiseSeed::new(1));
        let noise2 = ValueNoise::new(NoiseSeed::new(2));

        assert_ne!(noise1.lattice(), noise2.lattice());
    }

    #[test]
    fn test_lattice_range() {
        let noise = ValueNoise::default();
        assert!(noise.lattice().iter().all(|v| (0.0..1.0).contains(v)));
    }

    #[test]
    fn test_sample_range() {
        let noise = ValueNoise::default();

        for i in 0..10000 {
            let x = (i as f32 * 0.1) - 500.0;
            let y = (i as f32 * 0.13) - 650.0;
            let value = noise.sample(x, y);

            assert!(
                (0.0..1.0).contains(&value),
                "Value {value} out of range at ({x}, {y})"
            );
        }
    }

    #[test]
    fn test_sample_hits_lattice_at_integers() {
        let noise = ValueNoise::default();
        // At integer points the easing weights are zero: pure corner value
        assert_eq!(noise.sample(0.0, 0.0), noise.lattice()[0]);
        assert_eq!(noise.sample(1.0, 0.0), noise.lattice()[1]);
        assert_eq!(noise.sample(0.0, 1.0), noise.lattice()[37]);
        assert_eq!(noise.sample(2.0, 3.0), noise.lattice()[2 + 3 * 37]);
    }

    #[test]
    fn test_lattice_wraps_every_512_cells() {
        let noise = ValueNoise::default();
        for i in 0..50 {
            let x = i as f32 * 0.25 + 0.125;
            assert_eq!(noise.sample(x, 3.5), noise.sample(x + 512.0, 3.5));
        }
    }

    #[test]
    fn test_continuity() {
        let noise = ValueNoise::default();

        let v1 = noise.sample(100.3, 100.6);
        let v2 = noise.sample(100.301, 100.6);
        let v3 = noise.sample(100.3, 100.601);

        assert!((v1 - v2).abs() < 0.01, "Noise should be continuous");
        assert!((v1 - v3).abs() < 0.01, "Noise should be continuous");
    }

    #[test]
    fn test_fbm_bounded() {
        let noise = ValueNoise::default();
        for i in 0..5000 {
            let x = i as f32 * 0.37 - 900.0;
            let y = i as f32 * 0.11;
            let v = noise.fbm(x, y);
            assert!((0.0..FBM_MAX).contains(&v), "fbm {v} out of range");
        }
    }

    #[test]
    fn test_shared_field_uses_default_seed() {
        let local = ValueNoise::default();
        assert_eq!(noise_field().lattice(), local.lattice());
        assert_eq!(noise(4.2, 1.7).to_bits(), local.sample(4.2, 1.7).to_bits());
        assert_eq!(fbm(4.2, 1.7).to_bits(), local.fbm(4.2, 1.7).to_bits());
    }

    #[test]
    fn test_smoothstep() {
        assert_eq!(smoothstep(0.0), 0.0);
        assert_eq!(smoothstep(1.0), 1.0);
        assert_eq!(smoothstep(0.5), 0.5);
        assert_eq!(smoothstep_range(0.0, 0.5, 0.75), 1.0);
        assert_eq!(smoothstep_range(0.0, 0.5, -1.0), 0.0);
    }
}
