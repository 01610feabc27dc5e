//! # KABOOM Procedural
//!
//! Deterministic noise for flame geometry and flicker.
//!
//! ## Design Principles
//!
//! 1. **Deterministic**: the lattice comes from a fixed seed, never the clock
//! 2. **Shared**: one read-only lattice per process, built on first use
//! 3. **Fast**: four table reads and a handful of multiplies per sample
//!
//! ## Core Components
//!
//! - `ValueNoise`: 512-entry lattice with bilinear, smoothstep-eased lookup
//! - `ValueNoise::fbm`: three-octave fractal Brownian motion
//! - `noise_field()`: the process-wide lattice every effect samples
//!
//! ## Example
//!
//! ```rust,ignore
//! use kaboom_procedural::{fbm, noise};
//!
//! let wobble = noise(time * 3.0, 7.5);      // [0, 1)
//! let thickness = 0.8 + 0.4 * fbm(d, time); // fbm tops out near 0.875
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod noise;

pub use noise::{
    fbm, noise, noise_field, smoothstep, smoothstep_range, NoiseSeed, ValueNoise, FBM_MAX,
    LATTICE_SIZE,
};
