//! # KABOOM Core
//!
//! Shared primitives for the arcade effects stack:
//! - 2D vectors and grid-aligned directions
//! - RGBA colors with a byte-alpha visibility cutoff
//! - Fixed-capacity pools that compact by swap-remove
//!
//! ## Architecture Rules
//!
//! 1. **No heap allocations in hot path** - pools are sized once at startup
//! 2. **Plain data** - every type here is `Copy` and `Pod`-friendly
//! 3. **Single owner** - nothing in this crate is synchronized; confine each
//!    instance to the render thread
//!
//! ## Example
//!
//! ```rust,ignore
//! use kaboom_core::{CompactPool, Vec2};
//!
//! let mut pool: CompactPool<Vec2> = CompactPool::new(300);
//! pool.push(Vec2::new(1.0, 2.0));
//! pool.retain_mut(|p| p.y > 0.0);
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod color;
pub mod math;
pub mod memory;

pub use color::Color;
pub use math::{GridDir, Rect, Vec2};
pub use memory::CompactPool;
