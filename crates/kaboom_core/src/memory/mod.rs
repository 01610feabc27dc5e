//! # Memory Management
//!
//! Pre-allocated pools for zero-allocation effects.
//!
//! ## Design Philosophy
//!
//! All memory is allocated once when an effect system is built. Per frame:
//! - No heap allocations
//! - No per-object lifetimes, only slot liveness
//! - Cost proportional to live objects, not capacity

mod pool;

pub use pool::CompactPool;
