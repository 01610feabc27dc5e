//! # KABOOM
//!
//! Procedural explosion effects for grid-based arcade games.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                            KABOOM                               │
//! ├─────────────────────────────────────────────────────────────────┤
//! │                                                                 │
//! │  ┌───────────────┐   ┌───────────────┐   ┌──────────────────┐   │
//! │  │ kaboom_core   │──>│ kaboom_       │──>│ kaboom_effects   │   │
//! │  │               │   │ procedural    │   │                  │   │
//! │  │ • Vec2, Color │   │ • value noise │   │ • flames         │   │
//! │  │ • CompactPool │   │ • fbm         │   │ • particles      │   │
//! │  └───────────────┘   └───────────────┘   │ • shake, config  │   │
//! │                                          └────────┬─────────┘   │
//! │                                                   ▼             │
//! │                                        events ──► renderer      │
//! │                                                                 │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - `events`: gameplay events and their effect presets
//! - `renderer`: per-frame driver for every effect system

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]

pub mod events;
pub mod renderer;

// Re-export the units
pub use kaboom_core as core;
pub use kaboom_effects as effects;
pub use kaboom_procedural as procedural;

// Re-export commonly used types
pub use events::{EffectEvent, EffectEventQueue, EffectPreset, EventQueueStats, ShakeRequest};
pub use renderer::{ActiveExplosion, EffectsRenderer, FrameResult, RendererStats, EXPLOSION_DURATION, FRAME_BUDGET_US};
