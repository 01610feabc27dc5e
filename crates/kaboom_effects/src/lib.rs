//! # KABOOM Effects
//!
//! Procedural explosion, particle and screen shake effects for a grid-based
//! arcade renderer.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        PER FRAME                             │
//! ├──────────────────────────────────────────────────────────────┤
//! │  update(dt):  ParticlePool ──► ScreenShake                   │
//! │                                                              │
//! │  render:      envelope(progress)                             │
//! │                  │                                           │
//! │                  ▼                                           │
//! │               ExplosionCompositor ──► FlameGeometryBuilder   │
//! │                  │                         │ (noise, fbm)    │
//! │                  ▼                         ▼                 │
//! │               Canvas ◄──────────────── PathBuffer            │
//! │                  ▲                                           │
//! │               ParticlePool::render                           │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Rules
//!
//! - Single render thread. None of these types synchronize; keep every
//!   instance on the thread that owns the frame
//! - No allocation per frame once buffers are warm
//! - Degenerate input is clamped or skipped, never an error. Only config
//!   loading returns [`EffectsResult`]
//!
//! ## Example
//!
//! ```rust,ignore
//! use kaboom_effects::{EffectsConfig, ParticlePool, EmitParams, RecordingCanvas};
//!
//! let config = EffectsConfig::default();
//! let mut pool = ParticlePool::from_settings(&config.particles, config.seed);
//! pool.emit_shaped(Vec2::new(64.0, 64.0), &EmitParams::sparks(Color::WHITE, 24));
//! pool.update(1.0 / 60.0);
//! pool.render(&mut RecordingCanvas::new(), 1.0, Vec2::ZERO);
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod canvas;
pub mod config;
pub mod envelope;
pub mod error;
pub mod explosion;
pub mod flame;
pub mod palette;
pub mod particles;
pub mod shake;

pub use canvas::{
    Canvas, DrawCommand, Gradient, GradientStop, Paint, PathBuffer, PathVerb, RecordingCanvas,
    Shader, StrokeCap,
};
pub use config::{EffectsConfig, ExplosionSettings, LayerSettings, ParticleSettings, ShakeSettings};
pub use envelope::{calculate_envelope, progress, EffectClock};
pub use error::{EffectsError, EffectsResult};
pub use explosion::{ExplosionCompositor, ExplosionFrame, PaintSet};
pub use flame::{FlameArmRequest, FlameGeometryBuilder, FlameOutline, OutlineParams};
pub use palette::{Palette, Theme};
pub use particles::{
    instance_bytes, EmitParams, Particle, ParticleInstance, ParticlePool, ParticleShape,
    ParticleStats,
};
pub use shake::ScreenShake;
