//! # Effects Renderer
//!
//! Owns every effect system and runs them once per frame.
//!
//! ## Frame Order
//!
//! 1. Drain queued [`EffectEvent`]s into particles, shake and explosions
//! 2. Advance particles, shake and explosion clocks by `dt`
//! 3. Draw explosions, then particles, both offset by the current shake
//!
//! Each stage is timed; [`FrameResult::over_budget`] flags frames slower than
//! [`FRAME_BUDGET_US`].

use std::time::Instant;

use kaboom_core::{CompactPool, Vec2};
use kaboom_effects::{
    Canvas, EffectClock, EffectsConfig, EffectsError, EffectsResult, ExplosionCompositor,
    ExplosionFrame, Palette, ParticlePool, ScreenShake, Theme,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::events::{EffectEvent, EffectEventQueue};

/// Seconds from detonation until an explosion is gone.
pub const EXPLOSION_DURATION: f32 = 0.8;

/// Frame budget in microseconds (60 Hz).
pub const FRAME_BUDGET_US: u64 = 16_666;

/// Largest per-explosion noise offset.
const SEED_RANGE: f32 = 512.0;

/// Keeps shake and variety streams apart from the particle stream.
const SHAKE_STREAM: u64 = 0x5348_414B_4500_0000;
const VARIETY_STREAM: u64 = 0x5641_5249_4554_5900;

/// One explosion in flight.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ActiveExplosion {
    /// Blast center in pixels.
    pub center: Vec2,
    /// Arm lengths in cells.
    pub arms: [u32; 4],
    /// Lifetime clock.
    pub clock: EffectClock,
    /// Noise offset giving this explosion its own shape.
    pub seed: f32,
    /// Colors captured when the explosion started.
    pub palette: Palette,
}

/// Timing and counts for one frame.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameResult {
    /// Whole frame in microseconds.
    pub frame_time_us: u64,
    /// Event handling in microseconds.
    pub event_process_us: u64,
    /// Simulation update in microseconds.
    pub update_us: u64,
    /// Drawing in microseconds.
    pub render_us: u64,
    /// Events handled this frame.
    pub events_processed: u32,
    /// Particles alive after the update.
    pub particles_alive: u32,
    /// Explosions alive after the update.
    pub explosions_active: u32,
    /// Draw calls issued for explosions.
    pub draw_calls: u32,
    /// True if the frame exceeded [`FRAME_BUDGET_US`].
    pub over_budget: bool,
}

/// Running statistics across frames.
#[derive(Debug, Clone, Copy, Default)]
pub struct RendererStats {
    /// Frames run through [`EffectsRenderer::frame`].
    pub total_frames: u64,
    /// Average frame time in microseconds.
    pub avg_frame_time_us: u64,
    /// Slowest frame in microseconds.
    pub worst_frame_time_us: u64,
    /// Frames over budget.
    pub frames_over_budget: u64,
    /// Explosions started.
    pub explosions_started: u64,
    /// Explosions refused because `max_active` were running.
    pub explosions_dropped: u64,
}

/// Drives particles, shake and explosions for one game view.
///
/// Single-threaded. Construct once and reuse; nothing allocates per frame.
pub struct EffectsRenderer {
    config: EffectsConfig,
    cell_size: f32,
    palette: Palette,
    particles: ParticlePool,
    shake: ScreenShake,
    compositor: ExplosionCompositor,
    explosions: CompactPool<ActiveExplosion>,
    queue: EffectEventQueue,
    rng: ChaCha8Rng,
    time: f32,
    total_frame_time_us: u64,
    stats: RendererStats,
}

impl EffectsRenderer {
    /// Builds every effect system from `config` for a grid of `cell_size`
    /// pixel cells.
    ///
    /// # Errors
    ///
    /// Returns [`EffectsError::InvalidConfig`] if `config` fails validation or
    /// `cell_size` is not a positive number.
    pub fn new(config: EffectsConfig, cell_size: f32) -> EffectsResult<Self> {
        config.validate()?;
        if !(cell_size > 0.0 && cell_size.is_finite()) {
            return Err(EffectsError::InvalidConfig(format!(
                "cell_size must be positive, got {cell_size}"
            )));
        }

        let seed = config.seed;
        let renderer = Self {
            cell_size,
            palette: config.active_palette(),
            particles: ParticlePool::from_settings(&config.particles, seed),
            shake: ScreenShake::from_settings(&config.shake, seed ^ SHAKE_STREAM),
            compositor: ExplosionCompositor::new(config.explosion.clone(), cell_size),
            explosions: CompactPool::new(config.explosion.max_active),
            queue: EffectEventQueue::new(),
            rng: ChaCha8Rng::seed_from_u64(seed ^ VARIETY_STREAM),
            time: 0.0,
            total_frame_time_us: 0,
            stats: RendererStats::default(),
            config,
        };
        tracing::info!(
            seed,
            cell_size,
            theme = ?renderer.config.theme,
            max_explosions = renderer.explosions.capacity(),
            "effects renderer ready"
        );
        Ok(renderer)
    }

    /// Active config.
    #[must_use]
    pub fn config(&self) -> &EffectsConfig {
        &self.config
    }

    /// Grid cell size in pixels.
    #[must_use]
    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Current palette.
    #[must_use]
    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    /// Uses `palette` for effects started from now on. Explosions already
    /// in flight keep the colors they started with.
    pub fn set_palette(&mut self, palette: Palette) {
        self.config.palette = Some(palette);
        self.palette = palette;
    }

    /// Switches to a built-in theme, dropping any custom palette.
    pub fn set_theme(&mut self, theme: Theme) {
        self.config.theme = theme;
        self.config.palette = None;
        self.palette = theme.palette();
        tracing::debug!(?theme, "theme changed");
    }

    /// Seconds simulated so far.
    #[must_use]
    pub fn time(&self) -> f32 {
        self.time
    }

    /// Particle pool.
    #[must_use]
    pub fn particles(&self) -> &ParticlePool {
        &self.particles
    }

    /// Screen shake.
    #[must_use]
    pub fn shake(&self) -> &ScreenShake {
        &self.shake
    }

    /// Mutable screen shake, e.g. to honor an accessibility toggle.
    pub fn shake_mut(&mut self) -> &mut ScreenShake {
        &mut self.shake
    }

    /// Explosions in flight.
    pub fn explosions(&self) -> impl Iterator<Item = &ActiveExplosion> {
        self.explosions.iter()
    }

    /// Number of explosions in flight.
    #[must_use]
    pub fn active_explosions(&self) -> usize {
        self.explosions.len()
    }

    /// Pending events.
    #[must_use]
    pub fn queue(&self) -> &EffectEventQueue {
        &self.queue
    }

    /// Running statistics.
    #[must_use]
    pub fn stats(&self) -> RendererStats {
        self.stats
    }

    /// Zeroes the running statistics, e.g. after a warm-up.
    pub fn reset_stats(&mut self) {
        self.stats = RendererStats::default();
        self.total_frame_time_us = 0;
    }

    /// Queues an event for the next [`EffectsRenderer::frame`].
    ///
    /// Returns false if the queue is full.
    pub fn push_event(&mut self, event: EffectEvent) -> bool {
        self.queue.push(event)
    }

    /// Applies one event immediately.
    pub fn handle_event(&mut self, event: &EffectEvent) {
        let preset = event.preset(&self.palette);
        let origin = event.position();

        for params in preset.emits.iter().flatten() {
            self.particles.emit_shaped(origin, params);
        }
        if let Some(shake) = preset.shake {
            self.shake.trigger(shake.intensity, shake.duration);
        }

        if let EffectEvent::BombExploded { center, arms } = *event {
            self.start_explosion(center, arms);
        }
    }

    fn start_explosion(&mut self, center: Vec2, arms: [u32; 4]) {
        // Seed 0 keeps every explosion identical
        let seed = if self.config.seed == 0 {
            0.0
        } else {
            self.rng.gen::<f32>() * SEED_RANGE
        };
        let explosion = ActiveExplosion {
            center,
            arms,
            clock: EffectClock::new(EXPLOSION_DURATION),
            seed,
            palette: self.palette,
        };

        if self.explosions.push(explosion) {
            self.stats.explosions_started += 1;
            tracing::debug!(x = center.x, y = center.y, ?arms, seed, "explosion started");
        } else {
            self.stats.explosions_dropped += 1;
            tracing::warn!(
                max_active = self.explosions.capacity(),
                "explosion dropped, too many active"
            );
        }
    }

    fn process_events(&mut self) -> u32 {
        let dropped = self.queue.stats().dropped;
        if dropped > 0 {
            tracing::warn!(dropped, "effect events dropped since last frame");
        }
        self.queue.reset_stats();

        let mut processed = 0;
        while let Some(event) = self.queue.pop() {
            self.handle_event(&event);
            processed += 1;
        }
        processed
    }

    /// Advances every effect by `dt` seconds.
    ///
    /// Non-positive or non-finite `dt` is ignored.
    pub fn update(&mut self, dt: f32) {
        if !(dt > 0.0 && dt.is_finite()) {
            return;
        }
        self.time += dt;
        self.particles.update(dt);
        self.shake.update(dt);

        let removed = self.explosions.retain_mut(|explosion| {
            explosion.clock.advance(dt);
            !explosion.clock.is_finished()
        });
        if removed > 0 {
            tracing::trace!(removed, active = self.explosions.len(), "explosions finished");
        }
    }

    /// Draws explosions then particles, offset by the current shake.
    ///
    /// Game coordinates map to `offset + position * scale`. Returns the number
    /// of explosion draw calls issued.
    pub fn render<C: Canvas + ?Sized>(&mut self, canvas: &mut C, scale: f32, offset: Vec2) -> usize {
        let offset = offset + self.shake.offset();
        let mut drawn = 0;

        if !self.explosions.is_empty() {
            canvas.save();
            canvas.translate(offset);
            canvas.scale(scale);
            for explosion in self.explosions.iter() {
                let frame = ExplosionFrame {
                    center: explosion.center,
                    arms: explosion.arms,
                    cell_size: self.cell_size,
                    time: self.time,
                    progress: explosion.clock.progress(),
                    palette: explosion.palette,
                    seed: explosion.seed,
                };
                drawn += self.compositor.render_explosion(canvas, &frame);
            }
            canvas.restore();
        }

        self.particles.render(canvas, scale, offset);
        drawn
    }

    /// Runs one full frame: events, update, render.
    pub fn frame<C: Canvas + ?Sized>(
        &mut self,
        canvas: &mut C,
        dt: f32,
        scale: f32,
        offset: Vec2,
    ) -> FrameResult {
        let frame_start = Instant::now();

        let event_start = Instant::now();
        let events_processed = self.process_events();
        let event_process_us = event_start.elapsed().as_micros() as u64;

        let update_start = Instant::now();
        self.update(dt);
        let update_us = update_start.elapsed().as_micros() as u64;

        let render_start = Instant::now();
        let draw_calls = self.render(canvas, scale, offset);
        let render_us = render_start.elapsed().as_micros() as u64;

        let frame_time_us = frame_start.elapsed().as_micros() as u64;
        let over_budget = frame_time_us > FRAME_BUDGET_US;

        self.stats.total_frames += 1;
        self.total_frame_time_us += frame_time_us;
        self.stats.avg_frame_time_us = self.total_frame_time_us / self.stats.total_frames;
        self.stats.worst_frame_time_us = self.stats.worst_frame_time_us.max(frame_time_us);
        if over_budget {
            self.stats.frames_over_budget += 1;
            tracing::warn!(frame_time_us, budget_us = FRAME_BUDGET_US, "effects frame over budget");
        }

        let result = FrameResult {
            frame_time_us,
            event_process_us,
            update_us,
            render_us,
            events_processed,
            particles_alive: self.particles.len() as u32,
            explosions_active: self.explosions.len() as u32,
            draw_calls: draw_calls as u32,
            over_budget,
        };
        tracing::trace!(?result, "frame complete");
        result
    }

    /// Drops every particle, explosion, pending event and shake.
    pub fn clear(&mut self) {
        self.particles.clear();
        self.explosions.clear();
        self.shake.reset();
        while self.queue.pop().is_some() {}
        tracing::debug!("effects cleared");
    }
}
