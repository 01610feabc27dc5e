//! # Particle Pool
//!
//! Fixed-capacity CPU particle simulator.
//!
//! ## Architecture
//!
//! 1. All slots are allocated once, in [`ParticlePool::new`]
//! 2. Live particles occupy a contiguous prefix of the slot array
//! 3. `update` ages, integrates and compacts in one forward pass
//! 4. `render` draws by shape; `write_instances` exports for instanced backends
//!
//! Emitting into a full pool silently drops the excess. Saturation is a drop
//! policy, not an error.

use std::f32::consts::TAU;

use bytemuck::{Pod, Zeroable};
use kaboom_core::{Color, CompactPool, Rect, Vec2};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::canvas::{Canvas, Paint, Shader, StrokeCap};
use crate::config::ParticleSettings;

/// Particles with a byte alpha below this are not drawn.
const MIN_ALPHA_BYTE: u8 = 2;

/// Drag never removes more than half the velocity in one tick.
const MIN_DAMPING: f32 = 0.5;

/// Spark tail length per unit of speed.
const SPARK_STRETCH: f32 = 0.04;

/// How a particle is drawn and how strongly gravity pulls it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ParticleShape {
    /// Plain filled square (debris).
    #[default]
    Rectangle,
    /// Disc with an optional soft halo.
    Circle,
    /// Capsule stretched along the velocity, bright tip.
    Spark,
    /// Pulsing glow with a warm core; drifts upward.
    Ember,
}

impl ParticleShape {
    /// Multiplier applied to the pool's gravity.
    #[must_use]
    pub const fn gravity_scale(self) -> f32 {
        match self {
            Self::Rectangle => 1.0,
            Self::Circle => 0.6,
            Self::Spark => 0.8,
            Self::Ember => -0.3,
        }
    }
}

/// One simulated particle, stored inline in the pool.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Particle {
    /// Position in pixels.
    pub position: Vec2,
    /// Velocity in pixels per second.
    pub velocity: Vec2,
    /// Base color before fading.
    pub color: Color,
    /// Seconds left.
    pub life: f32,
    /// Seconds at birth.
    pub max_life: f32,
    /// Diameter (or side length) in pixels.
    pub size: f32,
    /// Render shape.
    pub shape: ParticleShape,
    /// Draw a soft halo.
    pub glow: bool,
    /// Radians; embers reuse it as pulse phase.
    pub rotation: f32,
    /// Radians per second.
    pub rotation_speed: f32,
    /// Velocity damping per second; zero disables drag.
    pub air_resistance: f32,
}

impl Particle {
    /// Remaining life as a fraction of the starting life.
    #[inline]
    #[must_use]
    pub fn life_fraction(&self) -> f32 {
        if self.max_life <= 0.0 {
            return 0.0;
        }
        (self.life / self.max_life).clamp(0.0, 1.0)
    }

    /// True while life remains.
    #[inline]
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.life > 0.0
    }
}

/// Parameters for one emit call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EmitParams {
    /// Particles requested.
    pub count: usize,
    /// Base color.
    pub color: Color,
    /// Render shape.
    pub shape: ParticleShape,
    /// Peak launch speed in pixels per second.
    pub speed: f32,
    /// Peak lifetime in seconds.
    pub lifetime: f32,
    /// Peak size in pixels.
    pub size: f32,
    /// Draw a soft halo.
    pub glow: bool,
    /// Velocity damping per second.
    pub air_resistance: f32,
    /// Center of the launch cone, radians.
    pub heading: f32,
    /// Width of the launch cone, radians. `TAU` is a full circle.
    pub spread: f32,
    /// Peak spin in radians per second.
    pub spin: f32,
}

impl Default for EmitParams {
    fn default() -> Self {
        Self {
            count: 1,
            color: Color::WHITE,
            shape: ParticleShape::Rectangle,
            speed: 120.0,
            lifetime: 0.6,
            size: 4.0,
            glow: false,
            air_resistance: 0.0,
            heading: 0.0,
            spread: TAU,
            spin: 0.0,
        }
    }
}

impl EmitParams {
    /// Fast, short-lived streaks.
    #[must_use]
    pub fn sparks(color: Color, count: usize) -> Self {
        Self {
            count,
            color,
            shape: ParticleShape::Spark,
            speed: 420.0,
            lifetime: 0.45,
            size: 3.0,
            air_resistance: 2.5,
            ..Self::default()
        }
    }

    /// Slow glowing motes that float upward.
    #[must_use]
    pub fn embers(color: Color, count: usize) -> Self {
        Self {
            count,
            color,
            shape: ParticleShape::Ember,
            speed: 60.0,
            lifetime: 1.4,
            size: 5.0,
            glow: true,
            air_resistance: 1.2,
            spin: 6.0,
            ..Self::default()
        }
    }

    /// Tumbling block fragments.
    #[must_use]
    pub fn debris(color: Color, count: usize) -> Self {
        Self {
            count,
            color,
            shape: ParticleShape::Rectangle,
            speed: 220.0,
            lifetime: 0.8,
            size: 6.0,
            air_resistance: 0.8,
            spin: 9.0,
            ..Self::default()
        }
    }

    /// Soft expanding puff.
    #[must_use]
    pub fn smoke_puff(color: Color, count: usize) -> Self {
        Self {
            count,
            color,
            shape: ParticleShape::Circle,
            speed: 45.0,
            lifetime: 1.0,
            size: 14.0,
            glow: true,
            air_resistance: 3.0,
            ..Self::default()
        }
    }

    /// Restricts the launch cone to `spread` radians around `heading`.
    #[must_use]
    pub fn aimed(mut self, heading: f32, spread: f32) -> Self {
        self.heading = heading;
        self.spread = spread;
        self
    }
}

/// Per-tick counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParticleStats {
    /// Pool capacity.
    pub capacity: u32,
    /// Live particles after the last update.
    pub alive: u32,
    /// Particles spawned since the previous update.
    pub emitted: u32,
    /// Particles that reached zero life in the last update.
    pub died: u32,
    /// Requested particles not spawned: pool full or over the per-call limit.
    pub dropped: u32,
}

/// Particle data laid out for an instanced draw.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct ParticleInstance {
    /// Center in pixels.
    pub position: [f32; 2],
    /// Size in pixels.
    pub size: f32,
    /// Rotation in radians.
    pub rotation: f32,
    /// Faded RGBA.
    pub color: [f32; 4],
}

impl ParticleInstance {
    /// Size in bytes.
    pub const SIZE: usize = std::mem::size_of::<Self>();
}

/// Reinterprets instances as bytes for upload.
#[must_use]
pub fn instance_bytes(instances: &[ParticleInstance]) -> &[u8] {
    bytemuck::cast_slice(instances)
}

#[derive(Debug, Clone, Copy)]
struct ParticlePaints {
    solid: Paint,
    halo: Paint,
    streak: Paint,
}

impl Default for ParticlePaints {
    fn default() -> Self {
        Self {
            solid: Paint::default(),
            halo: Paint::default(),
            streak: Paint::default().with_stroke(1.0, StrokeCap::Round),
        }
    }
}

/// Fixed-capacity particle simulator.
///
/// # Thread Safety
///
/// Not synchronized. Emit, update and render from the thread that owns the
/// frame.
pub struct ParticlePool {
    particles: CompactPool<Particle>,
    rng: ChaCha8Rng,
    gravity: f32,
    max_emit_per_call: usize,
    paints: ParticlePaints,
    emitted_since_update: u32,
    dropped_since_update: u32,
    stats: ParticleStats,
}

impl ParticlePool {
    /// Creates a pool and allocates every slot.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero. [`crate::EffectsConfig::validate`] rejects
    /// that value before it gets here.
    #[must_use]
    pub fn new(capacity: usize, gravity: f32, seed: u64) -> Self {
        tracing::info!(capacity, gravity, "particle pool allocated");
        Self {
            particles: CompactPool::new(capacity),
            rng: ChaCha8Rng::seed_from_u64(seed),
            gravity,
            max_emit_per_call: capacity,
            paints: ParticlePaints::default(),
            emitted_since_update: 0,
            dropped_since_update: 0,
            stats: ParticleStats {
                capacity: capacity as u32,
                ..ParticleStats::default()
            },
        }
    }

    /// Creates a pool from config settings.
    #[must_use]
    pub fn from_settings(settings: &ParticleSettings, seed: u64) -> Self {
        let mut pool = Self::new(settings.capacity, settings.gravity, seed);
        pool.max_emit_per_call = settings.max_emit_per_call.max(1);
        pool
    }

    /// Slot count.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.particles.capacity()
    }

    /// Live particle count.
    #[must_use]
    pub fn len(&self) -> usize {
        self.particles.len()
    }

    /// True when no particle is alive.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Live particles.
    pub fn iter(&self) -> std::slice::Iter<'_, Particle> {
        self.particles.iter()
    }

    /// Counters from the last update.
    #[must_use]
    pub fn stats(&self) -> ParticleStats {
        self.stats
    }

    /// Kills every particle.
    pub fn clear(&mut self) {
        self.particles.clear();
        self.stats.alive = 0;
    }

    /// Emits square debris. Returns how many particles were actually spawned.
    pub fn emit(
        &mut self,
        origin: Vec2,
        count: usize,
        color: Color,
        speed: f32,
        lifetime: f32,
        size: f32,
    ) -> usize {
        self.emit_shaped(
            origin,
            &EmitParams {
                count,
                color,
                speed,
                lifetime,
                size,
                ..EmitParams::default()
            },
        )
    }

    /// Emits `params.count` particles at `origin`, truncated at capacity.
    ///
    /// Each particle gets a random direction inside the launch cone, 50-100%
    /// of the speed, 60-100% of the lifetime and 70-100% of the size.
    /// Returns how many particles were actually spawned.
    pub fn emit_shaped(&mut self, origin: Vec2, params: &EmitParams) -> usize {
        if params.count == 0
            || params.lifetime <= 0.0
            || !(params.size > 0.0 && params.size.is_finite())
        {
            return 0;
        }

        let wanted = params.count.min(self.max_emit_per_call);
        let spawn = wanted.min(self.particles.free_count());
        let dropped = params.count - spawn;
        if dropped > 0 {
            tracing::debug!(
                requested = params.count,
                spawned = spawn,
                live = self.particles.len(),
                "particle emit truncated"
            );
        }

        for _ in 0..spawn {
            let particle = self.spawn_one(origin, params);
            self.particles.push(particle);
        }

        self.emitted_since_update += spawn as u32;
        self.dropped_since_update += dropped as u32;
        spawn
    }

    fn spawn_one(&mut self, origin: Vec2, params: &EmitParams) -> Particle {
        let rng = &mut self.rng;
        let angle = params.heading + (rng.gen::<f32>() - 0.5) * params.spread;
        let speed = params.speed * (0.5 + 0.5 * rng.gen::<f32>());
        let life = params.lifetime * (0.6 + 0.4 * rng.gen::<f32>());
        let size = params.size * (0.7 + 0.3 * rng.gen::<f32>());
        let rotation = rng.gen::<f32>() * TAU;
        let rotation_speed = (rng.gen::<f32>() * 2.0 - 1.0) * params.spin;

        Particle {
            position: origin,
            velocity: Vec2::from_angle(angle) * speed,
            color: params.color,
            life,
            max_life: life,
            size,
            shape: params.shape,
            glow: params.glow,
            rotation,
            rotation_speed,
            air_resistance: params.air_resistance,
        }
    }

    /// Advances every live particle by `dt` seconds and compacts the dead.
    pub fn update(&mut self, dt: f32) {
        let gravity = self.gravity;
        let died = self.particles.retain_mut(|p| {
            p.life -= dt;
            if p.life <= 0.0 {
                return false;
            }
            if p.air_resistance > 0.0 {
                p.velocity *= (1.0 - p.air_resistance * dt).max(MIN_DAMPING);
            }
            p.velocity.y += gravity * p.shape.gravity_scale() * dt;
            p.position += p.velocity * dt;
            p.rotation += p.rotation_speed * dt;
            true
        });

        self.stats.alive = self.particles.len() as u32;
        self.stats.died = died as u32;
        self.stats.emitted = std::mem::take(&mut self.emitted_since_update);
        self.stats.dropped = std::mem::take(&mut self.dropped_since_update);
        tracing::trace!(
            alive = self.stats.alive,
            died = self.stats.died,
            "particles updated"
        );
    }

    /// Draws every live particle under `offset` then `scale`.
    pub fn render<C: Canvas + ?Sized>(&mut self, canvas: &mut C, scale: f32, offset: Vec2) {
        if self.particles.is_empty() {
            return;
        }
        canvas.save();
        canvas.translate(offset);
        canvas.scale(scale);
        for particle in self.particles.iter() {
            draw_particle(canvas, &mut self.paints, particle);
        }
        canvas.restore();
    }

    /// Writes live particles into `out` for an instanced draw.
    ///
    /// Returns the number written, at most `out.len()`.
    pub fn write_instances(&self, out: &mut [ParticleInstance]) -> usize {
        let mut written = 0;
        for (slot, p) in out.iter_mut().zip(self.particles.iter()) {
            *slot = ParticleInstance {
                position: p.position.to_array(),
                size: p.size,
                rotation: p.rotation,
                color: p.color.fade(p.life_fraction()).to_array(),
            };
            written += 1;
        }
        written
    }
}

fn draw_particle<C: Canvas + ?Sized>(canvas: &mut C, paints: &mut ParticlePaints, p: &Particle) {
    let fade = p.life_fraction();
    let color = p.color.fade(fade);
    if !color.is_visible(MIN_ALPHA_BYTE) {
        return;
    }

    match p.shape {
        ParticleShape::Rectangle => {
            paints.solid.shader = Shader::Solid(color);
            canvas.save();
            canvas.translate(p.position);
            canvas.rotate(p.rotation);
            canvas.fill_rounded_rect(Rect::centered_square(Vec2::ZERO, p.size), 0.0, &paints.solid);
            canvas.restore();
        }
        ParticleShape::Circle => {
            let radius = p.size * 0.5;
            if p.glow {
                paints.halo.shader = Shader::Solid(color.fade(0.35));
                paints.halo.blur = Some(radius);
                canvas.fill_circle(p.position, radius * 1.8, &paints.halo);
            }
            paints.solid.shader = Shader::Solid(color);
            canvas.fill_circle(p.position, radius, &paints.solid);
        }
        ParticleShape::Spark => {
            let speed = p.velocity.length();
            let dir = if speed > f32::EPSILON {
                p.velocity * (1.0 / speed)
            } else {
                Vec2::new(1.0, 0.0)
            };
            let length = (speed * SPARK_STRETCH).max(p.size).min(p.size * 8.0);
            paints.streak.shader = Shader::Solid(color);
            paints.streak.stroke_width = p.size * 0.5;
            canvas.line(p.position - dir * length, p.position, &paints.streak);

            paints.solid.shader = Shader::Solid(Color::HOT_WHITE.fade(fade));
            canvas.fill_circle(p.position, p.size * 0.35, &paints.solid);
        }
        ParticleShape::Ember => {
            let pulse = 0.75 + 0.25 * p.rotation.sin();
            let radius = p.size * 0.5;
            if p.glow {
                paints.halo.shader = Shader::Solid(color.fade(0.3 * pulse));
                paints.halo.blur = Some(radius * pulse);
                canvas.fill_circle(p.position, radius * 3.2 * pulse, &paints.halo);
            }
            paints.solid.shader = Shader::Solid(p.color.lerp(Color::HOT_WHITE, 0.5 * pulse).fade(fade));
            canvas.fill_circle(p.position, radius, &paints.solid);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::{DrawCommand, RecordingCanvas};

    fn pool(capacity: usize) -> ParticlePool {
        ParticlePool::new(capacity, 400.0, 7)
    }

    #[test]
    fn test_instance_layout() {
        assert_eq!(ParticleInstance::SIZE, 32);
        let instances = [ParticleInstance::default(); 3];
        assert_eq!(instance_bytes(&instances).len(), 96);
    }

    #[test]
    fn test_emit_truncates_at_capacity() {
        let mut pool = pool(10);
        assert_eq!(pool.emit(Vec2::ZERO, 6, Color::WHITE, 100.0, 1.0, 4.0), 6);
        assert_eq!(pool.emit(Vec2::ZERO, 6, Color::WHITE, 100.0, 1.0, 4.0), 4);
        assert_eq!(pool.emit(Vec2::ZERO, 6, Color::WHITE, 100.0, 1.0, 4.0), 0);
        assert_eq!(pool.len(), 10);

        pool.update(0.01);
        let stats = pool.stats();
        assert_eq!(stats.emitted, 10);
        assert_eq!(stats.dropped, 8);
        assert_eq!(stats.alive, 10);
    }

    #[test]
    fn test_degenerate_emits_are_noops() {
        let mut pool = pool(10);
        assert_eq!(pool.emit(Vec2::ZERO, 0, Color::WHITE, 100.0, 1.0, 4.0), 0);
        assert_eq!(pool.emit(Vec2::ZERO, 5, Color::WHITE, 100.0, 0.0, 4.0), 0);
        assert_eq!(pool.emit(Vec2::ZERO, 5, Color::WHITE, 100.0, -1.0, 4.0), 0);
        assert!(pool.is_empty());
    }

    #[test]
    fn test_non_positive_size_emits_nothing() {
        let mut pool = pool(10);
        for size in [-2.0, 0.0, f32::NAN] {
            let params = EmitParams {
                size,
                ..EmitParams::sparks(Color::WHITE, 4)
            };
            assert_eq!(pool.emit_shaped(Vec2::ZERO, &params), 0, "size {size}");
        }
        pool.update(0.01);

        let mut canvas = RecordingCanvas::new();
        pool.render(&mut canvas, 1.0, Vec2::ZERO);
        assert_eq!(canvas.draw_count(), 0);
    }

    #[test]
    fn test_debris_draws_rotated() {
        let mut pool = pool(10);
        pool.emit_shaped(Vec2::new(50.0, 50.0), &EmitParams::debris(Color::WHITE, 3));
        pool.update(0.05);

        let mut canvas = RecordingCanvas::new();
        pool.render(&mut canvas, 1.0, Vec2::ZERO);
        let rotations = canvas
            .commands()
            .iter()
            .filter(|c| matches!(c, DrawCommand::Rotate(_)))
            .count();
        assert_eq!(rotations, 3);
        assert!(canvas.is_balanced());
    }

    #[test]
    fn test_max_emit_per_call() {
        let settings = ParticleSettings {
            capacity: 100,
            gravity: 0.0,
            max_emit_per_call: 16,
        };
        let mut pool = ParticlePool::from_settings(&settings, 1);
        assert_eq!(pool.emit_shaped(Vec2::ZERO, &EmitParams::sparks(Color::WHITE, 40)), 16);
    }

    #[test]
    fn test_half_life_steps_kill() {
        let mut pool = pool(4);
        pool.emit(Vec2::ZERO, 1, Color::WHITE, 50.0, 0.8, 4.0);
        pool.update(0.4);
        pool.update(0.4);
        assert!(pool.is_empty());
    }

    #[test]
    fn test_one_long_step_kills() {
        let mut pool = pool(4);
        pool.emit(Vec2::ZERO, 3, Color::WHITE, 50.0, 0.8, 4.0);
        pool.update(1.6);
        assert!(pool.is_empty());
        assert_eq!(pool.stats().died, 3);
    }

    #[test]
    fn test_randomized_ranges() {
        let mut pool = pool(200);
        let params = EmitParams {
            count: 200,
            speed: 100.0,
            lifetime: 1.0,
            size: 10.0,
            ..EmitParams::default()
        };
        pool.emit_shaped(Vec2::ZERO, &params);
        for p in pool.iter() {
            assert!((0.6..=1.0).contains(&p.life));
            assert!((7.0..=10.0).contains(&p.size));
            let speed = p.velocity.length();
            assert!(speed >= 49.9 && speed <= 100.1, "speed {speed}");
        }
    }

    #[test]
    fn test_embers_rise_debris_falls() {
        let mut pool = pool(4);
        let up = EmitParams {
            speed: 0.0,
            ..EmitParams::embers(Color::WHITE, 1)
        };
        let down = EmitParams {
            speed: 0.0,
            ..EmitParams::debris(Color::WHITE, 1)
        };
        pool.emit_shaped(Vec2::ZERO, &up);
        pool.emit_shaped(Vec2::ZERO, &down);
        pool.update(0.1);

        let ember = pool.iter().find(|p| p.shape == ParticleShape::Ember).unwrap();
        let debris = pool.iter().find(|p| p.shape == ParticleShape::Rectangle).unwrap();
        assert!(ember.velocity.y < 0.0);
        assert!(debris.velocity.y > 0.0);
        assert!(ember.velocity.y.abs() < debris.velocity.y.abs());
    }

    #[test]
    fn test_air_resistance_is_floored() {
        let mut pool = ParticlePool::new(1, 0.0, 3);
        let params = EmitParams {
            speed: 100.0,
            air_resistance: 50.0,
            ..EmitParams::default()
        };
        pool.emit_shaped(Vec2::ZERO, &params);
        let before = pool.iter().next().unwrap().velocity.length();
        pool.update(0.1);
        let after = pool.iter().next().unwrap().velocity.length();
        assert!((after - before * 0.5).abs() < 1e-3);
    }

    #[test]
    fn test_same_seed_same_particles() {
        let mut a = pool(32);
        let mut b = pool(32);
        let params = EmitParams::sparks(Color::WHITE, 32);
        a.emit_shaped(Vec2::new(5.0, 5.0), &params);
        b.emit_shaped(Vec2::new(5.0, 5.0), &params);
        a.update(0.1);
        b.update(0.1);
        assert!(a.iter().eq(b.iter()));
    }

    #[test]
    fn test_render_wraps_in_transform() {
        let mut pool = pool(16);
        pool.emit_shaped(Vec2::ZERO, &EmitParams::sparks(Color::WHITE, 4));
        pool.emit_shaped(Vec2::ZERO, &EmitParams::embers(Color::WHITE, 4));
        pool.emit_shaped(Vec2::ZERO, &EmitParams::smoke_puff(Color::WHITE, 4));
        pool.emit(Vec2::ZERO, 4, Color::WHITE, 10.0, 1.0, 4.0);

        let mut canvas = RecordingCanvas::new();
        pool.render(&mut canvas, 2.0, Vec2::new(3.0, 4.0));

        let commands = canvas.commands();
        assert_eq!(commands[0], DrawCommand::Save);
        assert_eq!(commands[1], DrawCommand::Translate(Vec2::new(3.0, 4.0)));
        assert_eq!(commands[2], DrawCommand::Scale(2.0));
        assert_eq!(commands[commands.len() - 1], DrawCommand::Restore);
        assert!(canvas.is_balanced());

        let lines = commands.iter().filter(|c| matches!(c, DrawCommand::Line { .. })).count();
        let rects = commands.iter().filter(|c| matches!(c, DrawCommand::RoundedRect { .. })).count();
        assert_eq!(lines, 4);
        assert_eq!(rects, 4);
        // sparks: line + tip, embers: halo + core, smoke: halo + disc, debris: rect
        assert_eq!(canvas.draw_count(), 4 * 2 + 4 * 2 + 4 * 2 + 4);
    }

    #[test]
    fn test_empty_pool_renders_nothing() {
        let mut pool = pool(4);
        let mut canvas = RecordingCanvas::new();
        pool.render(&mut canvas, 1.0, Vec2::ZERO);
        assert!(canvas.commands().is_empty());
    }

    #[test]
    fn test_write_instances_fades_alpha() {
        let mut pool = pool(8);
        pool.emit(Vec2::new(1.0, 2.0), 8, Color::WHITE, 0.0, 1.0, 4.0);
        pool.update(0.3);

        let mut out = [ParticleInstance::default(); 4];
        assert_eq!(pool.write_instances(&mut out), 4);
        for (inst, p) in out.iter().zip(pool.iter()) {
            assert!((inst.color[3] - p.life_fraction()).abs() < 1e-6);
            assert!(inst.color[3] < 1.0);
        }
    }
}
