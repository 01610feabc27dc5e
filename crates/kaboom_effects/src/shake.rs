//! # Screen Shake
//!
//! Decaying random camera offset driven by trigger events.
//!
//! The magnitude follows `intensity * (timer / duration)^2` and the direction
//! is re-rolled every tick. A new trigger only takes over when nothing is
//! shaking or when it is stronger than what is left of the current shake, so
//! a small hit never cuts a big blast short.

use std::f32::consts::TAU;

use kaboom_core::Vec2;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::config::ShakeSettings;

/// Stateful screen shake generator.
///
/// Not thread-safe; update it from the frame loop.
#[derive(Debug, Clone)]
pub struct ScreenShake {
    intensity: f32,
    duration: f32,
    timer: f32,
    offset: Vec2,
    enabled: bool,
    max_intensity: f32,
    rng: ChaCha8Rng,
}

impl ScreenShake {
    /// Creates an idle, enabled shake with no intensity cap.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            intensity: 0.0,
            duration: 0.0,
            timer: 0.0,
            offset: Vec2::ZERO,
            enabled: true,
            max_intensity: f32::INFINITY,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Creates a shake from config settings.
    #[must_use]
    pub fn from_settings(settings: &ShakeSettings, seed: u64) -> Self {
        Self {
            enabled: settings.enabled,
            max_intensity: settings.max_intensity,
            ..Self::new(seed)
        }
    }

    /// Turns the generator on or off. Turning it off also stops any shake in
    /// progress.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.reset();
        }
    }

    /// Whether triggers are honored.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Requests a shake of `intensity` pixels lasting `duration` seconds.
    ///
    /// Returns true if the request replaced the current state. Ignored when
    /// disabled, for non-positive input, or when a stronger shake is still
    /// running.
    pub fn trigger(&mut self, intensity: f32, duration: f32) -> bool {
        if !self.enabled || intensity <= 0.0 || duration <= 0.0 {
            return false;
        }

        let intensity = intensity.min(self.max_intensity);
        let remaining = self.current_intensity();
        if self.duration > 0.0 && intensity <= remaining {
            tracing::debug!(intensity, remaining, "shake trigger rejected");
            return false;
        }

        self.intensity = intensity;
        self.duration = duration;
        self.timer = duration;
        tracing::debug!(intensity, duration, "shake started");
        true
    }

    /// Advances the shake by `dt` seconds and rolls a new offset.
    pub fn update(&mut self, dt: f32) {
        if self.duration <= 0.0 {
            return;
        }

        self.timer -= dt;
        if self.timer <= 0.0 {
            self.reset();
            return;
        }

        let magnitude = self.current_intensity();
        let angle = self.rng.gen::<f32>() * TAU;
        self.offset = Vec2::from_angle(angle) * magnitude;
    }

    /// Stops shaking immediately.
    pub fn reset(&mut self) {
        self.intensity = 0.0;
        self.duration = 0.0;
        self.timer = 0.0;
        self.offset = Vec2::ZERO;
    }

    /// Intensity after decay, zero when idle.
    #[must_use]
    pub fn current_intensity(&self) -> f32 {
        if self.duration <= 0.0 {
            return 0.0;
        }
        let ratio = (self.timer / self.duration).clamp(0.0, 1.0);
        self.intensity * ratio * ratio
    }

    /// True while a shake is running.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.duration > 0.0
    }

    /// Horizontal camera offset in pixels.
    #[must_use]
    pub fn offset_x(&self) -> f32 {
        self.offset.x
    }

    /// Vertical camera offset in pixels.
    #[must_use]
    pub fn offset_y(&self) -> f32 {
        self.offset.y
    }

    /// Camera offset in pixels.
    #[must_use]
    pub fn offset(&self) -> Vec2 {
        self.offset
    }

    /// Seconds left in the current shake.
    #[must_use]
    pub fn remaining(&self) -> f32 {
        self.timer.max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weaker_trigger_does_not_interrupt() {
        let mut shake = ScreenShake::new(1);
        assert!(shake.trigger(5.0, 1.0));
        assert!(!shake.trigger(2.0, 1.0));
        assert_eq!(shake.current_intensity(), 5.0);
        assert_eq!(shake.remaining(), 1.0);
    }

    #[test]
    fn test_stronger_trigger_takes_over() {
        let mut shake = ScreenShake::new(1);
        assert!(shake.trigger(2.0, 1.0));
        assert!(shake.trigger(10.0, 1.0));
        assert_eq!(shake.current_intensity(), 10.0);
    }

    #[test]
    fn test_trigger_compares_against_decayed_intensity() {
        let mut shake = ScreenShake::new(1);
        shake.trigger(8.0, 1.0);
        shake.update(0.5);
        // 8 * 0.5^2 = 2 left
        assert!((shake.current_intensity() - 2.0).abs() < 1e-5);
        assert!(shake.trigger(3.0, 0.5));
    }

    #[test]
    fn test_offset_decays_quadratically() {
        let mut shake = ScreenShake::new(9);
        shake.trigger(10.0, 1.0);
        shake.update(0.25);
        assert!((shake.offset().length() - 10.0 * 0.75 * 0.75).abs() < 1e-4);
        shake.update(0.25);
        assert!((shake.offset().length() - 10.0 * 0.5 * 0.5).abs() < 1e-4);
    }

    #[test]
    fn test_full_duration_ends_at_zero() {
        let mut shake = ScreenShake::new(3);
        shake.trigger(7.0, 0.4);
        shake.update(0.4);
        assert!(!shake.is_active());
        assert_eq!(shake.offset_x(), 0.0);
        assert_eq!(shake.offset_y(), 0.0);
    }

    #[test]
    fn test_reset_and_disable() {
        let mut shake = ScreenShake::new(3);
        shake.trigger(7.0, 1.0);
        shake.update(0.1);
        shake.reset();
        assert!(!shake.is_active());
        assert_eq!(shake.offset(), Vec2::ZERO);

        shake.set_enabled(false);
        assert!(!shake.trigger(7.0, 1.0));
        assert!(!shake.is_active());
        shake.set_enabled(true);
        assert!(shake.trigger(7.0, 1.0));
    }

    #[test]
    fn test_intensity_cap_and_bad_input() {
        let settings = ShakeSettings {
            enabled: true,
            max_intensity: 6.0,
        };
        let mut shake = ScreenShake::from_settings(&settings, 0);
        assert!(!shake.trigger(0.0, 1.0));
        assert!(!shake.trigger(5.0, 0.0));
        assert!(shake.trigger(50.0, 1.0));
        assert_eq!(shake.current_intensity(), 6.0);
    }

    #[test]
    fn test_direction_rerolled_each_tick() {
        let mut shake = ScreenShake::new(11);
        shake.trigger(10.0, 10.0);
        shake.update(0.01);
        let first = shake.offset().normalized();
        shake.update(0.01);
        let second = shake.offset().normalized();
        assert_ne!(first, second);
    }
}
