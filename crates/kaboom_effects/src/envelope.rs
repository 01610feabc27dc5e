//! # Effect Envelope
//!
//! Attack, sustain, decay: every layer of an effect multiplies its alpha by
//! the same envelope value, so the layers of one explosion flare up, hold and
//! fade in lockstep.
//!
//! ```text
//! 1.0 |   ____________
//!     |  /            \
//!     | /              \
//! 0.0 |/________________\__
//!     0  0.08        0.5   1.0   progress
//! ```

/// Progress at which the attack ramp reaches full intensity.
pub const ATTACK_END: f32 = 0.08;

/// Progress at which the linear decay starts.
pub const DECAY_START: f32 = 0.5;

/// Envelope value for `progress` in [0, 1], scaled by `amplitude`.
///
/// Never negative for a non-negative amplitude. Progress past 1 stays at 0.
#[inline]
#[must_use]
pub fn calculate_envelope(progress: f32, amplitude: f32) -> f32 {
    let shape = if progress < ATTACK_END {
        progress / ATTACK_END
    } else if progress < DECAY_START {
        1.0
    } else {
        1.0 - (progress - DECAY_START) / (1.0 - DECAY_START)
    };
    shape.max(0.0) * amplitude
}

/// Normalized progress of an effect, clamped to [0, 1].
///
/// A non-positive duration counts as already finished.
#[inline]
#[must_use]
pub fn progress(elapsed: f32, duration: f32) -> f32 {
    if duration <= 0.0 {
        return 1.0;
    }
    (elapsed / duration).clamp(0.0, 1.0)
}

/// Elapsed-time tracker for one effect instance.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EffectClock {
    elapsed: f32,
    duration: f32,
}

impl EffectClock {
    /// Starts a clock for an effect lasting `duration` seconds.
    #[must_use]
    pub const fn new(duration: f32) -> Self {
        Self {
            elapsed: 0.0,
            duration,
        }
    }

    /// Advances the clock by `dt` seconds.
    pub fn advance(&mut self, dt: f32) {
        self.elapsed += dt;
    }

    /// Seconds since start.
    #[must_use]
    pub const fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Total lifetime in seconds.
    #[must_use]
    pub const fn duration(&self) -> f32 {
        self.duration
    }

    /// Clamped progress in [0, 1].
    #[must_use]
    pub fn progress(&self) -> f32 {
        progress(self.elapsed, self.duration)
    }

    /// True once the full duration has elapsed.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.elapsed >= self.duration
    }

    /// [`calculate_envelope`] at the current progress.
    #[must_use]
    pub fn envelope(&self, amplitude: f32) -> f32 {
        calculate_envelope(self.progress(), amplitude)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_key_points() {
        assert_eq!(calculate_envelope(0.0, 1.0), 0.0);
        assert!((calculate_envelope(0.08, 1.0) - 1.0).abs() < 1e-6);
        assert_eq!(calculate_envelope(0.3, 1.0), 1.0);
        assert_eq!(calculate_envelope(1.0, 1.0), 0.0);
        assert!((calculate_envelope(0.04, 1.0) - 0.5).abs() < 1e-6);
        assert!((calculate_envelope(0.75, 1.0) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_envelope_phases() {
        let samples: Vec<f32> = (0..=1000).map(|i| i as f32 / 1000.0).collect();
        for pair in samples.windows(2) {
            let (p0, p1) = (pair[0], pair[1]);
            let (e0, e1) = (calculate_envelope(p0, 1.0), calculate_envelope(p1, 1.0));
            if p1 <= ATTACK_END {
                assert!(e1 >= e0, "attack must not decrease at {p1}");
            } else if p0 >= ATTACK_END && p1 < DECAY_START {
                assert_eq!(e0, e1, "sustain must be flat at {p1}");
            } else if p0 >= DECAY_START {
                assert!(e1 <= e0, "decay must not increase at {p1}");
            }
        }
    }

    #[test]
    fn test_envelope_zero_amplitude_and_clamping() {
        for i in 0..=20 {
            let p = i as f32 / 20.0;
            assert_eq!(calculate_envelope(p, 0.0), 0.0);
        }
        assert_eq!(calculate_envelope(-0.5, 1.0), 0.0);
        assert_eq!(calculate_envelope(1.5, 1.0), 0.0);
        assert_eq!(calculate_envelope(0.3, 0.4), 0.4);
    }

    #[test]
    fn test_progress_clamps() {
        assert_eq!(progress(0.5, 1.0), 0.5);
        assert_eq!(progress(2.0, 1.0), 1.0);
        assert_eq!(progress(-1.0, 1.0), 0.0);
        assert_eq!(progress(0.0, 0.0), 1.0);
    }

    #[test]
    fn test_clock_runs_to_completion() {
        let mut clock = EffectClock::new(0.8);
        assert_eq!(clock.envelope(1.0), 0.0);
        clock.advance(0.2);
        assert!(!clock.is_finished());
        assert_eq!(clock.envelope(1.0), 1.0);
        clock.advance(0.7);
        assert!(clock.is_finished());
        assert_eq!(clock.progress(), 1.0);
        assert_eq!(clock.envelope(1.0), 0.0);
    }
}
