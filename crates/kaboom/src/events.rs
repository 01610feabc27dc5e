//! # Effect Events
//!
//! Gameplay reports what happened; this module decides what it looks like.
//!
//! ## Event Flow
//!
//! ```text
//! Bombs     ──► BombExploded      ──┐
//! Grid      ──► BlockDestroyed    ──┤
//! Pickups   ──► PowerUpCollected  ──┼──► EffectEventQueue ──► EffectsRenderer
//! Players   ──► PlayerKilled      ──┤                            │
//! Enemies   ──► EnemyKilled       ──┘                            ▼
//!                                                  particles, shake, explosions
//! ```
//!
//! The game computes arm lengths and positions from its own grid; nothing
//! here knows about walls or bombs.

use std::collections::VecDeque;

use kaboom_core::{Color, Vec2};
use kaboom_effects::{EmitParams, Palette};

/// Maximum events queued between two frames.
pub const MAX_EVENTS_PER_FRAME: usize = 64;

/// Smoke color used by several presets.
const SMOKE: Color = Color::rgba(0.35, 0.33, 0.32, 0.6);

/// Something visible happened in the game.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EffectEvent {
    /// A bomb went off.
    BombExploded {
        /// Blast center in pixels.
        center: Vec2,
        /// Arm lengths in cells, indexed by [`kaboom_core::GridDir::index`].
        arms: [u32; 4],
    },
    /// A destructible block was cleared.
    BlockDestroyed {
        /// Block center in pixels.
        position: Vec2,
        /// Block color, used for debris.
        color: Color,
    },
    /// A player picked up a power-up.
    PowerUpCollected {
        /// Pickup position in pixels.
        position: Vec2,
        /// Power-up color.
        color: Color,
    },
    /// A player died.
    PlayerKilled {
        /// Player position in pixels.
        position: Vec2,
        /// Player color.
        color: Color,
    },
    /// An enemy died.
    EnemyKilled {
        /// Enemy position in pixels.
        position: Vec2,
        /// Enemy color.
        color: Color,
    },
}

/// Shake to trigger for an event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShakeRequest {
    /// Peak offset in pixels.
    pub intensity: f32,
    /// Seconds until the shake is gone.
    pub duration: f32,
}

/// Particle bursts and shake for one event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EffectPreset {
    /// Up to three particle bursts.
    pub emits: [Option<EmitParams>; 3],
    /// Optional screen shake.
    pub shake: Option<ShakeRequest>,
}

impl EffectEvent {
    /// Where the effect is centered.
    #[must_use]
    pub const fn position(&self) -> Vec2 {
        match *self {
            Self::BombExploded { center, .. } => center,
            Self::BlockDestroyed { position, .. }
            | Self::PowerUpCollected { position, .. }
            | Self::PlayerKilled { position, .. }
            | Self::EnemyKilled { position, .. } => position,
        }
    }

    /// Particles and shake for this event in the given palette.
    #[must_use]
    pub fn preset(&self, palette: &Palette) -> EffectPreset {
        match *self {
            Self::BombExploded { arms, .. } => {
                let reach = arms.iter().copied().max().unwrap_or(0) as f32;
                EffectPreset {
                    emits: [
                        Some(EmitParams::sparks(palette.inner, 24)),
                        Some(EmitParams::embers(palette.core, 12)),
                        Some(EmitParams::smoke_puff(SMOKE, 6)),
                    ],
                    shake: Some(ShakeRequest {
                        intensity: 6.0 + 2.0 * reach,
                        duration: 0.35,
                    }),
                }
            }
            Self::BlockDestroyed { color, .. } => EffectPreset {
                emits: [
                    Some(EmitParams::debris(color, 14)),
                    Some(EmitParams::smoke_puff(SMOKE, 3)),
                    None,
                ],
                shake: None,
            },
            Self::PowerUpCollected { color, .. } => EffectPreset {
                emits: [
                    Some(EmitParams {
                        speed: 180.0,
                        ..EmitParams::sparks(color, 16)
                    }),
                    // Straight up
                    Some(EmitParams::embers(color, 6).aimed(-std::f32::consts::FRAC_PI_2, 1.2)),
                    None,
                ],
                shake: None,
            },
            Self::PlayerKilled { color, .. } => EffectPreset {
                emits: [
                    Some(EmitParams::debris(color, 20)),
                    Some(EmitParams::sparks(Color::HOT_WHITE, 20)),
                    Some(EmitParams::smoke_puff(SMOKE, 4)),
                ],
                shake: Some(ShakeRequest {
                    intensity: 10.0,
                    duration: 0.5,
                }),
            },
            Self::EnemyKilled { color, .. } => EffectPreset {
                emits: [
                    Some(EmitParams::debris(color, 12)),
                    Some(EmitParams::embers(palette.inner, 6)),
                    None,
                ],
                shake: Some(ShakeRequest {
                    intensity: 4.0,
                    duration: 0.2,
                }),
            },
        }
    }
}

/// Statistics from the event queue.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EventQueueStats {
    /// Events accepted since the last reset.
    pub received: u32,
    /// Events handed out since the last reset.
    pub processed: u32,
    /// Events rejected because the queue was full.
    pub dropped: u32,
}

/// Bounded FIFO of effect events, drained once per frame.
#[derive(Debug)]
pub struct EffectEventQueue {
    events: VecDeque<EffectEvent>,
    stats: EventQueueStats,
}

impl EffectEventQueue {
    /// Creates an empty queue with all storage allocated.
    #[must_use]
    pub fn new() -> Self {
        Self {
            events: VecDeque::with_capacity(MAX_EVENTS_PER_FRAME),
            stats: EventQueueStats::default(),
        }
    }

    /// Queues an event.
    ///
    /// Returns false if the queue is full (event dropped).
    pub fn push(&mut self, event: EffectEvent) -> bool {
        if self.events.len() >= MAX_EVENTS_PER_FRAME {
            self.stats.dropped += 1;
            tracing::debug!(?event, "effect event dropped, queue full");
            return false;
        }
        self.events.push_back(event);
        self.stats.received += 1;
        true
    }

    /// Removes and returns the oldest event.
    pub fn pop(&mut self) -> Option<EffectEvent> {
        let event = self.events.pop_front()?;
        self.stats.processed += 1;
        Some(event)
    }

    /// Drains all events for processing.
    pub fn drain(&mut self) -> impl Iterator<Item = EffectEvent> + '_ {
        self.stats.processed += self.events.len() as u32;
        self.events.drain(..)
    }

    /// Number of pending events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// True if nothing is pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Returns statistics.
    #[must_use]
    pub fn stats(&self) -> EventQueueStats {
        self.stats
    }

    /// Resets statistics for a new frame.
    pub fn reset_stats(&mut self) {
        self.stats = EventQueueStats::default();
    }
}

impl Default for EffectEventQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block() -> EffectEvent {
        EffectEvent::BlockDestroyed {
            position: Vec2::new(10.0, 20.0),
            color: Color::rgb(0.5, 0.4, 0.3),
        }
    }

    #[test]
    fn test_event_queue() {
        let mut queue = EffectEventQueue::new();
        queue.push(block());
        queue.push(EffectEvent::BombExploded {
            center: Vec2::ZERO,
            arms: [1, 1, 1, 1],
        });
        assert_eq!(queue.len(), 2);

        let events: Vec<_> = queue.drain().collect();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0], block());
        assert!(queue.is_empty());
        assert_eq!(queue.stats().processed, 2);
    }

    #[test]
    fn test_queue_overflow_drops() {
        let mut queue = EffectEventQueue::new();
        for _ in 0..MAX_EVENTS_PER_FRAME {
            assert!(queue.push(block()));
        }
        assert!(!queue.push(block()));
        assert_eq!(queue.stats().dropped, 1);
        assert_eq!(queue.stats().received, MAX_EVENTS_PER_FRAME as u32);

        queue.reset_stats();
        assert_eq!(queue.stats(), EventQueueStats::default());
    }

    #[test]
    fn test_position() {
        assert_eq!(block().position(), Vec2::new(10.0, 20.0));
        let bomb = EffectEvent::BombExploded {
            center: Vec2::new(1.0, 2.0),
            arms: [0; 4],
        };
        assert_eq!(bomb.position(), Vec2::new(1.0, 2.0));
    }

    #[test]
    fn test_bigger_bombs_shake_harder() {
        let palette = Palette::CLASSIC;
        let small = EffectEvent::BombExploded {
            center: Vec2::ZERO,
            arms: [1, 1, 1, 1],
        }
        .preset(&palette);
        let big = EffectEvent::BombExploded {
            center: Vec2::ZERO,
            arms: [1, 5, 2, 1],
        }
        .preset(&palette);

        let (s, b) = (small.shake.unwrap(), big.shake.unwrap());
        assert!(b.intensity > s.intensity);
    }

    #[test]
    fn test_pickups_do_not_shake() {
        let preset = EffectEvent::PowerUpCollected {
            position: Vec2::ZERO,
            color: Color::WHITE,
        }
        .preset(&Palette::NEON);
        assert!(preset.shake.is_none());
        assert!(preset.emits.iter().flatten().count() >= 1);
    }
}
