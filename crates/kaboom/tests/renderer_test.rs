//! # Renderer Integration Tests
//!
//! Runs the full event → update → render loop through the public API.

use kaboom::{
    core::{Color, Vec2},
    effects::{DrawCommand, EffectsConfig, Palette, RecordingCanvas, Theme},
    EffectEvent, EffectsRenderer, EXPLOSION_DURATION,
};

const DT: f32 = 1.0 / 60.0;

fn bomb_at(x: f32, y: f32) -> EffectEvent {
    EffectEvent::BombExploded {
        center: Vec2::new(x, y),
        arms: [3, 2, 3, 1],
    }
}

/// Test: two renderers with the same seed draw the same frames.
#[test]
fn test_same_seed_same_frames() {
    let config = EffectsConfig {
        seed: 1234,
        ..EffectsConfig::default()
    };
    let mut a = EffectsRenderer::new(config.clone(), 48.0).unwrap();
    let mut b = EffectsRenderer::new(config, 48.0).unwrap();
    let mut canvas_a = RecordingCanvas::new();
    let mut canvas_b = RecordingCanvas::new();

    for frame in 0..40 {
        if frame % 10 == 0 {
            a.push_event(bomb_at(200.0, 200.0));
            b.push_event(bomb_at(200.0, 200.0));
        }
        canvas_a.begin_frame();
        canvas_b.begin_frame();
        a.frame(&mut canvas_a, DT, 1.0, Vec2::ZERO);
        b.frame(&mut canvas_b, DT, 1.0, Vec2::ZERO);
        assert_eq!(canvas_a.commands(), canvas_b.commands(), "diverged at frame {frame}");
    }
}

/// Test: a busy round never leaks transforms or exceeds pool limits.
#[test]
fn test_busy_round_stays_bounded() {
    let config = EffectsConfig::default();
    let capacity = config.particles.capacity;
    let max_active = config.explosion.max_active;
    let mut fx = EffectsRenderer::new(config, 48.0).unwrap();
    let mut canvas = RecordingCanvas::new();

    for frame in 0..600u32 {
        let x = (frame % 13) as f32 * 48.0;
        fx.push_event(bomb_at(x, 240.0));
        fx.push_event(EffectEvent::BlockDestroyed {
            position: Vec2::new(x + 48.0, 240.0),
            color: Color::rgb(0.55, 0.35, 0.2),
        });

        canvas.begin_frame();
        let result = fx.frame(&mut canvas, DT, 1.5, Vec2::new(8.0, 8.0));
        assert!(canvas.is_balanced(), "unbalanced at frame {frame}");
        assert!(result.particles_alive as usize <= capacity);
        assert!(result.explosions_active as usize <= max_active);
    }

    let stats = fx.stats();
    println!("stats: {stats:?}");
    assert_eq!(stats.total_frames, 600);
    assert!(stats.explosions_dropped > 0);
}

/// Test: after the last event everything settles to an idle frame.
#[test]
fn test_settles_to_idle() {
    let mut fx = EffectsRenderer::new(EffectsConfig::default(), 48.0).unwrap();
    let mut canvas = RecordingCanvas::new();
    fx.push_event(bomb_at(100.0, 100.0));
    fx.push_event(EffectEvent::PlayerKilled {
        position: Vec2::new(100.0, 100.0),
        color: Color::WHITE,
    });

    let settle_frames = ((EXPLOSION_DURATION + 3.0) / DT) as u32;
    for _ in 0..settle_frames {
        canvas.begin_frame();
        fx.frame(&mut canvas, DT, 1.0, Vec2::ZERO);
    }

    canvas.begin_frame();
    let result = fx.frame(&mut canvas, DT, 1.0, Vec2::ZERO);
    assert_eq!(result.explosions_active, 0);
    assert_eq!(result.particles_alive, 0);
    assert_eq!(canvas.draw_count(), 0);
    assert_eq!(fx.shake().offset(), Vec2::ZERO);
}

/// Test: shake moves the explosion but disabling it pins it in place.
#[test]
fn test_shake_offsets_drawing() {
    let mut fx = EffectsRenderer::new(EffectsConfig::default(), 48.0).unwrap();
    let mut canvas = RecordingCanvas::new();
    fx.handle_event(&bomb_at(240.0, 240.0));
    fx.update(DT);
    assert!(fx.shake().offset() != Vec2::ZERO);

    fx.render(&mut canvas, 1.0, Vec2::ZERO);
    assert_eq!(first_translate(&canvas), fx.shake().offset());

    fx.shake_mut().set_enabled(false);
    canvas.begin_frame();
    fx.render(&mut canvas, 1.0, Vec2::ZERO);
    assert_eq!(first_translate(&canvas), Vec2::ZERO);
}

fn first_translate(canvas: &RecordingCanvas) -> Vec2 {
    canvas
        .commands()
        .iter()
        .find_map(|c| match c {
            DrawCommand::Translate(offset) => Some(*offset),
            _ => None,
        })
        .unwrap()
}

/// Test: a theme change recolors new explosions but not ones in flight.
#[test]
fn test_theme_change_spares_explosions_in_flight() {
    let config = EffectsConfig {
        theme: Theme::Toxic,
        ..EffectsConfig::default()
    };
    let mut fx = EffectsRenderer::new(config, 48.0).unwrap();
    let mut canvas = RecordingCanvas::new();
    fx.push_event(bomb_at(100.0, 100.0));
    fx.frame(&mut canvas, DT, 1.0, Vec2::ZERO);

    fx.set_theme(Theme::Neon);
    fx.push_event(bomb_at(300.0, 100.0));
    fx.frame(&mut canvas, DT, 1.0, Vec2::ZERO);

    assert_eq!(*fx.palette(), Theme::Neon.palette());
    let palettes: Vec<Palette> = fx.explosions().map(|e| e.palette).collect();
    assert_eq!(palettes, [Theme::Toxic.palette(), Theme::Neon.palette()]);
}
