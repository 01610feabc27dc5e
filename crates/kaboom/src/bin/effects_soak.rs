//! # Effects Soak Test
//!
//! Drives the renderer through a scripted arcade round against a recording
//! canvas and checks every frame against the 60 Hz budget.
//!
//! ```text
//! effects_soak [config.toml] [frames]
//! ```
//!
//! Exits 1 if the config is invalid, a transform leaks, or more than 1% of
//! frames run over budget.

use std::process;

use kaboom::{
    core::{Color, Vec2},
    effects::{EffectsConfig, RecordingCanvas},
    EffectEvent, EffectsRenderer, FrameResult, FRAME_BUDGET_US,
};

const DEFAULT_FRAMES: u32 = 3_600;
const WARMUP_FRAMES: u32 = 60;
const CELL_SIZE: f32 = 48.0;
const GRID: u32 = 13;

/// Events scripted for a frame, cycling through a small arena.
fn scripted_events(frame: u32, out: &mut Vec<EffectEvent>) {
    let cell = |x: u32, y: u32| {
        Vec2::new(
            (x % GRID) as f32 * CELL_SIZE + CELL_SIZE * 0.5,
            (y % GRID) as f32 * CELL_SIZE + CELL_SIZE * 0.5,
        )
    };

    if frame % 20 == 0 {
        let reach = 1 + frame / 20 % 5;
        out.push(EffectEvent::BombExploded {
            center: cell(frame / 7, frame / 11),
            arms: [reach, reach.saturating_sub(1), reach, 1 + reach % 3],
        });
        for i in 0..reach {
            out.push(EffectEvent::BlockDestroyed {
                position: cell(frame / 7 + i + 1, frame / 11),
                color: Color::hex(0x8B5A_2BFF),
            });
        }
    }
    if frame % 45 == 0 {
        out.push(EffectEvent::PowerUpCollected {
            position: cell(frame / 3, frame / 5),
            color: Color::hex(0x3FC5_FFFF),
        });
    }
    if frame % 90 == 30 {
        out.push(EffectEvent::EnemyKilled {
            position: cell(frame / 13, frame / 2),
            color: Color::hex(0xE040_40FF),
        });
    }
    if frame % 600 == 300 {
        out.push(EffectEvent::PlayerKilled {
            position: cell(6, 6),
            color: Color::WHITE,
        });
    }
}

fn load_config(path: Option<&str>) -> EffectsConfig {
    let Some(path) = path else {
        return EffectsConfig::default();
    };
    match EffectsConfig::load(path) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("failed to load {path}: {err}");
            process::exit(1);
        }
    }
}

fn main() {
    let args: Vec<String> = std::env::args().collect();
    let config = load_config(args.get(1).map(String::as_str));
    let frames = args
        .get(2)
        .and_then(|arg| arg.parse::<u32>().ok())
        .unwrap_or(DEFAULT_FRAMES);

    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║                   KABOOM EFFECTS SOAK TEST                   ║");
    println!("╠══════════════════════════════════════════════════════════════╣");
    println!("║  Frames:        {frames:<45}║");
    println!("║  Seed:          {:<45}║", config.seed);
    println!("║  Theme:         {:<45}║", format!("{:?}", config.theme));
    println!("║  Particles:     {:<45}║", config.particles.capacity);
    println!("║  Budget:        {:<45}║", format!("{FRAME_BUDGET_US}us"));
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!();

    let mut renderer = match EffectsRenderer::new(config, CELL_SIZE) {
        Ok(renderer) => renderer,
        Err(err) => {
            eprintln!("invalid config: {err}");
            process::exit(1);
        }
    };
    let mut canvas = RecordingCanvas::new();
    let mut events = Vec::with_capacity(16);
    let dt = 1.0 / 60.0;

    // Warm up
    println!("Warming up ({WARMUP_FRAMES} frames)...");
    for frame in 0..WARMUP_FRAMES {
        events.clear();
        scripted_events(frame, &mut events);
        for event in &events {
            renderer.push_event(*event);
        }
        canvas.begin_frame();
        renderer.frame(&mut canvas, dt, 1.0, Vec2::ZERO);
    }
    renderer.clear();
    renderer.reset_stats();

    println!("Running {frames} frames...");
    println!();

    let mut results: Vec<FrameResult> = Vec::with_capacity(frames as usize);
    let mut unbalanced = 0u32;
    let mut peak_particles = 0u32;
    let mut peak_explosions = 0u32;
    let mut peak_draws = 0usize;
    let mut particles_lost = 0u64;

    for frame in 0..frames {
        events.clear();
        scripted_events(frame, &mut events);
        for event in &events {
            renderer.push_event(*event);
        }

        canvas.begin_frame();
        let result = renderer.frame(&mut canvas, dt, 1.0, Vec2::new(16.0, 16.0));
        if !canvas.is_balanced() {
            unbalanced += 1;
        }
        peak_particles = peak_particles.max(result.particles_alive);
        peak_explosions = peak_explosions.max(result.explosions_active);
        peak_draws = peak_draws.max(canvas.draw_count());
        particles_lost += u64::from(renderer.particles().stats().dropped);
        results.push(result);

        if (frame + 1) % 600 == 0 {
            println!(
                "  frame {:>6}: {:>4} particles, {:>2} explosions, {:>5}us",
                frame + 1,
                result.particles_alive,
                result.explosions_active,
                result.frame_time_us
            );
        }
    }

    let mut times: Vec<u64> = results.iter().map(|r| r.frame_time_us).collect();
    times.sort_unstable();
    let count = times.len().max(1);
    let avg = times.iter().sum::<u64>() / count as u64;
    let p99 = times.get(count * 99 / 100).copied().unwrap_or(0);
    let worst = times.last().copied().unwrap_or(0);
    let over_budget = results.iter().filter(|r| r.over_budget).count();
    let stats = renderer.stats();

    println!();
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║                           RESULTS                            ║");
    println!("╠══════════════════════════════════════════════════════════════╣");
    println!("║  Frame Time:                                                 ║");
    println!("║    Average:     {:<45}║", format!("{avg}us"));
    println!("║    P99:         {:<45}║", format!("{p99}us"));
    println!("║    Worst:       {:<45}║", format!("{worst}us"));
    println!("║    Over budget: {:<45}║", format!("{over_budget} / {frames}"));
    println!("║                                                              ║");
    println!("║  Load:                                                       ║");
    println!("║    Peak particles:  {peak_particles:<41}║");
    println!("║    Peak explosions: {peak_explosions:<41}║");
    println!("║    Peak draw calls: {peak_draws:<41}║");
    println!("║    Explosions:      {:<41}║", stats.explosions_started);
    println!("║    Dropped:         {:<41}║", stats.explosions_dropped);
    println!("║    Particles lost:  {particles_lost:<41}║");
    println!("║    Unbalanced:      {unbalanced:<41}║");
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!();

    let budget_ok = over_budget * 100 <= results.len();
    if budget_ok && unbalanced == 0 {
        println!("✅ SOAK PASSED");
        process::exit(0);
    }

    if !budget_ok {
        println!("❌ SOAK FAILED: {over_budget} frames over {FRAME_BUDGET_US}us");
    }
    if unbalanced > 0 {
        println!("❌ SOAK FAILED: {unbalanced} frames left the canvas transform unbalanced");
    }
    process::exit(1);
}
