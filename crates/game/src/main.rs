//! StarFaux - space-flight simulation core, run headless with a scripted pilot.

mod asteroid;
mod config;
mod craft;
mod entity;
mod flight;
mod pilot;
mod render;
mod spawner;
mod world;

use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use engine_core::Time;
use input::InputState;

use config::GameConfig;
use pilot::DemoPilot;
use render::StatsSink;
use world::World;

/// Why the run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    TimeUp,
    CraftDestroyed,
    Quit,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("Starting StarFaux (headless)");

    let path = config::config_path();
    let config = GameConfig::load();
    config
        .validate()
        .with_context(|| format!("invalid configuration in {}", path.display()))?;
    if !path.exists() {
        log::info!("No config at {:?}, writing defaults", path);
        config.save();
    }
    log::info!(
        "Config: {} Hz physics, {:.0}s run at {:.0} fps, seed {:?}",
        config.physics_hz,
        config.demo.duration,
        config.demo.frame_rate,
        config.seed
    );

    let mut world = World::new(&config);
    let outcome = run(&mut world, &config)?;

    let craft = world.craft();
    log::info!(
        "Run over ({:?}) after {} physics steps: craft at {:.1} (camera {:.1}), speed {:.1}, health {:.0}, {} hits",
        outcome,
        world.total_steps(),
        craft.position(),
        world.camera().position(),
        craft.flight.linear_speed(),
        craft.health.current,
        craft.hits(),
    );
    log::info!(
        "{} asteroids spawned ({} suppressed), {} active, {} physics bodies",
        world.spawner().spawned(),
        world.spawner().suppressed(),
        world.asteroids().active_count(),
        world.physics().body_count(),
    );
    Ok(())
}

/// Frame loop: scripted input, world update, render, frame-rate cap.
fn run(world: &mut World, config: &GameConfig) -> Result<Outcome> {
    let max_frame = Duration::try_from_secs_f32(config.max_frame_time)
        .context("max_frame_time does not fit a frame duration")?;
    let frame_budget = Duration::try_from_secs_f32(1.0 / config.demo.frame_rate)
        .context("demo.frame_rate does not give a frame duration")?;
    let mut time = Time::new();
    let mut input = InputState::new();
    let mut pilot = DemoPilot::scripted();
    let mut sink = StatsSink::new(config.demo.log_every);

    let outcome = loop {
        let frame_start = Instant::now();
        time.update();

        input.begin_frame();
        for (key, state) in pilot.poll(time.elapsed_seconds()) {
            input.process_keyboard(key, state);
        }
        let intents = input.intents();
        if intents.quit {
            break Outcome::Quit;
        }

        let frame = time.delta().min(max_frame);
        let report = world.update(frame, &intents);
        if report.physics_steps > 1 {
            log::debug!("Frame needed {} catch-up steps", report.physics_steps);
        }
        world.render(&mut sink);

        if world.craft_destroyed() {
            break Outcome::CraftDestroyed;
        }
        if time.elapsed_seconds() >= config.demo.duration {
            break Outcome::TimeUp;
        }

        if let Some(rest) = frame_budget.checked_sub(frame_start.elapsed()) {
            std::thread::sleep(rest);
        }
    };
    sink.finish();

    log::info!(
        "{} frames, last {:.0} fps, peak {} asteroids on screen",
        sink.frames(),
        time.fps(),
        sink.peak_asteroids()
    );
    Ok(outcome)
}
