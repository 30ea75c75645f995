use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use bevy::app::ScheduleRunnerPlugin;
use bevy::prelude::*;

use emberfall_core::engine::{SimConfig, SimulationPlugin};
use emberfall_core::logging;

/// Usage: emberfall-headless [config.ron | config.json]
fn main() -> anyhow::Result<()> {
    let config = match std::env::args_os().nth(1).map(PathBuf::from) {
        Some(path) => SimConfig::load(&path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => SimConfig::default(),
    };
    let tracing_config = config.tracing.clone();
    logging::init_tracing(&tracing_config);
    tracing::info!(seed = config.world_seed, zone = ?config.starting_zone, "Starting headless simulation");

    let frame = Duration::from_secs_f32(config.max_frame_dt / 2.0);
    App::new()
        .add_plugins(MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(frame)))
        // Logging
        .add_plugins(logging::LoggingPlugin {
            config: tracing_config,
        })
        // Simulation
        .add_plugins(SimulationPlugin { config })
        .run();
    Ok(())
}
