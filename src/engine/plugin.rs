use bevy::prelude::*;
use std::sync::{Arc, RwLock};

use crate::engine::config::SimConfig;
use crate::engine::messages::SimEvent;
use crate::engine::simulation::Simulation;

/// Drives a [`Simulation`] from the bevy `Update` schedule
pub struct SimulationPlugin {
    pub config: SimConfig,
}

impl Default for SimulationPlugin {
    fn default() -> Self {
        Self {
            config: SimConfig::default(),
        }
    }
}

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        let sim = Simulation::new(self.config.clone());

        app.insert_resource(SimulationResource(Arc::new(RwLock::new(sim))))
            .add_systems(Update, (simulation_tick_system, event_log_system).chain());
    }
}

#[derive(Resource, Clone)]
pub struct SimulationResource(pub Arc<RwLock<Simulation>>);

fn simulation_tick_system(time: Res<Time>, sim_res: Res<SimulationResource>) {
    if let Ok(mut sim) = sim_res.0.write() {
        sim.tick(time.delta_secs());
    }
}

fn event_log_system(sim_res: Res<SimulationResource>) {
    let Ok(mut sim) = sim_res.0.write() else {
        return;
    };
    for event in sim.drain_events() {
        match &event {
            SimEvent::PartyWiped | SimEvent::ExitLocked { .. } => warn!(?event, "Simulation event"),
            SimEvent::EnemyDefeated { .. } | SimEvent::IntentTriggered { .. } => {
                debug!(?event, "Simulation event")
            }
            _ => info!(?event, "Simulation event"),
        }
    }
}
