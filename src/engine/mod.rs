//! Headless game engine
//!
//! Wires the simulation modules into a single owned session:
//!
//!   SimConfig (RON / JSON) → Simulation::new → tick(dt) ... → drain_events / snapshot
//!
//! Pieces:
//!   1. `config`    : tunables with validation
//!   2. `simulation`: the per-frame loop and player actions
//!   3. `projectile`: enemy projectiles in flight
//!   4. `messages`  : events and the HUD snapshot handed to a front end
//!   5. `plugin`    : bevy plugin running the loop from `Update`

pub mod config;
pub mod messages;
pub mod plugin;
pub mod projectile;
pub mod simulation;

#[allow(unused_imports)]
pub use config::{ConfigError, SimConfig};
#[allow(unused_imports)]
pub use messages::*;
#[allow(unused_imports)]
pub use plugin::{SimulationPlugin, SimulationResource};
#[allow(unused_imports)]
pub use projectile::{Projectile, ProjectileKind};
#[allow(unused_imports)]
pub use simulation::Simulation;

// =====================================================
// Tests
// =====================================================
