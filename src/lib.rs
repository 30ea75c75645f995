//! Emberfall - Simulation Core Library
//!
//! This crate provides the deterministic game logic for the Emberfall action RPG:
//! - Combat (basic attacks, class skills, status effects, enemy hits)
//! - Enemy AI (chase/wander, boss phases, special intents)
//! - Seeded dungeon runs (layouts, modifiers, spawn packs)
//! - Loot rolling (rarity, affixes)
//! - Party, inventory and equipment
//! - Quests, talents and town upgrades
//! - Save/load through versioned JSON blobs
//! - Headless engine driving all of the above from one tick

pub mod combat;
pub mod constants;
pub mod engine;
pub mod equipment;
pub mod generation;
pub mod logging;
pub mod loot;
pub mod monster;
pub mod party;
pub mod persistence;
pub mod progression;
pub mod quest;
pub mod rng;
pub mod world;
