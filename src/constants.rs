//! Centralized balance constants for the Emberfall simulation core.
//!
//! Numbers that more than one module reads live here. Per-module tables
//! (enemy templates, skill book, loot tables, quests) stay in their modules as
//! the single source of truth.

// =====================================================
// Frame loop
// =====================================================

/// Largest delta time simulated in one tick (seconds). Longer stalls are clamped.
pub const MAX_FRAME_DT: f32 = 0.033;

// =====================================================
// Damage formula
// =====================================================

/// Defense coefficient for party basic attacks
pub const BASIC_ATTACK_MITIGATION: f32 = 0.44;

/// Spread range for party basic attacks
pub const BASIC_ATTACK_SPREAD: (f32, f32) = (0.84, 1.16);

/// Defense coefficient for skill hits
pub const SKILL_MITIGATION: f32 = 0.40;

/// Spread range for skill hits
pub const SKILL_SPREAD: (f32, f32) = (0.90, 1.12);

/// Defense coefficient when an enemy hits a party member
pub const ENEMY_ATTACK_MITIGATION: f32 = 0.34;

/// Roll range applied to the enemy attack stat before mitigation
pub const ENEMY_ATTACK_ROLL: (f32, f32) = (0.90, 1.15);

/// Overall scalar on enemy melee damage
pub const ENEMY_DAMAGE_SCALAR: f32 = 1.15;

/// Warrior passive: incoming damage multiplier
pub const WARRIOR_PASSIVE_MITIGATION: f32 = 0.9;

/// Defense coefficient against enemy projectiles
pub const PROJECTILE_MITIGATION: f32 = 0.25;

/// Crit multiplier when a hit does not specify one
pub const DEFAULT_CRIT_MULT: f32 = 1.6;

/// Vulnerable amplification when the status carries no payload
pub const DEFAULT_VULNERABLE_AMP: f32 = 0.1;

// =====================================================
// Boss
// =====================================================

/// HP fraction below which a boss enters its enraged phase
pub const BOSS_ENRAGE_HP_FRACTION: f32 = 0.5;

/// Attack multiplier applied once on the phase transition
pub const BOSS_ENRAGE_ATTACK_MULT: f32 = 1.3;

/// Speed multiplier held for the rest of the fight after the transition
pub const BOSS_ENRAGE_SPEED_MULT: f32 = 1.2;

/// Chance that an enraged boss attack also splashes the party
pub const BOSS_SPLASH_CHANCE: f32 = 0.2;

/// Splash chance with the Volatility modifier active
pub const BOSS_VOLATILE_SPLASH_CHANCE: f32 = 0.35;

/// Splash radius around the boss
pub const BOSS_SPLASH_RADIUS: f32 = 185.0;

/// Splash damage as a fraction of boss attack
pub const BOSS_SPLASH_ATTACK_FRACTION: f32 = 0.32;

// =====================================================
// Cosmetics
// =====================================================

/// Hard ceiling on concurrent particles
pub const MAX_PARTICLES: usize = 700;

/// Particle gravity (units / s^2)
pub const PARTICLE_GRAVITY: f32 = 220.0;

/// Seconds a combo survives without a new hit
pub const COMBO_WINDOW_SECS: f32 = 2.4;

// =====================================================
// Party
// =====================================================

/// Mana regenerated per second by every member
pub const MANA_REGEN_PER_SEC: f32 = 4.5;

/// HP regenerated per second in town before apothecary upgrades
pub const TOWN_REGEN_PER_SEC: f32 = 0.8;

/// Extra town regeneration per apothecary rank
pub const APOTHECARY_REGEN_PER_RANK: f32 = 0.25;

/// Movement multiplier while a ranger speed boost is active
pub const SPEED_BOOST_MULT: f32 = 1.5;

/// Party XP needed for the first level
pub const BASE_LEVEL_XP: u32 = 100;

/// Growth of the XP requirement per level
pub const LEVEL_XP_GROWTH: f32 = 1.2;

// =====================================================
// Runs & zones
// =====================================================

/// Seconds before a cleared static zone repopulates
pub const ZONE_RESPAWN_DELAY: f32 = 7.0;

/// Gold for clearing a dungeon run: base + rank * per-rank
pub const DUNGEON_CLEAR_GOLD_BASE: u32 = 60;
pub const DUNGEON_CLEAR_GOLD_PER_RANK: u32 = 15;

/// Starting gold in a fresh inventory
pub const STARTING_GOLD: u32 = 40;

/// Chance a defeated enemy also drops a rolled equipment piece
pub const EQUIPMENT_DROP_CHANCE: f64 = 0.17;
