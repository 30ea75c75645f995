//! Enemy templates and live enemy state.
//!
//! Enemy = Template x Level x Run modifiers.
//! Templates are static; level scales the numbers by 8% per level above 1 and
//! run modifiers are folded in once at spawn.

use bevy::color::Color;
use bevy::math::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::combat::status::StatusEffects;
use crate::combat::Combatant;
use crate::constants::BOSS_ENRAGE_SPEED_MULT;
use crate::generation::ModifierId;

pub mod ai;

pub use ai::{BossPhase, Intent, IntentProfile, Wander};

/// Every enemy type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnemyKind {
    Slime,
    Bat,
    Mushroom,
    Wraith,
    Sentinel,
    Rockling,
    WobbleMage,
    Silkweaver,
    Spiderling,
    Boss,
    PuffZombie,
    RuneSentinel,
    PocketDrake,
    ChefSlime,
}

/// Base numbers for one enemy type at level 1
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnemyTemplate {
    pub hp: f32,
    pub attack: f32,
    pub defense: f32,
    pub speed: f32,
    pub xp: f32,
    pub gold: (u32, u32),
    pub drop: &'static str,
    /// sRGB hex
    pub color: u32,
}

#[allow(clippy::too_many_arguments)]
const fn template(
    hp: f32,
    attack: f32,
    defense: f32,
    speed: f32,
    xp: f32,
    gold: (u32, u32),
    drop: &'static str,
    color: u32,
) -> EnemyTemplate {
    EnemyTemplate {
        hp,
        attack,
        defense,
        speed,
        xp,
        gold,
        drop,
        color,
    }
}

impl EnemyKind {
    pub const ALL: [EnemyKind; 14] = [
        Self::Slime,
        Self::Bat,
        Self::Mushroom,
        Self::Wraith,
        Self::Sentinel,
        Self::Rockling,
        Self::WobbleMage,
        Self::Silkweaver,
        Self::Spiderling,
        Self::Boss,
        Self::PuffZombie,
        Self::RuneSentinel,
        Self::PocketDrake,
        Self::ChefSlime,
    ];

    pub fn template(&self) -> EnemyTemplate {
        match self {
            Self::Slime => template(56.0, 9.0, 2.0, 42.0, 14.0, (4, 8), "Slime Gel", 0x7df2be),
            Self::Bat => template(38.0, 12.0, 1.0, 70.0, 12.0, (3, 7), "Bat Wing", 0xbba5ff),
            Self::Mushroom => template(72.0, 11.0, 4.0, 35.0, 16.0, (6, 10), "Mush Cap", 0xffb788),
            Self::Wraith => template(80.0, 16.0, 4.0, 58.0, 22.0, (8, 14), "Echo Dust", 0x90a2ff),
            Self::Sentinel => {
                template(110.0, 14.0, 11.0, 34.0, 24.0, (9, 16), "Relic Shard", 0x90d4d0)
            }
            Self::Rockling => {
                template(132.0, 15.0, 24.0, 30.0, 30.0, (11, 18), "Stone Core", 0x8da0b7)
            }
            Self::WobbleMage => {
                template(74.0, 13.0, 6.0, 45.0, 28.0, (10, 16), "Arcane Pebble", 0x8ecbff)
            }
            Self::Silkweaver => {
                template(92.0, 14.0, 8.0, 49.0, 32.0, (11, 19), "Silk Bundle", 0xd5ddff)
            }
            Self::Spiderling => {
                template(34.0, 9.0, 2.0, 72.0, 10.0, (2, 5), "Spider Silk", 0xadb8d8)
            }
            Self::Boss => template(380.0, 24.0, 12.0, 50.0, 120.0, (40, 70), "Crown Core", 0xff6fa9),
            Self::PuffZombie => {
                template(88.0, 16.0, 5.0, 39.0, 34.0, (12, 20), "Puff Core", 0xb7f598)
            }
            Self::RuneSentinel => {
                template(170.0, 17.0, 16.0, 31.0, 40.0, (14, 24), "Rune Shard", 0x9ec7d0)
            }
            Self::PocketDrake => {
                template(120.0, 20.0, 9.0, 56.0, 44.0, (15, 25), "Drake Scale", 0xffb592)
            }
            Self::ChefSlime => {
                template(520.0, 26.0, 13.0, 42.0, 180.0, (60, 90), "Chef Crown", 0xff9fc2)
            }
        }
    }

    /// Display name used in quest trackers
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Slime => "Slime",
            Self::Bat => "Bat",
            Self::Mushroom => "Mushroom",
            Self::Wraith => "Wraith",
            Self::Sentinel => "Sentinel",
            Self::Rockling => "Rockling",
            Self::WobbleMage => "Wobble Mage",
            Self::Silkweaver => "Silkweaver",
            Self::Spiderling => "Spiderling",
            Self::Boss => "Cavern Boss",
            Self::PuffZombie => "Puff Zombie",
            Self::RuneSentinel => "Rune Sentinel",
            Self::PocketDrake => "Pocket Drake",
            Self::ChefSlime => "The Chef Slime",
        }
    }

    /// Only the cavern boss has a second phase
    pub fn is_boss(&self) -> bool {
        matches!(self, Self::Boss)
    }

    pub fn radius(&self) -> f32 {
        match self {
            Self::Boss | Self::ChefSlime => 28.0,
            Self::Rockling | Self::RuneSentinel => 16.0,
            Self::Spiderling => 10.0,
            _ => 14.0,
        }
    }

    pub fn alert_range(&self) -> f32 {
        match self {
            Self::WobbleMage => 260.0,
            Self::PocketDrake => 250.0,
            Self::ChefSlime => 280.0,
            _ => 220.0,
        }
    }

    /// Reach beyond the body radius
    pub fn attack_reach(&self) -> f32 {
        match self {
            Self::WobbleMage => 180.0,
            Self::PocketDrake | Self::ChefSlime => 150.0,
            _ => 20.0,
        }
    }

    /// Seconds between melee swings
    pub fn attack_cooldown(&self) -> f32 {
        if self.is_boss() {
            0.72
        } else {
            1.12
        }
    }

    /// Kiting types back off when the target gets inside this distance
    pub fn retreat_distance(&self) -> Option<f32> {
        match self {
            Self::WobbleMage | Self::Silkweaver | Self::PocketDrake => Some(120.0),
            _ => None,
        }
    }

    pub fn color(&self) -> Color {
        let hex = self.template().color;
        Color::srgb_u8((hex >> 16) as u8, (hex >> 8) as u8, hex as u8)
    }
}

/// Level scaling factor
pub fn level_scale(level: u32) -> f32 {
    1.0 + (level.max(1) - 1) as f32 * 0.08
}

/// A live enemy
#[derive(Debug, Clone)]
pub struct Enemy {
    pub kind: EnemyKind,
    pub position: Vec2,
    pub radius: f32,
    pub facing: Vec2,
    pub level: u32,

    pub max_hp: f32,
    pub hp: f32,
    pub attack: f32,
    pub defense: f32,
    /// Level-scaled speed before haste, phase and slows
    pub base_speed: f32,
    pub speed: f32,
    pub xp: u32,

    pub cooldown: f32,
    pub special_cooldown: f32,
    pub alert_range: f32,
    pub attack_range: f32,

    pub wander: Wander,
    pub statuses: StatusEffects,
    pub modifiers: Vec<ModifierId>,
    pub phase: BossPhase,
    pub intent: Option<Intent>,
}

impl Enemy {
    /// Build an enemy with neutral timers
    pub fn new(kind: EnemyKind, position: Vec2, level: u32, modifiers: &[ModifierId]) -> Self {
        let level = level.max(1);
        let t = kind.template();
        let scale = level_scale(level);
        let radius = kind.radius();

        let mut enemy = Self {
            kind,
            position,
            radius,
            facing: Vec2::X,
            level,
            max_hp: (t.hp * scale).round(),
            hp: 0.0,
            attack: (t.attack * scale).round(),
            defense: (t.defense * scale).round(),
            base_speed: t.speed * scale,
            speed: t.speed * scale,
            xp: (t.xp * scale).round() as u32,
            cooldown: 0.0,
            special_cooldown: 0.6,
            alert_range: kind.alert_range(),
            attack_range: radius + kind.attack_reach(),
            wander: Wander::default(),
            statuses: StatusEffects::default(),
            modifiers: modifiers.to_vec(),
            phase: BossPhase::default(),
            intent: None,
        };
        enemy.apply_modifiers();
        enemy.hp = enemy.max_hp;
        enemy
    }

    /// Build an enemy with randomized special cooldown and wander heading
    pub fn spawn<R: Rng + ?Sized>(
        kind: EnemyKind,
        position: Vec2,
        level: u32,
        modifiers: &[ModifierId],
        rng: &mut R,
    ) -> Self {
        let mut enemy = Self::new(kind, position, level, modifiers);
        enemy.special_cooldown = 0.6 + rng.gen::<f32>() * 1.4;
        enemy.wander = Wander::random(rng);
        enemy
    }

    fn apply_modifiers(&mut self) {
        if self.has_modifier(ModifierId::Fortified) {
            self.max_hp = (self.max_hp * 1.18).round();
        }
        if self.has_modifier(ModifierId::Fury) {
            self.attack = (self.attack * 1.14).round();
        }
        self.speed = self.base_speed * self.haste_mult();
    }

    pub fn has_modifier(&self, modifier: ModifierId) -> bool {
        self.modifiers.contains(&modifier)
    }

    fn haste_mult(&self) -> f32 {
        if self.has_modifier(ModifierId::Haste) {
            1.16
        } else {
            1.0
        }
    }

    /// Speed after haste, boss phase and the strongest slow
    pub fn recompute_speed(&mut self) {
        let phase = if self.is_enraged() {
            BOSS_ENRAGE_SPEED_MULT
        } else {
            1.0
        };
        let slow = self.statuses.strongest_slow();
        self.speed = self.base_speed * self.haste_mult() * phase * (1.0 - slow);
    }

    pub fn is_enraged(&self) -> bool {
        self.phase == BossPhase::Enraged
    }

    pub fn reset_attack_cooldown(&mut self) {
        self.cooldown = self.kind.attack_cooldown();
    }

    pub fn roll_gold<R: Rng + ?Sized>(&self, rng: &mut R) -> u32 {
        let (min, max) = self.kind.template().gold;
        rng.gen_range(min..=max.max(min))
    }
}

impl Combatant for Enemy {
    fn position(&self) -> Vec2 {
        self.position
    }

    fn facing(&self) -> Vec2 {
        self.facing
    }

    fn attack_power(&self) -> f32 {
        self.attack
    }

    fn defense(&self) -> f32 {
        self.defense
    }

    fn statuses(&self) -> &StatusEffects {
        &self.statuses
    }

    fn statuses_mut(&mut self) -> &mut StatusEffects {
        &mut self.statuses
    }

    fn hp(&self) -> f32 {
        self.hp
    }

    fn max_hp(&self) -> f32 {
        self.max_hp
    }

    fn set_hp(&mut self, hp: f32) {
        self.hp = hp;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::sim_rng;

    #[test]
    fn test_level_one_matches_template() {
        let slime = Enemy::new(EnemyKind::Slime, Vec2::ZERO, 1, &[]);
        assert_eq!(slime.max_hp, 56.0);
        assert_eq!(slime.hp, 56.0);
        assert_eq!(slime.attack, 9.0);
        assert_eq!(slime.defense, 2.0);
        assert_eq!(slime.xp, 14);
        assert_eq!(slime.attack_range, 34.0);
    }

    #[test]
    fn test_level_scaling() {
        let bat = Enemy::new(EnemyKind::Bat, Vec2::ZERO, 6, &[]);
        // 1 + 5 * 0.08 = 1.4
        assert_eq!(bat.max_hp, (38.0_f32 * 1.4).round());
        assert_eq!(bat.attack, (12.0_f32 * 1.4).round());
        assert!((bat.base_speed - 98.0).abs() < 0.01);
    }

    #[test]
    fn test_level_zero_treated_as_one() {
        let slime = Enemy::new(EnemyKind::Slime, Vec2::ZERO, 0, &[]);
        assert_eq!(slime.level, 1);
        assert_eq!(slime.max_hp, 56.0);
    }

    #[test]
    fn test_modifiers_applied_once() {
        let mods = [ModifierId::Fortified, ModifierId::Fury, ModifierId::Haste];
        let boss = Enemy::new(EnemyKind::Boss, Vec2::ZERO, 1, &mods);
        assert_eq!(boss.max_hp, (380.0_f32 * 1.18).round());
        assert_eq!(boss.hp, boss.max_hp);
        assert_eq!(boss.attack, (24.0_f32 * 1.14).round());
        assert!((boss.speed - 58.0).abs() < 0.01);
    }

    #[test]
    fn test_ranges_per_kind() {
        let mage = Enemy::new(EnemyKind::WobbleMage, Vec2::ZERO, 1, &[]);
        assert_eq!(mage.alert_range, 260.0);
        assert_eq!(mage.attack_range, 194.0);
        let chef = Enemy::new(EnemyKind::ChefSlime, Vec2::ZERO, 1, &[]);
        assert_eq!(chef.attack_range, 178.0);
    }

    #[test]
    fn test_gold_in_range() {
        let mut rng = sim_rng(9);
        let wraith = Enemy::new(EnemyKind::Wraith, Vec2::ZERO, 1, &[]);
        for _ in 0..500 {
            let g = wraith.roll_gold(&mut rng);
            assert!((8..=14).contains(&g));
        }
    }

    #[test]
    fn test_spawn_randomizes_special_cooldown() {
        let mut rng = sim_rng(10);
        for _ in 0..100 {
            let e = Enemy::spawn(EnemyKind::Silkweaver, Vec2::ZERO, 2, &[], &mut rng);
            assert!((0.6..=2.0).contains(&e.special_cooldown));
            assert!((1.0..=4.0).contains(&e.wander.timer));
        }
    }

    #[test]
    fn test_hp_clamped_by_trait() {
        let mut slime = Enemy::new(EnemyKind::Slime, Vec2::ZERO, 1, &[]);
        slime.take_damage(1_000.0);
        assert_eq!(slime.hp, 0.0);
        assert!(!slime.is_alive());
        slime.heal(1_000.0);
        assert_eq!(slime.hp, slime.max_hp);
    }
}
