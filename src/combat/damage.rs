//! Damage formulas.
//!
//! Every call site carries its own [`DamageProfile`] so mitigation and spread
//! can be tuned per source without touching the formula.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::Combatant;
use crate::constants::*;

/// Mitigation coefficient and spread range for one kind of hit
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DamageProfile {
    pub mitigation: f32,
    pub spread_min: f32,
    pub spread_max: f32,
}

impl DamageProfile {
    pub const BASIC_ATTACK: Self = Self::new(
        BASIC_ATTACK_MITIGATION,
        BASIC_ATTACK_SPREAD.0,
        BASIC_ATTACK_SPREAD.1,
    );

    pub const SKILL: Self = Self::new(SKILL_MITIGATION, SKILL_SPREAD.0, SKILL_SPREAD.1);

    pub const fn new(mitigation: f32, spread_min: f32, spread_max: f32) -> Self {
        Self {
            mitigation,
            spread_min,
            spread_max,
        }
    }

    fn roll_spread<R: Rng + ?Sized>(&self, rng: &mut R) -> f32 {
        if self.spread_max > self.spread_min {
            rng.gen_range(self.spread_min..self.spread_max)
        } else {
            self.spread_min
        }
    }
}

/// Per-hit options
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HitOptions {
    pub crit_chance: f32,
    pub crit_mult: f32,
    pub profile: DamageProfile,
}

impl Default for HitOptions {
    fn default() -> Self {
        Self {
            crit_chance: 0.0,
            crit_mult: DEFAULT_CRIT_MULT,
            profile: DamageProfile::SKILL,
        }
    }
}

impl HitOptions {
    pub fn basic(crit_chance: f32) -> Self {
        Self {
            crit_chance,
            profile: DamageProfile::BASIC_ATTACK,
            ..Self::default()
        }
    }

    pub fn skill(crit_chance: f32) -> Self {
        Self {
            crit_chance,
            ..Self::default()
        }
    }

    pub fn with_crit_mult(mut self, crit_mult: f32) -> Self {
        self.crit_mult = crit_mult;
        self
    }
}

/// Result of a single damage roll
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DamageRoll {
    pub amount: i32,
    pub crit: bool,
}

/// Party-side damage roll against `defender`. Never below 1.
pub fn calc_damage<A, D, R>(
    attacker: &A,
    defender: &D,
    power_scale: f32,
    options: &HitOptions,
    rng: &mut R,
) -> DamageRoll
where
    A: Combatant + ?Sized,
    D: Combatant + ?Sized,
    R: Rng + ?Sized,
{
    let raw = attacker.attack_power() * power_scale;
    let spread = options.profile.roll_spread(rng);
    let mut damage = ((raw - defender.defense() * options.profile.mitigation) * spread).max(1.0);

    damage *= defender.statuses().vulnerability_factor();

    let crit = options.crit_chance > 0.0 && rng.gen::<f32>() < options.crit_chance;
    if crit {
        damage *= options.crit_mult;
    }

    DamageRoll {
        amount: (damage.round() as i32).max(1),
        crit,
    }
}

/// Mitigated enemy melee damage against a party member, before the target's
/// guard/barrier factor. Never below 1.
pub fn enemy_attack_damage<R: Rng + ?Sized>(
    enemy_attack: f32,
    target_defense: f32,
    passive_mult: f32,
    rng: &mut R,
) -> f32 {
    let (lo, hi) = ENEMY_ATTACK_ROLL;
    let base = (enemy_attack * rng.gen_range(lo..hi)).round().max(1.0);
    ((base - target_defense * ENEMY_ATTACK_MITIGATION) * passive_mult * ENEMY_DAMAGE_SCALAR).max(1.0)
}

/// Projectile damage after the target's defense. Never below 1.
pub fn projectile_damage(projectile_damage: f32, target_defense: f32) -> f32 {
    (projectile_damage - target_defense * PROJECTILE_MITIGATION).max(1.0)
}
