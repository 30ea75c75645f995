//! Enemy AI behavior.
//!
//! Per tick, in order: timers and status damage, boss phase check, intent
//! selection, movement (chase, kite or wander), attack trigger.
//! Phase is an explicit one-way state; an intent is a one-shot signal the
//! orchestrator takes and realizes.

use bevy::math::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{Enemy, EnemyKind};
use crate::combat::Combatant;
use crate::constants::{BOSS_ENRAGE_ATTACK_MULT, BOSS_ENRAGE_HP_FRACTION};
use crate::world::CollisionQuery;

/// Boss phase. `Enraged` is terminal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum BossPhase {
    #[default]
    Normal,
    Enraged,
}

impl BossPhase {
    /// Phase after observing `hp_fraction`. Never goes back.
    pub fn next(self, hp_fraction: f32) -> Self {
        match self {
            Self::Normal if hp_fraction < BOSS_ENRAGE_HP_FRACTION => Self::Enraged,
            other => other,
        }
    }
}

/// Special actions an enemy can request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Projectile,
    AllyShield,
    WebTrap,
    SummonSpiderling,
    FireCone,
    WingGust,
    FoodProjectile,
    SlimeHeal,
}

/// Weighted choice between two intents
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntentProfile {
    pub trigger_range: f32,
    pub primary_chance: f32,
    pub primary: Intent,
    pub secondary: Intent,
    pub cooldown_base: f32,
    pub cooldown_jitter: f32,
}

impl EnemyKind {
    /// Special behavior for complex types, `None` for plain melee enemies
    pub fn intent_profile(&self) -> Option<IntentProfile> {
        let profile = match self {
            Self::WobbleMage => IntentProfile {
                trigger_range: 250.0,
                primary_chance: 0.35,
                primary: Intent::AllyShield,
                secondary: Intent::Projectile,
                cooldown_base: 2.8,
                cooldown_jitter: 1.4,
            },
            Self::Silkweaver => IntentProfile {
                trigger_range: 220.0,
                primary_chance: 0.45,
                primary: Intent::WebTrap,
                secondary: Intent::SummonSpiderling,
                cooldown_base: 3.1,
                cooldown_jitter: 1.2,
            },
            Self::PocketDrake => IntentProfile {
                trigger_range: 220.0,
                primary_chance: 0.55,
                primary: Intent::FireCone,
                secondary: Intent::WingGust,
                cooldown_base: 2.4,
                cooldown_jitter: 1.1,
            },
            Self::ChefSlime => IntentProfile {
                trigger_range: 260.0,
                primary_chance: 0.6,
                primary: Intent::FoodProjectile,
                secondary: Intent::SlimeHeal,
                cooldown_base: 2.2,
                cooldown_jitter: 1.3,
            },
            _ => return None,
        };
        Some(profile)
    }
}

/// Wander heading that drifts at random intervals
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Wander {
    pub angle: f32,
    pub timer: f32,
}

impl Default for Wander {
    fn default() -> Self {
        Self {
            angle: 0.0,
            timer: 1.0,
        }
    }
}

impl Wander {
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self {
            angle: rng.gen::<f32>() * std::f32::consts::TAU,
            timer: 1.0 + rng.gen::<f32>() * 3.0,
        }
    }

    /// Advance the timer, drifting the heading when it runs out
    pub fn step<R: Rng + ?Sized>(&mut self, dt: f32, rng: &mut R) -> Vec2 {
        self.timer -= dt;
        if self.timer <= 0.0 {
            self.angle += (rng.gen::<f32>() - 0.5) * 1.2;
            self.timer = 1.0 + rng.gen::<f32>() * 3.0;
        }
        Vec2::from_angle(self.angle)
    }
}

/// Wander moves at this fraction of current speed
const WANDER_SPEED_FRACTION: f32 = 0.3;

/// Kiting speed multiplier (negative: away from the target)
const RETREAT_SCALE: f32 = -0.75;

impl Enemy {
    /// Advance statuses: DoT damage, expiry, then speed from slows.
    pub fn tick_statuses(&mut self, dt: f32) -> f32 {
        let dot = self.statuses.tick(dt);
        let lost = if dot > 0.0 { self.take_damage(dot) } else { 0.0 };
        self.recompute_speed();
        lost
    }

    /// Run the phase transition. Returns true on the tick it happens.
    pub fn update_phase(&mut self) -> bool {
        if !self.kind.is_boss() || self.max_hp <= 0.0 {
            return false;
        }
        let next = self.phase.next(self.hp / self.max_hp);
        if next == self.phase {
            return false;
        }
        self.phase = next;
        self.attack = (self.attack * BOSS_ENRAGE_ATTACK_MULT).round();
        self.recompute_speed();
        debug!(kind = ?self.kind, attack = self.attack, speed = self.speed, "Boss enraged");
        true
    }

    /// Roll an intent when the special cooldown is up and the target is close
    pub fn select_intent<R: Rng + ?Sized>(&mut self, dist: f32, rng: &mut R) -> Option<Intent> {
        let profile = self.kind.intent_profile()?;
        if dist >= profile.trigger_range || self.special_cooldown > 0.0 {
            return None;
        }
        let intent = if rng.gen::<f32>() < profile.primary_chance {
            profile.primary
        } else {
            profile.secondary
        };
        self.special_cooldown = profile.cooldown_base + rng.gen::<f32>() * profile.cooldown_jitter;
        self.intent = Some(intent);
        Some(intent)
    }

    /// One AI step toward `target`.
    ///
    /// Returns true when the enemy is in attack range with its attack ready;
    /// the attack cooldown is reset in that case.
    pub fn update_ai<C, R>(&mut self, dt: f32, target: Vec2, world: &C, rng: &mut R) -> bool
    where
        C: CollisionQuery + ?Sized,
        R: Rng + ?Sized,
    {
        self.cooldown = (self.cooldown - dt).max(0.0);
        self.special_cooldown = (self.special_cooldown - dt).max(0.0);
        self.tick_statuses(dt);
        self.intent = None;

        if !self.is_alive() {
            return false;
        }

        self.update_phase();

        let offset = target - self.position;
        let dist = offset.length();
        self.select_intent(dist, rng);

        if dist < self.alert_range {
            let dir = if dist > f32::EPSILON {
                offset / dist
            } else {
                Vec2::X
            };
            let retreat = self.kind.retreat_distance().is_some_and(|d| dist < d);
            let scale = if retreat { RETREAT_SCALE } else { 1.0 };
            let step = dir * self.speed * dt * scale;
            self.position = world.resolve_collision(self.position + step, self.radius);
            self.facing = dir * scale;
        } else {
            let heading = self.wander.step(dt, rng);
            let step = heading * self.speed * WANDER_SPEED_FRACTION * dt;
            self.position = world.resolve_collision(self.position + step, self.radius);
            self.facing = heading;
        }

        if dist < self.attack_range && self.cooldown <= 0.0 {
            self.reset_attack_cooldown();
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::status::StatusEffect;
    use crate::rng::sim_rng;

    /// Open field with no obstacles
    struct OpenField;

    impl CollisionQuery for OpenField {
        fn resolve_collision(&self, position: Vec2, _radius: f32) -> Vec2 {
            position
        }
    }

    #[test]
    fn test_phase_is_one_way() {
        assert_eq!(BossPhase::Normal.next(0.8), BossPhase::Normal);
        assert_eq!(BossPhase::Normal.next(0.49), BossPhase::Enraged);
        assert_eq!(BossPhase::Enraged.next(1.0), BossPhase::Enraged);
    }

    #[test]
    fn test_boss_enrages_once() {
        let mut boss = Enemy::new(EnemyKind::Boss, Vec2::ZERO, 1, &[]);
        let attack = boss.attack;
        boss.hp = boss.max_hp * 0.4;

        assert!(boss.update_phase());
        assert_eq!(boss.attack, (attack * 1.3).round());
        assert!((boss.speed - 60.0).abs() < 0.01);

        boss.hp = boss.max_hp;
        assert!(!boss.update_phase());
        assert_eq!(boss.phase, BossPhase::Enraged);
        assert_eq!(boss.attack, (attack * 1.3).round());
    }

    #[test]
    fn test_non_boss_never_enrages() {
        let mut chef = Enemy::new(EnemyKind::ChefSlime, Vec2::ZERO, 1, &[]);
        chef.hp = 1.0;
        assert!(!chef.update_phase());
        assert_eq!(chef.phase, BossPhase::Normal);
    }

    #[test]
    fn test_enrage_speed_survives_status_tick() {
        let mut boss = Enemy::new(EnemyKind::Boss, Vec2::ZERO, 1, &[]);
        boss.hp = 10.0;
        boss.update_phase();
        boss.tick_statuses(0.016);
        assert!((boss.speed - 60.0).abs() < 0.01);
    }

    #[test]
    fn test_slow_reduces_speed() {
        let mut slime = Enemy::new(EnemyKind::Slime, Vec2::ZERO, 1, &[]);
        slime.statuses.apply(StatusEffect::slow(2.0, 0.5));
        slime.tick_statuses(0.1);
        assert!((slime.speed - 21.0).abs() < 0.01);
    }

    #[test]
    fn test_intent_gated_by_range_and_cooldown() {
        let mut rng = sim_rng(21);
        let mut mage = Enemy::new(EnemyKind::WobbleMage, Vec2::ZERO, 1, &[]);
        mage.special_cooldown = 0.0;

        assert_eq!(mage.select_intent(400.0, &mut rng), None);
        let intent = mage.select_intent(100.0, &mut rng);
        assert!(matches!(intent, Some(Intent::AllyShield | Intent::Projectile)));
        assert!((2.8..=4.2).contains(&mage.special_cooldown));
        assert_eq!(mage.select_intent(100.0, &mut rng), None, "Cooling down");
    }

    #[test]
    fn test_plain_enemy_has_no_intent() {
        let mut rng = sim_rng(22);
        let mut bat = Enemy::new(EnemyKind::Bat, Vec2::ZERO, 1, &[]);
        bat.special_cooldown = 0.0;
        assert_eq!(bat.select_intent(10.0, &mut rng), None);
    }

    #[test]
    fn test_chases_inside_alert_range() {
        let mut rng = sim_rng(23);
        let mut slime = Enemy::new(EnemyKind::Slime, Vec2::ZERO, 1, &[]);
        slime.update_ai(0.1, Vec2::new(100.0, 0.0), &OpenField, &mut rng);
        assert!(slime.position.x > 0.0);
        assert!(slime.position.y.abs() < 0.001);
    }

    #[test]
    fn test_kiter_retreats_when_close() {
        let mut rng = sim_rng(24);
        let mut weaver = Enemy::new(EnemyKind::Silkweaver, Vec2::ZERO, 1, &[]);
        weaver.update_ai(0.1, Vec2::new(60.0, 0.0), &OpenField, &mut rng);
        assert!(weaver.position.x < 0.0);
    }

    #[test]
    fn test_attack_trigger_resets_cooldown() {
        let mut rng = sim_rng(25);
        let mut slime = Enemy::new(EnemyKind::Slime, Vec2::ZERO, 1, &[]);
        assert!(slime.update_ai(0.01, Vec2::new(20.0, 0.0), &OpenField, &mut rng));
        assert!((slime.cooldown - 1.12).abs() < 0.001);
        assert!(!slime.update_ai(0.01, Vec2::new(20.0, 0.0), &OpenField, &mut rng));
    }

    #[test]
    fn test_wanders_outside_alert_range() {
        let mut rng = sim_rng(26);
        let mut slime = Enemy::new(EnemyKind::Slime, Vec2::ZERO, 1, &[]);
        let attacked = slime.update_ai(0.5, Vec2::new(5_000.0, 0.0), &OpenField, &mut rng);
        assert!(!attacked);
        // 42 * 0.3 * 0.5
        assert!((slime.position.length() - 6.3).abs() < 0.01);
    }

    #[test]
    fn test_dot_can_kill() {
        let mut rng = sim_rng(27);
        let mut bat = Enemy::new(EnemyKind::Bat, Vec2::ZERO, 1, &[]);
        bat.hp = 1.0;
        bat.statuses.apply(StatusEffect::burn(3.0, 50.0));
        assert!(!bat.update_ai(0.1, Vec2::new(10.0, 0.0), &OpenField, &mut rng));
        assert_eq!(bat.hp, 0.0);
    }
}
