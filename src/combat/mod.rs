//! Combat resolution: basic attacks, skills, enemy hits and death processing.
//!
//! `CombatSystem` owns only the cosmetic state (particles, combo). Actors are
//! borrowed per call so the orchestrator stays the single owner of every
//! entity collection.

use bevy::color::Color;
use bevy::math::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::constants::*;
use crate::generation::ModifierId;
use crate::monster::{Enemy, EnemyKind};
use crate::party::inventory::Inventory;
use crate::party::{ClassKind, Party, PartyMember};
use crate::quest::QuestSystem;

pub mod combo;
pub mod damage;
pub mod particles;
pub mod skills;
pub mod status;
pub mod targeting;

use combo::ComboCounter;
use damage::{calc_damage, enemy_attack_damage, HitOptions};
use particles::ParticlePool;
use skills::{attack_kit, skill_for, AbilitySlot, CastContext};
use status::{StatusEffect, StatusEffects};
use targeting::pick_targets;

/// Anything that can be targeted, damaged and healed.
///
/// hp is always kept inside `[0, max_hp]` by the provided methods.
pub trait Combatant {
    fn position(&self) -> Vec2;

    fn facing(&self) -> Vec2 {
        Vec2::X
    }

    fn attack_power(&self) -> f32;
    fn defense(&self) -> f32;
    fn statuses(&self) -> &StatusEffects;
    fn statuses_mut(&mut self) -> &mut StatusEffects;
    fn hp(&self) -> f32;
    fn max_hp(&self) -> f32;
    fn set_hp(&mut self, hp: f32);

    fn is_alive(&self) -> bool {
        self.hp() > 0.0
    }

    /// Remove up to `amount` hp. Returns the hp actually lost.
    fn take_damage(&mut self, amount: f32) -> f32 {
        let before = self.hp();
        let after = (before - amount.max(0.0)).clamp(0.0, self.max_hp());
        self.set_hp(after);
        before - after
    }

    /// Restore up to `amount` hp. Returns the hp actually gained.
    fn heal(&mut self, amount: f32) -> f32 {
        let before = self.hp();
        let after = (before + amount.max(0.0)).clamp(0.0, self.max_hp());
        self.set_hp(after);
        after - before
    }

    /// Apply an already mitigated hit through guard/barrier.
    /// Loss is `round(raw * damage_taken_factor)`.
    fn apply_hit(&mut self, raw: f32) -> f32 {
        let loss = (raw * self.statuses().damage_taken_factor()).round().max(0.0);
        self.take_damage(loss)
    }
}

/// What an enemy swing did to the party
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EnemyAttackOutcome {
    pub damage: f32,
    pub poisoned: bool,
    pub splash_hits: u32,
}

/// A defeated enemy after loot has been handed out
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Defeat {
    pub kind: EnemyKind,
    pub level: u32,
    pub xp: u32,
    pub gold: u32,
    pub drop: String,
}

/// Cosmetic combat state plus the attack/skill entry points
#[derive(Debug, Clone)]
pub struct CombatSystem {
    pub particles: ParticlePool,
    pub combo: ComboCounter,
}

impl Default for CombatSystem {
    fn default() -> Self {
        Self::new(MAX_PARTICLES, COMBO_WINDOW_SECS)
    }
}

impl CombatSystem {
    pub fn new(particle_cap: usize, combo_window: f32) -> Self {
        Self {
            particles: ParticlePool::new(particle_cap),
            combo: ComboCounter::new(combo_window),
        }
    }

    /// Basic attack with the actor's class kit.
    ///
    /// Returns `None` (and changes nothing) when the actor is down or the
    /// attack is cooling down, otherwise the number of enemies hit.
    pub fn try_attack<R: Rng + ?Sized>(
        &mut self,
        actor: &mut PartyMember,
        enemies: &mut [Enemy],
        rng: &mut R,
    ) -> Option<u32> {
        if !actor.is_alive() || actor.cooldowns.attack > 0.0 {
            return None;
        }

        let kit = attack_kit(actor.class);
        actor.cooldowns.attack = kit.cooldown;

        let targets = pick_targets(&*actor, enemies, &kit.query());
        let options = HitOptions::basic(kit.crit_chance);
        for &index in &targets {
            let enemy = &mut enemies[index];
            let roll = calc_damage(&*actor, &*enemy, kit.power, &options, rng);
            enemy.apply_hit(roll.amount as f32);
            match actor.class {
                ClassKind::Mage => enemy
                    .statuses
                    .apply(StatusEffect::burn(2.4, 7.0 + actor.level as f32 * 0.6)),
                ClassKind::Ranger => enemy
                    .statuses
                    .apply(StatusEffect::bleed(2.3, 3.0 + actor.level as f32 * 0.4)),
                ClassKind::Warrior => {}
            }
            self.particles.spawn(enemy.position, Color::WHITE, 8, rng);
            debug!(
                attacker = %actor.name,
                target = ?enemy.kind,
                damage = roll.amount,
                crit = roll.crit,
                "Basic attack hit"
            );
        }

        if actor.class == ClassKind::Mage {
            actor.restore_mana(4.0);
        }

        let hits = targets.len() as u32;
        self.combo.bump(hits);
        Some(hits)
    }

    /// Cast the skill in `slot`.
    ///
    /// Fails with `None` and no mutation when the caster is down, the slot
    /// is cooling down, or mana is short. Otherwise mana is spent, the
    /// cooldown is set and the hit count is returned.
    pub fn try_skill<R: Rng + ?Sized>(
        &mut self,
        actor: &mut PartyMember,
        slot: AbilitySlot,
        enemies: &mut [Enemy],
        elapsed: f32,
        rng: &mut R,
    ) -> Option<u32> {
        if !actor.is_alive() {
            return None;
        }
        let skill = skill_for(actor.class, slot);
        if actor.cooldowns.get(slot) > 0.0 || actor.mana < skill.mana {
            return None;
        }

        actor.mana -= skill.mana;
        actor.cooldowns.set(slot, skill.cooldown);

        let hits = {
            let mut ctx = CastContext {
                caster: &mut *actor,
                enemies,
                particles: &mut self.particles,
                rng,
                elapsed,
            };
            skill.cast(&mut ctx)
        };

        debug!(caster = %actor.name, skill = skill.name, hits, "Skill cast");
        self.combo.bump(hits);
        Some(hits)
    }

    /// Resolve one enemy swing against the party leader.
    pub fn enemy_attack<R: Rng + ?Sized>(
        &mut self,
        enemy: &mut Enemy,
        party: &mut Party,
        rng: &mut R,
    ) -> EnemyAttackOutcome {
        let mut outcome = EnemyAttackOutcome::default();
        enemy.reset_attack_cooldown();

        let target = party.active_mut();
        let passive = if target.class == ClassKind::Warrior {
            WARRIOR_PASSIVE_MITIGATION
        } else {
            1.0
        };
        let raw = enemy_attack_damage(enemy.attack, target.defense(), passive, rng);
        outcome.damage = target.apply_hit(raw);

        if enemy.has_modifier(ModifierId::Plague) && rng.gen::<f32>() < 0.22 {
            target
                .statuses
                .apply(StatusEffect::poison(4.0, 4.0 + enemy.level as f32 * 0.5));
            outcome.poisoned = true;
        }
        let target_pos = target.position;

        if enemy.is_enraged() {
            let chance = if enemy.has_modifier(ModifierId::Volatility) {
                BOSS_VOLATILE_SPLASH_CHANCE
            } else {
                BOSS_SPLASH_CHANCE
            };
            if rng.gen::<f32>() < chance {
                let splash = (enemy.attack * BOSS_SPLASH_ATTACK_FRACTION).round().max(1.0);
                for member in party.members.iter_mut() {
                    if member.is_alive()
                        && member.position.distance(enemy.position) < BOSS_SPLASH_RADIUS
                    {
                        member.take_damage(splash);
                        outcome.splash_hits += 1;
                    }
                }
            }
        }

        self.particles
            .spawn(target_pos, Color::srgb_u8(0xff, 0x8e, 0xa8), 10, rng);
        debug!(
            enemy = ?enemy.kind,
            damage = outcome.damage,
            splash = outcome.splash_hits,
            "Enemy attack"
        );
        outcome
    }

    /// Remove dead enemies, paying out loot and notifying quests.
    pub fn process_deaths<R: Rng + ?Sized>(
        &mut self,
        enemies: &mut Vec<Enemy>,
        inventory: &mut Inventory,
        quests: &mut QuestSystem,
        rng: &mut R,
    ) -> Vec<Defeat> {
        let mut defeats = Vec::new();
        enemies.retain(|enemy| {
            if enemy.is_alive() {
                return true;
            }
            let template = enemy.kind.template();
            let gold = enemy.roll_gold(rng);
            inventory.add_loot(template.drop, gold, enemy.level, rng);
            quests.on_enemy_defeated(enemy.kind);
            quests.on_item_collected(template.drop);
            defeats.push(Defeat {
                kind: enemy.kind,
                level: enemy.level,
                xp: enemy.xp,
                gold,
                drop: template.drop.to_string(),
            });
            false
        });
        defeats
    }

    /// Advance particles and decay the combo
    pub fn update(&mut self, dt: f32) {
        self.combo.update(dt);
        self.particles.update(dt);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::sim_rng;

    fn party_at(pos: Vec2) -> Party {
        Party::new(pos)
    }

    #[test]
    fn test_attack_on_cooldown_is_noop() {
        let mut combat = CombatSystem::default();
        let mut party = party_at(Vec2::new(100.0, 100.0));
        let mut enemies = vec![Enemy::new(EnemyKind::Slime, Vec2::new(140.0, 100.0), 1, &[])];
        let mut rng = sim_rng(1);

        assert_eq!(combat.try_attack(party.active_mut(), &mut enemies, &mut rng), Some(1));
        let hp_after_first = enemies[0].hp;
        assert_eq!(combat.try_attack(party.active_mut(), &mut enemies, &mut rng), None);
        assert_eq!(enemies[0].hp, hp_after_first);
    }

    fn enraged_boss(modifiers: &[ModifierId]) -> Enemy {
        let mut boss = Enemy::new(EnemyKind::Boss, Vec2::ZERO, 3, modifiers);
        boss.hp = boss.max_hp * 0.4;
        assert!(boss.update_phase());
        boss
    }

    fn spread_party() -> Party {
        let mut party = party_at(Vec2::ZERO);
        party.members[0].position = Vec2::new(30.0, 0.0);
        party.members[1].position = Vec2::new(150.0, 0.0);
        party.members[2].position = Vec2::new(400.0, 0.0);
        party
    }

    fn refill(party: &mut Party) {
        for member in party.members.iter_mut() {
            member.hp = member.max_hp();
        }
    }

    /// Fraction of `swings` attacks that splashed
    fn splash_rate(boss: &mut Enemy, swings: u32, seed: u64) -> f32 {
        let mut combat = CombatSystem::default();
        let mut party = spread_party();
        let mut rng = sim_rng(seed);
        let mut splashed = 0;
        for _ in 0..swings {
            refill(&mut party);
            if combat.enemy_attack(boss, &mut party, &mut rng).splash_hits > 0 {
                splashed += 1;
            }
        }
        splashed as f32 / swings as f32
    }

    #[test]
    fn test_enraged_boss_splash_hits_nearby_members() {
        let mut combat = CombatSystem::default();
        let mut boss = enraged_boss(&[]);
        let splash = (boss.attack * BOSS_SPLASH_ATTACK_FRACTION).round();
        let mut party = spread_party();
        let mut rng = sim_rng(17);

        let outcome = loop {
            refill(&mut party);
            let outcome = combat.enemy_attack(&mut boss, &mut party, &mut rng);
            if outcome.splash_hits > 0 {
                break outcome;
            }
        };

        // leader and the member at 150 are inside 185, the one at 400 is not
        assert_eq!(outcome.splash_hits, 2);
        let leader = &party.members[0];
        assert_eq!(leader.max_hp() - leader.hp, outcome.damage + splash);
        let near = &party.members[1];
        assert_eq!(near.max_hp() - near.hp, splash);
        let far = &party.members[2];
        assert_eq!(far.hp, far.max_hp());
    }

    #[test]
    fn test_calm_boss_never_splashes() {
        let mut boss = Enemy::new(EnemyKind::Boss, Vec2::ZERO, 3, &[]);
        assert!(!boss.is_enraged());
        assert_eq!(splash_rate(&mut boss, 500, 4), 0.0);
    }

    #[test]
    fn test_volatility_raises_splash_chance() {
        let plain = splash_rate(&mut enraged_boss(&[]), 2000, 8);
        let volatile = splash_rate(&mut enraged_boss(&[ModifierId::Volatility]), 2000, 8);
        assert!((0.15..0.25).contains(&plain), "plain rate {plain}");
        assert!((0.29..0.41).contains(&volatile), "volatile rate {volatile}");
    }

    #[test]
    fn test_dead_actor_cannot_attack() {
        let mut combat = CombatSystem::default();
        let mut party = party_at(Vec2::ZERO);
        party.active_mut().hp = 0.0;
        let mut enemies = vec![Enemy::new(EnemyKind::Slime, Vec2::new(20.0, 0.0), 1, &[])];
        assert_eq!(combat.try_attack(party.active_mut(), &mut enemies, &mut sim_rng(2)), None);
    }

    #[test]
    fn test_skill_without_mana_is_noop() {
        let mut combat = CombatSystem::default();
        let mut party = party_at(Vec2::ZERO);
        let actor = party.active_mut();
        actor.mana = 1.0;
        let mut enemies = vec![Enemy::new(EnemyKind::Slime, Vec2::new(20.0, 0.0), 1, &[])];

        let result = combat.try_skill(actor, AbilitySlot::Skill1, &mut enemies, 0.0, &mut sim_rng(3));
        assert_eq!(result, None);
        assert!((actor.mana - 1.0).abs() < f32::EPSILON);
        assert_eq!(actor.cooldowns.get(AbilitySlot::Skill1), 0.0);
        assert_eq!(enemies[0].hp, enemies[0].max_hp);
    }

    #[test]
    fn test_skill_spends_mana_and_sets_cooldown() {
        let mut combat = CombatSystem::default();
        let mut party = party_at(Vec2::ZERO);
        let actor = party.active_mut();
        let mana_before = actor.mana;
        let mut enemies = vec![Enemy::new(EnemyKind::Slime, Vec2::new(20.0, 0.0), 1, &[])];

        let hits = combat.try_skill(actor, AbilitySlot::Skill1, &mut enemies, 0.0, &mut sim_rng(4));
        assert_eq!(hits, Some(1));
        assert!((actor.mana - (mana_before - 16.0)).abs() < 0.001);
        assert!((actor.cooldowns.get(AbilitySlot::Skill1) - 3.4).abs() < 0.001);
        assert!(enemies[0].statuses.has(status::StatusKind::Vulnerable));
        assert_eq!(combat.combo.count, 1);
    }

    #[test]
    fn test_guard_scales_enemy_hit() {
        let mut guarded = PartyMember::new("Bruno", ClassKind::Warrior, Vec2::ZERO);
        guarded.statuses.apply(StatusEffect::guard(3.2, 0.4));
        let before = guarded.hp;

        let raw = 30.0;
        let lost = guarded.apply_hit(raw);
        assert!((lost - (raw * 0.6_f32).round()).abs() < 0.001);
        assert!((guarded.hp - (before - lost)).abs() < 0.001);
    }

    #[test]
    fn test_enemy_attack_resets_cooldown() {
        let mut combat = CombatSystem::default();
        let mut party = party_at(Vec2::ZERO);
        let mut boss = Enemy::new(EnemyKind::Boss, Vec2::new(10.0, 0.0), 3, &[]);
        let mut bat = Enemy::new(EnemyKind::Bat, Vec2::new(10.0, 0.0), 3, &[]);
        let mut rng = sim_rng(6);

        combat.enemy_attack(&mut boss, &mut party, &mut rng);
        combat.enemy_attack(&mut bat, &mut party, &mut rng);
        assert!((boss.cooldown - 0.72).abs() < 0.001);
        assert!((bat.cooldown - 1.12).abs() < 0.001);
        assert!(party.active().hp < party.active().max_hp());
    }

    #[test]
    fn test_plague_can_poison() {
        let mut combat = CombatSystem::default();
        let mut party = party_at(Vec2::ZERO);
        let mut slime = Enemy::new(EnemyKind::Slime, Vec2::new(10.0, 0.0), 1, &[ModifierId::Plague]);
        let mut rng = sim_rng(7);

        let poisoned = (0..200).any(|_| {
            party.active_mut().hp = 1_000.0;
            combat.enemy_attack(&mut slime, &mut party, &mut rng).poisoned
        });
        assert!(poisoned);
        assert!(party.active().statuses.has(status::StatusKind::Poison));
        assert_eq!(party.active().statuses.len(), 1);
    }

    #[test]
    fn test_process_deaths_pays_out() {
        let mut combat = CombatSystem::default();
        let mut inventory = Inventory::default();
        let mut quests = QuestSystem::default();
        let mut enemies = vec![
            Enemy::new(EnemyKind::Slime, Vec2::ZERO, 1, &[]),
            Enemy::new(EnemyKind::Bat, Vec2::ZERO, 1, &[]),
        ];
        enemies[0].hp = 0.0;
        let gold_before = inventory.gold;

        let defeats = combat.process_deaths(&mut enemies, &mut inventory, &mut quests, &mut sim_rng(8));
        assert_eq!(defeats.len(), 1);
        assert_eq!(enemies.len(), 1);
        assert_eq!(enemies[0].kind, EnemyKind::Bat);
        assert_eq!(inventory.item_count("Slime Gel"), 1);
        assert!((4..=8).contains(&defeats[0].gold));
        assert_eq!(inventory.gold, gold_before + defeats[0].gold);
        assert_eq!(defeats[0].xp, 14);
    }

    #[test]
    fn test_combat_update_decays_combo() {
        let mut combat = CombatSystem::default();
        combat.combo.bump(3);
        combat.update(1.0);
        assert_eq!(combat.combo.count, 3);
        combat.update(2.0);
        assert_eq!(combat.combo.count, 0);
    }
}
