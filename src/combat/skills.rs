//! Class attack kits and the skill book.
//!
//! Skills run against a [`SkillContext`] so their effects can be expressed
//! without knowing how the party, enemy list and particle pool are stored.

use bevy::color::Color;
use bevy::math::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::damage::{calc_damage, DamageRoll, HitOptions};
use super::particles::ParticlePool;
use super::status::StatusEffect;
use super::targeting::{pick_targets, TargetQuery};
use super::Combatant;
use crate::monster::Enemy;
use crate::party::{ClassKind, PartyMember};

/// Skill button slots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AbilitySlot {
    Skill1,
    Skill2,
}

/// Basic attack parameters per class
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AttackKit {
    pub range: f32,
    pub arc: f32,
    pub limit: usize,
    pub power: f32,
    pub cooldown: f32,
    pub crit_chance: f32,
}

impl AttackKit {
    pub fn query(&self) -> TargetQuery {
        TargetQuery::new(self.range, self.arc, self.limit)
    }
}

const WARRIOR_KIT: AttackKit = AttackKit {
    range: 74.0,
    arc: 125.0,
    limit: 3,
    power: 1.15,
    cooldown: 0.42,
    crit_chance: 0.08,
};

const MAGE_KIT: AttackKit = AttackKit {
    range: 170.0,
    arc: 360.0,
    limit: 2,
    power: 0.95,
    cooldown: 0.45,
    crit_chance: 0.08,
};

const RANGER_KIT: AttackKit = AttackKit {
    range: 195.0,
    arc: 50.0,
    limit: 4,
    power: 1.0,
    cooldown: 0.38,
    crit_chance: 0.16,
};

pub fn attack_kit(class: ClassKind) -> &'static AttackKit {
    match class {
        ClassKind::Warrior => &WARRIOR_KIT,
        ClassKind::Mage => &MAGE_KIT,
        ClassKind::Ranger => &RANGER_KIT,
    }
}

/// Every castable skill
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkillId {
    ShieldBash,
    HeroicSpin,
    SparkBolt,
    CometPuddle,
    TripleShot,
    SnareTrap,
}

/// Static skill definition
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SkillDef {
    pub id: SkillId,
    pub name: &'static str,
    pub mana: f32,
    pub cooldown: f32,
}

static SKILL_BOOK: [SkillDef; 6] = [
    SkillDef { id: SkillId::ShieldBash, name: "Shield Bash", mana: 16.0, cooldown: 3.4 },
    SkillDef { id: SkillId::HeroicSpin, name: "Heroic Spin", mana: 18.0, cooldown: 7.0 },
    SkillDef { id: SkillId::SparkBolt, name: "Spark Bolt", mana: 18.0, cooldown: 4.6 },
    SkillDef { id: SkillId::CometPuddle, name: "Comet Puddle", mana: 22.0, cooldown: 6.0 },
    SkillDef { id: SkillId::TripleShot, name: "Triple Shot", mana: 12.0, cooldown: 3.1 },
    SkillDef { id: SkillId::SnareTrap, name: "Snare Trap", mana: 18.0, cooldown: 7.4 },
];

/// The skill a class has in `slot`
pub fn skill_for(class: ClassKind, slot: AbilitySlot) -> &'static SkillDef {
    let index = match (class, slot) {
        (ClassKind::Warrior, AbilitySlot::Skill1) => 0,
        (ClassKind::Warrior, AbilitySlot::Skill2) => 1,
        (ClassKind::Mage, AbilitySlot::Skill1) => 2,
        (ClassKind::Mage, AbilitySlot::Skill2) => 3,
        (ClassKind::Ranger, AbilitySlot::Skill1) => 4,
        (ClassKind::Ranger, AbilitySlot::Skill2) => 5,
    };
    &SKILL_BOOK[index]
}

/// Operations a skill may perform while casting.
///
/// Enemy handles are indices into the enemy list the cast was started with.
pub trait SkillContext {
    fn caster(&self) -> &PartyMember;
    fn caster_mut(&mut self) -> &mut PartyMember;
    fn elapsed(&self) -> f32;

    /// Targets around the caster, nearest first
    fn pick_targets(&self, query: &TargetQuery) -> Vec<usize>;

    /// Up to `count` other living enemies nearest to enemy `from`
    fn nearest_to(&self, from: usize, count: usize) -> Vec<usize>;

    fn enemy_position(&self, index: usize) -> Option<Vec2>;

    fn damage(&mut self, index: usize, power_scale: f32, options: &HitOptions) -> Option<DamageRoll>;
    fn apply_status(&mut self, index: usize, effect: StatusEffect);
    fn heal_self(&mut self, amount: f32);

    /// Number of particles actually spawned
    fn spawn_particles(&mut self, at: Vec2, color: Color, count: usize) -> usize;
}

impl SkillDef {
    /// Run the skill's effect. Returns the hit count that feeds the combo.
    pub fn cast(&self, ctx: &mut dyn SkillContext) -> u32 {
        let level = ctx.caster().level as f32;
        let origin = ctx.caster().position;

        match self.id {
            SkillId::ShieldBash => {
                let targets = ctx.pick_targets(&TargetQuery::around(104.0, 99));
                let options = HitOptions::skill(0.18);
                for &t in &targets {
                    ctx.damage(t, 1.65, &options);
                    ctx.apply_status(t, StatusEffect::slow(1.8, 0.35));
                    ctx.apply_status(t, StatusEffect::vulnerable(3.2, 0.14));
                }
                ctx.heal_self(10.0 + targets.len() as f32 * 2.0);
                ctx.spawn_particles(origin, Color::srgb_u8(0xff, 0xd3, 0x76), 24);
                targets.len() as u32
            }
            SkillId::HeroicSpin => {
                ctx.heal_self(42.0);
                ctx.caster_mut().statuses.apply(StatusEffect::guard(3.2, 0.4));
                ctx.spawn_particles(origin, Color::srgb_u8(0xff, 0xf2, 0xa8), 18);
                1
            }
            SkillId::SparkBolt => {
                let Some(&primary) = ctx.pick_targets(&TargetQuery::around(210.0, 1)).first() else {
                    return 0;
                };
                let mut chain = vec![primary];
                chain.extend(ctx.nearest_to(primary, 2));

                let options = HitOptions::skill(0.12);
                for (i, &t) in chain.iter().enumerate() {
                    ctx.damage(t, 2.2 - i as f32 * 0.32, &options);
                    ctx.apply_status(t, StatusEffect::burn(4.2, 10.0 + level));
                }
                if let Some(at) = ctx.enemy_position(primary) {
                    ctx.spawn_particles(at, Color::srgb_u8(0xb6, 0xd0, 0xff), 24);
                }
                chain.len() as u32
            }
            SkillId::CometPuddle => {
                let targets = ctx.pick_targets(&TargetQuery::around(130.0, 99));
                let options = HitOptions::skill(0.1);
                for &t in &targets {
                    ctx.damage(t, 1.45, &options);
                    ctx.apply_status(t, StatusEffect::slow(2.7, 0.45));
                    ctx.apply_status(t, StatusEffect::burn(3.8, 8.0 + level * 0.6));
                }
                ctx.caster_mut().restore_mana(8.0);
                ctx.spawn_particles(origin, Color::srgb_u8(0x9b, 0xe8, 0xff), 26);
                targets.len() as u32
            }
            SkillId::TripleShot => {
                let targets = ctx.pick_targets(&TargetQuery::new(240.0, 70.0, 5));
                let options = HitOptions::skill(0.24).with_crit_mult(1.85);
                for &t in &targets {
                    ctx.damage(t, 1.18, &options);
                    ctx.apply_status(t, StatusEffect::bleed(4.0, 4.0 + level * 0.7));
                }
                ctx.spawn_particles(origin, Color::srgb_u8(0xa9, 0xff, 0xba), 18);
                targets.len() as u32
            }
            SkillId::SnareTrap => {
                let until = ctx.elapsed() + 4.1;
                ctx.caster_mut().speed_boost_until = until;
                let targets = ctx.pick_targets(&TargetQuery::around(210.0, 3));
                let options = HitOptions::skill(0.2);
                for &t in &targets {
                    ctx.damage(t, 1.35, &options);
                    ctx.apply_status(t, StatusEffect::slow(2.0, 0.28));
                }
                ctx.spawn_particles(origin, Color::srgb_u8(0xcb, 0xff, 0xd8), 16);
                (targets.len() as u32).max(1)
            }
        }
    }
}

/// The live [`SkillContext`] used by `CombatSystem::try_skill`
pub struct CastContext<'a, R: Rng + ?Sized> {
    pub caster: &'a mut PartyMember,
    pub enemies: &'a mut [Enemy],
    pub particles: &'a mut ParticlePool,
    pub rng: &'a mut R,
    pub elapsed: f32,
}

impl<R: Rng + ?Sized> SkillContext for CastContext<'_, R> {
    fn caster(&self) -> &PartyMember {
        &*self.caster
    }

    fn caster_mut(&mut self) -> &mut PartyMember {
        &mut *self.caster
    }

    fn elapsed(&self) -> f32 {
        self.elapsed
    }

    fn pick_targets(&self, query: &TargetQuery) -> Vec<usize> {
        pick_targets(&*self.caster, &*self.enemies, query)
    }

    fn nearest_to(&self, from: usize, count: usize) -> Vec<usize> {
        let Some(origin) = self.enemy_position(from) else {
            return Vec::new();
        };
        let mut others: Vec<(usize, f32)> = self
            .enemies
            .iter()
            .enumerate()
            .filter(|(i, e)| *i != from && e.is_alive())
            .map(|(i, e)| (i, e.position.distance(origin)))
            .collect();
        others.sort_by(|a, b| a.1.total_cmp(&b.1));
        others.into_iter().take(count).map(|(i, _)| i).collect()
    }

    fn enemy_position(&self, index: usize) -> Option<Vec2> {
        self.enemies.get(index).map(|e| e.position)
    }

    fn damage(&mut self, index: usize, power_scale: f32, options: &HitOptions) -> Option<DamageRoll> {
        let enemy = self.enemies.get_mut(index)?;
        let roll = calc_damage(&*self.caster, &*enemy, power_scale, options, &mut *self.rng);
        enemy.apply_hit(roll.amount as f32);
        let at = enemy.position;
        self.particles.spawn(at, Color::WHITE, 8, &mut *self.rng);
        Some(roll)
    }

    fn apply_status(&mut self, index: usize, effect: StatusEffect) {
        if let Some(enemy) = self.enemies.get_mut(index) {
            enemy.statuses.apply(effect);
        }
    }

    fn heal_self(&mut self, amount: f32) {
        self.caster.heal(amount);
    }

    fn spawn_particles(&mut self, at: Vec2, color: Color, count: usize) -> usize {
        self.particles.spawn(at, color, count, &mut *self.rng)
    }
}
