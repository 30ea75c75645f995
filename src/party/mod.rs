//! The player party: three class-locked members, one active leader and a
//! breadcrumb trail the followers walk along.

use std::collections::VecDeque;

use bevy::math::Vec2;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::warn;

use crate::combat::skills::AbilitySlot;
use crate::combat::status::{StatusEffect, StatusEffects, StatusKind};
use crate::combat::Combatant;
use crate::constants::SPEED_BOOST_MULT;
use crate::equipment::{EquipmentSlots, StatKind};
use crate::persistence::{decode_list, field_array, field_as, field_f32, field_u64, Persistent};
use crate::world::Point;

pub mod inventory;

/// Trail points kept for followers
pub const TRAIL_CAPACITY: usize = 400;

/// Trail points between consecutive party slots
pub const FOLLOW_LAG: usize = 40;

/// Collision radius of every party member
pub const MEMBER_RADIUS: f32 = 16.0;

// =====================================================
// Classes and stats
// =====================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClassKind {
    Warrior,
    Mage,
    Ranger,
}

impl ClassKind {
    pub fn base_stats(&self) -> Stats {
        match self {
            Self::Warrior => Stats::new(180.0, 60.0, 20.0, 10.0, 112.0),
            Self::Mage => Stats::new(120.0, 150.0, 26.0, 5.0, 108.0),
            Self::Ranger => Stats::new(140.0, 90.0, 23.0, 7.0, 125.0),
        }
    }

    pub fn passive(&self) -> &'static str {
        match self {
            Self::Warrior => "Bulwark: 10% less incoming damage.",
            Self::Mage => "Arcane Tap: attacks restore a little mana.",
            Self::Ranger => "Fleetstep: bonus movement speed.",
        }
    }

    pub fn color(&self) -> u32 {
        match self {
            Self::Warrior => 0xff9a9a,
            Self::Mage => 0xb194ff,
            Self::Ranger => 0x9ce5a2,
        }
    }
}

/// The five numeric stats every member carries
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    pub max_hp: f32,
    pub max_mana: f32,
    pub attack: f32,
    pub defense: f32,
    pub speed: f32,
}

impl Stats {
    pub const fn new(max_hp: f32, max_mana: f32, attack: f32, defense: f32, speed: f32) -> Self {
        Self {
            max_hp,
            max_mana,
            attack,
            defense,
            speed,
        }
    }

    pub fn get(&self, kind: StatKind) -> f32 {
        match kind {
            StatKind::MaxHp => self.max_hp,
            StatKind::MaxMana => self.max_mana,
            StatKind::Attack => self.attack,
            StatKind::Defense => self.defense,
            StatKind::Speed => self.speed,
        }
    }

    pub fn add(&mut self, kind: StatKind, amount: f32) {
        match kind {
            StatKind::MaxHp => self.max_hp += amount,
            StatKind::MaxMana => self.max_mana += amount,
            StatKind::Attack => self.attack += amount,
            StatKind::Defense => self.defense += amount,
            StatKind::Speed => self.speed += amount,
        }
    }

    fn is_finite(&self) -> bool {
        StatKind::ALL.iter().all(|k| self.get(*k).is_finite())
    }
}

/// Per-ability cooldown timers (seconds remaining)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Cooldowns {
    #[serde(default)]
    pub attack: f32,
    #[serde(default)]
    pub skill1: f32,
    #[serde(default)]
    pub skill2: f32,
}

impl Cooldowns {
    pub fn get(&self, slot: AbilitySlot) -> f32 {
        match slot {
            AbilitySlot::Skill1 => self.skill1,
            AbilitySlot::Skill2 => self.skill2,
        }
    }

    pub fn set(&mut self, slot: AbilitySlot, seconds: f32) {
        match slot {
            AbilitySlot::Skill1 => self.skill1 = seconds,
            AbilitySlot::Skill2 => self.skill2 = seconds,
        }
    }

    pub fn tick(&mut self, dt: f32) {
        for timer in [&mut self.attack, &mut self.skill1, &mut self.skill2] {
            *timer = if timer.is_finite() { (*timer - dt).max(0.0) } else { 0.0 };
        }
    }
}

// =====================================================
// Party member
// =====================================================

#[derive(Debug, Clone, PartialEq)]
pub struct PartyMember {
    pub name: String,
    pub class: ClassKind,
    pub level: u32,
    pub position: Vec2,
    pub radius: f32,
    pub facing: Vec2,
    /// Stats from class and levels only
    pub base: Stats,
    /// Effective stats after equipment and talents
    pub stats: Stats,
    pub hp: f32,
    pub mana: f32,
    pub cooldowns: Cooldowns,
    pub statuses: StatusEffects,
    pub equipment: EquipmentSlots,
    /// Elapsed time until which the ranger speed boost holds
    pub speed_boost_until: f32,
}

impl PartyMember {
    pub fn new(name: impl Into<String>, class: ClassKind, position: Vec2) -> Self {
        let base = class.base_stats();
        Self {
            name: name.into(),
            class,
            level: 1,
            position,
            radius: MEMBER_RADIUS,
            facing: Vec2::X,
            base,
            stats: base,
            hp: base.max_hp,
            mana: base.max_mana,
            cooldowns: Cooldowns::default(),
            statuses: StatusEffects::default(),
            equipment: EquipmentSlots::default(),
            speed_boost_until: 0.0,
        }
    }

    /// Raise base stats for a new level. Effective stats are rebuilt by the caller.
    pub fn gain_level(&mut self) {
        self.level += 1;
        self.base.max_hp += 16.0;
        self.base.max_mana += 8.0;
        self.base.attack += 3.0;
        self.base.defense += 2.0;
        self.base.speed += 2.0;
    }

    /// Recompute effective stats as base plus worn equipment
    pub fn apply_equipment_bonuses(&mut self) {
        self.stats = self.base;
        for kind in StatKind::ALL {
            self.stats.add(kind, self.equipment.bonus(kind) as f32);
        }
        self.clamp_resources();
    }

    pub fn clamp_resources(&mut self) {
        self.hp = self.hp.clamp(0.0, self.stats.max_hp.max(0.0));
        self.mana = self.mana.clamp(0.0, self.stats.max_mana.max(0.0));
    }

    /// Returns the mana actually gained
    pub fn restore_mana(&mut self, amount: f32) -> f32 {
        let before = self.mana;
        self.mana = (self.mana + amount.max(0.0)).min(self.stats.max_mana);
        self.mana - before
    }

    /// Movement penalty from slowed/ensnared, strongest wins
    pub fn hindrance(&self) -> f32 {
        [StatusKind::Slowed, StatusKind::Ensnared]
            .into_iter()
            .filter_map(|kind| self.statuses.get(kind))
            .map(|s| s.magnitude)
            .fold(0.0, f32::max)
    }

    pub fn has_speed_boost(&self, elapsed: f32) -> bool {
        elapsed < self.speed_boost_until
    }

    /// Current movement speed given boost and hindrance
    pub fn move_speed(&self, elapsed: f32) -> f32 {
        let boost = if self.has_speed_boost(elapsed) {
            SPEED_BOOST_MULT
        } else {
            1.0
        };
        self.stats.speed * boost * (1.0 - self.hindrance())
    }

    pub fn apply_status(&mut self, effect: StatusEffect) {
        self.statuses.apply(effect);
    }

    /// Advance cooldowns and statuses. Returns damage over time taken.
    pub fn tick(&mut self, dt: f32) -> f32 {
        self.cooldowns.tick(dt);
        let dot = self.statuses.tick(dt);
        if dot > 0.0 {
            self.take_damage(dot)
        } else {
            0.0
        }
    }

    /// Full restore used after a wipe
    pub fn revive(&mut self, at: Vec2) {
        self.hp = self.stats.max_hp;
        self.mana = self.stats.max_mana;
        self.statuses.clear();
        self.cooldowns = Cooldowns::default();
        self.position = at;
    }
}

impl Combatant for PartyMember {
    fn position(&self) -> Vec2 {
        self.position
    }

    fn facing(&self) -> Vec2 {
        self.facing
    }

    fn attack_power(&self) -> f32 {
        self.stats.attack
    }

    fn defense(&self) -> f32 {
        self.stats.defense
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
        self.stats.max_hp
    }

    fn set_hp(&mut self, hp: f32) {
        self.hp = hp;
    }
}

impl Persistent for PartyMember {
    fn serialize_state(&self) -> Value {
        json!({
            "name": self.name,
            "class": self.class,
            "level": self.level,
            "position": Point::from(self.position),
            "facing": Point::from(self.facing),
            "base": self.base,
            "stats": self.stats,
            "hp": self.hp,
            "mana": self.mana,
            "cooldowns": self.cooldowns,
            "statuses": self.statuses,
            "equipment": self.equipment,
            "speed_boost_until": self.speed_boost_until,
        })
    }

    /// Name and class stay fixed by party slot; everything else is restored.
    fn hydrate(&mut self, data: &Value) {
        self.level = field_u64(data, "level", self.level as u64).max(1) as u32;

        if let Some(p) = field_as::<Point>(data, "position") {
            if p.x.is_finite() && p.y.is_finite() {
                self.position = p.into();
            }
        }
        if let Some(f) = field_as::<Point>(data, "facing") {
            let f = Vec2::from(f);
            if f.is_finite() && f.length_squared() > 0.0 {
                self.facing = f.normalize();
            }
        }
        if let Some(base) = field_as::<Stats>(data, "base").filter(Stats::is_finite) {
            self.base = base;
        }
        if let Some(equipment) = field_as::<EquipmentSlots>(data, "equipment") {
            self.equipment = equipment;
        }
        match field_as::<Stats>(data, "stats").filter(Stats::is_finite) {
            Some(stats) => self.stats = stats,
            None => self.apply_equipment_bonuses(),
        }
        if let Some(cooldowns) = field_as::<Cooldowns>(data, "cooldowns") {
            self.cooldowns = cooldowns;
            self.cooldowns.tick(0.0);
        }
        self.statuses = StatusEffects {
            effects: decode_list(field_array(data, "statuses")),
        };
        self.speed_boost_until = field_f32(data, "speed_boost_until", 0.0);
        self.hp = field_f32(data, "hp", self.stats.max_hp);
        self.mana = field_f32(data, "mana", self.stats.max_mana);
        self.clamp_resources();
    }
}

// =====================================================
// Party
// =====================================================

#[derive(Debug, Clone, PartialEq)]
pub struct Party {
    pub members: Vec<PartyMember>,
    pub active_index: usize,
    trail: VecDeque<Vec2>,
}

impl Party {
    pub fn new(spawn: Vec2) -> Self {
        Self {
            members: vec![
                PartyMember::new("Bruno", ClassKind::Warrior, spawn),
                PartyMember::new("Mimi", ClassKind::Mage, spawn),
                PartyMember::new("Pip", ClassKind::Ranger, spawn),
            ],
            active_index: 0,
            trail: VecDeque::with_capacity(TRAIL_CAPACITY),
        }
    }

    fn active_slot(&self) -> usize {
        if self.active_index < self.members.len() {
            self.active_index
        } else {
            0
        }
    }

    pub fn active(&self) -> &PartyMember {
        &self.members[self.active_slot()]
    }

    pub fn active_mut(&mut self) -> &mut PartyMember {
        let slot = self.active_slot();
        &mut self.members[slot]
    }

    /// Cycle the leader to the next member
    pub fn switch_active(&mut self) {
        self.active_index = (self.active_slot() + 1) % self.members.len().max(1);
    }

    /// Hand the lead to the next living member when the leader is down.
    /// Returns true when the leader changed.
    pub fn promote_living_leader(&mut self) -> bool {
        if self.active().is_alive() {
            return false;
        }
        let len = self.members.len();
        let start = self.active_slot();
        let next = (1..len)
            .map(|offset| (start + offset) % len)
            .find(|&idx| self.members[idx].is_alive());
        match next {
            Some(idx) => {
                self.active_index = idx;
                true
            }
            None => false,
        }
    }

    pub fn is_wiped(&self) -> bool {
        self.members.iter().all(|m| !m.is_alive())
    }

    pub fn trail_len(&self) -> usize {
        self.trail.len()
    }

    /// Record the leader's position, tick every member and pull living
    /// followers toward their lagged trail point.
    pub fn update_follow(&mut self, dt: f32) {
        let lead = self.active().position;
        self.trail.push_back(lead);
        while self.trail.len() > TRAIL_CAPACITY {
            self.trail.pop_front();
        }

        let leader = self.active_slot();
        let step = (dt * 8.0).min(1.0);
        for (idx, member) in self.members.iter_mut().enumerate() {
            member.tick(dt);
            if idx == leader || !member.is_alive() {
                continue;
            }
            let follow_index = (self.trail.len() - 1).saturating_sub(FOLLOW_LAG * idx);
            let target = self.trail.get(follow_index).copied().unwrap_or(lead);
            member.position += (target - member.position) * step;
        }
    }

    /// Bring everyone back at `spawn`
    pub fn revive(&mut self, spawn: Vec2) {
        for member in &mut self.members {
            member.revive(spawn);
        }
        self.trail.clear();
    }

    pub fn place_at(&mut self, positions: impl IntoIterator<Item = Vec2>) {
        for (member, pos) in self.members.iter_mut().zip(positions) {
            member.position = pos;
        }
        self.trail.clear();
    }
}

impl Persistent for Party {
    fn serialize_state(&self) -> Value {
        json!({
            "members": self.members.iter().map(Persistent::serialize_state).collect::<Vec<_>>(),
            "active_index": self.active_index,
        })
    }

    fn hydrate(&mut self, data: &Value) {
        for (member, saved) in self.members.iter_mut().zip(field_array(data, "members")) {
            if saved.is_object() {
                member.hydrate(saved);
            } else {
                warn!(member = %member.name, "Skipping malformed saved party member");
            }
        }
        let max_index = self.members.len().saturating_sub(1) as u64;
        self.active_index = field_u64(data, "active_index", 0).min(max_index) as usize;
        self.trail.clear();
    }
}
