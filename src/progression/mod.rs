//! Long-term progression: party XP, talents, attribute points and town upgrades.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use crate::constants::{BASE_LEVEL_XP, LEVEL_XP_GROWTH};
use crate::equipment::StatKind;
use crate::party::inventory::Inventory;
use crate::party::{ClassKind, PartyMember};
use crate::persistence::{field_as, field_object, field_u64, Persistent};

// =====================================================
// Experience
// =====================================================

/// Shared party XP pool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Experience {
    pub xp: u32,
    pub level_xp: u32,
}

impl Default for Experience {
    fn default() -> Self {
        Self {
            xp: 0,
            level_xp: BASE_LEVEL_XP,
        }
    }
}

impl Experience {
    /// Add XP and return how many levels were crossed.
    /// Each level raises the requirement by 20%, rounded.
    pub fn add(&mut self, amount: u32) -> u32 {
        self.xp = self.xp.saturating_add(amount);
        let mut levels = 0;
        while self.level_xp > 0 && self.xp >= self.level_xp {
            self.xp -= self.level_xp;
            self.level_xp = (self.level_xp as f32 * LEVEL_XP_GROWTH).round() as u32;
            levels += 1;
        }
        levels
    }
}

impl Persistent for Experience {
    fn serialize_state(&self) -> Value {
        json!({ "xp": self.xp, "level_xp": self.level_xp })
    }

    fn hydrate(&mut self, data: &Value) {
        self.xp = field_u64(data, "xp", 0).min(u32::MAX as u64) as u32;
        let level_xp = field_u64(data, "level_xp", BASE_LEVEL_XP as u64);
        self.level_xp = if level_xp == 0 {
            BASE_LEVEL_XP
        } else {
            level_xp.min(u32::MAX as u64) as u32
        };
    }
}

// =====================================================
// Talents
// =====================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TalentId {
    WarVanguard,
    WarCleave,
    MagFocus,
    MagOverload,
    RanScout,
    RanVenom,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TalentDef {
    pub id: TalentId,
    pub name: &'static str,
    pub class: ClassKind,
    pub max_rank: u32,
    /// Stat gain per rank
    pub bonus: &'static [(StatKind, f32)],
}

pub static TALENTS: [TalentDef; 6] = [
    TalentDef {
        id: TalentId::WarVanguard,
        name: "Vanguard",
        class: ClassKind::Warrior,
        max_rank: 3,
        bonus: &[(StatKind::Defense, 2.0), (StatKind::MaxHp, 10.0)],
    },
    TalentDef {
        id: TalentId::WarCleave,
        name: "Cleave",
        class: ClassKind::Warrior,
        max_rank: 3,
        bonus: &[(StatKind::Attack, 2.0)],
    },
    TalentDef {
        id: TalentId::MagFocus,
        name: "Arcane Focus",
        class: ClassKind::Mage,
        max_rank: 3,
        bonus: &[(StatKind::MaxMana, 14.0)],
    },
    TalentDef {
        id: TalentId::MagOverload,
        name: "Overload",
        class: ClassKind::Mage,
        max_rank: 3,
        bonus: &[(StatKind::Attack, 3.0)],
    },
    TalentDef {
        id: TalentId::RanScout,
        name: "Scoutstep",
        class: ClassKind::Ranger,
        max_rank: 3,
        bonus: &[(StatKind::Speed, 4.0)],
    },
    TalentDef {
        id: TalentId::RanVenom,
        name: "Venomcraft",
        class: ClassKind::Ranger,
        max_rank: 3,
        bonus: &[(StatKind::Attack, 2.0)],
    },
];

/// The talent tree for one class
pub fn talents_for(class: ClassKind) -> impl Iterator<Item = &'static TalentDef> {
    TALENTS.iter().filter(move |t| t.class == class)
}

/// Stat gained per attribute point
pub fn attribute_step(stat: StatKind) -> f32 {
    match stat {
        StatKind::Attack | StatKind::Defense => 1.0,
        StatKind::Speed => 2.0,
        StatKind::MaxHp => 12.0,
        StatKind::MaxMana => 10.0,
    }
}

// =====================================================
// Town upgrades
// =====================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpgradeId {
    Forge,
    Apothecary,
    Guildhall,
}

impl UpgradeId {
    pub const ALL: [UpgradeId; 3] = [Self::Forge, Self::Apothecary, Self::Guildhall];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Forge => "Forge Level",
            Self::Apothecary => "Apothecary",
            Self::Guildhall => "Guild Hall",
        }
    }

    pub fn base_cost(&self) -> u32 {
        match self {
            Self::Forge => 120,
            Self::Apothecary => 100,
            Self::Guildhall => 150,
        }
    }

    pub fn max_rank(&self) -> u32 {
        5
    }
}

// =====================================================
// Progression state
// =====================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Progression {
    pub talent_points: u32,
    /// Talent ranks keyed by member name
    pub talents: BTreeMap<String, BTreeMap<TalentId, u32>>,
    /// Attribute points keyed by member name
    pub stat_points: BTreeMap<String, BTreeMap<StatKind, u32>>,
    pub town: BTreeMap<UpgradeId, u32>,
    pub dungeon_rank: u32,
}

impl Default for Progression {
    fn default() -> Self {
        Self {
            talent_points: 0,
            talents: BTreeMap::new(),
            stat_points: BTreeMap::new(),
            town: UpgradeId::ALL.iter().map(|id| (*id, 0)).collect(),
            dungeon_rank: 1,
        }
    }
}

impl Progression {
    pub fn grant_talent_point(&mut self) {
        self.talent_points += 1;
    }

    pub fn talent_rank(&self, member: &str, talent: TalentId) -> u32 {
        self.talents
            .get(member)
            .and_then(|ranks| ranks.get(&talent))
            .copied()
            .unwrap_or(0)
    }

    /// Rank up a talent from the member's class tree.
    ///
    /// Fails with no change when out of points, the talent belongs to another
    /// class, or it is already at max rank.
    pub fn spend_talent(&mut self, member: &PartyMember, talent: TalentId) -> bool {
        let Some(def) = talents_for(member.class).find(|t| t.id == talent) else {
            return false;
        };
        if self.talent_points == 0 {
            return false;
        }
        let rank = self.talent_rank(&member.name, talent);
        if rank >= def.max_rank {
            return false;
        }
        self.talents
            .entry(member.name.clone())
            .or_default()
            .insert(talent, rank + 1);
        self.talent_points -= 1;
        debug!(member = %member.name, talent = def.name, rank = rank + 1, "Talent ranked up");
        true
    }

    /// Trade one talent point for a permanent attribute increase
    pub fn spend_attribute_point(&mut self, member: &PartyMember, stat: StatKind) -> bool {
        if self.talent_points == 0 {
            return false;
        }
        *self
            .stat_points
            .entry(member.name.clone())
            .or_default()
            .entry(stat)
            .or_insert(0) += 1;
        self.talent_points -= 1;
        true
    }

    /// Add talent and attribute bonuses on top of the member's current stats.
    ///
    /// Call after `apply_equipment_bonuses`.
    pub fn apply_to(&self, member: &mut PartyMember) {
        for talent in talents_for(member.class) {
            let rank = self.talent_rank(&member.name, talent.id) as f32;
            for (stat, per_rank) in talent.bonus {
                member.stats.add(*stat, per_rank * rank);
            }
        }
        if let Some(points) = self.stat_points.get(&member.name) {
            for (stat, count) in points {
                member.stats.add(*stat, *count as f32 * attribute_step(*stat));
            }
        }
    }

    pub fn town_rank(&self, upgrade: UpgradeId) -> u32 {
        self.town.get(&upgrade).copied().unwrap_or(0)
    }

    /// `round(base * (1 + rank * 0.75))`
    pub fn upgrade_cost(&self, upgrade: UpgradeId) -> u32 {
        let rank = self.town_rank(upgrade) as f32;
        (upgrade.base_cost() as f32 * (1.0 + rank * 0.75)).round() as u32
    }

    /// Buy the next rank of a town upgrade with party gold
    pub fn buy_town_upgrade(&mut self, upgrade: UpgradeId, inventory: &mut Inventory) -> bool {
        let rank = self.town_rank(upgrade);
        if rank >= upgrade.max_rank() {
            return false;
        }
        let cost = self.upgrade_cost(upgrade);
        if !inventory.spend_gold(cost) {
            return false;
        }
        self.town.insert(upgrade, rank + 1);
        if upgrade == UpgradeId::Guildhall {
            self.dungeon_rank += 1;
        }
        info!(upgrade = upgrade.name(), rank = rank + 1, cost, "Town upgrade bought");
        true
    }
}

impl Persistent for Progression {
    fn serialize_state(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    fn hydrate(&mut self, data: &Value) {
        if !data.is_object() {
            return;
        }
        self.talent_points = field_u64(data, "talent_points", 0).min(u32::MAX as u64) as u32;
        self.talents = field_as(data, "talents").unwrap_or_default();
        self.stat_points = field_as(data, "stat_points").unwrap_or_default();

        if let Some(town) = field_object(data, "town") {
            for (key, rank) in town {
                let id = serde_json::from_value::<UpgradeId>(Value::String(key.clone()));
                match (id, rank.as_u64()) {
                    (Ok(id), Some(rank)) => {
                        self.town.insert(id, (rank as u32).min(id.max_rank()));
                    }
                    _ => warn!(upgrade = %key, "Dropping malformed town upgrade"),
                }
            }
        }
        self.dungeon_rank = field_u64(data, "dungeon_rank", 1).max(1).min(u32::MAX as u64) as u32;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::math::Vec2;

    fn warrior() -> PartyMember {
        PartyMember::new("Bruno", ClassKind::Warrior, Vec2::ZERO)
    }

    #[test]
    fn test_xp_curve() {
        let mut exp = Experience::default();
        assert_eq!(exp.add(99), 0);
        assert_eq!(exp.add(1), 1);
        assert_eq!(exp.level_xp, 120);
        assert_eq!(exp.xp, 0);

        // 120 + 144 crosses two levels in one grant
        assert_eq!(exp.add(270), 2);
        assert_eq!(exp.level_xp, 173);
        assert_eq!(exp.xp, 6);
    }

    #[test]
    fn test_spend_talent_rules() {
        let mut prog = Progression::default();
        let bruno = warrior();
        assert!(!prog.spend_talent(&bruno, TalentId::WarCleave), "No points yet");

        for _ in 0..5 {
            prog.grant_talent_point();
        }
        assert!(!prog.spend_talent(&bruno, TalentId::MagFocus), "Wrong class");
        for _ in 0..3 {
            assert!(prog.spend_talent(&bruno, TalentId::WarCleave));
        }
        assert!(!prog.spend_talent(&bruno, TalentId::WarCleave), "Max rank");
        assert_eq!(prog.talent_points, 2);
        assert_eq!(prog.talent_rank("Bruno", TalentId::WarCleave), 3);
    }

    #[test]
    fn test_apply_talents_and_attributes() {
        let mut prog = Progression::default();
        let mut bruno = warrior();
        for _ in 0..4 {
            prog.grant_talent_point();
        }
        prog.spend_talent(&bruno, TalentId::WarVanguard);
        prog.spend_talent(&bruno, TalentId::WarVanguard);
        prog.spend_attribute_point(&bruno, StatKind::Speed);
        prog.spend_attribute_point(&bruno, StatKind::MaxHp);
        assert!(!prog.spend_attribute_point(&bruno, StatKind::Attack));

        bruno.apply_equipment_bonuses();
        prog.apply_to(&mut bruno);
        assert_eq!(bruno.stats.defense, 14.0);
        assert_eq!(bruno.stats.max_hp, 180.0 + 20.0 + 12.0);
        assert_eq!(bruno.stats.speed, 114.0);
        assert_eq!(bruno.stats.attack, 20.0);
    }

    #[test]
    fn test_upgrade_costs_and_rank_cap() {
        let mut prog = Progression::default();
        let mut inventory = Inventory::with_gold(10_000);
        assert_eq!(prog.upgrade_cost(UpgradeId::Forge), 120);

        assert!(prog.buy_town_upgrade(UpgradeId::Forge, &mut inventory));
        assert_eq!(prog.upgrade_cost(UpgradeId::Forge), 210);
        assert_eq!(inventory.gold, 10_000 - 120);

        for _ in 0..4 {
            assert!(prog.buy_town_upgrade(UpgradeId::Forge, &mut inventory));
        }
        let gold = inventory.gold;
        assert!(!prog.buy_town_upgrade(UpgradeId::Forge, &mut inventory));
        assert_eq!(inventory.gold, gold);
    }

    #[test]
    fn test_upgrade_needs_gold() {
        let mut prog = Progression::default();
        let mut inventory = Inventory::default();
        assert!(!prog.buy_town_upgrade(UpgradeId::Apothecary, &mut inventory));
        assert_eq!(inventory.gold, 40);
        assert_eq!(prog.town_rank(UpgradeId::Apothecary), 0);
    }

    #[test]
    fn test_guildhall_raises_dungeon_rank() {
        let mut prog = Progression::default();
        let mut inventory = Inventory::with_gold(1_000);
        assert_eq!(prog.dungeon_rank, 1);
        assert!(prog.buy_town_upgrade(UpgradeId::Guildhall, &mut inventory));
        assert_eq!(prog.dungeon_rank, 2);
    }

    #[test]
    fn test_hydrate_partial() {
        let mut prog = Progression::default();
        prog.hydrate(&json!({
            "talent_points": 3,
            "talents": { "Bruno": { "war_cleave": 2 } },
            "town": { "forge": 2, "moat": 1, "guildhall": 99 },
            "dungeon_rank": 0,
        }));
        assert_eq!(prog.talent_points, 3);
        assert_eq!(prog.talent_rank("Bruno", TalentId::WarCleave), 2);
        assert_eq!(prog.town_rank(UpgradeId::Forge), 2);
        assert_eq!(prog.town_rank(UpgradeId::Apothecary), 0);
        assert_eq!(prog.town_rank(UpgradeId::Guildhall), 5);
        assert_eq!(prog.dungeon_rank, 1);
        assert!(prog.stat_points.is_empty());
    }

    #[test]
    fn test_roundtrip() {
        let mut prog = Progression::default();
        let bruno = warrior();
        prog.grant_talent_point();
        prog.grant_talent_point();
        prog.spend_talent(&bruno, TalentId::WarVanguard);
        prog.spend_attribute_point(&bruno, StatKind::Defense);
        prog.buy_town_upgrade(UpgradeId::Guildhall, &mut Inventory::with_gold(500));

        let mut restored = Progression::default();
        restored.hydrate(&prog.serialize_state());
        assert_eq!(restored, prog);

        let mut exp = Experience::default();
        exp.add(250);
        let mut restored_exp = Experience::default();
        restored_exp.hydrate(&exp.serialize_state());
        assert_eq!(restored_exp, exp);
    }
}
