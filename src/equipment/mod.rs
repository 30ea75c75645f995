//! Equipment items and slots.
//!
//! Items carry a flat stat-bonus map. The three base pieces double as the
//! starting bag and as the templates the loot roller scales up.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::loot::Rarity;

/// Equipment slots on a party member
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EquipSlot {
    Weapon,
    Armor,
    Charm,
}

impl EquipSlot {
    pub const ALL: [EquipSlot; 3] = [Self::Weapon, Self::Armor, Self::Charm];
}

/// Stats an item, talent or attribute point can raise
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatKind {
    MaxHp,
    MaxMana,
    Attack,
    Defense,
    Speed,
}

impl StatKind {
    pub const ALL: [StatKind; 5] = [
        Self::MaxHp,
        Self::MaxMana,
        Self::Attack,
        Self::Defense,
        Self::Speed,
    ];
}

/// An equippable item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquipmentItem {
    pub id: String,
    pub name: String,
    pub slot: EquipSlot,
    #[serde(default)]
    pub stats: BTreeMap<StatKind, i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rarity: Option<Rarity>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub affixes: Vec<String>,
}

impl EquipmentItem {
    pub fn stat(&self, kind: StatKind) -> i32 {
        self.stats.get(&kind).copied().unwrap_or(0)
    }
}

/// Static template for a base item
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BaseItem {
    pub id: &'static str,
    pub name: &'static str,
    pub slot: EquipSlot,
    pub stats: &'static [(StatKind, i32)],
}

impl BaseItem {
    pub fn to_item(&self) -> EquipmentItem {
        EquipmentItem {
            id: self.id.to_string(),
            name: self.name.to_string(),
            slot: self.slot,
            stats: self.stats.iter().copied().collect(),
            rarity: None,
            affixes: Vec::new(),
        }
    }
}

pub const BASE_ITEMS: [BaseItem; 3] = [
    BaseItem {
        id: "twig_blade",
        name: "Twig Blade",
        slot: EquipSlot::Weapon,
        stats: &[(StatKind::Attack, 4)],
    },
    BaseItem {
        id: "cushion_armor",
        name: "Cushion Armor",
        slot: EquipSlot::Armor,
        stats: &[(StatKind::MaxHp, 18), (StatKind::Defense, 3)],
    },
    BaseItem {
        id: "comet_pin",
        name: "Comet Pin",
        slot: EquipSlot::Charm,
        stats: &[(StatKind::MaxMana, 20)],
    },
];

/// Fresh copies of every base item
pub fn starting_pool() -> Vec<EquipmentItem> {
    BASE_ITEMS.iter().map(BaseItem::to_item).collect()
}

/// Worn equipment, one optional item per slot
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EquipmentSlots {
    #[serde(default)]
    pub weapon: Option<EquipmentItem>,
    #[serde(default)]
    pub armor: Option<EquipmentItem>,
    #[serde(default)]
    pub charm: Option<EquipmentItem>,
}

impl EquipmentSlots {
    pub fn get(&self, slot: EquipSlot) -> Option<&EquipmentItem> {
        match slot {
            EquipSlot::Weapon => self.weapon.as_ref(),
            EquipSlot::Armor => self.armor.as_ref(),
            EquipSlot::Charm => self.charm.as_ref(),
        }
    }

    /// Put `item` into its slot, returning whatever was there
    pub fn replace(&mut self, item: EquipmentItem) -> Option<EquipmentItem> {
        let slot = match item.slot {
            EquipSlot::Weapon => &mut self.weapon,
            EquipSlot::Armor => &mut self.armor,
            EquipSlot::Charm => &mut self.charm,
        };
        slot.replace(item)
    }

    pub fn iter(&self) -> impl Iterator<Item = &EquipmentItem> {
        [&self.weapon, &self.armor, &self.charm]
            .into_iter()
            .filter_map(Option::as_ref)
    }

    /// Summed bonus of every worn item for one stat
    pub fn bonus(&self, kind: StatKind) -> i32 {
        self.iter().map(|item| item.stat(kind)).sum()
    }
}
