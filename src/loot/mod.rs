//! Loot rarity and affix roller.
//!
//! A rolled piece is a base item scaled by rarity and enemy level, with 0-3
//! distinct affixes layered on top. The rarity table is cumulative: one
//! uniform draw walks the tiers as a subtraction cursor and falls back to the
//! first tier if it overshoots the total.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::equipment::{EquipmentItem, StatKind};

/// Item rarity, ordered from most to least common
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rarity {
    Common,
    Uncommon,
    Rare,
    Epic,
    Legendary,
}

/// One row of the rarity table
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RarityTier {
    pub rarity: Rarity,
    pub chance: f64,
    pub mult: f64,
    pub color: u32,
}

pub static RARITY_TABLE: [RarityTier; 5] = [
    RarityTier { rarity: Rarity::Common, chance: 0.64, mult: 1.0, color: 0xf3f3f3 },
    RarityTier { rarity: Rarity::Uncommon, chance: 0.23, mult: 1.15, color: 0x7cf8b2 },
    RarityTier { rarity: Rarity::Rare, chance: 0.1, mult: 1.35, color: 0x6cc8ff },
    RarityTier { rarity: Rarity::Epic, chance: 0.025, mult: 1.6, color: 0xcf89ff },
    RarityTier { rarity: Rarity::Legendary, chance: 0.005, mult: 2.0, color: 0xffc46b },
];

impl Rarity {
    pub fn tier(&self) -> &'static RarityTier {
        let index = match self {
            Self::Common => 0,
            Self::Uncommon => 1,
            Self::Rare => 2,
            Self::Epic => 3,
            Self::Legendary => 4,
        };
        &RARITY_TABLE[index]
    }

    pub fn multiplier(&self) -> f64 {
        self.tier().mult
    }

    pub fn color(&self) -> u32 {
        self.tier().color
    }

    /// Number of affixes a piece of this rarity carries
    pub fn affix_slots(&self) -> usize {
        match self {
            Self::Legendary => 3,
            Self::Epic => 2,
            Self::Rare => 1,
            Self::Common | Self::Uncommon => 0,
        }
    }
}

/// Rarity for a single uniform draw in `[0, 1)`
pub fn rarity_from_draw(draw: f64) -> Rarity {
    let mut cursor = draw;
    for tier in &RARITY_TABLE {
        if cursor <= tier.chance {
            return tier.rarity;
        }
        cursor -= tier.chance;
    }
    RARITY_TABLE[0].rarity
}

pub fn roll_rarity<R: Rng + ?Sized>(rng: &mut R) -> Rarity {
    rarity_from_draw(rng.gen::<f64>())
}

/// Named stat bonus stapled onto rare and better drops
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Affix {
    Ferocious,
    Warded,
    Vital,
    Lucid,
    Swift,
}

impl Affix {
    pub const ALL: [Affix; 5] = [
        Self::Ferocious,
        Self::Warded,
        Self::Vital,
        Self::Lucid,
        Self::Swift,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Ferocious => "Ferocious",
            Self::Warded => "Warded",
            Self::Vital => "Vital",
            Self::Lucid => "Lucid",
            Self::Swift => "Swift",
        }
    }

    pub fn bonus(&self) -> (StatKind, i32) {
        match self {
            Self::Ferocious => (StatKind::Attack, 3),
            Self::Warded => (StatKind::Defense, 2),
            Self::Vital => (StatKind::MaxHp, 18),
            Self::Lucid => (StatKind::MaxMana, 16),
            Self::Swift => (StatKind::Speed, 4),
        }
    }
}

/// Distinct affixes for `rarity`, in draw order
pub fn roll_affixes<R: Rng + ?Sized>(rarity: Rarity, rng: &mut R) -> Vec<Affix> {
    Affix::ALL
        .choose_multiple(rng, rarity.affix_slots())
        .copied()
        .collect()
}

/// Build the rolled piece from already drawn rarity and affixes
pub fn apply_roll(base: &EquipmentItem, level: u32, rarity: Rarity, affixes: &[Affix]) -> EquipmentItem {
    let mult = rarity.multiplier();
    let level_scale = 1.0 + level as f64 * 0.05;

    let mut item = base.clone();
    for value in item.stats.values_mut() {
        *value = (*value as f64 * mult * level_scale).round() as i32;
    }
    for affix in affixes {
        let (kind, bonus) = affix.bonus();
        *item.stats.entry(kind).or_insert(0) += (bonus as f64 * mult).round() as i32;
    }

    if let Some(first) = affixes.first() {
        item.name = format!("{} {}", first.label(), base.name);
    }
    item.rarity = Some(rarity);
    item.affixes = affixes.iter().map(|a| a.label().to_string()).collect();
    item
}

/// Roll a full loot piece from `base` for an enemy of `level`
pub fn roll_loot<R: Rng + ?Sized>(base: &EquipmentItem, level: u32, rng: &mut R) -> EquipmentItem {
    let rarity = roll_rarity(rng);
    let affixes = roll_affixes(rarity, rng);
    apply_roll(base, level, rarity, &affixes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::equipment::BASE_ITEMS;
    use crate::rng::sim_rng;

    #[test]
    fn test_cursor_walks_tiers() {
        assert_eq!(rarity_from_draw(0.0), Rarity::Common);
        assert_eq!(rarity_from_draw(0.5), Rarity::Common);
        assert_eq!(rarity_from_draw(0.7), Rarity::Uncommon);
        assert_eq!(rarity_from_draw(0.9), Rarity::Rare);
        assert_eq!(rarity_from_draw(0.98), Rarity::Epic);
        assert_eq!(rarity_from_draw(0.999), Rarity::Legendary);
    }

    #[test]
    fn test_cursor_overshoot_falls_back() {
        assert_eq!(rarity_from_draw(1.5), Rarity::Common);
    }

    #[test]
    fn test_affix_counts_and_uniqueness() {
        let mut rng = sim_rng(5);
        for rarity in [Rarity::Common, Rarity::Uncommon, Rarity::Rare, Rarity::Epic, Rarity::Legendary] {
            for _ in 0..50 {
                let affixes = roll_affixes(rarity, &mut rng);
                assert_eq!(affixes.len(), rarity.affix_slots());
                let mut dedup = affixes.clone();
                dedup.sort_by_key(|a| a.label());
                dedup.dedup();
                assert_eq!(dedup.len(), affixes.len(), "Affixes must not repeat");
            }
        }
    }

    #[test]
    fn test_apply_roll_scales_stats() {
        let blade = BASE_ITEMS[0].to_item();
        // 4 * 1.35 * 1.5 = 8.1 -> 8, ferocious 3 * 1.35 = 4.05 -> 4
        let item = apply_roll(&blade, 10, Rarity::Rare, &[Affix::Ferocious]);
        assert_eq!(item.stat(StatKind::Attack), 12);
        assert_eq!(item.name, "Ferocious Twig Blade");
        assert_eq!(item.rarity, Some(Rarity::Rare));
        assert_eq!(item.affixes, vec!["Ferocious".to_string()]);
        assert_eq!(item.id, "twig_blade");
    }

    #[test]
    fn test_apply_roll_common_keeps_name() {
        let armor = BASE_ITEMS[1].to_item();
        let item = apply_roll(&armor, 0, Rarity::Common, &[]);
        assert_eq!(item.name, "Cushion Armor");
        assert_eq!(item.stat(StatKind::MaxHp), 18);
        assert_eq!(item.stat(StatKind::Defense), 3);
    }

    #[test]
    fn test_affix_adds_new_stat() {
        let pin = BASE_ITEMS[2].to_item();
        let item = apply_roll(&pin, 0, Rarity::Legendary, &[Affix::Swift, Affix::Vital, Affix::Lucid]);
        assert_eq!(item.stat(StatKind::Speed), 8);
        assert_eq!(item.stat(StatKind::MaxHp), 36);
        assert_eq!(item.stat(StatKind::MaxMana), 40 + 32);
    }

    #[test]
    fn test_rarity_distribution_converges() {
        let mut rng = sim_rng(99);
        let rolls = 100_000;
        let mut counts = [0usize; 5];
        for _ in 0..rolls {
            counts[roll_rarity(&mut rng) as usize] += 1;
        }
        for (tier, count) in RARITY_TABLE.iter().zip(counts) {
            let observed = count as f64 / rolls as f64;
            let tolerance = (tier.chance * 0.15).max(0.002);
            assert!(
                (observed - tier.chance).abs() < tolerance,
                "{:?}: observed {observed}, expected {}",
                tier.rarity,
                tier.chance
            );
        }
    }
}
