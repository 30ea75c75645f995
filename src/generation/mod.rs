//! Seeded dungeon run generation.
//!
//! Run = Seed x Region theme x Rank.
//! Every random draw comes from one `Mulberry32` stream in a fixed order
//! (layout, modifiers, packs), so a seed always rebuilds the same run.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::logging::TimingSpan;
use crate::monster::EnemyKind;
use crate::persistence::{field_u64, Persistent};
use crate::rng::{derive_run_seed, Mulberry32};
use crate::world::{Exit, Point, Rect, SpawnPack, Zone, ZoneId};

/// Obstacles scattered per layout
pub const BLOCKER_COUNT: usize = 10;

/// Upper bound on rolled modifiers
pub const MAX_MODIFIERS: usize = 4;

/// Run-wide enemy buffs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModifierId {
    Fortified,
    Fury,
    Plague,
    Haste,
    Volatility,
}

impl ModifierId {
    /// Roll order of the pool
    pub const POOL: [ModifierId; 5] = [
        Self::Fortified,
        Self::Fury,
        Self::Plague,
        Self::Haste,
        Self::Volatility,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Fortified => "Fortified",
            Self::Fury => "Fury",
            Self::Plague => "Plague Mist",
            Self::Haste => "Haste",
            Self::Volatility => "Volatility",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Fortified => "Enemies gain +18% max HP.",
            Self::Fury => "Enemies gain +14% attack.",
            Self::Plague => "Enemy attacks can poison.",
            Self::Haste => "Enemies move +16% faster.",
            Self::Volatility => "Boss enters burst phases.",
        }
    }

    /// Threat score shown on the run card
    pub fn score(&self) -> u32 {
        match self {
            Self::Volatility => 2,
            _ => 1,
        }
    }

    /// Relative roll weight
    pub fn weight(&self) -> u32 {
        1
    }
}

/// Region themes a run can be generated from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegionId {
    #[default]
    Meadow,
    Caverns,
    Ruins,
}

/// Palette and enemy pool for a region
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegionTheme {
    pub name: &'static str,
    pub palette: (u32, u32),
    pub enemies: &'static [EnemyKind],
}

impl RegionId {
    pub fn theme(&self) -> RegionTheme {
        match self {
            Self::Meadow => RegionTheme {
                name: "Verdant Wilds",
                palette: (0x86ebac, 0x6abfff),
                enemies: &[EnemyKind::Slime, EnemyKind::Bat, EnemyKind::Mushroom],
            },
            Self::Caverns => RegionTheme {
                name: "Violet Caverns",
                palette: (0x6c78ff, 0xae82ff),
                enemies: &[EnemyKind::Bat, EnemyKind::Mushroom, EnemyKind::Wraith],
            },
            Self::Ruins => RegionTheme {
                name: "Sunken Ruins",
                palette: (0x84d1c5, 0x7fb1ff),
                enemies: &[EnemyKind::Slime, EnemyKind::Wraith, EnemyKind::Sentinel],
            },
        }
    }
}

/// One generated dungeon run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DungeonRun {
    pub id: String,
    pub rank: u32,
    pub region: RegionId,
    pub seed: u32,
    pub modifiers: Vec<ModifierId>,
    pub zone: Zone,
    pub completed: bool,
}

impl DungeonRun {
    /// Sum of modifier threat scores
    pub fn threat(&self) -> u32 {
        self.modifiers.iter().map(|m| m.score()).sum()
    }
}

/// How many modifiers a rank rolls
pub fn modifier_count(rank: u32) -> usize {
    (1 + rank as usize / 3).min(MAX_MODIFIERS)
}

/// How many regular packs a rank rolls (the boss pack comes on top)
pub fn pack_count(rank: u32) -> usize {
    10 + rank as usize * 2
}

/// Distinct modifiers drawn by weight
pub fn roll_modifiers(rank: u32, rng: &mut Mulberry32) -> Vec<ModifierId> {
    let wanted = modifier_count(rank).min(ModifierId::POOL.len());
    let total: u32 = ModifierId::POOL.iter().map(|m| m.weight()).sum();
    let mut selected = Vec::with_capacity(wanted);

    while selected.len() < wanted {
        let mut cursor = rng.next_f64() * total as f64;
        let mut pick = ModifierId::POOL[0];
        for m in ModifierId::POOL {
            let w = m.weight() as f64;
            if cursor < w {
                pick = m;
                break;
            }
            cursor -= w;
        }
        if !selected.contains(&pick) {
            selected.push(pick);
        }
    }
    selected
}

fn build_layout(theme: &RegionTheme, run_index: u32, rng: &mut Mulberry32) -> Zone {
    let width = 1800.0 + (rng.next_f64() * 450.0).floor();
    let height = 1600.0 + (rng.next_f64() * 400.0).floor();

    let blockers = (0..BLOCKER_COUNT)
        .map(|_| {
            let bw = 140.0 + (rng.next_f64() * 260.0).floor();
            let bh = 90.0 + (rng.next_f64() * 200.0).floor();
            let x = 140.0 + rng.next_f64() * (width - bw - 280.0);
            let y = 140.0 + rng.next_f64() * (height - bh - 280.0);
            Rect::new(x as f32, y as f32, bw as f32, bh as f32)
        })
        .collect();

    Zone {
        id: ZoneId::Dungeon,
        name: format!("{} Depth {}", theme.name, run_index),
        width: width as f32,
        height: height as f32,
        palette: theme.palette,
        blockers,
        exits: vec![Exit {
            rect: Rect::new(22.0, 22.0, 130.0, 130.0),
            to: ZoneId::Town,
            spawn: Point::new(1380.0, 1400.0),
            requires_area: None,
            locked_message: None,
        }],
        npcs: Vec::new(),
        spawns: Vec::new(),
    }
}

fn roll_packs(theme: &RegionTheme, rank: u32, rng: &mut Mulberry32) -> Vec<SpawnPack> {
    let mut packs: Vec<SpawnPack> = (0..pack_count(rank))
        .map(|_| {
            let kind = theme.enemies[rng.pick(theme.enemies.len())];
            let count = 1 + (rng.next_f64() * (1.0 + rank as f64 * 0.35)).floor() as u32;
            let level = 1 + rank + (rng.next_f64() * 2.0).floor() as u32;
            SpawnPack::new(kind, count, level)
        })
        .collect();
    packs.push(SpawnPack::new(EnemyKind::Boss, 1, 2 + rank));
    packs
}

/// Produces runs and remembers the current one
#[derive(Debug, Clone, PartialEq)]
pub struct DungeonGenerator {
    pub run_index: u32,
    pub current_run: Option<DungeonRun>,
}

impl Default for DungeonGenerator {
    fn default() -> Self {
        Self {
            run_index: 1,
            current_run: None,
        }
    }
}

impl DungeonGenerator {
    /// Build a run from an explicit seed. Deterministic in (seed, region,
    /// rank, run_index); advances the run index.
    pub fn create_run(&mut self, seed: u32, region: RegionId, rank: u32) -> &DungeonRun {
        let _timing = TimingSpan::new("create_run");
        let mut rng = Mulberry32::new(seed);
        let theme = region.theme();

        let mut zone = build_layout(&theme, self.run_index, &mut rng);
        let modifiers = roll_modifiers(rank, &mut rng);
        zone.spawns = roll_packs(&theme, rank, &mut rng);

        let run = DungeonRun {
            id: format!("run-{}", self.run_index),
            rank,
            region,
            seed,
            modifiers,
            zone,
            completed: false,
        };
        info!(
            id = %run.id,
            seed,
            ?region,
            rank,
            modifiers = ?run.modifiers,
            packs = run.zone.spawns.len(),
            "Dungeon run created"
        );
        self.run_index += 1;
        self.current_run.insert(run)
    }

    /// Build a run seeded from the world seed and the current run index
    pub fn create_seeded_run(&mut self, world_seed: u64, region: RegionId, rank: u32) -> &DungeonRun {
        let seed = derive_run_seed(world_seed, self.run_index);
        self.create_run(seed, region, rank)
    }

    /// Mark the current run cleared. Returns false when there is nothing to
    /// complete or it was already completed.
    pub fn complete_run(&mut self) -> bool {
        match self.current_run.as_mut() {
            Some(run) if !run.completed => {
                run.completed = true;
                info!(id = %run.id, "Dungeon run completed");
                true
            }
            _ => false,
        }
    }
}

impl Persistent for DungeonGenerator {
    fn serialize_state(&self) -> Value {
        json!({
            "run_index": self.run_index,
            "current_run": self.current_run,
        })
    }

    fn hydrate(&mut self, data: &Value) {
        let defaults = Self::default();
        self.run_index = field_u64(data, "run_index", defaults.run_index as u64).max(1) as u32;
        self.current_run = match data.get("current_run") {
            None | Some(Value::Null) => None,
            Some(raw) => match serde_json::from_value::<DungeonRun>(raw.clone()) {
                Ok(run) => Some(run),
                Err(e) => {
                    warn!(error = %e, "Discarding malformed saved dungeon run");
                    None
                }
            },
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_run() {
        let mut a = DungeonGenerator::default();
        let mut b = DungeonGenerator::default();
        let run_a = a.create_run(12345, RegionId::Caverns, 3).clone();
        let run_b = b.create_run(12345, RegionId::Caverns, 3).clone();
        assert_eq!(run_a, run_b, "Same seed+region+rank must rebuild the same run");
    }

    #[test]
    fn test_different_seeds_differ() {
        let mut gen = DungeonGenerator::default();
        let a = gen.create_run(1, RegionId::Meadow, 1).zone.clone();
        let mut gen = DungeonGenerator::default();
        let b = gen.create_run(2, RegionId::Meadow, 1).zone.clone();
        assert_ne!(a.blockers, b.blockers);
    }

    #[test]
    fn test_layout_bounds() {
        let mut gen = DungeonGenerator::default();
        for seed in 0..50 {
            let zone = &gen.create_run(seed, RegionId::Ruins, 2).zone;
            assert!((1800.0..2250.0).contains(&zone.width));
            assert!((1600.0..2000.0).contains(&zone.height));
            assert_eq!(zone.blockers.len(), BLOCKER_COUNT);
            for b in &zone.blockers {
                assert!(b.x >= 140.0 && b.y >= 140.0);
                assert!(b.x + b.w <= zone.width - 140.0 + 0.01);
                assert!(b.y + b.h <= zone.height - 140.0 + 0.01);
            }
        }
    }

    #[test]
    fn test_pack_table_shape() {
        let mut gen = DungeonGenerator::default();
        let rank = 4;
        let run = gen.create_run(777, RegionId::Meadow, rank);
        let spawns = &run.zone.spawns;
        assert_eq!(spawns.len(), pack_count(rank) + 1);

        let boss = spawns.last().copied();
        assert_eq!(boss, Some(SpawnPack::new(EnemyKind::Boss, 1, 2 + rank)));

        let pool = RegionId::Meadow.theme().enemies;
        for pack in &spawns[..spawns.len() - 1] {
            assert!(pool.contains(&pack.kind));
            assert!((1 + rank..=2 + rank).contains(&pack.level));
            assert!(pack.count >= 1);
        }
    }

    #[test]
    fn test_modifier_count_by_rank() {
        assert_eq!(modifier_count(1), 1);
        assert_eq!(modifier_count(3), 2);
        assert_eq!(modifier_count(6), 3);
        assert_eq!(modifier_count(40), 4);

        let mut rng = Mulberry32::new(5);
        let mods = roll_modifiers(12, &mut rng);
        assert_eq!(mods.len(), 4);
        for (i, m) in mods.iter().enumerate() {
            assert!(!mods[i + 1..].contains(m), "Modifiers must not repeat");
        }
    }

    #[test]
    fn test_run_index_names_zone() {
        let mut gen = DungeonGenerator::default();
        gen.create_run(1, RegionId::Meadow, 1);
        let run = gen.create_run(1, RegionId::Caverns, 1);
        assert_eq!(run.id, "run-2");
        assert_eq!(run.zone.name, "Violet Caverns Depth 2");
        assert_eq!(gen.run_index, 3);
    }

    #[test]
    fn test_complete_run_once() {
        let mut gen = DungeonGenerator::default();
        assert!(!gen.complete_run());
        gen.create_run(9, RegionId::Meadow, 1);
        assert!(gen.complete_run());
        assert!(!gen.complete_run());
    }

    #[test]
    fn test_seeded_runs_repeat_per_world_seed() {
        let mut a = DungeonGenerator::default();
        let mut b = DungeonGenerator::default();
        let ra = a.create_seeded_run(42, RegionId::Meadow, 2).clone();
        let rb = b.create_seeded_run(42, RegionId::Meadow, 2).clone();
        assert_eq!(ra, rb);
    }

    #[test]
    fn test_hydrate_tolerates_garbage() {
        let mut gen = DungeonGenerator::default();
        gen.hydrate(&json!({ "run_index": "seven", "current_run": { "id": 4 } }));
        assert_eq!(gen.run_index, 1);
        assert!(gen.current_run.is_none());
    }

    #[test]
    fn test_state_round_trip() {
        let mut gen = DungeonGenerator::default();
        gen.create_run(31337, RegionId::Ruins, 5);
        let saved = gen.serialize_state();

        let mut restored = DungeonGenerator::default();
        restored.hydrate(&saved);
        assert_eq!(restored, gen);
    }
}
