//! Quest table, unlock graph and per-save quest state.
//!
//! Quests are static data. Completing one activates its successors, so the
//! table forms a directed graph that must stay acyclic: a cycle would let a
//! completed quest re-activate itself.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::OnceLock;

use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use crate::monster::EnemyKind;
use crate::party::inventory::Inventory;
use crate::persistence::{decode_list, field_array, field_object, Persistent};
use crate::world::{AreaId, NpcId};

// =====================================================
// Static quest data
// =====================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum QuestId {
    #[serde(rename = "chef_collect")]
    ChefCollect,
    #[serde(rename = "chef_collect_2")]
    ChefCollect2,
    #[serde(rename = "smith_delivery")]
    SmithDelivery,
    #[serde(rename = "smith_hunt_2")]
    SmithHunt2,
    #[serde(rename = "mayor_clearance")]
    MayorClearance,
    #[serde(rename = "mayor_chef_slime")]
    MayorChefSlime,
    #[serde(rename = "main_2")]
    Main2,
}

impl QuestId {
    pub const ALL: [QuestId; 7] = [
        Self::ChefCollect,
        Self::ChefCollect2,
        Self::SmithDelivery,
        Self::SmithHunt2,
        Self::MayorClearance,
        Self::MayorChefSlime,
        Self::Main2,
    ];

    pub fn def(&self) -> &'static QuestDef {
        let index = match self {
            Self::ChefCollect => 0,
            Self::ChefCollect2 => 1,
            Self::SmithDelivery => 2,
            Self::SmithHunt2 => 3,
            Self::MayorClearance => 4,
            Self::MayorChefSlime => 5,
            Self::Main2 => 6,
        };
        &QUESTS[index]
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Objective {
    /// Pick up `count` of an item
    Collect { item: &'static str, count: u32 },
    /// Defeat each listed kind up to its cap
    Kill { targets: &'static [(EnemyKind, u32)] },
}

impl Objective {
    pub fn required(&self) -> u32 {
        match self {
            Self::Collect { count, .. } => *count,
            Self::Kill { targets } => targets.iter().map(|(_, cap)| cap).sum(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuestReward {
    pub xp: u32,
    pub gold: u32,
    pub items: &'static [(&'static str, u32)],
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuestDef {
    pub id: QuestId,
    pub title: &'static str,
    pub description: &'static str,
    pub objective: Objective,
    /// `None` means the quest completes on its own once the objective is met
    pub turn_in: Option<NpcId>,
    pub reward: QuestReward,
    pub next: &'static [QuestId],
    pub unlock_shop: Option<NpcId>,
    pub unlock_areas: &'static [AreaId],
}

pub static QUESTS: [QuestDef; 7] = [
    QuestDef {
        id: QuestId::ChefCollect,
        title: "Chef Special",
        description: "Collect 3 Slime Gel and return to Chef Truffle.",
        objective: Objective::Collect { item: "Slime Gel", count: 3 },
        turn_in: Some(NpcId::Chef),
        reward: QuestReward { xp: 45, gold: 30, items: &[] },
        next: &[QuestId::SmithDelivery, QuestId::ChefCollect2],
        unlock_shop: Some(NpcId::Chef),
        unlock_areas: &[AreaId::North],
    },
    QuestDef {
        id: QuestId::ChefCollect2,
        title: "Chef Encore",
        description: "Collect 5 Slime Gel for Chef Truffle's deluxe stock.",
        objective: Objective::Collect { item: "Slime Gel", count: 5 },
        turn_in: Some(NpcId::Chef),
        reward: QuestReward { xp: 65, gold: 45, items: &[("Potion", 1)] },
        next: &[],
        unlock_shop: None,
        unlock_areas: &[],
    },
    QuestDef {
        id: QuestId::SmithDelivery,
        title: "Northern Pickup",
        description: "Travel to Frostcrag North, pick up the Frost Coil, and return to Smith Bop.",
        objective: Objective::Collect { item: "Frost Coil", count: 1 },
        turn_in: Some(NpcId::Smith),
        reward: QuestReward { xp: 30, gold: 20, items: &[] },
        next: &[QuestId::MayorClearance, QuestId::SmithHunt2],
        unlock_shop: Some(NpcId::Smith),
        unlock_areas: &[AreaId::West],
    },
    QuestDef {
        id: QuestId::SmithHunt2,
        title: "Northern Forge Trial",
        description: "Travel to Frostcrag North and defeat 3 Rocklings, 3 Wobble Mages, and 3 Silkweavers.",
        objective: Objective::Kill {
            targets: &[
                (EnemyKind::Rockling, 3),
                (EnemyKind::WobbleMage, 3),
                (EnemyKind::Silkweaver, 3),
            ],
        },
        turn_in: Some(NpcId::Smith),
        reward: QuestReward { xp: 70, gold: 50, items: &[("Hi-Potion", 1)] },
        next: &[],
        unlock_shop: None,
        unlock_areas: &[],
    },
    QuestDef {
        id: QuestId::MayorClearance,
        title: "Mayor's Clearance",
        description: "Clear the West Wilds by defeating 3 Puff Zombies, 3 Rune Sentinels, and 3 Pocket Drakes, then report to Mayor Puffle.",
        objective: Objective::Kill {
            targets: &[
                (EnemyKind::PuffZombie, 3),
                (EnemyKind::RuneSentinel, 3),
                (EnemyKind::PocketDrake, 3),
            ],
        },
        turn_in: Some(NpcId::Mayor),
        reward: QuestReward { xp: 80, gold: 45, items: &[("Potion", 2)] },
        next: &[QuestId::MayorChefSlime, QuestId::Main2],
        unlock_shop: None,
        unlock_areas: &[AreaId::SouthMeadow, AreaId::Caverns],
    },
    QuestDef {
        id: QuestId::MayorChefSlime,
        title: "Kitchen Calamity",
        description: "Head south of Sunny Meadow and defeat The Chef Slime.",
        objective: Objective::Kill { targets: &[(EnemyKind::ChefSlime, 1)] },
        turn_in: Some(NpcId::Mayor),
        reward: QuestReward { xp: 140, gold: 90, items: &[("Elixir", 1)] },
        next: &[],
        unlock_shop: None,
        unlock_areas: &[],
    },
    QuestDef {
        id: QuestId::Main2,
        title: "Cavern Cleanup",
        description: "Defeat the Giggle Cavern boss.",
        objective: Objective::Kill { targets: &[(EnemyKind::Boss, 1)] },
        turn_in: None,
        reward: QuestReward { xp: 180, gold: 120, items: &[("Elixir", 1)] },
        next: &[],
        unlock_shop: None,
        unlock_areas: &[],
    },
];

// =====================================================
// Unlock graph
// =====================================================

/// Quest unlock edges as a directed graph
#[derive(Debug, Clone)]
pub struct QuestGraph {
    graph: DiGraph<QuestId, ()>,
    nodes: BTreeMap<QuestId, NodeIndex>,
}

impl QuestGraph {
    pub fn from_defs(defs: &[QuestDef]) -> Self {
        let mut graph = DiGraph::new();
        let mut nodes = BTreeMap::new();
        for def in defs {
            nodes.insert(def.id, graph.add_node(def.id));
        }
        for def in defs {
            for next in def.next {
                if let (Some(&from), Some(&to)) = (nodes.get(&def.id), nodes.get(next)) {
                    graph.add_edge(from, to, ());
                }
            }
        }
        Self { graph, nodes }
    }

    /// Topological order, or the quest sitting on a cycle
    pub fn validate(&self) -> Result<Vec<QuestId>, QuestId> {
        toposort(&self.graph, None)
            .map(|order| order.into_iter().map(|n| self.graph[n]).collect())
            .map_err(|cycle| self.graph[cycle.node_id()])
    }

    /// Quests activated by completing `id`, in table order
    pub fn successors(&self, id: QuestId) -> Vec<QuestId> {
        self.neighbors(id, Direction::Outgoing)
    }

    /// Quests whose completion activates `id`
    pub fn prerequisites(&self, id: QuestId) -> Vec<QuestId> {
        self.neighbors(id, Direction::Incoming)
    }

    fn neighbors(&self, id: QuestId, dir: Direction) -> Vec<QuestId> {
        let Some(&node) = self.nodes.get(&id) else {
            return Vec::new();
        };
        let mut out: Vec<QuestId> = self
            .graph
            .neighbors_directed(node, dir)
            .map(|n| self.graph[n])
            .collect();
        // petgraph walks edges newest first
        out.reverse();
        out
    }
}

/// The graph for the built-in quest table
pub fn quest_graph() -> &'static QuestGraph {
    static GRAPH: OnceLock<QuestGraph> = OnceLock::new();
    GRAPH.get_or_init(|| QuestGraph::from_defs(&QUESTS))
}

// =====================================================
// Runtime state
// =====================================================

/// Progress on one active quest
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestProgress {
    #[serde(default)]
    pub progress: u32,
    /// Per-kind kill counts for kill objectives
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub tracked: BTreeMap<EnemyKind, u32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct QuestSystem {
    active: BTreeMap<QuestId, QuestProgress>,
    completed: BTreeSet<QuestId>,
    unlocked_shops: BTreeSet<NpcId>,
    unlocked_areas: BTreeSet<AreaId>,
}

impl Default for QuestSystem {
    fn default() -> Self {
        let mut quests = Self {
            active: BTreeMap::new(),
            completed: BTreeSet::new(),
            unlocked_shops: BTreeSet::new(),
            unlocked_areas: Self::starting_areas(),
        };
        quests.add_quest(QuestId::ChefCollect);
        quests
    }
}

impl QuestSystem {
    fn starting_areas() -> BTreeSet<AreaId> {
        BTreeSet::from([AreaId::Town, AreaId::Meadow])
    }

    /// Activate a quest unless it is already active or done
    pub fn add_quest(&mut self, id: QuestId) -> bool {
        if self.active.contains_key(&id) || self.completed.contains(&id) {
            return false;
        }
        self.active.insert(id, QuestProgress::default());
        debug!(quest = ?id, "Quest activated");
        true
    }

    pub fn is_active(&self, id: QuestId) -> bool {
        self.active.contains_key(&id)
    }

    pub fn is_completed(&self, id: QuestId) -> bool {
        self.completed.contains(&id)
    }

    pub fn progress(&self, id: QuestId) -> Option<&QuestProgress> {
        self.active.get(&id)
    }

    pub fn active_quests(&self) -> impl Iterator<Item = QuestId> + '_ {
        self.active.keys().copied()
    }

    /// Count a kill toward every active kill quest that lists `kind`
    pub fn on_enemy_defeated(&mut self, kind: EnemyKind) {
        for (id, state) in self.active.iter_mut() {
            let Objective::Kill { targets } = id.def().objective else {
                continue;
            };
            let Some(&(_, cap)) = targets.iter().find(|(k, _)| *k == kind) else {
                continue;
            };
            let count = state.tracked.entry(kind).or_insert(0);
            *count = (*count + 1).min(cap);
            state.progress = targets
                .iter()
                .map(|(k, cap)| state.tracked.get(k).copied().unwrap_or(0).min(*cap))
                .sum();
        }
    }

    /// Count a pickup toward every active collect quest for `name`
    pub fn on_item_collected(&mut self, name: &str) {
        for (id, state) in self.active.iter_mut() {
            if let Objective::Collect { item, count } = id.def().objective {
                if item == name {
                    state.progress = (state.progress + 1).min(count);
                }
            }
        }
    }

    fn objective_met(&self, id: QuestId) -> bool {
        self.active
            .get(&id)
            .is_some_and(|state| state.progress >= id.def().objective.required())
    }

    /// Ready to claim, optionally checking the turn-in NPC
    pub fn can_turn_in(&self, id: QuestId, npc: Option<NpcId>) -> bool {
        if let (Some(required), Some(npc)) = (id.def().turn_in, npc) {
            if required != npc {
                return false;
            }
        }
        self.objective_met(id)
    }

    /// Complete a quest: pay gold and items into `inventory`, apply unlocks
    /// and activate successors. Returns the reward so the caller can grant XP.
    pub fn claim(&mut self, id: QuestId, inventory: &mut Inventory) -> Option<QuestReward> {
        if !self.objective_met(id) {
            return None;
        }
        let def = id.def();
        self.active.remove(&id);
        self.completed.insert(id);

        inventory.add_gold(def.reward.gold);
        for (name, count) in def.reward.items {
            inventory.add_item(name, *count);
        }
        if let Some(shop) = def.unlock_shop {
            self.unlocked_shops.insert(shop);
        }
        for area in def.unlock_areas {
            self.unlock_area(*area);
        }
        for next in quest_graph().successors(id) {
            self.add_quest(next);
        }

        info!(quest = ?id, title = def.title, "Quest completed");
        Some(def.reward)
    }

    /// First claimable quest for `npc`
    pub fn turn_in_quest_for(&self, npc: NpcId) -> Option<QuestId> {
        self.active
            .keys()
            .copied()
            .find(|id| id.def().turn_in == Some(npc) && self.objective_met(*id))
    }

    /// First active quest handed in to `npc`, complete or not
    pub fn active_quest_for(&self, npc: NpcId) -> Option<QuestId> {
        self.active
            .keys()
            .copied()
            .find(|id| id.def().turn_in == Some(npc))
    }

    /// Completed quests with no turn-in NPC, ready to be claimed by the loop
    pub fn auto_claimable(&self) -> Vec<QuestId> {
        self.active
            .keys()
            .copied()
            .filter(|id| id.def().turn_in.is_none() && self.objective_met(*id))
            .collect()
    }

    pub fn is_shop_unlocked(&self, shop: NpcId) -> bool {
        self.unlocked_shops.contains(&shop)
    }

    pub fn is_area_unlocked(&self, area: AreaId) -> bool {
        self.unlocked_areas.contains(&area)
    }

    pub fn unlock_area(&mut self, area: AreaId) -> bool {
        let added = self.unlocked_areas.insert(area);
        if added {
            info!(area = ?area, "Area unlocked");
        }
        added
    }

    /// One HUD line per active quest
    pub fn tracker_lines(&self) -> Vec<String> {
        self.active
            .iter()
            .map(|(id, state)| {
                let def = id.def();
                match def.objective {
                    Objective::Kill { targets } if targets.len() > 1 => {
                        let parts: Vec<String> = targets
                            .iter()
                            .map(|(kind, cap)| {
                                let done = state.tracked.get(kind).copied().unwrap_or(0);
                                format!("{}s {}/{}", kind.display_name(), done, cap)
                            })
                            .collect();
                        format!("{}: {}", def.title, parts.join(" • "))
                    }
                    objective => {
                        format!("{}: {}/{}", def.title, state.progress, objective.required())
                    }
                }
            })
            .collect()
    }
}

impl Persistent for QuestSystem {
    fn serialize_state(&self) -> Value {
        json!({
            "active": self.active,
            "completed": self.completed,
            "unlocked_shops": self.unlocked_shops,
            "unlocked_areas": self.unlocked_areas,
        })
    }

    fn hydrate(&mut self, data: &Value) {
        if !data.is_object() {
            return;
        }

        self.completed = decode_list::<QuestId>(field_array(data, "completed"))
            .into_iter()
            .collect();
        self.unlocked_shops = decode_list::<NpcId>(field_array(data, "unlocked_shops"))
            .into_iter()
            .collect();
        let areas: BTreeSet<AreaId> = decode_list::<AreaId>(field_array(data, "unlocked_areas"))
            .into_iter()
            .collect();
        self.unlocked_areas = if areas.is_empty() {
            Self::starting_areas()
        } else {
            areas
        };

        self.active.clear();
        if let Some(active) = field_object(data, "active") {
            for (key, state) in active {
                let id = serde_json::from_value::<QuestId>(Value::String(key.clone()));
                let state = serde_json::from_value::<QuestProgress>(state.clone());
                match (id, state) {
                    (Ok(id), Ok(mut state)) if !self.completed.contains(&id) => {
                        state.progress = state.progress.min(id.def().objective.required());
                        self.active.insert(id, state);
                    }
                    (Ok(_), Ok(_)) => {}
                    _ => warn!(quest = %key, "Dropping malformed saved quest"),
                }
            }
        }
    }
}
