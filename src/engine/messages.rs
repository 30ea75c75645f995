use serde::{Deserialize, Serialize};

use crate::generation::{ModifierId, RegionId};
use crate::monster::{EnemyKind, Intent};
use crate::progression::UpgradeId;
use crate::quest::QuestId;
use crate::world::{NpcId, ZoneId};

// =====================================================
// Events drained by the presentation layer
// =====================================================

/// Something the HUD, audio or log may want to react to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SimEvent {
    ZoneChanged {
        from: ZoneId,
        to: ZoneId,
    },
    ExitLocked {
        message: String,
    },
    EnemyDefeated {
        kind: EnemyKind,
        level: u32,
        xp: u32,
        gold: u32,
    },
    BossEnraged {
        kind: EnemyKind,
    },
    IntentTriggered {
        kind: EnemyKind,
        intent: Intent,
    },
    ItemPickedUp {
        item: String,
    },
    LevelUp {
        level: u32,
    },
    QuestCompleted {
        quest: QuestId,
        xp: u32,
        gold: u32,
    },
    NpcDialogue {
        npc: NpcId,
        line: String,
    },
    DungeonStarted {
        id: String,
        region: RegionId,
        rank: u32,
        modifiers: Vec<ModifierId>,
    },
    DungeonCleared {
        id: String,
        gold: u32,
    },
    TownUpgraded {
        upgrade: UpgradeId,
        rank: u32,
    },
    PartyWiped,
}

// =====================================================
// Passive view for rendering and HUD
// =====================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberView {
    pub name: String,
    pub level: u32,
    pub hp: f32,
    pub max_hp: f32,
    pub mana: f32,
    pub max_mana: f32,
    pub x: f32,
    pub y: f32,
    pub color: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HudSnapshot {
    pub zone: ZoneId,
    pub zone_name: String,
    pub active_index: usize,
    pub members: Vec<MemberView>,
    pub enemies_alive: usize,
    pub particles: usize,
    pub combo: u32,
    pub gold: u32,
    pub xp: u32,
    pub level_xp: u32,
    pub talent_points: u32,
    pub tracker: Vec<String>,
}
