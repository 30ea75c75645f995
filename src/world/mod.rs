//! Zones, exits, NPCs and collision.
//!
//! Four hand-authored zones plus one dynamic dungeon zone supplied by the
//! generator. Zone geometry is plain serde data so a generated dungeon can be
//! saved with its run.

use bevy::color::Color;
use bevy::math::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::monster::EnemyKind;

/// Anything that can clamp a circle into walkable space
pub trait CollisionQuery {
    fn resolve_collision(&self, position: Vec2, radius: f32) -> Vec2;
}

/// Serializable point
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

impl From<Point> for Vec2 {
    fn from(p: Point) -> Self {
        Vec2::new(p.x, p.y)
    }
}

impl From<Vec2> for Point {
    fn from(v: Vec2) -> Self {
        Self::new(v.x, v.y)
    }
}

/// Axis-aligned rectangle, origin at the top-left corner
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    /// Strict interior test
    pub fn contains(&self, p: Vec2) -> bool {
        p.x > self.x && p.x < self.x + self.w && p.y > self.y && p.y < self.y + self.h
    }

    pub fn closest_point(&self, p: Vec2) -> Vec2 {
        Vec2::new(
            p.x.clamp(self.x, self.x + self.w),
            p.y.clamp(self.y, self.y + self.h),
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZoneId {
    Town,
    Meadow,
    North,
    West,
    SouthMeadow,
    Caverns,
    Ruins,
    Dungeon,
}

impl ZoneId {
    /// Hand-authored zones that repopulate after being cleared
    pub fn respawns(&self) -> bool {
        !matches!(self, Self::Town | Self::Dungeon)
    }

    /// Where the party stands when a session starts here or a wipe sends it home
    pub fn arrival_point(&self) -> Point {
        match self {
            Self::Town => Point::new(760.0, 1320.0),
            Self::Meadow | Self::Dungeon => Point::new(180.0, 180.0),
            Self::North => Point::new(1000.0, 1560.0),
            Self::West => Point::new(1760.0, 900.0),
            Self::SouthMeadow => Point::new(1000.0, 200.0),
            Self::Caverns => Point::new(1520.0, 250.0),
            Self::Ruins => Point::new(260.0, 1380.0),
        }
    }
}

/// Gate keys for exits, unlocked by quests and upgrades
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AreaId {
    Town,
    Meadow,
    North,
    West,
    SouthMeadow,
    Caverns,
    Ruins,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NpcId {
    Mayor,
    Chef,
    Smith,
    Scout,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exit {
    pub rect: Rect,
    pub to: ZoneId,
    pub spawn: Point,
    #[serde(default)]
    pub requires_area: Option<AreaId>,
    #[serde(default)]
    pub locked_message: Option<String>,
}

impl Exit {
    fn open(rect: Rect, to: ZoneId, spawn: Point) -> Self {
        Self {
            rect,
            to,
            spawn,
            requires_area: None,
            locked_message: None,
        }
    }

    fn gated(rect: Rect, to: ZoneId, spawn: Point, area: AreaId, message: &str) -> Self {
        Self {
            requires_area: Some(area),
            locked_message: Some(message.to_string()),
            ..Self::open(rect, to, spawn)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Npc {
    pub id: NpcId,
    pub name: String,
    pub position: Point,
    pub lines: Vec<String>,
}

impl Npc {
    fn new(id: NpcId, name: &str, position: Point, lines: &[&str]) -> Self {
        Self {
            id,
            name: name.to_string(),
            position,
            lines: lines.iter().map(|l| l.to_string()).collect(),
        }
    }
}

/// One row of a zone's spawn table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpawnPack {
    pub kind: EnemyKind,
    pub count: u32,
    pub level: u32,
}

impl SpawnPack {
    pub const fn new(kind: EnemyKind, count: u32, level: u32) -> Self {
        Self { kind, count, level }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    pub id: ZoneId,
    pub name: String,
    pub width: f32,
    pub height: f32,
    /// Background gradient, sRGB hex
    pub palette: (u32, u32),
    pub blockers: Vec<Rect>,
    pub exits: Vec<Exit>,
    pub npcs: Vec<Npc>,
    pub spawns: Vec<SpawnPack>,
}

impl Zone {
    pub fn exit_at(&self, p: Vec2) -> Option<&Exit> {
        self.exits.iter().find(|e| e.rect.contains(p))
    }

    /// Closest NPC strictly inside `range`
    pub fn nearest_npc(&self, p: Vec2, range: f32) -> Option<&Npc> {
        self.npcs
            .iter()
            .map(|npc| (npc, Vec2::from(npc.position).distance(p)))
            .filter(|(_, d)| *d < range)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(npc, _)| npc)
    }

    /// Random spawn point with a 120 unit border margin
    pub fn random_spawn_point<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec2 {
        Vec2::new(
            120.0 + rng.gen::<f32>() * (self.width - 240.0).max(0.0),
            120.0 + rng.gen::<f32>() * (self.height - 240.0).max(0.0),
        )
    }

    pub fn total_enemies(&self) -> u32 {
        self.spawns.iter().map(|p| p.count).sum()
    }

    pub fn colors(&self) -> (Color, Color) {
        (hex_color(self.palette.0), hex_color(self.palette.1))
    }
}

pub fn hex_color(hex: u32) -> Color {
    Color::srgb_u8((hex >> 16) as u8, (hex >> 8) as u8, hex as u8)
}

impl CollisionQuery for Zone {
    /// Clamp into bounds, then push out of each overlapping blocker along the
    /// axis of minimum penetration.
    fn resolve_collision(&self, position: Vec2, radius: f32) -> Vec2 {
        let mut p = Vec2::new(
            position.x.clamp(radius, (self.width - radius).max(radius)),
            position.y.clamp(radius, (self.height - radius).max(radius)),
        );

        for b in &self.blockers {
            if b.contains(p) {
                p = push_out_of(b, p, radius);
                continue;
            }
            let nearest = b.closest_point(p);
            let d = p - nearest;
            if d.length_squared() < radius * radius {
                if d.x.abs() > d.y.abs() {
                    p.x = nearest.x + sign_or_one(d.x) * radius;
                } else {
                    p.y = nearest.y + sign_or_one(d.y) * radius;
                }
            }
        }
        p
    }
}

/// Centre inside `b`: exit through the face needing the shortest move.
/// Ties resolve left, right, top, bottom.
fn push_out_of(b: &Rect, p: Vec2, radius: f32) -> Vec2 {
    let exits = [
        (p.x - b.x + radius, Vec2::new(b.x - radius, p.y)),
        (b.x + b.w - p.x + radius, Vec2::new(b.x + b.w + radius, p.y)),
        (p.y - b.y + radius, Vec2::new(p.x, b.y - radius)),
        (b.y + b.h - p.y + radius, Vec2::new(p.x, b.y + b.h + radius)),
    ];
    let mut best = exits[0];
    for exit in &exits[1..] {
        if exit.0 < best.0 {
            best = *exit;
        }
    }
    best.1
}

fn sign_or_one(v: f32) -> f32 {
    if v < 0.0 {
        -1.0
    } else {
        1.0
    }
}

/// A quest item lying in a zone
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldPickup {
    pub zone: ZoneId,
    pub position: Point,
    pub radius: f32,
    pub item: String,
}

/// The Frost Coil for the smith's delivery
pub fn frost_coil_pickup() -> WorldPickup {
    WorldPickup {
        zone: ZoneId::North,
        position: Point::new(1560.0, 360.0),
        radius: 20.0,
        item: "Frost Coil".to_string(),
    }
}

// =====================================================
// Static zones
// =====================================================

fn town() -> Zone {
    Zone {
        id: ZoneId::Town,
        name: "Sprouton Town".into(),
        width: 1700.0,
        height: 1700.0,
        palette: (0x7bd7ff, 0xa8ecb8),
        blockers: vec![
            Rect::new(220.0, 230.0, 200.0, 90.0),
            Rect::new(720.0, 240.0, 260.0, 120.0),
            Rect::new(1130.0, 320.0, 190.0, 170.0),
            Rect::new(510.0, 830.0, 370.0, 140.0),
        ],
        exits: vec![
            Exit::open(
                Rect::new(1470.0, 1450.0, 170.0, 170.0),
                ZoneId::Meadow,
                Point::new(180.0, 180.0),
            ),
            Exit::gated(
                Rect::new(70.0, 1300.0, 160.0, 160.0),
                ZoneId::Caverns,
                Point::new(1520.0, 250.0),
                AreaId::Caverns,
                "The cavern gate is sealed. Mayor Puffle must approve access first.",
            ),
            Exit::gated(
                Rect::new(1320.0, 80.0, 180.0, 120.0),
                ZoneId::Ruins,
                Point::new(260.0, 1380.0),
                AreaId::Ruins,
                "The ruins bridge is under repair. Upgrade the guild hall.",
            ),
            Exit::open(
                Rect::new(760.0, 20.0, 180.0, 120.0),
                ZoneId::Dungeon,
                Point::new(180.0, 180.0),
            ),
        ],
        npcs: vec![
            Npc::new(
                NpcId::Mayor,
                "Mayor Puffle",
                Point::new(900.0, 610.0),
                &[
                    "Keep the town safe, hero-ish people!",
                    "Prove yourself and I'll unseal the cavern gate.",
                ],
            ),
            Npc::new(
                NpcId::Chef,
                "Chef Truffle",
                Point::new(390.0, 640.0),
                &[
                    "I need Slime Gel for jelly stew!",
                    "Bring me 3 and I'll open my kitchen shop.",
                ],
            ),
            Npc::new(
                NpcId::Smith,
                "Smith Bop",
                Point::new(1210.0, 900.0),
                &[
                    "There's a Frost Coil out past the meadow ridge.",
                    "Bring it back and I'll open my forge stock.",
                ],
            ),
        ],
        spawns: Vec::new(),
    }
}

fn meadow() -> Zone {
    Zone {
        id: ZoneId::Meadow,
        name: "Sunny Meadow Frontier".into(),
        width: 2000.0,
        height: 1800.0,
        palette: (0x8ee8a5, 0x60c9ff),
        blockers: vec![
            Rect::new(540.0, 420.0, 270.0, 220.0),
            Rect::new(1080.0, 650.0, 230.0, 280.0),
            Rect::new(280.0, 980.0, 340.0, 150.0),
            Rect::new(1330.0, 1230.0, 310.0, 130.0),
            Rect::new(1480.0, 420.0, 220.0, 240.0),
        ],
        exits: vec![
            Exit::open(
                Rect::new(10.0, 10.0, 120.0, 120.0),
                ZoneId::Town,
                Point::new(1370.0, 1380.0),
            ),
            Exit::gated(
                Rect::new(900.0, 10.0, 200.0, 110.0),
                ZoneId::North,
                Point::new(1000.0, 1560.0),
                AreaId::North,
                "Snowdrifts block the ridge. Chef Truffle knows the way north.",
            ),
            Exit::gated(
                Rect::new(10.0, 820.0, 110.0, 200.0),
                ZoneId::West,
                Point::new(1760.0, 900.0),
                AreaId::West,
                "The western trail is roped off. Smith Bop holds the key.",
            ),
            Exit::gated(
                Rect::new(900.0, 1690.0, 200.0, 100.0),
                ZoneId::SouthMeadow,
                Point::new(1000.0, 200.0),
                AreaId::SouthMeadow,
                "Something bubbles to the south. Mayor Puffle has closed the path.",
            ),
        ],
        npcs: vec![Npc::new(
            NpcId::Scout,
            "Scout Nib",
            Point::new(300.0, 220.0),
            &["The frontier has hidden cellar rifts. They change each run."],
        )],
        spawns: vec![
            SpawnPack::new(EnemyKind::Slime, 7, 1),
            SpawnPack::new(EnemyKind::Bat, 4, 2),
            SpawnPack::new(EnemyKind::Mushroom, 4, 2),
        ],
    }
}

fn north() -> Zone {
    Zone {
        id: ZoneId::North,
        name: "Frostcrag North".into(),
        width: 2000.0,
        height: 1800.0,
        palette: (0xcdeeff, 0x8fb8ff),
        blockers: vec![
            Rect::new(420.0, 380.0, 260.0, 200.0),
            Rect::new(1100.0, 760.0, 300.0, 180.0),
            Rect::new(300.0, 1200.0, 260.0, 140.0),
            Rect::new(1500.0, 1000.0, 240.0, 200.0),
        ],
        exits: vec![Exit::open(
            Rect::new(900.0, 1690.0, 200.0, 100.0),
            ZoneId::Meadow,
            Point::new(1000.0, 200.0),
        )],
        npcs: Vec::new(),
        spawns: vec![
            SpawnPack::new(EnemyKind::Rockling, 5, 3),
            SpawnPack::new(EnemyKind::WobbleMage, 4, 3),
            SpawnPack::new(EnemyKind::Silkweaver, 4, 4),
        ],
    }
}

fn west() -> Zone {
    Zone {
        id: ZoneId::West,
        name: "West Wilds".into(),
        width: 2000.0,
        height: 1800.0,
        palette: (0xb4e08a, 0x7fae6b),
        blockers: vec![
            Rect::new(400.0, 300.0, 280.0, 180.0),
            Rect::new(900.0, 700.0, 220.0, 320.0),
            Rect::new(300.0, 1150.0, 340.0, 160.0),
            Rect::new(1300.0, 1250.0, 260.0, 150.0),
        ],
        exits: vec![Exit::open(
            Rect::new(1890.0, 800.0, 100.0, 200.0),
            ZoneId::Meadow,
            Point::new(200.0, 920.0),
        )],
        npcs: Vec::new(),
        spawns: vec![
            SpawnPack::new(EnemyKind::PuffZombie, 5, 4),
            SpawnPack::new(EnemyKind::RuneSentinel, 4, 4),
            SpawnPack::new(EnemyKind::PocketDrake, 4, 5),
        ],
    }
}

fn south_meadow() -> Zone {
    Zone {
        id: ZoneId::SouthMeadow,
        name: "Southern Meadow".into(),
        width: 2000.0,
        height: 1600.0,
        palette: (0xa6f0a0, 0xffe49a),
        blockers: vec![
            Rect::new(500.0, 500.0, 260.0, 200.0),
            Rect::new(1250.0, 420.0, 240.0, 260.0),
            Rect::new(800.0, 1000.0, 360.0, 160.0),
        ],
        exits: vec![Exit::open(
            Rect::new(900.0, 10.0, 200.0, 110.0),
            ZoneId::Meadow,
            Point::new(1000.0, 1600.0),
        )],
        npcs: Vec::new(),
        spawns: vec![
            SpawnPack::new(EnemyKind::Slime, 6, 3),
            SpawnPack::new(EnemyKind::Mushroom, 4, 4),
            SpawnPack::new(EnemyKind::ChefSlime, 1, 6),
        ],
    }
}

fn caverns() -> Zone {
    Zone {
        id: ZoneId::Caverns,
        name: "Giggle Caverns".into(),
        width: 2100.0,
        height: 1800.0,
        palette: (0x5f7dff, 0xb888ff),
        blockers: vec![
            Rect::new(380.0, 400.0, 240.0, 260.0),
            Rect::new(710.0, 980.0, 420.0, 140.0),
            Rect::new(1190.0, 350.0, 300.0, 170.0),
            Rect::new(1520.0, 900.0, 280.0, 230.0),
        ],
        exits: vec![Exit::open(
            Rect::new(1880.0, 40.0, 150.0, 150.0),
            ZoneId::Town,
            Point::new(200.0, 1340.0),
        )],
        npcs: Vec::new(),
        spawns: vec![
            SpawnPack::new(EnemyKind::Bat, 7, 3),
            SpawnPack::new(EnemyKind::Mushroom, 6, 3),
            SpawnPack::new(EnemyKind::Wraith, 4, 4),
            SpawnPack::new(EnemyKind::Boss, 1, 4),
        ],
    }
}

fn ruins() -> Zone {
    Zone {
        id: ZoneId::Ruins,
        name: "Whispering Ruins".into(),
        width: 2200.0,
        height: 1800.0,
        palette: (0x87d4c7, 0x8bb4ff),
        blockers: vec![
            Rect::new(500.0, 260.0, 330.0, 140.0),
            Rect::new(980.0, 520.0, 180.0, 330.0),
            Rect::new(1340.0, 340.0, 260.0, 210.0),
            Rect::new(260.0, 1000.0, 290.0, 230.0),
            Rect::new(1480.0, 980.0, 420.0, 160.0),
        ],
        exits: vec![Exit::open(
            Rect::new(20.0, 1650.0, 160.0, 120.0),
            ZoneId::Town,
            Point::new(1300.0, 200.0),
        )],
        npcs: Vec::new(),
        spawns: vec![
            SpawnPack::new(EnemyKind::Slime, 4, 4),
            SpawnPack::new(EnemyKind::Sentinel, 7, 5),
            SpawnPack::new(EnemyKind::Wraith, 6, 5),
            SpawnPack::new(EnemyKind::Boss, 1, 6),
        ],
    }
}

/// NPC talk radius
pub const NPC_TALK_RANGE: f32 = 80.0;

/// Current zone plus the static zone set
#[derive(Debug, Clone)]
pub struct World {
    zone_id: ZoneId,
    town: Zone,
    meadow: Zone,
    north: Zone,
    west: Zone,
    south_meadow: Zone,
    caverns: Zone,
    ruins: Zone,
    dungeon: Option<Zone>,
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

impl World {
    pub fn new() -> Self {
        Self {
            zone_id: ZoneId::Town,
            town: town(),
            meadow: meadow(),
            north: north(),
            west: west(),
            south_meadow: south_meadow(),
            caverns: caverns(),
            ruins: ruins(),
            dungeon: None,
        }
    }

    pub fn zone_id(&self) -> ZoneId {
        self.zone_id
    }

    /// The active zone. A dungeon id without a generated dungeon reads as town.
    pub fn zone(&self) -> &Zone {
        match self.zone_id {
            ZoneId::Town => &self.town,
            ZoneId::Meadow => &self.meadow,
            ZoneId::North => &self.north,
            ZoneId::West => &self.west,
            ZoneId::SouthMeadow => &self.south_meadow,
            ZoneId::Caverns => &self.caverns,
            ZoneId::Ruins => &self.ruins,
            ZoneId::Dungeon => self.dungeon.as_ref().unwrap_or(&self.town),
        }
    }

    pub fn dungeon(&self) -> Option<&Zone> {
        self.dungeon.as_ref()
    }

    pub fn set_dynamic_dungeon(&mut self, zone: Zone) {
        debug!(name = %zone.name, "Dynamic dungeon installed");
        self.dungeon = Some(zone);
    }

    /// Switch zones. Entering the dungeon without a generated one fails.
    pub fn change_zone(&mut self, id: ZoneId) -> bool {
        if id == ZoneId::Dungeon && self.dungeon.is_none() {
            return false;
        }
        self.zone_id = id;
        info!(zone = ?id, name = %self.zone().name, "Zone changed");
        true
    }

    pub fn exit_at(&self, p: Vec2) -> Option<&Exit> {
        self.zone().exit_at(p)
    }

    pub fn nearest_npc(&self, p: Vec2) -> Option<&Npc> {
        self.zone().nearest_npc(p, NPC_TALK_RANGE)
    }
}

impl CollisionQuery for World {
    fn resolve_collision(&self, position: Vec2, radius: f32) -> Vec2 {
        self.zone().resolve_collision(position, radius)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamps_to_bounds() {
        let world = World::new();
        let p = world.resolve_collision(Vec2::new(-50.0, 99_999.0), 16.0);
        assert_eq!(p, Vec2::new(16.0, 1684.0));
    }

    #[test]
    fn test_pushes_out_of_blocker() {
        let world = World::new();
        // Town blocker at (220, 230, 200, 90): approach the left face
        let p = world.resolve_collision(Vec2::new(215.0, 270.0), 16.0);
        assert!((p.x - 204.0).abs() < 0.001);
        assert!((p.y - 270.0).abs() < 0.001);
    }

    #[test]
    fn test_inside_blocker_exits_nearest_face() {
        let zone = Zone {
            blockers: vec![Rect::new(100.0, 100.0, 50.0, 50.0)],
            ..town()
        };
        // depths: left 20, right 50, top 40, bottom 30
        let p = zone.resolve_collision(Vec2::new(110.0, 130.0), 10.0);
        assert_eq!(p, Vec2::new(90.0, 130.0));

        // depths: left 50, right 20, top 30, bottom 40
        let p = zone.resolve_collision(Vec2::new(140.0, 120.0), 10.0);
        assert_eq!(p, Vec2::new(160.0, 120.0));
    }

    #[test]
    fn test_deep_centre_leaves_blocker() {
        let blocker = Rect::new(400.0, 400.0, 300.0, 200.0);
        let zone = Zone {
            blockers: vec![blocker],
            ..town()
        };
        let p = zone.resolve_collision(Vec2::new(550.0, 500.0), 14.0);
        assert!(!blocker.contains(p));
        assert!(p.distance(blocker.closest_point(p)) >= 14.0 - 0.001);
        // top and bottom tie at 114, top wins
        assert_eq!(p, Vec2::new(550.0, 386.0));
    }

    #[test]
    fn test_exit_detection_is_strict() {
        let world = World::new();
        assert_eq!(
            world.exit_at(Vec2::new(1500.0, 1500.0)).map(|e| e.to),
            Some(ZoneId::Meadow)
        );
        assert!(world.exit_at(Vec2::new(1470.0, 1500.0)).is_none());
    }

    #[test]
    fn test_nearest_npc_in_range() {
        let world = World::new();
        let npc = world.nearest_npc(Vec2::new(880.0, 600.0));
        assert_eq!(npc.map(|n| n.id), Some(NpcId::Mayor));
        assert!(world.nearest_npc(Vec2::new(100.0, 100.0)).is_none());
    }

    #[test]
    fn test_dungeon_requires_generated_zone() {
        let mut world = World::new();
        assert!(!world.change_zone(ZoneId::Dungeon));
        assert_eq!(world.zone_id(), ZoneId::Town);

        let mut dungeon = meadow();
        dungeon.id = ZoneId::Dungeon;
        world.set_dynamic_dungeon(dungeon);
        assert!(world.change_zone(ZoneId::Dungeon));
        assert_eq!(world.zone().name, "Sunny Meadow Frontier");
    }

    #[test]
    fn test_gated_exits() {
        let world = World::new();
        let gated: Vec<_> = world
            .zone()
            .exits
            .iter()
            .filter_map(|e| e.requires_area)
            .collect();
        assert_eq!(gated, vec![AreaId::Caverns, AreaId::Ruins]);
    }

    #[test]
    fn test_meadow_gates() {
        let gated: Vec<_> = meadow().exits.iter().filter_map(|e| e.requires_area).collect();
        assert_eq!(gated, vec![AreaId::North, AreaId::West, AreaId::SouthMeadow]);
    }

    #[test]
    fn test_frost_coil_reachable() {
        let pickup = frost_coil_pickup();
        let zone = north();
        let p = Vec2::from(pickup.position);
        assert_eq!(pickup.zone, zone.id);
        assert_eq!(zone.resolve_collision(p, 16.0), p);
    }

    #[test]
    fn test_return_spawns_are_clear() {
        let world = World::new();
        for id in [ZoneId::Meadow, ZoneId::North, ZoneId::West, ZoneId::SouthMeadow] {
            let mut w = world.clone();
            w.change_zone(id);
            for exit in &w.zone().exits {
                let mut target = world.clone();
                target.change_zone(exit.to);
                let spawn = Vec2::from(exit.spawn);
                assert_eq!(target.resolve_collision(spawn, 16.0), spawn, "{id:?} -> {:?}", exit.to);
                assert!(target.exit_at(spawn).is_none(), "{id:?} -> {:?} lands on an exit", exit.to);
            }
        }
    }

    #[test]
    fn test_arrival_points_are_clear() {
        for id in [
            ZoneId::Town,
            ZoneId::Meadow,
            ZoneId::North,
            ZoneId::West,
            ZoneId::SouthMeadow,
            ZoneId::Caverns,
            ZoneId::Ruins,
        ] {
            let mut w = World::new();
            w.change_zone(id);
            let p = Vec2::from(id.arrival_point());
            assert_eq!(w.resolve_collision(p, 16.0), p, "{id:?}");
            assert!(w.exit_at(p).is_none(), "{id:?}");
        }
    }

    #[test]
    fn test_static_spawn_tables() {
        assert_eq!(meadow().total_enemies(), 15);
        assert_eq!(caverns().total_enemies(), 18);
        assert_eq!(ruins().total_enemies(), 18);
        assert_eq!(north().total_enemies(), 13);
        assert_eq!(west().total_enemies(), 13);
        assert_eq!(south_meadow().total_enemies(), 11);
        assert_eq!(town().total_enemies(), 0);
    }
}
