use bevy::color::Color;
use bevy::math::Vec2;
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{debug, info, warn};

use crate::combat::skills::AbilitySlot;
use crate::combat::status::StatusEffect;
use crate::combat::{CombatSystem, Combatant};
use crate::constants::{
    APOTHECARY_REGEN_PER_RANK, DUNGEON_CLEAR_GOLD_BASE, DUNGEON_CLEAR_GOLD_PER_RANK,
};
use crate::engine::config::SimConfig;
use crate::engine::messages::{HudSnapshot, MemberView, SimEvent};
use crate::engine::projectile::{Projectile, ProjectileKind};
use crate::equipment::StatKind;
use crate::generation::{DungeonGenerator, ModifierId, RegionId};
use crate::monster::{Enemy, EnemyKind, Intent};
use crate::party::inventory::Inventory;
use crate::party::{Party, MEMBER_RADIUS};
use crate::persistence::{Persistent, PersistenceError, SaveGame, CURRENT_SAVE_VERSION};
use crate::progression::{Experience, Progression, TalentId, UpgradeId};
use crate::quest::{QuestId, QuestSystem};
use crate::rng::{sim_rng, SimRng};
use crate::world::{frost_coil_pickup, AreaId, CollisionQuery, NpcId, World, WorldPickup, ZoneId};

// =====================================================
// Intent tuning
// =====================================================

const ARCANE_BOLT_POWER: f32 = 0.95;
const FOOD_LOB_POWER: f32 = 0.85;
const ALLY_SHIELD_RANGE: f32 = 180.0;
const ALLY_SHIELD_TARGETS: usize = 2;
const FIRE_CONE_RANGE: f32 = 170.0;
const FIRE_CONE_POWER: f32 = 0.6;
const WING_GUST_KNOCKBACK: f32 = 90.0;
const SLIME_HEAL_FRACTION: f32 = 0.12;
const SPIDERLING_SCATTER: f32 = 80.0;

/// Party members land within this jitter of an exit's spawn point
const ARRIVAL_JITTER: f32 = 20.0;

/// Seconds between repeated locked-exit notices
const LOCKED_NOTICE_SECS: f32 = 1.5;

/// Input below this length is treated as no input
const INPUT_DEADZONE: f32 = 0.02;

/// Headless realization of the game loop.
///
/// Owns every entity collection. One `tick` advances movement, exits,
/// pickups, enemy AI and intents, projectiles, deaths and rewards, cosmetics,
/// respawns and regeneration, in that order.
pub struct Simulation {
    pub config: SimConfig,
    pub world: World,
    pub party: Party,
    pub enemies: Vec<Enemy>,
    pub projectiles: Vec<Projectile>,
    pub pickups: Vec<WorldPickup>,
    pub inventory: Inventory,
    pub quests: QuestSystem,
    pub progression: Progression,
    pub experience: Experience,
    pub generator: DungeonGenerator,
    pub combat: CombatSystem,
    rng: SimRng,
    input: Vec2,
    elapsed: f32,
    respawn_timer: f32,
    locked_notice: f32,
    events: Vec<SimEvent>,
}

impl Simulation {
    pub fn new(config: SimConfig) -> Self {
        let mut world = World::new();
        if !world.change_zone(config.starting_zone) {
            warn!(zone = ?config.starting_zone, "Cannot start in this zone, using town");
        }
        let spawn = Vec2::from(world.zone_id().arrival_point());

        let mut sim = Self {
            world,
            party: Party::new(spawn),
            enemies: Vec::new(),
            projectiles: Vec::new(),
            pickups: Vec::new(),
            inventory: Inventory::with_gold(config.starting_gold),
            quests: QuestSystem::default(),
            progression: Progression::default(),
            experience: Experience::default(),
            generator: DungeonGenerator::default(),
            combat: CombatSystem::new(config.particle_cap, config.combo_window),
            rng: sim_rng(config.world_seed),
            input: Vec2::ZERO,
            elapsed: 0.0,
            respawn_timer: 0.0,
            locked_notice: 0.0,
            events: Vec::new(),
            config,
        };
        sim.rebuild_stats();
        sim.spawn_enemies();
        sim.refresh_pickups();
        info!(seed = sim.config.world_seed, zone = ?sim.world.zone_id(), "Simulation started");
        sim
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn zone_id(&self) -> ZoneId {
        self.world.zone_id()
    }

    /// Movement input for the leader. Non-finite input reads as none.
    pub fn set_input(&mut self, input: Vec2) {
        self.input = if input.is_finite() { input } else { Vec2::ZERO };
    }

    /// Take every event produced since the last drain
    pub fn drain_events(&mut self) -> Vec<SimEvent> {
        std::mem::take(&mut self.events)
    }

    // =====================================================
    // Frame
    // =====================================================

    pub fn tick(&mut self, dt: f32) {
        let dt = if dt.is_finite() {
            dt.clamp(0.0, self.config.max_frame_dt)
        } else {
            0.0
        };
        if dt <= 0.0 {
            return;
        }
        self.elapsed += dt;
        self.locked_notice = (self.locked_notice - dt).max(0.0);

        self.move_leader(dt);
        if self.handle_exits() {
            return;
        }
        self.collect_pickups();
        self.party.update_follow(dt);
        self.update_enemies(dt);
        self.update_projectiles(dt);
        self.resolve_deaths();
        self.combat.update(dt);
        self.update_respawn(dt);
        self.check_dungeon_clear();
        self.regenerate(dt);
        self.check_wipe();
    }

    fn move_leader(&mut self, dt: f32) {
        if self.input.length() <= INPUT_DEADZONE {
            return;
        }
        let elapsed = self.elapsed;
        let input = self.input;
        let leader = self.party.active_mut();
        if !leader.is_alive() {
            return;
        }
        let step = input.clamp_length_max(1.0) * leader.move_speed(elapsed) * dt;
        leader.facing = input.try_normalize().unwrap_or(leader.facing);
        leader.position = self
            .world
            .resolve_collision(leader.position + step, leader.radius);
    }

    /// Returns true when the party left the zone this tick
    fn handle_exits(&mut self) -> bool {
        let lead = self.party.active().position;
        let Some(exit) = self.world.exit_at(lead).cloned() else {
            return false;
        };

        if let Some(area) = exit.requires_area {
            if !self.quests.is_area_unlocked(area) {
                if self.locked_notice <= 0.0 {
                    let message = exit
                        .locked_message
                        .unwrap_or_else(|| "The way is blocked.".to_string());
                    self.events.push(SimEvent::ExitLocked { message });
                    self.locked_notice = LOCKED_NOTICE_SECS;
                }
                return false;
            }
        }

        if exit.to == ZoneId::Dungeon && self.world.zone_id() != ZoneId::Dungeon {
            return self.start_dungeon(RegionId::Meadow);
        }
        self.enter_zone(exit.to, exit.spawn.into())
    }

    fn enter_zone(&mut self, to: ZoneId, spawn: Vec2) -> bool {
        let from = self.world.zone_id();
        if !self.world.change_zone(to) {
            return false;
        }

        let positions: Vec<Vec2> = (0..self.party.members.len())
            .map(|_| {
                let jitter = Vec2::new(self.rng.gen::<f32>(), self.rng.gen::<f32>()) * ARRIVAL_JITTER;
                self.world.resolve_collision(spawn + jitter, MEMBER_RADIUS)
            })
            .collect();
        self.party.place_at(positions);

        self.projectiles.clear();
        self.respawn_timer = 0.0;
        self.spawn_enemies();
        self.refresh_pickups();
        self.events.push(SimEvent::ZoneChanged { from, to });
        true
    }

    fn spawn_enemies(&mut self) {
        self.enemies.clear();
        let modifiers: Vec<ModifierId> = if self.world.zone_id() == ZoneId::Dungeon {
            self.generator
                .current_run
                .as_ref()
                .map(|run| run.modifiers.clone())
                .unwrap_or_default()
        } else {
            Vec::new()
        };

        let zone = self.world.zone();
        for pack in &zone.spawns {
            for _ in 0..pack.count {
                let at = zone.random_spawn_point(&mut self.rng);
                let at = zone.resolve_collision(at, pack.kind.radius());
                self.enemies.push(Enemy::spawn(
                    pack.kind,
                    at,
                    pack.level,
                    &modifiers,
                    &mut self.rng,
                ));
            }
        }
        debug!(zone = ?zone.id, count = self.enemies.len(), "Enemies spawned");
    }

    /// The Frost Coil lies in the north while the delivery still needs it
    fn refresh_pickups(&mut self) {
        self.pickups.clear();
        let needs_coil = self
            .quests
            .progress(QuestId::SmithDelivery)
            .is_some_and(|p| p.progress < 1);
        if needs_coil {
            self.pickups.push(frost_coil_pickup());
        }
    }

    fn collect_pickups(&mut self) {
        let zone = self.world.zone_id();
        let lead = self.party.active();
        let (position, radius) = (lead.position, lead.radius);

        let mut collected = Vec::new();
        self.pickups.retain(|pickup| {
            let touched = pickup.zone == zone
                && Vec2::from(pickup.position).distance(position) <= radius + pickup.radius;
            if touched {
                collected.push(pickup.item.clone());
            }
            !touched
        });

        for item in collected {
            self.inventory.add_item(&item, 1);
            self.quests.on_item_collected(&item);
            info!(item = %item, "Picked up");
            self.events.push(SimEvent::ItemPickedUp { item });
        }
    }

    fn update_enemies(&mut self, dt: f32) {
        let target = self.party.active().position;
        let leader_alive = self.party.active().is_alive();
        let mut intents = Vec::new();

        for index in 0..self.enemies.len() {
            let enemy = &mut self.enemies[index];
            if !enemy.is_alive() {
                continue;
            }
            let was_enraged = enemy.is_enraged();
            let attacks = enemy.update_ai(dt, target, &self.world, &mut self.rng);
            if !was_enraged && enemy.is_enraged() {
                info!(kind = ?enemy.kind, "Boss entered second phase");
                self.events.push(SimEvent::BossEnraged { kind: enemy.kind });
            }
            if let Some(intent) = enemy.intent.take() {
                intents.push((index, intent));
            }
            if attacks && leader_alive {
                self.combat.enemy_attack(enemy, &mut self.party, &mut self.rng);
            }
        }

        for (index, intent) in intents {
            self.realize_intent(index, intent);
        }
    }

    fn realize_intent(&mut self, index: usize, intent: Intent) {
        let Some(enemy) = self.enemies.get(index) else {
            return;
        };
        let (kind, origin, attack, level) = (enemy.kind, enemy.position, enemy.attack, enemy.level);
        let modifiers = enemy.modifiers.clone();
        let lead_pos = self.party.active().position;
        debug!(?kind, ?intent, "Intent realized");
        self.events.push(SimEvent::IntentTriggered { kind, intent });

        match intent {
            Intent::Projectile => {
                let damage = (attack * ARCANE_BOLT_POWER).round();
                self.projectiles
                    .push(Projectile::aimed(ProjectileKind::Arcane, origin, lead_pos, damage));
            }
            Intent::FoodProjectile => {
                let damage = (attack * FOOD_LOB_POWER).round();
                self.projectiles
                    .push(Projectile::aimed(ProjectileKind::Food, origin, lead_pos, damage));
            }
            Intent::AllyShield => {
                let mut allies: Vec<(usize, f32)> = self
                    .enemies
                    .iter()
                    .enumerate()
                    .filter(|(i, e)| *i != index && e.is_alive())
                    .map(|(i, e)| (i, e.position.distance(origin)))
                    .filter(|(_, d)| *d < ALLY_SHIELD_RANGE)
                    .collect();
                allies.sort_by(|a, b| a.1.total_cmp(&b.1));
                for (i, _) in allies.into_iter().take(ALLY_SHIELD_TARGETS) {
                    self.enemies[i].statuses.apply(StatusEffect::barrier(3.2, 0.35));
                }
            }
            Intent::WebTrap => {
                let lead = self.party.active_mut();
                if lead.is_alive() {
                    lead.apply_status(StatusEffect::ensnared(1.7, 0.45));
                }
            }
            Intent::SummonSpiderling => {
                let offset = Vec2::new(self.rng.gen::<f32>() - 0.5, self.rng.gen::<f32>() - 0.5)
                    * SPIDERLING_SCATTER;
                let at = self
                    .world
                    .resolve_collision(origin + offset, EnemyKind::Spiderling.radius());
                let level = level.saturating_sub(1).max(1);
                let spiderling =
                    Enemy::spawn(EnemyKind::Spiderling, at, level, &modifiers, &mut self.rng);
                self.enemies.push(spiderling);
            }
            Intent::FireCone => {
                let lead = self.party.active_mut();
                if lead.is_alive() && lead.position.distance(origin) < FIRE_CONE_RANGE {
                    lead.apply_hit((attack * FIRE_CONE_POWER).round().max(1.0));
                    lead.apply_status(StatusEffect::burn(3.0, 3.0 + level as f32 * 0.5));
                }
            }
            Intent::WingGust => {
                let push = (lead_pos - origin).try_normalize().unwrap_or(Vec2::X) * WING_GUST_KNOCKBACK;
                let lead = self.party.active_mut();
                if lead.is_alive() {
                    lead.position = self.world.resolve_collision(lead_pos + push, lead.radius);
                }
            }
            Intent::SlimeHeal => {
                let enemy = &mut self.enemies[index];
                let amount = enemy.max_hp * SLIME_HEAL_FRACTION;
                enemy.heal(amount);
            }
        }

        self.combat
            .particles
            .spawn(origin, kind.color(), 10, &mut self.rng);
    }

    fn update_projectiles(&mut self, dt: f32) {
        let lead = self.party.active_mut();
        let particles = &mut self.combat.particles;
        let rng = &mut self.rng;
        self.projectiles.retain_mut(|projectile| {
            if !projectile.advance(dt) {
                return false;
            }
            if lead.is_alive() && projectile.touches(lead) {
                let lost = projectile.strike(lead);
                particles.spawn(lead.position, projectile.kind.color(), 8, rng);
                debug!(damage = lost, "Projectile hit");
                return false;
            }
            true
        });
    }

    fn resolve_deaths(&mut self) {
        let defeats = self.combat.process_deaths(
            &mut self.enemies,
            &mut self.inventory,
            &mut self.quests,
            &mut self.rng,
        );
        for defeat in defeats {
            self.events.push(SimEvent::EnemyDefeated {
                kind: defeat.kind,
                level: defeat.level,
                xp: defeat.xp,
                gold: defeat.gold,
            });
            self.add_xp(defeat.xp);
        }
        for quest in self.quests.auto_claimable() {
            self.claim_quest(quest);
        }
    }

    fn update_respawn(&mut self, dt: f32) {
        if !self.world.zone_id().respawns() || !self.enemies.is_empty() {
            self.respawn_timer = 0.0;
            return;
        }
        self.respawn_timer += dt;
        if self.respawn_timer >= self.config.zone_respawn_delay {
            self.respawn_timer = 0.0;
            self.spawn_enemies();
        }
    }

    fn check_dungeon_clear(&mut self) {
        if self.world.zone_id() != ZoneId::Dungeon || !self.enemies.is_empty() {
            return;
        }
        let Some(run) = self.generator.current_run.as_ref() else {
            return;
        };
        let (id, rank) = (run.id.clone(), run.rank);
        if self.generator.complete_run() {
            let gold = DUNGEON_CLEAR_GOLD_BASE + rank * DUNGEON_CLEAR_GOLD_PER_RANK;
            self.inventory.add_gold(gold);
            self.events.push(SimEvent::DungeonCleared { id, gold });
        }
    }

    fn regenerate(&mut self, dt: f32) {
        let mana = self.config.mana_regen_per_sec * dt;
        let hp = if self.world.zone_id() == ZoneId::Town {
            let apothecary = self.progression.town_rank(UpgradeId::Apothecary) as f32;
            (self.config.town_regen_per_sec + apothecary * APOTHECARY_REGEN_PER_RANK) * dt
        } else {
            0.0
        };
        for member in self.party.members.iter_mut().filter(|m| m.is_alive()) {
            member.restore_mana(mana);
            if hp > 0.0 {
                member.heal(hp);
            }
        }
    }

    fn check_wipe(&mut self) {
        if !self.party.is_wiped() {
            self.party.promote_living_leader();
            return;
        }
        warn!(zone = ?self.world.zone_id(), "Party wiped, returning to town");
        self.events.push(SimEvent::PartyWiped);
        let spawn = Vec2::from(ZoneId::Town.arrival_point());
        self.party.revive(spawn);
        self.enter_zone(ZoneId::Town, spawn);
    }

    // =====================================================
    // Progress
    // =====================================================

    /// Grant party XP. Every crossed level raises all members and awards a
    /// talent point. Returns the number of levels gained.
    pub fn add_xp(&mut self, amount: u32) -> u32 {
        let levels = self.experience.add(amount);
        if levels == 0 {
            return 0;
        }
        for _ in 0..levels {
            for member in &mut self.party.members {
                member.gain_level();
            }
            self.progression.grant_talent_point();
        }
        self.rebuild_stats();
        let level = self.party.active().level;
        info!(level, levels, "Party leveled up");
        self.events.push(SimEvent::LevelUp { level });
        levels
    }

    /// Effective stats = base + equipment + talents and attribute points
    fn rebuild_stats(&mut self) {
        for member in &mut self.party.members {
            member.apply_equipment_bonuses();
            self.progression.apply_to(member);
            member.clamp_resources();
        }
    }

    fn claim_quest(&mut self, quest: QuestId) -> bool {
        let Some(reward) = self.quests.claim(quest, &mut self.inventory) else {
            return false;
        };
        self.events.push(SimEvent::QuestCompleted {
            quest,
            xp: reward.xp,
            gold: reward.gold,
        });
        self.add_xp(reward.xp);
        self.refresh_pickups();
        true
    }

    // =====================================================
    // Player actions
    // =====================================================

    /// Basic attack with the leader. `None` when down or cooling down.
    pub fn attack(&mut self) -> Option<u32> {
        self.combat
            .try_attack(self.party.active_mut(), &mut self.enemies, &mut self.rng)
    }

    /// Cast the leader's skill in `slot`. `None` when nothing happened.
    pub fn cast(&mut self, slot: AbilitySlot) -> Option<u32> {
        let elapsed = self.elapsed;
        self.combat.try_skill(
            self.party.active_mut(),
            slot,
            &mut self.enemies,
            elapsed,
            &mut self.rng,
        )
    }

    /// Hand the lead to the next living member
    pub fn switch_active(&mut self) -> bool {
        let before = self.party.active_index;
        for _ in 1..self.party.members.len() {
            self.party.switch_active();
            if self.party.active().is_alive() {
                return true;
            }
        }
        self.party.active_index = before;
        false
    }

    pub fn equip(&mut self, member: usize, item_id: &str) -> bool {
        let Some(target) = self.party.members.get_mut(member) else {
            return false;
        };
        if !self.inventory.equip(target, item_id) {
            return false;
        }
        self.rebuild_stats();
        true
    }

    pub fn spend_talent(&mut self, member: usize, talent: TalentId) -> bool {
        let Some(target) = self.party.members.get(member) else {
            return false;
        };
        if !self.progression.spend_talent(target, talent) {
            return false;
        }
        self.rebuild_stats();
        true
    }

    pub fn spend_attribute_point(&mut self, member: usize, stat: StatKind) -> bool {
        let Some(target) = self.party.members.get(member) else {
            return false;
        };
        if !self.progression.spend_attribute_point(target, stat) {
            return false;
        }
        self.rebuild_stats();
        true
    }

    /// Buying the guild hall also opens the ruins bridge
    pub fn buy_town_upgrade(&mut self, upgrade: UpgradeId) -> bool {
        if !self.progression.buy_town_upgrade(upgrade, &mut self.inventory) {
            return false;
        }
        if upgrade == UpgradeId::Guildhall {
            self.quests.unlock_area(AreaId::Ruins);
        }
        let rank = self.progression.town_rank(upgrade);
        self.events.push(SimEvent::TownUpgraded { upgrade, rank });
        true
    }

    /// Talk to the closest NPC in range: turn in a finished quest if there is
    /// one, otherwise hear a line. Returns the NPC spoken to.
    pub fn talk_to_nearest_npc(&mut self) -> Option<NpcId> {
        let lead = self.party.active().position;
        let npc = self.world.nearest_npc(lead)?;
        let (id, lines) = (npc.id, npc.lines.clone());

        if let Some(quest) = self.quests.turn_in_quest_for(id) {
            self.claim_quest(quest);
            return Some(id);
        }

        let line = match self.quests.active_quest_for(id) {
            Some(quest) => quest.def().description.to_string(),
            None => lines.choose(&mut self.rng).cloned().unwrap_or_default(),
        };
        self.events.push(SimEvent::NpcDialogue { npc: id, line });
        Some(id)
    }

    /// Generate a run at the current dungeon rank and enter it.
    ///
    /// Refused while an unfinished run is in progress.
    pub fn start_dungeon(&mut self, region: RegionId) -> bool {
        let in_progress = self.world.zone_id() == ZoneId::Dungeon
            && self
                .generator
                .current_run
                .as_ref()
                .is_some_and(|run| !run.completed);
        if in_progress {
            return false;
        }

        let rank = self.progression.dungeon_rank;
        let run = self
            .generator
            .create_seeded_run(self.config.world_seed, region, rank);
        let event = SimEvent::DungeonStarted {
            id: run.id.clone(),
            region,
            rank,
            modifiers: run.modifiers.clone(),
        };
        let zone = run.zone.clone();

        self.world.set_dynamic_dungeon(zone);
        self.events.push(event);
        self.enter_zone(ZoneId::Dungeon, ZoneId::Dungeon.arrival_point().into())
    }

    // =====================================================
    // Save / load
    // =====================================================

    pub fn save(&self) -> SaveGame {
        SaveGame {
            version: CURRENT_SAVE_VERSION,
            zone: self.world.zone_id(),
            elapsed: self.elapsed,
            party: self.party.serialize_state(),
            inventory: self.inventory.serialize_state(),
            quests: self.quests.serialize_state(),
            progression: self.progression.serialize_state(),
            dungeon: self.generator.serialize_state(),
            experience: self.experience.serialize_state(),
        }
    }

    /// Replace the session state with `save`.
    ///
    /// A saved dungeon zone is rebuilt from the stored run; without an
    /// unfinished run the party lands in town.
    pub fn load(&mut self, save: &SaveGame) {
        let mut party = Party::new(Vec2::from(ZoneId::Town.arrival_point()));
        party.hydrate(&save.party);
        let mut inventory = Inventory::with_gold(self.config.starting_gold);
        inventory.hydrate(&save.inventory);
        let mut quests = QuestSystem::default();
        quests.hydrate(&save.quests);
        let mut progression = Progression::default();
        progression.hydrate(&save.progression);
        let mut experience = Experience::default();
        experience.hydrate(&save.experience);
        let mut generator = DungeonGenerator::default();
        generator.hydrate(&save.dungeon);

        self.party = party;
        self.inventory = inventory;
        self.quests = quests;
        self.progression = progression;
        self.experience = experience;
        self.generator = generator;
        self.elapsed = if save.elapsed.is_finite() && save.elapsed >= 0.0 {
            save.elapsed
        } else {
            0.0
        };

        let mut world = World::new();
        let mut zone = save.zone;
        if zone == ZoneId::Dungeon {
            match self.generator.current_run.as_ref() {
                Some(run) if !run.completed => world.set_dynamic_dungeon(run.zone.clone()),
                _ => zone = ZoneId::Town,
            }
        }
        if !world.change_zone(zone) {
            world.change_zone(ZoneId::Town);
        }
        self.world = world;

        for member in &mut self.party.members {
            member.position = self.world.resolve_collision(member.position, member.radius);
        }
        self.rebuild_stats();

        self.projectiles.clear();
        self.respawn_timer = 0.0;
        self.combat = CombatSystem::new(self.config.particle_cap, self.config.combo_window);
        self.spawn_enemies();
        self.refresh_pickups();
        info!(zone = ?self.world.zone_id(), level = self.party.active().level, "Save loaded");
    }

    pub fn save_json(&self) -> Result<String, PersistenceError> {
        self.save().to_json_string()
    }

    pub fn load_json(&mut self, json: &str) -> Result<(), PersistenceError> {
        let save = SaveGame::from_json_str(json)?;
        self.load(&save);
        Ok(())
    }

    // =====================================================
    // View
    // =====================================================

    pub fn snapshot(&self) -> HudSnapshot {
        let zone = self.world.zone();
        HudSnapshot {
            zone: zone.id,
            zone_name: zone.name.clone(),
            active_index: self.party.active_index,
            members: self
                .party
                .members
                .iter()
                .map(|m| MemberView {
                    name: m.name.clone(),
                    level: m.level,
                    hp: m.hp,
                    max_hp: m.stats.max_hp,
                    mana: m.mana,
                    max_mana: m.stats.max_mana,
                    x: m.position.x,
                    y: m.position.y,
                    color: m.class.color(),
                })
                .collect(),
            enemies_alive: self.enemies.iter().filter(|e| e.is_alive()).count(),
            particles: self.combat.particles.len(),
            combo: self.combat.combo.count,
            gold: self.inventory.gold,
            xp: self.experience.xp,
            level_xp: self.experience.level_xp,
            talent_points: self.progression.talent_points,
            tracker: self.quests.tracker_lines(),
        }
    }

    /// Colors of the active zone's background gradient
    pub fn zone_colors(&self) -> (Color, Color) {
        self.world.zone().colors()
    }
}
