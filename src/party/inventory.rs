//! Gold, stackable items and the equipment bag.

use std::collections::BTreeMap;

use rand::Rng;
use serde_json::{json, Value};
use tracing::{debug, warn};

use super::PartyMember;
use crate::constants::{EQUIPMENT_DROP_CHANCE, STARTING_GOLD};
use crate::equipment::{starting_pool, EquipmentItem, BASE_ITEMS};
use crate::loot::roll_loot;
use crate::persistence::{decode_list, field_u64, Persistent};

#[derive(Debug, Clone, PartialEq)]
pub struct Inventory {
    pub gold: u32,
    pub items: BTreeMap<String, u32>,
    pub equipment_bag: Vec<EquipmentItem>,
    /// Suffix for the next rolled piece's id
    pub next_serial: u64,
}

impl Default for Inventory {
    fn default() -> Self {
        Self::with_gold(STARTING_GOLD)
    }
}

impl Inventory {
    /// Fresh inventory: four potions and the base equipment pieces
    pub fn with_gold(gold: u32) -> Self {
        let mut inventory = Self {
            gold,
            items: BTreeMap::new(),
            equipment_bag: starting_pool(),
            next_serial: 1,
        };
        inventory.add_item("Potion", 4);
        inventory
    }

    pub fn add_item(&mut self, name: &str, count: u32) {
        if count == 0 {
            return;
        }
        *self.items.entry(name.to_string()).or_insert(0) += count;
    }

    /// Remove `count` of `name`. Fails without change when short.
    pub fn remove_item(&mut self, name: &str, count: u32) -> bool {
        let held = self.item_count(name);
        if held < count {
            return false;
        }
        if held == count {
            self.items.remove(name);
        } else {
            self.items.insert(name.to_string(), held - count);
        }
        true
    }

    pub fn item_count(&self, name: &str) -> u32 {
        self.items.get(name).copied().unwrap_or(0)
    }

    pub fn add_gold(&mut self, amount: u32) {
        self.gold = self.gold.saturating_add(amount);
    }

    /// Spend gold if there is enough
    pub fn spend_gold(&mut self, amount: u32) -> bool {
        match self.gold.checked_sub(amount) {
            Some(rest) => {
                self.gold = rest;
                true
            }
            None => false,
        }
    }

    /// Pay out an enemy kill. Returns the rolled equipment piece, if any.
    pub fn add_loot<R: Rng + ?Sized>(
        &mut self,
        drop: &str,
        gold: u32,
        enemy_level: u32,
        rng: &mut R,
    ) -> Option<&EquipmentItem> {
        self.add_item(drop, 1);
        self.add_gold(gold);

        if rng.gen::<f64>() >= EQUIPMENT_DROP_CHANCE {
            return None;
        }
        let base = BASE_ITEMS[rng.gen_range(0..BASE_ITEMS.len())].to_item();
        let item = roll_loot(&base, enemy_level, rng);
        Some(self.stow_rolled(item))
    }

    /// Bag a rolled piece under its own id, `<base>-<serial>`, so it stays
    /// addressable next to plain copies of the same base.
    pub fn stow_rolled(&mut self, mut item: EquipmentItem) -> &EquipmentItem {
        item.id = format!("{}-{}", item.id, self.next_serial);
        self.next_serial += 1;
        debug!(id = %item.id, item = %item.name, rarity = ?item.rarity, "Equipment dropped");
        self.equipment_bag.push(item);
        &self.equipment_bag[self.equipment_bag.len() - 1]
    }

    /// Equip the first bag item with `item_id` on `member`.
    ///
    /// The replaced piece goes back into the bag.
    pub fn equip(&mut self, member: &mut PartyMember, item_id: &str) -> bool {
        let Some(index) = self.equipment_bag.iter().position(|item| item.id == item_id) else {
            return false;
        };
        let item = self.equipment_bag.remove(index);
        let previous = member.equipment.replace(item);
        member.apply_equipment_bonuses();
        if let Some(previous) = previous {
            self.equipment_bag.push(previous);
        }
        true
    }
}

impl Persistent for Inventory {
    fn serialize_state(&self) -> Value {
        json!({
            "gold": self.gold,
            "items": self.items.iter().map(|(name, count)| json!([name, count])).collect::<Vec<_>>(),
            "equipment_bag": self.equipment_bag,
            "next_serial": self.next_serial,
        })
    }

    fn hydrate(&mut self, data: &Value) {
        if !data.is_object() {
            return;
        }
        self.gold = field_u64(data, "gold", self.gold as u64).min(u32::MAX as u64) as u32;

        if let Some(Value::Array(entries)) = data.get("items") {
            self.items.clear();
            for entry in entries {
                let pair = entry.as_array().map(Vec::as_slice);
                match pair {
                    Some([Value::String(name), count]) => match count.as_u64() {
                        Some(n) if n > 0 => self.add_item(name, n.min(u32::MAX as u64) as u32),
                        _ => warn!(item = %name, "Dropping saved item with bad count"),
                    },
                    _ => warn!(found = %entry, "Dropping malformed saved item"),
                }
            }
        }

        if let Some(Value::Array(bag)) = data.get("equipment_bag") {
            self.equipment_bag = decode_list(bag);
        }
        let floor = self
            .equipment_bag
            .iter()
            .filter_map(|item| serial_of(&item.id))
            .max()
            .map_or(1, |n| n + 1);
        self.next_serial = field_u64(data, "next_serial", floor).max(floor);
    }
}

fn serial_of(id: &str) -> Option<u64> {
    id.rsplit_once('-').and_then(|(_, n)| n.parse().ok())
}
