//! Status effects and buff/debuff bookkeeping.
//!
//! One entry per kind per actor. Re-applying a kind refreshes its duration to
//! the longer of the two and keeps the original magnitude.

use serde::{Deserialize, Serialize};

/// Status effect kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusKind {
    // Damage over time
    Burn,
    Bleed,
    Poison,

    // Movement
    Slow,     // enemy-side slow from party skills
    Slowed,   // party-side slow from projectiles
    Ensnared, // party-side root-ish slow from webs

    // Damage taken
    Vulnerable,
    Guard,   // party-side reduction
    Barrier, // enemy-side reduction from support casters
}

impl StatusKind {
    /// Magnitude used when a payload is missing or malformed
    pub fn default_magnitude(&self) -> f32 {
        match self {
            Self::Burn => 5.0,
            Self::Bleed => 4.0,
            Self::Poison => 4.0,
            Self::Slow => 0.2,
            Self::Slowed => 0.3,
            Self::Ensnared => 0.55,
            Self::Vulnerable => 0.1,
            Self::Guard => 0.25,
            Self::Barrier => 0.25,
        }
    }

    pub fn is_damage_over_time(&self) -> bool {
        matches!(self, Self::Burn | Self::Bleed | Self::Poison)
    }

    pub fn is_slow(&self) -> bool {
        matches!(self, Self::Slow | Self::Slowed | Self::Ensnared)
    }

    pub fn is_damage_reduction(&self) -> bool {
        matches!(self, Self::Guard | Self::Barrier)
    }
}

/// A single status effect instance.
///
/// `magnitude` is kind specific: damage per second for DoTs, a 0..1 strength
/// for slows, amplification for vulnerable, reduction for guard/barrier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StatusEffect {
    pub kind: StatusKind,
    pub remaining: f32,
    pub magnitude: f32,
}

impl StatusEffect {
    pub fn new(kind: StatusKind, duration: f32, magnitude: f32) -> Self {
        let magnitude = if magnitude.is_finite() && magnitude >= 0.0 {
            magnitude
        } else {
            kind.default_magnitude()
        };
        Self {
            kind,
            remaining: duration.max(0.0),
            magnitude,
        }
    }

    pub fn burn(duration: f32, dps: f32) -> Self {
        Self::new(StatusKind::Burn, duration, dps)
    }

    pub fn bleed(duration: f32, dps: f32) -> Self {
        Self::new(StatusKind::Bleed, duration, dps)
    }

    pub fn poison(duration: f32, dps: f32) -> Self {
        Self::new(StatusKind::Poison, duration, dps)
    }

    pub fn slow(duration: f32, strength: f32) -> Self {
        Self::new(StatusKind::Slow, duration, strength.clamp(0.0, 1.0))
    }

    pub fn slowed(duration: f32, strength: f32) -> Self {
        Self::new(StatusKind::Slowed, duration, strength.clamp(0.0, 1.0))
    }

    pub fn ensnared(duration: f32, strength: f32) -> Self {
        Self::new(StatusKind::Ensnared, duration, strength.clamp(0.0, 1.0))
    }

    pub fn vulnerable(duration: f32, amp: f32) -> Self {
        Self::new(StatusKind::Vulnerable, duration, amp)
    }

    pub fn guard(duration: f32, reduction: f32) -> Self {
        Self::new(StatusKind::Guard, duration, reduction.clamp(0.0, 1.0))
    }

    pub fn barrier(duration: f32, reduction: f32) -> Self {
        Self::new(StatusKind::Barrier, duration, reduction.clamp(0.0, 1.0))
    }

    pub fn is_expired(&self) -> bool {
        self.remaining <= 0.0
    }

    /// Damage per second for DoT effects
    pub fn dps(&self) -> f32 {
        if self.kind.is_damage_over_time() {
            self.magnitude
        } else {
            0.0
        }
    }
}

/// Active status effects on one actor
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatusEffects {
    pub effects: Vec<StatusEffect>,
}

impl StatusEffects {
    /// Apply an effect. An existing entry of the same kind only has its
    /// duration extended.
    pub fn apply(&mut self, effect: StatusEffect) {
        if let Some(existing) = self.effects.iter_mut().find(|e| e.kind == effect.kind) {
            existing.remaining = existing.remaining.max(effect.remaining);
        } else if !effect.is_expired() {
            self.effects.push(effect);
        }
    }

    pub fn get(&self, kind: StatusKind) -> Option<&StatusEffect> {
        self.effects.iter().find(|e| e.kind == kind)
    }

    pub fn has(&self, kind: StatusKind) -> bool {
        self.get(kind).is_some()
    }

    pub fn cleanse(&mut self, kind: StatusKind) {
        self.effects.retain(|e| e.kind != kind);
    }

    pub fn clear(&mut self) {
        self.effects.clear();
    }

    pub fn len(&self) -> usize {
        self.effects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    /// Strongest active slow of any flavor (0 when none)
    pub fn strongest_slow(&self) -> f32 {
        self.effects
            .iter()
            .filter(|e| e.kind.is_slow())
            .map(|e| e.magnitude)
            .fold(0.0, f32::max)
    }

    /// Incoming damage multiplier from guard/barrier, strongest wins
    pub fn damage_taken_factor(&self) -> f32 {
        let reduction = self
            .effects
            .iter()
            .filter(|e| e.kind.is_damage_reduction())
            .map(|e| e.magnitude)
            .fold(0.0, f32::max);
        1.0 - reduction.clamp(0.0, 1.0)
    }

    /// Outgoing damage amplification from vulnerable (1.0 when absent)
    pub fn vulnerability_factor(&self) -> f32 {
        self.get(StatusKind::Vulnerable)
            .map(|v| 1.0 + v.magnitude)
            .unwrap_or(1.0)
    }

    /// Total damage over time per second
    pub fn total_dot(&self) -> f32 {
        self.effects.iter().map(|e| e.dps()).sum()
    }

    /// Advance timers by `dt` and drop expired entries.
    /// Returns the DoT damage accrued over the step.
    pub fn tick(&mut self, dt: f32) -> f32 {
        let damage = self.total_dot() * dt;
        for effect in &mut self.effects {
            effect.remaining -= dt;
        }
        self.effects.retain(|e| !e.is_expired());
        damage
    }
}
