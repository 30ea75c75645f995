//! Enemy projectiles in flight.

use bevy::color::Color;
use bevy::math::Vec2;

use crate::combat::damage::projectile_damage;
use crate::combat::status::StatusEffect;
use crate::combat::Combatant;
use crate::party::PartyMember;

pub const PROJECTILE_SPEED: f32 = 130.0;
pub const PROJECTILE_LIFE: f32 = 2.6;
pub const PROJECTILE_RADIUS: f32 = 8.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectileKind {
    /// Wobble mage bolt
    Arcane,
    /// Chef slime food lob
    Food,
}

impl ProjectileKind {
    pub fn color(&self) -> Color {
        match self {
            Self::Arcane => Color::srgb_u8(0x8e, 0xcb, 0xff),
            Self::Food => Color::srgb_u8(0xff, 0x9f, 0xc2),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Projectile {
    pub kind: ProjectileKind,
    pub position: Vec2,
    pub velocity: Vec2,
    pub life: f32,
    pub radius: f32,
    pub damage: f32,
}

impl Projectile {
    /// Aim from `from` toward `target`. A zero offset fires along +x.
    pub fn aimed(kind: ProjectileKind, from: Vec2, target: Vec2, damage: f32) -> Self {
        let dir = (target - from).try_normalize().unwrap_or(Vec2::X);
        Self {
            kind,
            position: from,
            velocity: dir * PROJECTILE_SPEED,
            life: PROJECTILE_LIFE,
            radius: PROJECTILE_RADIUS,
            damage,
        }
    }

    /// Move one step. Returns false once expired.
    pub fn advance(&mut self, dt: f32) -> bool {
        self.position += self.velocity * dt;
        self.life -= dt;
        self.life > 0.0
    }

    pub fn touches(&self, member: &PartyMember) -> bool {
        member.position.distance(self.position) < member.radius + self.radius
    }

    /// Hit `member`: defense-mitigated damage through guard/barrier plus a
    /// short slow. Returns hp lost.
    pub fn strike(&self, member: &mut PartyMember) -> f32 {
        let raw = projectile_damage(self.damage, member.defense()).round();
        let lost = member.apply_hit(raw);
        member.apply_status(StatusEffect::slowed(2.0, 0.35));
        lost
    }
}
