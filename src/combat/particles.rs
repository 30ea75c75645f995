//! Cosmetic particle pool. No gameplay reads it.

use bevy::color::Color;
use bevy::math::Vec2;
use rand::Rng;

use crate::constants::{MAX_PARTICLES, PARTICLE_GRAVITY};

#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub position: Vec2,
    pub velocity: Vec2,
    pub life: f32,
    pub color: Color,
    pub size: f32,
    pub glow: f32,
}

/// Capped particle list
#[derive(Debug, Clone)]
pub struct ParticlePool {
    particles: Vec<Particle>,
    cap: usize,
}

impl Default for ParticlePool {
    fn default() -> Self {
        Self::new(MAX_PARTICLES)
    }
}

impl ParticlePool {
    pub fn new(cap: usize) -> Self {
        Self {
            particles: Vec::with_capacity(cap.min(MAX_PARTICLES)),
            cap,
        }
    }

    pub fn cap(&self) -> usize {
        self.cap
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Particle> {
        self.particles.iter()
    }

    /// Spawn up to `count` particles at `at`. Returns how many fit under the cap.
    pub fn spawn<R: Rng + ?Sized>(&mut self, at: Vec2, color: Color, count: usize, rng: &mut R) -> usize {
        let room = self.cap.saturating_sub(self.particles.len());
        let n = count.min(room);
        for _ in 0..n {
            self.particles.push(Particle {
                position: at,
                velocity: Vec2::new(
                    (rng.gen::<f32>() - 0.5) * 160.0,
                    (rng.gen::<f32>() - 0.6) * 170.0,
                ),
                life: 0.45 + rng.gen::<f32>() * 0.55,
                color,
                size: 2.0 + rng.gen::<f32>() * 4.0,
                glow: 0.4 + rng.gen::<f32>() * 0.6,
            });
        }
        n
    }

    pub fn update(&mut self, dt: f32) {
        for p in &mut self.particles {
            p.life -= dt;
            p.position += p.velocity * dt;
            p.velocity.y += PARTICLE_GRAVITY * dt;
            p.size = (p.size * (1.0 - dt * 0.9)).max(0.8);
        }
        self.particles.retain(|p| p.life > 0.0);
    }

    pub fn clear(&mut self) {
        self.particles.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::sim_rng;

    #[test]
    fn test_spawn_respects_cap() {
        let mut pool = ParticlePool::new(700);
        let mut rng = sim_rng(1);
        assert_eq!(pool.spawn(Vec2::ZERO, Color::WHITE, 100, &mut rng), 100);
        assert_eq!(pool.spawn(Vec2::ZERO, Color::WHITE, 750, &mut rng), 600);
        assert_eq!(pool.len(), 700);
        assert_eq!(pool.spawn(Vec2::ZERO, Color::WHITE, 5, &mut rng), 0);
    }

    #[test]
    fn test_particles_expire() {
        let mut pool = ParticlePool::new(50);
        let mut rng = sim_rng(2);
        pool.spawn(Vec2::ZERO, Color::WHITE, 20, &mut rng);
        pool.update(0.3);
        assert_eq!(pool.len(), 20, "Minimum life is 0.45s");
        pool.update(0.8);
        assert!(pool.is_empty());
    }

    #[test]
    fn test_size_has_floor() {
        let mut pool = ParticlePool::new(1);
        pool.spawn(Vec2::ZERO, Color::WHITE, 1, &mut sim_rng(3));
        for _ in 0..10 {
            pool.update(0.04);
        }
        assert!(pool.iter().all(|p| p.size >= 0.8));
    }
}
