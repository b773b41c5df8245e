use std::f32::consts::TAU;

use eframe::egui::{Vec2, vec2};

pub const EFFECT_CAPACITY: usize = 256;

const BURST_PARTICLES: usize = 14;
const RIPPLE_PARTICLES: usize = 6;

#[derive(Clone, Copy, Debug)]
pub struct Particle {
    pub pos: Vec2,
    pub velocity: Vec2,
    pub life: f32,
    pub max_life: f32,
    pub size: f32,
}

impl Particle {
    pub fn alpha(&self) -> f32 {
        (self.life / self.max_life).clamp(0.0, 1.0)
    }
}

/// Cosmetic interaction particles. Owned state stepped once per frame; a
/// fixed-capacity ring buffer, so a click storm can never grow it without
/// bound.
pub struct EffectBuffer {
    particles: Vec<Particle>,
    cursor: usize,
}

impl EffectBuffer {
    pub fn new() -> Self {
        Self {
            particles: Vec::new(),
            cursor: 0,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Particle> {
        self.particles.iter()
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    fn push(&mut self, particle: Particle) {
        if self.particles.len() < EFFECT_CAPACITY {
            self.particles.push(particle);
        } else {
            self.cursor %= EFFECT_CAPACITY;
            self.particles[self.cursor] = particle;
            self.cursor += 1;
        }
    }

    /// Radial burst at a clicked node, world space.
    pub fn spawn_burst(&mut self, center: Vec2, node_radius: f32) {
        for index in 0..BURST_PARTICLES {
            let angle = (index as f32 / BURST_PARTICLES as f32) * TAU;
            let direction = vec2(angle.cos(), angle.sin());
            self.push(Particle {
                pos: center + direction * node_radius,
                velocity: direction * (35.0 + node_radius),
                life: 0.8,
                max_life: 0.8,
                size: 2.6,
            });
        }
    }

    /// Subtle ring when the hover target changes.
    pub fn spawn_ripple(&mut self, center: Vec2, node_radius: f32) {
        for index in 0..RIPPLE_PARTICLES {
            let angle = (index as f32 / RIPPLE_PARTICLES as f32) * TAU + 0.4;
            let direction = vec2(angle.cos(), angle.sin());
            self.push(Particle {
                pos: center + direction * node_radius,
                velocity: direction * 14.0,
                life: 0.4,
                max_life: 0.4,
                size: 1.6,
            });
        }
    }

    /// Advance lifetimes and motion, dropping anything that has expired.
    /// Returns true while particles remain alive.
    pub fn step(&mut self, delta_seconds: f32) -> bool {
        for particle in &mut self.particles {
            particle.life -= delta_seconds;
            particle.pos += particle.velocity * delta_seconds;
            particle.velocity *= 0.92;
        }
        self.particles.retain(|particle| particle.life > 0.0);
        self.cursor = self.cursor.min(self.particles.len());
        !self.particles.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lifetimes_decay_and_expire() {
        let mut effects = EffectBuffer::new();
        effects.spawn_burst(Vec2::ZERO, 10.0);
        assert_eq!(effects.len(), BURST_PARTICLES);

        assert!(effects.step(0.5));
        assert_eq!(effects.len(), BURST_PARTICLES);

        assert!(!effects.step(0.5));
        assert!(effects.is_empty());
    }

    #[test]
    fn capacity_is_a_hard_cap() {
        let mut effects = EffectBuffer::new();
        for _ in 0..200 {
            effects.spawn_burst(Vec2::ZERO, 8.0);
        }
        assert!(effects.len() <= EFFECT_CAPACITY);
    }

    #[test]
    fn ring_overwrite_keeps_newest_alive() {
        let mut effects = EffectBuffer::new();
        for _ in 0..200 {
            effects.spawn_burst(Vec2::ZERO, 8.0);
        }
        // Every slot was overwritten by fresh particles, so one short step
        // kills nothing.
        assert!(effects.step(0.1));
        assert!(effects.len() <= EFFECT_CAPACITY);
    }

    #[test]
    fn alpha_tracks_remaining_life() {
        let mut effects = EffectBuffer::new();
        effects.spawn_ripple(Vec2::ZERO, 5.0);
        effects.step(0.2);
        for particle in effects.iter() {
            assert!(particle.alpha() < 1.0);
            assert!(particle.alpha() > 0.0);
        }
    }
}
