// Firework particles: burst emitter and per-frame stepper
// Velocities are in surface pixels per frame, not per second

use bevy::prelude::*;
use rand::Rng;

use crate::constants::*;

#[derive(Clone, Debug, PartialEq)]
pub struct Particle {
    pub position: Vec2,
    pub velocity: Vec2,
    /// Starts at 1.0 and only goes down; doubles as render opacity
    pub life: f32,
    /// Subtracted from `life` every step
    pub decay: f32,
    pub radius: f32,
    pub color: Color,
}

impl Particle {
    /// Advance one frame (Euler step, constant gravity, no drag)
    pub fn step(&mut self) {
        self.position += self.velocity;
        self.velocity.y += PARTICLE_GRAVITY;
        self.life -= self.decay;
    }

    pub fn is_alive(&self) -> bool {
        self.life > 0.0
    }
}

/// The live particle collection of the firework layer
#[derive(Resource, Default, Debug)]
pub struct ParticleSystem {
    particles: Vec<Particle>,
}

impl ParticleSystem {
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn clear(&mut self) {
        self.particles.clear();
    }

    /// Append one burst at `origin`; returns the number of particles added
    pub fn emit_burst<R: Rng + ?Sized>(&mut self, origin: Vec2, rng: &mut R) -> usize {
        let count = rng.gen_range(BURST_SIZE_MIN..=BURST_SIZE_MAX);
        self.particles.reserve(count);

        for _ in 0..count {
            let vx = (rng.gen::<f32>() - 0.5) * PARTICLE_VELOCITY_SPREAD;
            let vy = (rng.gen::<f32>() - 0.5) * PARTICLE_VELOCITY_SPREAD - PARTICLE_UPWARD_BIAS;
            let [r, g, b] = FIREWORK_PALETTE[rng.gen_range(0..FIREWORK_PALETTE.len())];

            self.particles.push(Particle {
                position: origin,
                velocity: Vec2::new(vx, vy),
                life: 1.0,
                decay: rng.gen::<f32>() * PARTICLE_DECAY_RANGE + PARTICLE_DECAY_MIN,
                radius: rng.gen::<f32>() * PARTICLE_RADIUS_RANGE + PARTICLE_RADIUS_MIN,
                color: Color::srgb_u8(r, g, b),
            });
        }

        count
    }

    /// Step every particle and drop the ones that died this frame.
    /// Returns how many were removed.
    pub fn step(&mut self) -> usize {
        let mut removed = 0;

        // Reverse order: swap_remove pulls in an element that was already stepped
        for i in (0..self.particles.len()).rev() {
            let particle = &mut self.particles[i];
            particle.step();

            if !particle.is_alive() {
                self.particles.swap_remove(i);
                removed += 1;
            }
        }

        removed
    }
}
