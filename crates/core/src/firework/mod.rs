use std::f32::consts::TAU;

use glam::Vec2;

use crate::{
    color::Palette,
    config::{BurstConfig, BurstPattern, FireworksConfig, PhysicsConfig},
    particle::Particle,
    random::RandomSource,
};

/// Lifecycle of a firework. `Exploded` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FireworkState {
    Ascending,
    Exploded,
}

/// What happened to a firework during one [`Firework::step`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Ascending,
    /// The rocket detonated this tick and produced its burst.
    Exploded,
    Decaying,
    /// Exploded and every particle has expired.
    Finished,
}

/// A rocket that ascends until it reaches its target altitude, then owns a
/// burst of particles until they have all faded.
#[derive(Debug, Clone)]
pub struct Firework {
    rocket_position: Vec2,
    rocket_velocity: Vec2,
    target_altitude: f32,
    state: FireworkState,
    particles: Vec<Particle>,
    palette: Palette,
}

impl Firework {
    pub fn new(position: Vec2, velocity: Vec2, target_altitude: f32, palette: Palette) -> Self {
        Self {
            rocket_position: position,
            rocket_velocity: velocity,
            target_altitude,
            state: FireworkState::Ascending,
            particles: Vec::new(),
            palette,
        }
    }

    /// Samples a launch site near the bottom edge, a target altitude in the
    /// upper band, an upward speed and a small horizontal drift.
    pub fn spawn(config: &FireworksConfig, rng: &mut dyn RandomSource) -> Self {
        let width = config.canvas.width as f32;
        let height = config.canvas.height as f32;
        let launch = &config.launch;

        let x = rng.uniform(
            width * launch.horizontal_band.min,
            width * launch.horizontal_band.max,
        );
        let target_altitude = rng.uniform(
            height * launch.target_band.min,
            height * launch.target_band.max,
        );
        let drift = rng.uniform(-launch.drift, launch.drift);
        let speed = launch.rocket_speed.sample(rng);
        let palette = Palette::generate(&config.palette, rng);

        Self::new(
            Vec2::new(x, height - launch.launch_inset),
            Vec2::new(drift, -speed),
            target_altitude,
            palette,
        )
    }

    /// Advances one tick in whichever phase the firework is in.
    pub fn step(
        &mut self,
        physics: &PhysicsConfig,
        burst: &BurstConfig,
        rng: &mut dyn RandomSource,
    ) -> StepOutcome {
        match self.state {
            FireworkState::Ascending => {
                self.rocket_velocity.y += physics.rocket_gravity();
                self.rocket_position += self.rocket_velocity;

                // Screen y grows downward. The apex check catches rockets too
                // slow to reach their target.
                if self.rocket_position.y <= self.target_altitude || self.rocket_velocity.y >= 0.0 {
                    self.explode(burst, rng);
                    StepOutcome::Exploded
                } else {
                    StepOutcome::Ascending
                }
            }
            FireworkState::Exploded => {
                self.particles.retain_mut(|particle| particle.step(physics));
                if self.particles.is_empty() {
                    StepOutcome::Finished
                } else {
                    StepOutcome::Decaying
                }
            }
        }
    }

    /// Replaces the rocket with `burst.particle_count` particles at the
    /// rocket position. Has no effect once exploded.
    pub fn explode(&mut self, burst: &BurstConfig, rng: &mut dyn RandomSource) {
        if self.state == FireworkState::Exploded {
            return;
        }
        self.state = FireworkState::Exploded;

        let count = burst.particle_count;
        self.particles.reserve_exact(count);
        for i in 0..count {
            let angle = match burst.pattern {
                BurstPattern::Random => rng.uniform(0.0, TAU),
                BurstPattern::Ring => {
                    TAU * (i as f32 / count as f32)
                        + rng.uniform(-burst.ring_jitter, burst.ring_jitter)
                }
            };
            let speed = burst.speed.sample(rng);
            let velocity = Vec2::from_angle(angle) * speed;
            let lifetime = burst.lifetime.sample(rng);
            let color = self.palette.choose(rng);
            let size = burst.size.sample(rng);

            self.particles.push(Particle::new(
                self.rocket_position,
                velocity,
                lifetime,
                color,
                size,
            ));
        }

        tracing::debug!(
            x = self.rocket_position.x,
            y = self.rocket_position.y,
            particles = count,
            "firework exploded"
        );
    }

    pub fn state(&self) -> FireworkState {
        self.state
    }

    pub fn is_exploded(&self) -> bool {
        self.state == FireworkState::Exploded
    }

    /// Exploded with nothing left to draw; ready to be dropped.
    pub fn is_finished(&self) -> bool {
        self.is_exploded() && self.particles.is_empty()
    }

    pub fn rocket_position(&self) -> Vec2 {
        self.rocket_position
    }

    pub fn rocket_velocity(&self) -> Vec2 {
        self.rocket_velocity
    }

    pub fn target_altitude(&self) -> f32 {
        self.target_altitude
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }
}
