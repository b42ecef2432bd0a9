use glam::Vec2;

use crate::{color::Rgb, config::PhysicsConfig};

/// A single decaying spark from a burst.
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub position: Vec2,
    pub velocity: Vec2,
    /// Remaining ticks; always positive while the particle is owned by a
    /// firework.
    pub lifetime: u32,
    pub color: Rgb,
    /// Radius in pixels. Visual only.
    pub size: f32,
}

impl Particle {
    pub fn new(position: Vec2, velocity: Vec2, lifetime: u32, color: Rgb, size: f32) -> Self {
        Self {
            position,
            velocity,
            lifetime,
            color,
            size,
        }
    }

    /// Advances one tick: drag on both axes, then gravity on the vertical
    /// axis, then an Euler position step with the decayed velocity.
    ///
    /// Returns `false` once the lifetime has run out; the caller drops the
    /// particle in the same tick.
    pub fn step(&mut self, physics: &PhysicsConfig) -> bool {
        self.velocity *= physics.air_drag;
        self.velocity.y += physics.gravity;
        self.position += self.velocity;
        self.lifetime = self.lifetime.saturating_sub(1);
        self.is_alive()
    }

    pub fn is_alive(&self) -> bool {
        self.lifetime > 0
    }

    /// Linear brightness for a particle relative to the longest configured
    /// lifetime, clamped to `[0, 1]`.
    pub fn brightness(&self, max_lifetime: u32) -> f32 {
        if max_lifetime == 0 {
            return 0.0;
        }
        (self.lifetime as f32 / max_lifetime as f32).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn physics() -> PhysicsConfig {
        PhysicsConfig {
            gravity: 0.15,
            air_drag: 0.995,
            rocket_gravity_scale: 0.6,
        }
    }

    fn particle(lifetime: u32) -> Particle {
        Particle::new(Vec2::ZERO, Vec2::new(3.0, -4.0), lifetime, Rgb(255, 0, 0), 2.0)
    }

    #[test]
    fn step_applies_drag_then_gravity_then_moves() {
        let mut p = particle(10);
        assert!(p.step(&physics()));

        assert!((p.velocity.x - 3.0 * 0.995).abs() < 1e-6);
        assert!((p.velocity.y - (-4.0 * 0.995 + 0.15)).abs() < 1e-6);
        assert_eq!(p.position, p.velocity);
        assert_eq!(p.lifetime, 9);
    }

    #[test]
    fn last_tick_of_life_expires() {
        let mut p = particle(1);
        assert!(p.is_alive());
        assert!(!p.step(&physics()));
        assert_eq!(p.lifetime, 0);
    }

    #[test]
    fn vertical_velocity_converges_without_oscillating() {
        let physics = physics();
        let terminal = physics.gravity / (1.0 - physics.air_drag);
        let mut p = particle(5_000);
        let mut previous_gap = (terminal - p.velocity.y).abs();

        while p.step(&physics) {
            let gap = terminal - p.velocity.y;
            // Approaches from below and never crosses.
            assert!(gap >= -1e-3, "overshot terminal velocity: {gap}");
            assert!(gap.abs() <= previous_gap + 1e-4);
            previous_gap = gap.abs();
        }
        assert!(previous_gap < 1.0);
    }

    #[test]
    fn brightness_scales_with_remaining_life() {
        assert_eq!(particle(75).brightness(75), 1.0);
        assert!((particle(30).brightness(75) - 0.4).abs() < 1e-6);
        assert_eq!(particle(90).brightness(75), 1.0);
    }
}
