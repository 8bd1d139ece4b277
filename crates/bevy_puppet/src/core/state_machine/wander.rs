use crate::core::config::WanderConfig;
use bevy::math::Vec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f32::consts::TAU;

/// Autonomous random-target locomotion. The target always lies within
/// `radius` of the origin; the current position approaches it at
/// `move_speed` per second, never overshooting, and a fresh target is drawn
/// uniformly in the disk on arrival.
#[derive(Debug)]
pub struct Wander {
    config: WanderConfig,
    rng: StdRng,
    current: Vec3,
    target: Vec3,
    yaw: f32,
}

/// What one wander step did.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum WanderStep {
    Moved,
    Arrived,
}

impl Wander {
    pub fn new(config: WanderConfig, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let mut wander = Self {
            config,
            rng,
            current: Vec3::ZERO,
            target: Vec3::ZERO,
            yaw: 0.0,
        };
        wander.retarget();
        wander
    }

    pub fn position(&self) -> Vec3 {
        self.current
    }

    pub fn target(&self) -> Vec3 {
        self.target
    }

    /// Yaw the body faces, toward the direction of travel.
    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn distance_to_target(&self) -> f32 {
        self.current.distance(self.target)
    }

    fn retarget(&mut self) {
        // redraw a handful of times if the fresh target would already count
        // as (nearly) reached, so a stroll is never zero-length
        for _ in 0..8 {
            let angle = self.rng.gen_range(0.0..TAU);
            let radius = self.rng.gen_range(0.0..self.config.radius);
            self.target = Vec3::new(angle.cos() * radius, 0.0, angle.sin() * radius);
            if self.distance_to_target() > self.config.arrival_epsilon * 2.0 {
                break;
            }
        }
    }

    /// Advance one tick. Returns whether the puppet moved or arrived (and
    /// drew a new target).
    pub fn advance(&mut self, dt: f32) -> WanderStep {
        let distance = self.distance_to_target();
        if distance <= self.config.arrival_epsilon {
            self.retarget();
            return WanderStep::Arrived;
        }

        let direction = (self.target - self.current).normalize_or_zero();
        let step = (self.config.move_speed * dt).min(distance);
        self.current += direction * step;
        if direction.length_squared() > 0.0 {
            self.yaw = direction.x.atan2(direction.z);
        }
        WanderStep::Moved
    }
}
