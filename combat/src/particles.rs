//! Explosion particle bursts.

use std::f32::consts::TAU;

use frostbloom_core::{Explosion, Vec3};

const HORIZONTAL_SPEED: f32 = 0.1;
const BASE_LIFT: f32 = 0.15;
const LIFT_JITTER: f32 = 0.1;
const GRAVITY: f32 = 0.01;

/// Single particle of an explosion burst, stepped once per frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Particle {
    /// Position with `y` pointing up.
    pub position: Vec3,
    /// Displacement applied on the next step.
    pub velocity: Vec3,
}

impl Particle {
    /// Advances the particle by one frame and reports whether it is still airborne.
    pub fn step(&mut self) -> bool {
        self.velocity.y -= GRAVITY;
        self.position += self.velocity;
        self.position.y > 0.0
    }
}

/// Fans `explosion.particle_count` particles out evenly around the burst centre.
///
/// `jitter` yields values in `0.0..1.0` that vary each particle's initial lift.
pub fn burst<J>(explosion: &Explosion, height: f32, mut jitter: J) -> Vec<Particle>
where
    J: FnMut() -> f32,
{
    let count = explosion.particle_count;
    let origin = Vec3::new(explosion.position.x, height, explosion.position.y);
    (0..count)
        .map(|index| {
            let angle = index as f32 / count as f32 * TAU;
            Particle {
                position: origin,
                velocity: Vec3::new(
                    angle.cos() * HORIZONTAL_SPEED,
                    BASE_LIFT + jitter() * LIFT_JITTER,
                    angle.sin() * HORIZONTAL_SPEED,
                ),
            }
        })
        .collect()
}
