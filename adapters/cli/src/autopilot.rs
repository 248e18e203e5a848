//! Scripted player that walks to the objective, fires at the closest enemy
//! and detours for pickups.

use frostbloom_core::{CollectibleKind, Outcome, Vec2};
use frostbloom_system_controls::{Movement, PlayerInput};
use frostbloom_world::{query, World};

/// Distance kept beyond the victory radius while the boss is still around.
const HOLD_MARGIN: f32 = 1.0;

/// Pickups farther than this are ignored.
const DETOUR_RADIUS: f32 = 12.0;

/// Deterministic input source for headless sessions.
#[derive(Clone, Debug)]
pub(crate) struct Autopilot {
    frame: u64,
    step: f32,
    fire_every: u64,
    jump_every: u64,
}

impl Autopilot {
    /// Creates an autopilot that moves `step` units per frame and fires every
    /// `fire_every` frames.
    #[must_use]
    pub(crate) fn new(step: f32, fire_every: u64) -> Self {
        Self {
            frame: 0,
            step,
            fire_every: fire_every.max(1),
            jump_every: 90,
        }
    }

    /// Decides this frame's input from the world state.
    pub(crate) fn decide(&mut self, world: &World) -> PlayerInput {
        self.frame += 1;
        let status = query::status(world);
        if status.outcome.is_some() || !status.player_alive {
            return PlayerInput {
                respawn: status.outcome == Some(Outcome::Lost),
                ..PlayerInput::default()
            };
        }

        let profile = query::profile(world);
        let pose = query::player_pose(world);
        let wounded = status.player_health * 2 < status.player_max_health;

        let pickup = query::collectibles(world)
            .into_iter()
            .filter(|collectible| match collectible.kind {
                CollectibleKind::Gift => !status.special_ability_active,
                CollectibleKind::Health => wounded,
                CollectibleKind::Power => true,
            })
            .map(|collectible| collectible.position)
            .filter(|position| position.distance(pose.position) <= DETOUR_RADIUS)
            .min_by(|a, b| {
                a.distance(pose.position)
                    .total_cmp(&b.distance(pose.position))
            });

        let target = pickup.unwrap_or_else(|| {
            if status.boss_defeated {
                profile.anchor
            } else {
                let hold = profile.victory.distance + HOLD_MARGIN;
                let away = (pose.position - profile.anchor).normalize_or_zero();
                if status.distance_to_anchor <= hold {
                    pose.position
                } else {
                    profile.anchor + away * hold
                }
            }
        });
        let position = pose.position + (target - pose.position).clamp_length_max(self.step);

        let nearest = query::enemies(world)
            .into_iter()
            .map(|enemy| enemy.position)
            .min_by(|a, b| a.distance(position).total_cmp(&b.distance(position)));

        let heading = match nearest {
            Some(enemy) => aim(position, enemy).unwrap_or(pose.heading),
            None => aim(pose.position, target).unwrap_or(pose.heading),
        };

        let scatter_reach = profile.scatter.as_ref().map(|scatter| scatter.radius);
        let jump = match (nearest, scatter_reach) {
            (Some(enemy), Some(radius)) => {
                self.frame % self.jump_every == 0 && enemy.distance(position) < radius
            }
            _ => false,
        };

        PlayerInput {
            fire: nearest.is_some() && self.frame % self.fire_every == 0,
            jump,
            respawn: false,
            movement: Some(Movement::new(position, heading)),
        }
    }
}

/// Heading that makes a player at `from` face `to`.
fn aim(from: Vec2, to: Vec2) -> Option<f32> {
    let offset = to - from;
    if offset.length_squared() <= f32::EPSILON {
        return None;
    }
    Some((-offset.x).atan2(-offset.y))
}
