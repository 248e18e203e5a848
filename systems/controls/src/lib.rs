#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure controls system that translates frame input into player commands.

use frostbloom_core::{Command, Event, PlayerPose, Vec2};

/// Input snapshot distilled from adapter-provided frame input data.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PlayerInput {
    /// Indicates whether the player pressed fire on this frame.
    pub fire: bool,
    /// Indicates whether the player pressed jump on this frame.
    pub jump: bool,
    /// Indicates whether the player asked to try again after defeat.
    pub respawn: bool,
    /// Ground-plane position and heading the movement layer settled on this frame.
    pub movement: Option<Movement>,
}

/// Position and heading reported by the external movement layer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Movement {
    /// Ground-plane position.
    pub position: Vec2,
    /// Facing angle around the vertical axis, in radians.
    pub heading: f32,
}

impl Movement {
    /// Creates a new movement descriptor.
    #[must_use]
    pub const fn new(position: Vec2, heading: f32) -> Self {
        Self { position, heading }
    }
}

/// Direction a projectile travels when fired by a player facing `heading`.
#[must_use]
pub fn fire_direction(heading: f32) -> Vec2 {
    Vec2::new(-heading.sin(), -heading.cos())
}

/// Controls system that tracks whether the player can act and emits commands.
#[derive(Debug, Clone)]
pub struct Controls {
    active: bool,
}

impl Default for Controls {
    fn default() -> Self {
        Self::new()
    }
}

impl Controls {
    /// Creates a new controls system for a player who can act.
    #[must_use]
    pub const fn new() -> Self {
        Self { active: true }
    }

    /// Reports whether movement and combat input is currently honoured.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Consumes world events and frame input to emit player commands.
    ///
    /// While the session is over only a respawn request is honoured.
    pub fn handle(
        &mut self,
        events: &[Event],
        pose: &PlayerPose,
        input: PlayerInput,
        out: &mut Vec<Command>,
    ) {
        for event in events {
            match event {
                Event::SessionEnded { .. } => self.active = false,
                Event::PlayerRespawned => self.active = true,
                _ => {}
            }
        }

        if !self.active {
            if input.respawn {
                out.push(Command::Respawn);
            }
            return;
        }

        let (position, heading) = match input.movement {
            Some(movement) => {
                out.push(Command::SetPlayerPose {
                    position: movement.position,
                    heading: movement.heading,
                });
                (movement.position, movement.heading)
            }
            None => (pose.position, pose.heading),
        };

        if input.jump && pose.height <= 0.0 {
            out.push(Command::Jump);
        }

        if input.fire {
            out.push(Command::FireProjectile {
                origin: position,
                direction: fire_direction(heading),
            });
        }
    }
}
