#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Combat primitives shared by every world.
//!
//! The helpers in this crate are pure: they operate on plain values and the
//! world clock, never on registries. The world composes them into per-frame
//! enemy, projectile and collectible updates.

use std::time::Duration;

use frostbloom_core::Vec2;

mod bands;
mod effects;
mod particles;

pub use bands::{DistanceBand, HealthBand};
pub use effects::{
    bob_height, celebration_height, celebration_spin, fall_tilt, jump_height, TimedEffect,
    CELEBRATION_DURATION, FALL_DURATION, FLASH_DURATION, JUMP_DURATION, LUNGE_DURATION,
    LUNGE_SCALE,
};
pub use particles::{burst, Particle};

/// Wobble rate of an enemy closing in, per millisecond.
pub const SEEK_WOBBLE_RATE: f32 = 0.01;

/// Wobble rate of a scattered enemy, per millisecond.
pub const SCATTER_WOBBLE_RATE: f32 = 0.015;

/// Result of moving an entity toward a target for one frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Seek {
    /// Position after the frame.
    pub position: Vec2,
    /// Distance to the target measured before moving.
    pub distance: f32,
    /// Whether the entity moved this frame.
    pub advanced: bool,
}

/// Moves `position` toward `target` by `speed` unless it is within `stop_distance`.
///
/// The returned distance is measured before the move so attack checks see the
/// same distance that decided whether to advance.
#[must_use]
pub fn seek(position: Vec2, target: Vec2, speed: f32, stop_distance: f32) -> Seek {
    let offset = target - position;
    let distance = offset.length();
    if distance <= stop_distance || distance <= f32::EPSILON {
        return Seek {
            position,
            distance,
            advanced: false,
        };
    }

    Seek {
        position: position + offset / distance * speed,
        distance,
        advanced: true,
    }
}

/// Facing angle that looks along `direction`, matching the scene's yaw convention.
#[must_use]
pub fn heading_toward(direction: Vec2) -> f32 {
    direction.x.atan2(direction.y)
}

/// Signed wobble phase at `now` for an entity with the provided offset.
#[must_use]
pub fn wobble(now: Duration, offset: f32, rate: f32) -> f32 {
    (millis(now) * rate + offset).sin()
}

/// Circle test between two ground positions; touching circles do not collide.
#[must_use]
pub fn within(a: Vec2, b: Vec2, radius: f32) -> bool {
    a.distance(b) < radius
}

/// Expresses a duration as fractional milliseconds.
#[must_use]
pub fn millis(duration: Duration) -> f32 {
    duration.as_secs_f32() * 1000.0
}

/// Tracks when an attacker last struck.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AttackClock {
    last: Option<Duration>,
}

impl AttackClock {
    /// Creates a clock that is ready to strike immediately.
    #[must_use]
    pub const fn new() -> Self {
        Self { last: None }
    }

    /// Reports whether more than `cooldown` has elapsed since the last strike.
    fn is_ready(&self, now: Duration, cooldown: Duration) -> bool {
        self.last
            .map_or(true, |last| now.saturating_sub(last) > cooldown)
    }

    /// Strikes when the target is in range and the cooldown elapsed.
    ///
    /// `on_hit` runs at most once and only when the strike lands; the strike
    /// time is recorded afterwards. Returns whether the strike landed.
    pub fn try_strike<F>(
        &mut self,
        distance: f32,
        range: f32,
        now: Duration,
        cooldown: Duration,
        on_hit: F,
    ) -> bool
    where
        F: FnOnce(),
    {
        if distance > range || !self.is_ready(now, cooldown) {
            return false;
        }
        on_hit();
        self.last = Some(now);
        true
    }
}

/// Health pool clamped to `0..=max`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Vitals {
    current: u32,
    max: u32,
}

impl Vitals {
    /// Creates a full health pool.
    #[must_use]
    pub const fn full(max: u32) -> Self {
        Self { current: max, max }
    }

    /// Remaining health.
    #[must_use]
    pub const fn current(&self) -> u32 {
        self.current
    }

    /// Maximum health.
    #[must_use]
    pub const fn max(&self) -> u32 {
        self.max
    }

    /// Reports whether no health remains.
    #[must_use]
    pub const fn is_depleted(&self) -> bool {
        self.current == 0
    }

    /// Remaining health as a percentage of the maximum.
    #[must_use]
    pub fn percent(&self) -> f32 {
        if self.max == 0 {
            return 0.0;
        }
        self.current as f32 / self.max as f32 * 100.0
    }

    /// Removes up to `amount` health and returns the health actually lost.
    pub fn damage(&mut self, amount: u32) -> u32 {
        let lost = amount.min(self.current);
        self.current -= lost;
        lost
    }

    /// Restores up to `amount` health and returns the health actually gained.
    pub fn heal(&mut self, amount: u32) -> u32 {
        let gained = amount.min(self.max - self.current);
        self.current += gained;
        gained
    }

    /// Drops health to zero.
    pub fn deplete(&mut self) {
        self.current = 0;
    }
}

/// Removes every entry from `items`, passing each to `release` newest first.
///
/// Returns the number of released entries; sweeping an empty list is a no-op.
pub fn sweep<T, F>(items: &mut Vec<T>, mut release: F) -> usize
where
    F: FnMut(T),
{
    let count = items.len();
    while let Some(item) = items.pop() {
        release(item);
    }
    count
}
