//! Time-boxed effects evaluated against the world clock.

use std::{f32::consts::FRAC_PI_2, f32::consts::PI, time::Duration};

/// Length of the white or yellow hit flash.
pub const FLASH_DURATION: Duration = Duration::from_millis(100);

/// Length of an enemy's attack lunge.
pub const LUNGE_DURATION: Duration = Duration::from_millis(200);

/// Render scale of an enemy while lunging.
pub const LUNGE_SCALE: f32 = 1.2;

/// Length of the player's jump arc.
pub const JUMP_DURATION: Duration = Duration::from_millis(500);

/// Length of the victory celebration.
pub const CELEBRATION_DURATION: Duration = Duration::from_secs(6);

/// Time the player takes to fall flat after defeat.
pub const FALL_DURATION: Duration = Duration::from_millis(480);

const JUMP_HEIGHT: f32 = 2.0;
const FALL_STEP: Duration = Duration::from_millis(30);
const FALL_STEP_ANGLE: f32 = 0.1;

/// Effect that started at a world time and lasts a fixed duration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimedEffect {
    started: Duration,
    duration: Duration,
}

impl TimedEffect {
    /// Starts an effect at `started` lasting `duration`.
    #[must_use]
    pub const fn new(started: Duration, duration: Duration) -> Self {
        Self { started, duration }
    }

    /// World time at which the effect started.
    #[must_use]
    pub const fn started(&self) -> Duration {
        self.started
    }

    /// Length of the effect.
    #[must_use]
    pub const fn duration(&self) -> Duration {
        self.duration
    }

    /// World time at which the effect ends.
    #[must_use]
    pub fn ends_at(&self) -> Duration {
        self.started.saturating_add(self.duration)
    }

    /// Reports whether the effect still applies; the end instant is inclusive.
    #[must_use]
    pub fn is_active(&self, now: Duration) -> bool {
        now <= self.ends_at()
    }

    /// Time left before the effect ends.
    #[must_use]
    pub fn remaining(&self, now: Duration) -> Duration {
        self.ends_at().saturating_sub(now)
    }

    /// Time since the effect started.
    #[must_use]
    pub fn elapsed(&self, now: Duration) -> Duration {
        now.saturating_sub(self.started)
    }

    /// Fraction of the effect that has played, clamped to `0.0..=1.0`.
    #[must_use]
    pub fn progress(&self, now: Duration) -> f32 {
        if self.duration.is_zero() {
            return 1.0;
        }
        (self.elapsed(now).as_secs_f32() / self.duration.as_secs_f32()).clamp(0.0, 1.0)
    }
}

/// Height of the jump arc at `progress` through the jump.
#[must_use]
pub fn jump_height(progress: f32) -> f32 {
    (progress.clamp(0.0, 1.0) * PI).sin() * JUMP_HEIGHT
}

/// Sideways tilt of a defeated player `elapsed` after the fall began.
#[must_use]
pub fn fall_tilt(elapsed: Duration) -> f32 {
    let steps = elapsed.as_millis() / FALL_STEP.as_millis();
    (steps as f32 * FALL_STEP_ANGLE).min(FRAC_PI_2)
}

/// Bounce height of a celebrating player `elapsed` into the celebration.
#[must_use]
pub fn celebration_height(elapsed: Duration) -> f32 {
    if elapsed > CELEBRATION_DURATION {
        return 0.0;
    }
    (elapsed.as_secs_f32() * 3.0).sin().abs() * 0.3
}

/// Extra yaw of a celebrating player `elapsed` into the celebration.
#[must_use]
pub fn celebration_spin(elapsed: Duration) -> f32 {
    elapsed.min(CELEBRATION_DURATION).as_secs_f32()
}

/// Hover height of a collectible at `now` with the provided phase.
#[must_use]
pub fn bob_height(now: Duration, phase: f32) -> f32 {
    0.5 + (crate::millis(now) * 0.003 + phase).sin() * 0.2
}
