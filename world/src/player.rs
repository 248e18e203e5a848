use std::time::Duration;

use frostbloom_combat::{
    celebration_height, celebration_spin, fall_tilt, jump_height, TimedEffect, Vitals,
    CELEBRATION_DURATION, FALL_DURATION, JUMP_DURATION,
};
use frostbloom_core::{PlayerPose, Vec2};

/// Player state owned by the world: position, health and time-boxed animations.
#[derive(Clone, Debug)]
pub(crate) struct Player {
    pub(crate) position: Vec2,
    pub(crate) heading: f32,
    pub(crate) vitals: Vitals,
    pub(crate) alive: bool,
    jump: Option<TimedEffect>,
    fall: Option<TimedEffect>,
    celebration: Option<TimedEffect>,
}

impl Player {
    pub(crate) fn new(max_health: u32) -> Self {
        Self {
            position: Vec2::ZERO,
            heading: 0.0,
            vitals: Vitals::full(max_health),
            alive: true,
            jump: None,
            fall: None,
            celebration: None,
        }
    }

    pub(crate) fn jump(&mut self, now: Duration) {
        self.jump = Some(TimedEffect::new(now, JUMP_DURATION));
    }

    pub(crate) fn fall(&mut self, now: Duration) {
        self.alive = false;
        self.vitals.deplete();
        self.fall = Some(TimedEffect::new(now, FALL_DURATION));
    }

    pub(crate) fn celebrate(&mut self, now: Duration) {
        self.alive = false;
        self.celebration = Some(TimedEffect::new(now, CELEBRATION_DURATION));
    }

    pub(crate) fn respawn(&mut self) {
        *self = Self::new(self.vitals.max());
    }

    pub(crate) fn pose(&self, now: Duration) -> PlayerPose {
        let mut pose = PlayerPose {
            position: self.position,
            heading: self.heading,
            height: 0.0,
            tilt: 0.0,
            spin: 0.0,
        };

        if let Some(jump) = self.jump.filter(|jump| jump.is_active(now)) {
            pose.height = jump_height(jump.progress(now));
        }
        if let Some(fall) = self.fall {
            pose.tilt = fall_tilt(fall.elapsed(now));
        }
        if let Some(celebration) = self.celebration {
            let elapsed = celebration.elapsed(now);
            pose.height = celebration_height(elapsed);
            pose.spin = celebration_spin(elapsed);
        }
        pose
    }
}
