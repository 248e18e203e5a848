#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic spawning system responsible for emitting enemy and collectible spawn commands.

use std::{f32::consts::TAU, time::Duration};

use frostbloom_core::{Command, Event, PickupStream, SpawnContext, Vec2, WorldProfile};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::trace;

/// Configuration parameters required to construct the spawning system.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    enemy_interval: Duration,
    collectible_interval: Duration,
    nearby_interval: Option<Duration>,
    rng_seed: u64,
}

impl Config {
    /// Creates a new configuration using the provided spawn cadences and seed.
    #[must_use]
    pub const fn new(enemy_interval: Duration, collectible_interval: Duration, rng_seed: u64) -> Self {
        Self {
            enemy_interval,
            collectible_interval,
            nearby_interval: None,
            rng_seed,
        }
    }

    /// Adds a cadence for the short-range pickup stream.
    #[must_use]
    pub const fn with_nearby(mut self, interval: Duration) -> Self {
        self.nearby_interval = Some(interval);
        self
    }

    /// Reads every cadence from a world profile.
    #[must_use]
    pub fn from_profile(profile: &WorldProfile, rng_seed: u64) -> Self {
        let config = Self::new(
            profile.enemy.spawn_interval,
            profile.collectibles.spawn_interval,
            rng_seed,
        );
        match &profile.nearby {
            Some(nearby) => config.with_nearby(nearby.spawn_interval),
            None => config,
        }
    }
}

/// Time since the last attempt of one spawn stream.
#[derive(Clone, Copy, Debug)]
struct Cadence {
    interval: Duration,
    elapsed: Duration,
}

impl Cadence {
    const fn new(interval: Duration) -> Self {
        Self {
            interval,
            elapsed: Duration::ZERO,
        }
    }

    /// Returns whether an attempt is due once `dt` has passed. At most one
    /// attempt is due per call, and a due attempt restarts the wait.
    fn advance(&mut self, dt: Duration) -> bool {
        self.elapsed = self.elapsed.saturating_add(dt);
        if self.interval.is_zero() || self.elapsed <= self.interval {
            return false;
        }
        self.elapsed = Duration::ZERO;
        true
    }

    fn restart(&mut self) {
        self.elapsed = Duration::ZERO;
    }
}

/// Pure system that emits spawn commands on fixed cadences with seeded placement.
#[derive(Debug)]
pub struct Spawning {
    enemies: Cadence,
    collectibles: Cadence,
    nearby: Option<Cadence>,
    rng: ChaCha8Rng,
}

impl Spawning {
    /// Creates a new spawning system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            enemies: Cadence::new(config.enemy_interval),
            collectibles: Cadence::new(config.collectible_interval),
            nearby: config.nearby_interval.map(Cadence::new),
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
        }
    }

    /// Consumes events and the world's spawn context to emit spawn commands.
    ///
    /// Each stream makes at most one attempt per call, however much time
    /// passed. An enemy attempt at the live cap emits nothing but still
    /// restarts the enemy wait. Nothing is scheduled while the player is
    /// down; every cadence restarts from zero once play resumes.
    pub fn handle(
        &mut self,
        events: &[Event],
        context: &SpawnContext,
        profile: &WorldProfile,
        out: &mut Vec<Command>,
    ) {
        let respawned = events
            .iter()
            .any(|event| matches!(event, Event::PlayerRespawned));
        if !context.player_alive || respawned {
            self.enemies.restart();
            self.collectibles.restart();
            if let Some(nearby) = &mut self.nearby {
                nearby.restart();
            }
            return;
        }

        let mut accumulated = Duration::ZERO;
        for event in events {
            if let Event::TimeAdvanced { dt, .. } = event {
                accumulated = accumulated.saturating_add(*dt);
            }
        }

        if accumulated.is_zero() {
            return;
        }

        if self.enemies.advance(accumulated) && context.live_enemies < context.max_enemies {
            out.push(self.enemy_command(context.anchor, profile));
        }

        if self.collectibles.advance(accumulated) {
            out.extend(self.collectible_command(PickupStream::Primary, context, profile));
        }

        let nearby_due = self
            .nearby
            .as_mut()
            .is_some_and(|nearby| nearby.advance(accumulated));
        if nearby_due {
            out.extend(self.collectible_command(PickupStream::Nearby, context, profile));
        }
    }

    fn enemy_command(&mut self, anchor: Vec2, profile: &WorldProfile) -> Command {
        let tuning = &profile.enemy;
        let angle = self.rng.gen_range(0.0..TAU);
        let position = anchor + Vec2::new(angle.cos(), angle.sin()) * tuning.spawn_radius;
        let speed = self.sample(tuning.speed_min, tuning.speed_max);
        let wobble_offset = self.rng.gen_range(0.0..TAU);
        trace!(x = position.x, z = position.y, speed, "scheduling enemy spawn");
        Command::SpawnEnemy {
            position,
            speed,
            wobble_offset,
        }
    }

    fn collectible_command(
        &mut self,
        stream: PickupStream,
        context: &SpawnContext,
        profile: &WorldProfile,
    ) -> Option<Command> {
        let tuning = profile.pickups(stream)?;
        let angle = self.rng.gen_range(0.0..TAU);
        let distance = self.sample(tuning.min_distance, tuning.max_distance);
        let position = context.player_position + Vec2::new(angle.cos(), angle.sin()) * distance;
        let pool = if context.gift_quota_open() {
            &tuning.before_quota
        } else {
            &tuning.after_quota
        };
        let roll: f32 = self.rng.gen();
        let kind = pool.pick(roll)?;
        trace!(?kind, ?stream, x = position.x, z = position.y, "scheduling collectible spawn");
        Some(Command::SpawnCollectible {
            position,
            kind,
            stream,
        })
    }

    fn sample(&mut self, low: f32, high: f32) -> f32 {
        if high > low {
            self.rng.gen_range(low..high)
        } else {
            low
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cadence_without_interval_never_fires() {
        let mut cadence = Cadence::new(Duration::ZERO);
        assert!(!cadence.advance(Duration::from_secs(10)));
    }

    #[test]
    fn cadence_fires_once_strictly_after_the_interval() {
        let mut cadence = Cadence::new(Duration::from_millis(2000));
        assert!(!cadence.advance(Duration::from_millis(2000)));
        assert!(cadence.advance(Duration::from_millis(1)));
        assert!(!cadence.advance(Duration::from_millis(1999)));
        assert!(cadence.advance(Duration::from_millis(10_000)));
        assert_eq!(cadence.elapsed, Duration::ZERO);
    }

    #[test]
    fn degenerate_range_samples_lower_bound() {
        let mut spawning = Spawning::new(Config::new(Duration::ZERO, Duration::ZERO, 7));
        assert_eq!(spawning.sample(0.1, 0.1), 0.1);
    }
}
