//! Per-world tuning tables that parametrise a combat session.
//!
//! Both worlds run the same simulation; everything that differs between them
//! lives in a [`WorldProfile`]. Winter-only mechanics are optional blocks so a
//! world without them simply leaves the block empty.

use std::time::Duration;

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{CollectibleKind, EffectColor, PickupStream, WorldKind};

/// Complete tuning for one world load.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WorldProfile {
    /// World the profile describes.
    pub world: WorldKind,
    /// Ground-plane position of the castle or palace the player travels to.
    pub anchor: Vec2,
    /// Regular enemies farther than this from the anchor are despawned.
    pub despawn_radius: f32,
    /// Health the player starts each session with.
    pub player_max_health: u32,
    /// Regular enemy tuning.
    pub enemy: EnemyTuning,
    /// Boss tuning.
    pub boss: BossTuning,
    /// Player projectile tuning.
    pub projectile: ProjectileTuning,
    /// Collectible scheduling, pools and rewards.
    pub collectibles: CollectibleTuning,
    /// Short-range pickup stream sharing the gift quota, if the world has one.
    pub nearby: Option<CollectibleTuning>,
    /// Damage multiplier window opened by power pickups, if the world has one.
    pub power_up: Option<PowerUpTuning>,
    /// Jump scatter behaviour, if the world has one.
    pub scatter: Option<ScatterTuning>,
    /// Win condition and bonus.
    pub victory: VictoryTuning,
}

/// Regular enemy tuning.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EnemyTuning {
    /// Cap on simultaneously live regular enemies.
    pub max_live: usize,
    /// Delay between spawn attempts.
    #[serde(with = "millis")]
    pub spawn_interval: Duration,
    /// Distance from the anchor at which enemies appear.
    pub spawn_radius: f32,
    /// Slowest possible movement speed, in units per frame.
    pub speed_min: f32,
    /// Fastest possible movement speed, in units per frame.
    pub speed_max: f32,
    /// Health each enemy spawns with.
    pub health: u32,
    /// Distance within which the enemy can attack.
    pub attack_range: f32,
    /// Distance at which the enemy stops closing in.
    pub stop_distance: f32,
    /// Damage dealt per attack.
    pub damage: u32,
    /// Minimum time between two attacks of the same enemy.
    #[serde(with = "millis")]
    pub attack_cooldown: Duration,
    /// Radius used for projectile collision.
    pub hit_radius: f32,
    /// Score awarded per kill.
    pub kill_score: u64,
    /// Particle burst emitted on defeat.
    pub explosion: ExplosionTuning,
}

/// Boss tuning.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BossTuning {
    /// Distance to the anchor below which the boss appears.
    pub trigger_distance: f32,
    /// Offset from the anchor at which the boss appears.
    pub offset: Vec2,
    /// Movement speed, in units per frame.
    pub speed: f32,
    /// Health the boss spawns with.
    pub health: u32,
    /// Distance within which the boss can attack.
    pub attack_range: f32,
    /// Distance at which the boss stops closing in.
    pub stop_distance: f32,
    /// Damage dealt per attack.
    pub damage: u32,
    /// Minimum time between two attacks.
    #[serde(with = "millis")]
    pub attack_cooldown: Duration,
    /// Radius used for projectile collision.
    pub hit_radius: f32,
    /// Uniform render scale.
    pub scale: f32,
    /// Score awarded for the kill.
    pub kill_score: u64,
    /// Particle burst emitted on defeat.
    pub explosion: ExplosionTuning,
}

/// Particle burst parameters.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExplosionTuning {
    /// Number of particles emitted.
    pub particles: u32,
    /// Particle colour.
    pub color: EffectColor,
    /// Particle radius.
    pub size: f32,
}

/// Player projectile tuning.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProjectileTuning {
    /// Distance travelled per frame.
    pub speed: f32,
    /// Age after which a projectile is removed.
    #[serde(with = "millis")]
    pub lifetime: Duration,
}

/// Collectible scheduling, pools and rewards.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CollectibleTuning {
    /// Delay between collectible spawns.
    #[serde(with = "millis")]
    pub spawn_interval: Duration,
    /// Inner radius of the spawn annulus around the player.
    pub min_distance: f32,
    /// Outer radius of the spawn annulus around the player.
    pub max_distance: f32,
    /// Distance below which the player picks a collectible up.
    pub pickup_radius: f32,
    /// Age after which an untouched collectible is removed.
    #[serde(with = "millis")]
    pub time_to_live: Duration,
    /// Health restored by a health pickup.
    pub heal_amount: u32,
    /// Gifts required to unlock the special ability.
    pub gifts_needed: u32,
    /// Score awarded for a health pickup.
    pub health_score: u64,
    /// Score awarded for a power pickup.
    pub power_score: u64,
    /// Score awarded for a gift pickup.
    pub gift_score: u64,
    /// Whether power pickups from this stream open the damage window.
    pub grants_power_up: bool,
    /// Pool rolled while the gift quota is open.
    pub before_quota: PickupPool,
    /// Pool rolled once the gift quota is met.
    pub after_quota: PickupPool,
}

impl CollectibleTuning {
    /// Score awarded for picking up a collectible of the provided kind.
    #[must_use]
    pub const fn score_for(&self, kind: CollectibleKind) -> u64 {
        match kind {
            CollectibleKind::Health => self.health_score,
            CollectibleKind::Power => self.power_score,
            CollectibleKind::Gift => self.gift_score,
        }
    }

    fn validate(&self, stream: PickupStream) -> Result<(), ProfileError> {
        let [interval, ttl, radius, before, after] = match stream {
            PickupStream::Primary => [
                "collectibles.spawn_interval",
                "collectibles.time_to_live",
                "collectibles.pickup_radius",
                "before_quota",
                "after_quota",
            ],
            PickupStream::Nearby => [
                "nearby.spawn_interval",
                "nearby.time_to_live",
                "nearby.pickup_radius",
                "nearby.before_quota",
                "nearby.after_quota",
            ],
        };
        non_zero(interval, self.spawn_interval)?;
        non_zero(ttl, self.time_to_live)?;
        positive(radius, self.pickup_radius)?;
        if !(self.min_distance >= 0.0 && self.min_distance <= self.max_distance) {
            return Err(ProfileError::InvertedAnnulus {
                min: self.min_distance,
                max: self.max_distance,
            });
        }
        self.before_quota.validate(before)?;
        self.after_quota.validate(after)
    }
}

/// Weighted pickup pool expressed as cumulative thresholds on a unit roll.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PickupPool {
    /// Entries ordered by strictly increasing threshold.
    pub entries: Vec<PoolEntry>,
}

/// One band of a [`PickupPool`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PoolEntry {
    /// Rolls strictly below this threshold select the entry.
    pub below: f32,
    /// Kind selected by the band.
    pub kind: CollectibleKind,
}

impl PickupPool {
    /// Creates a pool from its bands.
    #[must_use]
    pub fn new(entries: Vec<PoolEntry>) -> Self {
        Self { entries }
    }

    /// Resolves a roll in `[0, 1)` to a collectible kind.
    ///
    /// Rolls beyond the last threshold fall back to the last band so the pool
    /// always yields a kind once validated.
    #[must_use]
    pub fn pick(&self, roll: f32) -> Option<CollectibleKind> {
        self.entries
            .iter()
            .find(|entry| roll < entry.below)
            .or_else(|| self.entries.last())
            .map(|entry| entry.kind)
    }

    fn validate(&self, pool: &'static str) -> Result<(), ProfileError> {
        if self.entries.is_empty() {
            return Err(ProfileError::EmptyPool { pool });
        }
        let sorted = self
            .entries
            .windows(2)
            .all(|pair| pair[0].below < pair[1].below);
        if !sorted || self.entries[0].below <= 0.0 {
            return Err(ProfileError::UnsortedPool { pool });
        }
        Ok(())
    }
}

/// Damage multiplier window opened by power pickups.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PowerUpTuning {
    /// Length of the window.
    #[serde(with = "millis")]
    pub duration: Duration,
    /// Projectile damage while the window is open.
    pub damage_multiplier: u32,
}

/// Jump scatter behaviour.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScatterTuning {
    /// Enemies closer than this to the player are scattered.
    pub radius: f32,
    /// Length of the scatter override.
    #[serde(with = "millis")]
    pub duration: Duration,
    /// Multiplier applied to the enemy's speed while scattered.
    pub speed_factor: f32,
}

/// Win condition and bonus.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VictoryTuning {
    /// Distance to the anchor below which a boss-free world is won.
    pub distance: f32,
    /// Flat bonus awarded on victory.
    pub base_bonus: u64,
    /// Bonus awarded per whole second survived.
    pub bonus_per_second: u64,
}

/// Errors reported when a profile cannot drive a session.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ProfileError {
    /// The enemy speed range is inverted or non-positive.
    #[error("enemy speed range {min}..{max} is invalid")]
    InvalidSpeedRange {
        /// Configured minimum speed.
        min: f32,
        /// Configured maximum speed.
        max: f32,
    },
    /// A distance, radius, speed or scale is not strictly positive.
    #[error("`{field}` must be strictly positive")]
    NonPositive {
        /// Name of the offending field.
        field: &'static str,
    },
    /// An interval, lifetime or cooldown is zero.
    #[error("`{field}` must be a non-zero duration")]
    ZeroDuration {
        /// Name of the offending field.
        field: &'static str,
    },
    /// The collectible annulus is inverted.
    #[error("collectible spawn annulus {min}..{max} is inverted")]
    InvertedAnnulus {
        /// Configured inner radius.
        min: f32,
        /// Configured outer radius.
        max: f32,
    },
    /// A pickup pool has no bands.
    #[error("pickup pool `{pool}` has no entries")]
    EmptyPool {
        /// Name of the offending pool.
        pool: &'static str,
    },
    /// A pickup pool's thresholds are not strictly increasing.
    #[error("pickup pool `{pool}` thresholds must be positive and strictly increasing")]
    UnsortedPool {
        /// Name of the offending pool.
        pool: &'static str,
    },
}

const ANCHOR: Vec2 = Vec2::new(0.0, -30.0);

impl WorldProfile {
    /// Tuning preset for the provided world.
    #[must_use]
    pub fn for_world(world: WorldKind) -> Self {
        match world {
            WorldKind::Winter => Self::winter(),
            WorldKind::Spring => Self::spring(),
        }
    }

    /// Winter preset: more and faster enemies, power-ups and jump scatter.
    #[must_use]
    pub fn winter() -> Self {
        Self {
            world: WorldKind::Winter,
            anchor: ANCHOR,
            despawn_radius: 50.0,
            player_max_health: 100,
            enemy: EnemyTuning {
                max_live: 15,
                spawn_interval: Duration::from_millis(2000),
                spawn_radius: 5.0,
                speed_min: 0.08,
                speed_max: 0.12,
                health: 3,
                attack_range: 2.5,
                stop_distance: 1.5,
                damage: 5,
                attack_cooldown: Duration::from_millis(1500),
                hit_radius: 0.8,
                kill_score: 100,
                explosion: ExplosionTuning {
                    particles: 8,
                    color: EffectColor::from_hex(0xAA_DD_FF),
                    size: 0.1,
                },
            },
            boss: boss_tuning(EffectColor::from_hex(0x66_99_FF)),
            projectile: projectile_tuning(),
            collectibles: CollectibleTuning {
                spawn_interval: Duration::from_millis(8000),
                pickup_radius: 1.0,
                before_quota: PickupPool::new(vec![
                    PoolEntry {
                        below: 0.2,
                        kind: CollectibleKind::Gift,
                    },
                    PoolEntry {
                        below: 0.65,
                        kind: CollectibleKind::Health,
                    },
                    PoolEntry {
                        below: 1.0,
                        kind: CollectibleKind::Power,
                    },
                ]),
                after_quota: PickupPool::new(vec![
                    PoolEntry {
                        below: 0.7,
                        kind: CollectibleKind::Health,
                    },
                    PoolEntry {
                        below: 1.0,
                        kind: CollectibleKind::Power,
                    },
                ]),
                ..collectible_defaults()
            },
            nearby: Some(CollectibleTuning {
                spawn_interval: Duration::from_millis(5000),
                min_distance: 3.0,
                max_distance: 6.0,
                pickup_radius: 2.0,
                health_score: 0,
                power_score: 0,
                gift_score: 0,
                grants_power_up: false,
                before_quota: PickupPool::new(vec![
                    PoolEntry {
                        below: 0.5,
                        kind: CollectibleKind::Gift,
                    },
                    PoolEntry {
                        below: 0.8,
                        kind: CollectibleKind::Health,
                    },
                    PoolEntry {
                        below: 1.0,
                        kind: CollectibleKind::Power,
                    },
                ]),
                after_quota: PickupPool::new(vec![
                    PoolEntry {
                        below: 0.6,
                        kind: CollectibleKind::Health,
                    },
                    PoolEntry {
                        below: 1.0,
                        kind: CollectibleKind::Power,
                    },
                ]),
                ..collectible_defaults()
            }),
            power_up: Some(PowerUpTuning {
                duration: Duration::from_millis(10_000),
                damage_multiplier: 2,
            }),
            scatter: Some(ScatterTuning {
                radius: 8.0,
                duration: Duration::from_millis(2000),
                speed_factor: 2.0,
            }),
            victory: victory_tuning(),
        }
    }

    /// Spring preset: slower enemies, frequent pickups, no power-ups.
    #[must_use]
    pub fn spring() -> Self {
        Self {
            world: WorldKind::Spring,
            anchor: ANCHOR,
            despawn_radius: 50.0,
            player_max_health: 100,
            enemy: EnemyTuning {
                max_live: 12,
                spawn_interval: Duration::from_millis(3000),
                spawn_radius: 5.0,
                speed_min: 0.06,
                speed_max: 0.09,
                health: 3,
                attack_range: 2.0,
                stop_distance: 1.2,
                damage: 4,
                attack_cooldown: Duration::from_millis(1800),
                hit_radius: 0.8,
                kill_score: 100,
                explosion: ExplosionTuning {
                    particles: 6,
                    color: EffectColor::from_hex(0xFF_69_B4),
                    size: 0.1,
                },
            },
            boss: boss_tuning(EffectColor::from_hex(0x22_8B_22)),
            projectile: projectile_tuning(),
            collectibles: CollectibleTuning {
                spawn_interval: Duration::from_millis(3000),
                pickup_radius: 2.0,
                before_quota: PickupPool::new(vec![
                    PoolEntry {
                        below: 0.3,
                        kind: CollectibleKind::Gift,
                    },
                    PoolEntry {
                        below: 1.0,
                        kind: CollectibleKind::Health,
                    },
                ]),
                after_quota: PickupPool::new(vec![PoolEntry {
                    below: 1.0,
                    kind: CollectibleKind::Health,
                }]),
                ..collectible_defaults()
            },
            nearby: None,
            power_up: None,
            scatter: None,
            victory: victory_tuning(),
        }
    }

    /// Tuning of the provided pickup stream, if the world runs it.
    #[must_use]
    pub fn pickups(&self, stream: PickupStream) -> Option<&CollectibleTuning> {
        match stream {
            PickupStream::Primary => Some(&self.collectibles),
            PickupStream::Nearby => self.nearby.as_ref(),
        }
    }

    /// Checks that the profile describes a playable session.
    ///
    /// # Errors
    ///
    /// Returns the first [`ProfileError`] found, checking enemies, boss,
    /// projectiles, collectibles and the optional blocks in that order.
    pub fn validate(&self) -> Result<(), ProfileError> {
        let enemy = &self.enemy;
        if !(enemy.speed_min > 0.0 && enemy.speed_min <= enemy.speed_max) {
            return Err(ProfileError::InvalidSpeedRange {
                min: enemy.speed_min,
                max: enemy.speed_max,
            });
        }
        positive("despawn_radius", self.despawn_radius)?;
        positive("enemy.spawn_radius", enemy.spawn_radius)?;
        positive("enemy.attack_range", enemy.attack_range)?;
        positive("enemy.hit_radius", enemy.hit_radius)?;
        non_zero("enemy.spawn_interval", enemy.spawn_interval)?;

        let boss = &self.boss;
        positive("boss.trigger_distance", boss.trigger_distance)?;
        positive("boss.speed", boss.speed)?;
        positive("boss.attack_range", boss.attack_range)?;
        positive("boss.hit_radius", boss.hit_radius)?;
        positive("boss.scale", boss.scale)?;

        positive("projectile.speed", self.projectile.speed)?;
        non_zero("projectile.lifetime", self.projectile.lifetime)?;

        self.collectibles.validate(PickupStream::Primary)?;
        if let Some(nearby) = &self.nearby {
            nearby.validate(PickupStream::Nearby)?;
        }

        if let Some(power_up) = &self.power_up {
            non_zero("power_up.duration", power_up.duration)?;
        }
        if let Some(scatter) = &self.scatter {
            positive("scatter.radius", scatter.radius)?;
            positive("scatter.speed_factor", scatter.speed_factor)?;
            non_zero("scatter.duration", scatter.duration)?;
        }
        positive("victory.distance", self.victory.distance)
    }
}

fn boss_tuning(color: EffectColor) -> BossTuning {
    BossTuning {
        trigger_distance: 25.0,
        offset: Vec2::new(0.0, 8.0),
        speed: 0.05,
        health: 30,
        attack_range: 4.0,
        stop_distance: 2.5,
        damage: 15,
        attack_cooldown: Duration::from_millis(2000),
        hit_radius: 2.0,
        scale: 2.5,
        kill_score: 500,
        explosion: ExplosionTuning {
            particles: 20,
            color,
            size: 0.2,
        },
    }
}

fn projectile_tuning() -> ProjectileTuning {
    ProjectileTuning {
        speed: 0.3,
        lifetime: Duration::from_millis(2000),
    }
}

fn collectible_defaults() -> CollectibleTuning {
    CollectibleTuning {
        spawn_interval: Duration::from_millis(8000),
        min_distance: 5.0,
        max_distance: 15.0,
        pickup_radius: 1.0,
        time_to_live: Duration::from_millis(30_000),
        heal_amount: 25,
        gifts_needed: 3,
        health_score: 50,
        power_score: 100,
        gift_score: 200,
        grants_power_up: true,
        before_quota: PickupPool::new(Vec::new()),
        after_quota: PickupPool::new(Vec::new()),
    }
}

fn victory_tuning() -> VictoryTuning {
    VictoryTuning {
        distance: 15.0,
        base_bonus: 1000,
        bonus_per_second: 10,
    }
}

fn positive(field: &'static str, value: f32) -> Result<(), ProfileError> {
    if value > 0.0 {
        Ok(())
    } else {
        Err(ProfileError::NonPositive { field })
    }
}

fn non_zero(field: &'static str, value: Duration) -> Result<(), ProfileError> {
    if value.is_zero() {
        Err(ProfileError::ZeroDuration { field })
    } else {
        Ok(())
    }
}

mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub(crate) fn serialize<S>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let millis = u64::try_from(value.as_millis()).unwrap_or(u64::MAX);
        serializer.serialize_u64(millis)
    }

    pub(crate) fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
