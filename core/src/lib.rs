#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Frostbloom combat engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative combat world, and pure systems. Adapters and systems submit
//! [`Command`] values describing desired mutations, the world executes those
//! commands via its `apply` entry point, and then broadcasts [`Event`] values
//! for systems and collaborator sinks to react to deterministically.
//!
//! Positions live on the ground plane: a [`Vec2`] stores the world-space `x`
//! coordinate in `x` and the world-space `z` coordinate in `y`. Heights are
//! purely presentational and are reported separately in snapshots.

use std::time::Duration;

use serde::{Deserialize, Serialize};

pub mod profile;
mod sinks;

pub use glam::{Vec2, Vec3};
pub use profile::{
    BossTuning, CollectibleTuning, EnemyTuning, ExplosionTuning, PickupPool, PoolEntry,
    PowerUpTuning, ProfileError, ProjectileTuning, ScatterTuning, VictoryTuning, WorldProfile,
};
pub use sinks::{
    Announcement, NarrativeSink, NoopSink, PresentationSink, ScoreBoard, ScoreSink,
};

/// Identifies which of the two playable worlds a session runs in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorldKind {
    /// Ice world guarded by the frozen castle.
    Winter,
    /// Garden world guarded by the flower palace.
    Spring,
}

impl WorldKind {
    /// Name of the landmark the player travels toward.
    #[must_use]
    pub const fn anchor_name(self) -> &'static str {
        match self {
            Self::Winter => "Castle",
            Self::Spring => "Palace",
        }
    }

    /// World loaded after this one completes, if any.
    #[must_use]
    pub const fn next(self) -> Option<Self> {
        match self {
            Self::Winter => Some(Self::Spring),
            Self::Spring => None,
        }
    }
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Advances the simulation clock by one frame of the provided duration.
    Tick {
        /// Duration of simulated time that elapsed since the previous frame.
        dt: Duration,
    },
    /// Reports the player's current ground position and facing.
    SetPlayerPose {
        /// Ground-plane position of the player.
        position: Vec2,
        /// Facing angle around the vertical axis, in radians.
        heading: f32,
    },
    /// Requests that a regular enemy enter the world.
    SpawnEnemy {
        /// Ground-plane position the enemy appears at.
        position: Vec2,
        /// Movement speed in world units per frame.
        speed: f32,
        /// Phase offset for the idle bob animation.
        wobble_offset: f32,
    },
    /// Requests that a collectible appear in the world.
    SpawnCollectible {
        /// Ground-plane position of the collectible.
        position: Vec2,
        /// Type of pickup to create.
        kind: CollectibleKind,
        /// Stream whose tuning governs pickup and rewards.
        stream: PickupStream,
    },
    /// Fires a player projectile.
    FireProjectile {
        /// Ground-plane launch position.
        origin: Vec2,
        /// Direction of travel; normalised by the world.
        direction: Vec2,
    },
    /// Player jump that scatters nearby enemies in worlds that support it.
    Jump,
    /// Tears down every registry without touching player or session state.
    Reset,
    /// Resets the registries and the full session state for another attempt.
    Respawn,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the frame.
        dt: Duration,
        /// World clock after the advance.
        now: Duration,
    },
    /// Confirms that an enemy entered the world.
    EnemySpawned {
        /// Identifier assigned to the enemy.
        enemy: EnemyId,
        /// Whether the enemy is a regular monster or the boss.
        rank: EnemyRank,
        /// Ground-plane spawn position.
        position: Vec2,
    },
    /// Reports that an enemy landed a melee attack on the player.
    EnemyAttacked {
        /// Identifier of the attacking enemy.
        enemy: EnemyId,
        /// Damage carried by the attack.
        damage: u32,
    },
    /// Reports that an enemy's tint changed for hit feedback.
    EnemyTinted {
        /// Identifier of the tinted enemy.
        enemy: EnemyId,
        /// Tint now applied to the enemy's primary material.
        tint: Tint,
    },
    /// Confirms that an enemy left the live list.
    EnemyRemoved {
        /// Identifier of the removed enemy.
        enemy: EnemyId,
        /// Whether the enemy was a regular monster or the boss.
        rank: EnemyRank,
        /// Why the enemy was removed.
        reason: EnemyRemoval,
    },
    /// Reports that a jump pushed enemies away from the player.
    EnemiesScattered {
        /// Number of enemies that entered the scattered state.
        count: usize,
    },
    /// Requests a particle burst at a defeated enemy's position.
    Explosion {
        /// Particle burst description.
        explosion: Explosion,
    },
    /// Confirms that a projectile was launched.
    ProjectileFired {
        /// Identifier assigned to the projectile.
        projectile: ProjectileId,
        /// Ground-plane launch position.
        origin: Vec2,
        /// Normalised direction of travel.
        direction: Vec2,
    },
    /// Reports that a projectile struck an enemy.
    ProjectileHit {
        /// Identifier of the projectile.
        projectile: ProjectileId,
        /// Identifier of the enemy that was struck.
        target: EnemyId,
        /// Damage applied; zero when the boss shield absorbed the hit.
        damage: u32,
    },
    /// Confirms that a projectile left the world.
    ProjectileRemoved {
        /// Identifier of the removed projectile.
        projectile: ProjectileId,
        /// Why the projectile was removed.
        reason: ProjectileRemoval,
    },
    /// Confirms that a collectible appeared.
    CollectibleSpawned {
        /// Identifier assigned to the collectible.
        collectible: CollectibleId,
        /// Type of pickup.
        kind: CollectibleKind,
        /// Ground-plane position.
        position: Vec2,
    },
    /// Confirms that a collectible left the world.
    CollectibleRemoved {
        /// Identifier of the removed collectible.
        collectible: CollectibleId,
        /// Type of pickup that was removed.
        kind: CollectibleKind,
        /// Why the collectible was removed.
        reason: CollectibleRemoval,
    },
    /// Reports that the player lost health.
    PlayerDamaged {
        /// Damage requested by the attacker.
        amount: u32,
        /// Player health after the damage was applied.
        health: u32,
    },
    /// Reports that the player regained health.
    PlayerHealed {
        /// Health actually restored after clamping.
        amount: u32,
        /// Player health after healing.
        health: u32,
    },
    /// Announces that the projectile damage multiplier window opened.
    PowerUpStarted {
        /// World time at which the window closes.
        until: Duration,
    },
    /// Announces that the projectile damage multiplier window closed.
    PowerUpEnded,
    /// Announces that player projectiles can now damage the boss.
    SpecialAbilityUnlocked,
    /// Announces that the session ended in victory or defeat.
    SessionEnded {
        /// Result of the session.
        outcome: Outcome,
        /// Final statistics for the session.
        summary: SessionSummary,
    },
    /// Confirms that every registry was emptied and the boss dropped.
    RegistriesCleared,
    /// Confirms that the player respawned with fresh session state.
    PlayerRespawned,
}

/// Whether an enemy is a regular monster or the world boss.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyRank {
    /// Regular monster spawned around the anchor.
    Regular,
    /// Single boss guarding the anchor.
    Boss,
}

/// Reasons an enemy leaves the live list.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EnemyRemoval {
    /// Health reached zero.
    Defeated,
    /// Wandered beyond the despawn radius around the anchor.
    Despawned,
    /// Removed by a reset or respawn.
    Cleared,
}

/// Reasons a projectile leaves the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ProjectileRemoval {
    /// Struck an enemy.
    Hit,
    /// Outlived its lifetime.
    Expired,
    /// Removed by a reset or respawn.
    Cleared,
}

/// Reasons a collectible leaves the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CollectibleRemoval {
    /// Picked up by the player.
    Collected,
    /// Outlived its time-to-live.
    Expired,
    /// Removed by a reset or respawn.
    Cleared,
}

/// Independent collectible streams a world can run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PickupStream {
    /// The world's main pickup stream.
    #[default]
    Primary,
    /// Short-range stream spawned right next to the player.
    Nearby,
}

/// Pickup types that can appear near the player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollectibleKind {
    /// Restores player health.
    Health,
    /// Opens a temporary projectile damage multiplier window.
    Power,
    /// Counts toward unlocking the special ability.
    Gift,
}

impl CollectibleKind {
    /// Spin applied to the collectible each frame, in radians.
    #[must_use]
    pub const fn spin_per_frame(self) -> f32 {
        match self {
            Self::Gift => 0.03,
            Self::Health | Self::Power => 0.02,
        }
    }
}

/// Result of a finished session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// The player reached the anchor after defeating the boss.
    Won,
    /// The player's health was depleted.
    Lost,
}

/// Final statistics reported when a session ends.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSummary {
    /// Score including any victory bonus.
    pub score: u64,
    /// Enemies defeated, boss included.
    pub monsters_killed: u32,
    /// Whole seconds elapsed since the session started.
    pub survival_seconds: u64,
    /// Victory bonus added to the score, if the session was won.
    pub bonus: Option<u64>,
}

/// Byte RGB colour used for hit flashes and particle bursts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EffectColor {
    red: u8,
    green: u8,
    blue: u8,
}

impl EffectColor {
    /// Creates a colour from byte RGB components.
    #[must_use]
    pub const fn from_rgb(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// Creates a colour from a packed `0xRRGGBB` value.
    #[must_use]
    pub const fn from_hex(hex: u32) -> Self {
        Self {
            red: ((hex >> 16) & 0xff) as u8,
            green: ((hex >> 8) & 0xff) as u8,
            blue: (hex & 0xff) as u8,
        }
    }

    /// Red component of the colour.
    #[must_use]
    pub const fn red(&self) -> u8 {
        self.red
    }

    /// Green component of the colour.
    #[must_use]
    pub const fn green(&self) -> u8 {
        self.green
    }

    /// Blue component of the colour.
    #[must_use]
    pub const fn blue(&self) -> u8 {
        self.blue
    }

    /// Packs the colour into a `0xRRGGBB` value.
    #[must_use]
    pub const fn to_hex(&self) -> u32 {
        ((self.red as u32) << 16) | ((self.green as u32) << 8) | self.blue as u32
    }
}

/// Flash applied when a projectile damages an enemy.
pub const HIT_FLASH: EffectColor = EffectColor::from_hex(0xFF_FF_FF);

/// Flash applied when the boss shield absorbs a projectile.
pub const SHIELD_FLASH: EffectColor = EffectColor::from_hex(0xFF_FF_00);

/// Tint applied to an enemy's primary material.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Tint {
    /// The material's own colour.
    Original,
    /// Temporary hit flash colour.
    Flash(EffectColor),
}

/// Particle burst spawned where an enemy was defeated.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Explosion {
    /// Ground-plane centre of the burst.
    pub position: Vec2,
    /// Number of particles emitted.
    pub particle_count: u32,
    /// Colour of every particle.
    pub color: EffectColor,
    /// Radius of each particle sphere.
    pub particle_size: f32,
}

/// Unique identifier assigned to an enemy, boss included.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EnemyId(u32);

impl EnemyId {
    /// Creates a new enemy identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a projectile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProjectileId(u32);

impl ProjectileId {
    /// Creates a new projectile identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a collectible.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CollectibleId(u32);

impl CollectibleId {
    /// Creates a new collectible identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Reference to any entity that owns a presentation handle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityRef {
    /// A regular enemy or the boss.
    Enemy(EnemyId),
    /// A player projectile.
    Projectile(ProjectileId),
    /// A pickup.
    Collectible(CollectibleId),
}

/// Behavioural phase of a live enemy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EnemyPhase {
    /// Created but not yet updated by a frame.
    Spawning,
    /// Closing in on the player.
    Seeking,
    /// Within attack range of the player.
    Attacking,
    /// Pushed away from the player by a jump.
    Scattered,
    /// Halted because the session ended.
    Frozen,
}

/// Immutable representation of a live enemy used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnemySnapshot {
    /// Identifier assigned to the enemy.
    pub id: EnemyId,
    /// Whether the enemy is regular or the boss.
    pub rank: EnemyRank,
    /// Ground-plane position.
    pub position: Vec2,
    /// Presentational bob height.
    pub height: f32,
    /// Presentational sway around the forward axis, in radians.
    pub sway: f32,
    /// Facing angle around the vertical axis, in radians.
    pub heading: f32,
    /// Uniform render scale, including lunge pulses.
    pub scale: f32,
    /// Tint currently applied to the primary material.
    pub tint: Tint,
    /// Behavioural phase.
    pub phase: EnemyPhase,
    /// Remaining health.
    pub health: u32,
    /// Health the enemy spawned with.
    pub max_health: u32,
}

/// Immutable representation of an in-flight projectile used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProjectileSnapshot {
    /// Identifier assigned to the projectile.
    pub id: ProjectileId,
    /// Ground-plane position.
    pub position: Vec2,
    /// Normalised direction of travel.
    pub direction: Vec2,
    /// Time since the projectile was fired.
    pub age: Duration,
}

/// Immutable representation of a collectible used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CollectibleSnapshot {
    /// Identifier assigned to the collectible.
    pub id: CollectibleId,
    /// Type of pickup.
    pub kind: CollectibleKind,
    /// Ground-plane position.
    pub position: Vec2,
    /// Presentational bob height.
    pub height: f32,
    /// Accumulated spin around the vertical axis, in radians.
    pub spin: f32,
    /// Time since the collectible appeared.
    pub age: Duration,
}

/// Presentational pose of the player derived from time-boxed animations.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlayerPose {
    /// Ground-plane position.
    pub position: Vec2,
    /// Facing angle around the vertical axis, in radians.
    pub heading: f32,
    /// Height above the ground from jumps and celebrations.
    pub height: f32,
    /// Sideways tilt, reaching a quarter turn when the player falls.
    pub tilt: f32,
    /// Extra spin applied while celebrating.
    pub spin: f32,
}

/// Read-only summary of the combat state for a world session.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CombatStatus {
    /// World the session runs in.
    pub world: WorldKind,
    /// Current player health.
    pub player_health: u32,
    /// Maximum player health.
    pub player_max_health: u32,
    /// Whether the player can still act.
    pub player_alive: bool,
    /// Current score.
    pub score: u64,
    /// Enemies defeated, boss included.
    pub monsters_killed: u32,
    /// Gifts collected toward the special ability.
    pub gifts_collected: u32,
    /// Gifts required to unlock the special ability.
    pub gifts_needed: u32,
    /// Whether projectiles can damage the boss.
    pub special_ability_active: bool,
    /// Remaining time of the damage multiplier window, if open.
    pub power_up_remaining: Option<Duration>,
    /// Whether the boss has appeared this session.
    pub boss_spawned: bool,
    /// Whether the boss has been defeated this session.
    pub boss_defeated: bool,
    /// Distance from the player to the anchor.
    pub distance_to_anchor: f32,
    /// Result of the session, once decided.
    pub outcome: Option<Outcome>,
    /// Time elapsed since the session started.
    pub elapsed: Duration,
}

/// State reported every frame to the narrative collaborator.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NarrativeSnapshot {
    /// Distance from the player to the anchor.
    pub distance_to_anchor: f32,
    /// Enemies defeated, boss included.
    pub monsters_killed: u32,
    /// Whether the boss has appeared.
    pub boss_spawned: bool,
    /// Whether the boss has been defeated.
    pub boss_defeated: bool,
    /// Time since the current session started.
    pub elapsed: Duration,
}

/// Inputs the spawning system needs to schedule new entities.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpawnContext {
    /// Whether the player can still act.
    pub player_alive: bool,
    /// Ground-plane position of the player.
    pub player_position: Vec2,
    /// Ground-plane position of the anchor.
    pub anchor: Vec2,
    /// Regular enemies currently alive.
    pub live_enemies: usize,
    /// Current cap on live regular enemies; zero once the boss appears.
    pub max_enemies: usize,
    /// Gifts collected toward the special ability.
    pub gifts_collected: u32,
    /// Gifts required to unlock the special ability.
    pub gifts_needed: u32,
    /// Whether the special ability is already unlocked.
    pub special_ability_active: bool,
}

impl SpawnContext {
    /// Reports whether the gift quota is still open.
    #[must_use]
    pub const fn gift_quota_open(&self) -> bool {
        !self.special_ability_active && self.gifts_collected < self.gifts_needed
    }
}

#[cfg(test)]
mod tests {
    use super::{CollectibleKind, EffectColor, SpawnContext, Vec2, WorldKind};

    #[test]
    fn effect_color_hex_round_trips() {
        let color = EffectColor::from_hex(0xAA_DD_FF);
        assert_eq!(color.red(), 0xAA);
        assert_eq!(color.green(), 0xDD);
        assert_eq!(color.blue(), 0xFF);
        assert_eq!(color.to_hex(), 0xAA_DD_FF);
    }

    #[test]
    fn worlds_progress_from_winter_to_spring() {
        assert_eq!(WorldKind::Winter.next(), Some(WorldKind::Spring));
        assert_eq!(WorldKind::Spring.next(), None);
        assert_eq!(WorldKind::Spring.anchor_name(), "Palace");
    }

    #[test]
    fn gifts_spin_faster_than_other_pickups() {
        assert!(CollectibleKind::Gift.spin_per_frame() > CollectibleKind::Health.spin_per_frame());
        assert_eq!(
            CollectibleKind::Power.spin_per_frame(),
            CollectibleKind::Health.spin_per_frame()
        );
    }

    #[test]
    fn gift_quota_closes_once_ability_unlocks() {
        let mut context = SpawnContext {
            player_alive: true,
            player_position: Vec2::ZERO,
            anchor: Vec2::new(0.0, -30.0),
            live_enemies: 0,
            max_enemies: 15,
            gifts_collected: 2,
            gifts_needed: 3,
            special_ability_active: false,
        };
        assert!(context.gift_quota_open());

        context.special_ability_active = true;
        assert!(!context.gift_quota_open());

        context.special_ability_active = false;
        context.gifts_collected = 3;
        assert!(!context.gift_quota_open());
    }
}
