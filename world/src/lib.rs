#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative combat state for a single Frostbloom world load.
//!
//! A [`World`] owns the enemy, projectile and collectible registries together
//! with the player's combat state. All mutation flows through [`apply`]; the
//! events each command produces are appended to the caller's buffer and then
//! forwarded to the collaborator sinks resolved at construction time.

use std::{fmt, time::Duration};

use frostbloom_combat::TimedEffect;
use frostbloom_core::{
    Announcement, CollectibleKind, Command, EnemyRank, EntityRef, Event, NarrativeSink,
    NarrativeSnapshot, NoopSink, Outcome, PickupStream, PresentationSink, ScoreBoard,
    ScoreSink, SessionSummary, WorldProfile,
};
use tracing::{debug, info};

mod collectibles;
mod enemies;
mod player;
mod projectiles;

use collectibles::CollectibleRegistry;
use enemies::EnemyRegistry;
use player::Player;
use projectiles::ProjectileRegistry;

/// Sinks notified after every command, resolved once per world.
pub struct Collaborators {
    /// Scene bookkeeping: handles, tints, lunges and explosions.
    pub presentation: Box<dyn PresentationSink>,
    /// Health bar, score line, distance readout and end-of-session screens.
    pub scoreboard: Box<dyn ScoreSink>,
    /// Story cue evaluation.
    pub narrative: Box<dyn NarrativeSink>,
}

impl Default for Collaborators {
    fn default() -> Self {
        Self {
            presentation: Box::new(NoopSink),
            scoreboard: Box::new(NoopSink),
            narrative: Box::new(NoopSink),
        }
    }
}

impl fmt::Debug for Collaborators {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Collaborators").finish_non_exhaustive()
    }
}

#[derive(Clone, Debug)]
struct Session {
    started: Duration,
    score: u64,
    monsters_killed: u32,
    gifts_collected: u32,
    special_ability_active: bool,
    power_up: Option<TimedEffect>,
    outcome: Option<Outcome>,
}

impl Session {
    fn new(started: Duration) -> Self {
        Self {
            started,
            score: 0,
            monsters_killed: 0,
            gifts_collected: 0,
            special_ability_active: false,
            power_up: None,
            outcome: None,
        }
    }

    fn survival_seconds(&self, now: Duration) -> u64 {
        now.saturating_sub(self.started).as_secs()
    }
}

/// Represents the authoritative combat state of one world.
#[derive(Debug)]
pub struct World {
    profile: WorldProfile,
    clock: Duration,
    player: Player,
    session: Session,
    enemies: EnemyRegistry,
    projectiles: ProjectileRegistry,
    collectibles: CollectibleRegistry,
    collaborators: Collaborators,
    reported_board: Option<ScoreBoard>,
}

impl World {
    /// Creates a world from the provided profile with no-op collaborators.
    #[must_use]
    pub fn new(profile: WorldProfile) -> Self {
        Self::with_collaborators(profile, Collaborators::default())
    }

    /// Creates a world that notifies the provided collaborators.
    #[must_use]
    pub fn with_collaborators(profile: WorldProfile, collaborators: Collaborators) -> Self {
        info!(world = ?profile.world, "world loaded");
        Self {
            player: Player::new(profile.player_max_health),
            session: Session::new(Duration::ZERO),
            enemies: EnemyRegistry::new(profile.enemy.max_live),
            projectiles: ProjectileRegistry::default(),
            collectibles: CollectibleRegistry::default(),
            clock: Duration::ZERO,
            collaborators,
            reported_board: None,
            profile,
        }
    }

    /// Consumes the world and hands its collaborators back for the next world load.
    #[must_use]
    pub fn into_collaborators(self) -> Collaborators {
        self.collaborators
    }

    fn distance_to_anchor(&self) -> f32 {
        self.player.position.distance(self.profile.anchor)
    }

    fn damage_multiplier(&self, now: Duration) -> u32 {
        match (&self.profile.power_up, self.session.power_up) {
            (Some(tuning), Some(window)) if window.is_active(now) => tuning.damage_multiplier,
            _ => 1,
        }
    }

    fn score_board(&self) -> ScoreBoard {
        ScoreBoard {
            score: self.session.score,
            monsters_killed: self.session.monsters_killed,
            gifts_collected: self.session.gifts_collected,
            gifts_needed: self.profile.collectibles.gifts_needed,
            special_ability_active: self.session.special_ability_active,
            power_up_remaining: self
                .session
                .power_up
                .map(|window| window.remaining(self.clock)),
        }
    }

    fn narrative_snapshot(&self) -> NarrativeSnapshot {
        NarrativeSnapshot {
            distance_to_anchor: self.distance_to_anchor(),
            monsters_killed: self.session.monsters_killed,
            boss_spawned: self.enemies.boss_spawned(),
            boss_defeated: self.enemies.boss_defeated(),
            elapsed: self.clock.saturating_sub(self.session.started),
        }
    }

    fn tick(&mut self, dt: Duration, out: &mut Vec<Event>) {
        self.clock = self.clock.saturating_add(dt);
        let now = self.clock;
        out.push(Event::TimeAdvanced { dt, now });

        if self.player.alive {
            self.run_frame(now, out);
        }
        self.enemies.expire_effects(now, out);
    }

    fn run_frame(&mut self, now: Duration, out: &mut Vec<Event>) {
        let distance = self.distance_to_anchor();
        if distance < self.profile.boss.trigger_distance {
            let _ = self
                .enemies
                .spawn_boss(self.profile.anchor, &self.profile.boss, out);
        }
        self.expire_power_up(now, out);

        self.enemies.advance(
            now,
            self.player.position,
            &mut self.player.vitals,
            &self.profile,
            out,
        );
        if self.player.vitals.is_depleted() {
            self.end_session(Outcome::Lost, now, out);
            return;
        }

        let damage = self.damage_multiplier(now);
        let impacts = self.projectiles.advance(
            now,
            &self.profile.projectile,
            &mut self.enemies,
            damage,
            self.session.special_ability_active,
            out,
        );
        for impact in impacts.into_iter().filter(|impact| impact.defeated) {
            self.session.monsters_killed = self.session.monsters_killed.saturating_add(1);
            let award = match impact.rank {
                EnemyRank::Regular => self.profile.enemy.kill_score,
                EnemyRank::Boss => self.profile.boss.kill_score,
            };
            self.session.score = self.session.score.saturating_add(award);
        }

        let picked = self
            .collectibles
            .resolve(self.player.position, now, &self.profile, out);
        for (stream, kind) in picked {
            self.collect(stream, kind, now, out);
        }

        if distance < self.profile.victory.distance && self.enemies.boss_defeated() {
            self.end_session(Outcome::Won, now, out);
        }
    }

    fn expire_power_up(&mut self, now: Duration, out: &mut Vec<Event>) {
        if self
            .session
            .power_up
            .is_some_and(|window| !window.is_active(now))
        {
            self.session.power_up = None;
            debug!("power-up expired");
            out.push(Event::PowerUpEnded);
        }
    }

    /// Applies one pickup. Rewards follow the stream's tuning while every
    /// stream counts toward the world's single gift quota.
    fn collect(
        &mut self,
        stream: PickupStream,
        kind: CollectibleKind,
        now: Duration,
        out: &mut Vec<Event>,
    ) {
        let gifts_needed = self.profile.collectibles.gifts_needed;
        let Some(tuning) = self.profile.pickups(stream) else {
            return;
        };
        self.session.score = self.session.score.saturating_add(tuning.score_for(kind));
        match kind {
            CollectibleKind::Health => {
                let amount = self.player.vitals.heal(tuning.heal_amount);
                out.push(Event::PlayerHealed {
                    amount,
                    health: self.player.vitals.current(),
                });
            }
            CollectibleKind::Power => {
                if let Some(power_up) = self
                    .profile
                    .power_up
                    .as_ref()
                    .filter(|_| tuning.grants_power_up)
                {
                    let window = TimedEffect::new(now, power_up.duration);
                    self.session.power_up = Some(window);
                    out.push(Event::PowerUpStarted {
                        until: window.ends_at(),
                    });
                }
            }
            CollectibleKind::Gift => {
                if self.session.gifts_collected < gifts_needed {
                    self.session.gifts_collected += 1;
                }
                if !self.session.special_ability_active
                    && self.session.gifts_collected >= gifts_needed
                {
                    self.session.special_ability_active = true;
                    info!(gifts = self.session.gifts_collected, "special ability unlocked");
                    out.push(Event::SpecialAbilityUnlocked);
                }
            }
        }
    }

    fn end_session(&mut self, outcome: Outcome, now: Duration, out: &mut Vec<Event>) {
        if self.session.outcome.is_some() {
            return;
        }

        let survival_seconds = self.session.survival_seconds(now);
        let bonus = match outcome {
            Outcome::Won => {
                let victory = &self.profile.victory;
                let bonus = victory
                    .base_bonus
                    .saturating_add(victory.bonus_per_second.saturating_mul(survival_seconds));
                self.session.score = self.session.score.saturating_add(bonus);
                self.player.celebrate(now);
                Some(bonus)
            }
            Outcome::Lost => {
                self.player.fall(now);
                None
            }
        };
        self.enemies.freeze();
        self.session.outcome = Some(outcome);

        let summary = SessionSummary {
            score: self.session.score,
            monsters_killed: self.session.monsters_killed,
            survival_seconds,
            bonus,
        };
        info!(
            ?outcome,
            score = summary.score,
            monsters_killed = summary.monsters_killed,
            survival_seconds,
            "session ended"
        );
        out.push(Event::SessionEnded { outcome, summary });
    }

    fn jump(&mut self, out: &mut Vec<Event>) {
        if !self.player.alive {
            return;
        }
        self.player.jump(self.clock);
        if let Some(scatter) = &self.profile.scatter {
            let count = self
                .enemies
                .scatter(self.player.position, self.clock, scatter);
            debug!(count, "jump scattered enemies");
            out.push(Event::EnemiesScattered { count });
        }
    }

    fn clear_registries(&mut self, out: &mut Vec<Event>) {
        let released = self.enemies.clear(out)
            + self.projectiles.clear(out)
            + self.collectibles.clear(out);
        debug!(released, "registries cleared");
        out.push(Event::RegistriesCleared);
    }

    fn respawn(&mut self, out: &mut Vec<Event>) {
        self.clear_registries(out);
        self.enemies.forget_boss();
        self.player.respawn();
        self.session = Session::new(self.clock);
        info!(world = ?self.profile.world, "player respawned");
        out.push(Event::PlayerRespawned);
    }

    fn dispatch(&mut self, events: &[Event], frame_ended: bool) {
        let board = self.score_board();
        let narrative_snapshot = self.narrative_snapshot();
        let health = self.player.vitals.current();
        let max_health = self.player.vitals.max();
        let Collaborators {
            presentation,
            scoreboard,
            narrative,
        } = &mut self.collaborators;

        for event in events {
            match event {
                Event::EnemySpawned {
                    enemy,
                    rank,
                    position,
                } => {
                    presentation.entity_spawned(EntityRef::Enemy(*enemy), *position);
                    if *rank == EnemyRank::Boss {
                        scoreboard.announcement(Announcement::BossAppeared);
                    }
                }
                Event::EnemyRemoved { enemy, .. } => {
                    presentation.entity_released(EntityRef::Enemy(*enemy));
                }
                Event::EnemyTinted { enemy, tint } => presentation.entity_tinted(*enemy, *tint),
                Event::EnemyAttacked { enemy, .. } => presentation.enemy_lunged(*enemy),
                Event::Explosion { explosion } => presentation.explosion(explosion),
                Event::ProjectileFired {
                    projectile, origin, ..
                } => presentation.entity_spawned(EntityRef::Projectile(*projectile), *origin),
                Event::ProjectileRemoved { projectile, .. } => {
                    presentation.entity_released(EntityRef::Projectile(*projectile));
                }
                Event::CollectibleSpawned {
                    collectible,
                    position,
                    ..
                } => presentation.entity_spawned(EntityRef::Collectible(*collectible), *position),
                Event::CollectibleRemoved { collectible, .. } => {
                    presentation.entity_released(EntityRef::Collectible(*collectible));
                }
                Event::PlayerDamaged { amount, health } => {
                    presentation.player_hit(*amount, *health);
                    scoreboard.health_changed(*health, max_health);
                }
                Event::PlayerHealed { health, .. } => {
                    scoreboard.health_changed(*health, max_health);
                }
                Event::PlayerRespawned => scoreboard.health_changed(health, max_health),
                Event::SpecialAbilityUnlocked => {
                    scoreboard.announcement(Announcement::SpecialAbilityUnlocked);
                }
                Event::SessionEnded { outcome, summary } => {
                    scoreboard.session_ended(*outcome, summary);
                }
                Event::TimeAdvanced { .. }
                | Event::ProjectileHit { .. }
                | Event::EnemiesScattered { .. }
                | Event::PowerUpStarted { .. }
                | Event::PowerUpEnded
                | Event::RegistriesCleared => {}
            }
        }

        if frame_ended {
            scoreboard.distance_changed(
                self.profile.world,
                narrative_snapshot.distance_to_anchor,
            );
            narrative.report(&narrative_snapshot);
        }

        if self.reported_board != Some(board) {
            scoreboard.score_changed(&board);
            self.reported_board = Some(board);
        }
    }
}

/// Applies the provided command to the world, mutating state deterministically.
///
/// Events are appended to `out_events` and forwarded to the world's
/// collaborators before returning.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    let first = out_events.len();
    let frame_ended = matches!(command, Command::Tick { .. });

    match command {
        Command::Tick { dt } => world.tick(dt, out_events),
        Command::SetPlayerPose { position, heading } => {
            if world.player.alive && position.is_finite() {
                world.player.position = position;
                world.player.heading = heading;
            }
        }
        Command::SpawnEnemy {
            position,
            speed,
            wobble_offset,
        } => {
            if world.player.alive {
                let _ = world.enemies.spawn(
                    position,
                    speed,
                    wobble_offset,
                    &world.profile.enemy,
                    out_events,
                );
            }
        }
        Command::SpawnCollectible {
            position,
            kind,
            stream,
        } => {
            if world.player.alive && world.profile.pickups(stream).is_some() {
                let _ = world
                    .collectibles
                    .spawn(position, kind, stream, world.clock, out_events);
            }
        }
        Command::FireProjectile { origin, direction } => {
            if world.player.alive {
                let _ = world
                    .projectiles
                    .fire(origin, direction, world.clock, out_events);
            }
        }
        Command::Jump => world.jump(out_events),
        Command::Reset => world.clear_registries(out_events),
        Command::Respawn => world.respawn(out_events),
    }

    world.dispatch(&out_events[first..], frame_ended);
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::time::Duration;

    use frostbloom_core::{
        CollectibleSnapshot, CombatStatus, EnemyId, EnemySnapshot, NarrativeSnapshot, PlayerPose,
        ProjectileSnapshot, ScoreBoard, SpawnContext, WorldProfile,
    };

    use super::World;

    /// Profile the world was loaded with.
    #[must_use]
    pub fn profile(world: &World) -> &WorldProfile {
        &world.profile
    }

    /// Current world clock.
    #[must_use]
    pub fn now(world: &World) -> Duration {
        world.clock
    }

    /// Summarises the player's and session's combat state.
    #[must_use]
    pub fn status(world: &World) -> CombatStatus {
        let session = &world.session;
        CombatStatus {
            world: world.profile.world,
            player_health: world.player.vitals.current(),
            player_max_health: world.player.vitals.max(),
            player_alive: world.player.alive,
            score: session.score,
            monsters_killed: session.monsters_killed,
            gifts_collected: session.gifts_collected,
            gifts_needed: world.profile.collectibles.gifts_needed,
            special_ability_active: session.special_ability_active,
            power_up_remaining: session
                .power_up
                .filter(|window| window.is_active(world.clock))
                .map(|window| window.remaining(world.clock)),
            boss_spawned: world.enemies.boss_spawned(),
            boss_defeated: world.enemies.boss_defeated(),
            distance_to_anchor: world.distance_to_anchor(),
            outcome: session.outcome,
            elapsed: world.clock.saturating_sub(session.started),
        }
    }

    /// Tallies shown on the score line.
    #[must_use]
    pub fn score_board(world: &World) -> ScoreBoard {
        world.score_board()
    }

    /// Captures every live enemy, boss included, ordered by identifier.
    #[must_use]
    pub fn enemies(world: &World) -> Vec<EnemySnapshot> {
        world.enemies.snapshots()
    }

    /// Captures a single enemy, if it is still live.
    #[must_use]
    pub fn enemy(world: &World, id: EnemyId) -> Option<EnemySnapshot> {
        world
            .enemies
            .snapshots()
            .into_iter()
            .find(|snapshot| snapshot.id == id)
    }

    /// Captures the boss, if it is live.
    #[must_use]
    pub fn boss(world: &World) -> Option<EnemySnapshot> {
        world.enemies.boss_snapshot()
    }

    /// Captures every projectile in flight, ordered by identifier.
    #[must_use]
    pub fn projectiles(world: &World) -> Vec<ProjectileSnapshot> {
        world.projectiles.snapshots(world.clock)
    }

    /// Captures every collectible, ordered by identifier.
    #[must_use]
    pub fn collectibles(world: &World) -> Vec<CollectibleSnapshot> {
        world.collectibles.snapshots(world.clock)
    }

    /// Presentational pose of the player.
    #[must_use]
    pub fn player_pose(world: &World) -> PlayerPose {
        world.player.pose(world.clock)
    }

    /// State that drives story cues.
    #[must_use]
    pub fn narrative(world: &World) -> NarrativeSnapshot {
        world.narrative_snapshot()
    }

    /// Inputs the spawning system needs to schedule entities.
    #[must_use]
    pub fn spawn_context(world: &World) -> SpawnContext {
        SpawnContext {
            player_alive: world.player.alive,
            player_position: world.player.position,
            anchor: world.profile.anchor,
            live_enemies: world.enemies.live_count(),
            max_enemies: world.enemies.max_live(),
            gifts_collected: world.session.gifts_collected,
            gifts_needed: world.profile.collectibles.gifts_needed,
            special_ability_active: world.session.special_ability_active,
        }
    }
}
