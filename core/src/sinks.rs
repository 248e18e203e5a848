//! Collaborator interfaces notified by the world after every command.
//!
//! Every method has an empty default body so collaborators only implement the
//! notifications they care about.

use std::time::Duration;

use glam::Vec2;

use crate::{
    EnemyId, EntityRef, Explosion, NarrativeSnapshot, Outcome, SessionSummary, Tint, WorldKind,
};

/// Receives scene notifications keyed by entity.
pub trait PresentationSink {
    /// An entity entered the world and needs a presentation handle.
    fn entity_spawned(&mut self, _entity: EntityRef, _position: Vec2) {}

    /// An entity left the world; its handle must be released.
    fn entity_released(&mut self, _entity: EntityRef) {}

    /// An enemy's primary material changed tint.
    fn entity_tinted(&mut self, _enemy: EnemyId, _tint: Tint) {}

    /// An enemy started its attack lunge.
    fn enemy_lunged(&mut self, _enemy: EnemyId) {}

    /// A particle burst should be played.
    fn explosion(&mut self, _explosion: &Explosion) {}

    /// The player took damage.
    fn player_hit(&mut self, _amount: u32, _health: u32) {}
}

/// Running tallies shown on the score line.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ScoreBoard {
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
}

/// One-off messages surfaced to the player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Announcement {
    /// The boss appeared near the anchor.
    BossAppeared,
    /// Projectiles can now damage the boss.
    SpecialAbilityUnlocked,
}

/// Receives score, health and objective updates.
pub trait ScoreSink {
    /// Player health changed.
    fn health_changed(&mut self, _health: u32, _max_health: u32) {}

    /// Score line tallies changed.
    fn score_changed(&mut self, _board: &ScoreBoard) {}

    /// Distance from the player to the world's anchor changed.
    fn distance_changed(&mut self, _world: WorldKind, _distance: f32) {}

    /// A one-off message should be shown.
    fn announcement(&mut self, _announcement: Announcement) {}

    /// The session ended.
    fn session_ended(&mut self, _outcome: Outcome, _summary: &SessionSummary) {}
}

/// Receives the per-frame state that drives story cues.
pub trait NarrativeSink {
    /// Reports the narrative state at the end of a frame.
    fn report(&mut self, _snapshot: &NarrativeSnapshot) {}
}

/// Collaborator that ignores every notification.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NoopSink;

impl PresentationSink for NoopSink {}

impl ScoreSink for NoopSink {}

impl NarrativeSink for NoopSink {}
