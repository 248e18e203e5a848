#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Progression system that moves the player from Winter to Spring after a win.

use std::time::Duration;

use frostbloom_core::{Command, Event, Outcome, WorldKind, WorldProfile};
use frostbloom_world::{self as world, Collaborators, World};
use tracing::info;

/// Delay between winning a world and leaving it.
pub const COMPLETION_DELAY: Duration = Duration::from_secs(3);

/// Step the embedding application should take next.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transition {
    /// Load the provided world.
    Advance(WorldKind),
    /// The final world was won; there is nothing left to load.
    CampaignComplete,
}

/// Tracks the current world and schedules the switch to the next one.
#[derive(Debug, Clone)]
pub struct Progression {
    current: WorldKind,
    now: Duration,
    completes_at: Option<Duration>,
    finished: bool,
}

impl Progression {
    /// Starts the campaign in the provided world.
    #[must_use]
    pub const fn new(first: WorldKind) -> Self {
        Self {
            current: first,
            now: Duration::ZERO,
            completes_at: None,
            finished: false,
        }
    }

    /// World currently being played.
    #[must_use]
    pub const fn current(&self) -> WorldKind {
        self.current
    }

    /// Reports whether the last world has been completed.
    #[must_use]
    pub const fn is_finished(&self) -> bool {
        self.finished
    }

    /// Consumes world events and emits at most one transition once the
    /// completion delay after a win has elapsed.
    pub fn handle(&mut self, events: &[Event], out: &mut Vec<Transition>) {
        if self.finished {
            return;
        }

        for event in events {
            match event {
                Event::TimeAdvanced { now, .. } => self.now = *now,
                Event::SessionEnded {
                    outcome: Outcome::Won,
                    ..
                } => {
                    self.completes_at = Some(self.now.saturating_add(COMPLETION_DELAY));
                }
                Event::PlayerRespawned => self.completes_at = None,
                _ => {}
            }
        }

        let Some(due) = self.completes_at else {
            return;
        };
        if self.now < due {
            return;
        }

        self.completes_at = None;
        self.now = Duration::ZERO;
        match self.current.next() {
            Some(next) => {
                info!(from = ?self.current, to = ?next, "world complete");
                self.current = next;
                out.push(Transition::Advance(next));
            }
            None => {
                info!(world = ?self.current, "campaign complete");
                self.finished = true;
                out.push(Transition::CampaignComplete);
            }
        }
    }
}

/// Releases every entity of `world` through its collaborators and hands them back.
pub fn tear_down(mut world: World, out_events: &mut Vec<Event>) -> Collaborators {
    world::apply(&mut world, Command::Reset, out_events);
    world.into_collaborators()
}

/// Tears down `previous` and loads `profile` with the same collaborators.
pub fn load_world(previous: World, profile: WorldProfile, out_events: &mut Vec<Event>) -> World {
    let collaborators = tear_down(previous, out_events);
    World::with_collaborators(profile, collaborators)
}
