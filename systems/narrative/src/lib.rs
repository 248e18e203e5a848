#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Narrative system that fires one-shot story cues from the per-frame narrative snapshot.
//!
//! Cue effects (dialogue, weather, companions) belong to the embedding
//! application; this crate only decides when each cue fires and which cue is
//! currently active.

use std::{cell::RefCell, rc::Rc, time::Duration};

use frostbloom_core::{NarrativeSink, NarrativeSnapshot, WorldKind};
use tracing::debug;

/// Condition that fires a cue.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Trigger {
    /// Player is at most this far from the anchor.
    DistanceWithin(f32),
    /// At least this many enemies were defeated.
    KillsAtLeast(u32),
    /// The boss has appeared.
    BossSpawned,
    /// The boss has been defeated.
    BossDefeated,
}

impl Trigger {
    /// Reports whether the snapshot satisfies the trigger.
    #[must_use]
    pub fn is_met(&self, snapshot: &NarrativeSnapshot) -> bool {
        match *self {
            Self::DistanceWithin(distance) => snapshot.distance_to_anchor <= distance,
            Self::KillsAtLeast(kills) => snapshot.monsters_killed >= kills,
            Self::BossSpawned => snapshot.boss_spawned,
            Self::BossDefeated => snapshot.boss_defeated,
        }
    }
}

/// Story beat fired at most once per session.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Cue {
    /// Stable identifier handed to the effect layer.
    pub name: &'static str,
    /// Condition that fires the cue.
    pub trigger: Trigger,
    /// How long the cue stays active; zero for instantaneous cues.
    pub duration: Duration,
}

const WINTER_CUES: [Cue; 4] = [
    Cue {
        name: "olaf_warning",
        trigger: Trigger::DistanceWithin(35.0),
        duration: Duration::from_millis(5000),
    },
    Cue {
        name: "reindeer_companion",
        trigger: Trigger::KillsAtLeast(5),
        duration: Duration::from_millis(10_000),
    },
    Cue {
        name: "snowstorm_intensifies",
        trigger: Trigger::BossSpawned,
        duration: Duration::ZERO,
    },
    Cue {
        name: "olaf_celebrates",
        trigger: Trigger::BossDefeated,
        duration: Duration::from_millis(5000),
    },
];

const SPRING_CUES: [Cue; 4] = [
    Cue {
        name: "butterfly_guide",
        trigger: Trigger::DistanceWithin(40.0),
        duration: Duration::from_millis(8000),
    },
    Cue {
        name: "flower_bloom",
        trigger: Trigger::KillsAtLeast(3),
        duration: Duration::from_millis(4000),
    },
    Cue {
        name: "mantis_arrival",
        trigger: Trigger::BossSpawned,
        duration: Duration::ZERO,
    },
    Cue {
        name: "garden_celebration",
        trigger: Trigger::BossDefeated,
        duration: Duration::from_millis(6000),
    },
];

/// Cue table for the provided world.
#[must_use]
pub fn cues_for(world: WorldKind) -> &'static [Cue] {
    match world {
        WorldKind::Winter => &WINTER_CUES,
        WorldKind::Spring => &SPRING_CUES,
    }
}

/// Cue that is still playing out.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ActiveCue {
    /// Identifier of the cue.
    pub name: &'static str,
    /// Session time at which the cue ends.
    pub until: Duration,
}

/// Evaluates the cue table against successive narrative snapshots.
#[derive(Debug)]
pub struct Narrative {
    cues: &'static [Cue],
    fired: Vec<bool>,
    active: Option<ActiveCue>,
    elapsed: Duration,
    pending: Vec<&'static str>,
}

impl Narrative {
    /// Creates a narrative for the provided world with no cue fired yet.
    #[must_use]
    pub fn new(world: WorldKind) -> Self {
        let cues = cues_for(world);
        Self {
            cues,
            fired: vec![false; cues.len()],
            active: None,
            elapsed: Duration::ZERO,
            pending: Vec::new(),
        }
    }

    /// Forgets every fired cue so the table can play again.
    pub fn reset(&mut self) {
        self.fired.iter_mut().for_each(|fired| *fired = false);
        self.active = None;
        self.elapsed = Duration::ZERO;
        self.pending.clear();
    }

    /// Fires every cue whose trigger the snapshot satisfies for the first time.
    ///
    /// A snapshot whose session clock runs behind the previous one starts a
    /// fresh session.
    pub fn observe(&mut self, snapshot: &NarrativeSnapshot) -> Vec<&'static Cue> {
        if snapshot.elapsed < self.elapsed {
            self.reset();
        }
        self.elapsed = snapshot.elapsed;

        let cues = self.cues;
        let mut fired = Vec::new();
        for (cue, done) in cues.iter().zip(self.fired.iter_mut()) {
            if *done || !cue.trigger.is_met(snapshot) {
                continue;
            }
            *done = true;
            if !cue.duration.is_zero() {
                self.active = Some(ActiveCue {
                    name: cue.name,
                    until: snapshot.elapsed.saturating_add(cue.duration),
                });
            }
            debug!(cue = cue.name, "narrative cue fired");
            self.pending.push(cue.name);
            fired.push(cue);
        }
        fired
    }

    /// Most recent cue with a duration that has not yet elapsed.
    #[must_use]
    pub fn active(&self) -> Option<ActiveCue> {
        self.active.filter(|cue| self.elapsed < cue.until)
    }

    /// Reports whether the named cue already fired this session.
    #[must_use]
    pub fn has_fired(&self, name: &str) -> bool {
        self.cues
            .iter()
            .zip(&self.fired)
            .any(|(cue, fired)| *fired && cue.name == name)
    }

    /// Hands over the names of cues fired since the previous call.
    pub fn drain_fired(&mut self) -> Vec<&'static str> {
        std::mem::take(&mut self.pending)
    }
}

/// Narrative collaborator that can be handed to a world while the caller keeps a view.
///
/// Clones share the same underlying [`Narrative`].
#[derive(Clone, Debug)]
pub struct NarrativeDirector {
    narrative: Rc<RefCell<Narrative>>,
}

impl NarrativeDirector {
    /// Creates a director for the provided world.
    #[must_use]
    pub fn new(world: WorldKind) -> Self {
        Self {
            narrative: Rc::new(RefCell::new(Narrative::new(world))),
        }
    }

    /// Cue currently playing out, if any.
    #[must_use]
    pub fn active_cue(&self) -> Option<ActiveCue> {
        self.narrative.borrow().active()
    }

    /// Names of cues fired since the previous call.
    pub fn drain_fired(&self) -> Vec<&'static str> {
        self.narrative.borrow_mut().drain_fired()
    }

    /// Reports whether the named cue already fired this session.
    #[must_use]
    pub fn has_fired(&self, name: &str) -> bool {
        self.narrative.borrow().has_fired(name)
    }
}

impl NarrativeSink for NarrativeDirector {
    fn report(&mut self, snapshot: &NarrativeSnapshot) {
        let _ = self.narrative.borrow_mut().observe(snapshot);
    }
}
