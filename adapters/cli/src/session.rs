//! Headless session loop wiring the world, systems and presenter together.

use std::time::Duration;

use anyhow::Result;
use frostbloom_core::{Command, Event, Outcome, SessionSummary, WorldKind, WorldProfile};
use frostbloom_rendering::{Presenter, RenderingBackend};
use frostbloom_system_controls::Controls;
use frostbloom_system_narrative::NarrativeDirector;
use frostbloom_system_progression::{tear_down, Progression, Transition};
use frostbloom_system_spawning::{Config, Spawning};
use frostbloom_world::{self as world, query, Collaborators, World};
use serde::Serialize;
use tracing::{debug, info};

use crate::autopilot::Autopilot;

/// Knobs for one headless run.
#[derive(Clone, Debug)]
pub(crate) struct SessionOptions {
    /// Profile of the world the run starts in.
    pub(crate) first: WorldProfile,
    /// Upper bound on simulated frames.
    pub(crate) frames: u64,
    /// Seed for spawning and particle jitter.
    pub(crate) seed: u64,
    /// Simulated time per frame.
    pub(crate) frame_time: Duration,
    /// Autopilot movement per frame.
    pub(crate) step: f32,
    /// Autopilot fires every this many frames.
    pub(crate) fire_every: u64,
}

/// One finished session.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub(crate) struct Attempt {
    pub(crate) world: WorldKind,
    pub(crate) outcome: Outcome,
    pub(crate) cues: Vec<&'static str>,
    pub(crate) summary: SessionSummary,
}

/// What happened during a run.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub(crate) struct Report {
    pub(crate) frames: u64,
    pub(crate) campaign_complete: bool,
    pub(crate) attempts: Vec<Attempt>,
}

/// Runs the autopilot until the frame budget is spent or the campaign ends.
pub(crate) fn run(options: SessionOptions, backend: &mut impl RenderingBackend) -> Result<Report> {
    let SessionOptions {
        first,
        frames,
        seed,
        frame_time,
        step,
        fire_every,
    } = options;

    let presenter = Presenter::new(first.world, first.player_max_health, seed);
    let mut director = NarrativeDirector::new(first.world);
    let collaborators = Collaborators {
        presentation: presenter.presentation_sink(),
        scoreboard: presenter.score_sink(),
        narrative: Box::new(director.clone()),
    };

    let mut spawning = Spawning::new(Config::from_profile(&first, seed));
    let mut progression = Progression::new(first.world);
    let mut world = World::with_collaborators(first, collaborators);
    let mut controls = Controls::new();
    let mut autopilot = Autopilot::new(step, fire_every);

    let mut events = Vec::new();
    let mut spawned = Vec::new();
    let mut commands = Vec::new();
    let mut transitions = Vec::new();
    let mut cues = Vec::new();
    let mut report = Report::default();

    for frame in 0..frames {
        let input = autopilot.decide(&world);
        let pose = query::player_pose(&world);
        controls.handle(&events, &pose, input, &mut commands);
        commands.push(Command::Tick { dt: frame_time });

        events.clear();
        for command in commands.drain(..) {
            world::apply(&mut world, command, &mut events);
        }

        let context = query::spawn_context(&world);
        spawning.handle(&events, &context, query::profile(&world), &mut commands);
        for command in commands.drain(..) {
            world::apply(&mut world, command, &mut spawned);
        }
        events.append(&mut spawned);

        for cue in director.drain_fired() {
            info!(cue, "narrative cue");
            cues.push(cue);
        }
        for event in &events {
            if let Event::SessionEnded { outcome, summary } = event {
                report.attempts.push(Attempt {
                    world: query::status(&world).world,
                    outcome: *outcome,
                    cues: std::mem::take(&mut cues),
                    summary: *summary,
                });
            }
        }

        if let Some(banner) = presenter.take_banner() {
            backend.announce(banner)?;
        }
        backend.present(&presenter.frame())?;
        report.frames = frame + 1;

        progression.handle(&events, &mut transitions);
        for transition in transitions.drain(..) {
            match transition {
                Transition::Advance(next) => {
                    let profile = WorldProfile::for_world(next);
                    let mut teardown = Vec::new();
                    let mut collaborators = tear_down(world, &mut teardown);
                    debug!(released = teardown.len(), "previous world torn down");

                    director = NarrativeDirector::new(next);
                    collaborators.narrative = Box::new(director.clone());
                    presenter.load_world(next, profile.player_max_health);
                    spawning = Spawning::new(Config::from_profile(&profile, seed));
                    world = World::with_collaborators(profile, collaborators);
                    controls = Controls::new();
                    autopilot = Autopilot::new(step, fire_every);
                    events.clear();
                    cues.clear();
                    info!(world = ?next, "world advanced");
                }
                Transition::CampaignComplete => report.campaign_complete = true,
            }
        }

        if report.campaign_complete {
            break;
        }
    }

    Ok(report)
}
