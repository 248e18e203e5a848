use std::{cell::RefCell, rc::Rc, time::Duration};

use frostbloom_core::{
    CollectibleKind, Command, EntityRef, Event, PickupStream, PresentationSink, Vec2, WorldKind,
    WorldProfile,
};
use frostbloom_system_progression::{load_world, Progression, Transition};
use frostbloom_world::{self as world, query, Collaborators, World};

#[derive(Clone, Debug, Default)]
struct LiveHandles(Rc<RefCell<Vec<EntityRef>>>);

impl PresentationSink for LiveHandles {
    fn entity_spawned(&mut self, entity: EntityRef, _position: Vec2) {
        self.0.borrow_mut().push(entity);
    }

    fn entity_released(&mut self, entity: EntityRef) {
        self.0.borrow_mut().retain(|live| *live != entity);
    }
}

fn apply(world: &mut World, command: Command, log: &mut Vec<Event>) {
    world::apply(world, command, log);
}

#[test]
fn advancing_releases_old_handles_and_keeps_collaborators() {
    let handles = LiveHandles::default();
    let collaborators = Collaborators {
        presentation: Box::new(handles.clone()),
        ..Collaborators::default()
    };
    let mut winter = World::with_collaborators(WorldProfile::winter(), collaborators);
    let mut events = Vec::new();

    apply(
        &mut winter,
        Command::SpawnEnemy {
            position: Vec2::new(0.0, 10.0),
            speed: 0.1,
            wobble_offset: 0.0,
        },
        &mut events,
    );
    apply(
        &mut winter,
        Command::SpawnCollectible {
            position: Vec2::new(6.0, 0.0),
            kind: CollectibleKind::Gift,
            stream: PickupStream::Primary,
        },
        &mut events,
    );
    apply(
        &mut winter,
        Command::SetPlayerPose {
            position: Vec2::new(3.0, -4.0),
            heading: 1.0,
        },
        &mut events,
    );
    assert_eq!(handles.0.borrow().len(), 2);

    events.clear();
    let mut spring = load_world(winter, WorldProfile::spring(), &mut events);
    assert!(handles.0.borrow().is_empty(), "every winter handle is released");
    assert_eq!(events.last(), Some(&Event::RegistriesCleared));

    assert_eq!(query::status(&spring).world, WorldKind::Spring);
    assert_eq!(query::player_pose(&spring).position, Vec2::ZERO);
    assert_eq!(query::now(&spring), Duration::ZERO);

    apply(
        &mut spring,
        Command::SpawnEnemy {
            position: Vec2::new(0.0, 10.0),
            speed: 0.07,
            wobble_offset: 0.0,
        },
        &mut events,
    );
    assert_eq!(handles.0.borrow().len(), 1, "collaborators follow the player");
}

#[test]
fn scripted_win_advances_after_delay() {
    let mut world = World::new(WorldProfile::winter());
    let mut progression = Progression::new(WorldKind::Winter);
    let mut transitions = Vec::new();

    let mut events = Vec::new();
    apply(
        &mut world,
        Command::Tick {
            dt: Duration::from_millis(16),
        },
        &mut events,
    );
    progression.handle(&events, &mut transitions);
    assert!(transitions.is_empty());
    assert_eq!(progression.current(), WorldKind::Winter);

    let summary = frostbloom_core::SessionSummary {
        score: 0,
        monsters_killed: 1,
        survival_seconds: 0,
        bonus: Some(1000),
    };
    progression.handle(
        &[
            Event::TimeAdvanced {
                dt: Duration::from_millis(16),
                now: Duration::from_millis(32),
            },
            Event::SessionEnded {
                outcome: frostbloom_core::Outcome::Won,
                summary,
            },
        ],
        &mut transitions,
    );

    for _ in 0..200 {
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::Tick {
                dt: Duration::from_millis(16),
            },
            &mut events,
        );
        progression.handle(&events, &mut transitions);
    }
    assert_eq!(transitions, vec![Transition::Advance(WorldKind::Spring)]);

    let mut teardown = Vec::new();
    let next = progression.current();
    let spring = load_world(world, WorldProfile::for_world(next), &mut teardown);
    assert_eq!(query::status(&spring).world, WorldKind::Spring);
}
