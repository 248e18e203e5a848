use frostbloom_core::{Command, Event, Outcome, PlayerPose, SessionSummary, Vec2};
use frostbloom_system_controls::{Controls, Movement, PlayerInput};

fn grounded_at(position: Vec2, heading: f32) -> PlayerPose {
    PlayerPose {
        position,
        heading,
        height: 0.0,
        tilt: 0.0,
        spin: 0.0,
    }
}

fn session_lost() -> Event {
    Event::SessionEnded {
        outcome: Outcome::Lost,
        summary: SessionSummary {
            score: 0,
            monsters_killed: 0,
            survival_seconds: 12,
            bonus: None,
        },
    }
}

#[test]
fn fire_uses_current_pose() {
    let mut controls = Controls::default();
    let mut commands = Vec::new();

    controls.handle(
        &[],
        &grounded_at(Vec2::new(2.0, 3.0), 0.0),
        PlayerInput {
            fire: true,
            ..PlayerInput::default()
        },
        &mut commands,
    );

    assert_eq!(
        commands,
        vec![Command::FireProjectile {
            origin: Vec2::new(2.0, 3.0),
            direction: Vec2::new(0.0, -1.0),
        }],
        "fire should launch from the player toward their facing",
    );
}

#[test]
fn movement_is_applied_before_firing() {
    let mut controls = Controls::default();
    let mut commands = Vec::new();
    let moved = Movement::new(Vec2::new(-1.0, 4.0), std::f32::consts::PI);

    controls.handle(
        &[],
        &grounded_at(Vec2::ZERO, 0.0),
        PlayerInput {
            fire: true,
            movement: Some(moved),
            ..PlayerInput::default()
        },
        &mut commands,
    );

    assert_eq!(commands.len(), 2);
    assert_eq!(
        commands[0],
        Command::SetPlayerPose {
            position: moved.position,
            heading: moved.heading,
        }
    );
    match &commands[1] {
        Command::FireProjectile { origin, direction } => {
            assert_eq!(*origin, moved.position);
            assert!((direction.y - 1.0).abs() < 1e-6);
        }
        other => panic!("unexpected command emitted: {other:?}"),
    }
}

#[test]
fn jump_ignored_while_airborne() {
    let mut controls = Controls::default();
    let mut commands = Vec::new();
    let mut airborne = grounded_at(Vec2::ZERO, 0.0);
    airborne.height = 1.2;

    controls.handle(
        &[],
        &airborne,
        PlayerInput {
            jump: true,
            ..PlayerInput::default()
        },
        &mut commands,
    );
    assert!(commands.is_empty(), "no second jump mid-air");

    controls.handle(
        &[],
        &grounded_at(Vec2::ZERO, 0.0),
        PlayerInput {
            jump: true,
            ..PlayerInput::default()
        },
        &mut commands,
    );
    assert_eq!(commands, vec![Command::Jump]);
}

#[test]
fn only_respawn_is_honoured_after_session_ends() {
    let mut controls = Controls::default();
    let mut commands = Vec::new();
    let pose = grounded_at(Vec2::ZERO, 0.0);

    controls.handle(
        &[session_lost()],
        &pose,
        PlayerInput {
            fire: true,
            jump: true,
            movement: Some(Movement::new(Vec2::new(1.0, 1.0), 0.0)),
            respawn: false,
        },
        &mut commands,
    );
    assert!(commands.is_empty(), "combat input ignored after defeat");
    assert!(!controls.is_active());

    controls.handle(
        &[],
        &pose,
        PlayerInput {
            fire: true,
            respawn: true,
            ..PlayerInput::default()
        },
        &mut commands,
    );
    assert_eq!(commands, vec![Command::Respawn]);

    commands.clear();
    controls.handle(
        &[Event::PlayerRespawned],
        &pose,
        PlayerInput {
            fire: true,
            ..PlayerInput::default()
        },
        &mut commands,
    );
    assert!(controls.is_active());
    assert_eq!(commands.len(), 1);
}

#[test]
fn respawn_ignored_while_playing() {
    let mut controls = Controls::new();
    let mut commands = Vec::new();
    controls.handle(
        &[],
        &grounded_at(Vec2::ZERO, 0.0),
        PlayerInput {
            respawn: true,
            ..PlayerInput::default()
        },
        &mut commands,
    );
    assert!(commands.is_empty());
}
