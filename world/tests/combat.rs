use std::{cell::RefCell, rc::Rc, time::Duration};

use frostbloom_core::{
    CollectibleKind, Command, EffectColor, EnemyId, EnemyPhase, EnemyRemoval, EntityRef, Event,
    Explosion, Outcome, PickupStream, PresentationSink, Vec2, WorldProfile,
};
use frostbloom_world::{self as world, query, Collaborators, World};

const FRAME: Duration = Duration::from_millis(16);

fn run(world: &mut World, command: Command) -> Vec<Event> {
    let mut events = Vec::new();
    world::apply(world, command, &mut events);
    events
}

fn tick(world: &mut World) -> Vec<Event> {
    run(world, Command::Tick { dt: FRAME })
}

fn pose(world: &mut World, x: f32, z: f32) {
    let _ = run(
        world,
        Command::SetPlayerPose {
            position: Vec2::new(x, z),
            heading: 0.0,
        },
    );
}

fn spawn_enemy(world: &mut World, x: f32, z: f32, speed: f32) -> EnemyId {
    let events = run(
        world,
        Command::SpawnEnemy {
            position: Vec2::new(x, z),
            speed,
            wobble_offset: 0.0,
        },
    );
    match events.as_slice() {
        [Event::EnemySpawned { enemy, .. }] => *enemy,
        other => panic!("unexpected spawn events: {other:?}"),
    }
}

fn pick_up(world: &mut World, kind: CollectibleKind) -> Vec<Event> {
    let player = query::player_pose(world).position;
    let _ = run(
        world,
        Command::SpawnCollectible {
            position: player,
            kind,
            stream: PickupStream::Primary,
        },
    );
    tick(world)
}

fn fire(world: &mut World, origin: Vec2, direction: Vec2) {
    let _ = run(world, Command::FireProjectile { origin, direction });
}

fn count(events: &[Event], predicate: impl Fn(&Event) -> bool) -> usize {
    events.iter().filter(|event| predicate(event)).count()
}

#[test]
fn enemy_closes_in_to_stop_distance() {
    let mut world = World::new(WorldProfile::winter());
    let id = spawn_enemy(&mut world, 0.0, 5.0, 0.1);

    for _ in 0..35 {
        let _ = tick(&mut world);
    }

    let enemy = query::enemy(&world, id).expect("enemy is alive");
    assert!(
        (enemy.position.length() - 1.5).abs() < 1e-3,
        "enemy stopped at {}",
        enemy.position.length()
    );
}

#[test]
fn three_gifts_unlock_and_a_fourth_only_scores() {
    let mut world = World::new(WorldProfile::winter());

    let mut unlocked = 0;
    for _ in 0..3 {
        let events = pick_up(&mut world, CollectibleKind::Gift);
        unlocked += count(&events, |event| matches!(event, Event::SpecialAbilityUnlocked));
    }
    let status = query::status(&world);
    assert_eq!(unlocked, 1);
    assert!(status.special_ability_active);
    assert_eq!(status.gifts_collected, 3);
    assert_eq!(status.score, 600);

    let events = pick_up(&mut world, CollectibleKind::Gift);
    let status = query::status(&world);
    assert_eq!(count(&events, |event| matches!(event, Event::SpecialAbilityUnlocked)), 0);
    assert_eq!(status.gifts_collected, 3);
    assert_eq!(status.score, 800);
}

fn drop_collectible(world: &mut World, x: f32, kind: CollectibleKind, stream: PickupStream) -> usize {
    let events = run(
        world,
        Command::SpawnCollectible {
            position: Vec2::new(x, 0.0),
            kind,
            stream,
        },
    );
    count(&events, |event| matches!(event, Event::CollectibleSpawned { .. }))
}

#[test]
fn nearby_pickups_reach_farther_and_share_the_gift_quota() {
    let mut world = World::new(WorldProfile::winter());
    assert_eq!(drop_collectible(&mut world, 1.5, CollectibleKind::Gift, PickupStream::Primary), 1);
    assert_eq!(drop_collectible(&mut world, -1.5, CollectibleKind::Gift, PickupStream::Nearby), 1);

    let events = tick(&mut world);
    let status = query::status(&world);
    assert_eq!(status.gifts_collected, 1);
    assert_eq!(status.score, 0);
    assert_eq!(query::collectibles(&world).len(), 1);
    assert_eq!(count(&events, |event| matches!(event, Event::CollectibleRemoved { .. })), 1);

    for _ in 0..2 {
        let _ = drop_collectible(&mut world, 0.0, CollectibleKind::Gift, PickupStream::Nearby);
        let _ = tick(&mut world);
    }
    let status = query::status(&world);
    assert!(status.special_ability_active);
    assert_eq!(status.gifts_collected, 3);
    assert_eq!(status.score, 0);
}

#[test]
fn nearby_power_pickup_leaves_damage_untouched() {
    let mut world = World::new(WorldProfile::winter());
    let _ = drop_collectible(&mut world, 1.5, CollectibleKind::Power, PickupStream::Nearby);
    let events = tick(&mut world);
    assert!(query::collectibles(&world).is_empty());
    assert_eq!(count(&events, |event| matches!(event, Event::PowerUpStarted { .. })), 0);
    assert_eq!(query::status(&world).power_up_remaining, None);
}

#[test]
fn worlds_without_a_nearby_stream_ignore_its_spawns() {
    let mut world = World::new(WorldProfile::spring());
    assert_eq!(drop_collectible(&mut world, 0.0, CollectibleKind::Health, PickupStream::Nearby), 0);
    assert!(query::collectibles(&world).is_empty());
}

#[test]
fn power_up_window_closes_after_ten_seconds() {
    let mut world = World::new(WorldProfile::winter());
    let _ = run(
        &mut world,
        Command::SpawnCollectible {
            position: Vec2::ZERO,
            kind: CollectibleKind::Power,
            stream: PickupStream::Primary,
        },
    );
    let events = run(
        &mut world,
        Command::Tick {
            dt: Duration::from_millis(1000),
        },
    );
    assert!(events.contains(&Event::PowerUpStarted {
        until: Duration::from_millis(11_000)
    }));

    let _ = run(
        &mut world,
        Command::Tick {
            dt: Duration::from_millis(9_999),
        },
    );
    assert_eq!(
        query::status(&world).power_up_remaining,
        Some(Duration::from_millis(1))
    );

    let events = run(
        &mut world,
        Command::Tick {
            dt: Duration::from_millis(2),
        },
    );
    assert!(events.contains(&Event::PowerUpEnded));
    assert_eq!(query::status(&world).power_up_remaining, None);
}

#[test]
fn three_single_hits_defeat_a_regular_enemy_once() {
    let mut world = World::new(WorldProfile::winter());
    let id = spawn_enemy(&mut world, 0.0, 3.0, 0.0);

    let mut events = Vec::new();
    for _ in 0..3 {
        fire(&mut world, Vec2::new(0.0, 2.5), Vec2::new(0.0, 1.0));
        events.extend(tick(&mut world));
    }

    let removals = count(&events, |event| {
        matches!(
            event,
            Event::EnemyRemoved {
                reason: EnemyRemoval::Defeated,
                ..
            }
        )
    });
    assert_eq!(removals, 1);
    let explosions: Vec<&Explosion> = events
        .iter()
        .filter_map(|event| match event {
            Event::Explosion { explosion } => Some(explosion),
            _ => None,
        })
        .collect();
    assert_eq!(explosions.len(), 1);
    assert_eq!(explosions[0].particle_count, 8);
    assert_eq!(explosions[0].color, EffectColor::from_hex(0xAA_DD_FF));
    assert!(query::enemy(&world, id).is_none());

    let status = query::status(&world);
    assert_eq!(status.monsters_killed, 1);
    assert_eq!(status.score, 100);
}

#[test]
fn boss_is_shielded_until_special_ability_unlocks() {
    let mut world = World::new(WorldProfile::winter());
    pose(&mut world, 0.0, -6.0);
    let _ = tick(&mut world);
    let boss = query::boss(&world).expect("boss spawned near the castle");

    fire(&mut world, boss.position + Vec2::new(0.0, 1.0), Vec2::new(0.0, -1.0));
    let events = tick(&mut world);
    assert!(events.contains(&Event::ProjectileHit {
        projectile: frostbloom_core::ProjectileId::new(0),
        target: boss.id,
        damage: 0,
    }));
    assert_eq!(query::boss(&world).map(|boss| boss.health), Some(30));

    for _ in 0..3 {
        let _ = pick_up(&mut world, CollectibleKind::Gift);
    }
    assert!(query::status(&world).special_ability_active);

    let boss = query::boss(&world).expect("boss still alive");
    fire(&mut world, boss.position + Vec2::new(0.0, 1.0), Vec2::new(0.0, -1.0));
    let _ = tick(&mut world);
    assert_eq!(query::boss(&world).map(|boss| boss.health), Some(29));

    let _ = pick_up(&mut world, CollectibleKind::Power);
    let boss = query::boss(&world).expect("boss still alive");
    fire(&mut world, boss.position + Vec2::new(0.0, 1.0), Vec2::new(0.0, -1.0));
    let _ = tick(&mut world);
    assert_eq!(query::boss(&world).map(|boss| boss.health), Some(27));
}

#[test]
fn defeating_boss_and_reaching_castle_wins_once() {
    let mut world = World::new(WorldProfile::winter());
    pose(&mut world, 0.0, -6.0);
    let _ = tick(&mut world);
    for _ in 0..3 {
        let _ = pick_up(&mut world, CollectibleKind::Gift);
    }

    let mut defeated = false;
    for _ in 0..30 {
        let Some(boss) = query::boss(&world) else {
            break;
        };
        fire(&mut world, boss.position + Vec2::new(0.0, 1.0), Vec2::new(0.0, -1.0));
        let events = tick(&mut world);
        defeated |= events.iter().any(|event| {
            matches!(
                event,
                Event::Explosion { explosion } if explosion.particle_count == 20
            )
        });
    }
    assert!(defeated);
    assert!(query::status(&world).boss_defeated);
    assert_eq!(query::status(&world).outcome, None);

    pose(&mut world, 0.0, -20.0);
    let events = tick(&mut world);
    let ended: Vec<_> = events
        .iter()
        .filter_map(|event| match event {
            Event::SessionEnded { outcome, summary } => Some((*outcome, *summary)),
            _ => None,
        })
        .collect();
    assert_eq!(ended.len(), 1);
    let (outcome, summary) = ended[0];
    assert_eq!(outcome, Outcome::Won);
    assert_eq!(summary.survival_seconds, 0);
    assert_eq!(summary.bonus, Some(1000));
    assert_eq!(summary.score, 600 + 500 + 1000);
    assert_eq!(summary.monsters_killed, 1);

    for _ in 0..5 {
        let events = tick(&mut world);
        assert_eq!(
            count(&events, |event| matches!(event, Event::SessionEnded { .. })),
            0
        );
    }
    let status = query::status(&world);
    assert_eq!(status.outcome, Some(Outcome::Won));
    assert!(!status.player_alive);
}

#[test]
fn depleted_health_loses_and_freezes_enemies() {
    let mut world = World::new(WorldProfile::winter());
    for index in 0..15 {
        let angle = index as f32 / 15.0 * std::f32::consts::TAU;
        let _ = spawn_enemy(&mut world, angle.cos(), angle.sin(), 0.1);
    }

    let first = tick(&mut world);
    assert_eq!(query::status(&world).player_health, 25);
    assert_eq!(
        count(&first, |event| matches!(event, Event::EnemyAttacked { .. })),
        15
    );

    let events = run(
        &mut world,
        Command::Tick {
            dt: Duration::from_millis(1600),
        },
    );
    assert_eq!(
        count(&events, |event| matches!(event, Event::PlayerDamaged { .. })),
        5
    );
    assert_eq!(
        count(&events, |event| matches!(
            event,
            Event::SessionEnded {
                outcome: Outcome::Lost,
                ..
            }
        )),
        1
    );

    let status = query::status(&world);
    assert_eq!(status.player_health, 0);
    assert!(!status.player_alive);
    assert!(query::enemies(&world)
        .iter()
        .all(|enemy| enemy.phase == EnemyPhase::Frozen));

    let frozen = query::enemies(&world);
    let _ = run(
        &mut world,
        Command::Tick {
            dt: Duration::from_secs(5),
        },
    );
    assert_eq!(
        query::enemies(&world)
            .iter()
            .map(|enemy| enemy.position)
            .collect::<Vec<_>>(),
        frozen.iter().map(|enemy| enemy.position).collect::<Vec<_>>()
    );
}

#[test]
fn reset_is_idempotent_and_keeps_session_state() {
    let mut world = World::new(WorldProfile::winter());
    for _ in 0..3 {
        let _ = pick_up(&mut world, CollectibleKind::Gift);
    }
    let _ = spawn_enemy(&mut world, 0.0, 10.0, 0.1);
    fire(&mut world, Vec2::ZERO, Vec2::new(1.0, 0.0));
    let _ = run(
        &mut world,
        Command::SpawnCollectible {
            position: Vec2::new(10.0, 0.0),
            kind: CollectibleKind::Health,
            stream: PickupStream::Primary,
        },
    );
    let before = query::status(&world);

    let first = run(&mut world, Command::Reset);
    assert_eq!(first.len(), 4);
    assert_eq!(first.last(), Some(&Event::RegistriesCleared));

    let second = run(&mut world, Command::Reset);
    assert_eq!(second, vec![Event::RegistriesCleared]);

    let after = query::status(&world);
    assert_eq!(after.score, before.score);
    assert_eq!(after.monsters_killed, before.monsters_killed);
    assert!(after.special_ability_active);
    assert!(query::enemies(&world).is_empty());
    assert!(query::projectiles(&world).is_empty());
    assert!(query::collectibles(&world).is_empty());
}

#[test]
fn respawn_restores_a_fresh_session() {
    let mut world = World::new(WorldProfile::winter());
    for _ in 0..3 {
        let _ = pick_up(&mut world, CollectibleKind::Gift);
    }
    pose(&mut world, 4.0, -2.0);
    assert!(query::status(&world).special_ability_active);

    let events = run(&mut world, Command::Respawn);
    assert_eq!(events.last(), Some(&Event::PlayerRespawned));

    let status = query::status(&world);
    assert!(!status.special_ability_active);
    assert_eq!(status.gifts_collected, 0);
    assert_eq!(status.score, 0);
    assert_eq!(status.player_health, status.player_max_health);
    assert!(status.player_alive);
    assert_eq!(query::player_pose(&world).position, Vec2::ZERO);
}

#[test]
fn jump_scatters_only_in_winter() {
    let mut winter = World::new(WorldProfile::winter());
    let _ = spawn_enemy(&mut winter, 3.0, 0.0, 0.1);
    let _ = spawn_enemy(&mut winter, 0.0, 20.0, 0.1);
    let events = run(&mut winter, Command::Jump);
    assert_eq!(events, vec![Event::EnemiesScattered { count: 1 }]);

    let mut spring = World::new(WorldProfile::spring());
    let _ = spawn_enemy(&mut spring, 3.0, 0.0, 0.1);
    assert!(run(&mut spring, Command::Jump).is_empty());
    let _ = tick(&mut spring);
    assert!(query::player_pose(&spring).height > 0.0);
}

#[derive(Clone, Debug, Default)]
struct HandleLedger {
    live: Rc<RefCell<Vec<EntityRef>>>,
    double_releases: Rc<RefCell<usize>>,
}

impl PresentationSink for HandleLedger {
    fn entity_spawned(&mut self, entity: EntityRef, _position: Vec2) {
        self.live.borrow_mut().push(entity);
    }

    fn entity_released(&mut self, entity: EntityRef) {
        let mut live = self.live.borrow_mut();
        match live.iter().position(|candidate| *candidate == entity) {
            Some(index) => {
                let _ = live.remove(index);
            }
            None => *self.double_releases.borrow_mut() += 1,
        }
    }
}

#[test]
fn every_presentation_handle_is_released_exactly_once() {
    let ledger = HandleLedger::default();
    let collaborators = Collaborators {
        presentation: Box::new(ledger.clone()),
        ..Collaborators::default()
    };
    let mut world = World::with_collaborators(WorldProfile::winter(), collaborators);

    let _ = spawn_enemy(&mut world, 0.0, 3.0, 0.0);
    let _ = spawn_enemy(&mut world, 5.0, 5.0, 0.1);
    for _ in 0..3 {
        fire(&mut world, Vec2::new(0.0, 2.5), Vec2::new(0.0, 1.0));
        let _ = tick(&mut world);
    }
    fire(&mut world, Vec2::ZERO, Vec2::new(-1.0, 0.0));
    let _ = run(
        &mut world,
        Command::SpawnCollectible {
            position: Vec2::new(8.0, 0.0),
            kind: CollectibleKind::Power,
            stream: PickupStream::Primary,
        },
    );
    assert_eq!(ledger.live.borrow().len(), 3);

    let _ = run(&mut world, Command::Reset);
    let _ = run(&mut world, Command::Reset);
    assert!(ledger.live.borrow().is_empty());
    assert_eq!(*ledger.double_releases.borrow(), 0);
}
