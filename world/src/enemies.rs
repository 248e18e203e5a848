use std::time::Duration;

use frostbloom_combat::{
    heading_toward, seek, sweep, within, wobble, AttackClock, TimedEffect, Vitals,
    FLASH_DURATION, LUNGE_DURATION, LUNGE_SCALE, SCATTER_WOBBLE_RATE, SEEK_WOBBLE_RATE,
};
use frostbloom_core::{
    BossTuning, EffectColor, EnemyId, EnemyPhase, EnemyRank, EnemyRemoval, EnemySnapshot,
    EnemyTuning, Event, Explosion, ExplosionTuning, ProjectileId, ScatterTuning, Tint, Vec2,
    WorldProfile, HIT_FLASH, SHIELD_FLASH,
};
use tracing::{debug, info, trace};

const SEEK_BOB: f32 = 0.1;
const SCATTER_BOB: f32 = 0.15;

#[derive(Clone, Copy, Debug)]
struct Scatter {
    direction: Vec2,
    effect: TimedEffect,
}

#[derive(Clone, Copy, Debug)]
struct Flash {
    color: EffectColor,
    effect: TimedEffect,
}

#[derive(Clone, Debug)]
pub(crate) struct Enemy {
    id: EnemyId,
    rank: EnemyRank,
    position: Vec2,
    speed: f32,
    wobble_offset: f32,
    vitals: Vitals,
    clock: AttackClock,
    attack_range: f32,
    stop_distance: f32,
    damage: u32,
    cooldown: Duration,
    hit_radius: f32,
    scale: f32,
    explosion: ExplosionTuning,
    heading: f32,
    height: f32,
    sway: f32,
    phase: EnemyPhase,
    scatter: Option<Scatter>,
    flash: Option<Flash>,
    lunge: Option<TimedEffect>,
}

impl Enemy {
    fn regular(
        id: EnemyId,
        position: Vec2,
        speed: f32,
        wobble_offset: f32,
        tuning: &EnemyTuning,
    ) -> Self {
        Self {
            id,
            rank: EnemyRank::Regular,
            position,
            speed,
            wobble_offset,
            vitals: Vitals::full(tuning.health),
            clock: AttackClock::new(),
            attack_range: tuning.attack_range,
            stop_distance: tuning.stop_distance,
            damage: tuning.damage,
            cooldown: tuning.attack_cooldown,
            hit_radius: tuning.hit_radius,
            scale: 1.0,
            explosion: tuning.explosion,
            heading: 0.0,
            height: 0.0,
            sway: 0.0,
            phase: EnemyPhase::Spawning,
            scatter: None,
            flash: None,
            lunge: None,
        }
    }

    fn boss(id: EnemyId, position: Vec2, tuning: &BossTuning) -> Self {
        Self {
            id,
            rank: EnemyRank::Boss,
            position,
            speed: tuning.speed,
            wobble_offset: 0.0,
            vitals: Vitals::full(tuning.health),
            clock: AttackClock::new(),
            attack_range: tuning.attack_range,
            stop_distance: tuning.stop_distance,
            damage: tuning.damage,
            cooldown: tuning.attack_cooldown,
            hit_radius: tuning.hit_radius,
            scale: tuning.scale,
            explosion: tuning.explosion,
            heading: 0.0,
            height: 0.0,
            sway: 0.0,
            phase: EnemyPhase::Spawning,
            scatter: None,
            flash: None,
            lunge: None,
        }
    }

    /// Closes in on the player and returns the distance measured before moving.
    fn pursue(&mut self, player: Vec2, now: Duration) -> f32 {
        let step = seek(self.position, player, self.speed, self.stop_distance);
        if step.advanced {
            self.heading = heading_toward(player - self.position);
            self.position = step.position;
            let phase = wobble(now, self.wobble_offset, SEEK_WOBBLE_RATE);
            self.height = phase.abs() * SEEK_BOB;
            self.sway = phase * SEEK_BOB;
        }
        self.phase = if step.distance <= self.attack_range {
            EnemyPhase::Attacking
        } else {
            EnemyPhase::Seeking
        };
        step.distance
    }

    fn drift(&mut self, direction: Vec2, speed_factor: f32, now: Duration) {
        self.position += direction * self.speed * speed_factor;
        if direction != Vec2::ZERO {
            self.heading = heading_toward(direction);
        }
        self.height = wobble(now, self.wobble_offset, SCATTER_WOBBLE_RATE).abs() * SCATTER_BOB;
        self.phase = EnemyPhase::Scattered;
    }

    fn attack(
        &mut self,
        distance: f32,
        now: Duration,
        player: &mut Vitals,
        out: &mut Vec<Event>,
    ) -> bool {
        let damage = self.damage;
        let landed = self
            .clock
            .try_strike(distance, self.attack_range, now, self.cooldown, || {
                let _ = player.damage(damage);
            });
        if landed {
            self.lunge = Some(TimedEffect::new(now, LUNGE_DURATION));
            trace!(enemy = self.id.get(), damage, health = player.current(), "enemy attack landed");
            out.push(Event::EnemyAttacked {
                enemy: self.id,
                damage,
            });
            out.push(Event::PlayerDamaged {
                amount: damage,
                health: player.current(),
            });
        }
        landed
    }

    fn flash(&mut self, color: EffectColor, now: Duration, out: &mut Vec<Event>) {
        self.flash = Some(Flash {
            color,
            effect: TimedEffect::new(now, FLASH_DURATION),
        });
        out.push(Event::EnemyTinted {
            enemy: self.id,
            tint: Tint::Flash(color),
        });
    }

    fn expire_effects(&mut self, now: Duration, out: &mut Vec<Event>) {
        if self.flash.is_some_and(|flash| !flash.effect.is_active(now)) {
            self.flash = None;
            out.push(Event::EnemyTinted {
                enemy: self.id,
                tint: Tint::Original,
            });
        }
        if self.lunge.is_some_and(|lunge| !lunge.is_active(now)) {
            self.lunge = None;
        }
    }

    fn explosion(&self) -> Explosion {
        Explosion {
            position: self.position,
            particle_count: self.explosion.particles,
            color: self.explosion.color,
            particle_size: self.explosion.size,
        }
    }

    fn snapshot(&self) -> EnemySnapshot {
        let lunge = if self.lunge.is_some() { LUNGE_SCALE } else { 1.0 };
        EnemySnapshot {
            id: self.id,
            rank: self.rank,
            position: self.position,
            height: self.height,
            sway: self.sway,
            heading: self.heading,
            scale: self.scale * lunge,
            tint: self
                .flash
                .map_or(Tint::Original, |flash| Tint::Flash(flash.color)),
            phase: self.phase,
            health: self.vitals.current(),
            max_health: self.vitals.max(),
        }
    }
}

/// Projectile impact resolved against the enemy registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Impact {
    pub(crate) rank: EnemyRank,
    pub(crate) defeated: bool,
}

/// Live regular enemies, the optional boss and the flags that gate its appearance.
#[derive(Clone, Debug)]
pub(crate) struct EnemyRegistry {
    live: Vec<Enemy>,
    boss: Option<Enemy>,
    next_id: u32,
    max_live: usize,
    default_max_live: usize,
    boss_spawned: bool,
    boss_defeated: bool,
}

impl EnemyRegistry {
    pub(crate) fn new(max_live: usize) -> Self {
        Self {
            live: Vec::new(),
            boss: None,
            next_id: 0,
            max_live,
            default_max_live: max_live,
            boss_spawned: false,
            boss_defeated: false,
        }
    }

    fn allocate_id(&mut self) -> EnemyId {
        let id = EnemyId::new(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        id
    }

    pub(crate) fn live_count(&self) -> usize {
        self.live.len()
    }

    pub(crate) fn max_live(&self) -> usize {
        self.max_live
    }

    pub(crate) fn boss_spawned(&self) -> bool {
        self.boss_spawned
    }

    pub(crate) fn boss_defeated(&self) -> bool {
        self.boss_defeated
    }

    pub(crate) fn spawn(
        &mut self,
        position: Vec2,
        speed: f32,
        wobble_offset: f32,
        tuning: &EnemyTuning,
        out: &mut Vec<Event>,
    ) -> Option<EnemyId> {
        if self.live.len() >= self.max_live || !speed.is_finite() || !position.is_finite() {
            return None;
        }

        let id = self.allocate_id();
        self.live
            .push(Enemy::regular(id, position, speed, wobble_offset, tuning));
        debug!(enemy = id.get(), x = position.x, z = position.y, speed, "enemy spawned");
        out.push(Event::EnemySpawned {
            enemy: id,
            rank: EnemyRank::Regular,
            position,
        });
        Some(id)
    }

    /// Places the boss once per session and closes regular spawning.
    pub(crate) fn spawn_boss(
        &mut self,
        anchor: Vec2,
        tuning: &BossTuning,
        out: &mut Vec<Event>,
    ) -> Option<EnemyId> {
        if self.boss_spawned || self.boss_defeated {
            return None;
        }

        let id = self.allocate_id();
        let position = anchor + tuning.offset;
        self.boss = Some(Enemy::boss(id, position, tuning));
        self.boss_spawned = true;
        self.max_live = 0;
        info!(enemy = id.get(), x = position.x, z = position.y, "boss appeared");
        out.push(Event::EnemySpawned {
            enemy: id,
            rank: EnemyRank::Boss,
            position,
        });
        Some(id)
    }

    /// Runs one frame of movement, attacks, scatter and despawn for every enemy.
    ///
    /// Processing stops as soon as the player's health is depleted.
    pub(crate) fn advance(
        &mut self,
        now: Duration,
        player: Vec2,
        player_vitals: &mut Vitals,
        profile: &WorldProfile,
        out: &mut Vec<Event>,
    ) {
        let speed_factor = profile
            .scatter
            .as_ref()
            .map_or(1.0, |scatter| scatter.speed_factor);

        for index in (0..self.live.len()).rev() {
            let enemy = &mut self.live[index];
            let scattering = enemy
                .scatter
                .filter(|scatter| scatter.effect.elapsed(now) < scatter.effect.duration());
            if let Some(scatter) = scattering {
                enemy.drift(scatter.direction, speed_factor, now);
            } else {
                enemy.scatter = None;
                let distance = enemy.pursue(player, now);
                let _ = enemy.attack(distance, now, player_vitals, out);
            }

            if enemy.position.distance(profile.anchor) > profile.despawn_radius {
                let removed = self.live.remove(index);
                debug!(enemy = removed.id.get(), "enemy wandered off and despawned");
                out.push(Event::EnemyRemoved {
                    enemy: removed.id,
                    rank: removed.rank,
                    reason: EnemyRemoval::Despawned,
                });
            }

            if player_vitals.is_depleted() {
                return;
            }
        }

        if let Some(boss) = self.boss.as_mut() {
            let distance = boss.pursue(player, now);
            let _ = boss.attack(distance, now, player_vitals, out);
        }
    }

    /// Pushes every regular enemy within the scatter radius straight away from the player.
    /// An enemy standing on the player has no direction to flee in and holds still instead.
    pub(crate) fn scatter(&mut self, player: Vec2, now: Duration, tuning: &ScatterTuning) -> usize {
        let mut count = 0;
        for enemy in &mut self.live {
            let offset = enemy.position - player;
            if offset.length() >= tuning.radius {
                continue;
            }
            let direction = offset.normalize_or_zero();
            enemy.scatter = Some(Scatter {
                direction,
                effect: TimedEffect::new(now, tuning.duration),
            });
            enemy.phase = EnemyPhase::Scattered;
            count += 1;
        }
        count
    }

    /// Resolves a projectile at `position`: the boss is tested first, then
    /// regular enemies newest first. The first enemy struck absorbs the projectile.
    pub(crate) fn strike(
        &mut self,
        projectile: ProjectileId,
        position: Vec2,
        damage: u32,
        boss_vulnerable: bool,
        now: Duration,
        out: &mut Vec<Event>,
    ) -> Option<Impact> {
        if let Some(boss) = self
            .boss
            .as_mut()
            .filter(|boss| within(position, boss.position, boss.hit_radius))
        {
            let dealt = if boss_vulnerable { damage } else { 0 };
            out.push(Event::ProjectileHit {
                projectile,
                target: boss.id,
                damage: dealt,
            });
            if boss_vulnerable {
                let _ = boss.vitals.damage(dealt);
                boss.flash(HIT_FLASH, now, out);
            } else {
                boss.flash(SHIELD_FLASH, now, out);
            }
            let defeated = boss.vitals.is_depleted();
            if defeated {
                self.defeat_boss(out);
            }
            return Some(Impact {
                rank: EnemyRank::Boss,
                defeated,
            });
        }

        let index = self
            .live
            .iter()
            .rposition(|enemy| within(position, enemy.position, enemy.hit_radius))?;
        let enemy = &mut self.live[index];
        out.push(Event::ProjectileHit {
            projectile,
            target: enemy.id,
            damage,
        });
        let _ = enemy.vitals.damage(damage);
        enemy.flash(HIT_FLASH, now, out);
        let defeated = enemy.vitals.is_depleted();
        if defeated {
            let removed = self.live.remove(index);
            debug!(enemy = removed.id.get(), "enemy defeated");
            out.push(Event::Explosion {
                explosion: removed.explosion(),
            });
            out.push(Event::EnemyRemoved {
                enemy: removed.id,
                rank: removed.rank,
                reason: EnemyRemoval::Defeated,
            });
        }
        Some(Impact {
            rank: EnemyRank::Regular,
            defeated,
        })
    }

    fn defeat_boss(&mut self, out: &mut Vec<Event>) {
        let Some(boss) = self.boss.take() else {
            return;
        };
        self.boss_defeated = true;
        info!(enemy = boss.id.get(), "boss defeated");
        out.push(Event::Explosion {
            explosion: boss.explosion(),
        });
        out.push(Event::EnemyRemoved {
            enemy: boss.id,
            rank: boss.rank,
            reason: EnemyRemoval::Defeated,
        });
    }

    pub(crate) fn freeze(&mut self) {
        for enemy in self.live.iter_mut().chain(self.boss.as_mut()) {
            enemy.scatter = None;
            enemy.phase = EnemyPhase::Frozen;
        }
    }

    pub(crate) fn expire_effects(&mut self, now: Duration, out: &mut Vec<Event>) {
        for enemy in self.live.iter_mut().chain(self.boss.as_mut()) {
            enemy.expire_effects(now, out);
        }
    }

    /// Releases every enemy and the boss, and reopens regular spawning.
    ///
    /// A defeated boss stays defeated until [`EnemyRegistry::forget_boss`].
    pub(crate) fn clear(&mut self, out: &mut Vec<Event>) -> usize {
        let mut released = sweep(&mut self.live, |enemy| {
            out.push(Event::EnemyRemoved {
                enemy: enemy.id,
                rank: enemy.rank,
                reason: EnemyRemoval::Cleared,
            });
        });
        if let Some(boss) = self.boss.take() {
            out.push(Event::EnemyRemoved {
                enemy: boss.id,
                rank: boss.rank,
                reason: EnemyRemoval::Cleared,
            });
            released += 1;
        }
        self.boss_spawned = false;
        self.max_live = self.default_max_live;
        released
    }

    pub(crate) fn forget_boss(&mut self) {
        self.boss_defeated = false;
    }

    pub(crate) fn snapshots(&self) -> Vec<EnemySnapshot> {
        let mut snapshots: Vec<EnemySnapshot> = self
            .live
            .iter()
            .chain(self.boss.as_ref())
            .map(Enemy::snapshot)
            .collect();
        snapshots.sort_by_key(|snapshot| snapshot.id);
        snapshots
    }

    pub(crate) fn boss_snapshot(&self) -> Option<EnemySnapshot> {
        self.boss.as_ref().map(Enemy::snapshot)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use frostbloom_combat::Vitals;
    use frostbloom_core::{
        EnemyPhase, EnemyRank, EnemyRemoval, Event, ProjectileId, Tint, Vec2, WorldProfile,
        SHIELD_FLASH,
    };

    use super::EnemyRegistry;

    fn registry_with_enemy(profile: &WorldProfile, position: Vec2, speed: f32) -> EnemyRegistry {
        let mut registry = EnemyRegistry::new(profile.enemy.max_live);
        let mut events = Vec::new();
        assert!(registry
            .spawn(position, speed, 0.0, &profile.enemy, &mut events)
            .is_some());
        registry
    }

    #[test]
    fn spawn_respects_cap() {
        let mut profile = WorldProfile::spring();
        profile.enemy.max_live = 2;
        let mut registry = EnemyRegistry::new(profile.enemy.max_live);
        let mut events = Vec::new();
        for _ in 0..4 {
            let _ = registry.spawn(Vec2::ZERO, 0.1, 0.0, &profile.enemy, &mut events);
        }
        assert_eq!(registry.live_count(), 2);
        assert_eq!(events.len(), 2);
    }

    #[test]
    fn boss_spawns_once_and_closes_regular_spawning() {
        let profile = WorldProfile::winter();
        let mut registry = EnemyRegistry::new(profile.enemy.max_live);
        let mut events = Vec::new();
        let boss = registry.spawn_boss(profile.anchor, &profile.boss, &mut events);
        assert!(boss.is_some());
        assert!(registry
            .spawn_boss(profile.anchor, &profile.boss, &mut events)
            .is_none());
        assert_eq!(registry.max_live(), 0);
        assert!(registry
            .spawn(Vec2::ZERO, 0.1, 0.0, &profile.enemy, &mut events)
            .is_none());
        let snapshot = registry.boss_snapshot().expect("boss is live");
        assert_eq!(snapshot.position, Vec2::new(0.0, -22.0));
        assert_eq!(snapshot.scale, 2.5);
    }

    #[test]
    fn enemy_attacks_while_still_approaching() {
        let profile = WorldProfile::winter();
        let mut registry = registry_with_enemy(&profile, Vec2::new(0.0, 2.0), 0.1);
        let mut vitals = Vitals::full(100);
        let mut events = Vec::new();
        registry.advance(Duration::from_millis(16), Vec2::ZERO, &mut vitals, &profile, &mut events);
        assert_eq!(vitals.current(), 95);
        assert!(events.contains(&Event::PlayerDamaged {
            amount: 5,
            health: 95
        }));
        let snapshot = registry.snapshots()[0];
        assert_eq!(snapshot.phase, EnemyPhase::Attacking);
        assert!((snapshot.scale - 1.2).abs() < 1e-6);
        assert!(snapshot.position.length() < 2.0);
    }

    #[test]
    fn scattered_enemy_flees_then_resumes_seeking() {
        let profile = WorldProfile::winter();
        let scatter = profile.scatter.clone().expect("winter scatters");
        let mut registry = registry_with_enemy(&profile, Vec2::new(3.0, 0.0), 0.1);
        assert_eq!(registry.scatter(Vec2::ZERO, Duration::ZERO, &scatter), 1);

        let mut vitals = Vitals::full(100);
        let mut events = Vec::new();
        registry.advance(Duration::from_millis(16), Vec2::ZERO, &mut vitals, &profile, &mut events);
        let fled = registry.snapshots()[0];
        assert!((fled.position.x - 3.2).abs() < 1e-5);
        assert_eq!(fled.phase, EnemyPhase::Scattered);

        registry.advance(Duration::from_millis(2000), Vec2::ZERO, &mut vitals, &profile, &mut events);
        let resumed = registry.snapshots()[0];
        assert!(resumed.position.x < fled.position.x);
        assert_eq!(resumed.phase, EnemyPhase::Seeking);
    }

    #[test]
    fn enemy_on_the_player_holds_still_while_scattered() {
        let profile = WorldProfile::winter();
        let scatter = profile.scatter.clone().expect("winter scatters");
        let mut registry = registry_with_enemy(&profile, Vec2::ZERO, 0.1);
        assert_eq!(registry.scatter(Vec2::ZERO, Duration::ZERO, &scatter), 1);

        let mut vitals = Vitals::full(100);
        let mut events = Vec::new();
        registry.advance(Duration::from_millis(1000), Vec2::ZERO, &mut vitals, &profile, &mut events);
        let held = registry.snapshots()[0];
        assert_eq!(held.position, Vec2::ZERO);
        assert_eq!(held.phase, EnemyPhase::Scattered);
        assert_eq!(vitals.current(), 100, "scattered enemies do not attack");

        registry.advance(Duration::from_millis(2000), Vec2::ZERO, &mut vitals, &profile, &mut events);
        assert_eq!(registry.snapshots()[0].phase, EnemyPhase::Attacking);
    }

    #[test]
    fn scatter_ignores_distant_enemies() {
        let profile = WorldProfile::winter();
        let scatter = profile.scatter.clone().expect("winter scatters");
        let mut registry = registry_with_enemy(&profile, Vec2::new(8.0, 0.0), 0.1);
        assert_eq!(registry.scatter(Vec2::ZERO, Duration::ZERO, &scatter), 0);
    }

    #[test]
    fn distant_enemy_despawns() {
        let profile = WorldProfile::winter();
        let mut registry = registry_with_enemy(&profile, Vec2::new(0.0, 30.0), 0.1);
        let mut vitals = Vitals::full(100);
        let mut events = Vec::new();
        registry.advance(Duration::from_millis(16), Vec2::new(0.0, 40.0), &mut vitals, &profile, &mut events);
        assert_eq!(registry.live_count(), 0);
        assert!(matches!(
            events.last(),
            Some(Event::EnemyRemoved {
                reason: EnemyRemoval::Despawned,
                ..
            })
        ));
    }

    #[test]
    fn shielded_boss_flashes_yellow_without_damage() {
        let profile = WorldProfile::winter();
        let mut registry = EnemyRegistry::new(profile.enemy.max_live);
        let mut events = Vec::new();
        let boss = registry
            .spawn_boss(profile.anchor, &profile.boss, &mut events)
            .expect("boss spawns");
        events.clear();

        let impact = registry.strike(
            ProjectileId::new(0),
            Vec2::new(0.5, -22.0),
            1,
            false,
            Duration::ZERO,
            &mut events,
        );
        assert_eq!(impact.map(|impact| impact.rank), Some(EnemyRank::Boss));
        assert_eq!(
            events,
            vec![
                Event::ProjectileHit {
                    projectile: ProjectileId::new(0),
                    target: boss,
                    damage: 0,
                },
                Event::EnemyTinted {
                    enemy: boss,
                    tint: Tint::Flash(SHIELD_FLASH),
                },
            ]
        );
        assert_eq!(registry.boss_snapshot().map(|boss| boss.health), Some(30));
    }

    #[test]
    fn newest_enemy_absorbs_overlapping_projectile() {
        let profile = WorldProfile::spring();
        let mut registry = EnemyRegistry::new(profile.enemy.max_live);
        let mut events = Vec::new();
        let older = registry
            .spawn(Vec2::ZERO, 0.1, 0.0, &profile.enemy, &mut events)
            .expect("first spawn");
        let newer = registry
            .spawn(Vec2::new(0.1, 0.0), 0.1, 0.0, &profile.enemy, &mut events)
            .expect("second spawn");
        events.clear();

        let _ = registry.strike(ProjectileId::new(7), Vec2::ZERO, 1, false, Duration::ZERO, &mut events);
        let snapshots = registry.snapshots();
        let health = |id| snapshots.iter().find(|enemy| enemy.id == id).map(|enemy| enemy.health);
        assert_eq!(health(older), Some(3));
        assert_eq!(health(newer), Some(2));
    }

    #[test]
    fn clearing_twice_releases_nothing_the_second_time() {
        let profile = WorldProfile::winter();
        let mut registry = registry_with_enemy(&profile, Vec2::ZERO, 0.1);
        let mut events = Vec::new();
        let _ = registry.spawn_boss(profile.anchor, &profile.boss, &mut events);
        events.clear();

        assert_eq!(registry.clear(&mut events), 2);
        assert_eq!(events.len(), 2);
        assert_eq!(registry.clear(&mut events), 0);
        assert_eq!(events.len(), 2);
        assert!(!registry.boss_spawned());
        assert_eq!(registry.max_live(), profile.enemy.max_live);
    }
}
