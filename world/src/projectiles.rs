use std::time::Duration;

use frostbloom_combat::sweep;
use frostbloom_core::{
    Event, ProjectileId, ProjectileRemoval, ProjectileSnapshot, ProjectileTuning, Vec2,
};
use tracing::trace;

use crate::enemies::{EnemyRegistry, Impact};

#[derive(Clone, Copy, Debug)]
struct Projectile {
    id: ProjectileId,
    position: Vec2,
    direction: Vec2,
    fired_at: Duration,
}

/// Player projectiles in flight.
#[derive(Clone, Debug, Default)]
pub(crate) struct ProjectileRegistry {
    live: Vec<Projectile>,
    next_id: u32,
}

impl ProjectileRegistry {
    /// Launches a projectile; a zero or non-finite direction is rejected.
    pub(crate) fn fire(
        &mut self,
        origin: Vec2,
        direction: Vec2,
        now: Duration,
        out: &mut Vec<Event>,
    ) -> Option<ProjectileId> {
        let direction = direction.try_normalize()?;
        if !origin.is_finite() {
            return None;
        }

        let id = ProjectileId::new(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        self.live.push(Projectile {
            id,
            position: origin,
            direction,
            fired_at: now,
        });
        out.push(Event::ProjectileFired {
            projectile: id,
            origin,
            direction,
        });
        Some(id)
    }

    /// Moves every projectile, resolves hits against `enemies` and removes
    /// spent projectiles. Returns the impacts in resolution order.
    pub(crate) fn advance(
        &mut self,
        now: Duration,
        tuning: &ProjectileTuning,
        enemies: &mut EnemyRegistry,
        damage: u32,
        boss_vulnerable: bool,
        out: &mut Vec<Event>,
    ) -> Vec<Impact> {
        let mut impacts = Vec::new();
        for index in (0..self.live.len()).rev() {
            let projectile = &mut self.live[index];
            projectile.position += projectile.direction * tuning.speed;

            let impact = enemies.strike(
                projectile.id,
                projectile.position,
                damage,
                boss_vulnerable,
                now,
                out,
            );
            let expired = now.saturating_sub(projectile.fired_at) > tuning.lifetime;
            let reason = match impact {
                Some(impact) => {
                    impacts.push(impact);
                    ProjectileRemoval::Hit
                }
                None if expired => ProjectileRemoval::Expired,
                None => continue,
            };

            let removed = self.live.remove(index);
            trace!(projectile = removed.id.get(), ?reason, "projectile removed");
            out.push(Event::ProjectileRemoved {
                projectile: removed.id,
                reason,
            });
        }
        impacts
    }

    pub(crate) fn clear(&mut self, out: &mut Vec<Event>) -> usize {
        sweep(&mut self.live, |projectile| {
            out.push(Event::ProjectileRemoved {
                projectile: projectile.id,
                reason: ProjectileRemoval::Cleared,
            });
        })
    }

    pub(crate) fn snapshots(&self, now: Duration) -> Vec<ProjectileSnapshot> {
        let mut snapshots: Vec<ProjectileSnapshot> = self
            .live
            .iter()
            .map(|projectile| ProjectileSnapshot {
                id: projectile.id,
                position: projectile.position,
                direction: projectile.direction,
                age: now.saturating_sub(projectile.fired_at),
            })
            .collect();
        snapshots.sort_by_key(|snapshot| snapshot.id);
        snapshots
    }
}
