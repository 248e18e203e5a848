use std::time::Duration;

use frostbloom_combat::{bob_height, sweep, within};
use frostbloom_core::{
    CollectibleId, CollectibleKind, CollectibleRemoval, CollectibleSnapshot, Event, PickupStream,
    Vec2, WorldProfile,
};
use tracing::debug;

#[derive(Clone, Copy, Debug)]
struct Collectible {
    id: CollectibleId,
    kind: CollectibleKind,
    stream: PickupStream,
    position: Vec2,
    spawned_at: Duration,
    spin: f32,
}

/// Pickups waiting near the player.
#[derive(Clone, Debug, Default)]
pub(crate) struct CollectibleRegistry {
    live: Vec<Collectible>,
    next_id: u32,
}

impl CollectibleRegistry {
    pub(crate) fn spawn(
        &mut self,
        position: Vec2,
        kind: CollectibleKind,
        stream: PickupStream,
        now: Duration,
        out: &mut Vec<Event>,
    ) -> Option<CollectibleId> {
        if !position.is_finite() {
            return None;
        }

        let id = CollectibleId::new(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        self.live.push(Collectible {
            id,
            kind,
            stream,
            position,
            spawned_at: now,
            spin: 0.0,
        });
        debug!(collectible = id.get(), ?kind, ?stream, "collectible spawned");
        out.push(Event::CollectibleSpawned {
            collectible: id,
            kind,
            position,
        });
        Some(id)
    }

    /// Spins every collectible, hands back those the player touched and drops
    /// those that outlived their time-to-live. A pickup wins over expiry.
    /// Radius and lifetime come from the stream each collectible belongs to.
    pub(crate) fn resolve(
        &mut self,
        player: Vec2,
        now: Duration,
        profile: &WorldProfile,
        out: &mut Vec<Event>,
    ) -> Vec<(PickupStream, CollectibleKind)> {
        let mut picked = Vec::new();
        for index in (0..self.live.len()).rev() {
            let collectible = &mut self.live[index];
            collectible.spin += collectible.kind.spin_per_frame();
            let tuning = profile
                .pickups(collectible.stream)
                .unwrap_or(&profile.collectibles);

            let reason = if within(collectible.position, player, tuning.pickup_radius) {
                picked.push((collectible.stream, collectible.kind));
                CollectibleRemoval::Collected
            } else if now.saturating_sub(collectible.spawned_at) > tuning.time_to_live {
                CollectibleRemoval::Expired
            } else {
                continue;
            };

            let removed = self.live.remove(index);
            debug!(collectible = removed.id.get(), ?reason, "collectible removed");
            out.push(Event::CollectibleRemoved {
                collectible: removed.id,
                kind: removed.kind,
                reason,
            });
        }
        picked
    }

    pub(crate) fn clear(&mut self, out: &mut Vec<Event>) -> usize {
        sweep(&mut self.live, |collectible| {
            out.push(Event::CollectibleRemoved {
                collectible: collectible.id,
                kind: collectible.kind,
                reason: CollectibleRemoval::Cleared,
            });
        })
    }

    pub(crate) fn snapshots(&self, now: Duration) -> Vec<CollectibleSnapshot> {
        let mut snapshots: Vec<CollectibleSnapshot> = self
            .live
            .iter()
            .map(|collectible| CollectibleSnapshot {
                id: collectible.id,
                kind: collectible.kind,
                position: collectible.position,
                height: bob_height(now, collectible.id.get() as f32),
                spin: collectible.spin,
                age: now.saturating_sub(collectible.spawned_at),
            })
            .collect();
        snapshots.sort_by_key(|snapshot| snapshot.id);
        snapshots
    }
}
