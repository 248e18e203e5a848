//! Scene-side bookkeeping of presentation handles, tints and particle bursts.

use std::collections::BTreeMap;

use frostbloom_combat::{burst, Particle};
use frostbloom_core::{EffectColor, EnemyId, EntityRef, Explosion, PresentationSink, Tint, Vec2};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::warn;

/// Height above ground at which defeated enemies burst.
const BURST_HEIGHT: f32 = 1.0;

/// Presentation handle owned by the scene.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SceneEntity {
    /// Entity the handle belongs to.
    pub entity: EntityRef,
    /// Ground-plane position at spawn.
    pub spawned_at: Vec2,
    /// Current tint of the entity's material.
    pub tint: Tint,
    /// Number of lunges the entity performed.
    pub lunges: u32,
}

/// Explosion particle with its display attributes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ParticleSprite {
    /// Simulated particle.
    pub particle: Particle,
    /// Particle colour.
    pub color: EffectColor,
    /// Sphere radius.
    pub size: f32,
}

/// Mirrors the world's entity lifecycle for a rendering backend.
#[derive(Debug)]
pub struct SceneRegistry {
    entities: BTreeMap<EntityRef, SceneEntity>,
    particles: Vec<ParticleSprite>,
    player_hits: u32,
    orphan_releases: u32,
    rng: ChaCha8Rng,
}

impl SceneRegistry {
    /// Creates an empty scene whose particle jitter is seeded with `seed`.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            entities: BTreeMap::new(),
            particles: Vec::new(),
            player_hits: 0,
            orphan_releases: 0,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Live handles ordered by entity.
    #[must_use]
    pub fn entities(&self) -> Vec<SceneEntity> {
        self.entities.values().copied().collect()
    }

    /// Looks up a live handle.
    #[must_use]
    pub fn entity(&self, entity: EntityRef) -> Option<&SceneEntity> {
        self.entities.get(&entity)
    }

    /// Airborne explosion particles.
    #[must_use]
    pub fn particles(&self) -> &[ParticleSprite] {
        &self.particles
    }

    /// Times the player was hit.
    #[must_use]
    pub const fn player_hits(&self) -> u32 {
        self.player_hits
    }

    /// Releases for handles the scene did not know about.
    #[must_use]
    pub const fn orphan_releases(&self) -> u32 {
        self.orphan_releases
    }

    /// Advances every particle one frame and drops those that landed.
    pub fn step_particles(&mut self) {
        self.particles.retain_mut(|sprite| sprite.particle.step());
    }
}

impl PresentationSink for SceneRegistry {
    fn entity_spawned(&mut self, entity: EntityRef, position: Vec2) {
        let _ = self.entities.insert(
            entity,
            SceneEntity {
                entity,
                spawned_at: position,
                tint: Tint::Original,
                lunges: 0,
            },
        );
    }

    fn entity_released(&mut self, entity: EntityRef) {
        if self.entities.remove(&entity).is_none() {
            self.orphan_releases += 1;
            warn!(?entity, "released a handle the scene never saw");
        }
    }

    fn entity_tinted(&mut self, enemy: EnemyId, tint: Tint) {
        if let Some(entity) = self.entities.get_mut(&EntityRef::Enemy(enemy)) {
            entity.tint = tint;
        }
    }

    fn enemy_lunged(&mut self, enemy: EnemyId) {
        if let Some(entity) = self.entities.get_mut(&EntityRef::Enemy(enemy)) {
            entity.lunges += 1;
        }
    }

    fn explosion(&mut self, explosion: &Explosion) {
        let rng = &mut self.rng;
        let sprites = burst(explosion, BURST_HEIGHT, || rng.gen::<f32>())
            .into_iter()
            .map(|particle| ParticleSprite {
                particle,
                color: explosion.color,
                size: explosion.particle_size,
            });
        self.particles.extend(sprites);
    }

    fn player_hit(&mut self, _amount: u32, _health: u32) {
        self.player_hits += 1;
    }
}

#[cfg(test)]
mod tests {
    use frostbloom_core::{EffectColor, EnemyId, EntityRef, Explosion, PresentationSink, Tint, Vec2};

    use super::SceneRegistry;

    #[test]
    fn tint_applies_only_to_live_enemies() {
        let mut scene = SceneRegistry::new(1);
        let enemy = EnemyId::new(4);
        scene.entity_spawned(EntityRef::Enemy(enemy), Vec2::ZERO);
        scene.entity_tinted(enemy, Tint::Flash(EffectColor::from_hex(0xff_ff_ff)));
        scene.entity_tinted(EnemyId::new(9), Tint::Original);

        let live = scene.entity(EntityRef::Enemy(enemy)).expect("enemy is live");
        assert_eq!(live.tint, Tint::Flash(EffectColor::from_hex(0xff_ff_ff)));
        assert_eq!(scene.entities().len(), 1);
    }

    #[test]
    fn double_release_is_counted() {
        let mut scene = SceneRegistry::new(1);
        let entity = EntityRef::Enemy(EnemyId::new(0));
        scene.entity_spawned(entity, Vec2::ZERO);
        scene.entity_released(entity);
        scene.entity_released(entity);
        assert_eq!(scene.orphan_releases(), 1);
        assert!(scene.entities().is_empty());
    }

    #[test]
    fn explosion_particles_eventually_land() {
        let mut scene = SceneRegistry::new(7);
        scene.explosion(&Explosion {
            position: Vec2::new(2.0, 3.0),
            particle_count: 6,
            color: EffectColor::from_hex(0xff_69_b4),
            particle_size: 0.1,
        });
        assert_eq!(scene.particles().len(), 6);

        for _ in 0..100 {
            scene.step_particles();
        }
        assert!(scene.particles().is_empty());
    }
}
