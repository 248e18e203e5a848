#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for Frostbloom adapters.
//!
//! The world reports to its collaborators through boxed sinks. [`Presenter`]
//! hands out sinks that write into state it keeps a view of, so a backend can
//! draw a [`Frame`] after every command batch.

use std::{cell::RefCell, rc::Rc};

use anyhow::Result as AnyResult;
use frostbloom_core::{
    Announcement, EffectColor, EnemyId, EntityRef, Explosion, NarrativeSink, NarrativeSnapshot,
    Outcome, PresentationSink, ScoreBoard, ScoreSink, SessionSummary, Tint, Vec2, WorldKind,
};

mod hud;
mod scene;

pub use hud::{
    announcement_text, distance_color, health_color, score_line, DistanceReadout, EndScreen,
    HealthBar, Hud,
};
pub use scene::{ParticleSprite, SceneEntity, SceneRegistry};

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: 1.0,
        }
    }
}

impl From<EffectColor> for Color {
    fn from(color: EffectColor) -> Self {
        Self::from_rgb_u8(color.red(), color.green(), color.blue())
    }
}

/// Sink whose state is shared with the caller that created it.
///
/// Clones observe and mutate the same value.
#[derive(Debug, Default)]
pub struct Shared<T>(Rc<RefCell<T>>);

impl<T> Clone for Shared<T> {
    fn clone(&self) -> Self {
        Self(Rc::clone(&self.0))
    }
}

impl<T> Shared<T> {
    /// Wraps `value` for sharing.
    #[must_use]
    pub fn new(value: T) -> Self {
        Self(Rc::new(RefCell::new(value)))
    }

    /// Runs `read` against the shared value.
    pub fn with<R>(&self, read: impl FnOnce(&T) -> R) -> R {
        read(&*self.0.borrow())
    }

    /// Runs `update` against the shared value.
    pub fn with_mut<R>(&self, update: impl FnOnce(&mut T) -> R) -> R {
        update(&mut *self.0.borrow_mut())
    }

    /// Replaces the shared value.
    pub fn replace(&self, value: T) {
        let _ = self.0.replace(value);
    }
}

impl<T: PresentationSink> PresentationSink for Shared<T> {
    fn entity_spawned(&mut self, entity: EntityRef, position: Vec2) {
        self.0.borrow_mut().entity_spawned(entity, position);
    }

    fn entity_released(&mut self, entity: EntityRef) {
        self.0.borrow_mut().entity_released(entity);
    }

    fn entity_tinted(&mut self, enemy: EnemyId, tint: Tint) {
        self.0.borrow_mut().entity_tinted(enemy, tint);
    }

    fn enemy_lunged(&mut self, enemy: EnemyId) {
        self.0.borrow_mut().enemy_lunged(enemy);
    }

    fn explosion(&mut self, explosion: &Explosion) {
        self.0.borrow_mut().explosion(explosion);
    }

    fn player_hit(&mut self, amount: u32, health: u32) {
        self.0.borrow_mut().player_hit(amount, health);
    }
}

impl<T: ScoreSink> ScoreSink for Shared<T> {
    fn health_changed(&mut self, health: u32, max_health: u32) {
        self.0.borrow_mut().health_changed(health, max_health);
    }

    fn score_changed(&mut self, board: &ScoreBoard) {
        self.0.borrow_mut().score_changed(board);
    }

    fn distance_changed(&mut self, world: WorldKind, distance: f32) {
        self.0.borrow_mut().distance_changed(world, distance);
    }

    fn announcement(&mut self, announcement: Announcement) {
        self.0.borrow_mut().announcement(announcement);
    }

    fn session_ended(&mut self, outcome: Outcome, summary: &SessionSummary) {
        self.0.borrow_mut().session_ended(outcome, summary);
    }
}

impl<T: NarrativeSink> NarrativeSink for Shared<T> {
    fn report(&mut self, snapshot: &NarrativeSnapshot) {
        self.0.borrow_mut().report(snapshot);
    }
}

/// Everything a backend needs to draw one frame.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    /// HUD state.
    pub hud: Hud,
    /// Live presentation handles.
    pub entities: Vec<SceneEntity>,
    /// Airborne explosion particles.
    pub particles: Vec<ParticleSprite>,
}

/// Owns the HUD and scene state fed by the world's collaborator sinks.
#[derive(Debug, Clone)]
pub struct Presenter {
    hud: Shared<Hud>,
    scene: Shared<SceneRegistry>,
}

impl Presenter {
    /// Creates a presenter for the provided world.
    #[must_use]
    pub fn new(world: WorldKind, max_health: u32, seed: u64) -> Self {
        Self {
            hud: Shared::new(Hud::new(world, max_health)),
            scene: Shared::new(SceneRegistry::new(seed)),
        }
    }

    /// Sink to install as the world's presentation collaborator.
    #[must_use]
    pub fn presentation_sink(&self) -> Box<dyn PresentationSink> {
        Box::new(self.scene.clone())
    }

    /// Sink to install as the world's scoreboard collaborator.
    #[must_use]
    pub fn score_sink(&self) -> Box<dyn ScoreSink> {
        Box::new(self.hud.clone())
    }

    /// Resets the HUD for a newly loaded world; scene handles carry over.
    pub fn load_world(&self, world: WorldKind, max_health: u32) {
        self.hud.replace(Hud::new(world, max_health));
    }

    /// Hands over the pending announcement, if any.
    pub fn take_banner(&self) -> Option<&'static str> {
        self.hud.with_mut(Hud::take_banner)
    }

    /// Steps particles and captures the frame to draw.
    pub fn frame(&self) -> Frame {
        self.scene.with_mut(SceneRegistry::step_particles);
        let hud = self.hud.with(Clone::clone);
        self.scene.with(|scene| Frame {
            hud,
            entities: scene.entities(),
            particles: scene.particles().to_vec(),
        })
    }
}

/// Rendering backend capable of presenting Frostbloom frames.
pub trait RenderingBackend {
    /// Presents a single frame.
    fn present(&mut self, frame: &Frame) -> AnyResult<()>;

    /// Shows a transient banner such as a boss announcement.
    fn announce(&mut self, text: &str) -> AnyResult<()>;
}
