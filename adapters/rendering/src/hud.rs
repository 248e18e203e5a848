//! Heads-up display model driven by the world's scoreboard notifications.

use frostbloom_combat::{DistanceBand, HealthBand};
use frostbloom_core::{Announcement, Outcome, ScoreBoard, ScoreSink, SessionSummary, WorldKind};

use crate::Color;

/// Colour of the health bar fill for a band.
#[must_use]
pub const fn health_color(band: HealthBand) -> Color {
    match band {
        HealthBand::Healthy => Color::from_rgb_u8(0x4c, 0xaf, 0x50),
        HealthBand::Wounded => Color::from_rgb_u8(0xff, 0xc1, 0x07),
        HealthBand::Critical => Color::from_rgb_u8(0xf4, 0x43, 0x36),
    }
}

/// Colour of the distance readout for a band.
#[must_use]
pub const fn distance_color(band: DistanceBand) -> Color {
    match band {
        DistanceBand::Near => Color::from_rgb_u8(0x90, 0xee, 0x90),
        DistanceBand::Mid => Color::from_rgb_u8(0xff, 0xd7, 0x00),
        DistanceBand::Far => Color::from_rgb_u8(0xff, 0x6b, 0x6b),
    }
}

/// Health bar state.
#[derive(Clone, Debug, PartialEq)]
pub struct HealthBar {
    /// Fill fraction in percent.
    pub percent: f32,
    /// Severity band of the fill.
    pub band: HealthBand,
    /// Fill colour.
    pub color: Color,
    /// Caption, `Health: H/M`.
    pub text: String,
}

impl HealthBar {
    fn new(health: u32, max_health: u32) -> Self {
        let percent = if max_health == 0 {
            0.0
        } else {
            health as f32 / max_health as f32 * 100.0
        };
        let band = HealthBand::from_percent(percent);
        Self {
            percent,
            band,
            color: health_color(band),
            text: format!("Health: {health}/{max_health}"),
        }
    }
}

/// Distance-to-objective readout.
#[derive(Clone, Debug, PartialEq)]
pub struct DistanceReadout {
    /// Severity band of the distance.
    pub band: DistanceBand,
    /// Text colour.
    pub color: Color,
    /// Caption, `Distance to Castle: N units`.
    pub text: String,
}

impl DistanceReadout {
    fn new(world: WorldKind, distance: f32) -> Self {
        let band = DistanceBand::from_distance(distance);
        Self {
            band,
            color: distance_color(band),
            text: format!(
                "Distance to {}: {} units",
                world.anchor_name(),
                distance.max(0.0).floor()
            ),
        }
    }
}

/// Summary screen shown when a session ends.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EndScreen {
    /// Whether the player won or lost.
    pub outcome: Outcome,
    /// Headline.
    pub title: String,
    /// Summary lines in display order.
    pub lines: Vec<String>,
}

impl EndScreen {
    fn new(world: WorldKind, outcome: Outcome, summary: &SessionSummary) -> Self {
        let title = match (outcome, world) {
            (Outcome::Won, WorldKind::Winter) => "WINTER COMPLETE",
            (Outcome::Won, WorldKind::Spring) => "SPRING COMPLETE",
            (Outcome::Lost, WorldKind::Winter) => "FROZEN",
            (Outcome::Lost, WorldKind::Spring) => "WILTED",
        };
        let mut lines = vec![
            format!("Score: {}", summary.score),
            format!("Monsters Defeated: {}", summary.monsters_killed),
            format!("Time: {}s", summary.survival_seconds),
        ];
        if let Some(bonus) = summary.bonus {
            lines.push(format!("Bonus: +{bonus}"));
        }
        Self {
            outcome,
            title: title.to_owned(),
            lines,
        }
    }
}

/// Formats the score line, including power-up time and gift progress.
#[must_use]
pub fn score_line(board: &ScoreBoard) -> String {
    let mut line = format!(
        "Score: {} | Monsters Defeated: {}",
        board.score, board.monsters_killed
    );
    if let Some(remaining) = board.power_up_remaining.filter(|left| !left.is_zero()) {
        let seconds = remaining.as_millis().div_ceil(1000);
        line.push_str(&format!(" | POWER-UP: {seconds}s"));
    }
    if board.special_ability_active {
        line.push_str(" | SPECIAL ABILITY UNLOCKED!");
    } else if board.gifts_collected > 0 {
        line.push_str(&format!(
            " | Gifts: {}/{}",
            board.gifts_collected, board.gifts_needed
        ));
    }
    line
}

/// Banner text for an announcement in the provided world.
#[must_use]
pub const fn announcement_text(world: WorldKind, announcement: Announcement) -> &'static str {
    match (announcement, world) {
        (Announcement::BossAppeared, WorldKind::Winter) => "BOSS MONSTER APPEARS!",
        (Announcement::BossAppeared, WorldKind::Spring) => "GIANT BEETLE BOSS APPEARS!",
        (Announcement::SpecialAbilityUnlocked, WorldKind::Winter) => {
            "SPECIAL ABILITY UNLOCKED! Ice Blast can damage the boss!"
        }
        (Announcement::SpecialAbilityUnlocked, WorldKind::Spring) => {
            "SPECIAL ABILITY UNLOCKED! Flower Blast can damage the boss!"
        }
    }
}

/// Everything the HUD shows for one world.
#[derive(Clone, Debug, PartialEq)]
pub struct Hud {
    world: WorldKind,
    /// Health bar.
    pub health: HealthBar,
    /// Distance readout, available after the first frame.
    pub distance: Option<DistanceReadout>,
    /// Score line.
    pub score_line: String,
    /// Latest announcement not yet acknowledged.
    pub banner: Option<&'static str>,
    /// Summary screen, once the session has ended.
    pub end_screen: Option<EndScreen>,
}

impl Hud {
    /// Creates the HUD for a freshly loaded world.
    #[must_use]
    pub fn new(world: WorldKind, max_health: u32) -> Self {
        Self {
            world,
            health: HealthBar::new(max_health, max_health),
            distance: None,
            score_line: score_line(&ScoreBoard::default()),
            banner: None,
            end_screen: None,
        }
    }

    /// World the HUD describes.
    #[must_use]
    pub const fn world(&self) -> WorldKind {
        self.world
    }

    /// Hands over the pending announcement, leaving none.
    pub fn take_banner(&mut self) -> Option<&'static str> {
        self.banner.take()
    }
}

impl ScoreSink for Hud {
    fn health_changed(&mut self, health: u32, max_health: u32) {
        self.health = HealthBar::new(health, max_health);
        if health == max_health {
            self.end_screen = None;
        }
    }

    fn score_changed(&mut self, board: &ScoreBoard) {
        self.score_line = score_line(board);
    }

    fn distance_changed(&mut self, world: WorldKind, distance: f32) {
        self.distance = Some(DistanceReadout::new(world, distance));
    }

    fn announcement(&mut self, announcement: Announcement) {
        self.banner = Some(announcement_text(self.world, announcement));
    }

    fn session_ended(&mut self, outcome: Outcome, summary: &SessionSummary) {
        self.end_screen = Some(EndScreen::new(self.world, outcome, summary));
    }
}
