//! Thresholds that classify health and objective distance for display.

/// Severity band of the player's remaining health.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HealthBand {
    /// More than 60 % health remains.
    Healthy,
    /// More than 30 % health remains.
    Wounded,
    /// 30 % health or less remains.
    Critical,
}

impl HealthBand {
    /// Classifies a health percentage.
    #[must_use]
    pub fn from_percent(percent: f32) -> Self {
        if percent > 60.0 {
            Self::Healthy
        } else if percent > 30.0 {
            Self::Wounded
        } else {
            Self::Critical
        }
    }
}

/// How close the player is to the world's anchor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DistanceBand {
    /// Closer than 20 units.
    Near,
    /// Closer than 35 units.
    Mid,
    /// 35 units or farther.
    Far,
}

impl DistanceBand {
    /// Classifies a distance to the anchor.
    #[must_use]
    pub fn from_distance(distance: f32) -> Self {
        if distance < 20.0 {
            Self::Near
        } else if distance < 35.0 {
            Self::Mid
        } else {
            Self::Far
        }
    }
}
