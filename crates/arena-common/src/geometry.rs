//! Arena geometry: dimensions, bounds, and small vector helpers.
//!
//! Positions are continuous arena units stored as [`Vec2`]. The arena is a
//! bounded rectangle with its origin at the top-left corner.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};

pub use glam::Vec2;

/// Size of the arena and of the participants fighting in it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArenaDimensions {
    /// Arena width in units
    pub width: f32,
    /// Arena height in units
    pub height: f32,
    /// Diameter of a participant's body in units
    pub participant_size: f32,
}

impl ArenaDimensions {
    /// Creates new arena dimensions.
    #[must_use]
    pub const fn new(width: f32, height: f32, participant_size: f32) -> Self {
        Self {
            width,
            height,
            participant_size,
        }
    }

    /// Lowest legal coordinate on either axis.
    #[must_use]
    pub fn min_bound(&self) -> f32 {
        self.participant_size / 2.0
    }

    /// Highest legal position, per axis.
    #[must_use]
    pub fn max_bound(&self) -> Vec2 {
        Vec2::new(
            self.width - 1.5 * self.participant_size,
            self.height - 1.5 * self.participant_size,
        )
    }

    /// Clamps a position into `[size/2, dimension - 1.5 * size]` on both axes.
    ///
    /// Never panics, even for degenerate arenas where the upper bound falls
    /// below the lower one (the upper bound wins).
    #[must_use]
    pub fn clamp_position(&self, position: Vec2) -> Vec2 {
        let min = self.min_bound();
        let max = self.max_bound();
        Vec2::new(
            position.x.max(min).min(max.x),
            position.y.max(min).min(max.y),
        )
    }

    /// Whether a point lies inside the raw arena rectangle.
    #[must_use]
    pub fn contains(&self, position: Vec2) -> bool {
        position.x >= 0.0
            && position.y >= 0.0
            && position.x <= self.width
            && position.y <= self.height
    }

    /// Checks that the arena can hold at least one participant.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.participant_size <= 0.0 || self.participant_size.is_nan() {
            return Err(ConfigError::NotPositive {
                name: "participant_size",
                value: self.participant_size,
            });
        }
        let min_extent = 2.0 * self.participant_size;
        if self.width < min_extent || self.height < min_extent {
            return Err(ConfigError::ArenaTooSmall {
                width: self.width,
                height: self.height,
                size: self.participant_size,
            });
        }
        Ok(())
    }
}

impl Default for ArenaDimensions {
    fn default() -> Self {
        Self::new(800.0, 600.0, 40.0)
    }
}

/// Squared Euclidean distance between two points.
#[must_use]
pub fn distance_squared(a: Vec2, b: Vec2) -> f32 {
    a.distance_squared(b)
}

/// Rotates a vector counter-clockwise by `radians`.
#[must_use]
pub fn rotate(v: Vec2, radians: f32) -> Vec2 {
    Vec2::from_angle(radians).rotate(v)
}
