//! Error types for the arena combat AI.
//!
//! The per-tick AI itself never fails; every degenerate case has a defined
//! fallback. Errors only surface at the construction and configuration
//! boundary.

use crate::ids::ParticipantId;
use thiserror::Error;

/// Top-level error type for arena operations.
#[derive(Debug, Error)]
pub enum ArenaError {
    /// Configuration errors
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Scenario/battle setup errors
    #[error("Scenario error: {0}")]
    Scenario(#[from] ScenarioError),

    /// Deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Invalid tuning or arena configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// A value that must be strictly positive was not
    #[error("{name} must be positive, got {value}")]
    NotPositive {
        /// Name of the offending setting
        name: &'static str,
        /// The rejected value
        value: f32,
    },

    /// A value that must not be negative was
    #[error("{name} must not be negative, got {value}")]
    Negative {
        /// Name of the offending setting
        name: &'static str,
        /// The rejected value
        value: f32,
    },

    /// The A* iteration cap was zero
    #[error("A* iteration cap must be at least 1")]
    ZeroIterationCap,

    /// Arena too small to hold a participant inside its bounds
    #[error("arena {width}x{height} too small for participant size {size}")]
    ArenaTooSmall {
        /// Arena width
        width: f32,
        /// Arena height
        height: f32,
        /// Participant size
        size: f32,
    },
}

/// Invalid battle setup.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScenarioError {
    /// Two participants share an id
    #[error("duplicate participant id {0}")]
    DuplicateId(ParticipantId),

    /// Participant placed on the wrong side list
    #[error("participant {0} is on the wrong team list")]
    WrongTeam(ParticipantId),

    /// Participant stat block is unusable
    #[error("participant {id}: {reason}")]
    InvalidStats {
        /// Offending participant
        id: ParticipantId,
        /// What is wrong with it
        reason: String,
    },
}

/// Result type alias for arena operations.
pub type ArenaResult<T> = Result<T, ArenaError>;
