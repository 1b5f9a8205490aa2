//! # Arena AI
//!
//! Tick-driven combat AI and motion planning for arena battles.
//!
//! This crate provides everything a participant needs to decide where to move
//! and whom to hit each tick:
//! - Participants, teams, and the per-tick battle snapshot
//! - Target search, line-of-sight, and collision queries
//! - Congestion-aware A* over continuous space
//! - Attack slot generation around melee targets
//! - Arrival and separation steering
//! - Melee and ranged behaviour state machines
//! - A battle driver that runs decide/apply ticks to completion
//!
//! Behaviour functions are pure: they read an immutable [`BattleView`] and
//! return a [`Decision`]. Only [`Battle`] mutates participants.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod battle;
pub mod config;
pub mod decision;
pub mod melee;
pub mod participant;
pub mod pathfinding;
pub mod ranged;
pub mod slots;
pub mod steering;
pub mod targeting;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::battle::*;
    pub use crate::config::*;
    pub use crate::decision::*;
    pub use crate::melee::*;
    pub use crate::participant::*;
    pub use crate::pathfinding::*;
    pub use crate::ranged::*;
    pub use crate::slots::*;
    pub use crate::steering::*;
    pub use crate::targeting::*;
}

pub use prelude::*;
