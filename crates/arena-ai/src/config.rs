//! AI tuning constants.
//!
//! Every number the behaviours depend on lives here, both as a `pub const`
//! default and as a field of [`AiTuning`] so scenarios can override it.
//! Distances given as factors are multiplied by the participant size unless
//! noted otherwise.

use arena_common::ConfigError;
use serde::{Deserialize, Serialize};

// ============================================================================
// Pathfinding
// ============================================================================

/// Hard cap on A* node expansions per search.
pub const ASTAR_MAX_ITERATIONS: u32 = 100;

/// Flat path cost added per nearby ally.
pub const CONGESTION_PENALTY_BASE: f32 = 50.0;

/// Allies within this many sizes of a node add congestion.
pub const CONGESTION_RADIUS_FACTOR: f32 = 1.5;

/// Opposing units block path nodes within this many sizes.
pub const PATH_OBSTACLE_FACTOR: f32 = 0.7;

// ============================================================================
// Geometry
// ============================================================================

/// Movement collides with bodies within this many sizes.
pub const COLLISION_FACTOR: f32 = 0.8;

/// LOS is blocked when the squared miss distance is below this share of the
/// obstacle radius squared.
pub const LOS_GRAZE_FACTOR: f32 = 0.7;

/// Length of the death animation in ticks.
pub const DEATH_ANIMATION_TICKS: u32 = 30;

// ============================================================================
// Melee
// ============================================================================

/// Attack slots sit this many target sizes from the target centre.
pub const SLOT_RADIUS_FACTOR: f32 = 0.85;

/// Other attackers committed within this many sizes of a slot crowd it.
pub const SLOT_CROWDING_RADIUS_FACTOR: f32 = 1.75;

/// Crowded slot penalty, proportional part (times path cost).
pub const SLOT_CROWDING_COST_FACTOR: f32 = 0.8;

/// Crowded slot penalty, flat part.
pub const SLOT_CROWDING_FLAT_PENALTY: f32 = 500.0;

/// Fallback stand-point must be within this share of the attack range.
pub const FALLBACK_RANGE_FACTOR: f32 = 0.9;

/// Decision cooldown after committing to an attack.
pub const MELEE_ATTACK_HOLD_TICKS: u32 = 5;

/// Decision cooldown after committing to a slot.
pub const MELEE_REEVALUATION_TICKS: u32 = 10;

/// Weight of the arrival force in melee movement.
pub const ARRIVAL_WEIGHT: f32 = 1.0;

/// Weight of the separation force in melee movement.
pub const SEPARATION_WEIGHT: f32 = 1.5;

/// Arrival starts slowing down this many sizes from the destination.
pub const SLOWING_RADIUS_FACTOR: f32 = 2.0;

/// Allies closer than this many sizes push each other apart.
pub const SEPARATION_RADIUS_FACTOR: f32 = 1.5;

// ============================================================================
// Ranged
// ============================================================================

/// Ideal firing distance as a share of attack range, when not overridden.
pub const DEFAULT_IDEAL_RANGE_FACTOR: f32 = 0.8;

/// Closer than this share of the ideal range is too close.
pub const TOO_CLOSE_FACTOR: f32 = 0.7;

/// Further than this share of the ideal range is too far.
pub const TOO_FAR_FACTOR: f32 = 1.1;

/// Sidestep rotation away from the target direction, in degrees.
pub const SIDESTEP_ANGLE_DEGREES: f32 = 72.0;

/// Sidestep length as a share of the ideal range.
pub const SIDESTEP_DISTANCE_FACTOR: f32 = 0.3;

/// Advance length in ticks of movement.
pub const ADVANCE_SPEED_FACTOR: f32 = 2.0;

/// Decision cooldown after committing to a reposition point.
pub const RANGED_REPOSITION_COMMIT_TICKS: u32 = 25;

/// Decision cooldown after a blocked reposition attempt.
pub const RANGED_BLOCKED_RETRY_TICKS: u32 = 5;

/// Reposition points closer than this (absolute units) are not worth a move.
pub const REPOSITION_MIN_DISTANCE: f32 = 1.0;

/// Tunable parameters for the combat AI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AiTuning {
    // === Pathfinding ===
    /// Hard cap on A* node expansions
    pub astar_max_iterations: u32,
    /// Path cost per nearby ally
    pub congestion_penalty: f32,
    /// Congestion radius (sizes)
    pub congestion_radius_factor: f32,
    /// Enemy obstacle radius for pathing (sizes)
    pub path_obstacle_factor: f32,

    // === Geometry ===
    /// Movement collision radius (sizes)
    pub collision_factor: f32,
    /// LOS graze tolerance
    pub los_graze_factor: f32,
    /// Death animation length
    pub death_animation_ticks: u32,

    // === Melee ===
    /// Slot distance from target (target sizes)
    pub slot_radius_factor: f32,
    /// Crowding radius around slots (sizes)
    pub slot_crowding_radius_factor: f32,
    /// Crowding penalty, proportional part
    pub slot_crowding_cost_factor: f32,
    /// Crowding penalty, flat part
    pub slot_crowding_flat_penalty: f32,
    /// Fallback stand-point range share
    pub fallback_range_factor: f32,
    /// Cooldown after attacking
    pub melee_attack_hold_ticks: u32,
    /// Cooldown after committing to a slot
    pub melee_reevaluation_ticks: u32,
    /// Arrival weight
    pub arrival_weight: f32,
    /// Separation weight
    pub separation_weight: f32,
    /// Arrival slowing radius (sizes)
    pub slowing_radius_factor: f32,
    /// Separation radius (sizes)
    pub separation_radius_factor: f32,

    // === Ranged ===
    /// Ideal range share of attack range
    pub default_ideal_range_factor: f32,
    /// Too-close threshold
    pub too_close_factor: f32,
    /// Too-far threshold
    pub too_far_factor: f32,
    /// Sidestep angle in degrees
    pub sidestep_angle_degrees: f32,
    /// Sidestep length share of ideal range
    pub sidestep_distance_factor: f32,
    /// Advance length in ticks of movement
    pub advance_speed_factor: f32,
    /// Cooldown after committing to a reposition
    pub reposition_commit_ticks: u32,
    /// Cooldown after a blocked reposition
    pub blocked_retry_ticks: u32,
    /// Minimum worthwhile reposition distance
    pub reposition_min_distance: f32,
}

impl Default for AiTuning {
    fn default() -> Self {
        Self {
            // Pathfinding
            astar_max_iterations: ASTAR_MAX_ITERATIONS,
            congestion_penalty: CONGESTION_PENALTY_BASE,
            congestion_radius_factor: CONGESTION_RADIUS_FACTOR,
            path_obstacle_factor: PATH_OBSTACLE_FACTOR,

            // Geometry
            collision_factor: COLLISION_FACTOR,
            los_graze_factor: LOS_GRAZE_FACTOR,
            death_animation_ticks: DEATH_ANIMATION_TICKS,

            // Melee
            slot_radius_factor: SLOT_RADIUS_FACTOR,
            slot_crowding_radius_factor: SLOT_CROWDING_RADIUS_FACTOR,
            slot_crowding_cost_factor: SLOT_CROWDING_COST_FACTOR,
            slot_crowding_flat_penalty: SLOT_CROWDING_FLAT_PENALTY,
            fallback_range_factor: FALLBACK_RANGE_FACTOR,
            melee_attack_hold_ticks: MELEE_ATTACK_HOLD_TICKS,
            melee_reevaluation_ticks: MELEE_REEVALUATION_TICKS,
            arrival_weight: ARRIVAL_WEIGHT,
            separation_weight: SEPARATION_WEIGHT,
            slowing_radius_factor: SLOWING_RADIUS_FACTOR,
            separation_radius_factor: SEPARATION_RADIUS_FACTOR,

            // Ranged
            default_ideal_range_factor: DEFAULT_IDEAL_RANGE_FACTOR,
            too_close_factor: TOO_CLOSE_FACTOR,
            too_far_factor: TOO_FAR_FACTOR,
            sidestep_angle_degrees: SIDESTEP_ANGLE_DEGREES,
            sidestep_distance_factor: SIDESTEP_DISTANCE_FACTOR,
            advance_speed_factor: ADVANCE_SPEED_FACTOR,
            reposition_commit_ticks: RANGED_REPOSITION_COMMIT_TICKS,
            blocked_retry_ticks: RANGED_BLOCKED_RETRY_TICKS,
            reposition_min_distance: REPOSITION_MIN_DISTANCE,
        }
    }
}

impl AiTuning {
    /// Checks every value for the sign the behaviours rely on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.astar_max_iterations == 0 {
            return Err(ConfigError::ZeroIterationCap);
        }

        let positive = [
            ("congestion_radius_factor", self.congestion_radius_factor),
            ("path_obstacle_factor", self.path_obstacle_factor),
            ("collision_factor", self.collision_factor),
            ("los_graze_factor", self.los_graze_factor),
            ("slot_radius_factor", self.slot_radius_factor),
            ("slot_crowding_radius_factor", self.slot_crowding_radius_factor),
            ("fallback_range_factor", self.fallback_range_factor),
            ("slowing_radius_factor", self.slowing_radius_factor),
            ("separation_radius_factor", self.separation_radius_factor),
            ("default_ideal_range_factor", self.default_ideal_range_factor),
            ("too_close_factor", self.too_close_factor),
            ("too_far_factor", self.too_far_factor),
            ("sidestep_distance_factor", self.sidestep_distance_factor),
            ("advance_speed_factor", self.advance_speed_factor),
        ];
        for (name, value) in positive {
            if value.is_nan() || value <= 0.0 {
                return Err(ConfigError::NotPositive { name, value });
            }
        }

        let non_negative = [
            ("congestion_penalty", self.congestion_penalty),
            ("slot_crowding_cost_factor", self.slot_crowding_cost_factor),
            ("slot_crowding_flat_penalty", self.slot_crowding_flat_penalty),
            ("arrival_weight", self.arrival_weight),
            ("separation_weight", self.separation_weight),
            ("reposition_min_distance", self.reposition_min_distance),
        ];
        for (name, value) in non_negative {
            if value.is_nan() || value < 0.0 {
                return Err(ConfigError::Negative { name, value });
            }
        }

        Ok(())
    }

    /// Sidestep angle in radians.
    #[must_use]
    pub fn sidestep_angle(&self) -> f32 {
        self.sidestep_angle_degrees.to_radians()
    }
}
