//! Attack slot generation around melee targets.

use arena_common::{ArenaDimensions, Vec2};
use std::f32::consts::FRAC_1_SQRT_2;

/// Unit offsets of the eight slots: four cardinal, then four diagonal.
const SLOT_DIRECTIONS: [Vec2; 8] = [
    Vec2::new(1.0, 0.0),
    Vec2::new(-1.0, 0.0),
    Vec2::new(0.0, 1.0),
    Vec2::new(0.0, -1.0),
    Vec2::new(FRAC_1_SQRT_2, FRAC_1_SQRT_2),
    Vec2::new(-FRAC_1_SQRT_2, FRAC_1_SQRT_2),
    Vec2::new(FRAC_1_SQRT_2, -FRAC_1_SQRT_2),
    Vec2::new(-FRAC_1_SQRT_2, -FRAC_1_SQRT_2),
];

/// Eight candidate stand-points around `target`, all `radius` away.
///
/// Order is fixed (east, west, south, north, then the diagonals) so slot
/// selection stays deterministic.
#[must_use]
pub fn adjacent_attack_slots(target: Vec2, radius: f32) -> [Vec2; 8] {
    SLOT_DIRECTIONS.map(|direction| target + direction * radius)
}

/// Attack slots clamped into the arena's legal positions.
#[must_use]
pub fn clamped_attack_slots(target: Vec2, radius: f32, arena: &ArenaDimensions) -> [Vec2; 8] {
    adjacent_attack_slots(target, radius).map(|slot| arena.clamp_position(slot))
}
