//! Steering behaviours for smooth local motion.
//!
//! Forces are expressed in units per tick. Arrival and seek return steering
//! forces (desired velocity minus current velocity); separation returns a
//! repulsion vector of fixed magnitude.

use crate::participant::Participant;
use arena_common::Vec2;

/// Distance under which arrival considers the destination reached.
pub const ARRIVAL_TOLERANCE: f32 = 0.1;

/// Full-speed velocity toward `target`.
#[must_use]
pub fn seek_force(position: Vec2, target: Vec2, max_speed: f32) -> Vec2 {
    (target - position).normalize_or_zero() * max_speed
}

/// Seek that slows down linearly inside `slowing_radius`.
///
/// Returns zero once within [`ARRIVAL_TOLERANCE`] of the target.
#[must_use]
pub fn arrival_force(
    position: Vec2,
    target: Vec2,
    current_velocity: Vec2,
    max_speed: f32,
    slowing_radius: f32,
) -> Vec2 {
    let offset = target - position;
    let distance = offset.length();
    if distance < ARRIVAL_TOLERANCE {
        return Vec2::ZERO;
    }

    let speed = if slowing_radius > 0.0 && distance < slowing_radius {
        max_speed * (distance / slowing_radius)
    } else {
        max_speed
    };
    let desired = offset / distance * speed;
    desired - current_velocity
}

/// Pushes `unit` away from active allies within `separation_radius`.
///
/// Each neighbour contributes its away-direction scaled by `1 / distance`, so
/// close neighbours dominate. The sum is rescaled to `max_force`; the result is
/// zero when nobody is in range or the pushes cancel out.
#[must_use]
pub fn separation_force<'a, I>(
    unit: &Participant,
    neighbours: I,
    separation_radius: f32,
    max_force: f32,
) -> Vec2
where
    I: IntoIterator<Item = &'a Participant>,
{
    let radius_sq = separation_radius * separation_radius;
    let mut push = Vec2::ZERO;

    for other in neighbours {
        if !unit.is_ally_of(other) || !other.is_active() {
            continue;
        }
        let away = unit.position - other.position;
        let distance_sq = away.length_squared();
        if distance_sq >= radius_sq || distance_sq <= f32::EPSILON {
            continue;
        }
        // away / |away| / |away|
        push += away / distance_sq;
    }

    push.normalize_or_zero() * max_force
}

/// Weighted sum of two forces, clamped to `max_speed`.
#[must_use]
pub fn combine_forces(
    arrival: Vec2,
    arrival_weight: f32,
    separation: Vec2,
    separation_weight: f32,
    max_speed: f32,
) -> Vec2 {
    (arrival * arrival_weight + separation * separation_weight).clamp_length_max(max_speed.max(0.0))
}
