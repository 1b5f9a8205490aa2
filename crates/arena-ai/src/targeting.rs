//! Geometry and target queries shared by every behaviour.
//!
//! This module provides:
//! - Nearest-target search with deterministic tie-breaking
//! - Line-of-sight test against participant bodies
//! - Point collision test against participant bodies

use crate::participant::Participant;
use arena_common::{ParticipantId, Vec2};

/// Finds the closest targetable candidate.
///
/// Candidates that are dead, dying, or listed in `ignore` are skipped. On equal
/// distances the candidate that comes first wins, so results only depend on the
/// order of `candidates`.
#[must_use]
pub fn find_nearest_target<'a, I>(
    unit: &Participant,
    candidates: I,
    ignore: &[ParticipantId],
) -> Option<&'a Participant>
where
    I: IntoIterator<Item = &'a Participant>,
{
    let mut best: Option<(&'a Participant, f32)> = None;
    for candidate in candidates {
        if !candidate.is_active() || ignore.contains(&candidate.id) {
            continue;
        }
        let dist_sq = unit.position.distance_squared(candidate.position);
        match best {
            Some((_, best_sq)) if dist_sq >= best_sq => {},
            _ => best = Some((candidate, dist_sq)),
        }
    }
    best.map(|(candidate, _)| candidate)
}

/// Returns `true` when another body blocks the line from `attacker` to `target`.
///
/// Every active participant other than the two endpoints is a circle of
/// radius `size / 2`. The obstacle centre is projected onto the segment and the
/// line counts as blocked when the squared miss distance is below
/// `graze_factor * radius²`, so shots that only clip the edge of a body pass.
#[must_use]
pub fn is_line_of_sight_blocked<'a, I>(
    attacker: &Participant,
    target: &Participant,
    participants: I,
    size: f32,
    graze_factor: f32,
) -> bool
where
    I: IntoIterator<Item = &'a Participant>,
{
    let start = attacker.position;
    let segment = target.position - start;
    let length_sq = segment.length_squared();
    if length_sq <= f32::EPSILON {
        return false;
    }

    let radius = size / 2.0;
    let threshold = graze_factor * radius * radius;

    participants.into_iter().any(|obstacle| {
        if obstacle.id == attacker.id || obstacle.id == target.id || !obstacle.is_active() {
            return false;
        }
        let t = ((obstacle.position - start).dot(segment) / length_sq).clamp(0.0, 1.0);
        let closest = start + segment * t;
        obstacle.position.distance_squared(closest) < threshold
    })
}

/// Whether a body still blocks movement.
///
/// Dead bodies never block. Dying bodies block until they are less than
/// halfway through their death animation, so units can walk through
/// nearly-faded corpses.
#[must_use]
pub fn blocks_movement(obstacle: &Participant, death_animation_ticks: u32) -> bool {
    match obstacle.dying_ticks_remaining {
        Some(remaining) => remaining >= death_animation_ticks / 2,
        None => obstacle.current_hp > 0.0,
    }
}

/// Returns `true` when `point` lies within `radius` of any other blocking body.
///
/// `mover` is excluded so a unit never collides with itself.
#[must_use]
pub fn is_colliding<'a, I>(
    point: Vec2,
    radius: f32,
    obstacles: I,
    mover: ParticipantId,
    death_animation_ticks: u32,
) -> bool
where
    I: IntoIterator<Item = &'a Participant>,
{
    let radius_sq = radius * radius;
    obstacles.into_iter().any(|obstacle| {
        obstacle.id != mover
            && blocks_movement(obstacle, death_animation_ticks)
            && obstacle.position.distance_squared(point) < radius_sq
    })
}
