//! Ranged behaviour state machine.
//!
//! A ranged unit keeps its target near an ideal firing distance with a clear
//! line of sight. It backs off when too close, advances when too far, and
//! sidesteps when another body blocks the shot. Reposition points are
//! committed for a number of ticks so the unit does not thrash.
//!
//! States: [`AiState::Idle`], [`AiState::Attacking`] and
//! [`AiState::Repositioning`].

use crate::config::AiTuning;
use crate::decision::{resolve_collisions, snap_to, Decision};
use crate::participant::{AiBookkeeping, AiState, BattleView, Participant};
use crate::pathfinding::{compute_path, PathQuery};
use crate::targeting::{is_colliding, is_line_of_sight_blocked};
use arena_common::{rotate, Vec2};
use tracing::{debug, trace};

/// Preferred firing distance: the unit's override, else a share of its range.
#[must_use]
pub fn ideal_range(unit: &Participant, tuning: &AiTuning) -> f32 {
    unit.ideal_range
        .unwrap_or(unit.attack_range * tuning.default_ideal_range_factor)
}

/// Decides positioning and attack for a ranged participant.
///
/// `rng` only picks the side of a sidestep; a seeded generator makes the
/// whole decision reproducible.
#[must_use]
pub fn decide_ranged(
    unit: &Participant,
    view: &BattleView<'_>,
    target: &Participant,
    tuning: &AiTuning,
    rng: &mut fastrand::Rng,
) -> Decision {
    let ideal = ideal_range(unit, tuning);
    let offset = target.position - unit.position;
    let distance = offset.length();
    let blocked = is_line_of_sight_blocked(
        unit,
        target,
        view.all(),
        view.size(),
        tuning.los_graze_factor,
    );
    let clear_shot = distance <= unit.attack_range && !blocked;
    let mut ai = unit.ai;

    match ai.state {
        AiState::Attacking => {
            if !clear_shot {
                debug!(unit = %unit.id, target = %target.id, blocked, "Lost clear shot");
                return Decision::hold(AiBookkeeping::default());
            }
            ai.decision_cooldown_ticks = ai.decision_cooldown_ticks.saturating_sub(1);
            ai.movement_target = Some(unit.position);
            return if unit.can_attack() {
                Decision::attack(target.id, ai)
            } else {
                Decision::hold(ai)
            };
        },
        AiState::Repositioning => match ai.repositioning_target {
            Some(point) if ai.decision_cooldown_ticks > 0 => {
                ai.decision_cooldown_ticks -= 1;
                return reposition_step(unit, point, ai, view, tuning);
            },
            _ => {
                trace!(unit = %unit.id, "Reposition finished");
                ai = AiBookkeeping::default();
            },
        },
        AiState::Idle | AiState::MovingToEngage => {},
    }

    if clear_shot && unit.can_attack() {
        debug!(unit = %unit.id, target = %target.id, distance, "Opening fire");
        return Decision::attack(target.id, attacking(unit, ai));
    }

    if ai.decision_cooldown_ticks > 0 {
        ai.decision_cooldown_ticks -= 1;
        return match ai.repositioning_target {
            Some(point) => reposition_step(unit, point, ai, view, tuning),
            None => Decision::hold(ai),
        };
    }

    let toward = offset.normalize_or_zero();
    let desired = if distance < tuning.too_close_factor * ideal {
        let away = if toward == Vec2::ZERO { Vec2::X } else { -toward };
        target.position + away * ideal
    } else if blocked {
        let side = if rng.bool() { 1.0 } else { -1.0 };
        let sidestep = rotate(toward, side * tuning.sidestep_angle());
        unit.position + sidestep * (tuning.sidestep_distance_factor * ideal)
    } else if distance > tuning.too_far_factor * ideal || !clear_shot {
        unit.position + toward * (tuning.advance_speed_factor * unit.movement_speed)
    } else {
        // Good spot; only the attack cooldown is pending.
        return Decision::hold(attacking(unit, ai));
    };
    let desired = view.arena.clamp_position(desired);

    let collides = is_colliding(
        desired,
        tuning.collision_factor * view.size(),
        view.all(),
        unit.id,
        tuning.death_animation_ticks,
    );
    if collides || desired.distance(unit.position) <= tuning.reposition_min_distance {
        trace!(unit = %unit.id, ?desired, collides, "Reposition point rejected");
        ai.state = AiState::Idle;
        ai.repositioning_target = None;
        ai.decision_cooldown_ticks = tuning.blocked_retry_ticks;
        return Decision::hold(ai);
    }

    debug!(unit = %unit.id, ?desired, distance, blocked, "Repositioning");
    ai.state = AiState::Repositioning;
    ai.repositioning_target = Some(desired);
    ai.movement_target = Some(desired);
    ai.decision_cooldown_ticks = tuning.reposition_commit_ticks;
    reposition_step(unit, desired, ai, view, tuning)
}

/// Bookkeeping for standing in place and shooting.
fn attacking(unit: &Participant, ai: AiBookkeeping) -> AiBookkeeping {
    AiBookkeeping {
        state: AiState::Attacking,
        decision_cooldown_ticks: ai.decision_cooldown_ticks.saturating_sub(1),
        movement_target: Some(unit.position),
        repositioning_target: None,
    }
}

/// One tick of movement toward a committed reposition point.
///
/// Follows the first A* step when a path exists, else heads straight for the
/// point. Within one tick of movement it snaps onto the point and clears the
/// commitment so the next tick re-decides.
fn reposition_step(
    unit: &Participant,
    point: Vec2,
    mut ai: AiBookkeeping,
    view: &BattleView<'_>,
    tuning: &AiTuning,
) -> Decision {
    let speed = unit.movement_speed;
    if let Some(remaining) = snap_to(unit.position, point, speed) {
        ai.repositioning_target = None;
        return Decision::moving(remaining, ai);
    }

    let waypoint = compute_path(view, &PathQuery::new(unit, point), tuning)
        .and_then(|path| path.next_step())
        .unwrap_or(point);
    let step = (waypoint - unit.position).normalize_or_zero() * speed;
    Decision::moving(resolve_collisions(unit, step, view, tuning), ai)
}
