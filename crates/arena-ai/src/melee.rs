//! Melee behaviour state machine.
//!
//! A melee unit picks one of eight attack slots around its target, walks
//! there with arrival and separation steering, and attacks once the target is
//! in range. Slot choice is congestion-aware so several attackers spread out
//! around a single enemy instead of queueing for the nearest slot.
//!
//! States: [`AiState::Idle`] -> [`AiState::MovingToEngage`] ->
//! [`AiState::Attacking`]. Any state drops back to moving when the target
//! leaves attack range.

use crate::config::AiTuning;
use crate::decision::{resolve_collisions, snap_to, Decision};
use crate::participant::{AiBookkeeping, AiState, AttackType, BattleView, Participant};
use crate::pathfinding::{compute_path, PathQuery};
use crate::slots::clamped_attack_slots;
use crate::steering::{arrival_force, combine_forces, separation_force};
use arena_common::Vec2;
use tracing::{debug, trace};

/// Decides movement and attack for a melee participant.
///
/// `target` must already be resolved to a live opponent. The returned
/// decision never mutates the snapshot; the caller applies it.
#[must_use]
pub fn decide_melee(
    unit: &Participant,
    view: &BattleView<'_>,
    target: &Participant,
    tuning: &AiTuning,
) -> Decision {
    let mut ai = unit.ai;

    if ai.state == AiState::MovingToEngage {
        if let Some(slot) = ai.movement_target {
            if is_slot_taken_by_ally(unit, slot, view) {
                debug!(unit = %unit.id, ?slot, "Committed slot taken by ally, re-planning");
                ai.state = AiState::Idle;
                ai.decision_cooldown_ticks = 0;
                ai.movement_target = None;
            }
        }
    }

    let range_sq = unit.attack_range * unit.attack_range;
    let in_range = unit.position.distance_squared(target.position) <= range_sq;

    if in_range {
        let hold = AiBookkeeping {
            state: AiState::Attacking,
            movement_target: Some(unit.position),
            repositioning_target: None,
            decision_cooldown_ticks: ai.decision_cooldown_ticks,
        };
        if unit.can_attack() {
            if ai.state != AiState::Attacking {
                debug!(unit = %unit.id, target = %target.id, "Engaging");
            }
            return Decision::attack(
                target.id,
                AiBookkeeping {
                    decision_cooldown_ticks: tuning.melee_attack_hold_ticks,
                    ..hold
                },
            );
        }
        // In reach; the driver lands the blow once the attack cooldown allows.
        return Decision::attack(
            target.id,
            AiBookkeeping {
                decision_cooldown_ticks: ai.decision_cooldown_ticks.saturating_sub(1),
                ..hold
            },
        );
    }

    let committed = match ai.movement_target {
        Some(slot) if ai.state == AiState::MovingToEngage && ai.decision_cooldown_ticks > 0 => {
            ai.decision_cooldown_ticks -= 1;
            slot
        },
        _ => {
            let slot = choose_engagement_point(unit, view, target, tuning);
            trace!(unit = %unit.id, target = %target.id, ?slot, "Committed to attack slot");
            ai.decision_cooldown_ticks = tuning.melee_reevaluation_ticks;
            slot
        },
    };
    ai.state = AiState::MovingToEngage;
    ai.movement_target = Some(committed);
    ai.repositioning_target = None;

    let delta = steer_toward(unit, committed, view, tuning);
    Decision::moving(delta, ai)
}

/// Whether an ally other than `unit` stands on `slot`.
///
/// Uses a box test of half a participant size on both axes.
#[must_use]
pub fn is_slot_taken_by_ally(unit: &Participant, slot: Vec2, view: &BattleView<'_>) -> bool {
    let tolerance = view.size() / 2.0;
    view.side(unit.team).iter().any(|ally| {
        unit.is_ally_of(ally)
            && ally.is_active()
            && (ally.position.x - slot.x).abs() <= tolerance
            && (ally.position.y - slot.y).abs() <= tolerance
    })
}

/// Picks the stand-point a melee unit should walk to.
///
/// Every reachable attack slot is scored by its path cost plus a crowding
/// penalty for each other allied melee attacker on the same target committed
/// (or standing) near it. The cheapest slot wins; on ties the earlier slot.
/// When no slot is reachable, falls back to [`fallback_engagement_point`].
#[must_use]
pub fn choose_engagement_point(
    unit: &Participant,
    view: &BattleView<'_>,
    target: &Participant,
    tuning: &AiTuning,
) -> Vec2 {
    let size = view.size();
    let slots = clamped_attack_slots(target.position, tuning.slot_radius_factor * size, &view.arena);

    let crowding_radius = tuning.slot_crowding_radius_factor * size;
    let crowding_radius_sq = crowding_radius * crowding_radius;
    let rivals: Vec<Vec2> = view
        .side(unit.team)
        .iter()
        .filter(|ally| {
            unit.is_ally_of(ally)
                && ally.is_active()
                && ally.attack_type == AttackType::Melee
                && ally.target_id == Some(target.id)
        })
        .map(|ally| ally.ai.movement_target.unwrap_or(ally.position))
        .collect();

    let mut best: Option<(Vec2, f32)> = None;
    for slot in slots {
        let query = PathQuery::new(unit, slot).to_attack_slot_of(target.id);
        let Some(path) = compute_path(view, &query, tuning) else {
            continue;
        };
        let crowded = rivals
            .iter()
            .filter(|rival| rival.distance_squared(slot) < crowding_radius_sq)
            .count() as f32;
        let penalty = path.cost * tuning.slot_crowding_cost_factor + tuning.slot_crowding_flat_penalty;
        let adjusted = path.cost + crowded * penalty;

        if !matches!(best, Some((_, cost)) if cost <= adjusted) {
            best = Some((slot, adjusted));
        }
    }

    match best {
        Some((slot, _)) => slot,
        None => {
            trace!(unit = %unit.id, target = %target.id, "No attack slot reachable");
            fallback_engagement_point(unit, view, target, tuning)
        },
    }
}

/// Stand-point used when no attack slot is reachable.
///
/// Paths straight at the target and takes the earliest waypoint already
/// within the fallback share of attack range. Without a usable path this is
/// the target's own position.
#[must_use]
pub fn fallback_engagement_point(
    unit: &Participant,
    view: &BattleView<'_>,
    target: &Participant,
    tuning: &AiTuning,
) -> Vec2 {
    let reach = tuning.fallback_range_factor * unit.attack_range;
    let reach_sq = reach * reach;
    let query = PathQuery::new(unit, target.position).to_attack_slot_of(target.id);

    compute_path(view, &query, tuning)
        .and_then(|path| {
            path.waypoints
                .into_iter()
                .find(|waypoint| waypoint.distance_squared(target.position) <= reach_sq)
        })
        .unwrap_or(target.position)
}

/// Steering step toward `destination`, collision-trimmed and snapped.
fn steer_toward(
    unit: &Participant,
    destination: Vec2,
    view: &BattleView<'_>,
    tuning: &AiTuning,
) -> Vec2 {
    let speed = unit.movement_speed;
    let size = view.size();

    let arrival = arrival_force(
        unit.position,
        destination,
        Vec2::ZERO,
        speed,
        tuning.slowing_radius_factor * size,
    );
    let melee_allies = view
        .side(unit.team)
        .iter()
        .filter(|ally| ally.attack_type == AttackType::Melee);
    let separation = separation_force(unit, melee_allies, tuning.separation_radius_factor * size, speed);

    let step = combine_forces(
        arrival,
        tuning.arrival_weight,
        separation,
        tuning.separation_weight,
        speed,
    );
    let step = resolve_collisions(unit, step, view, tuning);

    snap_to(unit.position, destination, speed / 2.0).unwrap_or(step)
}
