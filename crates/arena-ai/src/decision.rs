//! Per-tick decision output and the movement helpers both behaviours share.

use crate::config::AiTuning;
use crate::participant::{AiBookkeeping, BattleView, Participant};
use crate::targeting::blocks_movement;
use arena_common::{ParticipantId, Vec2};
use serde::{Deserialize, Serialize};

/// What a behaviour wants one participant to do this tick.
///
/// The tick driver applies `delta` to the position, executes the attack if
/// the attacker's cooldown allows it, and stores `ai` back on the participant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    /// Position change for this tick
    pub delta: Vec2,
    /// Opponent to attack this tick
    pub attack_target: Option<ParticipantId>,
    /// Bookkeeping to persist for the next tick
    pub ai: AiBookkeeping,
}

impl Decision {
    /// No movement and no attack, with `ai` persisted as given.
    #[must_use]
    pub const fn hold(ai: AiBookkeeping) -> Self {
        Self {
            delta: Vec2::ZERO,
            attack_target: None,
            ai,
        }
    }

    /// Decision for a participant with nothing to fight.
    #[must_use]
    pub fn idle() -> Self {
        Self::hold(AiBookkeeping::default())
    }

    /// Movement toward a destination.
    #[must_use]
    pub const fn moving(delta: Vec2, ai: AiBookkeeping) -> Self {
        Self {
            delta,
            attack_target: None,
            ai,
        }
    }

    /// Stand still and attack `target`.
    #[must_use]
    pub const fn attack(target: ParticipantId, ai: AiBookkeeping) -> Self {
        Self {
            delta: Vec2::ZERO,
            attack_target: Some(target),
            ai,
        }
    }

    /// Whether the decision moves the participant.
    #[must_use]
    pub fn is_moving(&self) -> bool {
        self.delta != Vec2::ZERO
    }
}

/// Trims a step so it does not walk into another body.
///
/// Tries the full step, then its X component alone, then its Y component
/// alone, and stands still when all three are blocked. A body only blocks a
/// step that ends inside its collision radius *and* closer than the unit
/// currently is, so units that already overlap can still move apart.
#[must_use]
pub fn resolve_collisions(
    unit: &Participant,
    step: Vec2,
    view: &BattleView<'_>,
    tuning: &AiTuning,
) -> Vec2 {
    if step == Vec2::ZERO {
        return Vec2::ZERO;
    }

    let radius = tuning.collision_factor * view.size();
    let radius_sq = radius * radius;
    let blocked = |candidate: Vec2| {
        let destination = unit.position + candidate;
        view.all().any(|other| {
            if other.id == unit.id || !blocks_movement(other, tuning.death_animation_ticks) {
                return false;
            }
            let after = other.position.distance_squared(destination);
            after < radius_sq && after < other.position.distance_squared(unit.position)
        })
    };

    [step, Vec2::new(step.x, 0.0), Vec2::new(0.0, step.y)]
        .into_iter()
        .find(|candidate| *candidate != Vec2::ZERO && !blocked(*candidate))
        .unwrap_or(Vec2::ZERO)
}

/// Exact offset to `destination` when it is within `snap_distance`.
#[must_use]
pub fn snap_to(position: Vec2, destination: Vec2, snap_distance: f32) -> Option<Vec2> {
    let remaining = destination - position;
    (remaining.length_squared() <= snap_distance * snap_distance).then_some(remaining)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::participant::{AiState, Team};
    use arena_common::ArenaDimensions;

    fn hero(id: u64, x: f32, y: f32) -> Participant {
        Participant::melee(ParticipantId::from_raw(id), Team::Hero, Vec2::new(x, y))
    }

    fn arena() -> ArenaDimensions {
        ArenaDimensions::new(400.0, 400.0, 10.0)
    }

    #[test]
    fn test_idle_decision_is_empty() {
        let decision = Decision::idle();
        assert!(!decision.is_moving());
        assert!(decision.attack_target.is_none());
        assert_eq!(decision.ai.state, AiState::Idle);
    }

    #[test]
    fn test_free_step_passes_through() {
        let units = vec![hero(1, 100.0, 100.0)];
        let view = BattleView::new(&units, &[], arena());
        let step = Vec2::new(3.0, 1.0);

        assert_eq!(resolve_collisions(&units[0], step, &view, &AiTuning::default()), step);
    }

    #[test]
    fn test_blocked_step_slides_along_free_axis() {
        // Body straight ahead on X; the Y component of the step is still free.
        let units = vec![hero(1, 100.0, 100.0), hero(2, 110.0, 100.0)];
        let view = BattleView::new(&units, &[], arena());
        let tuning = AiTuning::default();

        let step = resolve_collisions(&units[0], Vec2::new(3.0, -3.0), &view, &tuning);
        assert_eq!(step, Vec2::new(0.0, -3.0));
    }

    #[test]
    fn test_fully_blocked_step_stands_still() {
        let units = vec![hero(1, 100.0, 100.0), hero(2, 109.0, 100.0)];
        let view = BattleView::new(&units, &[], arena());

        let step = resolve_collisions(&units[0], Vec2::new(3.0, 0.0), &view, &AiTuning::default());
        assert_eq!(step, Vec2::ZERO);
    }

    #[test]
    fn test_overlapping_units_may_separate() {
        let units = vec![hero(1, 100.0, 100.0), hero(2, 104.0, 100.0)];
        let view = BattleView::new(&units, &[], arena());

        let step = resolve_collisions(&units[0], Vec2::new(-3.0, 0.0), &view, &AiTuning::default());
        assert_eq!(step, Vec2::new(-3.0, 0.0));
    }

    #[test]
    fn test_snap_within_distance() {
        let pos = Vec2::new(10.0, 10.0);
        assert_eq!(snap_to(pos, Vec2::new(11.0, 10.0), 1.5), Some(Vec2::new(1.0, 0.0)));
        assert!(snap_to(pos, Vec2::new(20.0, 10.0), 1.5).is_none());
    }
}
