//! Battle participants and the per-tick world snapshot.
//!
//! A participant is either a hero or an enemy; both share one shape and are
//! told apart by their [`Team`]. The AI reads participants through a
//! [`BattleView`] and never mutates them directly.

use arena_common::{ArenaDimensions, ParticipantId, ScenarioError, Vec2};
use serde::{Deserialize, Serialize};

/// Side a participant fights for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Team {
    /// Player-controlled side
    Hero,
    /// Opposing side
    Enemy,
}

impl Team {
    /// Returns the opposing team.
    #[must_use]
    pub const fn opponent(self) -> Self {
        match self {
            Self::Hero => Self::Enemy,
            Self::Enemy => Self::Hero,
        }
    }
}

/// How a participant attacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttackType {
    /// Must stand next to its target
    Melee,
    /// Attacks from a distance and needs line of sight
    Ranged,
}

/// Behaviour state persisted between ticks.
///
/// Melee units use `Idle`, `MovingToEngage` and `Attacking`; ranged units use
/// `Idle`, `Attacking` and `Repositioning`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AiState {
    /// No commitment; re-evaluates on the next opportunity
    #[default]
    Idle,
    /// Walking to a committed attack slot
    MovingToEngage,
    /// In range and attacking (or holding for the attack cooldown)
    Attacking,
    /// Walking to a committed firing position
    Repositioning,
}

/// AI fields owned by the behaviour functions.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AiBookkeeping {
    /// Current behaviour state
    pub state: AiState,
    /// Ticks until the behaviour may re-plan
    pub decision_cooldown_ticks: u32,
    /// Committed destination (attack slot, firing position, or own position
    /// while attacking)
    pub movement_target: Option<Vec2>,
    /// Committed reposition point (ranged only)
    pub repositioning_target: Option<Vec2>,
}

/// A hero or enemy taking part in a battle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    /// Unique id, stable for the battle
    pub id: ParticipantId,
    /// Side this participant fights for
    pub team: Team,
    /// Centre position in arena units
    pub position: Vec2,
    /// Melee or ranged
    pub attack_type: AttackType,
    /// Maximum attack distance (centre to centre)
    pub attack_range: f32,
    /// Preferred firing distance for ranged units (None = derived from range)
    pub ideal_range: Option<f32>,
    /// Distance covered per tick at full speed
    pub movement_speed: f32,
    /// Ticks until the next attack is allowed
    pub attack_cooldown_ticks: u32,
    /// Ticks between attacks
    pub attack_interval_ticks: u32,
    /// Damage dealt per attack
    pub attack_damage: f32,
    /// Current health
    pub current_hp: f32,
    /// Maximum health
    pub max_hp: f32,
    /// Remaining death animation ticks; `Some` means dying
    pub dying_ticks_remaining: Option<u32>,
    /// Currently engaged opponent
    pub target_id: Option<ParticipantId>,
    /// Behaviour bookkeeping
    pub ai: AiBookkeeping,
}

impl Participant {
    /// Creates a participant with default stats for its attack type.
    #[must_use]
    pub fn new(id: ParticipantId, team: Team, attack_type: AttackType, position: Vec2) -> Self {
        let (attack_range, attack_interval_ticks, attack_damage) = match attack_type {
            AttackType::Melee => (DEFAULT_MELEE_RANGE, 20, 12.0),
            AttackType::Ranged => (DEFAULT_RANGED_RANGE, 30, 8.0),
        };
        Self {
            id,
            team,
            position,
            attack_type,
            attack_range,
            ideal_range: None,
            movement_speed: DEFAULT_MOVEMENT_SPEED,
            attack_cooldown_ticks: 0,
            attack_interval_ticks,
            attack_damage,
            current_hp: 100.0,
            max_hp: 100.0,
            dying_ticks_remaining: None,
            target_id: None,
            ai: AiBookkeeping::default(),
        }
    }

    /// Creates a melee participant.
    #[must_use]
    pub fn melee(id: ParticipantId, team: Team, position: Vec2) -> Self {
        Self::new(id, team, AttackType::Melee, position)
    }

    /// Creates a ranged participant.
    #[must_use]
    pub fn ranged(id: ParticipantId, team: Team, position: Vec2) -> Self {
        Self::new(id, team, AttackType::Ranged, position)
    }

    /// Set attack range.
    #[must_use]
    pub fn with_attack_range(mut self, range: f32) -> Self {
        self.attack_range = range;
        self
    }

    /// Set preferred firing distance.
    #[must_use]
    pub fn with_ideal_range(mut self, range: f32) -> Self {
        self.ideal_range = Some(range);
        self
    }

    /// Set movement speed per tick.
    #[must_use]
    pub fn with_speed(mut self, speed: f32) -> Self {
        self.movement_speed = speed;
        self
    }

    /// Set health (current and max).
    #[must_use]
    pub fn with_hp(mut self, hp: f32) -> Self {
        self.current_hp = hp;
        self.max_hp = hp;
        self
    }

    /// Set damage per attack and ticks between attacks.
    #[must_use]
    pub fn with_attack(mut self, damage: f32, interval_ticks: u32) -> Self {
        self.attack_damage = damage;
        self.attack_interval_ticks = interval_ticks;
        self
    }

    /// Set the engaged target.
    #[must_use]
    pub fn with_target(mut self, target: ParticipantId) -> Self {
        self.target_id = Some(target);
        self
    }

    /// Whether the participant is playing its death animation.
    #[must_use]
    pub const fn is_dying(&self) -> bool {
        self.dying_ticks_remaining.is_some()
    }

    /// Alive and not dying: may act, be targeted, and block sight.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.current_hp > 0.0 && !self.is_dying()
    }

    /// Whether an attack is currently allowed by the attack cooldown.
    #[must_use]
    pub const fn can_attack(&self) -> bool {
        self.attack_cooldown_ticks == 0
    }

    /// Whether `other` is on the same team (and is not this participant).
    #[must_use]
    pub fn is_ally_of(&self, other: &Self) -> bool {
        other.id != self.id && other.team == self.team
    }

    /// Starts the death animation.
    pub fn begin_dying(&mut self, animation_ticks: u32) {
        self.current_hp = 0.0;
        if self.dying_ticks_remaining.is_none() {
            self.dying_ticks_remaining = Some(animation_ticks);
        }
    }

    /// Checks the stat block for values the AI cannot work with.
    pub fn validate(&self) -> Result<(), ScenarioError> {
        let invalid = |reason: &str| ScenarioError::InvalidStats {
            id: self.id,
            reason: reason.to_owned(),
        };
        if !self.position.is_finite() {
            return Err(invalid("position is not finite"));
        }
        if self.attack_range <= 0.0 || self.attack_range.is_nan() {
            return Err(invalid("attack range must be positive"));
        }
        if self.movement_speed < 0.0 || self.movement_speed.is_nan() {
            return Err(invalid("movement speed must not be negative"));
        }
        if self.max_hp <= 0.0 || self.max_hp.is_nan() {
            return Err(invalid("max hp must be positive"));
        }
        if matches!(self.ideal_range, Some(r) if r <= 0.0 || r.is_nan()) {
            return Err(invalid("ideal range must be positive"));
        }
        Ok(())
    }
}

/// Default melee reach.
pub const DEFAULT_MELEE_RANGE: f32 = 50.0;

/// Default ranged reach.
pub const DEFAULT_RANGED_RANGE: f32 = 250.0;

/// Default distance moved per tick.
pub const DEFAULT_MOVEMENT_SPEED: f32 = 3.0;

/// Immutable snapshot of the battle handed to every decision of a tick.
#[derive(Debug, Clone, Copy)]
pub struct BattleView<'a> {
    /// All heroes, including dead and dying ones
    pub heroes: &'a [Participant],
    /// All enemies, including dead and dying ones
    pub enemies: &'a [Participant],
    /// Arena bounds and participant size
    pub arena: ArenaDimensions,
}

impl<'a> BattleView<'a> {
    /// Creates a snapshot view.
    #[must_use]
    pub const fn new(
        heroes: &'a [Participant],
        enemies: &'a [Participant],
        arena: ArenaDimensions,
    ) -> Self {
        Self {
            heroes,
            enemies,
            arena,
        }
    }

    /// Every participant, heroes first.
    pub fn all(&self) -> impl Iterator<Item = &'a Participant> + 'a {
        self.heroes.iter().chain(self.enemies.iter())
    }

    /// The list holding `team`.
    #[must_use]
    pub const fn side(&self, team: Team) -> &'a [Participant] {
        match team {
            Team::Hero => self.heroes,
            Team::Enemy => self.enemies,
        }
    }

    /// Looks a participant up by id.
    #[must_use]
    pub fn get(&self, id: ParticipantId) -> Option<&'a Participant> {
        self.all().find(|p| p.id == id)
    }

    /// Participant size shorthand.
    #[must_use]
    pub const fn size(&self) -> f32 {
        self.arena.participant_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_team_opponent() {
        assert_eq!(Team::Hero.opponent(), Team::Enemy);
        assert_eq!(Team::Enemy.opponent(), Team::Hero);
    }

    #[test]
    fn test_new_participant_starts_idle() {
        let p = Participant::melee(ParticipantId::from_raw(1), Team::Hero, Vec2::ZERO);
        assert_eq!(p.ai.state, AiState::Idle);
        assert_eq!(p.ai.decision_cooldown_ticks, 0);
        assert!(p.ai.movement_target.is_none());
        assert!(p.is_active());
    }

    #[test]
    fn test_dying_is_inactive() {
        let mut p = Participant::ranged(ParticipantId::from_raw(2), Team::Enemy, Vec2::ZERO);
        p.begin_dying(30);
        assert!(p.is_dying());
        assert!(!p.is_active());
        assert_eq!(p.dying_ticks_remaining, Some(30));
    }

    #[test]
    fn test_validate_rejects_bad_range() {
        let p = Participant::melee(ParticipantId::from_raw(3), Team::Hero, Vec2::ZERO)
            .with_attack_range(0.0);
        assert!(matches!(
            p.validate(),
            Err(ScenarioError::InvalidStats { .. })
        ));
    }

    #[test]
    fn test_view_lookup_and_order() {
        let heroes = vec![Participant::melee(ParticipantId::from_raw(1), Team::Hero, Vec2::ZERO)];
        let enemies = vec![Participant::melee(
            ParticipantId::from_raw(2),
            Team::Enemy,
            Vec2::new(10.0, 0.0),
        )];
        let view = BattleView::new(&heroes, &enemies, ArenaDimensions::default());

        let ids: Vec<u64> = view.all().map(|p| p.id.raw()).collect();
        assert_eq!(ids, vec![1, 2]);
        assert_eq!(
            view.get(ParticipantId::from_raw(2)).map(|p| p.team),
            Some(Team::Enemy)
        );
        assert!(view.get(ParticipantId::from_raw(9)).is_none());
    }
}
