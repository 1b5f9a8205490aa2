//! Battle tick driver.
//!
//! Each tick runs in four phases:
//! 1. Advance timers (attack cooldowns, death animations) and remove faded
//!    bodies
//! 2. Resolve every live participant's target
//! 3. Decide: one behaviour call per live participant against an immutable
//!    snapshot of the whole battle
//! 4. Apply all decisions at once (movement, AI bookkeeping, attacks)
//!
//! Because decisions never see this tick's movement, the result does not
//! depend on the order participants are evaluated in.

use crate::config::AiTuning;
use crate::decision::Decision;
use crate::melee::decide_melee;
use crate::participant::{AttackType, BattleView, Participant, Team};
use crate::ranged::decide_ranged;
use crate::targeting::find_nearest_target;
use ahash::AHashSet;
use arena_common::{ArenaDimensions, ArenaResult, ParticipantId, ScenarioError, Vec2};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace};

/// How a battle ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BattleOutcome {
    /// Only this team has live participants left
    Victory(Team),
    /// Both sides fell on the same tick
    Draw,
}

/// One executed attack.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AttackEvent {
    /// Who attacked
    pub attacker: ParticipantId,
    /// Who was hit
    pub target: ParticipantId,
    /// Damage dealt
    pub damage: f32,
    /// Whether the hit started the target's death
    pub lethal: bool,
}

/// What happened during one tick.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TickReport {
    /// Tick number (first tick is 1)
    pub tick: u64,
    /// Attacks executed this tick, in evaluation order
    pub attacks: Vec<AttackEvent>,
    /// Participants that started dying this tick
    pub deaths: Vec<ParticipantId>,
    /// Participants removed after their death animation
    pub removed: Vec<ParticipantId>,
}

/// A participant still standing at the end of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Survivor {
    /// Participant id
    pub id: ParticipantId,
    /// Side
    pub team: Team,
    /// Melee or ranged
    pub attack_type: AttackType,
    /// Remaining health
    pub hp: f32,
    /// Final position
    pub position: Vec2,
}

/// End-of-run summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BattleSummary {
    /// Outcome, or `None` when the tick limit ran out first
    pub outcome: Option<BattleOutcome>,
    /// Ticks simulated
    pub ticks: u64,
    /// Attacks executed over the whole battle
    pub attacks: u64,
    /// Live participants left
    pub survivors: Vec<Survivor>,
}

/// A running battle between heroes and enemies.
#[derive(Debug, Clone)]
pub struct Battle {
    heroes: Vec<Participant>,
    enemies: Vec<Participant>,
    arena: ArenaDimensions,
    tuning: AiTuning,
    rng: fastrand::Rng,
    tick: u64,
    attacks: u64,
}

impl Battle {
    /// Sets up a battle after validating every input.
    ///
    /// Starting positions are clamped into the arena bounds.
    pub fn new(
        heroes: Vec<Participant>,
        enemies: Vec<Participant>,
        arena: ArenaDimensions,
        tuning: AiTuning,
        seed: u64,
    ) -> ArenaResult<Self> {
        arena.validate()?;
        tuning.validate()?;

        let mut seen = AHashSet::new();
        for (team, side) in [(Team::Hero, &heroes), (Team::Enemy, &enemies)] {
            for participant in side {
                if participant.team != team {
                    return Err(ScenarioError::WrongTeam(participant.id).into());
                }
                participant.validate()?;
                if !seen.insert(participant.id) {
                    return Err(ScenarioError::DuplicateId(participant.id).into());
                }
            }
        }

        let mut battle = Self {
            heroes,
            enemies,
            arena,
            tuning,
            rng: fastrand::Rng::with_seed(seed),
            tick: 0,
            attacks: 0,
        };
        for participant in battle.heroes.iter_mut().chain(battle.enemies.iter_mut()) {
            participant.position = arena.clamp_position(participant.position);
        }

        debug!(
            "Battle created: {} heroes vs {} enemies (seed {})",
            battle.heroes.len(),
            battle.enemies.len(),
            seed
        );
        Ok(battle)
    }

    /// All heroes, including dying ones.
    #[must_use]
    pub fn heroes(&self) -> &[Participant] {
        &self.heroes
    }

    /// All enemies, including dying ones.
    #[must_use]
    pub fn enemies(&self) -> &[Participant] {
        &self.enemies
    }

    /// Arena the battle takes place in.
    #[must_use]
    pub fn arena(&self) -> ArenaDimensions {
        self.arena
    }

    /// Tuning in effect.
    #[must_use]
    pub fn tuning(&self) -> &AiTuning {
        &self.tuning
    }

    /// Ticks simulated so far.
    #[must_use]
    pub fn current_tick(&self) -> u64 {
        self.tick
    }

    /// Snapshot of the current state.
    #[must_use]
    pub fn view(&self) -> BattleView<'_> {
        BattleView::new(&self.heroes, &self.enemies, self.arena)
    }

    /// Looks a participant up by id.
    #[must_use]
    pub fn participant(&self, id: ParticipantId) -> Option<&Participant> {
        self.heroes.iter().chain(&self.enemies).find(|p| p.id == id)
    }

    fn participant_mut(&mut self, id: ParticipantId) -> Option<&mut Participant> {
        self.heroes
            .iter_mut()
            .chain(self.enemies.iter_mut())
            .find(|p| p.id == id)
    }

    /// The outcome once at most one side has live participants.
    #[must_use]
    pub fn outcome(&self) -> Option<BattleOutcome> {
        let heroes_alive = self.heroes.iter().any(Participant::is_active);
        let enemies_alive = self.enemies.iter().any(Participant::is_active);
        match (heroes_alive, enemies_alive) {
            (true, true) => None,
            (true, false) => Some(BattleOutcome::Victory(Team::Hero)),
            (false, true) => Some(BattleOutcome::Victory(Team::Enemy)),
            (false, false) => Some(BattleOutcome::Draw),
        }
    }

    /// Simulates one tick.
    pub fn tick(&mut self) -> TickReport {
        self.tick += 1;
        let mut report = TickReport {
            tick: self.tick,
            ..TickReport::default()
        };

        self.advance_timers(&mut report);
        self.resolve_targets();
        let decisions = self.decide();
        self.apply(decisions, &mut report);

        trace!(
            tick = self.tick,
            attacks = report.attacks.len(),
            deaths = report.deaths.len(),
            "Tick complete"
        );
        report
    }

    /// Ticks until the battle is decided or `max_ticks` more ticks have run.
    pub fn run(&mut self, max_ticks: u64) -> BattleSummary {
        info!(
            "Battle started: {} heroes vs {} enemies",
            self.heroes.len(),
            self.enemies.len()
        );

        for _ in 0..max_ticks {
            if self.outcome().is_some() {
                break;
            }
            self.tick();
        }

        let summary = self.summary();
        match summary.outcome {
            Some(outcome) => info!("Battle finished after {} ticks: {:?}", summary.ticks, outcome),
            None => info!("Battle undecided after {} ticks", summary.ticks),
        }
        summary
    }

    /// Summary of the battle so far.
    #[must_use]
    pub fn summary(&self) -> BattleSummary {
        let survivors = self
            .heroes
            .iter()
            .chain(&self.enemies)
            .filter(|p| p.is_active())
            .map(|p| Survivor {
                id: p.id,
                team: p.team,
                attack_type: p.attack_type,
                hp: p.current_hp,
                position: p.position,
            })
            .collect();

        BattleSummary {
            outcome: self.outcome(),
            ticks: self.tick,
            attacks: self.attacks,
            survivors,
        }
    }

    // ========================================================================
    // Tick phases
    // ========================================================================

    fn advance_timers(&mut self, report: &mut TickReport) {
        let death_ticks = self.tuning.death_animation_ticks;
        for side in [&mut self.heroes, &mut self.enemies] {
            for participant in side.iter_mut() {
                participant.attack_cooldown_ticks = participant.attack_cooldown_ticks.saturating_sub(1);
                match participant.dying_ticks_remaining {
                    Some(remaining) => {
                        participant.dying_ticks_remaining = Some(remaining.saturating_sub(1));
                    },
                    None if participant.current_hp <= 0.0 => {
                        participant.begin_dying(death_ticks);
                        report.deaths.push(participant.id);
                    },
                    None => {},
                }
            }

            side.retain(|participant| {
                let faded = participant.dying_ticks_remaining == Some(0);
                if faded {
                    debug!("Removing {} after death animation", participant.id);
                    report.removed.push(participant.id);
                }
                !faded
            });
        }
    }

    fn resolve_targets(&mut self) {
        let targets: Vec<Option<ParticipantId>> = {
            let view = self.view();
            view.all()
                .map(|unit| {
                    if unit.is_active() {
                        resolve_target(unit, &view).map(|target| target.id)
                    } else {
                        None
                    }
                })
                .collect()
        };

        for (unit, target) in self.heroes.iter_mut().chain(self.enemies.iter_mut()).zip(targets) {
            if unit.target_id != target {
                trace!(unit = %unit.id, ?target, "Target changed");
                unit.target_id = target;
            }
        }
    }

    fn decide(&mut self) -> Vec<Decision> {
        let view = BattleView::new(&self.heroes, &self.enemies, self.arena);
        let tuning = &self.tuning;
        let rng = &mut self.rng;

        view.all()
            .map(|unit| {
                if !unit.is_active() {
                    return Decision::hold(unit.ai);
                }
                let Some(target) = unit.target_id.and_then(|id| view.get(id)) else {
                    return Decision::idle();
                };
                match unit.attack_type {
                    AttackType::Melee => decide_melee(unit, &view, target, tuning),
                    AttackType::Ranged => decide_ranged(unit, &view, target, tuning, rng),
                }
            })
            .collect()
    }

    fn apply(&mut self, decisions: Vec<Decision>, report: &mut TickReport) {
        let arena = self.arena;
        let mut strikes = Vec::new();

        for (unit, decision) in self
            .heroes
            .iter_mut()
            .chain(self.enemies.iter_mut())
            .zip(decisions)
        {
            if !unit.is_active() {
                continue;
            }
            unit.position = arena.clamp_position(unit.position + decision.delta);
            if unit.ai.state != decision.ai.state {
                trace!(unit = %unit.id, from = ?unit.ai.state, to = ?decision.ai.state, "State change");
            }
            unit.ai = decision.ai;

            if let Some(target) = decision.attack_target {
                if unit.can_attack() {
                    strikes.push((unit.id, target, unit.attack_damage));
                    unit.attack_cooldown_ticks = unit.attack_interval_ticks;
                }
            }
        }

        let death_ticks = self.tuning.death_animation_ticks;
        for (attacker, target, damage) in strikes {
            let Some(victim) = self.participant_mut(target) else {
                continue;
            };
            // Already killed earlier this tick.
            if !victim.is_active() {
                continue;
            }
            victim.current_hp -= damage;
            let lethal = victim.current_hp <= 0.0;
            if lethal {
                victim.begin_dying(death_ticks);
                report.deaths.push(target);
                debug!("{} killed {}", attacker, target);
            }
            report.attacks.push(AttackEvent {
                attacker,
                target,
                damage,
                lethal,
            });
        }
        self.attacks += report.attacks.len() as u64;
    }
}

/// Keeps a still-valid target, otherwise picks the nearest live opponent.
#[must_use]
pub fn resolve_target<'a>(unit: &Participant, view: &BattleView<'a>) -> Option<&'a Participant> {
    let opponents = view.side(unit.team.opponent());
    unit.target_id
        .and_then(|id| opponents.iter().find(|p| p.id == id && p.is_active()))
        .or_else(|| find_nearest_target(unit, opponents, &[]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::participant::AiState;
    use arena_common::{ArenaError, ConfigError};

    fn hero(id: u64, x: f32, y: f32) -> Participant {
        Participant::melee(ParticipantId::from_raw(id), Team::Hero, Vec2::new(x, y))
    }

    fn enemy(id: u64, x: f32, y: f32) -> Participant {
        Participant::melee(ParticipantId::from_raw(id), Team::Enemy, Vec2::new(x, y))
    }

    #[test]
    fn test_rejects_duplicate_ids() {
        let result = Battle::new(
            vec![hero(1, 100.0, 100.0)],
            vec![enemy(1, 300.0, 100.0)],
            ArenaDimensions::default(),
            AiTuning::default(),
            0,
        );
        assert!(matches!(
            result,
            Err(ArenaError::Scenario(ScenarioError::DuplicateId(_)))
        ));
    }

    #[test]
    fn test_rejects_wrong_team() {
        let result = Battle::new(
            vec![enemy(1, 100.0, 100.0)],
            vec![enemy(2, 300.0, 100.0)],
            ArenaDimensions::default(),
            AiTuning::default(),
            0,
        );
        assert!(matches!(
            result,
            Err(ArenaError::Scenario(ScenarioError::WrongTeam(_)))
        ));
    }

    #[test]
    fn test_rejects_bad_tuning() {
        let tuning = AiTuning {
            astar_max_iterations: 0,
            ..AiTuning::default()
        };
        let result = Battle::new(vec![], vec![], ArenaDimensions::default(), tuning, 0);
        assert!(matches!(
            result,
            Err(ArenaError::Config(ConfigError::ZeroIterationCap))
        ));
    }

    #[test]
    fn test_start_positions_clamped() {
        let battle = Battle::new(
            vec![hero(1, -50.0, 10_000.0)],
            vec![],
            ArenaDimensions::new(400.0, 300.0, 20.0),
            AiTuning::default(),
            0,
        )
        .expect("valid battle");
        assert_eq!(battle.heroes()[0].position, Vec2::new(10.0, 270.0));
    }

    #[test]
    fn test_resolve_target_keeps_valid_and_replaces_dead() {
        let mut dead = enemy(2, 110.0, 100.0);
        dead.begin_dying(30);
        let heroes = vec![hero(1, 100.0, 100.0).with_target(ParticipantId::from_raw(3))];
        let enemies = vec![dead, enemy(3, 300.0, 100.0), enemy(4, 200.0, 100.0)];
        let view = BattleView::new(&heroes, &enemies, ArenaDimensions::default());

        let kept = resolve_target(&heroes[0], &view);
        assert_eq!(kept.map(|p| p.id.raw()), Some(3));

        let retarget = heroes[0].clone().with_target(ParticipantId::from_raw(2));
        let replaced = resolve_target(&retarget, &view);
        assert_eq!(replaced.map(|p| p.id.raw()), Some(4));
    }

    #[test]
    fn test_kill_then_remove_after_animation() {
        let mut battle = Battle::new(
            vec![hero(1, 100.0, 100.0).with_attack(100.0, 20)],
            vec![enemy(2, 140.0, 100.0).with_hp(10.0)],
            ArenaDimensions::default(),
            AiTuning::default(),
            0,
        )
        .expect("valid battle");

        let first = battle.tick();
        assert_eq!(first.deaths, vec![ParticipantId::from_raw(2)]);
        assert!(first.attacks.iter().any(|a| a.lethal && a.attacker.raw() == 1));
        assert_eq!(battle.outcome(), Some(BattleOutcome::Victory(Team::Hero)));
        assert_eq!(battle.heroes()[0].attack_cooldown_ticks, 20);

        for _ in 1..30 {
            let report = battle.tick();
            assert!(report.removed.is_empty());
        }
        assert_eq!(battle.enemies().len(), 1);

        let last = battle.tick();
        assert_eq!(last.removed, vec![ParticipantId::from_raw(2)]);
        assert!(battle.enemies().is_empty());
    }

    #[test]
    fn test_attack_cadence_follows_interval() {
        let mut battle = Battle::new(
            vec![hero(1, 100.0, 100.0).with_attack(1.0, 5)],
            vec![enemy(2, 140.0, 100.0).with_hp(1000.0).with_attack(0.0, 5)],
            ArenaDimensions::default(),
            AiTuning::default(),
            0,
        )
        .expect("valid battle");

        let hero_attack_ticks: Vec<u64> = (0..16)
            .map(|_| battle.tick())
            .filter(|report| report.attacks.iter().any(|a| a.attacker.raw() == 1))
            .map(|report| report.tick)
            .collect();
        assert_eq!(hero_attack_ticks, vec![1, 6, 11, 16]);
    }

    #[test]
    fn test_melee_duel_is_decided() {
        let mut battle = Battle::new(
            vec![hero(1, 100.0, 300.0).with_attack(50.0, 20)],
            vec![enemy(2, 500.0, 300.0).with_hp(40.0).with_attack(1.0, 20)],
            ArenaDimensions::default(),
            AiTuning::default(),
            7,
        )
        .expect("valid battle");

        let summary = battle.run(1_000);
        assert_eq!(summary.outcome, Some(BattleOutcome::Victory(Team::Hero)));
        assert!(summary.attacks >= 1);
        assert_eq!(summary.survivors.len(), 1);
        assert!(summary.ticks < 1_000);
    }

    #[test]
    fn test_attackers_from_different_sides_both_engage() {
        let arena = ArenaDimensions::new(400.0, 400.0, 20.0);
        let heroes = vec![
            hero(1, 200.0, 100.0).with_attack_range(30.0).with_attack(0.0, 10),
            hero(3, 100.0, 200.0).with_attack_range(30.0).with_attack(0.0, 10),
        ];
        let enemies = vec![enemy(2, 200.0, 200.0)
            .with_speed(0.0)
            .with_hp(1_000.0)
            .with_attack(0.0, 10)];
        let mut battle =
            Battle::new(heroes, enemies, arena, AiTuning::default(), 1).expect("valid battle");

        let mut attackers = AHashSet::new();
        for _ in 0..200 {
            for attack in battle.tick().attacks {
                attackers.insert(attack.attacker.raw());
            }
        }

        assert!(attackers.contains(&1) && attackers.contains(&3));
        let [a, b] = [&battle.heroes()[0], &battle.heroes()[1]];
        assert_eq!(a.ai.state, AiState::Attacking);
        assert_eq!(b.ai.state, AiState::Attacking);
        assert!(a.position.distance(b.position) > arena.participant_size);
    }

    #[test]
    fn test_mirrored_attackers_both_engage() {
        let arena = ArenaDimensions::new(400.0, 400.0, 20.0);
        let heroes = vec![
            hero(1, 100.0, 180.0).with_attack_range(30.0).with_attack(0.0, 10),
            hero(3, 100.0, 220.0).with_attack_range(30.0).with_attack(0.0, 10),
        ];
        let enemies = vec![enemy(2, 200.0, 200.0)
            .with_speed(0.0)
            .with_hp(1_000.0)
            .with_attack(0.0, 10)];
        let mut battle =
            Battle::new(heroes, enemies, arena, AiTuning::default(), 1).expect("valid battle");

        let mut attackers = AHashSet::new();
        for _ in 0..300 {
            for attack in battle.tick().attacks {
                attackers.insert(attack.attacker.raw());
            }
            let [a, b] = [&battle.heroes()[0], &battle.heroes()[1]];
            assert!(a.position.distance(b.position) > 1.0, "attackers stacked at {}", a.position);
        }

        assert!(attackers.contains(&1) && attackers.contains(&3));
    }

    #[test]
    fn test_mixed_battle_is_reproducible() {
        let build = || {
            let heroes = vec![
                hero(1, 80.0, 250.0),
                Participant::ranged(ParticipantId::from_raw(2), Team::Hero, Vec2::new(60.0, 350.0)),
            ];
            let enemies = vec![
                enemy(3, 600.0, 250.0),
                Participant::ranged(ParticipantId::from_raw(4), Team::Enemy, Vec2::new(650.0, 350.0)),
            ];
            Battle::new(heroes, enemies, ArenaDimensions::default(), AiTuning::default(), 99)
                .expect("valid battle")
        };

        let mut first = build();
        let mut second = build();
        assert_eq!(first.run(400), second.run(400));
        assert_eq!(first.heroes(), second.heroes());
        assert_eq!(first.enemies(), second.enemies());
    }
}
