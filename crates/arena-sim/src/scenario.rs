//! Battle scenarios.
//!
//! A scenario is a TOML file describing the arena, the RNG seed, optional AI
//! tuning overrides, and the participants on both sides. Every field except
//! the participant list has a default.
//!
//! ```toml
//! name = "duel"
//! seed = 7
//!
//! [arena]
//! width = 800.0
//! height = 600.0
//! participant_size = 40.0
//!
//! [[participants]]
//! id = 1
//! team = "hero"
//! attack_type = "melee"
//! x = 100.0
//! y = 300.0
//! ```

use arena_ai::{AiTuning, AttackType, Battle, Participant, Team};
use arena_common::{ArenaDimensions, ArenaError, ArenaResult, ParticipantId, Vec2};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::info;

/// Default tick limit for a scenario.
pub const DEFAULT_MAX_TICKS: u64 = 3_000;

/// A battle setup loaded from disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Scenario {
    /// Display name
    pub name: String,
    /// Seed for the battle RNG
    pub seed: u64,
    /// Ticks to simulate before giving up
    pub max_ticks: u64,
    /// Arena bounds and participant size
    pub arena: ArenaDimensions,
    /// AI tuning overrides
    pub tuning: AiTuning,
    /// Everyone taking part
    pub participants: Vec<ParticipantSpec>,
}

impl Default for Scenario {
    fn default() -> Self {
        Self {
            name: "unnamed".to_owned(),
            seed: 0,
            max_ticks: DEFAULT_MAX_TICKS,
            arena: ArenaDimensions::default(),
            tuning: AiTuning::default(),
            participants: Vec::new(),
        }
    }
}

/// One participant entry. Unset stats keep the defaults for its attack type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticipantSpec {
    /// Unique id within the scenario
    pub id: u64,
    /// Side
    pub team: Team,
    /// Melee or ranged
    pub attack_type: AttackType,
    /// Start X
    pub x: f32,
    /// Start Y
    pub y: f32,
    /// Attack range override
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attack_range: Option<f32>,
    /// Preferred firing distance (ranged)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ideal_range: Option<f32>,
    /// Movement per tick
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed: Option<f32>,
    /// Health
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hp: Option<f32>,
    /// Damage per attack
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub damage: Option<f32>,
    /// Ticks between attacks
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attack_interval_ticks: Option<u32>,
}

impl ParticipantSpec {
    /// Entry with default stats.
    #[must_use]
    pub fn new(id: u64, team: Team, attack_type: AttackType, x: f32, y: f32) -> Self {
        Self {
            id,
            team,
            attack_type,
            x,
            y,
            attack_range: None,
            ideal_range: None,
            speed: None,
            hp: None,
            damage: None,
            attack_interval_ticks: None,
        }
    }

    /// Builds the participant this entry describes.
    #[must_use]
    pub fn to_participant(&self) -> Participant {
        let mut participant = Participant::new(
            ParticipantId::from_raw(self.id),
            self.team,
            self.attack_type,
            Vec2::new(self.x, self.y),
        );
        if let Some(range) = self.attack_range {
            participant = participant.with_attack_range(range);
        }
        if let Some(range) = self.ideal_range {
            participant = participant.with_ideal_range(range);
        }
        if let Some(speed) = self.speed {
            participant = participant.with_speed(speed);
        }
        if let Some(hp) = self.hp {
            participant = participant.with_hp(hp);
        }
        let damage = self.damage.unwrap_or(participant.attack_damage);
        let interval = self
            .attack_interval_ticks
            .unwrap_or(participant.attack_interval_ticks);
        participant.with_attack(damage, interval)
    }
}

impl Scenario {
    /// Load a scenario from a TOML file.
    pub fn load_from<P: AsRef<Path>>(path: P) -> ArenaResult<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)?;
        let scenario = Self::from_toml(&contents)?;
        info!(
            "Loaded scenario '{}' from {} ({} participants)",
            scenario.name,
            path.display(),
            scenario.participants.len()
        );
        Ok(scenario)
    }

    /// Parse a scenario from TOML text.
    pub fn from_toml(contents: &str) -> ArenaResult<Self> {
        toml::from_str(contents).map_err(|e| ArenaError::Serialization(e.to_string()))
    }

    /// The built-in three-on-three skirmish.
    #[must_use]
    pub fn skirmish() -> Self {
        use AttackType::{Melee, Ranged};
        use Team::{Enemy, Hero};

        let mut archer = ParticipantSpec::new(3, Hero, Ranged, 80.0, 300.0);
        archer.ideal_range = Some(180.0);

        Self {
            name: "skirmish".to_owned(),
            seed: 42,
            participants: vec![
                ParticipantSpec::new(1, Hero, Melee, 140.0, 220.0),
                ParticipantSpec::new(2, Hero, Melee, 140.0, 380.0),
                archer,
                ParticipantSpec::new(4, Enemy, Melee, 640.0, 220.0),
                ParticipantSpec::new(5, Enemy, Melee, 640.0, 380.0),
                ParticipantSpec::new(6, Enemy, Ranged, 720.0, 300.0),
            ],
            ..Self::default()
        }
    }

    /// Validates the setup and creates the battle.
    pub fn build_battle(&self) -> ArenaResult<Battle> {
        let (heroes, enemies): (Vec<_>, Vec<_>) = self
            .participants
            .iter()
            .map(ParticipantSpec::to_participant)
            .partition(|p| p.team == Team::Hero);

        Battle::new(heroes, enemies, self.arena, self.tuning.clone(), self.seed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arena_common::{ConfigError, ScenarioError};
    use std::io::Write;
    use tempfile::NamedTempFile;

    const DUEL: &str = r#"
name = "duel"
seed = 7
max_ticks = 500

[arena]
width = 600.0
height = 400.0
participant_size = 30.0

[tuning]
astar_max_iterations = 150

[[participants]]
id = 1
team = "hero"
attack_type = "melee"
x = 100.0
y = 200.0
damage = 40.0

[[participants]]
id = 2
team = "enemy"
attack_type = "ranged"
x = 450.0
y = 200.0
ideal_range = 150.0
hp = 80.0
"#;

    #[test]
    fn test_parse_duel() {
        let scenario = Scenario::from_toml(DUEL).expect("valid scenario");
        assert_eq!(scenario.name, "duel");
        assert_eq!(scenario.max_ticks, 500);
        assert_eq!(scenario.arena, ArenaDimensions::new(600.0, 400.0, 30.0));
        assert_eq!(scenario.tuning.astar_max_iterations, 150);
        // Untouched tuning keeps its defaults.
        assert_eq!(scenario.tuning.congestion_penalty, AiTuning::default().congestion_penalty);

        let archer = scenario.participants[1].to_participant();
        assert_eq!(archer.team, Team::Enemy);
        assert_eq!(archer.attack_type, AttackType::Ranged);
        assert_eq!(archer.ideal_range, Some(150.0));
        assert_eq!(archer.max_hp, 80.0);
    }

    #[test]
    fn test_load_from_file_and_run() {
        let mut file = NamedTempFile::new().expect("temp file");
        file.write_all(DUEL.as_bytes()).expect("write scenario");

        let scenario = Scenario::load_from(file.path()).expect("load scenario");
        let mut battle = scenario.build_battle().expect("valid battle");
        let summary = battle.run(scenario.max_ticks);
        assert!(summary.ticks <= scenario.max_ticks);
        assert!(summary.attacks > 0);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result = Scenario::load_from("/nonexistent/path/scenario.toml");
        assert!(matches!(result, Err(ArenaError::Io(_))));
    }

    #[test]
    fn test_malformed_toml_is_serialization_error() {
        let result = Scenario::from_toml("participants = 3");
        assert!(matches!(result, Err(ArenaError::Serialization(_))));
    }

    #[test]
    fn test_duplicate_ids_rejected_at_build() {
        let mut scenario = Scenario::skirmish();
        scenario.participants[1].id = 1;
        assert!(matches!(
            scenario.build_battle(),
            Err(ArenaError::Scenario(ScenarioError::DuplicateId(_)))
        ));
    }

    #[test]
    fn test_bad_arena_rejected_at_build() {
        let scenario = Scenario {
            arena: ArenaDimensions::new(50.0, 50.0, 40.0),
            ..Scenario::skirmish()
        };
        assert!(matches!(
            scenario.build_battle(),
            Err(ArenaError::Config(ConfigError::ArenaTooSmall { .. }))
        ));
    }

    #[test]
    fn test_skirmish_round_trips_through_toml() {
        let skirmish = Scenario::skirmish();
        let text = toml::to_string_pretty(&skirmish).expect("serialize");
        assert!(text.contains("team = \"hero\""));
        assert_eq!(Scenario::from_toml(&text).expect("parse"), skirmish);
    }

    #[test]
    fn test_skirmish_sides_engage() {
        let scenario = Scenario::skirmish();
        let mut battle = scenario.build_battle().expect("valid battle");
        let summary = battle.run(scenario.max_ticks);
        assert!(summary.attacks > 0);
        assert!(summary.ticks <= scenario.max_ticks);
    }
}
