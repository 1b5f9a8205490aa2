//! # Arena Sim
//!
//! Headless battle runner for the arena combat AI.
//!
//! Loads a scenario (or uses the built-in skirmish), runs the battle until one
//! side is wiped out or the tick limit is reached, and prints a summary.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

mod scenario;

use anyhow::{Context, Result};
use arena_ai::{BattleOutcome, BattleSummary, Team};
use clap::Parser;
use scenario::Scenario;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Run an arena battle without a renderer
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Scenario file (TOML); the built-in skirmish when omitted
    scenario: Option<PathBuf>,

    /// Print the summary as JSON
    #[arg(long)]
    json: bool,

    /// Override the scenario's tick limit
    #[arg(long)]
    max_ticks: Option<u64>,

    /// Override the scenario's RNG seed
    #[arg(long)]
    seed: Option<u64>,
}

/// Main entry point.
fn main() -> Result<()> {
    // Logs go to stderr so `--json` output stays machine-readable.
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env().add_directive("arena=info".parse()?))
        .init();

    let args = Args::parse();
    info!("Arena sim starting...");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let mut scenario = match &args.scenario {
        Some(path) => Scenario::load_from(path)
            .with_context(|| format!("failed to load scenario {}", path.display()))?,
        None => {
            info!("No scenario given, using the built-in skirmish");
            Scenario::skirmish()
        },
    };
    if let Some(max_ticks) = args.max_ticks {
        scenario.max_ticks = max_ticks;
    }
    if let Some(seed) = args.seed {
        scenario.seed = seed;
    }

    let mut battle = scenario
        .build_battle()
        .with_context(|| format!("invalid scenario '{}'", scenario.name))?;
    let summary = battle.run(scenario.max_ticks);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("{}", render_summary(&scenario.name, &summary));
    }
    Ok(())
}

/// Human-readable summary.
fn render_summary(name: &str, summary: &BattleSummary) -> String {
    let verdict = match summary.outcome {
        Some(BattleOutcome::Victory(Team::Hero)) => "heroes win".to_owned(),
        Some(BattleOutcome::Victory(Team::Enemy)) => "enemies win".to_owned(),
        Some(BattleOutcome::Draw) => "draw".to_owned(),
        None => format!("undecided after {} ticks", summary.ticks),
    };

    let mut out = format!(
        "Scenario '{name}': {verdict}\nTicks: {}\nAttacks: {}\nSurvivors: {}",
        summary.ticks,
        summary.attacks,
        summary.survivors.len()
    );
    for survivor in &summary.survivors {
        out.push_str(&format!(
            "\n  {} {:?} {:?} hp {:.1} at ({:.1}, {:.1})",
            survivor.id,
            survivor.team,
            survivor.attack_type,
            survivor.hp,
            survivor.position.x,
            survivor.position.y
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use arena_ai::{AttackType, Survivor};
    use arena_common::{ParticipantId, Vec2};

    #[test]
    fn test_args_parse() {
        let args = Args::parse_from(["arena-sim", "duel.toml", "--json", "--max-ticks", "50"]);
        assert_eq!(args.scenario, Some(PathBuf::from("duel.toml")));
        assert!(args.json);
        assert_eq!(args.max_ticks, Some(50));
        assert!(args.seed.is_none());
    }

    #[test]
    fn test_args_default_to_skirmish() {
        let args = Args::parse_from(["arena-sim"]);
        assert!(args.scenario.is_none());
        assert!(!args.json);
    }

    #[test]
    fn test_render_summary() {
        let summary = BattleSummary {
            outcome: Some(BattleOutcome::Victory(Team::Hero)),
            ticks: 120,
            attacks: 9,
            survivors: vec![Survivor {
                id: ParticipantId::from_raw(1),
                team: Team::Hero,
                attack_type: AttackType::Melee,
                hp: 64.0,
                position: Vec2::new(300.0, 200.0),
            }],
        };

        let text = render_summary("duel", &summary);
        assert!(text.starts_with("Scenario 'duel': heroes win"));
        assert!(text.contains("Ticks: 120"));
        assert!(text.contains("#1 Hero Melee hp 64.0 at (300.0, 200.0)"));
    }

    #[test]
    fn test_summary_json_shape() {
        let summary = BattleSummary {
            outcome: Some(BattleOutcome::Draw),
            ticks: 1,
            attacks: 0,
            survivors: vec![],
        };
        let json = serde_json::to_string(&summary).expect("serialize");
        assert!(json.contains("\"outcome\":\"Draw\""));
    }
}
