//! Synthetic session scenarios for the conflict engine.
//!
//! Each scenario produces a deterministic stream of theme state snapshots
//! from a seed, exercising one class of authority violation.

use chroma_core::{SnapshotContext, ThemeContribution, ThemeLevel, ThemeStateSnapshot};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::collections::BTreeMap;
use std::str::FromStr;

/// Scenario identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScenarioId {
    /// CHR-001: single-owner variables throughout, zero conflicts expected
    CleanSession,

    /// CHR-002: an agent persona repeatedly exceeds its weight ceiling
    WeightAbuse,

    /// CHR-003: an agent persona touches a protected safety variable
    ForbiddenOverride,

    /// CHR-004: a low-authority overlay outweighs the global base theme
    RogueOverlay,
}

impl ScenarioId {
    /// Returns a list of all scenarios.
    pub fn all() -> Vec<ScenarioId> {
        vec![
            ScenarioId::CleanSession,
            ScenarioId::WeightAbuse,
            ScenarioId::ForbiddenOverride,
            ScenarioId::RogueOverlay,
        ]
    }

    /// CLI name of the scenario.
    pub fn name(&self) -> &'static str {
        match self {
            ScenarioId::CleanSession => "clean",
            ScenarioId::WeightAbuse => "weight-abuse",
            ScenarioId::ForbiddenOverride => "forbidden-override",
            ScenarioId::RogueOverlay => "rogue-overlay",
        }
    }

    /// One-line description for `--list`.
    pub fn description(&self) -> &'static str {
        match self {
            ScenarioId::CleanSession => "single-owner variables, no conflicts",
            ScenarioId::WeightAbuse => "agent persona above its weight ceiling",
            ScenarioId::ForbiddenOverride => "protected safety variable contested",
            ScenarioId::RogueOverlay => "overlay outweighing the global base",
        }
    }
}

impl FromStr for ScenarioId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ScenarioId::all()
            .into_iter()
            .find(|id| id.name() == s)
            .ok_or_else(|| format!("unknown scenario `{}`", s))
    }
}

/// Generates `count` snapshots for a scenario, ~250ms apart with seeded
/// jitter. Same (scenario, seed, count) always yields the same stream.
pub fn generate(scenario: ScenarioId, seed: u64, count: usize) -> Vec<ThemeStateSnapshot> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut snapshots = Vec::with_capacity(count);
    let mut timestamp = 0.0_f64;

    for _ in 0..count {
        snapshots.push(build_snapshot(scenario, timestamp, &mut rng));
        timestamp += 250.0 + rng.gen_range(0.0..50.0);
    }

    snapshots
}

fn build_snapshot(
    scenario: ScenarioId,
    timestamp: f64,
    rng: &mut ChaCha8Rng,
) -> ThemeStateSnapshot {
    let base = ThemeContribution::new(ThemeLevel::Global, "atrium-base", 0.8);

    let mut resolved_variables = BTreeMap::from([
        ("--background-color".to_string(), "#101014".to_string()),
        ("--accent-color".to_string(), "#64d2ff".to_string()),
        ("--text-color".to_string(), "#f2f2f7".to_string()),
    ]);

    let active_themes = match scenario {
        ScenarioId::CleanSession => vec![base],

        ScenarioId::WeightAbuse => vec![
            base,
            // Agent ceiling is 0.6
            ThemeContribution::new(
                ThemeLevel::Agent,
                "persona-maximal",
                rng.gen_range(0.65..0.95),
            )
            .with_agent("agent-3"),
        ],

        ScenarioId::ForbiddenOverride => {
            resolved_variables
                .insert("--safety-alert-color".to_string(), "#ff00ff".to_string());
            vec![
                base,
                ThemeContribution::new(ThemeLevel::Agent, "persona-loud", 0.5)
                    .with_agent("agent-7"),
            ]
        }

        ScenarioId::RogueOverlay => vec![
            // Weak base so the overlay outweighs it while staying well
            // under the overlay's 0.9 ceiling
            ThemeContribution::new(ThemeLevel::Global, "atrium-base", 0.2),
            ThemeContribution::new(
                ThemeLevel::Overlay,
                "confetti",
                rng.gen_range(0.21..0.29),
            )
            .with_agent("agent-9"),
        ],
    };

    ThemeStateSnapshot {
        timestamp,
        active_themes,
        resolved_variables,
        context: SnapshotContext {
            sphere_id: Some("sphere-atrium".to_string()),
            meeting_id: None,
            agent_ids: None,
        },
    }
}
