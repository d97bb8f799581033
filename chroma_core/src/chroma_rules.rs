//! The "RULES" layer - Authority Hierarchy Configuration
//!
//! Defines the fixed five-tier theme authority ordering and the immutable
//! rule set every conflict check is keyed against:
//! - Variables that may never be overridden (contrast/safety/security signals)
//! - Per-level weight ceilings
//! - Per-level variable exclusivity
//!
//! A `RuleSet` is frozen after construction and dependency-injected into
//! the detector, so tests can substitute alternate rules without touching
//! globals.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// One of the five fixed theme authority tiers.
///
/// The canonical ranking (highest authority first) is
/// `Global > Sphere > Meeting > Agent > Overlay`. The ordering is fixed
/// at compile time and never reordered at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeLevel {
    Global,
    Sphere,
    Meeting,
    Agent,
    Overlay,
}

impl ThemeLevel {
    /// All levels in canonical authority order (index 0 = highest).
    pub const ALL: [ThemeLevel; 5] = [
        ThemeLevel::Global,
        ThemeLevel::Sphere,
        ThemeLevel::Meeting,
        ThemeLevel::Agent,
        ThemeLevel::Overlay,
    ];

    /// Lowercase name, matching the wire representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            ThemeLevel::Global => "global",
            ThemeLevel::Sphere => "sphere",
            ThemeLevel::Meeting => "meeting",
            ThemeLevel::Agent => "agent",
            ThemeLevel::Overlay => "overlay",
        }
    }
}

/// Severity of a detected theme conflict.
///
/// Ordered by operational weight: `Critical > Warning > Info`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConflictSeverity {
    Info,
    Warning,
    Critical,
}

impl ConflictSeverity {
    /// Lowercase name, matching the wire representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            ConflictSeverity::Info => "info",
            ConflictSeverity::Warning => "warning",
            ConflictSeverity::Critical => "critical",
        }
    }
}

/// Immutable authority-resolution configuration.
///
/// Not an active component - the contract every detector check is keyed
/// against. Construct once, hand to a `ConflictDetector`, never mutate.
#[derive(Debug, Clone)]
pub struct RuleSet {
    /// Variables that can never legitimately have more than one
    /// contributing level (contrast/safety/security signals).
    pub forbidden_overrides: HashSet<String>,

    /// Canonical authority ranking, index 0 = highest authority.
    pub dominance_order: [ThemeLevel; 5],

    /// Ceiling weight a contribution at each level may legitimately carry.
    pub max_weights: HashMap<ThemeLevel, f64>,

    /// Variables only one specific level is allowed to set; any other
    /// level touching them is a violation.
    pub exclusive_variables: HashMap<ThemeLevel, HashSet<String>>,
}

impl RuleSet {
    /// Returns the dominance rank of a level (0 = highest authority).
    pub fn dominance_rank(&self, level: ThemeLevel) -> usize {
        self.dominance_order
            .iter()
            .position(|l| *l == level)
            .unwrap_or(self.dominance_order.len())
    }

    /// Returns the weight ceiling for a level (1.0 if unconfigured).
    pub fn max_weight(&self, level: ThemeLevel) -> f64 {
        self.max_weights.get(&level).copied().unwrap_or(1.0)
    }

    /// Returns the level a variable is exclusive to, if any.
    pub fn exclusive_owner(&self, variable: &str) -> Option<ThemeLevel> {
        self.exclusive_variables
            .iter()
            .find(|(_, vars)| vars.contains(variable))
            .map(|(level, _)| *level)
    }
}

impl Default for RuleSet {
    /// The production rule set.
    fn default() -> Self {
        let forbidden_overrides: HashSet<String> = [
            "--contrast-ratio",
            "--safety-alert-color",
            "--security-badge-color",
            "--motion-reduced",
        ]
        .into_iter()
        .map(String::from)
        .collect();

        let max_weights = HashMap::from([
            (ThemeLevel::Global, 1.0),
            (ThemeLevel::Sphere, 0.5),
            (ThemeLevel::Meeting, 0.9),
            (ThemeLevel::Agent, 0.6),
            (ThemeLevel::Overlay, 0.9),
        ]);

        let exclusive_variables = HashMap::from([
            (
                ThemeLevel::Sphere,
                ["--sphere-horizon-color"]
                    .into_iter()
                    .map(String::from)
                    .collect(),
            ),
            (
                ThemeLevel::Meeting,
                ["--meeting-timer-color", "--agenda-accent"]
                    .into_iter()
                    .map(String::from)
                    .collect(),
            ),
            (
                ThemeLevel::Agent,
                ["--agent-aura-color"]
                    .into_iter()
                    .map(String::from)
                    .collect(),
            ),
            (
                ThemeLevel::Overlay,
                ["--overlay-backdrop"]
                    .into_iter()
                    .map(String::from)
                    .collect(),
            ),
        ]);

        Self {
            forbidden_overrides,
            dominance_order: ThemeLevel::ALL,
            max_weights,
            exclusive_variables,
        }
    }
}
