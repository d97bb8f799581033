//! The "CONFLICT" Engine - Authority Violation Detection
//!
//! Resolves competing writers to shared theme state under the fixed
//! authority hierarchy. Given one immutable state snapshot, `detect()`
//! returns the violations present in it, checked in precedence order:
//!
//! 1. **Forbidden override** (critical) - a protected variable with
//!    multiple contributors
//! 2. **Weight ceiling** (warning) - a contribution above its level's cap
//! 3. **Exclusivity** (warning) - a variable touched outside its owning level
//! 4. **Dominance** (info) - a lower-authority contribution outweighing a
//!    higher-authority one
//!
//! First match wins; one conflict record per variable. Detection is a pure
//! function of `(RuleSet, snapshot)` - it never mutates its input. The
//! conflict id is the single non-derivable field (a fresh v4 UUID).

use crate::chroma_rules::{ConflictSeverity, RuleSet, ThemeLevel};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use uuid::Uuid;

/// One theme's attempt to set variables at a given authority and intensity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeContribution {
    /// Authority tier this contribution acts at
    pub level: ThemeLevel,

    /// Identifier of the contributing theme
    pub theme_id: String,

    /// Intensity in 0..1, capped per level by the rule set
    pub weight: f64,

    /// Agent responsible for this contribution, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent_id: Option<String>,

    /// Variable keys this contribution declares it writes.
    ///
    /// When present, conflict detection attributes ownership exactly.
    /// When `None`, the contribution is treated as a candidate owner of
    /// every resolved variable (the upstream snapshot format does not
    /// always track per-key ownership).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variables: Option<HashSet<String>>,
}

impl ThemeContribution {
    /// Creates a contribution with no declared variables or agent.
    pub fn new(level: ThemeLevel, theme_id: impl Into<String>, weight: f64) -> Self {
        Self {
            level,
            theme_id: theme_id.into(),
            weight,
            agent_id: None,
            variables: None,
        }
    }

    /// Attaches the responsible agent id.
    pub fn with_agent(mut self, agent_id: impl Into<String>) -> Self {
        self.agent_id = Some(agent_id.into());
        self
    }

    /// Declares the exact variable keys this contribution writes.
    pub fn with_variables<I, S>(mut self, variables: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.variables = Some(variables.into_iter().map(Into::into).collect());
        self
    }

    /// Returns true if this contribution plausibly set `variable`.
    fn touches(&self, variable: &str) -> bool {
        match &self.variables {
            Some(vars) => vars.contains(variable),
            None => true,
        }
    }
}

/// Context attached to a snapshot (which sphere/meeting/agents were active).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotContext {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sphere_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub meeting_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent_ids: Option<Vec<String>>,
}

/// One immutable theme state snapshot - the unit of record.
///
/// Produced by the external theme-resolution layer once per meaningful
/// state change; this engine has no knowledge of how `resolved_variables`
/// was computed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeStateSnapshot {
    /// Milliseconds since session epoch
    pub timestamp: f64,

    /// Themes contributing at the moment of capture
    pub active_themes: Vec<ThemeContribution>,

    /// Final resolved variable map (ordered for stable export)
    pub resolved_variables: BTreeMap<String, String>,

    /// Where in the system this snapshot was taken
    #[serde(default)]
    pub context: SnapshotContext,
}

/// A detected authority violation. Produced once, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeConflict {
    /// Unique id within a timeline (v4 UUID)
    pub id: String,

    /// Timestamp of the snapshot this conflict was found in (ms)
    pub timestamp: f64,

    /// Operational weight of the violation
    pub severity: ConflictSeverity,

    /// The contested variable
    pub variable: String,

    /// Every contribution competing for the variable
    pub competing_themes: Vec<ThemeContribution>,

    /// Human-readable cause
    pub reason: String,

    /// True when the hierarchy resolved the conflict without input
    /// (protected variables always resolve to the highest authority)
    pub auto_resolved: bool,
}

impl ThemeConflict {
    /// Returns true if the given agent was party to this conflict.
    pub fn involves_agent(&self, agent_id: &str) -> bool {
        self.competing_themes
            .iter()
            .any(|c| c.agent_id.as_deref() == Some(agent_id))
    }
}

/// Pure conflict detector over a frozen rule set.
#[derive(Debug, Clone)]
pub struct ConflictDetector {
    rules: RuleSet,
}

impl ConflictDetector {
    /// Creates a detector bound to the given rule set.
    pub fn new(rules: RuleSet) -> Self {
        Self { rules }
    }

    /// Returns the rule set this detector checks against.
    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Detects every authority violation present in one snapshot.
    ///
    /// Deterministic given `(RuleSet, snapshot)` apart from the generated
    /// conflict ids. Returns `[]` for a snapshot with no multi-owner
    /// variables - multiple contributors peacefully coexisting is not
    /// itself an error.
    pub fn detect(&self, snapshot: &ThemeStateSnapshot) -> Vec<ThemeConflict> {
        let mut conflicts = Vec::new();

        for variable in snapshot.resolved_variables.keys() {
            let contributors: Vec<&ThemeContribution> = snapshot
                .active_themes
                .iter()
                .filter(|c| c.touches(variable))
                .collect();

            // Single contributor: no conflict possible
            if contributors.len() < 2 {
                continue;
            }

            if let Some(conflict) =
                self.check_variable(variable, &contributors, snapshot.timestamp)
            {
                conflicts.push(conflict);
            }
        }

        conflicts
    }

    /// Runs the precedence-ordered checks for one contested variable.
    fn check_variable(
        &self,
        variable: &str,
        contributors: &[&ThemeContribution],
        timestamp: f64,
    ) -> Option<ThemeConflict> {
        // Check 1: Forbidden override (critical, auto-resolved)
        if self.rules.forbidden_overrides.contains(variable) {
            return Some(self.build_conflict(
                variable,
                contributors,
                timestamp,
                ConflictSeverity::Critical,
                format!(
                    "protected variable `{}` has {} competing themes",
                    variable,
                    contributors.len()
                ),
                true,
            ));
        }

        // Check 2: Weight ceiling violation (warning)
        // Flag the contributor with the largest excess over its ceiling.
        let worst_offender = contributors
            .iter()
            .filter(|c| c.weight > self.rules.max_weight(c.level))
            .max_by(|a, b| {
                let excess_a = a.weight - self.rules.max_weight(a.level);
                let excess_b = b.weight - self.rules.max_weight(b.level);
                excess_a.total_cmp(&excess_b)
            });
        if let Some(offender) = worst_offender {
            return Some(self.build_conflict(
                variable,
                contributors,
                timestamp,
                ConflictSeverity::Warning,
                format!(
                    "theme `{}` at level {} carries weight {:.2}, above the {:.2} ceiling",
                    offender.theme_id,
                    offender.level.as_str(),
                    offender.weight,
                    self.rules.max_weight(offender.level)
                ),
                false,
            ));
        }

        // Check 3: Exclusivity violation (warning)
        if let Some(owner) = self.rules.exclusive_owner(variable) {
            if let Some(intruder) = contributors.iter().find(|c| c.level != owner) {
                return Some(self.build_conflict(
                    variable,
                    contributors,
                    timestamp,
                    ConflictSeverity::Warning,
                    format!(
                        "variable `{}` is exclusive to level {}, but theme `{}` contributes from {}",
                        variable,
                        owner.as_str(),
                        intruder.theme_id,
                        intruder.level.as_str()
                    ),
                    false,
                ));
            }
        }

        // Check 4: Dominance violation (info)
        // Sort by authority, then look for a lower-authority contributor
        // carrying strictly greater weight than a higher-authority one.
        let mut by_authority: Vec<&ThemeContribution> = contributors.to_vec();
        by_authority.sort_by_key(|c| self.rules.dominance_rank(c.level));

        for (i, senior) in by_authority.iter().enumerate() {
            for junior in by_authority.iter().skip(i + 1) {
                if self.rules.dominance_rank(junior.level)
                    > self.rules.dominance_rank(senior.level)
                    && junior.weight > senior.weight
                {
                    return Some(self.build_conflict(
                        variable,
                        contributors,
                        timestamp,
                        ConflictSeverity::Info,
                        format!(
                            "theme `{}` ({}, weight {:.2}) outweighs `{}` ({}, weight {:.2})",
                            junior.theme_id,
                            junior.level.as_str(),
                            junior.weight,
                            senior.theme_id,
                            senior.level.as_str(),
                            senior.weight
                        ),
                        false,
                    ));
                }
            }
        }

        None
    }

    fn build_conflict(
        &self,
        variable: &str,
        contributors: &[&ThemeContribution],
        timestamp: f64,
        severity: ConflictSeverity,
        reason: String,
        auto_resolved: bool,
    ) -> ThemeConflict {
        ThemeConflict {
            id: Uuid::new_v4().to_string(),
            timestamp,
            severity,
            variable: variable.to_string(),
            competing_themes: contributors.iter().map(|c| (*c).clone()).collect(),
            reason,
            auto_resolved,
        }
    }
}
