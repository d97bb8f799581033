//! The "TRUST" Engine - Derived Agent Reputation
//!
//! Computes a bounded reputation signal per agent from the conflict
//! history. Scores are derived, recomputed on demand, and never persisted
//! as a source of truth:
//!
//! ```text
//! final = clamp(base(80) - sum(per-severity penalty) + behavior(0), 0, 100)
//! ```
//!
//! Penalties: info 0.5, warning 2.0, critical 5.0. Holding the behavior
//! score fixed, an agent's score is monotonically non-increasing as more
//! of its conflicts are recorded.

use crate::chroma_conflict::ThemeConflict;
use crate::chroma_rules::ConflictSeverity;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Starting reputation for an agent with a clean history.
pub const DEFAULT_BASE_SCORE: f64 = 80.0;

/// A bounded, derived reputation value for one agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentTrustScore {
    pub agent_id: String,

    /// Score before any conflict history is applied
    pub base_score: f64,

    /// Cumulative penalty from conflicts this agent was party to (>= 0)
    pub conflict_penalty: f64,

    /// Reserved extension point; currently always 0
    pub behavior_score: f64,

    /// Clamped to [0, 100]
    pub final_score: f64,
}

/// Pure trust computation over a conflict history.
#[derive(Debug, Clone)]
pub struct TrustScorer {
    base_score: f64,
}

impl TrustScorer {
    /// Creates a scorer with the default base score (80).
    pub fn new() -> Self {
        Self {
            base_score: DEFAULT_BASE_SCORE,
        }
    }

    /// Creates a scorer with an explicit base score.
    ///
    /// Agents absent from the conflict history are absent from any
    /// result set; callers needing a default score for them apply this
    /// base themselves.
    pub fn with_base_score(base_score: f64) -> Self {
        Self { base_score }
    }

    /// Fixed penalty applied per conflict of the given severity.
    pub fn severity_penalty(severity: ConflictSeverity) -> f64 {
        match severity {
            ConflictSeverity::Info => 0.5,
            ConflictSeverity::Warning => 2.0,
            ConflictSeverity::Critical => 5.0,
        }
    }

    /// Computes one agent's trust from the given conflict history.
    ///
    /// Only conflicts where the agent appears among the competing
    /// contributions count against it.
    pub fn compute_agent_trust(
        &self,
        agent_id: &str,
        conflicts: &[ThemeConflict],
    ) -> AgentTrustScore {
        let conflict_penalty: f64 = conflicts
            .iter()
            .filter(|c| c.involves_agent(agent_id))
            .map(|c| Self::severity_penalty(c.severity))
            .sum();

        let behavior_score = 0.0;
        let final_score =
            (self.base_score - conflict_penalty + behavior_score).clamp(0.0, 100.0);

        AgentTrustScore {
            agent_id: agent_id.to_string(),
            base_score: self.base_score,
            conflict_penalty,
            behavior_score,
            final_score,
        }
    }

    /// Computes trust for every agent appearing in any conflict.
    ///
    /// Agents never influence each other's score; an agent party to zero
    /// conflicts is absent from the result.
    pub fn compute_all_agent_trust(
        &self,
        conflicts: &[ThemeConflict],
    ) -> HashMap<String, AgentTrustScore> {
        let mut agent_ids: Vec<&str> = conflicts
            .iter()
            .flat_map(|c| c.competing_themes.iter())
            .filter_map(|t| t.agent_id.as_deref())
            .collect();
        agent_ids.sort_unstable();
        agent_ids.dedup();

        agent_ids
            .into_iter()
            .map(|id| (id.to_string(), self.compute_agent_trust(id, conflicts)))
            .collect()
    }
}

impl Default for TrustScorer {
    fn default() -> Self {
        Self::new()
    }
}
