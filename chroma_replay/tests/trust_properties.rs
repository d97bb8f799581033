//! Property tests for trust scoring over arbitrary conflict histories.

use chroma_core::{
    ConflictSeverity, ThemeConflict, ThemeContribution, ThemeLevel, TrustScorer,
};
use proptest::prelude::*;

fn severity_from(tag: u8) -> ConflictSeverity {
    match tag % 3 {
        0 => ConflictSeverity::Info,
        1 => ConflictSeverity::Warning,
        _ => ConflictSeverity::Critical,
    }
}

fn conflict(index: usize, agent_id: Option<&str>, severity: ConflictSeverity) -> ThemeConflict {
    let mut contribution = ThemeContribution::new(ThemeLevel::Agent, "persona", 0.5);
    if let Some(id) = agent_id {
        contribution = contribution.with_agent(id);
    }
    ThemeConflict {
        id: format!("c-{}", index),
        timestamp: index as f64 * 100.0,
        severity,
        variable: "--background-color".to_string(),
        competing_themes: vec![contribution],
        reason: "property test".to_string(),
        auto_resolved: false,
    }
}

proptest! {
    /// However large the history, the final score stays in [0, 100].
    #[test]
    fn trust_stays_bounded(tags in proptest::collection::vec(0u8..3, 0..300)) {
        let conflicts: Vec<ThemeConflict> = tags
            .iter()
            .enumerate()
            .map(|(i, tag)| conflict(i, Some("agent-1"), severity_from(*tag)))
            .collect();

        let score = TrustScorer::new().compute_agent_trust("agent-1", &conflicts);
        prop_assert!(score.final_score >= 0.0);
        prop_assert!(score.final_score <= 100.0);
        prop_assert!(score.conflict_penalty >= 0.0);
    }

    /// Appending conflicts never raises an agent's score.
    #[test]
    fn trust_is_monotonically_non_increasing(tags in proptest::collection::vec(0u8..3, 1..100)) {
        let scorer = TrustScorer::new();
        let mut conflicts = Vec::new();
        let mut previous = scorer.compute_agent_trust("agent-1", &conflicts).final_score;

        for (i, tag) in tags.iter().enumerate() {
            conflicts.push(conflict(i, Some("agent-1"), severity_from(*tag)));
            let current = scorer.compute_agent_trust("agent-1", &conflicts).final_score;
            prop_assert!(current <= previous);
            previous = current;
        }
    }

    /// Conflicts involving other agents never move this agent's score.
    #[test]
    fn trust_is_isolated_per_agent(tags in proptest::collection::vec(0u8..3, 0..100)) {
        let own = vec![conflict(0, Some("agent-1"), ConflictSeverity::Warning)];

        let mut mixed = own.clone();
        mixed.extend(
            tags.iter()
                .enumerate()
                .map(|(i, tag)| conflict(i + 1, Some("agent-2"), severity_from(*tag))),
        );

        let scorer = TrustScorer::new();
        let isolated = scorer.compute_agent_trust("agent-1", &own);
        let among_others = scorer.compute_agent_trust("agent-1", &mixed);
        prop_assert_eq!(isolated.final_score, among_others.final_score);
    }
}
