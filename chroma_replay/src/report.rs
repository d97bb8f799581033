//! Formatted session report: timeline stats plus per-agent trust.

use chroma_core::{presentation, AgentTrustScore, TimelineStats};
use std::collections::HashMap;

/// Final session report with aggregate counters and trust standings.
#[derive(Debug, Clone)]
pub struct SessionReport {
    pub session_id: String,
    pub stats: TimelineStats,
    pub trust: HashMap<String, AgentTrustScore>,
}

impl SessionReport {
    pub fn new(
        session_id: impl Into<String>,
        stats: TimelineStats,
        trust: HashMap<String, AgentTrustScore>,
    ) -> Self {
        Self {
            session_id: session_id.into(),
            stats,
            trust,
        }
    }

    /// Print formatted report to console
    pub fn print(&self) {
        println!();
        println!("╔══════════════════════════════════════════════════════════════╗");
        println!("║                    CHROMA SESSION REPORT                     ║");
        println!("╠══════════════════════════════════════════════════════════════╣");
        println!("║ Session:               {:>20}                  ║", self.session_id);
        println!("║ Snapshots (window):    {:>10}                            ║", self.stats.total_snapshots);
        println!("║ Duration:              {:>10.1} s                          ║", self.stats.session_duration_ms / 1000.0);
        println!("╠══════════════════════════════════════════════════════════════╣");
        println!("║ CONFLICTS                                                    ║");
        println!("╠══════════════════════════════════════════════════════════════╣");
        println!("║ Total:                 {:>10}                            ║", self.stats.total_conflicts);
        println!("║ Critical:              {:>10}                            ║", self.stats.critical_count);
        println!("║ Warning:               {:>10}                            ║", self.stats.warning_count);
        println!("║ Info:                  {:>10}                            ║", self.stats.info_count);
        println!("╚══════════════════════════════════════════════════════════════╝");

        if !self.trust.is_empty() {
            println!();
            println!("Agent Trust Standings:");
            println!("─────────────────────────────────────────────────────────");
            println!("  Agent ID        Penalty    Final    Aura");
            println!("─────────────────────────────────────────────────────────");

            let mut rows: Vec<&AgentTrustScore> = self.trust.values().collect();
            rows.sort_by(|a, b| a.agent_id.cmp(&b.agent_id));

            for score in rows {
                let aura = presentation::aura_style(score.final_score);
                println!(
                    "  {:<14}  {:>7.1}  {:>7.1}    {}",
                    score.agent_id, score.conflict_penalty, score.final_score, aura.glow_color
                );
            }
        }
    }
}
