//! Chroma Core - Theme Authority Conflict & Trust Engine
//!
//! This library solves three problems in a multi-writer theming system:
//! 1. **Competing Writers**: Rule-based conflict detection across a fixed
//!    five-tier authority hierarchy (global → sphere → meeting → agent → overlay)
//! 2. **Unbounded History**: Bounded, replayable recording of theme state
//!    snapshots and the conflicts they carry
//! 3. **Reputation**: A bounded per-agent trust score derived from the
//!    conflict history, consumed by presentation layers

pub mod chroma_conflict;
pub mod chroma_replay;
pub mod chroma_rules;
pub mod chroma_timeline;
pub mod chroma_trust;
pub mod presentation;

// Re-export key types for convenience
pub use chroma_conflict::{
    ConflictDetector, SnapshotContext, ThemeConflict, ThemeContribution, ThemeStateSnapshot,
};
pub use chroma_replay::{PlaybackEvent, PlaybackState, ReplayEngine, ReplayStatus};
pub use chroma_rules::{ConflictSeverity, RuleSet, ThemeLevel};
pub use chroma_timeline::{
    ExportError, ExportFormat, ThemeTimeline, TimelineRecorder, TimelineStats,
};
pub use chroma_trust::{AgentTrustScore, TrustScorer};
