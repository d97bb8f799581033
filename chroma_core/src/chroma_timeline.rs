//! The "TIMELINE" Engine - Bounded Session Recording
//!
//! Records an unbounded stream of theme state snapshots into a bounded,
//! replayable history:
//! - Snapshots live in a fixed-capacity FIFO window (`VecDeque` ring,
//!   O(1) eviction of the oldest entry)
//! - Conflicts found by the inline detector are appended to an
//!   append-only log that grows for the life of the session
//! - `record()` returns just the conflicts newly found in that call, so a
//!   live caller can react without re-scanning history
//!
//! The recorder is the single mutator of its timeline. Callers must
//! serialize `record()`/`clear()` on one instance; readers of an exported
//! timeline are unrestricted.

use crate::chroma_conflict::{ConflictDetector, ThemeConflict, ThemeStateSnapshot};
use crate::chroma_rules::{ConflictSeverity, RuleSet};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use thiserror::Error;

/// Default snapshot window capacity.
pub const DEFAULT_MAX_SNAPSHOTS: usize = 1000;

/// Export failures.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Export format `{0}` is produced by external tooling from the JSON export")]
    ExternalFormat(&'static str),
}

/// Declared export targets for a recorded timeline.
///
/// Only `Json` is produced by this engine; `Pdf` and `XrReplay` are
/// rendered downstream from the JSON export.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Pdf,
    XrReplay,
}

/// A recorded session: bounded snapshot window + append-only conflict log.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeTimeline {
    /// Session this timeline belongs to
    pub session_id: String,

    /// Ordered snapshot window (oldest first), bounded by the recorder
    pub snapshots: VecDeque<ThemeStateSnapshot>,

    /// Every conflict found during the session, in detection order
    pub conflicts: Vec<ThemeConflict>,
}

impl ThemeTimeline {
    /// Aggregate counters and session duration.
    pub fn stats(&self) -> TimelineStats {
        let mut stats = TimelineStats {
            total_snapshots: self.snapshots.len(),
            total_conflicts: self.conflicts.len(),
            ..TimelineStats::default()
        };

        for conflict in &self.conflicts {
            match conflict.severity {
                ConflictSeverity::Info => stats.info_count += 1,
                ConflictSeverity::Warning => stats.warning_count += 1,
                ConflictSeverity::Critical => stats.critical_count += 1,
            }
        }

        if let (Some(first), Some(last)) = (self.snapshots.front(), self.snapshots.back()) {
            stats.session_duration_ms = last.timestamp - first.timestamp;
        }

        stats
    }
}

/// Aggregate counters over a recorded timeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineStats {
    pub total_snapshots: usize,
    pub total_conflicts: usize,
    pub info_count: usize,
    pub warning_count: usize,
    pub critical_count: usize,

    /// Last snapshot timestamp minus first (ms); 0 for empty sessions
    pub session_duration_ms: f64,
}

/// Stateful bounded recorder - the only mutator of a `ThemeTimeline`.
pub struct TimelineRecorder {
    timeline: ThemeTimeline,
    detector: ConflictDetector,
    max_snapshots: usize,
}

impl TimelineRecorder {
    /// Creates a recorder with the default window capacity.
    pub fn new(session_id: impl Into<String>, rules: RuleSet) -> Self {
        Self::with_capacity(session_id, rules, DEFAULT_MAX_SNAPSHOTS)
    }

    /// Creates a recorder with an explicit window capacity.
    pub fn with_capacity(
        session_id: impl Into<String>,
        rules: RuleSet,
        max_snapshots: usize,
    ) -> Self {
        Self {
            timeline: ThemeTimeline {
                session_id: session_id.into(),
                snapshots: VecDeque::with_capacity(max_snapshots.min(DEFAULT_MAX_SNAPSHOTS)),
                conflicts: Vec::new(),
            },
            detector: ConflictDetector::new(rules),
            max_snapshots,
        }
    }

    /// Appends a snapshot, detects its conflicts, and returns only the
    /// conflicts newly found in this call.
    ///
    /// Evicts the oldest snapshot when the window is at capacity. The
    /// conflict log is never trimmed within a session.
    pub fn record(&mut self, snapshot: ThemeStateSnapshot) -> Vec<ThemeConflict> {
        let new_conflicts = self.detector.detect(&snapshot);

        if self.timeline.snapshots.len() >= self.max_snapshots {
            self.timeline.snapshots.pop_front();
        }
        self.timeline.snapshots.push_back(snapshot);

        self.timeline.conflicts.extend(new_conflicts.iter().cloned());
        new_conflicts
    }

    /// Returns the snapshot at `index`, or `None` if out of range.
    pub fn get_snapshot(&self, index: usize) -> Option<&ThemeStateSnapshot> {
        self.timeline.snapshots.get(index)
    }

    /// Returns snapshots with `t0 <= timestamp <= t1`, in recorded order.
    pub fn snapshots_in_range(&self, t0: f64, t1: f64) -> Vec<&ThemeStateSnapshot> {
        self.timeline
            .snapshots
            .iter()
            .filter(|s| s.timestamp >= t0 && s.timestamp <= t1)
            .collect()
    }

    /// Returns conflicts of the given severity, in detection order.
    pub fn conflicts_by_severity(&self, severity: ConflictSeverity) -> Vec<&ThemeConflict> {
        self.timeline
            .conflicts
            .iter()
            .filter(|c| c.severity == severity)
            .collect()
    }

    /// Returns conflicts over the named variable, in detection order.
    pub fn conflicts_for_variable(&self, variable: &str) -> Vec<&ThemeConflict> {
        self.timeline
            .conflicts
            .iter()
            .filter(|c| c.variable == variable)
            .collect()
    }

    /// Read-only view of the timeline.
    pub fn timeline(&self) -> &ThemeTimeline {
        &self.timeline
    }

    /// Returns a plain serializable copy of the full timeline.
    pub fn export(&self) -> ThemeTimeline {
        self.timeline.clone()
    }

    /// Serializes the full timeline as pretty-printed JSON.
    ///
    /// An empty timeline exports as an empty-but-well-formed structure.
    pub fn export_json(&self) -> Result<String, ExportError> {
        Ok(serde_json::to_string_pretty(&self.timeline)?)
    }

    /// Exports in the requested format.
    ///
    /// Only `Json` is native; the other declared targets are produced by
    /// external tooling consuming the JSON export.
    pub fn export_as(&self, format: ExportFormat) -> Result<String, ExportError> {
        match format {
            ExportFormat::Json => self.export_json(),
            ExportFormat::Pdf => Err(ExportError::ExternalFormat("pdf")),
            ExportFormat::XrReplay => Err(ExportError::ExternalFormat("xr-replay")),
        }
    }

    /// Aggregate counters and session duration.
    pub fn stats(&self) -> TimelineStats {
        self.timeline.stats()
    }

    /// Resets both the snapshot window and the conflict log.
    ///
    /// Irreversible; used only at a session boundary.
    pub fn clear(&mut self) {
        self.timeline.snapshots.clear();
        self.timeline.conflicts.clear();
    }
}
