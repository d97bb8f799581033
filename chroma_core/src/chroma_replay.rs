//! The "REPLAY" Engine - Timed Timeline Playback
//!
//! Read-only, advisory playback of a recorded `ThemeTimeline`. Not an
//! editor: replay can never write back to the timeline.
//!
//! # State machine
//!
//! `idle → playing ⇄ paused → stopped(→idle)`
//!
//! Each step emits the snapshot at the cursor, emits the conflicts
//! coincident with it, advances the cursor, and suspends for
//! `(next.timestamp - current.timestamp) / speed`, floored at one
//! rendering frame (16 ms) so a zero or negative delta never causes
//! runaway scheduling.
//!
//! # Cancellation
//!
//! The playback triple `(status, cursor, speed)` lives behind one mutex
//! together with a generation counter. `pause()`/`stop()` bump the
//! generation before returning; a sleeping step observes the stale
//! generation on wake and exits without emitting, so no frame callback
//! fires after `pause()`/`stop()` return.

use crate::chroma_conflict::{ThemeConflict, ThemeStateSnapshot};
use crate::chroma_timeline::ThemeTimeline;
use chroma_env::ChromaContext;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Slowest allowed playback multiplier.
pub const MIN_SPEED: f64 = 0.1;

/// Fastest allowed playback multiplier.
pub const MAX_SPEED: f64 = 10.0;

/// Minimum inter-frame delay (one rendering frame).
pub const MIN_FRAME_MS: f64 = 16.0;

/// Playback lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReplayStatus {
    Idle,
    Playing,
    Paused,
    Stopped,
}

type FrameCallback = Box<dyn Fn(usize, &ThemeStateSnapshot) + Send + Sync>;
type ConflictCallback = Box<dyn Fn(&ThemeConflict) + Send + Sync>;

struct PlaybackShared {
    status: ReplayStatus,
    cursor: usize,
    speed: f64,
    generation: u64,
}

struct ReplayInner {
    timeline: Arc<ThemeTimeline>,
    shared: Mutex<PlaybackShared>,
    on_frame: FrameCallback,
    on_conflict: ConflictCallback,
}

/// Cooperative playback scheduler over an immutable timeline.
///
/// Cloning yields a control handle over the same playback session, so a
/// frame callback (or any other logical owner) can pause, seek, or stop
/// a running replay. Multiple engines may read the same timeline.
pub struct ReplayEngine {
    inner: Arc<ReplayInner>,
}

impl Clone for ReplayEngine {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl ReplayEngine {
    /// Creates an idle engine over the given timeline.
    ///
    /// `on_frame` receives `(index, snapshot)` for every emitted frame;
    /// `on_conflict` receives each conflict coincident with an emitted
    /// snapshot's timestamp.
    pub fn new<F, C>(timeline: Arc<ThemeTimeline>, on_frame: F, on_conflict: C) -> Self
    where
        F: Fn(usize, &ThemeStateSnapshot) + Send + Sync + 'static,
        C: Fn(&ThemeConflict) + Send + Sync + 'static,
    {
        Self {
            inner: Arc::new(ReplayInner {
                timeline,
                shared: Mutex::new(PlaybackShared {
                    status: ReplayStatus::Idle,
                    cursor: 0,
                    speed: 1.0,
                    generation: 0,
                }),
                on_frame: Box::new(on_frame),
                on_conflict: Box::new(on_conflict),
            }),
        }
    }

    /// Current lifecycle state.
    pub fn status(&self) -> ReplayStatus {
        self.inner.shared.lock().unwrap().status
    }

    /// Current playback cursor.
    pub fn cursor(&self) -> usize {
        self.inner.shared.lock().unwrap().cursor
    }

    /// Current speed multiplier.
    pub fn speed(&self) -> f64 {
        self.inner.shared.lock().unwrap().speed
    }

    /// Sets the speed multiplier, clamped to `[0.1, 10]`.
    ///
    /// Takes effect on the next scheduled step, not retroactively.
    pub fn set_speed(&self, multiplier: f64) {
        let mut s = self.inner.shared.lock().unwrap();
        s.speed = multiplier.clamp(MIN_SPEED, MAX_SPEED);
    }

    /// Drives playback from the current cursor until the end of the
    /// timeline, a `pause()`, or a `stop()`.
    ///
    /// Runs to completion on the caller's task; a clone of the engine
    /// serves as the control handle while it runs. Calling `play` while
    /// already playing is a no-op.
    pub async fn play<Ctx: ChromaContext>(&self, ctx: &Ctx) {
        let generation = {
            let mut s = self.inner.shared.lock().unwrap();
            if s.status == ReplayStatus::Playing {
                return;
            }
            s.status = ReplayStatus::Playing;
            s.generation += 1;
            s.generation
        };

        loop {
            // Decide the step under the lock; emit outside it so
            // callbacks can call back into the engine.
            let (index, delay) = {
                let mut s = self.inner.shared.lock().unwrap();
                if s.generation != generation || s.status != ReplayStatus::Playing {
                    return;
                }

                let snapshots = &self.inner.timeline.snapshots;
                let index = s.cursor;
                let current = match snapshots.get(index) {
                    Some(snapshot) => snapshot,
                    None => {
                        // End of timeline: normal termination
                        s.status = ReplayStatus::Stopped;
                        s.cursor = 0;
                        return;
                    }
                };

                s.cursor = index + 1;
                let delay = snapshots.get(index + 1).map(|next| {
                    let ms = ((next.timestamp - current.timestamp) / s.speed).max(MIN_FRAME_MS);
                    Duration::from_secs_f64(ms / 1000.0)
                });
                (index, delay)
            };

            self.emit(index);

            match delay {
                Some(delay) => ctx.sleep(delay).await,
                None => {
                    // Last frame emitted
                    let mut s = self.inner.shared.lock().unwrap();
                    if s.generation == generation {
                        s.status = ReplayStatus::Stopped;
                        s.cursor = 0;
                    }
                    return;
                }
            }
        }
    }

    /// Re-enters playback from the paused cursor. No-op unless paused.
    pub async fn resume<Ctx: ChromaContext>(&self, ctx: &Ctx) {
        {
            let s = self.inner.shared.lock().unwrap();
            if s.status != ReplayStatus::Paused {
                return;
            }
        }
        self.play(ctx).await;
    }

    /// Pauses playback, retaining the cursor.
    ///
    /// Any scheduled step is cancelled before this returns.
    pub fn pause(&self) {
        let mut s = self.inner.shared.lock().unwrap();
        if s.status == ReplayStatus::Playing {
            s.status = ReplayStatus::Paused;
            s.generation += 1;
        }
    }

    /// Stops playback and resets the cursor to 0.
    ///
    /// Distinct from `pause()`: there is no implicit resume. Any
    /// scheduled step is cancelled before this returns.
    pub fn stop(&self) {
        let mut s = self.inner.shared.lock().unwrap();
        s.status = ReplayStatus::Stopped;
        s.cursor = 0;
        s.generation += 1;
    }

    /// Clamps `index` into range, makes it the playback cursor regardless
    /// of current state, and immediately emits that snapshot out-of-band.
    pub fn seek(&self, index: usize) {
        let clamped = {
            let mut s = self.inner.shared.lock().unwrap();
            let len = self.inner.timeline.snapshots.len();
            if len == 0 {
                return;
            }
            let clamped = index.min(len - 1);
            s.cursor = clamped;
            clamped
        };
        self.emit(clamped);
    }

    /// Emits the snapshot at `index` and its coincident conflicts.
    fn emit(&self, index: usize) {
        let snapshot = match self.inner.timeline.snapshots.get(index) {
            Some(snapshot) => snapshot,
            None => return,
        };

        (self.inner.on_frame)(index, snapshot);

        for conflict in &self.inner.timeline.conflicts {
            if (conflict.timestamp - snapshot.timestamp).abs() < f64::EPSILON {
                (self.inner.on_conflict)(conflict);
            }
        }
    }
}

// ============================================================================
// PLAYBACK REDUCER
// ============================================================================

/// One observable playback event, as surfaced by the engine callbacks.
#[derive(Debug, Clone, PartialEq)]
pub enum PlaybackEvent {
    /// A snapshot was emitted
    Frame { index: usize, timestamp: f64 },

    /// A conflict coincident with the emitted snapshot
    Conflict(ThemeConflict),

    /// The engine changed lifecycle state
    Status(ReplayStatus),
}

/// Cross-cutting playback state as a plain value.
///
/// UI layers fold `PlaybackEvent`s into this with `reduce`, decoupled
/// from any framework lifecycle.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackState {
    pub status: ReplayStatus,
    pub cursor: usize,
    pub conflicts: Vec<ThemeConflict>,
}

impl PlaybackState {
    /// Initial (idle) state.
    pub fn new() -> Self {
        Self {
            status: ReplayStatus::Idle,
            cursor: 0,
            conflicts: Vec::new(),
        }
    }

    /// Folds one event into the state.
    pub fn reduce(mut self, event: PlaybackEvent) -> Self {
        match event {
            PlaybackEvent::Frame { index, .. } => {
                self.cursor = index;
            }
            PlaybackEvent::Conflict(conflict) => {
                self.conflicts.push(conflict);
            }
            PlaybackEvent::Status(status) => {
                self.status = status;
                if status == ReplayStatus::Stopped {
                    self.cursor = 0;
                }
            }
        }
        self
    }
}

impl Default for PlaybackState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chroma_conflict::{SnapshotContext, ThemeContribution};
    use crate::chroma_rules::{ConflictSeverity, RuleSet, ThemeLevel};
    use crate::chroma_timeline::TimelineRecorder;
    use crate::chroma_trust::TrustScorer;
    use chroma_env::VirtualContext;
    use std::collections::BTreeMap;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn snapshot_at(timestamp: f64) -> ThemeStateSnapshot {
        ThemeStateSnapshot {
            timestamp,
            active_themes: vec![ThemeContribution::new(ThemeLevel::Global, "base", 0.8)],
            resolved_variables: BTreeMap::from([(
                "--background-color".to_string(),
                "#101014".to_string(),
            )]),
            context: SnapshotContext::default(),
        }
    }

    fn timeline_with(timestamps: &[f64]) -> Arc<ThemeTimeline> {
        Arc::new(ThemeTimeline {
            session_id: "replay-test".to_string(),
            snapshots: timestamps.iter().copied().map(snapshot_at).collect::<VecDeque<_>>(),
            conflicts: Vec::new(),
        })
    }

    fn collecting_engine(
        timeline: Arc<ThemeTimeline>,
    ) -> (ReplayEngine, Arc<Mutex<Vec<f64>>>, Arc<Mutex<Vec<ThemeConflict>>>) {
        let frames = Arc::new(Mutex::new(Vec::new()));
        let conflicts = Arc::new(Mutex::new(Vec::new()));
        let frames_cb = Arc::clone(&frames);
        let conflicts_cb = Arc::clone(&conflicts);

        let engine = ReplayEngine::new(
            timeline,
            move |_, snapshot| frames_cb.lock().unwrap().push(snapshot.timestamp),
            move |conflict| conflicts_cb.lock().unwrap().push(conflict.clone()),
        );
        (engine, frames, conflicts)
    }

    #[tokio::test]
    async fn test_full_replay_emits_in_timestamp_order() {
        let (engine, frames, _) = collecting_engine(timeline_with(&[0.0, 1000.0, 2000.0]));
        let ctx = VirtualContext::new();

        engine.play(&ctx).await;

        let emitted = frames.lock().unwrap().clone();
        assert_eq!(emitted, vec![0.0, 1000.0, 2000.0]);
        assert!(emitted.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(
            ctx.recorded_sleeps(),
            vec![Duration::from_secs(1), Duration::from_secs(1)]
        );
        assert_eq!(engine.status(), ReplayStatus::Stopped);
        assert_eq!(engine.cursor(), 0);
    }

    #[tokio::test]
    async fn test_zero_delta_floors_at_one_frame() {
        let (engine, frames, _) = collecting_engine(timeline_with(&[100.0, 100.0, 105.0]));
        let ctx = VirtualContext::new();

        engine.play(&ctx).await;

        assert_eq!(frames.lock().unwrap().len(), 3);
        assert_eq!(
            ctx.recorded_sleeps(),
            vec![Duration::from_millis(16), Duration::from_millis(16)]
        );
    }

    #[tokio::test]
    async fn test_speed_divides_step_delay() {
        let (engine, _, _) = collecting_engine(timeline_with(&[0.0, 1000.0]));
        let ctx = VirtualContext::new();

        engine.set_speed(2.0);
        engine.play(&ctx).await;

        assert_eq!(ctx.recorded_sleeps(), vec![Duration::from_millis(500)]);
    }

    #[test]
    fn test_set_speed_clamps() {
        let (engine, _, _) = collecting_engine(timeline_with(&[0.0]));

        engine.set_speed(100.0);
        assert_eq!(engine.speed(), MAX_SPEED);

        engine.set_speed(0.001);
        assert_eq!(engine.speed(), MIN_SPEED);
    }

    #[test]
    fn test_seek_clamps_and_emits_out_of_band() {
        let (engine, frames, _) = collecting_engine(timeline_with(&[0.0, 1000.0, 2000.0]));

        engine.seek(99);

        assert_eq!(engine.cursor(), 2);
        assert_eq!(frames.lock().unwrap().clone(), vec![2000.0]);
        // Seeking does not start playback
        assert_eq!(engine.status(), ReplayStatus::Idle);
    }

    #[test]
    fn test_seek_on_empty_timeline_is_a_no_op() {
        let (engine, frames, _) = collecting_engine(timeline_with(&[]));

        engine.seek(5);

        assert!(frames.lock().unwrap().is_empty());
        assert_eq!(engine.cursor(), 0);
    }

    #[tokio::test]
    async fn test_pause_from_frame_callback_and_resume() {
        let timeline = timeline_with(&[0.0, 1000.0, 2000.0]);
        let frames = Arc::new(Mutex::new(Vec::new()));
        let frames_cb = Arc::clone(&frames);
        let emitted = Arc::new(AtomicUsize::new(0));
        let emitted_cb = Arc::clone(&emitted);
        let pause_slot: Arc<Mutex<Option<ReplayEngine>>> = Arc::new(Mutex::new(None));
        let pause_slot_cb = Arc::clone(&pause_slot);

        let engine = ReplayEngine::new(
            timeline,
            move |_, snapshot| {
                frames_cb.lock().unwrap().push(snapshot.timestamp);
                // Pause after the first frame only
                if emitted_cb.fetch_add(1, Ordering::SeqCst) == 0 {
                    if let Some(handle) = pause_slot_cb.lock().unwrap().as_ref() {
                        handle.pause();
                    }
                }
            },
            |_| {},
        );
        *pause_slot.lock().unwrap() = Some(engine.clone());

        let ctx = VirtualContext::new();
        engine.play(&ctx).await;

        // Only the first frame fired; cursor retained for resume
        assert_eq!(frames.lock().unwrap().clone(), vec![0.0]);
        assert_eq!(engine.status(), ReplayStatus::Paused);
        assert_eq!(engine.cursor(), 1);

        engine.resume(&ctx).await;

        assert_eq!(frames.lock().unwrap().clone(), vec![0.0, 1000.0, 2000.0]);
        assert_eq!(engine.status(), ReplayStatus::Stopped);
    }

    #[tokio::test]
    async fn test_stop_resets_cursor_and_restarts_from_zero() {
        let (engine, frames, _) = collecting_engine(timeline_with(&[0.0, 1000.0]));
        let ctx = VirtualContext::new();

        engine.seek(1);
        engine.stop();
        assert_eq!(engine.status(), ReplayStatus::Stopped);
        assert_eq!(engine.cursor(), 0);

        frames.lock().unwrap().clear();
        engine.play(&ctx).await;
        assert_eq!(frames.lock().unwrap().clone(), vec![0.0, 1000.0]);
    }

    #[tokio::test]
    async fn test_resume_is_a_no_op_unless_paused() {
        let (engine, frames, _) = collecting_engine(timeline_with(&[0.0, 1000.0]));
        let ctx = VirtualContext::new();

        engine.resume(&ctx).await;
        assert!(frames.lock().unwrap().is_empty());
        assert_eq!(engine.status(), ReplayStatus::Idle);
    }

    #[test]
    fn test_playback_reducer() {
        let conflict = ThemeConflict {
            id: "c-1".to_string(),
            timestamp: 1000.0,
            severity: ConflictSeverity::Info,
            variable: "--background-color".to_string(),
            competing_themes: Vec::new(),
            reason: "test".to_string(),
            auto_resolved: false,
        };

        let state = PlaybackState::new();
        assert_eq!(state.status, ReplayStatus::Idle);

        let state = state
            .reduce(PlaybackEvent::Status(ReplayStatus::Playing))
            .reduce(PlaybackEvent::Frame {
                index: 0,
                timestamp: 0.0,
            })
            .reduce(PlaybackEvent::Frame {
                index: 1,
                timestamp: 1000.0,
            })
            .reduce(PlaybackEvent::Conflict(conflict.clone()));

        assert_eq!(state.status, ReplayStatus::Playing);
        assert_eq!(state.cursor, 1);
        assert_eq!(state.conflicts, vec![conflict]);

        let state = state.reduce(PlaybackEvent::Status(ReplayStatus::Stopped));
        assert_eq!(state.status, ReplayStatus::Stopped);
        assert_eq!(state.cursor, 0);
    }

    /// End-to-end: record, score, replay one session.
    #[tokio::test]
    async fn test_record_score_replay_session() {
        let mut recorder = TimelineRecorder::new("session-e2e", RuleSet::default());

        // t=0 and t=2000 are clean; t=1000 introduces a forbidden-variable
        // conflict attributed to agent-7.
        assert!(recorder.record(snapshot_at(0.0)).is_empty());

        let offending = ThemeStateSnapshot {
            timestamp: 1000.0,
            active_themes: vec![
                ThemeContribution::new(ThemeLevel::Global, "base", 0.8),
                ThemeContribution::new(ThemeLevel::Agent, "persona", 0.5)
                    .with_agent("agent-7"),
            ],
            resolved_variables: BTreeMap::from([(
                "--safety-alert-color".to_string(),
                "#ff00ff".to_string(),
            )]),
            context: SnapshotContext::default(),
        };
        let new_conflicts = recorder.record(offending);
        assert_eq!(new_conflicts.len(), 1);
        assert_eq!(new_conflicts[0].severity, ConflictSeverity::Critical);

        assert!(recorder.record(snapshot_at(2000.0)).is_empty());

        // 80 base - 5 critical penalty
        let scorer = TrustScorer::new();
        let trust = scorer.compute_agent_trust("agent-7", &recorder.timeline().conflicts);
        assert_eq!(trust.final_score, 75.0);

        // Replay: three frames ~1000ms apart, one conflict at the second
        let (engine, frames, conflicts) =
            collecting_engine(Arc::new(recorder.export()));
        let ctx = VirtualContext::new();
        engine.play(&ctx).await;

        assert_eq!(frames.lock().unwrap().clone(), vec![0.0, 1000.0, 2000.0]);
        assert_eq!(
            ctx.recorded_sleeps(),
            vec![Duration::from_secs(1), Duration::from_secs(1)]
        );
        let replayed = conflicts.lock().unwrap().clone();
        assert_eq!(replayed.len(), 1);
        assert_eq!(replayed[0].timestamp, 1000.0);
    }
}
