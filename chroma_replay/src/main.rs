//! Chroma Replay CLI
//!
//! Generates a seeded synthetic theme session (or loads an exported
//! timeline), records it through the conflict engine, prints a session
//! report with per-agent trust, and optionally replays it at wall-clock
//! speed.

use chroma_core::{
    presentation, ReplayEngine, RuleSet, ThemeTimeline, TimelineRecorder, TrustScorer,
};
use chroma_env::TokioContext;
use chroma_replay::scenarios::{self, ScenarioId};
use chroma_replay::SessionReport;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

/// Chroma theme session recorder and replay tool
#[derive(Parser, Debug)]
#[command(name = "chroma-replay")]
#[command(about = "Record and replay synthetic theme sessions", long_about = None)]
struct Args {
    /// Scenario to generate (clean, weight-abuse, forbidden-override, rogue-overlay)
    #[arg(short = 'S', long, default_value = "rogue-overlay")]
    scenario: String,

    /// List available scenarios and exit
    #[arg(long)]
    list: bool,

    /// Master seed for determinism
    #[arg(short, long, default_value = "42")]
    seed: u64,

    /// Number of snapshots to generate
    #[arg(short = 'n', long, default_value = "40")]
    snapshots: usize,

    /// Replay the recorded session after the report
    #[arg(long)]
    replay: bool,

    /// Playback speed multiplier (clamped to 0.1..10)
    #[arg(long, default_value = "4.0")]
    speed: f64,

    /// Write the timeline JSON export to this path
    #[arg(long)]
    export: Option<PathBuf>,

    /// Replay a previously exported timeline instead of generating one
    #[arg(long)]
    input: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Initialize logging
    let level = if args.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");

    if args.list {
        for id in ScenarioId::all() {
            println!("{:<20} {}", id.name(), id.description());
        }
        return;
    }

    let timeline = match build_timeline(&args) {
        Ok(timeline) => timeline,
        Err(message) => {
            error!("{}", message);
            std::process::exit(1);
        }
    };

    let trust = TrustScorer::new().compute_all_agent_trust(&timeline.conflicts);
    SessionReport::new(timeline.session_id.clone(), timeline.stats(), trust).print();

    if let Some(path) = &args.export {
        match serde_json::to_string_pretty(&timeline) {
            Ok(json) => {
                if let Err(e) = std::fs::write(path, json) {
                    error!("Failed to write export: {:?}", e);
                    std::process::exit(1);
                }
                info!(
                    "Exported {} snapshots / {} conflicts to {}",
                    timeline.snapshots.len(),
                    timeline.conflicts.len(),
                    path.display()
                );
            }
            Err(e) => {
                error!("Failed to serialize timeline: {:?}", e);
                std::process::exit(1);
            }
        }
    }

    if args.replay {
        replay(Arc::new(timeline), args.speed).await;
    }
}

/// Either loads an exported timeline or generates and records a scenario.
fn build_timeline(args: &Args) -> Result<ThemeTimeline, String> {
    if let Some(path) = &args.input {
        let json = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
        return serde_json::from_str(&json)
            .map_err(|e| format!("Failed to parse {}: {}", path.display(), e));
    }

    let scenario: ScenarioId = args.scenario.parse().map_err(|e| {
        format!(
            "{}. Available scenarios: clean, weight-abuse, forbidden-override, rogue-overlay",
            e
        )
    })?;

    info!(
        "Recording scenario `{}` (seed={}, snapshots={})",
        scenario.name(),
        args.seed,
        args.snapshots
    );

    let session_id = format!("{}-{}", scenario.name(), args.seed);
    let mut recorder = TimelineRecorder::new(session_id, RuleSet::default());
    for snapshot in scenarios::generate(scenario, args.seed, args.snapshots) {
        let new_conflicts = recorder.record(snapshot);
        for conflict in &new_conflicts {
            tracing::debug!(
                "t={:.0}ms [{}] {}",
                conflict.timestamp,
                conflict.severity.as_str(),
                conflict.reason
            );
        }
    }

    Ok(recorder.export())
}

/// Replays the timeline at the given speed, logging frames and conflicts.
async fn replay(timeline: Arc<ThemeTimeline>, speed: f64) {
    let total = timeline.snapshots.len();
    info!("Replaying {} frames at {}x", total, speed);

    let engine = ReplayEngine::new(
        timeline,
        move |index, snapshot| {
            info!(
                "frame {}/{} t={:.0}ms ({} themes)",
                index + 1,
                total,
                snapshot.timestamp,
                snapshot.active_themes.len()
            );
        },
        |conflict| {
            let style = presentation::conflict_style(conflict.severity);
            info!(
                "  conflict [{}] {} ({})",
                conflict.severity.as_str(),
                conflict.reason,
                style.color
            );
        },
    );
    engine.set_speed(speed);

    let ctx = TokioContext::new();
    engine.play(&ctx).await;
    info!("Replay finished");
}
