//! Chroma Session Harness
//!
//! Generates seeded synthetic theme sessions, records them through the
//! conflict engine, and replays them:
//! - **Scenarios**: deterministic snapshot generators (clean session,
//!   weight abuse, forbidden override, rogue overlay agent)
//! - **Report**: formatted session summary with per-agent trust
//!
//! All entropy derives from a single 64-bit seed, so any interesting
//! session is reproducible via its seed number.

pub mod report;
pub mod scenarios;

pub use report::SessionReport;
pub use scenarios::ScenarioId;
