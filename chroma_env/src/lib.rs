//! Chroma Environment Abstraction Layer
//!
//! This crate provides the "Sans-IO" abstraction allowing the Chroma
//! replay scheduler to run against both **Production** (tokio) and
//! **Virtual** (recorded, never-waiting) time sources.
//!
//! # Core Concept
//!
//! The replay engine suspends between emitted frames. By intercepting
//! `sleep()` behind a trait, the exact same step loop runs in production
//! at wall-clock speed and in tests at virtual speed, making every
//! playback deterministic and instantaneous to verify.
//!
//! # Example
//!
//! ```ignore
//! use chroma_env::{ChromaContext, TokioContext};
//!
//! async fn step_loop<Ctx: ChromaContext>(ctx: &Ctx) {
//!     loop {
//!         emit_frame();
//!         ctx.sleep(Duration::from_millis(16)).await;
//!     }
//! }
//! ```

mod context;
mod tokio_impl;
mod virtual_impl;

pub use context::ChromaContext;
pub use tokio_impl::TokioContext;
pub use virtual_impl::VirtualContext;
