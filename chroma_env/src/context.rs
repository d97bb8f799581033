//! Core environment context trait for the Chroma engines.

use async_trait::async_trait;
use std::time::Duration;

/// The central interface for environment interaction.
///
/// This trait abstracts suspension so that the replay engine can run in
/// both production (tokio) and virtual-time (test) environments.
///
/// # Implementations
///
/// - **Production**: `TokioContext` - wraps `tokio::time`
/// - **Virtual**: `VirtualContext` - `sleep` records the requested delay
///   and returns immediately
#[async_trait]
pub trait ChromaContext: Send + Sync + 'static {
    /// Suspends execution for the given duration.
    ///
    /// In production: wraps `tokio::time::sleep`
    /// In virtual mode: records the delay and returns
    async fn sleep(&self, duration: Duration);
}
