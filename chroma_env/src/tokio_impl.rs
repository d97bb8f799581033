//! Production implementation of ChromaContext using Tokio.

use crate::ChromaContext;
use async_trait::async_trait;
use std::time::Duration;

/// Production context backed by Tokio.
///
/// This is the "real" implementation used in production deployments.
/// Sleeps actually suspend the calling task.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioContext;

impl TokioContext {
    /// Creates a new TokioContext.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ChromaContext for TokioContext {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
