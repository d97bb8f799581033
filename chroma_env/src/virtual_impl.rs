//! Virtual-time context for deterministic playback testing.

use crate::ChromaContext;
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Virtual context whose `sleep` never waits.
///
/// Every requested sleep is logged and returns immediately, so tests can
/// drive a full playback in one call and assert on the exact delays the
/// scheduler asked for.
pub struct VirtualContext {
    /// Every sleep requested through this context, in order
    sleeps: Arc<Mutex<Vec<Duration>>>,
}

impl VirtualContext {
    /// Creates a new VirtualContext with an empty sleep log.
    pub fn new() -> Self {
        Self {
            sleeps: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Returns every sleep requested so far, in order.
    pub fn recorded_sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().unwrap().clone()
    }
}

impl Default for VirtualContext {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for VirtualContext {
    fn clone(&self) -> Self {
        Self {
            sleeps: Arc::clone(&self.sleeps),
        }
    }
}

#[async_trait]
impl ChromaContext for VirtualContext {
    async fn sleep(&self, duration: Duration) {
        // In virtual mode, sleeping is recorded instead of waited out
        self.sleeps.lock().unwrap().push(duration);
    }
}
