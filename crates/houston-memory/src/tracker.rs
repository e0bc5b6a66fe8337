use async_trait::async_trait;
use std::sync::Mutex;

use houston_core::{TrackEvent, Tracker};

#[derive(Debug, Default)]
pub struct MemoryTracker {
    events: Mutex<Vec<TrackEvent>>,
    failing: bool,
}

impl MemoryTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// A tracker that rejects every event.
    pub fn failing() -> Self {
        Self {
            events: Mutex::new(Vec::new()),
            failing: true,
        }
    }

    pub fn events(&self) -> Vec<TrackEvent> {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

#[async_trait]
impl Tracker for MemoryTracker {
    async fn track(&self, event: &TrackEvent) -> anyhow::Result<()> {
        if self.failing {
            return Err(anyhow::anyhow!("tracking unavailable"));
        }

        self.events
            .lock()
            .map_err(|_| anyhow::anyhow!("failed to acquire lock"))?
            .push(event.clone());

        Ok(())
    }
}
