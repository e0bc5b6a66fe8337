use houston_core::{TrackEvent, Tracker};
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Best-effort delivery of analytics events off the request path. Errors are
/// logged and dropped.
#[derive(Clone, Debug, Default)]
pub struct TrackingNotifier {
    tracker: Option<Arc<dyn Tracker>>,
}

impl TrackingNotifier {
    pub fn new(tracker: Arc<dyn Tracker>) -> Self {
        Self {
            tracker: Some(tracker),
        }
    }

    pub fn disabled() -> Self {
        Self { tracker: None }
    }

    /// Spawns delivery and returns the handle; callers are free to drop it.
    pub fn notify(&self, event: TrackEvent) -> Option<JoinHandle<()>> {
        let tracker = Arc::clone(self.tracker.as_ref()?);

        Some(tokio::spawn(async move {
            if let Err(err) = tracker.track(&event).await {
                tracing::warn!("failed to track {}: {}", event.event, err);
            }
        }))
    }
}
