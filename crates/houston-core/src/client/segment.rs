use async_trait::async_trait;
use serde_json::json;
use std::{fmt, time::Duration};
use uuid::Uuid;

use crate::{TrackEvent, Tracker};

const SEGMENT_TRACK_URL: &str = "https://api.segment.io/v1/track";
const SEGMENT_TIMEOUT: Duration = Duration::from_secs(10);

pub struct SegmentTracker {
    client: reqwest::Client,
    write_key: String,
    url: String,
}

impl SegmentTracker {
    pub fn new(write_key: &str) -> anyhow::Result<Self> {
        Self::with_url(write_key, SEGMENT_TRACK_URL)
    }

    pub fn with_url(write_key: &str, url: &str) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(SEGMENT_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            write_key: write_key.to_string(),
            url: url.to_string(),
        })
    }
}

impl fmt::Debug for SegmentTracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SegmentTracker")
            .field("url", &self.url)
            .finish()
    }
}

#[async_trait]
impl Tracker for SegmentTracker {
    #[tracing::instrument(name = "segment::track", skip_all, fields(event = %event.event))]
    async fn track(&self, event: &TrackEvent) -> anyhow::Result<()> {
        let body = json!({
            "messageId": Uuid::new_v4().to_string(),
            "userId": event.user_id,
            "event": event.event,
            "properties": event.properties,
        });

        self.client
            .post(&self.url)
            .basic_auth(&self.write_key, Some(""))
            .json(&body)
            .send()
            .await?
            .error_for_status()?;

        Ok(())
    }
}
