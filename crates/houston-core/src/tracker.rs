use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::fmt::Debug;

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackEvent {
    pub user_id: String,
    pub event: String,
    pub properties: Value,
}

impl TrackEvent {
    pub fn new(user_id: &str, event: &str, properties: Value) -> Self {
        Self {
            user_id: user_id.to_string(),
            event: event.to_string(),
            properties,
        }
    }
}

#[async_trait]
pub trait Tracker: Send + Sync + Debug {
    async fn track(&self, event: &TrackEvent) -> anyhow::Result<()>;
}
