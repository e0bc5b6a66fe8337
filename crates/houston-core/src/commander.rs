use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::{collections::BTreeMap, fmt};
use thiserror::Error;

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct ChartRef {
    pub name: String,
    pub version: String,
}

/// A complete secret object. Applying it replaces every key of the previous
/// secret with the same name.
#[derive(Clone, Deserialize, Eq, PartialEq, Serialize)]
pub struct SecretPayload {
    pub name: String,
    pub data: BTreeMap<String, String>,
}

impl fmt::Debug for SecretPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretPayload")
            .field("name", &self.name)
            .field("keys", &self.data.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SetSecretRequest {
    pub release_name: String,
    pub namespace: String,
    pub secret: SecretPayload,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateWorkloadRequest {
    pub release_name: String,
    pub chart: ChartRef,
    pub values: Value,
}

#[derive(Debug, Error)]
pub enum CommanderError {
    #[error("commander request timed out")]
    Timeout,

    #[error("commander transport error: {0}")]
    Transport(String),

    #[error("commander rejected {operation} with status {status}: {body}")]
    Rejected {
        operation: &'static str,
        status: u16,
        body: String,
    },
}

impl CommanderError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, CommanderError::Timeout)
    }
}

/// The remote cluster control plane. Both operations are full-replace and
/// must be safe to repeat with identical arguments.
#[async_trait]
pub trait Commander: Send + Sync + fmt::Debug {
    async fn set_secret(&self, request: &SetSecretRequest) -> Result<(), CommanderError>;
    async fn update_workload(&self, request: &UpdateWorkloadRequest) -> Result<(), CommanderError>;
}
