use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::naming::ReleaseName;

/// A single configuration knob of a deployment, e.g. `workers.replicas=2`.
/// The value keeps the JSON type it was submitted with and renders as such.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct ConfigEntry {
    pub key: String,
    pub value: Value,
}

impl ConfigEntry {
    pub fn new(key: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// A user supplied environment variable. Values are secret and are redacted
/// from the `Debug` output so they never end up in logs or spans.
#[derive(Clone, Deserialize, Eq, PartialEq, Serialize)]
pub struct EnvironmentVariable {
    #[serde(alias = "key")]
    pub name: String,
    pub value: String,
}

impl EnvironmentVariable {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

impl fmt::Debug for EnvironmentVariable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnvironmentVariable")
            .field("name", &self.name)
            .field("value", &"<redacted>")
            .finish()
    }
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Deployment {
    pub id: String,
    pub release_name: String,
    pub workspace_id: String,

    pub label: String,
    #[serde(default)]
    pub description: Option<String>,
    pub version: String,

    #[serde(default)]
    pub config: Vec<ConfigEntry>,

    // never sent back over the wire
    #[serde(default, skip_serializing)]
    pub env: Vec<EnvironmentVariable>,
}

impl Deployment {
    pub fn release(&self) -> ReleaseName {
        ReleaseName::new(&self.release_name)
    }

    /// Returns a copy of this deployment with the mutable fields replaced by
    /// `update`. Identity fields (id, release name, workspace) never change.
    pub fn apply(&self, update: &DeploymentUpdate) -> Deployment {
        Deployment {
            id: self.id.clone(),
            release_name: self.release_name.clone(),
            workspace_id: self.workspace_id.clone(),

            label: update.label.clone(),
            description: update.description.clone(),
            version: update.version.clone(),
            config: update.config.clone(),
            env: update.env.clone(),
        }
    }
}

/// The complete, validated desired state of the mutable part of a deployment.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DeploymentUpdate {
    pub label: String,
    pub description: Option<String>,
    pub version: String,
    pub config: Vec<ConfigEntry>,
    pub env: Vec<EnvironmentVariable>,
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Workspace {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub stripe_customer_id: Option<String>,
}

impl Workspace {
    pub fn is_paid(&self) -> bool {
        self.stripe_customer_id
            .as_deref()
            .map(|customer_id| !customer_id.trim().is_empty())
            .unwrap_or(false)
    }
}
