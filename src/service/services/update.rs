//! The canonical update request and the typed merge that turns it into a
//! complete desired state.

use houston_core::{ConfigEntry, Deployment, DeploymentUpdate, EnvironmentVariable};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The fields of a deployment a caller may change through `payload`. Any
/// other key sent in `payload` is dropped during deserialization.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct DeploymentPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

/// Configuration as submitted. Older clients send a flat object instead of
/// a list of entries.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ConfigInput {
    Entries(Vec<ConfigEntry>),
    Object(Map<String, Value>),
}

impl ConfigInput {
    /// Nested objects become dotted keys. Leaf values keep their JSON type.
    pub fn into_entries(self) -> Vec<ConfigEntry> {
        match self {
            ConfigInput::Entries(entries) => entries,
            ConfigInput::Object(object) => {
                let mut entries = Vec::new();
                flatten_object("", object, &mut entries);
                entries
            }
        }
    }
}

fn flatten_object(prefix: &str, object: Map<String, Value>, entries: &mut Vec<ConfigEntry>) {
    for (key, value) in object {
        let key = if prefix.is_empty() {
            key
        } else {
            format!("{prefix}.{key}")
        };

        match value {
            Value::Object(nested) if !nested.is_empty() => flatten_object(&key, nested, entries),
            value => entries.push(ConfigEntry::new(key, value)),
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRequest {
    #[serde(default, alias = "deploymentUuid")]
    pub deployment_id: String,

    #[serde(default)]
    pub payload: DeploymentPayload,

    /// Replaces the stored configuration wholesale when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<ConfigInput>,

    /// Replaces the stored environment wholesale when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub env: Option<Vec<EnvironmentVariable>>,

    #[serde(default)]
    pub sync: bool,
}

impl UpdateRequest {
    pub fn new(deployment_id: &str) -> Self {
        Self {
            deployment_id: deployment_id.to_string(),
            payload: DeploymentPayload::default(),
            config: None,
            env: None,
            sync: false,
        }
    }
}

/// Merges a request onto the stored deployment. Absent fields keep their
/// stored value, present lists replace the stored list. An empty description
/// clears it.
pub fn merge(deployment: &Deployment, request: &UpdateRequest) -> DeploymentUpdate {
    let payload = &request.payload;

    let description = match &payload.description {
        Some(description) if description.is_empty() => None,
        Some(description) => Some(description.clone()),
        None => deployment.description.clone(),
    };

    DeploymentUpdate {
        label: payload
            .label
            .clone()
            .unwrap_or_else(|| deployment.label.clone()),
        description,
        version: payload
            .version
            .clone()
            .unwrap_or_else(|| deployment.version.clone()),
        config: match &request.config {
            Some(config) => config.clone().into_entries(),
            None => deployment.config.clone(),
        },
        env: match &request.env {
            Some(env) => env.clone(),
            None => deployment.env.clone(),
        },
    }
}

#[cfg(test)]
mod tests {
    use houston_core::test::get_deployment_fixture;
    use serde_json::json;

    use super::*;

    #[test]
    fn test_payload_allow_list() {
        let request: UpdateRequest = serde_json::from_value(json!({
            "deploymentId": "deployment-cosmic-dust-1234",
            "payload": {
                "label": "Renamed",
                "releaseName": "hijacked-name-0000",
                "workspaceId": "someone-elses-workspace",
                "properties": { "component_version": "1.10.5" }
            }
        }))
        .unwrap();

        let deployment = get_deployment_fixture(None);
        let update = merge(&deployment, &request);
        let applied = deployment.apply(&update);

        assert_eq!(applied.label, "Renamed");
        assert_eq!(applied.release_name, deployment.release_name);
        assert_eq!(applied.workspace_id, deployment.workspace_id);
        assert_eq!(applied.version, deployment.version);
    }

    #[test]
    fn test_legacy_aliases() {
        let request: UpdateRequest = serde_json::from_value(json!({
            "deploymentUuid": "deployment-cosmic-dust-1234",
            "config": {
                "executor": "KubernetesExecutor",
                "airflowVersion": "1.10",
                "workers": { "replicas": 3 }
            },
            "env": [{ "key": "FOO", "value": "bar" }],
            "sync": true
        }))
        .unwrap();

        assert_eq!(request.deployment_id, "deployment-cosmic-dust-1234");
        assert!(request.sync);

        let update = merge(&get_deployment_fixture(None), &request);

        assert_eq!(
            update.config,
            vec![
                ConfigEntry::new("airflowVersion", "1.10"),
                ConfigEntry::new("executor", "KubernetesExecutor"),
                ConfigEntry::new("workers.replicas", 3),
            ]
        );
        assert_eq!(update.env, vec![EnvironmentVariable::new("FOO", "bar")]);
    }

    #[test]
    fn test_config_is_replaced_wholesale() {
        let deployment = get_deployment_fixture(None);
        assert_eq!(deployment.config.len(), 2);

        let request = UpdateRequest {
            config: Some(ConfigInput::Entries(vec![ConfigEntry::new(
                "workers.replicas",
                "5",
            )])),
            ..UpdateRequest::new(&deployment.id)
        };

        let update = merge(&deployment, &request);

        assert_eq!(update.config, vec![ConfigEntry::new("workers.replicas", "5")]);
    }

    #[test]
    fn test_absent_fields_keep_stored_values() {
        let deployment = get_deployment_fixture(None);

        let update = merge(&deployment, &UpdateRequest::new(&deployment.id));

        assert_eq!(update.label, deployment.label);
        assert_eq!(update.description, deployment.description);
        assert_eq!(update.version, deployment.version);
        assert_eq!(update.config, deployment.config);
        assert_eq!(update.env, deployment.env);
    }

    #[test]
    fn test_empty_description_clears() {
        let deployment = get_deployment_fixture(None);
        let request = UpdateRequest {
            payload: DeploymentPayload {
                description: Some(String::new()),
                ..DeploymentPayload::default()
            },
            ..UpdateRequest::new(&deployment.id)
        };

        assert!(merge(&deployment, &request).description.is_none());
    }
}
