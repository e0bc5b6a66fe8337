//! Renders a deployment into what the control plane consumes: a secret object
//! holding the environment variables and a chart value document that refers
//! to it.

use serde_json::{json, Map, Value};
use sha2::{Digest, Sha512};
use std::collections::BTreeMap;

use crate::{
    naming::{NamespaceStrategy, Service, WORKLOAD},
    ChartRef, Deployment, EnvironmentVariable, SecretPayload, SetSecretRequest,
    UpdateWorkloadRequest,
};

pub const CHART_NAME: &str = WORKLOAD;
pub const POD_ANNOTATIONS_KEY: &str = "airflowPodAnnotations";
pub const SECRETS_CHECKSUM_ANNOTATION: &str = "checksum/airflow-secrets";

pub fn secret_data(env: &[EnvironmentVariable]) -> BTreeMap<String, String> {
    env.iter()
        .map(|variable| (variable.name.clone(), variable.value.clone()))
        .collect()
}

/// SHA-512 over the canonical JSON of the variable set. Variables are keyed
/// and ordered by name so the digest does not depend on submission order.
pub fn secrets_checksum(env: &[EnvironmentVariable]) -> Result<String, serde_json::Error> {
    let canonical = serde_json::to_vec(&secret_data(env))?;

    Ok(hex::encode(Sha512::digest(&canonical)))
}

#[derive(Clone, Debug, PartialEq)]
pub struct DesiredState {
    pub release_name: String,
    pub namespace: String,
    pub secret: SecretPayload,
    pub chart: ChartRef,
    pub values: Value,
    pub checksum: String,
}

impl DesiredState {
    pub fn build(
        deployment: &Deployment,
        strategy: &NamespaceStrategy,
    ) -> Result<Self, serde_json::Error> {
        let release = deployment.release();
        let namespace = release.namespace(strategy);
        let checksum = secrets_checksum(&deployment.env)?;

        let secret = SecretPayload {
            name: release.secret_name(),
            data: secret_data(&deployment.env),
        };

        let values = render_values(deployment, &namespace, &checksum);

        Ok(Self {
            release_name: deployment.release_name.clone(),
            namespace,
            secret,
            chart: ChartRef {
                name: CHART_NAME.to_string(),
                version: deployment.version.clone(),
            },
            values,
            checksum,
        })
    }

    pub fn set_secret_request(&self) -> SetSecretRequest {
        SetSecretRequest {
            release_name: self.release_name.clone(),
            namespace: self.namespace.clone(),
            secret: self.secret.clone(),
        }
    }

    pub fn update_workload_request(&self) -> UpdateWorkloadRequest {
        UpdateWorkloadRequest {
            release_name: self.release_name.clone(),
            chart: self.chart.clone(),
            values: self.values.clone(),
        }
    }
}

/// Builds the chart values. Configuration entries go in first; derived
/// identity, secret references and the checksum annotation are layered on
/// top and win on collision.
pub fn render_values(deployment: &Deployment, namespace: &str, checksum: &str) -> Value {
    let release = deployment.release();
    let mut values = Value::Object(Map::new());

    for entry in &deployment.config {
        insert_dotted(&mut values, &entry.key, entry.value.clone());
    }

    insert_dotted(
        &mut values,
        "platform",
        json!({
            "release": release.as_str(),
            "namespace": namespace,
            "workspace": deployment.workspace_id,
        }),
    );

    insert_dotted(
        &mut values,
        "data.metadataConnection",
        json!({
            "user": release.username(Service::Airflow),
            "db": release.database_name(),
        }),
    );

    insert_dotted(
        &mut values,
        "data.resultBackendConnection",
        json!({
            "user": release.username(Service::Celery),
            "db": release.database_name(),
        }),
    );

    // names only, the values live in the secret object
    let secret_name = release.secret_name();
    let secret_refs: Vec<Value> = secret_data(&deployment.env)
        .keys()
        .map(|name| {
            json!({
                "envName": name,
                "secretName": secret_name,
                "secretKey": name,
            })
        })
        .collect();
    insert_dotted(&mut values, "secret", Value::Array(secret_refs));

    let annotations = ensure_object(&mut values)
        .entry(POD_ANNOTATIONS_KEY.to_string())
        .or_insert_with(|| Value::Object(Map::new()));
    ensure_object(annotations).insert(
        SECRETS_CHECKSUM_ANNOTATION.to_string(),
        Value::String(checksum.to_string()),
    );

    values
}

fn insert_dotted(root: &mut Value, key: &str, value: Value) {
    let segments: Vec<&str> = key.split('.').collect();
    let (last, parents) = match segments.split_last() {
        Some(split) => split,
        None => return,
    };

    let mut current = root;
    for segment in parents {
        current = ensure_object(current)
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
    }

    ensure_object(current).insert(last.to_string(), value);
}

fn ensure_object(value: &mut Value) -> &mut Map<String, Value> {
    if !value.is_object() {
        *value = Value::Object(Map::new());
    }

    match value {
        Value::Object(map) => map,
        _ => unreachable!("value was just replaced with an object"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{test::get_deployment_fixture, ConfigEntry};

    fn env(pairs: &[(&str, &str)]) -> Vec<EnvironmentVariable> {
        pairs
            .iter()
            .map(|(name, value)| EnvironmentVariable::new(*name, *value))
            .collect()
    }

    #[test]
    fn test_annotation_key_names_the_workload() {
        assert_eq!(
            SECRETS_CHECKSUM_ANNOTATION,
            format!("checksum/{WORKLOAD}-secrets")
        );
    }

    #[test]
    fn test_checksum_ignores_order() {
        let forward = env(&[("A", "1"), ("B", "2"), ("C", "3")]);
        let reversed = env(&[("C", "3"), ("B", "2"), ("A", "1")]);

        let checksum = secrets_checksum(&forward).unwrap();

        assert_eq!(checksum, secrets_checksum(&reversed).unwrap());
        assert_eq!(checksum, secrets_checksum(&forward).unwrap());
        // hex encoded sha512
        assert_eq!(checksum.len(), 128);
    }

    #[test]
    fn test_checksum_changes_with_any_value() {
        let original = env(&[("A", "1"), ("B", "2")]);
        let changed = env(&[("A", "1"), ("B", "3")]);
        let renamed = env(&[("A", "1"), ("C", "2")]);

        let checksum = secrets_checksum(&original).unwrap();

        assert_ne!(checksum, secrets_checksum(&changed).unwrap());
        assert_ne!(checksum, secrets_checksum(&renamed).unwrap());
        assert_ne!(checksum, secrets_checksum(&[]).unwrap());
    }

    #[test]
    fn test_build_desired_state() {
        let deployment = get_deployment_fixture(None);
        let strategy = NamespaceStrategy::from_settings("astronomer", false);

        let desired_state = DesiredState::build(&deployment, &strategy).unwrap();

        assert_eq!(desired_state.namespace, "astronomer-cosmic-dust-1234");
        assert_eq!(desired_state.secret.name, "cosmic-dust-1234-env");
        assert_eq!(desired_state.chart.name, "airflow");
        assert_eq!(desired_state.chart.version, deployment.version);
        assert_eq!(
            desired_state.secret.data.get("AIRFLOW__WEBSERVER__EXPOSE_CONFIG"),
            Some(&"True".to_string())
        );

        let values = &desired_state.values;
        assert_eq!(values["executor"], "CeleryExecutor");
        assert_eq!(values["workers"]["replicas"], 2);
        assert_eq!(values["platform"]["release"], "cosmic-dust-1234");
        assert_eq!(
            values["data"]["metadataConnection"]["user"],
            "cosmic_dust_1234_airflow"
        );
        assert_eq!(
            values["data"]["resultBackendConnection"]["user"],
            "cosmic_dust_1234_celery"
        );
        assert_eq!(
            values[POD_ANNOTATIONS_KEY][SECRETS_CHECKSUM_ANNOTATION],
            desired_state.checksum.as_str()
        );
    }

    #[test]
    fn test_values_never_contain_secret_values() {
        let mut deployment = get_deployment_fixture(None);
        deployment.env = env(&[("DB_PASSWORD", "s3cr3t-value")]);

        let desired_state =
            DesiredState::build(&deployment, &NamespaceStrategy::default()).unwrap();
        let rendered = serde_json::to_string(&desired_state.values).unwrap();

        assert!(!rendered.contains("s3cr3t-value"));
        assert_eq!(desired_state.values["secret"][0]["envName"], "DB_PASSWORD");
        assert_eq!(
            desired_state.values["secret"][0]["secretName"],
            "cosmic-dust-1234-env"
        );
    }

    #[test]
    fn test_derived_values_win_over_config() {
        let mut deployment = get_deployment_fixture(None);
        deployment.config = vec![
            ConfigEntry::new("platform.release", "hijacked"),
            ConfigEntry::new("images.airflow.tag", "cli-3"),
        ];

        let values = render_values(&deployment, "houston", "abc");

        assert_eq!(values["platform"]["release"], "cosmic-dust-1234");
        assert_eq!(values["images"]["airflow"]["tag"], "cli-3");
    }

    #[test]
    fn test_config_values_keep_their_type() {
        let mut deployment = get_deployment_fixture(None);
        deployment.config = vec![
            ConfigEntry::new("airflowVersion", "1.10"),
            ConfigEntry::new("webserver.defaultUser.password", "true"),
            ConfigEntry::new("webserver.replicas", "2"),
            ConfigEntry::new("workers.replicas", 3),
            ConfigEntry::new("flower.enabled", false),
        ];

        let values = render_values(&deployment, "houston", "abc");

        assert_eq!(values["airflowVersion"], json!("1.10"));
        assert_eq!(values["webserver"]["defaultUser"]["password"], json!("true"));
        assert_eq!(values["webserver"]["replicas"], json!("2"));
        assert_eq!(values["workers"]["replicas"], json!(3));
        assert_eq!(values["flower"]["enabled"], json!(false));
    }

    #[test]
    fn test_changed_env_changes_rendered_values() {
        let mut deployment = get_deployment_fixture(None);
        let strategy = NamespaceStrategy::default();
        let before = DesiredState::build(&deployment, &strategy).unwrap();

        deployment.env = env(&[("AIRFLOW__WEBSERVER__EXPOSE_CONFIG", "False")]);
        let after = DesiredState::build(&deployment, &strategy).unwrap();

        assert_eq!(before.chart, after.chart);
        assert_ne!(before.values, after.values);
    }

    #[test]
    fn test_insert_dotted_replaces_scalars() {
        let mut values = json!({ "workers": "2" });

        insert_dotted(&mut values, "workers.replicas", json!(3));

        assert_eq!(values, json!({ "workers": { "replicas": 3 } }));
    }
}
