//! Correlates container registry push notifications with deployments and
//! upgrades the ones that received a CLI-built image.

use houston_core::{naming::release_name_from_repository, ConfigEntry, Deployment};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::{
    update::{ConfigInput, UpdateRequest},
    DeploymentService,
};

pub const PUSH_ACTION: &str = "push";
pub const CLI_TAG_PREFIX: &str = "cli-";
pub const IMAGE_REPOSITORY_KEY: &str = "images.airflow.repository";
pub const IMAGE_TAG_KEY: &str = "images.airflow.tag";
pub const REGISTRY_USER_ID: &str = "registry";

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct RegistryEvents {
    pub events: Vec<RegistryEvent>,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct RegistryEvent {
    #[serde(default)]
    pub id: String,
    pub action: String,
    pub target: RegistryTarget,
    #[serde(default)]
    pub request: RegistryRequest,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct RegistryTarget {
    pub repository: String,
    #[serde(default)]
    pub tag: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct RegistryRequest {
    #[serde(default)]
    pub host: String,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum IgnoreReason {
    NotAPush,
    UntrackedTag,
    UnknownRepository,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Classification<'a> {
    /// Worth one lookup of `release_name`.
    Candidate { release_name: &'a str, tag: &'a str },
    Ignored(IgnoreReason),
}

/// Decides from the event alone whether it can be an upgrade. Only pushes of
/// `cli-` tags to `{release}/airflow` qualify, so `latest` never does.
pub fn classify(event: &RegistryEvent) -> Classification<'_> {
    if event.action != PUSH_ACTION {
        return Classification::Ignored(IgnoreReason::NotAPush);
    }

    let tag = match event.target.tag.as_deref() {
        Some(tag) if tag.starts_with(CLI_TAG_PREFIX) => tag,
        _ => return Classification::Ignored(IgnoreReason::UntrackedTag),
    };

    match release_name_from_repository(&event.target.repository) {
        Some(release_name) => Classification::Candidate { release_name, tag },
        None => Classification::Ignored(IgnoreReason::UnknownRepository),
    }
}

/// The stored configuration with only the image reference replaced.
pub fn image_upgrade_request(
    deployment: &Deployment,
    event: &RegistryEvent,
    tag: &str,
) -> UpdateRequest {
    let repository = if event.request.host.is_empty() {
        event.target.repository.clone()
    } else {
        format!("{}/{}", event.request.host, event.target.repository)
    };

    let mut config: Vec<ConfigEntry> = deployment
        .config
        .iter()
        .filter(|entry| entry.key != IMAGE_REPOSITORY_KEY && entry.key != IMAGE_TAG_KEY)
        .cloned()
        .collect();
    config.push(ConfigEntry::new(IMAGE_REPOSITORY_KEY, repository));
    config.push(ConfigEntry::new(IMAGE_TAG_KEY, tag));

    UpdateRequest {
        config: Some(ConfigInput::Entries(config)),
        sync: true,
        ..UpdateRequest::new(&deployment.id)
    }
}

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct RegistryBatchReport {
    pub upgraded: usize,
    pub ignored: usize,
    pub failed: usize,
}

#[derive(Debug)]
pub struct RegistryService {
    pub deployment_service: Arc<DeploymentService>,
}

impl RegistryService {
    /// Handles every event in arrival order. A failing event is counted and
    /// never stops the rest of the batch.
    #[tracing::instrument(name = "service::registry::process", skip_all, fields(events = events.len()))]
    pub async fn process(&self, events: &[RegistryEvent]) -> RegistryBatchReport {
        let mut report = RegistryBatchReport::default();

        for event in events {
            let (release_name, tag) = match classify(event) {
                Classification::Candidate { release_name, tag } => (release_name, tag),
                Classification::Ignored(reason) => {
                    tracing::debug!("ignoring registry event {}: {:?}", event.id, reason);
                    report.ignored += 1;
                    continue;
                }
            };

            let deployment = match self
                .deployment_service
                .get_by_release_name(release_name)
                .await
            {
                Ok(Some(deployment)) => deployment,
                Ok(None) => {
                    tracing::debug!(
                        "ignoring registry event {}: no release {}",
                        event.id,
                        release_name
                    );
                    report.ignored += 1;
                    continue;
                }
                Err(err) => {
                    tracing::error!("lookup for registry event {} failed: {}", event.id, err);
                    report.failed += 1;
                    continue;
                }
            };

            let request = image_upgrade_request(&deployment, event, tag);

            match self
                .deployment_service
                .apply_update(REGISTRY_USER_ID, deployment, &request)
                .await
            {
                Ok(deployment) => {
                    tracing::info!(
                        "upgraded {} to {} from registry event {}",
                        deployment.release_name,
                        tag,
                        event.id
                    );
                    report.upgraded += 1;
                }
                Err(err) => {
                    tracing::error!("registry event {} failed: {}", event.id, err);
                    report.failed += 1;
                }
            }
        }

        report
    }
}
