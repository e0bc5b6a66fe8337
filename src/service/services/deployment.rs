use houston_core::{
    Commander, Deployment, DesiredState, NamespaceStrategy, ReleaseName, TrackEvent,
};
use serde_json::json;
use std::sync::Arc;

use crate::{persistence::DeploymentPersistence, validation::validate_update};

use super::{
    error::{DeploymentError, SyncPhase},
    update::{merge, UpdateRequest},
    TrackingNotifier, WorkspaceService,
};

pub const RELEASE_NAME_ATTEMPTS: usize = 5;
pub const UPDATED_DEPLOYMENT_EVENT: &str = "Updated Deployment";

#[derive(Clone, Debug, Default)]
pub struct DeploymentSettings {
    pub namespace_strategy: NamespaceStrategy,
    /// Trial workspaces may not update deployments when set.
    pub billing_enabled: bool,
}

#[derive(Debug)]
pub struct DeploymentService {
    pub persistence: Box<dyn DeploymentPersistence>,
    pub workspace_service: Arc<WorkspaceService>,

    pub commander: Arc<dyn Commander>,
    pub tracking: TrackingNotifier,

    pub settings: DeploymentSettings,
}

impl DeploymentService {
    /// Stores a deployment. Release names are unique and a stored deployment
    /// keeps the release name it was created with.
    #[tracing::instrument(name = "service::deployment::upsert")]
    pub async fn upsert(&self, deployment: &Deployment) -> anyhow::Result<u64> {
        if let Some(stored) = self.persistence.get_by_id(&deployment.id).await? {
            if stored.release_name != deployment.release_name {
                let message = format!(
                    "deployment {} cannot be renamed from {} to {}",
                    deployment.id, stored.release_name, deployment.release_name
                );

                tracing::error!(message);
                return Err(anyhow::anyhow!(message));
            }
        }

        if let Some(existing) = self
            .persistence
            .get_by_release_name(&deployment.release_name)
            .await?
        {
            if existing.id != deployment.id {
                let message = format!(
                    "release name {} is already used by deployment {}",
                    deployment.release_name, existing.id
                );

                tracing::error!(message);
                return Err(anyhow::anyhow!(message));
            }
        }

        let affected_count = self.persistence.upsert(deployment).await?;

        tracing::info!("deployment upserted: {:?}", deployment);

        Ok(affected_count)
    }

    #[tracing::instrument(name = "service::deployment::get_by_id")]
    pub async fn get_by_id(&self, deployment_id: &str) -> anyhow::Result<Option<Deployment>> {
        self.persistence.get_by_id(deployment_id).await
    }

    #[tracing::instrument(name = "service::deployment::get_by_release_name")]
    pub async fn get_by_release_name(
        &self,
        release_name: &str,
    ) -> anyhow::Result<Option<Deployment>> {
        self.persistence.get_by_release_name(release_name).await
    }

    #[tracing::instrument(name = "service::deployment::get_by_workspace_id")]
    pub async fn get_by_workspace_id(&self, workspace_id: &str) -> anyhow::Result<Vec<Deployment>> {
        self.persistence.get_by_workspace_id(workspace_id).await
    }

    #[tracing::instrument(name = "service::deployment::list")]
    pub async fn list(&self) -> anyhow::Result<Vec<Deployment>> {
        let results = self.persistence.list().await?;

        Ok(results)
    }

    /// Generates release names until one is not taken.
    #[tracing::instrument(name = "service::deployment::allocate_release_name")]
    pub async fn allocate_release_name(&self) -> Result<ReleaseName, DeploymentError> {
        for attempt in 1..=RELEASE_NAME_ATTEMPTS {
            let release_name = ReleaseName::generate();

            let existing = self
                .persistence
                .get_by_release_name(release_name.as_str())
                .await
                .map_err(DeploymentError::Persistence)?;

            if existing.is_none() {
                return Ok(release_name);
            }

            tracing::debug!("release name {} collided on attempt {}", release_name, attempt);
        }

        Err(DeploymentError::ReleaseNameExhausted {
            attempts: RELEASE_NAME_ATTEMPTS,
        })
    }

    #[tracing::instrument(
        name = "service::deployment::update",
        skip(self, request),
        fields(deployment_id = %request.deployment_id, sync = request.sync)
    )]
    pub async fn update(
        &self,
        user_id: &str,
        request: &UpdateRequest,
    ) -> Result<Deployment, DeploymentError> {
        let deployment = self
            .persistence
            .get_by_id(&request.deployment_id)
            .await
            .map_err(DeploymentError::Persistence)?
            .ok_or_else(|| {
                DeploymentError::NotFound(format!("deployment {}", request.deployment_id))
            })?;

        self.apply_update(user_id, deployment, request).await
    }

    /// Runs an update against an already loaded deployment: gate, merge,
    /// validate, persist, then optionally synchronize and track.
    #[tracing::instrument(name = "service::deployment::apply_update", skip_all, fields(release_name = %deployment.release_name))]
    pub async fn apply_update(
        &self,
        user_id: &str,
        deployment: Deployment,
        request: &UpdateRequest,
    ) -> Result<Deployment, DeploymentError> {
        if self.settings.billing_enabled {
            let workspace = self
                .workspace_service
                .get_by_id(&deployment.workspace_id)
                .await
                .map_err(DeploymentError::Persistence)?
                .ok_or_else(|| {
                    DeploymentError::NotFound(format!("workspace {}", deployment.workspace_id))
                })?;

            if !workspace.is_paid() {
                tracing::warn!("workspace {} is on a trial", workspace.id);
                return Err(DeploymentError::TrialRestricted {
                    workspace_id: workspace.id,
                });
            }
        }

        let update = merge(&deployment, request);
        validate_update(&update).map_err(DeploymentError::Validation)?;

        let updated = self
            .persistence
            .update(&deployment.id, &update)
            .await
            .map_err(|err| {
                tracing::error!("failed to persist deployment {}: {}", deployment.id, err);
                DeploymentError::Persistence(err)
            })?
            .ok_or_else(|| DeploymentError::NotFound(format!("deployment {}", deployment.id)))?;

        tracing::info!("deployment updated: {:?}", updated);

        if request.sync {
            self.sync(&updated).await?;
        }

        let env_names: Vec<&str> = updated
            .env
            .iter()
            .map(|variable| variable.name.as_str())
            .collect();

        self.tracking.notify(TrackEvent::new(
            user_id,
            UPDATED_DEPLOYMENT_EVENT,
            json!({
                "deploymentId": updated.id,
                "releaseName": updated.release_name,
                "config": updated.config,
                "env": env_names,
                "payload": request.payload,
                "sync": request.sync,
            }),
        ));

        Ok(updated)
    }

    /// Pushes the secret, then the workload. Both calls replace remote state
    /// wholesale so a failed sync can be repeated as is.
    #[tracing::instrument(name = "service::deployment::sync", skip_all, fields(release_name = %deployment.release_name))]
    pub async fn sync(&self, deployment: &Deployment) -> Result<DesiredState, DeploymentError> {
        let desired_state = DesiredState::build(deployment, &self.settings.namespace_strategy)?;

        self.commander
            .set_secret(&desired_state.set_secret_request())
            .await
            .map_err(|source| {
                tracing::error!("secret sync failed for {}: {}", deployment.release_name, source);
                DeploymentError::Synchronization {
                    phase: SyncPhase::Secret,
                    source,
                }
            })?;

        self.commander
            .update_workload(&desired_state.update_workload_request())
            .await
            .map_err(|source| {
                tracing::error!(
                    "workload sync failed for {}: {}",
                    deployment.release_name,
                    source
                );
                DeploymentError::Synchronization {
                    phase: SyncPhase::Workload,
                    source,
                }
            })?;

        tracing::info!(
            "deployment {} synchronized with checksum {}",
            deployment.release_name,
            desired_state.checksum
        );

        Ok(desired_state)
    }
}
