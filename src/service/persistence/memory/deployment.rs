use async_trait::async_trait;
use houston_core::{Deployment, DeploymentUpdate};
use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard},
};

use crate::persistence::{DeploymentPersistence, PersistableModel, Persistence};

#[derive(Debug)]
pub struct DeploymentMemoryPersistence {
    models: Arc<Mutex<HashMap<String, Deployment>>>,
}

#[async_trait]
impl Persistence<Deployment> for DeploymentMemoryPersistence {
    async fn upsert(&self, deployment: &Deployment) -> anyhow::Result<u64> {
        let mut locked_deployments = self.get_models_locked()?;

        locked_deployments.insert(deployment.get_id(), deployment.clone());

        Ok(1)
    }

    async fn delete(&self, deployment_id: &str) -> anyhow::Result<u64> {
        let mut locked_deployments = self.get_models_locked()?;

        match locked_deployments.remove(deployment_id) {
            Some(_) => Ok(1),
            None => Ok(0),
        }
    }

    async fn get_by_id(&self, deployment_id: &str) -> anyhow::Result<Option<Deployment>> {
        let locked_deployments = self.get_models_locked()?;

        Ok(locked_deployments.get(deployment_id).cloned())
    }

    async fn list(&self) -> anyhow::Result<Vec<Deployment>> {
        let locked_deployments = self.get_models_locked()?;

        let deployments = locked_deployments.values().cloned().collect();

        Ok(deployments)
    }
}

#[async_trait]
impl DeploymentPersistence for DeploymentMemoryPersistence {
    async fn get_by_release_name(
        &self,
        release_name: &str,
    ) -> anyhow::Result<Option<Deployment>> {
        let locked_deployments = self.get_models_locked()?;

        let deployment = locked_deployments
            .values()
            .find(|deployment| deployment.release_name == release_name)
            .cloned();

        Ok(deployment)
    }

    async fn get_by_workspace_id(&self, workspace_id: &str) -> anyhow::Result<Vec<Deployment>> {
        let locked_deployments = self.get_models_locked()?;

        let mut deployments_for_workspace = Vec::new();
        for deployment in (*locked_deployments).values() {
            if deployment.workspace_id == workspace_id {
                deployments_for_workspace.push(deployment.clone());
            }
        }

        Ok(deployments_for_workspace)
    }

    async fn update(
        &self,
        deployment_id: &str,
        update: &DeploymentUpdate,
    ) -> anyhow::Result<Option<Deployment>> {
        let mut locked_deployments = self.get_models_locked()?;

        let updated_deployment = match locked_deployments.get(deployment_id) {
            Some(deployment) => deployment.apply(update),
            None => return Ok(None),
        };

        locked_deployments.insert(deployment_id.to_string(), updated_deployment.clone());

        Ok(Some(updated_deployment))
    }
}

impl DeploymentMemoryPersistence {
    fn get_models_locked(&self) -> anyhow::Result<MutexGuard<HashMap<String, Deployment>>> {
        match self.models.lock() {
            Ok(locked_deployments) => Ok(locked_deployments),
            Err(_) => Err(anyhow::anyhow!("failed to acquire lock")),
        }
    }
}

impl Default for DeploymentMemoryPersistence {
    fn default() -> Self {
        Self {
            models: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

#[cfg(test)]
mod tests {
    use houston_core::test::{get_deployment_fixture, get_workspace_fixture};

    use super::*;

    #[tokio::test]
    async fn test_create_get_delete() {
        dotenvy::from_filename(".env.test").ok();

        let deployment_persistence = DeploymentMemoryPersistence::default();
        let deployment = get_deployment_fixture(None);

        let created_count = deployment_persistence.upsert(&deployment).await.unwrap();
        assert_eq!(created_count, 1);

        let fetched_deployment = deployment_persistence
            .get_by_id(&deployment.id)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(fetched_deployment.id, deployment.id);

        let by_release_name = deployment_persistence
            .get_by_release_name(&deployment.release_name)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(by_release_name.id, deployment.id);

        let deployments_for_workspace = deployment_persistence
            .get_by_workspace_id(&get_workspace_fixture(None).id)
            .await
            .unwrap();

        assert_eq!(deployments_for_workspace.len(), 1);

        let deleted_deployments = deployment_persistence.delete(&deployment.id).await.unwrap();
        assert_eq!(deleted_deployments, 1);
    }

    #[tokio::test]
    async fn test_update() {
        dotenvy::from_filename(".env.test").ok();

        let deployment_persistence = DeploymentMemoryPersistence::default();
        let deployment = get_deployment_fixture(None);
        deployment_persistence.upsert(&deployment).await.unwrap();

        let update = DeploymentUpdate {
            label: "Renamed".to_owned(),
            description: None,
            version: "0.11.0".to_owned(),
            config: vec![],
            env: deployment.env.clone(),
        };

        let updated = deployment_persistence
            .update(&deployment.id, &update)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.label, "Renamed");
        assert_eq!(updated.release_name, deployment.release_name);

        let fetched = deployment_persistence
            .get_by_id(&deployment.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(fetched, updated);

        let missing = deployment_persistence
            .update("no-such-deployment", &update)
            .await
            .unwrap();
        assert!(missing.is_none());
    }
}
