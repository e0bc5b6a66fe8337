use async_trait::async_trait;
use houston_core::{Deployment, DeploymentUpdate, Workspace};
use std::fmt::Debug;

pub mod memory;
pub mod relational;

#[async_trait]
pub trait Persistence<Model>: Send + Sync + Debug {
    async fn upsert(&self, model: &Model) -> anyhow::Result<u64>;
    async fn delete(&self, model_id: &str) -> anyhow::Result<u64>;
    async fn get_by_id(&self, id: &str) -> anyhow::Result<Option<Model>>;
    async fn list(&self) -> anyhow::Result<Vec<Model>>;
}

pub trait PersistableModel<Model>: Clone + Debug + Send + Sync {
    fn get_id(&self) -> String;
}

impl PersistableModel<Deployment> for Deployment {
    fn get_id(&self) -> String {
        self.id.clone()
    }
}

impl PersistableModel<Workspace> for Workspace {
    fn get_id(&self) -> String {
        self.id.clone()
    }
}

#[async_trait]
pub trait DeploymentPersistence: Persistence<Deployment> {
    async fn get_by_release_name(&self, release_name: &str)
        -> anyhow::Result<Option<Deployment>>;
    async fn get_by_workspace_id(&self, workspace_id: &str) -> anyhow::Result<Vec<Deployment>>;

    /// Replaces the mutable fields of a stored deployment in one write and
    /// returns the stored result, or `None` if the deployment does not exist.
    async fn update(
        &self,
        deployment_id: &str,
        update: &DeploymentUpdate,
    ) -> anyhow::Result<Option<Deployment>>;
}
