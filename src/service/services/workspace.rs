use houston_core::Workspace;

use crate::persistence::Persistence;

#[derive(Debug)]
pub struct WorkspaceService {
    pub persistence: Box<dyn Persistence<Workspace>>,
}

impl WorkspaceService {
    #[tracing::instrument(name = "service::workspace::upsert")]
    pub async fn upsert(&self, workspace: &Workspace) -> anyhow::Result<u64> {
        let affected_count = self.persistence.upsert(workspace).await?;

        tracing::info!("workspace upserted: {:?}", workspace);

        Ok(affected_count)
    }

    #[tracing::instrument(name = "service::workspace::delete")]
    pub async fn delete(&self, workspace_id: &str) -> anyhow::Result<u64> {
        let deleted_count = self.persistence.delete(workspace_id).await?;

        if deleted_count == 0 {
            return Err(anyhow::anyhow!("Workspace id {workspace_id} not found"));
        }

        tracing::info!("workspace deleted: {}", workspace_id);

        Ok(deleted_count)
    }

    #[tracing::instrument(name = "service::workspace::get_by_id")]
    pub async fn get_by_id(&self, workspace_id: &str) -> anyhow::Result<Option<Workspace>> {
        self.persistence.get_by_id(workspace_id).await
    }

    #[tracing::instrument(name = "service::workspace::list")]
    pub async fn list(&self) -> anyhow::Result<Vec<Workspace>> {
        self.persistence.list().await
    }
}
