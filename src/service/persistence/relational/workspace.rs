use async_trait::async_trait;
use houston_core::Workspace;
use sqlx::{FromRow, PgPool};
use std::sync::Arc;

use crate::persistence::Persistence;

#[derive(Debug, FromRow)]
struct WorkspaceRow {
    id: String,
    label: String,
    stripe_customer_id: Option<String>,
}

impl From<WorkspaceRow> for Workspace {
    fn from(row: WorkspaceRow) -> Self {
        Workspace {
            id: row.id,
            label: row.label,
            stripe_customer_id: row.stripe_customer_id,
        }
    }
}

#[derive(Debug)]
pub struct WorkspaceRelationalPersistence {
    pub db: Arc<PgPool>,
}

#[async_trait]
impl Persistence<Workspace> for WorkspaceRelationalPersistence {
    #[tracing::instrument(name = "relational::workspace::upsert", skip_all)]
    async fn upsert(&self, workspace: &Workspace) -> anyhow::Result<u64> {
        let result = sqlx::query(
            r#"
            INSERT INTO workspaces
               (id, label, stripe_customer_id)
            VALUES
               ($1, $2, $3)
            ON CONFLICT (id) DO UPDATE SET
               label = $2,
               stripe_customer_id = $3
            "#,
        )
        .bind(&workspace.id)
        .bind(&workspace.label)
        .bind(&workspace.stripe_customer_id)
        .execute(&*self.db)
        .await?;

        Ok(result.rows_affected())
    }

    #[tracing::instrument(name = "relational::workspace::delete", skip_all)]
    async fn delete(&self, id: &str) -> anyhow::Result<u64> {
        let result = sqlx::query("DELETE FROM workspaces WHERE id = $1")
            .bind(id)
            .execute(&*self.db)
            .await?;

        Ok(result.rows_affected())
    }

    #[tracing::instrument(name = "relational::workspace::get_by_id", skip_all)]
    async fn get_by_id(&self, id: &str) -> anyhow::Result<Option<Workspace>> {
        let row = sqlx::query_as::<_, WorkspaceRow>("SELECT * FROM workspaces WHERE id = $1")
            .bind(id)
            .fetch_optional(&*self.db)
            .await?;

        Ok(row.map(Workspace::from))
    }

    #[tracing::instrument(name = "relational::workspace::list", skip_all)]
    async fn list(&self) -> anyhow::Result<Vec<Workspace>> {
        let rows = sqlx::query_as::<_, WorkspaceRow>("SELECT * FROM workspaces")
            .fetch_all(&*self.db)
            .await?;

        Ok(rows.into_iter().map(Workspace::from).collect())
    }
}
