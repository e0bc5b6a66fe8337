use async_trait::async_trait;
use houston_core::{ConfigEntry, Deployment, DeploymentUpdate, EnvironmentVariable};
use sqlx::{types::Json, FromRow, PgPool};
use std::sync::Arc;

use crate::persistence::{DeploymentPersistence, Persistence};

#[derive(Debug, FromRow)]
struct DeploymentRow {
    id: String,
    release_name: String,
    workspace_id: String,
    label: String,
    description: Option<String>,
    version: String,
    config: Json<Vec<ConfigEntry>>,
    env: Json<Vec<EnvironmentVariable>>,
}

impl From<DeploymentRow> for Deployment {
    fn from(row: DeploymentRow) -> Self {
        Deployment {
            id: row.id,
            release_name: row.release_name,
            workspace_id: row.workspace_id,
            label: row.label,
            description: row.description,
            version: row.version,
            config: row.config.0,
            env: row.env.0,
        }
    }
}

#[derive(Debug)]
pub struct DeploymentRelationalPersistence {
    pub db: Arc<PgPool>,
}

#[async_trait]
impl Persistence<Deployment> for DeploymentRelationalPersistence {
    #[tracing::instrument(name = "relational::deployment::upsert", skip_all)]
    async fn upsert(&self, deployment: &Deployment) -> anyhow::Result<u64> {
        let result = sqlx::query(
            r#"
            INSERT INTO deployments
               (id, release_name, workspace_id, label, description, version, config, env)
            VALUES
               ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (id) DO UPDATE SET
               label = $4,
               description = $5,
               version = $6,
               config = $7,
               env = $8
            "#,
        )
        .bind(&deployment.id)
        .bind(&deployment.release_name)
        .bind(&deployment.workspace_id)
        .bind(&deployment.label)
        .bind(&deployment.description)
        .bind(&deployment.version)
        .bind(Json(&deployment.config))
        .bind(Json(&deployment.env))
        .execute(&*self.db)
        .await?;

        Ok(result.rows_affected())
    }

    #[tracing::instrument(name = "relational::deployment::delete", skip_all)]
    async fn delete(&self, id: &str) -> anyhow::Result<u64> {
        let result = sqlx::query(
            // language=PostgreSQL
            r#"
                DELETE FROM deployments WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(&*self.db)
        .await?;

        Ok(result.rows_affected())
    }

    #[tracing::instrument(name = "relational::deployment::get_by_id", skip_all)]
    async fn get_by_id(&self, id: &str) -> anyhow::Result<Option<Deployment>> {
        let row = sqlx::query_as::<_, DeploymentRow>("SELECT * FROM deployments WHERE id = $1")
            .bind(id)
            .fetch_optional(&*self.db)
            .await?;

        Ok(row.map(Deployment::from))
    }

    #[tracing::instrument(name = "relational::deployment::list", skip_all)]
    async fn list(&self) -> anyhow::Result<Vec<Deployment>> {
        let rows = sqlx::query_as::<_, DeploymentRow>(
            r#"
                SELECT * FROM deployments
            "#,
        )
        .fetch_all(&*self.db)
        .await?;

        let models = rows
            .into_iter()
            .map(Deployment::from)
            .collect::<Vec<Deployment>>();

        Ok(models)
    }
}

#[async_trait]
impl DeploymentPersistence for DeploymentRelationalPersistence {
    #[tracing::instrument(name = "relational::deployment::get_by_release_name", skip_all)]
    async fn get_by_release_name(
        &self,
        release_name: &str,
    ) -> anyhow::Result<Option<Deployment>> {
        let row = sqlx::query_as::<_, DeploymentRow>(
            "SELECT * FROM deployments WHERE release_name = $1",
        )
        .bind(release_name)
        .fetch_optional(&*self.db)
        .await?;

        Ok(row.map(Deployment::from))
    }

    #[tracing::instrument(name = "relational::deployment::get_by_workspace_id", skip_all)]
    async fn get_by_workspace_id(&self, workspace_id: &str) -> anyhow::Result<Vec<Deployment>> {
        let rows = sqlx::query_as::<_, DeploymentRow>(
            "SELECT * FROM deployments WHERE workspace_id = $1",
        )
        .bind(workspace_id)
        .fetch_all(&*self.db)
        .await?;

        Ok(rows.into_iter().map(Deployment::from).collect())
    }

    #[tracing::instrument(name = "relational::deployment::update", skip_all)]
    async fn update(
        &self,
        deployment_id: &str,
        update: &DeploymentUpdate,
    ) -> anyhow::Result<Option<Deployment>> {
        let row = sqlx::query_as::<_, DeploymentRow>(
            r#"
            UPDATE deployments SET
               label = $2,
               description = $3,
               version = $4,
               config = $5,
               env = $6
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(deployment_id)
        .bind(&update.label)
        .bind(&update.description)
        .bind(&update.version)
        .bind(Json(&update.config))
        .bind(Json(&update.env))
        .fetch_optional(&*self.db)
        .await?;

        Ok(row.map(Deployment::from))
    }
}
