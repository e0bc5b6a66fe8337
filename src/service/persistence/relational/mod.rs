mod deployment;
mod workspace;

pub use deployment::DeploymentRelationalPersistence;
pub use workspace::WorkspaceRelationalPersistence;

#[cfg(test)]
pub async fn connect_test_db() -> std::sync::Arc<sqlx::PgPool> {
    use sqlx::postgres::PgPoolOptions;

    dotenvy::from_filename(".env.test").ok();

    let database_url = dotenvy::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let db = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .expect("failed to connect to DATABASE_URL");

    sqlx::migrate!().run(&db).await.expect("failed to migrate");

    std::sync::Arc::new(db)
}

#[cfg(test)]
pub async fn ensure_fixtures(db: &std::sync::Arc<sqlx::PgPool>) {
    use houston_core::test::{get_deployment_fixture, get_workspace_fixture};

    use crate::persistence::Persistence;

    // upserts are idempotent, so concurrently running tests can all call this
    let workspace_persistence = WorkspaceRelationalPersistence {
        db: std::sync::Arc::clone(db),
    };
    workspace_persistence
        .upsert(&get_workspace_fixture(None))
        .await
        .unwrap();

    let deployment_persistence = DeploymentRelationalPersistence {
        db: std::sync::Arc::clone(db),
    };
    deployment_persistence
        .upsert(&get_deployment_fixture(None))
        .await
        .unwrap();
}
