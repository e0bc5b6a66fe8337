use axum::http::Request;
use hyper::Body;
use sqlx::postgres::PgPoolOptions;
use std::{net::SocketAddr, sync::Arc};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use houston::{
    http::{http_router, AppState},
    persistence::{
        memory::{DeploymentMemoryPersistence, MemoryPersistence},
        relational::{DeploymentRelationalPersistence, WorkspaceRelationalPersistence},
        DeploymentPersistence, Persistence,
    },
    services::{
        DeploymentService, DeploymentSettings, RegistryService, TrackingNotifier,
        WorkspaceService,
    },
    HoustonConfig,
};
use houston_core::{
    client::{HttpCommander, SegmentTracker},
    Commander, Workspace,
};

const SERVICE_NAME: &str = "houston";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = HoustonConfig::from_env()?;

    let telemetry = if config.jaeger_enabled {
        let tracer = opentelemetry_jaeger::new_agent_pipeline()
            .with_service_name(SERVICE_NAME)
            .install_batch(opentelemetry::runtime::Tokio)?;

        Some(tracing_opentelemetry::layer().with_tracer(tracer))
    } else {
        None
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(telemetry)
        .with(tracing_subscriber::fmt::layer())
        .try_init()?;

    tracing::info!("starting with {:?}", config);

    let (deployment_persistence, workspace_persistence): (
        Box<dyn DeploymentPersistence>,
        Box<dyn Persistence<Workspace>>,
    ) = match &config.database_url {
        Some(database_url) => {
            let db = Arc::new(
                PgPoolOptions::new()
                    .max_connections(20)
                    .connect(database_url)
                    .await?,
            );

            sqlx::migrate!().run(&*db).await?;

            (
                Box::new(DeploymentRelationalPersistence {
                    db: Arc::clone(&db),
                }),
                Box::new(WorkspaceRelationalPersistence {
                    db: Arc::clone(&db),
                }),
            )
        }
        None => {
            tracing::warn!("DATABASE_URL not set, using in-memory persistence");

            (
                Box::new(DeploymentMemoryPersistence::default()),
                Box::new(MemoryPersistence::<Workspace>::default()),
            )
        }
    };

    let commander: Arc<dyn Commander> = Arc::new(HttpCommander::new(
        &config.commander_url,
        config.commander_timeout,
    )?);

    let tracking = match &config.analytics_write_key {
        Some(write_key) => TrackingNotifier::new(Arc::new(SegmentTracker::new(write_key)?)),
        None => TrackingNotifier::disabled(),
    };

    let workspace_service = Arc::new(WorkspaceService {
        persistence: workspace_persistence,
    });

    let deployment_service = Arc::new(DeploymentService {
        persistence: deployment_persistence,
        workspace_service: Arc::clone(&workspace_service),

        commander,
        tracking,

        settings: DeploymentSettings {
            namespace_strategy: config.namespace_strategy.clone(),
            billing_enabled: config.billing_enabled,
        },
    });

    let registry_service = Arc::new(RegistryService {
        deployment_service: Arc::clone(&deployment_service),
    });

    let tracing_layer = ServiceBuilder::new().layer(TraceLayer::new_for_http().make_span_with(
        |request: &Request<Body>| {
            tracing::info_span!(
                "HTTP",
                http.method = %request.method(),
                http.url = %request.uri(),
                http.status_code = tracing::field::Empty,
                otel.name = %format!("HTTP {}", request.method()),
                otel.kind = "server",
                otel.status_code = tracing::field::Empty,
            )
        },
    ));

    let app = http_router(AppState {
        deployment_service,
        registry_service,
    })
    .layer(tracing_layer);

    let addr: SocketAddr = config.endpoint.parse()?;

    tracing::info!("http services listening on {}", addr);

    axum::Server::bind(&addr)
        .serve(app.into_make_service())
        .await?;

    opentelemetry::global::shutdown_tracer_provider();

    Ok(())
}
