use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use houston::{
    http::{http_router, AppState, USER_HEADER},
    persistence::memory::{DeploymentMemoryPersistence, MemoryPersistence},
    services::{
        DeploymentService, DeploymentSettings, RegistryService, TrackingNotifier,
        WorkspaceService,
    },
};
use houston_core::{
    test::{get_deployment_fixture, get_trial_workspace_fixture, get_workspace_fixture},
    Commander, Deployment, NamespaceStrategy, Tracker, Workspace,
};
use houston_memory::{MemoryCommander, MemoryTracker};

struct Control {
    router: Router,
    deployment_service: Arc<DeploymentService>,
    commander: Arc<MemoryCommander>,
}

async fn control_plane(billing_enabled: bool) -> Control {
    dotenvy::from_filename(".env.test").ok();

    let workspace_service = Arc::new(WorkspaceService {
        persistence: Box::new(MemoryPersistence::<Workspace>::default()),
    });
    workspace_service
        .upsert(&get_workspace_fixture(None))
        .await
        .unwrap();
    workspace_service
        .upsert(&get_trial_workspace_fixture())
        .await
        .unwrap();

    let commander = Arc::new(MemoryCommander::new());
    let tracker: Arc<dyn Tracker> = Arc::new(MemoryTracker::new());

    let deployment_service = Arc::new(DeploymentService {
        persistence: Box::new(DeploymentMemoryPersistence::default()),
        workspace_service,

        commander: Arc::clone(&commander) as Arc<dyn Commander>,
        tracking: TrackingNotifier::new(tracker),

        settings: DeploymentSettings {
            namespace_strategy: NamespaceStrategy::default(),
            billing_enabled,
        },
    });

    deployment_service
        .upsert(&get_deployment_fixture(None))
        .await
        .unwrap();

    let registry_service = Arc::new(RegistryService {
        deployment_service: Arc::clone(&deployment_service),
    });

    let router = http_router(AppState {
        deployment_service: Arc::clone(&deployment_service),
        registry_service,
    });

    Control {
        router,
        deployment_service,
        commander,
    }
}

async fn post_json(router: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .header(USER_HEADER, "user-1")
        .body(Body::from(body.to_string()))
        .unwrap();

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();

    let bytes = hyper::body::to_bytes(response.into_body()).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

    (status, body)
}

#[tokio::test]
async fn test_health() {
    let control = control_plane(false).await;

    let request = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();

    let response = control.router.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_e2e() {
    let control = control_plane(false).await;
    let deployment = get_deployment_fixture(None);

    // stage a change locally
    let (status, body) = post_json(
        &control.router,
        &format!("/v1/deployments/{}", deployment.id),
        json!({
            "payload": { "label": "Staged", "releaseName": "ignored-name-0000" },
            "config": [
                { "key": "workers.replicas", "value": 4 },
                { "key": "airflowVersion", "value": "1.10" }
            ],
            "sync": false
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["label"], "Staged");
    assert_eq!(body["releaseName"], deployment.release_name);
    assert!(body.get("env").is_none());
    assert!(control.commander.workload_requests().is_empty());

    // sync it with new environment variables
    let (status, body) = post_json(
        &control.router,
        &format!("/v1/deployments/{}", deployment.id),
        json!({
            "env": [{ "name": "API_TOKEN", "value": "hunter2" }],
            "sync": true
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK, "{body}");
    assert!(!body.to_string().contains("hunter2"));

    let secret_requests = control.commander.secret_requests();
    assert_eq!(secret_requests.len(), 1);
    assert_eq!(secret_requests[0].secret.data["API_TOKEN"], "hunter2");

    let workload_requests = control.commander.workload_requests();
    assert_eq!(workload_requests.len(), 1);
    assert_eq!(workload_requests[0].values["workers"]["replicas"], 4);
    assert_eq!(workload_requests[0].values["airflowVersion"], "1.10");
    assert!(!workload_requests[0].values.to_string().contains("hunter2"));

    // a CLI build lands in the registry, latest is ignored
    let (status, body) = post_json(
        &control.router,
        "/v1/registry_events",
        json!({
            "events": [
                {
                    "id": "event-1",
                    "action": "push",
                    "target": { "repository": "cosmic-dust-1234/airflow", "tag": "latest" },
                    "request": { "host": "registry.houston.example" }
                },
                {
                    "id": "event-2",
                    "action": "push",
                    "target": { "repository": "cosmic-dust-1234/airflow", "tag": "cli-7" },
                    "request": { "host": "registry.houston.example" }
                }
            ]
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "upgraded": 1, "ignored": 1, "failed": 0 }));

    let workload_requests = control.commander.workload_requests();
    assert_eq!(workload_requests.len(), 2);
    assert_eq!(
        workload_requests[1].values["images"]["airflow"]["repository"],
        "registry.houston.example/cosmic-dust-1234/airflow"
    );
    assert_eq!(workload_requests[1].values["workers"]["replicas"], 4);

    // the registry upgrade re-applies the stored secret unchanged
    let secret_requests = control.commander.secret_requests();
    assert_eq!(secret_requests[1], secret_requests[0]);

    let stored: Deployment = control
        .deployment_service
        .get_by_id(&deployment.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.label, "Staged");
    assert_eq!(stored.config.len(), 4);
}

#[tokio::test]
async fn test_error_statuses() {
    let control = control_plane(true).await;

    let (status, _) = post_json(
        &control.router,
        "/v1/deployments/no-such-deployment",
        json!({ "sync": true }),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = post_json(
        &control.router,
        &format!("/v1/deployments/{}", get_deployment_fixture(None).id),
        json!({ "payload": { "version": "latest" } }),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["retryable"], false);
    assert_eq!(body["violations"].as_array().unwrap().len(), 1);

    let trial_deployment = Deployment {
        workspace_id: get_trial_workspace_fixture().id,
        ..get_deployment_fixture(Some("trial-nebula-0001"))
    };
    control
        .deployment_service
        .upsert(&trial_deployment)
        .await
        .unwrap();

    let (status, _) = post_json(
        &control.router,
        &format!("/v1/deployments/{}", trial_deployment.id),
        json!({ "payload": { "label": "Anything" } }),
    )
    .await;
    assert_eq!(status, StatusCode::PAYMENT_REQUIRED);
}

#[tokio::test]
async fn test_malformed_registry_batch_is_rejected() {
    let control = control_plane(false).await;

    let (status, _) = post_json(
        &control.router,
        "/v1/registry_events",
        json!({ "not_events": [] }),
    )
    .await;

    assert!(status.is_client_error());
}
