use axum::{
    routing::{get, post},
    Extension, Router,
};
use std::sync::Arc;

use crate::services::{DeploymentService, RegistryService};

pub mod deployment;
pub mod error;
pub mod health;
pub mod webhook;

pub const USER_HEADER: &str = "x-houston-user";
pub const ANONYMOUS_USER: &str = "anonymous";

#[derive(Clone, Debug)]
pub struct AppState {
    pub deployment_service: Arc<DeploymentService>,
    pub registry_service: Arc<RegistryService>,
}

pub fn http_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/v1/registry_events", post(webhook::registry_events))
        .route("/v1/deployments/:deployment_id", post(deployment::update))
        .layer(Extension(state))
}
