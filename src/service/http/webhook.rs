use axum::{Extension, Json};

use super::AppState;
use crate::services::{RegistryBatchReport, RegistryEvents};

/// Always answers 200 for a well formed batch so the registry never retries
/// events we chose to ignore.
#[tracing::instrument(name = "http::registry_events", skip_all, fields(events = body.events.len()))]
pub async fn registry_events(
    Extension(state): Extension<AppState>,
    Json(body): Json<RegistryEvents>,
) -> Json<RegistryBatchReport> {
    let report = state.registry_service.process(&body.events).await;

    tracing::info!(
        "registry batch processed: {} upgraded, {} ignored, {} failed",
        report.upgraded,
        report.ignored,
        report.failed
    );

    Json(report)
}
