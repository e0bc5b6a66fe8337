use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::services::DeploymentError;

#[derive(Debug)]
pub struct ApiError(pub DeploymentError);

impl From<DeploymentError> for ApiError {
    fn from(err: DeploymentError) -> Self {
        ApiError(err)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            DeploymentError::TrialRestricted { .. } => StatusCode::PAYMENT_REQUIRED,
            DeploymentError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            DeploymentError::NotFound(_) => StatusCode::NOT_FOUND,
            DeploymentError::Persistence(_) => StatusCode::SERVICE_UNAVAILABLE,
            DeploymentError::Synchronization { source, .. } if source.is_timeout() => {
                StatusCode::GATEWAY_TIMEOUT
            }
            DeploymentError::Synchronization { .. } => StatusCode::BAD_GATEWAY,
            DeploymentError::Render(_) | DeploymentError::ReleaseNameExhausted { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        let violations = match &self.0 {
            DeploymentError::Validation(violations) => violations.clone(),
            _ => Vec::new(),
        };

        let body = json!({
            "error": self.0.to_string(),
            "retryable": self.0.is_retryable(),
            "violations": violations,
        });

        (status, Json(body)).into_response()
    }
}
