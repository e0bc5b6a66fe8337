use axum::{extract::Path, http::HeaderMap, Extension, Json};
use houston_core::Deployment;

use super::{error::ApiError, AppState, ANONYMOUS_USER, USER_HEADER};
use crate::services::UpdateRequest;

fn user_id(headers: &HeaderMap) -> &str {
    headers
        .get(USER_HEADER)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty())
        .unwrap_or(ANONYMOUS_USER)
}

#[tracing::instrument(name = "http::deployment::update", skip_all, fields(deployment_id = %deployment_id))]
pub async fn update(
    Extension(state): Extension<AppState>,
    Path(deployment_id): Path<String>,
    headers: HeaderMap,
    Json(mut request): Json<UpdateRequest>,
) -> Result<Json<Deployment>, ApiError> {
    // the path names the deployment, whatever the body says
    request.deployment_id = deployment_id;

    let deployment = state
        .deployment_service
        .update(user_id(&headers), &request)
        .await?;

    Ok(Json(deployment))
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    #[test]
    fn test_user_id() {
        let mut headers = HeaderMap::new();
        assert_eq!(user_id(&headers), ANONYMOUS_USER);

        headers.insert(USER_HEADER, HeaderValue::from_static("user-1"));
        assert_eq!(user_id(&headers), "user-1");

        headers.insert(USER_HEADER, HeaderValue::from_static(""));
        assert_eq!(user_id(&headers), ANONYMOUS_USER);
    }
}
