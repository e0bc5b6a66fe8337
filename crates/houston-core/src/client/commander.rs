use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;

use crate::{Commander, CommanderError, SetSecretRequest, UpdateWorkloadRequest};

impl From<reqwest::Error> for CommanderError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            CommanderError::Timeout
        } else {
            CommanderError::Transport(err.to_string())
        }
    }
}

/// Talks JSON over HTTP to the commander sidecar that owns the cluster.
#[derive(Clone, Debug)]
pub struct HttpCommander {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpCommander {
    pub fn new(endpoint: &str, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn post<T: Serialize + ?Sized>(
        &self,
        operation: &'static str,
        path: &str,
        body: &T,
    ) -> Result<(), CommanderError> {
        let url = format!("{}{}", self.endpoint, path);

        let response = self.client.post(&url).json(body).send().await?;
        let status = response.status();

        if status.is_success() {
            tracing::debug!("commander {} succeeded with {}", operation, status);
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        tracing::error!("commander {} failed with {}: {}", operation, status, body);

        Err(CommanderError::Rejected {
            operation,
            status: status.as_u16(),
            body,
        })
    }
}

#[async_trait]
impl Commander for HttpCommander {
    #[tracing::instrument(name = "commander::set_secret", skip_all, fields(release_name = %request.release_name))]
    async fn set_secret(&self, request: &SetSecretRequest) -> Result<(), CommanderError> {
        self.post("setSecret", "/v1/secrets", request).await
    }

    #[tracing::instrument(name = "commander::update_workload", skip_all, fields(release_name = %request.release_name))]
    async fn update_workload(&self, request: &UpdateWorkloadRequest) -> Result<(), CommanderError> {
        let path = format!("/v1/releases/{}", request.release_name);

        self.post("updateDeployment", &path, request).await
    }
}
