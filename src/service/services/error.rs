use houston_core::CommanderError;
use std::fmt;
use thiserror::Error;

/// The remote call that failed during synchronization.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SyncPhase {
    Secret,
    Workload,
}

impl fmt::Display for SyncPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncPhase::Secret => write!(f, "secret"),
            SyncPhase::Workload => write!(f, "workload"),
        }
    }
}

#[derive(Debug, Error)]
pub enum DeploymentError {
    #[error("workspace {workspace_id} is on a trial and cannot update deployments")]
    TrialRestricted { workspace_id: String },

    #[error("invalid deployment: {}", .0.join("; "))]
    Validation(Vec<String>),

    #[error("{0} not found")]
    NotFound(String),

    #[error("failed to persist deployment: {0}")]
    Persistence(anyhow::Error),

    #[error("failed to render desired state: {0}")]
    Render(#[from] serde_json::Error),

    /// The store holds the new state but the cluster has not converged.
    #[error("deployment saved but {phase} synchronization failed: {source}")]
    Synchronization {
        phase: SyncPhase,
        #[source]
        source: CommanderError,
    },

    #[error("no free release name after {attempts} attempts")]
    ReleaseNameExhausted { attempts: usize },
}

impl DeploymentError {
    /// Whether repeating the same call may succeed without changing input.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            DeploymentError::Persistence(_)
                | DeploymentError::Synchronization { .. }
                | DeploymentError::ReleaseNameExhausted { .. }
        )
    }
}
