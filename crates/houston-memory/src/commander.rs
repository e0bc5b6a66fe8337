use async_trait::async_trait;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Mutex,
};

use houston_core::{Commander, CommanderError, SetSecretRequest, UpdateWorkloadRequest};

/// Records every request it receives. Failures can be switched on per
/// operation to exercise partial synchronization.
#[derive(Debug, Default)]
pub struct MemoryCommander {
    secret_requests: Mutex<Vec<SetSecretRequest>>,
    workload_requests: Mutex<Vec<UpdateWorkloadRequest>>,

    fail_set_secret: AtomicBool,
    fail_update_workload: AtomicBool,
    time_out: AtomicBool,
}

impl MemoryCommander {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_set_secret(self) -> Self {
        self.fail_set_secret.store(true, Ordering::SeqCst);
        self
    }

    pub fn failing_update_workload(self) -> Self {
        self.fail_update_workload.store(true, Ordering::SeqCst);
        self
    }

    /// Failures surface as timeouts instead of rejections.
    pub fn timing_out(self) -> Self {
        self.time_out.store(true, Ordering::SeqCst);
        self
    }

    pub fn heal(&self) {
        self.fail_set_secret.store(false, Ordering::SeqCst);
        self.fail_update_workload.store(false, Ordering::SeqCst);
    }

    pub fn secret_requests(&self) -> Vec<SetSecretRequest> {
        self.secret_requests
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn workload_requests(&self) -> Vec<UpdateWorkloadRequest> {
        self.workload_requests
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn failure(&self, operation: &'static str) -> CommanderError {
        if self.time_out.load(Ordering::SeqCst) {
            CommanderError::Timeout
        } else {
            CommanderError::Rejected {
                operation,
                status: 500,
                body: "injected failure".to_owned(),
            }
        }
    }
}

#[async_trait]
impl Commander for MemoryCommander {
    async fn set_secret(&self, request: &SetSecretRequest) -> Result<(), CommanderError> {
        if self.fail_set_secret.load(Ordering::SeqCst) {
            return Err(self.failure("setSecret"));
        }

        self.secret_requests
            .lock()
            .map_err(|_| CommanderError::Transport("failed to acquire lock".to_owned()))?
            .push(request.clone());

        Ok(())
    }

    async fn update_workload(&self, request: &UpdateWorkloadRequest) -> Result<(), CommanderError> {
        if self.fail_update_workload.load(Ordering::SeqCst) {
            return Err(self.failure("updateDeployment"));
        }

        self.workload_requests
            .lock()
            .map_err(|_| CommanderError::Transport("failed to acquire lock".to_owned()))?
            .push(request.clone());

        Ok(())
    }
}
