mod deployment;
mod error;
mod registry;
mod tracking;
mod update;
mod workspace;

pub use deployment::{DeploymentService, DeploymentSettings, UPDATED_DEPLOYMENT_EVENT};
pub use error::{DeploymentError, SyncPhase};
pub use registry::{
    classify, Classification, IgnoreReason, RegistryBatchReport, RegistryEvent, RegistryEvents,
    RegistryRequest, RegistryService, RegistryTarget,
};
pub use tracking::TrackingNotifier;
pub use update::{merge, ConfigInput, DeploymentPayload, UpdateRequest};
pub use workspace::WorkspaceService;
