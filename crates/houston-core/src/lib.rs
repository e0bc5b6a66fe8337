pub mod client;
mod commander;
pub mod desired_state;
mod model;
pub mod naming;
mod tracker;

pub use commander::{
    ChartRef, Commander, CommanderError, SecretPayload, SetSecretRequest, UpdateWorkloadRequest,
};
pub use desired_state::DesiredState;
pub use model::{ConfigEntry, Deployment, DeploymentUpdate, EnvironmentVariable, Workspace};
pub use naming::{NamespaceStrategy, ReleaseName, Service};
pub use tracker::{TrackEvent, Tracker};
