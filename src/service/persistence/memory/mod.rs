mod deployment;
mod generic;

pub use deployment::DeploymentMemoryPersistence;
pub use generic::MemoryPersistence;
