//! Deployment request validation and AI Core orchestration.

mod manager;
pub mod plan;

pub use manager::AiCoreManager;
pub use plan::{ConfigurationSource, DeploymentPlan, DeploymentRequest};
