//! Upstream AI Core platform client.
//!
//! [`AiPlatformClient`] is the one capability the rest of the crate talks
//! to. [`HttpAiPlatformClient`] implements it over HTTP; [`RecordingClient`]
//! is the in-process double used by tests.

mod http;
pub mod inference;
pub mod recording;
mod token;

use async_trait::async_trait;
use portal_credentials::TeamCredentials;

use crate::error::{AiCoreError, AiCoreResult};
use crate::types::{
    ConfigurationCreated, ConfigurationList, ConfigurationRequest, Deployment, DeploymentCreated,
    DeploymentList, DeploymentModificationRequest, DeploymentModificationResponse, ModelList,
    UpstreamDeploymentCreate,
};

pub use http::HttpAiPlatformClient;
pub use inference::{InferenceCall, InferenceResponse, InferenceStream, ModelFamily};
pub use recording::{RecordedCall, RecordingClient};
pub use token::TokenCache;

/// Header naming the resource group of every API call.
pub const RESOURCE_GROUP_HEADER: &str = "AI-Resource-Group";

/// Operation names used in upstream error messages.
pub mod operation {
    pub const LIST_DEPLOYMENTS: &str = "list deployments";
    pub const GET_DEPLOYMENT: &str = "get deployment";
    pub const CREATE_CONFIGURATION: &str = "create configuration";
    pub const LIST_CONFIGURATIONS: &str = "list configurations";
    pub const CREATE_DEPLOYMENT: &str = "create deployment";
    pub const UPDATE_DEPLOYMENT: &str = "update deployment";
    pub const DELETE_DEPLOYMENT: &str = "delete deployment";
    pub const LIST_MODELS: &str = "list models";
    pub const INFERENCE: &str = "inference";
    pub const FETCH_TOKEN: &str = "fetch access token";
}

/// Calls against the upstream AI Core platform on behalf of one team.
///
/// Each call is attempted exactly once. A 404 answer becomes
/// [`AiCoreError::NotFound`]; any other failure status becomes
/// [`AiCoreError::Upstream`].
#[async_trait]
pub trait AiPlatformClient: Send + Sync {
    async fn list_deployments(&self, credentials: &TeamCredentials)
        -> AiCoreResult<DeploymentList>;

    async fn get_deployment(
        &self,
        credentials: &TeamCredentials,
        deployment_id: &str,
    ) -> AiCoreResult<Deployment>;

    async fn create_configuration(
        &self,
        credentials: &TeamCredentials,
        request: &ConfigurationRequest,
    ) -> AiCoreResult<ConfigurationCreated>;

    async fn list_configurations(
        &self,
        credentials: &TeamCredentials,
        scenario_id: Option<&str>,
    ) -> AiCoreResult<ConfigurationList>;

    async fn create_deployment(
        &self,
        credentials: &TeamCredentials,
        request: &UpstreamDeploymentCreate,
    ) -> AiCoreResult<DeploymentCreated>;

    async fn update_deployment(
        &self,
        credentials: &TeamCredentials,
        deployment_id: &str,
        request: &DeploymentModificationRequest,
    ) -> AiCoreResult<DeploymentModificationResponse>;

    async fn delete_deployment(
        &self,
        credentials: &TeamCredentials,
        deployment_id: &str,
    ) -> AiCoreResult<DeploymentModificationResponse>;

    async fn list_models(
        &self,
        credentials: &TeamCredentials,
        scenario_id: &str,
    ) -> AiCoreResult<ModelList>;

    /// Run a chat completion against a deployment's inference endpoint.
    async fn inference(
        &self,
        credentials: &TeamCredentials,
        call: &InferenceCall,
    ) -> AiCoreResult<InferenceResponse>;
}

/// Map a failed upstream status to an error.
pub(crate) fn upstream_error(
    operation: &'static str,
    status: u16,
    message: impl Into<String>,
) -> AiCoreError {
    let message = message.into();
    if status == 404 {
        AiCoreError::NotFound(format!("{operation} failed: not found"))
    } else {
        AiCoreError::Upstream {
            operation,
            status,
            message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_maps_to_not_found() {
        let err = upstream_error(operation::GET_DEPLOYMENT, 404, "missing");
        assert!(matches!(err, AiCoreError::NotFound(_)));
        assert_eq!(err.to_string(), "get deployment failed: not found");
    }

    #[test]
    fn other_statuses_keep_operation() {
        let err = upstream_error(operation::CREATE_DEPLOYMENT, 503, "unavailable");
        assert_eq!(
            err.to_string(),
            "create deployment failed: upstream returned 503: unavailable"
        );
    }
}
