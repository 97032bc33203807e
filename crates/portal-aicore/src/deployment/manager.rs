//! AI Core operations on behalf of an authenticated caller.

use std::sync::Arc;

use portal_credentials::{CredentialStore, TeamCredentials};
use tracing::{debug, info};

use super::plan::{
    validate_configuration, validate_deployment_id, validate_modification, DeploymentPlan,
    DeploymentRequest,
};
use crate::client::{AiPlatformClient, InferenceCall, InferenceResponse};
use crate::config::UpstreamConfig;
use crate::error::{AiCoreError, AiCoreResult};
use crate::identity::Identity;
use crate::teams::{not_assigned, TeamDirectory};
use crate::types::{
    ConfigurationCreated, ConfigurationList, ConfigurationRequest, CreateDeploymentBody,
    CreateDeploymentResponse, Deployment, DeploymentModificationRequest,
    DeploymentModificationResponse, DeploymentsOverview, InferenceRequest, ModelList,
    TeamDeployments,
};

/// Orchestrates AI Core calls for a caller.
///
/// Every operation first resolves the caller's primary team and that team's
/// credentials, then validates its input, and only then talks to the platform.
pub struct AiCoreManager {
    directory: Arc<dyn TeamDirectory>,
    credentials: Arc<dyn CredentialStore>,
    client: Arc<dyn AiPlatformClient>,
    upstream: UpstreamConfig,
}

impl AiCoreManager {
    /// Create a new manager.
    pub fn new(
        directory: Arc<dyn TeamDirectory>,
        credentials: Arc<dyn CredentialStore>,
        client: Arc<dyn AiPlatformClient>,
        upstream: UpstreamConfig,
    ) -> Self {
        Self {
            directory,
            credentials,
            client,
            upstream,
        }
    }

    /// Resolve the caller's primary team credentials.
    ///
    /// # Errors
    ///
    /// [`AiCoreError::Authorization`] if the caller has no team,
    /// [`AiCoreError::CredentialsNotConfigured`] if the team has no key.
    pub async fn resolve(&self, identity: &Identity) -> AiCoreResult<TeamCredentials> {
        let team = self.directory.primary_team(identity)?;
        self.credentials
            .get(&team)
            .await?
            .ok_or(AiCoreError::CredentialsNotConfigured { team })
    }

    /// Deployments of every team of the caller.
    ///
    /// Teams without credentials are skipped; the call fails only if none
    /// of the caller's teams has any.
    pub async fn list_deployments(&self, identity: &Identity) -> AiCoreResult<DeploymentsOverview> {
        let teams = self.directory.teams_for(identity);
        let Some(primary) = teams.first().cloned() else {
            return Err(not_assigned());
        };

        let mut overview = DeploymentsOverview {
            count: 0,
            deployments: Vec::new(),
        };
        let mut resolved = false;

        for team in teams {
            let Some(credentials) = self.credentials.get(&team).await? else {
                debug!(team = %team, "no credentials, skipping team");
                continue;
            };
            resolved = true;

            let list = self.client.list_deployments(&credentials).await?;
            overview.count += list.resources.len();
            overview.deployments.push(TeamDeployments {
                team,
                deployments: list.resources,
            });
        }

        if !resolved {
            return Err(AiCoreError::CredentialsNotConfigured { team: primary });
        }

        Ok(overview)
    }

    /// A single deployment of the caller's primary team.
    pub async fn get_deployment(
        &self,
        identity: &Identity,
        deployment_id: &str,
    ) -> AiCoreResult<Deployment> {
        let credentials = self.resolve(identity).await?;
        let deployment_id = validate_deployment_id(deployment_id)?;
        self.client
            .get_deployment(&credentials, deployment_id)
            .await
    }

    /// Create a deployment, creating its configuration first if asked to.
    pub async fn create_deployment(
        &self,
        identity: &Identity,
        body: CreateDeploymentBody,
    ) -> AiCoreResult<CreateDeploymentResponse> {
        let credentials = self.resolve(identity).await?;
        let plan = DeploymentPlan::from(DeploymentRequest::try_from(body)?);

        info!(
            team = %credentials.team,
            subject = %identity.subject,
            composed = matches!(plan, DeploymentPlan::Composed { .. }),
            "creating deployment"
        );

        plan.execute(self.client.as_ref(), &credentials).await
    }

    /// Change the target status or configuration of a deployment.
    pub async fn update_deployment(
        &self,
        identity: &Identity,
        deployment_id: &str,
        request: DeploymentModificationRequest,
    ) -> AiCoreResult<DeploymentModificationResponse> {
        let credentials = self.resolve(identity).await?;
        let deployment_id = validate_deployment_id(deployment_id)?;
        let request = validate_modification(request)?;

        let response = self
            .client
            .update_deployment(&credentials, deployment_id, &request)
            .await?;

        info!(
            team = %credentials.team,
            deployment_id = %deployment_id,
            target_status = request.target_status.as_deref().unwrap_or("-"),
            configuration_id = request.configuration_id.as_deref().unwrap_or("-"),
            "deployment modification scheduled"
        );

        Ok(response)
    }

    /// Delete a deployment.
    pub async fn delete_deployment(
        &self,
        identity: &Identity,
        deployment_id: &str,
    ) -> AiCoreResult<DeploymentModificationResponse> {
        let credentials = self.resolve(identity).await?;
        let deployment_id = validate_deployment_id(deployment_id)?;

        let response = self
            .client
            .delete_deployment(&credentials, deployment_id)
            .await?;

        info!(
            team = %credentials.team,
            deployment_id = %deployment_id,
            "deployment deletion scheduled"
        );

        Ok(response)
    }

    /// Create a configuration on its own.
    pub async fn create_configuration(
        &self,
        identity: &Identity,
        request: ConfigurationRequest,
    ) -> AiCoreResult<ConfigurationCreated> {
        let credentials = self.resolve(identity).await?;
        validate_configuration(&request)?;

        let created = self
            .client
            .create_configuration(&credentials, &request)
            .await?;

        info!(
            team = %credentials.team,
            configuration_id = %created.id,
            name = %request.name,
            "configuration created"
        );

        Ok(created)
    }

    /// Configurations of the caller's primary team.
    pub async fn list_configurations(
        &self,
        identity: &Identity,
        scenario_id: Option<&str>,
    ) -> AiCoreResult<ConfigurationList> {
        let credentials = self.resolve(identity).await?;
        let scenario_id = scenario_id.map(str::trim).filter(|s| !s.is_empty());
        self.client
            .list_configurations(&credentials, scenario_id)
            .await
    }

    /// Models available in the configured scenario.
    pub async fn list_models(&self, identity: &Identity) -> AiCoreResult<ModelList> {
        let credentials = self.resolve(identity).await?;
        self.client
            .list_models(&credentials, &self.upstream.models_scenario)
            .await
    }

    /// Run a chat completion against a deployment.
    pub async fn inference(
        &self,
        identity: &Identity,
        request: InferenceRequest,
    ) -> AiCoreResult<InferenceResponse> {
        let credentials = self.resolve(identity).await?;

        if request.deployment_id.trim().is_empty() {
            return Err(AiCoreError::missing_field("deploymentId"));
        }
        if request.messages.is_empty() {
            return Err(AiCoreError::missing_field("messages"));
        }
        let deployment_id = validate_deployment_id(&request.deployment_id)?;

        let deployment = self
            .client
            .get_deployment(&credentials, deployment_id)
            .await?;

        let call = InferenceCall::build(&deployment, &request, &self.upstream.openai_api_version)?;

        debug!(
            team = %credentials.team,
            deployment_id = %call.deployment_id,
            family = ?call.family,
            stream = call.stream,
            "running inference"
        );

        self.client.inference(&credentials, &call).await
    }
}
