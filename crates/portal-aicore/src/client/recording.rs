//! In-process [`AiPlatformClient`] that records every call.
//!
//! Scripted state (deployments, configurations, models, failures) is set up
//! with the `with_*` builders; [`RecordingClient::calls`] returns what was
//! asked of the platform, in order.

use std::collections::HashMap;

use async_trait::async_trait;
use bytes::Bytes;
use portal_credentials::TeamCredentials;
use serde_json::Value;
use tokio::sync::Mutex;

use super::inference::{InferenceCall, InferenceResponse, InferenceStream};
use super::{operation, upstream_error, AiPlatformClient};
use crate::error::AiCoreResult;
use crate::types::{
    Configuration, ConfigurationCreated, ConfigurationList, ConfigurationRequest, Deployment,
    DeploymentCreated, DeploymentList, DeploymentModificationRequest,
    DeploymentModificationResponse, Model, ModelList, UpstreamDeploymentCreate,
};

/// A call made against the [`RecordingClient`].
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedCall {
    ListDeployments {
        team: String,
    },
    GetDeployment {
        team: String,
        deployment_id: String,
    },
    CreateConfiguration {
        team: String,
        request: ConfigurationRequest,
    },
    ListConfigurations {
        team: String,
        scenario_id: Option<String>,
    },
    CreateDeployment {
        team: String,
        request: UpstreamDeploymentCreate,
    },
    UpdateDeployment {
        team: String,
        deployment_id: String,
        request: DeploymentModificationRequest,
    },
    DeleteDeployment {
        team: String,
        deployment_id: String,
    },
    ListModels {
        team: String,
        scenario_id: String,
    },
    Inference {
        team: String,
        call: InferenceCall,
    },
}

impl RecordedCall {
    /// Upstream operation name of this call.
    pub fn operation(&self) -> &'static str {
        match self {
            Self::ListDeployments { .. } => operation::LIST_DEPLOYMENTS,
            Self::GetDeployment { .. } => operation::GET_DEPLOYMENT,
            Self::CreateConfiguration { .. } => operation::CREATE_CONFIGURATION,
            Self::ListConfigurations { .. } => operation::LIST_CONFIGURATIONS,
            Self::CreateDeployment { .. } => operation::CREATE_DEPLOYMENT,
            Self::UpdateDeployment { .. } => operation::UPDATE_DEPLOYMENT,
            Self::DeleteDeployment { .. } => operation::DELETE_DEPLOYMENT,
            Self::ListModels { .. } => operation::LIST_MODELS,
            Self::Inference { .. } => operation::INFERENCE,
        }
    }
}

#[derive(Default)]
struct State {
    calls: Vec<RecordedCall>,
    deployments: HashMap<String, Vec<Deployment>>,
    configurations: HashMap<String, Vec<Configuration>>,
    models: Vec<Model>,
    failures: HashMap<&'static str, (u16, String)>,
    completion: Option<Value>,
    stream_chunks: Vec<Bytes>,
    next_id: u64,
}

impl State {
    fn record(&mut self, call: RecordedCall) -> AiCoreResult<()> {
        let operation = call.operation();
        self.calls.push(call);
        match self.failures.get(operation) {
            Some((status, message)) => Err(upstream_error(operation, *status, message.clone())),
            None => Ok(()),
        }
    }

    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}-{}", self.next_id)
    }
}

/// Recording test double for the upstream platform.
///
/// New configurations get IDs `config-<n>` and new deployments `deployment-<n>`,
/// numbered from one in creation order. Created deployments report `PENDING`
/// and no TTL.
#[derive(Default)]
pub struct RecordingClient {
    state: Mutex<State>,
}

impl RecordingClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an existing deployment for a team.
    #[must_use]
    pub fn with_deployment(mut self, team: impl Into<String>, deployment: Deployment) -> Self {
        self.state
            .get_mut()
            .deployments
            .entry(team.into())
            .or_default()
            .push(deployment);
        self
    }

    /// Add an existing configuration for a team.
    #[must_use]
    pub fn with_configuration(
        mut self,
        team: impl Into<String>,
        configuration: Configuration,
    ) -> Self {
        self.state
            .get_mut()
            .configurations
            .entry(team.into())
            .or_default()
            .push(configuration);
        self
    }

    /// Add a model to the model list.
    #[must_use]
    pub fn with_model(mut self, model: Model) -> Self {
        self.state.get_mut().models.push(model);
        self
    }

    /// Make every call of `operation` fail with the given status.
    #[must_use]
    pub fn failing(
        mut self,
        operation: &'static str,
        status: u16,
        message: impl Into<String>,
    ) -> Self {
        self.state
            .get_mut()
            .failures
            .insert(operation, (status, message.into()));
        self
    }

    /// JSON answer for non-streaming inference.
    #[must_use]
    pub fn with_completion(mut self, completion: Value) -> Self {
        self.state.get_mut().completion = Some(completion);
        self
    }

    /// Chunks of the event stream for streaming inference.
    #[must_use]
    pub fn with_stream_chunks<I, C>(mut self, chunks: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Bytes>,
    {
        self.state.get_mut().stream_chunks = chunks.into_iter().map(Into::into).collect();
        self
    }

    /// Calls made so far, in order.
    pub async fn calls(&self) -> Vec<RecordedCall> {
        self.state.lock().await.calls.clone()
    }
}

#[async_trait]
impl AiPlatformClient for RecordingClient {
    async fn list_deployments(
        &self,
        credentials: &TeamCredentials,
    ) -> AiCoreResult<DeploymentList> {
        let mut state = self.state.lock().await;
        state.record(RecordedCall::ListDeployments {
            team: credentials.team.clone(),
        })?;

        let resources = state
            .deployments
            .get(&credentials.team)
            .cloned()
            .unwrap_or_default();
        Ok(DeploymentList {
            count: resources.len() as u64,
            resources,
        })
    }

    async fn get_deployment(
        &self,
        credentials: &TeamCredentials,
        deployment_id: &str,
    ) -> AiCoreResult<Deployment> {
        let mut state = self.state.lock().await;
        state.record(RecordedCall::GetDeployment {
            team: credentials.team.clone(),
            deployment_id: deployment_id.to_owned(),
        })?;

        state
            .deployments
            .get(&credentials.team)
            .and_then(|list| list.iter().find(|d| d.id == deployment_id))
            .cloned()
            .ok_or_else(|| upstream_error(operation::GET_DEPLOYMENT, 404, deployment_id))
    }

    async fn create_configuration(
        &self,
        credentials: &TeamCredentials,
        request: &ConfigurationRequest,
    ) -> AiCoreResult<ConfigurationCreated> {
        let mut state = self.state.lock().await;
        state.record(RecordedCall::CreateConfiguration {
            team: credentials.team.clone(),
            request: request.clone(),
        })?;

        let id = state.next_id("config");
        state
            .configurations
            .entry(credentials.team.clone())
            .or_default()
            .push(Configuration {
                id: id.clone(),
                name: request.name.clone(),
                executable_id: request.executable_id.clone(),
                scenario_id: request.scenario_id.clone(),
                parameter_bindings: request.parameter_bindings.clone(),
                created_at: None,
            });

        Ok(ConfigurationCreated {
            id,
            message: "Configuration created".to_owned(),
        })
    }

    async fn list_configurations(
        &self,
        credentials: &TeamCredentials,
        scenario_id: Option<&str>,
    ) -> AiCoreResult<ConfigurationList> {
        let mut state = self.state.lock().await;
        state.record(RecordedCall::ListConfigurations {
            team: credentials.team.clone(),
            scenario_id: scenario_id.map(str::to_owned),
        })?;

        let resources: Vec<Configuration> = state
            .configurations
            .get(&credentials.team)
            .into_iter()
            .flatten()
            .filter(|c| scenario_id.map_or(true, |s| c.scenario_id == s))
            .cloned()
            .collect();
        Ok(ConfigurationList {
            count: resources.len() as u64,
            resources,
        })
    }

    async fn create_deployment(
        &self,
        credentials: &TeamCredentials,
        request: &UpstreamDeploymentCreate,
    ) -> AiCoreResult<DeploymentCreated> {
        let mut state = self.state.lock().await;
        state.record(RecordedCall::CreateDeployment {
            team: credentials.team.clone(),
            request: request.clone(),
        })?;

        let id = state.next_id("deployment");
        state
            .deployments
            .entry(credentials.team.clone())
            .or_default()
            .push(Deployment {
                id: id.clone(),
                configuration_id: Some(request.configuration_id.clone()),
                status: Some("PENDING".to_owned()),
                ttl: request.ttl.clone(),
                ..Deployment::default()
            });

        Ok(DeploymentCreated {
            id,
            message: "Deployment scheduled.".to_owned(),
            deployment_url: None,
            status: Some("PENDING".to_owned()),
            ttl: None,
        })
    }

    async fn update_deployment(
        &self,
        credentials: &TeamCredentials,
        deployment_id: &str,
        request: &DeploymentModificationRequest,
    ) -> AiCoreResult<DeploymentModificationResponse> {
        let mut state = self.state.lock().await;
        state.record(RecordedCall::UpdateDeployment {
            team: credentials.team.clone(),
            deployment_id: deployment_id.to_owned(),
            request: request.clone(),
        })?;

        let deployment = state
            .deployments
            .get_mut(&credentials.team)
            .and_then(|list| list.iter_mut().find(|d| d.id == deployment_id))
            .ok_or_else(|| upstream_error(operation::UPDATE_DEPLOYMENT, 404, deployment_id))?;

        if let Some(target) = &request.target_status {
            deployment.target_status = Some(target.clone());
        }
        if let Some(configuration_id) = &request.configuration_id {
            deployment.configuration_id = Some(configuration_id.clone());
        }

        Ok(DeploymentModificationResponse {
            id: deployment_id.to_owned(),
            message: "Deployment modification scheduled".to_owned(),
            target_status: request.target_status.clone(),
        })
    }

    async fn delete_deployment(
        &self,
        credentials: &TeamCredentials,
        deployment_id: &str,
    ) -> AiCoreResult<DeploymentModificationResponse> {
        let mut state = self.state.lock().await;
        state.record(RecordedCall::DeleteDeployment {
            team: credentials.team.clone(),
            deployment_id: deployment_id.to_owned(),
        })?;

        let list = state
            .deployments
            .get_mut(&credentials.team)
            .ok_or_else(|| upstream_error(operation::DELETE_DEPLOYMENT, 404, deployment_id))?;
        let index = list
            .iter()
            .position(|d| d.id == deployment_id)
            .ok_or_else(|| upstream_error(operation::DELETE_DEPLOYMENT, 404, deployment_id))?;
        list.remove(index);

        Ok(DeploymentModificationResponse {
            id: deployment_id.to_owned(),
            message: "Deletion scheduled".to_owned(),
            target_status: Some("DELETED".to_owned()),
        })
    }

    async fn list_models(
        &self,
        credentials: &TeamCredentials,
        scenario_id: &str,
    ) -> AiCoreResult<ModelList> {
        let mut state = self.state.lock().await;
        state.record(RecordedCall::ListModels {
            team: credentials.team.clone(),
            scenario_id: scenario_id.to_owned(),
        })?;

        Ok(ModelList {
            count: state.models.len() as u64,
            resources: state.models.clone(),
        })
    }

    async fn inference(
        &self,
        credentials: &TeamCredentials,
        call: &InferenceCall,
    ) -> AiCoreResult<InferenceResponse> {
        let mut state = self.state.lock().await;
        state.record(RecordedCall::Inference {
            team: credentials.team.clone(),
            call: call.clone(),
        })?;

        if call.stream {
            let chunks: Vec<AiCoreResult<Bytes>> =
                state.stream_chunks.iter().cloned().map(Ok).collect();
            return Ok(InferenceResponse::Stream(InferenceStream {
                content_type: Some("text/event-stream".to_owned()),
                body: Box::pin(futures::stream::iter(chunks)),
            }));
        }

        Ok(InferenceResponse::Json(
            state.completion.clone().unwrap_or(Value::Null),
        ))
    }
}
