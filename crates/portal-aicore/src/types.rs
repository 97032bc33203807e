//! Wire types shared by the HTTP API and the upstream client.
//!
//! Field names follow the platform's camelCase JSON. Inbound request types
//! default every field so that presence checks produce this crate's own
//! validation errors rather than deserialisation failures.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Body of `POST /ai-core/deployments` as sent by the browser.
///
/// Converted into a [`crate::deployment::DeploymentRequest`] before anything
/// else happens; see [`crate::deployment::plan`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDeploymentBody {
    /// Existing configuration to deploy.
    #[serde(default)]
    pub configuration_id: Option<String>,
    /// Configuration to create first.
    #[serde(default)]
    pub configuration_request: Option<ConfigurationRequest>,
    /// Requested lifetime, passed through unvalidated.
    #[serde(default)]
    pub ttl: Option<String>,
}

/// A configuration to create upstream.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigurationRequest {
    /// Configuration name.
    #[serde(default)]
    pub name: String,
    /// Runtime / model family, e.g. `azure-openai`.
    #[serde(default)]
    pub executable_id: String,
    /// Catalog scope, e.g. `foundation-models`.
    #[serde(default)]
    pub scenario_id: String,
    /// Parameter bindings in the order given.
    #[serde(default)]
    pub parameter_bindings: Vec<ParameterBinding>,
}

/// A single key/value parameter binding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterBinding {
    /// Parameter name.
    pub key: String,
    /// Parameter value.
    pub value: String,
}

impl ParameterBinding {
    /// Create a binding.
    #[must_use]
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Body of `PATCH /ai-core/deployments/{id}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentModificationRequest {
    /// Desired status, e.g. `STOPPED`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_status: Option<String>,
    /// Configuration to switch the deployment to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub configuration_id: Option<String>,
}

/// Deployment-create call sent to the platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpstreamDeploymentCreate {
    /// Configuration to deploy.
    pub configuration_id: String,
    /// Requested lifetime.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ttl: Option<String>,
}

/// A deployment as reported by the platform.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deployment {
    /// Deployment ID.
    pub id: String,
    /// Inference endpoint, present once the deployment is running.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deployment_url: Option<String>,
    /// Configuration the deployment runs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub configuration_id: Option<String>,
    /// Name of that configuration.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub configuration_name: Option<String>,
    /// Executable (model family) of the configuration.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub executable_id: Option<String>,
    /// Scenario of the configuration.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scenario_id: Option<String>,
    /// Current status, e.g. `PENDING`, `RUNNING`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Human-readable status detail.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_message: Option<String>,
    /// Status the platform is moving towards.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_status: Option<String>,
    /// Last lifecycle operation, e.g. `CREATE`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_operation: Option<String>,
    /// Requested lifetime.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ttl: Option<String>,
    /// Backend details (model name and version, resources).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    /// Creation timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    /// Last modification timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_at: Option<DateTime<Utc>>,
    /// Submission timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submission_time: Option<DateTime<Utc>>,
    /// Start timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<DateTime<Utc>>,
    /// Completion timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completion_time: Option<DateTime<Utc>>,
}

impl Deployment {
    /// Model name from the backend details, if the platform reported one.
    #[must_use]
    pub fn model_name(&self) -> Option<&str> {
        let details = self.details.as_ref()?;
        details
            .pointer("/resources/backend_details/model/name")
            .or_else(|| details.pointer("/resources/backendDetails/model/name"))
            .and_then(serde_json::Value::as_str)
    }
}

/// Paged deployment list from the platform.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeploymentList {
    /// Total count reported upstream.
    #[serde(default)]
    pub count: u64,
    /// Deployments.
    #[serde(default)]
    pub resources: Vec<Deployment>,
}

/// Platform answer to a deployment create.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentCreated {
    /// New deployment ID.
    pub id: String,
    /// Platform message.
    #[serde(default)]
    pub message: String,
    /// Inference endpoint, if already assigned.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deployment_url: Option<String>,
    /// Initial status, normally `PENDING`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Lifetime accepted by the platform.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ttl: Option<String>,
}

/// Response of `POST /ai-core/deployments`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDeploymentResponse {
    /// New deployment ID.
    pub id: String,
    /// Platform message.
    pub message: String,
    /// Inference endpoint, if already assigned.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deployment_url: Option<String>,
    /// Initial status.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Lifetime.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ttl: Option<String>,
    /// Configuration the deployment was bound to.
    pub configuration_id: String,
}

/// Platform answer to a deployment update or delete.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentModificationResponse {
    /// Deployment ID.
    pub id: String,
    /// Platform message.
    #[serde(default)]
    pub message: String,
    /// Status the deployment is moving towards.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_status: Option<String>,
}

/// Deployments of one team.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamDeployments {
    /// Team name.
    pub team: String,
    /// That team's deployments.
    pub deployments: Vec<Deployment>,
}

/// Response of `GET /ai-core/deployments`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeploymentsOverview {
    /// Number of deployments across all teams.
    pub count: usize,
    /// Per-team deployments, in team order.
    pub deployments: Vec<TeamDeployments>,
}

/// Platform answer to a configuration create.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigurationCreated {
    /// New configuration ID.
    pub id: String,
    /// Platform message.
    #[serde(default)]
    pub message: String,
}

/// A configuration as reported by the platform.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Configuration {
    /// Configuration ID.
    pub id: String,
    /// Configuration name.
    #[serde(default)]
    pub name: String,
    /// Executable ID.
    #[serde(default)]
    pub executable_id: String,
    /// Scenario ID.
    #[serde(default)]
    pub scenario_id: String,
    /// Parameter bindings.
    #[serde(default)]
    pub parameter_bindings: Vec<ParameterBinding>,
    /// Creation timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Configuration list from the platform.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigurationList {
    /// Total count reported upstream.
    #[serde(default)]
    pub count: u64,
    /// Configurations.
    #[serde(default)]
    pub resources: Vec<Configuration>,
}

/// A model offered by a scenario.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Model {
    /// Model name, e.g. `gpt-4o`.
    pub model: String,
    /// Executable that serves it.
    #[serde(default)]
    pub executable_id: String,
    /// Description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// Model provider.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    /// Available versions, passed through as reported.
    #[serde(default)]
    pub versions: Vec<serde_json::Value>,
}

/// Model list from the platform.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelList {
    /// Total count reported upstream.
    #[serde(default)]
    pub count: u64,
    /// Models.
    #[serde(default)]
    pub resources: Vec<Model>,
}

/// A chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// `system`, `user` or `assistant`.
    pub role: String,
    /// Message text.
    pub content: String,
}

/// Body of `POST /ai-core/chat/inference`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InferenceRequest {
    /// Deployment to run against.
    #[serde(default)]
    pub deployment_id: String,
    /// Conversation so far.
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
    /// Relay the answer as a server-sent event stream.
    #[serde(default)]
    pub stream: bool,
    /// Completion token limit.
    #[serde(default)]
    pub max_tokens: Option<u32>,
    /// Sampling temperature.
    #[serde(default)]
    pub temperature: Option<f32>,
}
