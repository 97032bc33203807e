//! Create-deployment validation and execution plans.
//!
//! A browser request names either an existing configuration or a new one to
//! create. [`DeploymentRequest`] holds exactly one of the two as a
//! [`ConfigurationSource`]; [`DeploymentPlan`] is the upstream call sequence
//! it maps to.
//!
//! All checks here run before any upstream call.

use portal_credentials::TeamCredentials;

use crate::client::AiPlatformClient;
use crate::error::{AiCoreError, AiCoreResult};
use crate::types::{
    ConfigurationRequest, CreateDeploymentBody, CreateDeploymentResponse,
    DeploymentModificationRequest, UpstreamDeploymentCreate,
};

pub const MISSING_CONFIGURATION_SOURCE: &str =
    "Either configurationId or configurationRequest must be provided";
pub const CONFLICTING_CONFIGURATION_SOURCE: &str =
    "ConfigurationId and configurationRequest cannot both be provided";
pub const EMPTY_MODIFICATION: &str = "Either targetStatus or configurationId must be provided";
pub const INVALID_DEPLOYMENT_ID: &str = "invalid deployment id";

/// Where the configuration of a new deployment comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationSource {
    /// An existing upstream configuration.
    Existing(String),
    /// A configuration to create first.
    New(ConfigurationRequest),
}

/// A validated create-deployment request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentRequest {
    pub source: ConfigurationSource,
    pub ttl: Option<String>,
}

impl TryFrom<CreateDeploymentBody> for DeploymentRequest {
    type Error = AiCoreError;

    fn try_from(body: CreateDeploymentBody) -> Result<Self, Self::Error> {
        let configuration_id = non_blank(body.configuration_id);

        let source = match (configuration_id, body.configuration_request) {
            (None, None) => {
                return Err(AiCoreError::invalid_request(MISSING_CONFIGURATION_SOURCE));
            }
            (Some(_), Some(_)) => {
                return Err(AiCoreError::invalid_request(
                    CONFLICTING_CONFIGURATION_SOURCE,
                ));
            }
            (Some(id), None) => ConfigurationSource::Existing(id),
            (None, Some(request)) => {
                validate_configuration(&request)?;
                ConfigurationSource::New(request)
            }
        };

        Ok(Self {
            source,
            ttl: body.ttl,
        })
    }
}

/// Check the required fields of a configuration, in declaration order.
///
/// # Errors
///
/// Returns [`AiCoreError::Validation`] naming the first empty field.
pub fn validate_configuration(request: &ConfigurationRequest) -> AiCoreResult<()> {
    let fields = [
        ("name", &request.name),
        ("executableId", &request.executable_id),
        ("scenarioId", &request.scenario_id),
    ];

    match fields.iter().find(|(_, value)| value.trim().is_empty()) {
        Some((field, _)) => Err(AiCoreError::missing_field(*field)),
        None => Ok(()),
    }
}

/// Check a caller-supplied deployment id and return it trimmed.
///
/// Platform ids are made of ASCII letters, digits, `-` and `_`.
///
/// # Errors
///
/// Returns [`AiCoreError::InvalidRequest`] for anything else.
pub fn validate_deployment_id(id: &str) -> AiCoreResult<&str> {
    let id = id.trim();
    let valid = !id.is_empty()
        && id
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_');

    if valid {
        Ok(id)
    } else {
        Err(AiCoreError::invalid_request(INVALID_DEPLOYMENT_ID))
    }
}

/// Normalise a modification request, dropping blank fields.
///
/// # Errors
///
/// Returns [`AiCoreError::InvalidRequest`] if neither field is left.
pub fn validate_modification(
    request: DeploymentModificationRequest,
) -> AiCoreResult<DeploymentModificationRequest> {
    let request = DeploymentModificationRequest {
        target_status: non_blank(request.target_status),
        configuration_id: non_blank(request.configuration_id),
    };

    if request.target_status.is_none() && request.configuration_id.is_none() {
        return Err(AiCoreError::invalid_request(EMPTY_MODIFICATION));
    }

    Ok(request)
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Upstream call sequence for a create-deployment request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeploymentPlan {
    /// Create the deployment from an existing configuration.
    Direct {
        configuration_id: String,
        ttl: Option<String>,
    },
    /// Create the configuration, then a deployment from it.
    ///
    /// A configuration whose deployment then fails to create is left
    /// upstream.
    Composed {
        configuration: ConfigurationRequest,
        ttl: Option<String>,
    },
}

impl From<DeploymentRequest> for DeploymentPlan {
    fn from(request: DeploymentRequest) -> Self {
        match request.source {
            ConfigurationSource::Existing(configuration_id) => Self::Direct {
                configuration_id,
                ttl: request.ttl,
            },
            ConfigurationSource::New(configuration) => Self::Composed {
                configuration,
                ttl: request.ttl,
            },
        }
    }
}

impl DeploymentPlan {
    /// Run the plan against the platform.
    ///
    /// The first failing call fails the plan; nothing is retried or undone.
    pub async fn execute(
        self,
        client: &dyn AiPlatformClient,
        credentials: &TeamCredentials,
    ) -> AiCoreResult<CreateDeploymentResponse> {
        let (configuration_id, ttl) = match self {
            Self::Direct {
                configuration_id,
                ttl,
            } => (configuration_id, ttl),
            Self::Composed { configuration, ttl } => {
                let created = client
                    .create_configuration(credentials, &configuration)
                    .await?;
                tracing::info!(
                    team = %credentials.team,
                    configuration_id = %created.id,
                    name = %configuration.name,
                    "configuration created"
                );
                (created.id, ttl)
            }
        };

        let request = UpstreamDeploymentCreate {
            configuration_id,
            ttl,
        };

        let created = client
            .create_deployment(credentials, &request)
            .await
            .inspect_err(|e| {
                tracing::warn!(
                    team = %credentials.team,
                    configuration_id = %request.configuration_id,
                    error = %e,
                    "deployment create failed"
                );
            })?;

        tracing::info!(
            team = %credentials.team,
            deployment_id = %created.id,
            configuration_id = %request.configuration_id,
            "deployment created"
        );

        Ok(CreateDeploymentResponse {
            id: created.id,
            message: created.message,
            deployment_url: created.deployment_url,
            status: created.status,
            ttl: created.ttl.or(request.ttl),
            configuration_id: request.configuration_id,
        })
    }
}
