//! reqwest implementation of [`AiPlatformClient`].

use std::time::Duration;

use async_trait::async_trait;
use futures::TryStreamExt;
use portal_credentials::TeamCredentials;
use reqwest::{Client, IntoUrl, Method, RequestBuilder, Response, StatusCode, Url};
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;

use super::inference::{InferenceCall, InferenceResponse, InferenceStream};
use super::token::TokenCache;
use super::{operation, upstream_error, AiPlatformClient, RESOURCE_GROUP_HEADER};
use crate::config::UpstreamConfig;
use crate::error::{AiCoreError, AiCoreResult};
use crate::types::{
    ConfigurationCreated, ConfigurationList, ConfigurationRequest, Deployment, DeploymentCreated,
    DeploymentList, DeploymentModificationRequest, DeploymentModificationResponse, ModelList,
    UpstreamDeploymentCreate,
};

/// HTTP client for the AI Core REST API.
pub struct HttpAiPlatformClient {
    client: Client,
    /// No overall deadline, so event streams are not cut off mid-answer.
    streaming: Client,
    tokens: TokenCache,
}

impl HttpAiPlatformClient {
    /// Create a new client from configuration.
    pub fn new(config: &UpstreamConfig) -> AiCoreResult<Self> {
        let timeout = Duration::from_secs(config.timeout_secs);

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(AiCoreError::Http)?;

        let streaming = Client::builder()
            .connect_timeout(timeout)
            .build()
            .map_err(AiCoreError::Http)?;

        Ok(Self {
            client,
            streaming,
            tokens: TokenCache::new(Duration::from_secs(config.token_refresh_skew_secs)),
        })
    }

    async fn request(
        &self,
        client: &Client,
        credentials: &TeamCredentials,
        method: Method,
        url: impl IntoUrl,
    ) -> AiCoreResult<RequestBuilder> {
        let token = self.tokens.token(&self.client, credentials).await?;

        Ok(client
            .request(method, url)
            .bearer_auth(token.expose_secret())
            .header(RESOURCE_GROUP_HEADER, &credentials.resource_group))
    }

    async fn send(
        &self,
        operation: &'static str,
        credentials: &TeamCredentials,
        builder: RequestBuilder,
    ) -> AiCoreResult<Response> {
        let response = builder.send().await.map_err(AiCoreError::Http)?;
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        if status == StatusCode::UNAUTHORIZED {
            self.tokens.invalidate(credentials).await;
        }

        let body = response.text().await.unwrap_or_default();
        tracing::warn!(
            team = %credentials.team,
            operation,
            status = status.as_u16(),
            "upstream call failed"
        );
        Err(upstream_error(operation, status.as_u16(), body))
    }

    async fn call<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        credentials: &TeamCredentials,
        builder: RequestBuilder,
    ) -> AiCoreResult<T> {
        let response = self.send(operation, credentials, builder).await?;
        response.json().await.map_err(AiCoreError::Http)
    }

    async fn get<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        credentials: &TeamCredentials,
        path: &[&str],
    ) -> AiCoreResult<T> {
        let url = api_url(credentials, path)?;
        let builder = self
            .request(&self.client, credentials, Method::GET, url)
            .await?;
        self.call(operation, credentials, builder).await
    }
}

/// `{api_url}/v2/lm/{path...}`, each path segment percent-encoded.
///
/// Caller-supplied ids stay inside their own segment: `/`, `?` and `%` are
/// escaped, so an id can never address another resource.
fn api_url(credentials: &TeamCredentials, path: &[&str]) -> AiCoreResult<Url> {
    let invalid = || {
        AiCoreError::Config(format!("invalid API URL for team {}", credentials.team))
    };

    if path.iter().any(|segment| matches!(*segment, "" | "." | "..")) {
        return Err(AiCoreError::invalid_request("invalid resource id"));
    }

    let mut url = Url::parse(&credentials.api_url).map_err(|_| invalid())?;
    url.path_segments_mut()
        .map_err(|()| invalid())?
        .pop_if_empty()
        .extend(["v2", "lm"])
        .extend(path);
    Ok(url)
}

#[async_trait]
impl AiPlatformClient for HttpAiPlatformClient {
    async fn list_deployments(
        &self,
        credentials: &TeamCredentials,
    ) -> AiCoreResult<DeploymentList> {
        self.get(operation::LIST_DEPLOYMENTS, credentials, &["deployments"])
            .await
    }

    async fn get_deployment(
        &self,
        credentials: &TeamCredentials,
        deployment_id: &str,
    ) -> AiCoreResult<Deployment> {
        self.get(
            operation::GET_DEPLOYMENT,
            credentials,
            &["deployments", deployment_id],
        )
        .await
    }

    async fn create_configuration(
        &self,
        credentials: &TeamCredentials,
        request: &ConfigurationRequest,
    ) -> AiCoreResult<ConfigurationCreated> {
        let url = api_url(credentials, &["configurations"])?;
        let builder = self
            .request(&self.client, credentials, Method::POST, url)
            .await?
            .json(request);
        self.call(operation::CREATE_CONFIGURATION, credentials, builder)
            .await
    }

    async fn list_configurations(
        &self,
        credentials: &TeamCredentials,
        scenario_id: Option<&str>,
    ) -> AiCoreResult<ConfigurationList> {
        let url = api_url(credentials, &["configurations"])?;
        let mut builder = self
            .request(&self.client, credentials, Method::GET, url)
            .await?;
        if let Some(scenario_id) = scenario_id {
            builder = builder.query(&[("scenarioId", scenario_id)]);
        }
        self.call(operation::LIST_CONFIGURATIONS, credentials, builder)
            .await
    }

    async fn create_deployment(
        &self,
        credentials: &TeamCredentials,
        request: &UpstreamDeploymentCreate,
    ) -> AiCoreResult<DeploymentCreated> {
        let url = api_url(credentials, &["deployments"])?;
        let builder = self
            .request(&self.client, credentials, Method::POST, url)
            .await?
            .json(request);
        self.call(operation::CREATE_DEPLOYMENT, credentials, builder)
            .await
    }

    async fn update_deployment(
        &self,
        credentials: &TeamCredentials,
        deployment_id: &str,
        request: &DeploymentModificationRequest,
    ) -> AiCoreResult<DeploymentModificationResponse> {
        let url = api_url(credentials, &["deployments", deployment_id])?;
        let builder = self
            .request(&self.client, credentials, Method::PATCH, url)
            .await?
            .json(request);
        self.call(operation::UPDATE_DEPLOYMENT, credentials, builder)
            .await
    }

    async fn delete_deployment(
        &self,
        credentials: &TeamCredentials,
        deployment_id: &str,
    ) -> AiCoreResult<DeploymentModificationResponse> {
        let url = api_url(credentials, &["deployments", deployment_id])?;
        let builder = self
            .request(&self.client, credentials, Method::DELETE, url)
            .await?;
        self.call(operation::DELETE_DEPLOYMENT, credentials, builder)
            .await
    }

    async fn list_models(
        &self,
        credentials: &TeamCredentials,
        scenario_id: &str,
    ) -> AiCoreResult<ModelList> {
        self.get(
            operation::LIST_MODELS,
            credentials,
            &["scenarios", scenario_id, "models"],
        )
        .await
    }

    async fn inference(
        &self,
        credentials: &TeamCredentials,
        call: &InferenceCall,
    ) -> AiCoreResult<InferenceResponse> {
        let client = if call.stream {
            &self.streaming
        } else {
            &self.client
        };

        let builder = self
            .request(client, credentials, Method::POST, call.url.as_str())
            .await?
            .json(&call.body);
        let response = self
            .send(operation::INFERENCE, credentials, builder)
            .await?;

        if !call.stream {
            let body = response.json().await.map_err(AiCoreError::Http)?;
            return Ok(InferenceResponse::Json(body));
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);

        let body = response.bytes_stream().map_err(AiCoreError::Http);

        Ok(InferenceResponse::Stream(InferenceStream {
            content_type,
            body: Box::pin(body),
        }))
    }
}
