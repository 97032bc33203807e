//! Deployment management endpoints.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use tracing::info;

use crate::error::AiCoreResult;
use crate::identity::Identity;
use crate::types::{
    CreateDeploymentBody, CreateDeploymentResponse, Deployment, DeploymentModificationRequest,
    DeploymentModificationResponse, DeploymentsOverview,
};

use super::{ApiJson, AppState};

/// List the deployments of every team of the caller.
pub async fn list_deployments(
    State(state): State<AppState>,
    identity: Identity,
) -> AiCoreResult<Json<DeploymentsOverview>> {
    let overview = state.manager.list_deployments(&identity).await?;
    Ok(Json(overview))
}

/// Get a deployment by ID.
pub async fn get_deployment(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<String>,
) -> AiCoreResult<Json<Deployment>> {
    let deployment = state.manager.get_deployment(&identity, &id).await?;
    Ok(Json(deployment))
}

/// Create a deployment from an existing or a new configuration.
pub async fn create_deployment(
    State(state): State<AppState>,
    identity: Identity,
    ApiJson(body): ApiJson<CreateDeploymentBody>,
) -> AiCoreResult<(StatusCode, Json<CreateDeploymentResponse>)> {
    info!(subject = %identity.subject, "creating deployment via API");

    let response = state.manager.create_deployment(&identity, body).await?;
    Ok((StatusCode::ACCEPTED, Json(response)))
}

/// Change a deployment's target status or configuration.
pub async fn update_deployment(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<String>,
    ApiJson(request): ApiJson<DeploymentModificationRequest>,
) -> AiCoreResult<(StatusCode, Json<DeploymentModificationResponse>)> {
    let response = state
        .manager
        .update_deployment(&identity, &id, request)
        .await?;
    Ok((StatusCode::ACCEPTED, Json(response)))
}

/// Delete a deployment.
pub async fn delete_deployment(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<String>,
) -> AiCoreResult<(StatusCode, Json<DeploymentModificationResponse>)> {
    let response = state.manager.delete_deployment(&identity, &id).await?;
    Ok((StatusCode::ACCEPTED, Json(response)))
}
