//! Configuration and model catalog endpoints.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use crate::error::AiCoreResult;
use crate::identity::Identity;
use crate::types::{ConfigurationCreated, ConfigurationList, ConfigurationRequest, ModelList};

use super::{ApiJson, AppState};

/// Query parameters for listing configurations.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigurationsQuery {
    /// Only list configurations of this scenario.
    pub scenario_id: Option<String>,
}

pub async fn list_configurations(
    State(state): State<AppState>,
    identity: Identity,
    Query(query): Query<ConfigurationsQuery>,
) -> AiCoreResult<Json<ConfigurationList>> {
    let list = state
        .manager
        .list_configurations(&identity, query.scenario_id.as_deref())
        .await?;
    Ok(Json(list))
}

pub async fn create_configuration(
    State(state): State<AppState>,
    identity: Identity,
    ApiJson(request): ApiJson<ConfigurationRequest>,
) -> AiCoreResult<(StatusCode, Json<ConfigurationCreated>)> {
    let created = state
        .manager
        .create_configuration(&identity, request)
        .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn list_models(
    State(state): State<AppState>,
    identity: Identity,
) -> AiCoreResult<Json<ModelList>> {
    let models = state.manager.list_models(&identity).await?;
    Ok(Json(models))
}
