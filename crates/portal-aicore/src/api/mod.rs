//! HTTP API for the AI Core service.
//!
//! Provides endpoints for:
//! - Deployment management (create, query, list, modify, delete)
//! - Configurations and the model catalog
//! - Chat inference, optionally streamed
//! - Health checks
//!
//! Everything under `/ai-core` requires a Bearer token.

mod catalog;
mod deployments;
mod inference;

use std::sync::Arc;
use std::time::Duration;

use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Request, State};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::config::AuthConfig;
use crate::deployment::AiCoreManager;
use crate::error::AiCoreError;
use crate::identity::AuthLayer;

pub use catalog::ConfigurationsQuery;

/// Shared application state for the AI Core service.
#[derive(Clone)]
pub struct AppState {
    /// Orchestrates upstream calls.
    pub manager: Arc<AiCoreManager>,
    /// Token validation settings.
    pub auth: Arc<AuthConfig>,
}

/// Creates the API router.
pub fn router(state: AppState) -> Router {
    let auth = AuthLayer::new(&state.auth);

    let ai_core = Router::new()
        .route(
            "/deployments",
            get(deployments::list_deployments).post(deployments::create_deployment),
        )
        .route(
            "/deployments/{id}",
            get(deployments::get_deployment)
                .patch(deployments::update_deployment)
                .delete(deployments::delete_deployment),
        )
        .route(
            "/configurations",
            get(catalog::list_configurations).post(catalog::create_configuration),
        )
        .route("/models", get(catalog::list_models))
        .route("/chat/inference", post(inference::chat_inference))
        .route_layer(auth)
        .with_state(state);

    Router::new()
        .route("/health", get(health_check))
        .nest("/ai-core", ai_core)
}

/// Bound the time every request may take to produce a response.
///
/// Only the response head is covered; a streamed body keeps flowing after
/// the deadline. An elapsed request answers with the crate's error body.
pub fn with_deadline(router: Router, timeout: Duration) -> Router {
    router.layer(middleware::from_fn_with_state(timeout, enforce_deadline))
}

async fn enforce_deadline(
    State(timeout): State<Duration>,
    request: Request,
    next: Next,
) -> Response {
    match tokio::time::timeout(timeout, next.run(request)).await {
        Ok(response) => response,
        Err(_) => AiCoreError::Timeout(timeout).into_response(),
    }
}

/// Health check endpoint.
async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse { status: "healthy" })
}

/// Health response.
#[derive(serde::Serialize)]
struct HealthResponse {
    status: &'static str,
}

/// JSON body extractor that rejects malformed input as a 400 with the
/// crate's error body.
pub struct ApiJson<T>(pub T);

impl<T, S> FromRequest<S> for ApiJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = AiCoreError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(AiCoreError::invalid_request(rejection.body_text())),
        }
    }
}
