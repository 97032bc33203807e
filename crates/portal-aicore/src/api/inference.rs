//! Chat inference endpoint.

use axum::{
    body::Body,
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    Json,
};

use crate::client::InferenceResponse;
use crate::error::{AiCoreError, AiCoreResult};
use crate::identity::Identity;
use crate::types::InferenceRequest;

use super::{ApiJson, AppState};

const EVENT_STREAM: &str = "text/event-stream";

/// Run a chat completion, relaying event streams chunk by chunk.
///
/// Dropping the response body (client disconnect) drops the upstream
/// connection with it.
pub async fn chat_inference(
    State(state): State<AppState>,
    identity: Identity,
    ApiJson(request): ApiJson<InferenceRequest>,
) -> AiCoreResult<Response> {
    match state.manager.inference(&identity, request).await? {
        InferenceResponse::Json(body) => Ok(Json(body).into_response()),
        InferenceResponse::Stream(stream) => {
            let content_type = stream
                .content_type
                .unwrap_or_else(|| EVENT_STREAM.to_owned());

            Response::builder()
                .header(header::CONTENT_TYPE, content_type)
                .header(header::CACHE_CONTROL, "no-cache")
                .body(Body::from_stream(stream.body))
                .map_err(|e| AiCoreError::internal(e.to_string()))
        }
    }
}
