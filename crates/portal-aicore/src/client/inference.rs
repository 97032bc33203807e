//! Chat inference routing per model family.
//!
//! Deployments expose different inference APIs depending on the executable
//! that serves them. [`InferenceCall::build`] picks the endpoint and body
//! shape; the client only posts it.

use std::fmt;

use bytes::Bytes;
use futures::stream::BoxStream;
use serde_json::{json, Map, Value};

use crate::error::{AiCoreError, AiCoreResult};
use crate::types::{ChatMessage, Deployment, InferenceRequest};

/// `anthropic_version` expected by Bedrock-hosted Anthropic models.
pub const BEDROCK_ANTHROPIC_VERSION: &str = "bedrock-2023-05-31";

/// Completion limit sent to Bedrock when the caller sets none; the field is
/// mandatory there.
pub const DEFAULT_MAX_TOKENS: u32 = 1024;

/// Inference API family of a deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelFamily {
    /// Azure OpenAI chat completions.
    AzureOpenAi,
    /// AWS Bedrock (Anthropic messages API).
    AwsBedrock,
    /// OpenAI-compatible `/v1/chat/completions`.
    OpenAiCompatible,
}

impl ModelFamily {
    /// Family for an executable ID.
    pub fn from_executable_id(executable_id: Option<&str>) -> Self {
        match executable_id.map(str::trim) {
            Some("azure-openai") => Self::AzureOpenAi,
            Some("aws-bedrock") => Self::AwsBedrock,
            _ => Self::OpenAiCompatible,
        }
    }
}

/// A fully routed inference call.
#[derive(Debug, Clone, PartialEq)]
pub struct InferenceCall {
    /// Deployment the call targets.
    pub deployment_id: String,
    /// Family the route was chosen for.
    pub family: ModelFamily,
    /// Endpoint URL, including any query string.
    pub url: String,
    /// JSON request body.
    pub body: Value,
    /// Whether the answer is an event stream.
    pub stream: bool,
}

impl InferenceCall {
    /// Route `request` to `deployment`.
    ///
    /// # Errors
    ///
    /// Returns [`AiCoreError::InvalidRequest`] if the deployment has no
    /// inference URL yet.
    pub fn build(
        deployment: &Deployment,
        request: &InferenceRequest,
        openai_api_version: &str,
    ) -> AiCoreResult<Self> {
        let base = deployment
            .deployment_url
            .as_deref()
            .map(|url| url.trim().trim_end_matches('/'))
            .filter(|url| !url.is_empty())
            .ok_or_else(|| AiCoreError::invalid_request("deployment is not running"))?;

        let family = ModelFamily::from_executable_id(deployment.executable_id.as_deref());

        let (url, body) = match family {
            ModelFamily::AzureOpenAi => (
                format!("{base}/chat/completions?api-version={openai_api_version}"),
                openai_body(request, None),
            ),
            ModelFamily::AwsBedrock => {
                let path = if request.stream {
                    "invoke-with-response-stream"
                } else {
                    "invoke"
                };
                (format!("{base}/{path}"), bedrock_body(request))
            }
            ModelFamily::OpenAiCompatible => (
                format!("{base}/v1/chat/completions"),
                openai_body(request, deployment.model_name()),
            ),
        };

        Ok(Self {
            deployment_id: deployment.id.clone(),
            family,
            url,
            body,
            stream: request.stream,
        })
    }
}

fn openai_body(request: &InferenceRequest, model: Option<&str>) -> Value {
    let mut body = Map::new();
    if let Some(model) = model {
        body.insert("model".to_owned(), json!(model));
    }
    body.insert("messages".to_owned(), json!(request.messages));
    if let Some(max_tokens) = request.max_tokens {
        body.insert("max_tokens".to_owned(), json!(max_tokens));
    }
    if let Some(temperature) = request.temperature {
        body.insert("temperature".to_owned(), json!(temperature));
    }
    if request.stream {
        body.insert("stream".to_owned(), json!(true));
    }
    Value::Object(body)
}

fn bedrock_body(request: &InferenceRequest) -> Value {
    let (system, messages): (Vec<&ChatMessage>, Vec<&ChatMessage>) =
        request.messages.iter().partition(|m| m.role == "system");

    let mut body = Map::new();
    body.insert(
        "anthropic_version".to_owned(),
        json!(BEDROCK_ANTHROPIC_VERSION),
    );
    body.insert(
        "max_tokens".to_owned(),
        json!(request.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS)),
    );
    if !system.is_empty() {
        let prompt = system
            .iter()
            .map(|m| m.content.as_str())
            .collect::<Vec<_>>()
            .join("\n");
        body.insert("system".to_owned(), json!(prompt));
    }
    body.insert("messages".to_owned(), json!(messages));
    if let Some(temperature) = request.temperature {
        body.insert("temperature".to_owned(), json!(temperature));
    }
    Value::Object(body)
}

/// Answer of an inference call.
pub enum InferenceResponse {
    /// Complete JSON answer.
    Json(Value),
    /// Event stream, relayed as it arrives.
    Stream(InferenceStream),
}

/// Upstream event stream.
pub struct InferenceStream {
    /// Upstream `Content-Type`, if any.
    pub content_type: Option<String>,
    /// Raw body chunks.
    pub body: BoxStream<'static, AiCoreResult<Bytes>>,
}

impl fmt::Debug for InferenceResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json(value) => f.debug_tuple("Json").field(value).finish(),
            Self::Stream(stream) => f.debug_tuple("Stream").field(stream).finish(),
        }
    }
}

impl fmt::Debug for InferenceStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InferenceStream")
            .field("content_type", &self.content_type)
            .finish_non_exhaustive()
    }
}
