//! Caller identity: JWT validation middleware and the [`Identity`] extractor.
//!
//! [`AuthLayer`] validates the bearer token of every request it wraps and
//! stores the verified [`Identity`] in the request extensions. Handlers take
//! an [`Identity`] argument to read it back.

use std::sync::Arc;
use std::task::{Context, Poll};

use axum::body::Body;
use axum::extract::FromRequestParts;
use axum::response::IntoResponse;
use http::request::Parts;
use http::{Request, Response};
use jsonwebtoken::{decode, DecodingKey, TokenData, Validation};
use serde::{Deserialize, Serialize};
use tower::{Layer, Service};

use crate::config::{AuthAlgorithm, AuthConfig};
use crate::error::AiCoreError;

/// Claims extracted from a valid JWT.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default)]
    pub exp: Option<u64>,
    #[serde(default)]
    pub iat: Option<u64>,
    #[serde(default)]
    pub iss: Option<String>,
    #[serde(default)]
    pub aud: Option<String>,
}

/// The verified caller of a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// Token subject.
    pub subject: String,
    /// Email claim, when the token carries one.
    pub email: Option<String>,
}

impl Identity {
    pub fn new(subject: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            email: None,
        }
    }

    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }
}

impl From<Claims> for Identity {
    fn from(claims: Claims) -> Self {
        Self {
            subject: claims.sub,
            email: claims.email.filter(|e| !e.trim().is_empty()),
        }
    }
}

impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = AiCoreError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Identity>()
            .cloned()
            .ok_or_else(|| AiCoreError::Authentication("authentication required".to_owned()))
    }
}

/// Tower layer that validates JWT tokens in the Authorization header.
#[derive(Clone)]
pub struct AuthLayer {
    config: Arc<AuthConfig>,
}

impl AuthLayer {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            config: Arc::new(config.clone()),
        }
    }
}

impl<S> Layer<S> for AuthLayer {
    type Service = AuthService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        AuthService {
            inner,
            config: self.config.clone(),
        }
    }
}

/// The service wrapper that performs JWT authentication.
#[derive(Clone)]
pub struct AuthService<S> {
    inner: S,
    config: Arc<AuthConfig>,
}

impl<S, ReqBody> Service<Request<ReqBody>> for AuthService<S>
where
    S: Service<Request<ReqBody>, Response = Response<Body>> + Clone + Send + 'static,
    S::Future: Send,
    ReqBody: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<ReqBody>) -> Self::Future {
        let config = self.config.clone();
        let mut inner = self.inner.clone();

        Box::pin(async move {
            let token = req
                .headers()
                .get(http::header::AUTHORIZATION)
                .and_then(|h| h.to_str().ok())
                .and_then(|h| h.strip_prefix("Bearer "))
                .map(str::trim);

            let Some(token) = token.filter(|t| !t.is_empty()) else {
                tracing::debug!("missing or invalid Authorization header");
                return Ok(unauthorized_response("missing bearer token"));
            };

            match validate_token(token, &config) {
                Ok(token_data) => {
                    tracing::debug!(subject = %token_data.claims.sub, "JWT validated");
                    req.extensions_mut()
                        .insert(Identity::from(token_data.claims));
                    inner.call(req).await
                }
                Err(e) => {
                    tracing::debug!(error = %e, "JWT validation failed");
                    Ok(unauthorized_response("invalid bearer token"))
                }
            }
        })
    }
}

fn validate_token(
    token: &str,
    config: &AuthConfig,
) -> Result<TokenData<Claims>, jsonwebtoken::errors::Error> {
    let algorithm = match config.algorithm {
        AuthAlgorithm::HS256 => jsonwebtoken::Algorithm::HS256,
        AuthAlgorithm::HS384 => jsonwebtoken::Algorithm::HS384,
        AuthAlgorithm::HS512 => jsonwebtoken::Algorithm::HS512,
    };

    let mut validation = Validation::new(algorithm);

    if let Some(ref issuer) = config.issuer {
        validation.set_issuer(&[issuer]);
    }

    if let Some(ref audience) = config.audience {
        validation.set_audience(&[audience]);
    } else {
        validation.validate_aud = false;
    }

    let key = DecodingKey::from_secret(config.secret.as_bytes());
    decode::<Claims>(token, &key, &validation)
}

fn unauthorized_response(reason: &str) -> Response<Body> {
    let mut response = AiCoreError::Authentication(reason.to_owned()).into_response();
    response.headers_mut().insert(
        http::header::WWW_AUTHENTICATE,
        http::HeaderValue::from_static("Bearer realm=\"portal-aicore\""),
    );
    response
}
