//! Common test utilities for AI Core integration tests.

#![allow(dead_code, clippy::unwrap_used)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use jsonwebtoken::{encode, EncodingKey, Header};
use portal_aicore::api::{router, AppState};
use portal_aicore::client::RecordedCall;
use portal_aicore::config::{AuthConfig, UpstreamConfig};
use portal_aicore::identity::Claims;
use portal_aicore::{AiCoreManager, RecordingClient, StaticTeamDirectory};
use portal_credentials::{MemoryCredentials, TeamCredentials};
use serde_json::Value;
use tower::ServiceExt;

pub const SECRET: &str = "integration-test-secret";

/// Member of `alpha` (primary) and `beta`.
pub const ALICE: &str = "alice@example.com";
/// Member of `beta` only.
pub const BOB: &str = "bob@example.com";
/// Member of `gamma`, which has no credentials.
pub const CAROL: &str = "carol@example.com";
/// Member of no team.
pub const DAVE: &str = "dave@example.com";

/// Router wired to a [`RecordingClient`] and in-memory credentials.
pub struct TestApp {
    pub client: Arc<RecordingClient>,
    pub credentials: Arc<MemoryCredentials>,
    pub router: Router,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_client(RecordingClient::new()).await
    }

    pub async fn with_client(client: RecordingClient) -> Self {
        let directory = StaticTeamDirectory::default()
            .with_team("alpha", [ALICE])
            .with_team("beta", [ALICE, BOB])
            .with_team("gamma", [CAROL]);

        let credentials = Arc::new(MemoryCredentials::new());
        for team in ["alpha", "beta"] {
            credentials.insert(team_credentials(team)).await;
        }

        let client = Arc::new(client);
        let manager = AiCoreManager::new(
            Arc::new(directory),
            credentials.clone(),
            client.clone(),
            UpstreamConfig::default(),
        );

        let state = AppState {
            manager: Arc::new(manager),
            auth: Arc::new(AuthConfig {
                secret: SECRET.to_owned(),
                ..AuthConfig::default()
            }),
        };

        Self {
            client,
            credentials,
            router: router(state),
        }
    }

    pub async fn calls(&self) -> Vec<RecordedCall> {
        self.client.calls().await
    }

    /// Send a request as `email` and return the status and JSON body.
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        email: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let response = self
            .router
            .clone()
            .oneshot(request(method, uri, Some(&token_for(email)), body))
            .await
            .unwrap();

        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }
}

pub fn team_credentials(team: &str) -> TeamCredentials {
    TeamCredentials::new(
        team,
        format!("{team}-client"),
        format!("{team}-secret"),
        "https://auth.example.com",
        "https://api.example.com",
    )
}

/// A signed token whose subject is derived from the email.
pub fn token_for(email: &str) -> String {
    let subject = email.split('@').next().unwrap_or(email).to_owned();
    let claims = Claims {
        sub: subject,
        email: Some(email.to_owned()),
        exp: Some(u64::MAX),
        iat: None,
        iss: None,
        aud: None,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .unwrap()
}

pub fn request(
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {token}"));
    }
    match body {
        Some(body) => builder
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}
