//! OAuth client-credentials tokens for the upstream API.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use portal_credentials::TeamCredentials;
use reqwest::Client;
use secrecy::SecretString;
use serde::Deserialize;
use tokio::sync::RwLock;

use super::operation;
use crate::error::{AiCoreError, AiCoreResult};

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
}

struct CachedToken {
    token: SecretString,
    refresh_at: Instant,
}

/// Access tokens keyed by (auth URL, client id).
///
/// A token is reused until `expires_in` minus the refresh skew has elapsed.
/// Tokens whose remaining lifetime is shorter than the skew are not cached.
pub struct TokenCache {
    skew: Duration,
    tokens: RwLock<HashMap<(String, String), CachedToken>>,
}

impl TokenCache {
    pub fn new(skew: Duration) -> Self {
        Self {
            skew,
            tokens: RwLock::new(HashMap::new()),
        }
    }

    /// Return a valid access token for the given credentials.
    pub async fn token(
        &self,
        client: &Client,
        credentials: &TeamCredentials,
    ) -> AiCoreResult<SecretString> {
        let key = (credentials.auth_url.clone(), credentials.client_id.clone());

        {
            let tokens = self.tokens.read().await;
            if let Some(cached) = tokens.get(&key) {
                if cached.refresh_at > Instant::now() {
                    return Ok(cached.token.clone());
                }
            }
        }

        let fetched = fetch(client, credentials).await?;
        let token = SecretString::from(fetched.access_token);
        let lifetime = Duration::from_secs(fetched.expires_in.unwrap_or_default());

        if let Some(ttl) = lifetime.checked_sub(self.skew).filter(|d| !d.is_zero()) {
            self.tokens.write().await.insert(
                key,
                CachedToken {
                    token: token.clone(),
                    refresh_at: Instant::now() + ttl,
                },
            );
        }

        tracing::debug!(
            team = %credentials.team,
            expires_in = lifetime.as_secs(),
            "fetched access token"
        );

        Ok(token)
    }

    /// Forget the token for the given credentials.
    pub async fn invalidate(&self, credentials: &TeamCredentials) {
        let key = (credentials.auth_url.clone(), credentials.client_id.clone());
        self.tokens.write().await.remove(&key);
    }
}

async fn fetch(client: &Client, credentials: &TeamCredentials) -> AiCoreResult<TokenResponse> {
    let url = format!("{}/oauth/token", credentials.auth_url);
    let response = client
        .post(&url)
        .basic_auth(&credentials.client_id, Some(credentials.client_secret()))
        .form(&[("grant_type", "client_credentials")])
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        // Always Upstream, 404 included.
        let body = response.text().await.unwrap_or_default();
        return Err(AiCoreError::Upstream {
            operation: operation::FETCH_TOKEN,
            status: status.as_u16(),
            message: body,
        });
    }

    Ok(response.json().await?)
}
