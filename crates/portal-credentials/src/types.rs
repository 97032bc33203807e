//! Core credential types.

use std::fmt;

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::CredentialsError;

/// Resource group used when a service key does not name one.
pub const DEFAULT_RESOURCE_GROUP: &str = "default";

/// An AI Core service key bound to a portal team.
#[derive(Clone)]
pub struct TeamCredentials {
    /// Portal team name the key belongs to.
    pub team: String,
    /// OAuth client id.
    pub client_id: String,
    client_secret: SecretString,
    /// OAuth server base URL (the token endpoint is `{auth_url}/oauth/token`).
    pub auth_url: String,
    /// AI Core API base URL.
    pub api_url: String,
    /// Resource group sent with every API call.
    pub resource_group: String,
}

impl TeamCredentials {
    /// Creates credentials for a team in the default resource group.
    #[must_use]
    pub fn new(
        team: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        auth_url: impl Into<String>,
        api_url: impl Into<String>,
    ) -> Self {
        Self {
            team: team.into(),
            client_id: client_id.into(),
            client_secret: SecretString::from(client_secret.into()),
            auth_url: trim_url(auth_url.into()),
            api_url: trim_url(api_url.into()),
            resource_group: DEFAULT_RESOURCE_GROUP.to_owned(),
        }
    }

    /// Overrides the resource group.
    #[must_use]
    pub fn with_resource_group(mut self, resource_group: impl Into<String>) -> Self {
        self.resource_group = resource_group.into();
        self
    }

    /// Exposes the client secret for the token request.
    ///
    /// The returned reference must not be logged or stored.
    #[must_use]
    pub fn client_secret(&self) -> &str {
        self.client_secret.expose_secret()
    }
}

impl fmt::Debug for TeamCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TeamCredentials")
            .field("team", &self.team)
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("auth_url", &self.auth_url)
            .field("api_url", &self.api_url)
            .field("resource_group", &self.resource_group)
            .finish()
    }
}

fn trim_url(url: String) -> String {
    url.trim_end_matches('/').to_owned()
}

/// A credential entry as it appears in the JSON document.
///
/// The plaintext secret is wiped when the entry is dropped.
#[derive(Deserialize, Zeroize, ZeroizeOnDrop)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawCredentials {
    #[zeroize(skip)]
    team: String,
    #[zeroize(skip)]
    client_id: String,
    client_secret: String,
    #[zeroize(skip)]
    auth_url: String,
    #[zeroize(skip)]
    api_url: String,
    #[zeroize(skip)]
    #[serde(default)]
    resource_group: Option<String>,
}

impl RawCredentials {
    /// Validates the entry and converts it into [`TeamCredentials`].
    pub(crate) fn into_credentials(self) -> Result<TeamCredentials, CredentialsError> {
        let required = [
            ("team", &self.team),
            ("clientId", &self.client_id),
            ("clientSecret", &self.client_secret),
            ("authUrl", &self.auth_url),
            ("apiUrl", &self.api_url),
        ];
        if let Some((field, _)) = required.iter().find(|(_, value)| value.trim().is_empty()) {
            return Err(CredentialsError::Invalid(format!(
                "entry for team '{}' is missing {field}",
                self.team
            )));
        }

        let credentials = TeamCredentials::new(
            self.team.clone(),
            self.client_id.clone(),
            self.client_secret.clone(),
            self.auth_url.clone(),
            self.api_url.clone(),
        );

        Ok(match self.resource_group.as_deref().map(str::trim) {
            Some(group) if !group.is_empty() => credentials.with_resource_group(group),
            _ => credentials,
        })
    }
}
