//! Environment variable credential store.
//!
//! A read-only store that parses every team's service key from one JSON
//! array, usually injected as an environment variable by the deployment:
//!
//! ```json
//! [
//!   {
//!     "team": "team-alpha",
//!     "clientId": "sb-...",
//!     "clientSecret": "...",
//!     "authUrl": "https://tenant.authentication.example.com",
//!     "apiUrl": "https://api.ai.example.com",
//!     "resourceGroup": "default"
//!   }
//! ]
//! ```

use std::collections::BTreeMap;
use std::env;

use async_trait::async_trait;

use crate::error::CredentialsError;
use crate::traits::CredentialStore;
use crate::types::{RawCredentials, TeamCredentials};

/// Default environment variable holding the credential document.
pub const DEFAULT_VAR: &str = "AI_CORE_CREDENTIALS";

/// Read-only credential store parsed once at construction.
#[derive(Debug, Clone, Default)]
pub struct EnvCredentials {
    entries: BTreeMap<String, TeamCredentials>,
}

impl EnvCredentials {
    /// Parses the document held in the environment variable `var`.
    ///
    /// An unset variable is an error; an empty array is not.
    pub fn from_env(var: &str) -> Result<Self, CredentialsError> {
        match env::var(var) {
            Ok(document) => Self::from_json(&document),
            Err(env::VarError::NotPresent) => Err(CredentialsError::SourceNotFound(var.to_owned())),
            Err(env::VarError::NotUnicode(_)) => Err(CredentialsError::Invalid(format!(
                "{var} contains invalid UTF-8"
            ))),
        }
    }

    /// Parses a credential document.
    ///
    /// Rejects entries with empty required fields and duplicate team names.
    pub fn from_json(document: &str) -> Result<Self, CredentialsError> {
        let raw: Vec<RawCredentials> = serde_json::from_str(document)?;

        let mut entries = BTreeMap::new();
        for entry in raw {
            let credentials = entry.into_credentials()?;
            if entries.contains_key(&credentials.team) {
                return Err(CredentialsError::Invalid(format!(
                    "duplicate entry for team '{}'",
                    credentials.team
                )));
            }
            entries.insert(credentials.team.clone(), credentials);
        }

        tracing::debug!(teams = entries.len(), "Parsed AI Core credentials");

        Ok(Self { entries })
    }

    /// Number of teams with credentials.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no team has credentials.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl CredentialStore for EnvCredentials {
    async fn get(&self, team: &str) -> Result<Option<TeamCredentials>, CredentialsError> {
        Ok(self.entries.get(team).cloned())
    }

    async fn teams(&self) -> Result<Vec<String>, CredentialsError> {
        Ok(self.entries.keys().cloned().collect())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const DOCUMENT: &str = r#"[
        {
            "team": "alpha",
            "clientId": "client-a",
            "clientSecret": "secret-a",
            "authUrl": "https://auth.example.com/",
            "apiUrl": "https://api.example.com",
            "resourceGroup": "rg-alpha"
        },
        {
            "team": "beta",
            "clientId": "client-b",
            "clientSecret": "secret-b",
            "authUrl": "https://auth.example.com",
            "apiUrl": "https://api.example.com"
        }
    ]"#;

    #[tokio::test]
    async fn parses_document() {
        let store = EnvCredentials::from_json(DOCUMENT).unwrap();
        assert_eq!(store.len(), 2);

        let alpha = store.get("alpha").await.unwrap().unwrap();
        assert_eq!(alpha.client_id, "client-a");
        assert_eq!(alpha.client_secret(), "secret-a");
        assert_eq!(alpha.auth_url, "https://auth.example.com");
        assert_eq!(alpha.resource_group, "rg-alpha");

        let beta = store.get("beta").await.unwrap().unwrap();
        assert_eq!(beta.resource_group, "default");
    }

    #[tokio::test]
    async fn lookup_is_case_sensitive() {
        let store = EnvCredentials::from_json(DOCUMENT).unwrap();
        assert!(store.get("Alpha").await.unwrap().is_none());
    }

    #[test]
    fn rejects_duplicate_teams() {
        let document = r#"[
            {"team":"alpha","clientId":"a","clientSecret":"s","authUrl":"u","apiUrl":"v"},
            {"team":"alpha","clientId":"b","clientSecret":"s","authUrl":"u","apiUrl":"v"}
        ]"#;
        let err = EnvCredentials::from_json(document).unwrap_err();
        assert!(matches!(err, CredentialsError::Invalid(_)));
    }

    #[test]
    fn rejects_malformed_json() {
        let err = EnvCredentials::from_json("{not json").unwrap_err();
        assert!(matches!(err, CredentialsError::Parse(_)));
    }

    #[test]
    fn empty_array_is_allowed() {
        let store = EnvCredentials::from_json("[]").unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn missing_variable_is_reported() {
        let err = EnvCredentials::from_env("PORTAL_TEST_SURELY_UNSET_CREDENTIALS").unwrap_err();
        assert!(matches!(err, CredentialsError::SourceNotFound(_)));
    }
}
