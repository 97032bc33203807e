//! In-memory credential store for testing and development.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::CredentialsError;
use crate::traits::CredentialStore;
use crate::types::TeamCredentials;

/// In-memory credential store.
///
/// Cloning shares the underlying map, so a test can keep a handle and mutate
/// credentials while the service under test reads them.
#[derive(Debug, Clone, Default)]
pub struct MemoryCredentials {
    data: Arc<RwLock<HashMap<String, TeamCredentials>>>,
}

impl MemoryCredentials {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores credentials for their team, replacing any previous entry.
    pub async fn insert(&self, credentials: TeamCredentials) {
        let team = credentials.team.clone();
        self.data.write().await.insert(team.clone(), credentials);

        tracing::info!(credentials.team = %team, credentials.operation = "insert", "Credentials stored");
    }

    /// Removes the credentials of `team`.
    ///
    /// Returns `true` if an entry existed.
    pub async fn remove(&self, team: &str) -> bool {
        let existed = self.data.write().await.remove(team).is_some();

        if existed {
            tracing::info!(credentials.team = %team, credentials.operation = "remove", "Credentials removed");
        }

        existed
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentials {
    async fn get(&self, team: &str) -> Result<Option<TeamCredentials>, CredentialsError> {
        Ok(self.data.read().await.get(team).cloned())
    }

    async fn teams(&self) -> Result<Vec<String>, CredentialsError> {
        let mut teams: Vec<_> = self.data.read().await.keys().cloned().collect();
        teams.sort();
        Ok(teams)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn credentials(team: &str) -> TeamCredentials {
        TeamCredentials::new(
            team,
            "client",
            "secret",
            "https://auth.example.com",
            "https://api.example.com",
        )
    }

    #[tokio::test]
    async fn insert_and_get() {
        let store = MemoryCredentials::new();
        store.insert(credentials("alpha")).await;

        let found = store.get("alpha").await.unwrap().unwrap();
        assert_eq!(found.team, "alpha");
        assert!(store.get("beta").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn clones_share_state() {
        let store = MemoryCredentials::new();
        let handle = store.clone();
        handle.insert(credentials("alpha")).await;

        assert!(store.get("alpha").await.unwrap().is_some());
        assert!(handle.remove("alpha").await);
        assert!(store.get("alpha").await.unwrap().is_none());
        assert!(!handle.remove("alpha").await);
    }

    #[tokio::test]
    async fn teams_are_sorted() {
        let store = MemoryCredentials::new();
        store.insert(credentials("gamma")).await;
        store.insert(credentials("alpha")).await;

        assert_eq!(store.teams().await.unwrap(), vec!["alpha", "gamma"]);
    }
}
