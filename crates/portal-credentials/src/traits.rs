//! Traits for credential store implementations.

use async_trait::async_trait;

use crate::error::CredentialsError;
use crate::types::TeamCredentials;

/// Backend trait for per-team credential lookup.
///
/// A team without an entry is not an error: `get` returns `Ok(None)` and the
/// caller decides how to report it.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Returns the credentials configured for `team`, if any.
    async fn get(&self, team: &str) -> Result<Option<TeamCredentials>, CredentialsError>;

    /// Returns the names of all teams with configured credentials, sorted.
    async fn teams(&self) -> Result<Vec<String>, CredentialsError>;
}
