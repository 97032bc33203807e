//! Team directory: which portal teams a caller belongs to.

use crate::config::TeamConfig;
use crate::error::{AiCoreError, AiCoreResult};
use crate::identity::Identity;

/// Resolves a caller to their teams.
pub trait TeamDirectory: Send + Sync {
    /// Teams of the caller, primary team first.
    fn teams_for(&self, identity: &Identity) -> Vec<String>;

    /// The caller's primary team.
    ///
    /// # Errors
    ///
    /// Returns [`AiCoreError::Authorization`] if the caller has no team.
    fn primary_team(&self, identity: &Identity) -> AiCoreResult<String> {
        self.teams_for(identity)
            .into_iter()
            .next()
            .ok_or_else(not_assigned)
    }
}

pub(crate) fn not_assigned() -> AiCoreError {
    AiCoreError::Authorization("user is not assigned to any team".to_owned())
}

/// Team directory backed by the `[[teams]]` configuration tables.
#[derive(Debug, Clone, Default)]
pub struct StaticTeamDirectory {
    teams: Vec<TeamConfig>,
}

impl StaticTeamDirectory {
    pub fn from_config(teams: &[TeamConfig]) -> Self {
        Self {
            teams: teams.to_vec(),
        }
    }

    /// Add a team with the given members.
    #[must_use]
    pub fn with_team<I, M>(mut self, name: impl Into<String>, members: I) -> Self
    where
        I: IntoIterator<Item = M>,
        M: Into<String>,
    {
        self.teams.push(TeamConfig {
            name: name.into(),
            members: members.into_iter().map(Into::into).collect(),
        });
        self
    }
}

impl TeamDirectory for StaticTeamDirectory {
    fn teams_for(&self, identity: &Identity) -> Vec<String> {
        self.teams
            .iter()
            .filter(|team| team.members.iter().any(|m| matches(m, identity)))
            .map(|team| team.name.clone())
            .collect()
    }
}

fn matches(member: &str, identity: &Identity) -> bool {
    let member = member.trim();
    member.eq_ignore_ascii_case(&identity.subject)
        || identity
            .email
            .as_deref()
            .is_some_and(|email| member.eq_ignore_ascii_case(email))
}
