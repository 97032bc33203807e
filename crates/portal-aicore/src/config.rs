//! Configuration for portal-aicore.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use figment::providers::{Env, Format, Toml};
use figment::Figment;
use serde::Deserialize;

use crate::error::{AiCoreError, AiCoreResult};

/// Default configuration file, read from the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "aicore.toml";

/// Prefix for environment overrides (`PORTAL_AICORE_SERVER__LISTEN_ADDR=...`).
pub const ENV_PREFIX: &str = "PORTAL_AICORE_";

/// Top-level configuration for the AI Core service.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AiCoreConfig {
    /// HTTP server configuration.
    #[serde(default)]
    pub server: ServerConfig,

    /// Bearer token validation.
    #[serde(default)]
    pub auth: AuthConfig,

    /// Upstream platform client configuration.
    #[serde(default)]
    pub upstream: UpstreamConfig,

    /// Where team credentials come from.
    #[serde(default)]
    pub credentials: CredentialsConfig,

    /// Team membership.
    #[serde(default)]
    pub teams: Vec<TeamConfig>,
}

impl AiCoreConfig {
    /// Load configuration from the default sources.
    ///
    /// Configuration is loaded in the following order (later sources override earlier):
    /// 1. Default values
    /// 2. `aicore.toml` in the current directory (if present)
    /// 3. Environment variables with `PORTAL_AICORE_` prefix
    pub fn load() -> AiCoreResult<Self> {
        Self::from_file(DEFAULT_CONFIG_FILE)
    }

    /// Load configuration from a specific TOML file.
    pub fn from_file(path: impl AsRef<std::path::Path>) -> AiCoreResult<Self> {
        Figment::new()
            .merge(Toml::file(path.as_ref()))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .map_err(|e| AiCoreError::Config(e.to_string()))
    }

    /// Check settings that have no usable default.
    pub fn validate(&self) -> AiCoreResult<()> {
        if self.auth.secret.trim().is_empty() {
            return Err(AiCoreError::Config("auth.secret must be set".to_owned()));
        }

        for team in &self.teams {
            if team.name.trim().is_empty() {
                return Err(AiCoreError::Config("team name must not be empty".to_owned()));
            }
        }

        Ok(())
    }
}

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Address to listen on.
    #[serde(default = "default_listen_addr")]
    pub listen_addr: SocketAddr,

    /// Request timeout in seconds.
    ///
    /// Streaming inference responses are exempt once headers are sent.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_listen_addr() -> SocketAddr {
    SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 8080)
}

const fn default_request_timeout_secs() -> u64 {
    30
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

/// JWT authentication configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthConfig {
    /// Secret key for HMAC signature verification.
    #[serde(default)]
    pub secret: String,

    /// Signing algorithm.
    #[serde(default)]
    pub algorithm: AuthAlgorithm,

    /// Expected token issuer (`iss` claim).
    #[serde(default)]
    pub issuer: Option<String>,

    /// Expected token audience (`aud` claim).
    #[serde(default)]
    pub audience: Option<String>,
}

/// Supported JWT signing algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum AuthAlgorithm {
    /// HMAC with SHA-256.
    #[default]
    HS256,
    /// HMAC with SHA-384.
    HS384,
    /// HMAC with SHA-512.
    HS512,
}

/// Upstream AI Core client configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct UpstreamConfig {
    /// Per-call HTTP deadline in seconds.
    #[serde(default = "default_upstream_timeout_secs")]
    pub timeout_secs: u64,

    /// Refresh OAuth tokens this many seconds before they expire.
    #[serde(default = "default_token_refresh_skew_secs")]
    pub token_refresh_skew_secs: u64,

    /// `api-version` query parameter for azure-openai chat completions.
    #[serde(default = "default_openai_api_version")]
    pub openai_api_version: String,

    /// Scenario whose models are listed by `GET /ai-core/models`.
    #[serde(default = "default_models_scenario")]
    pub models_scenario: String,
}

const fn default_upstream_timeout_secs() -> u64 {
    30
}

const fn default_token_refresh_skew_secs() -> u64 {
    60
}

fn default_openai_api_version() -> String {
    "2024-02-01".to_owned()
}

fn default_models_scenario() -> String {
    "foundation-models".to_owned()
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_upstream_timeout_secs(),
            token_refresh_skew_secs: default_token_refresh_skew_secs(),
            openai_api_version: default_openai_api_version(),
            models_scenario: default_models_scenario(),
        }
    }
}

/// Credential source configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct CredentialsConfig {
    /// Environment variable holding the JSON credential document.
    #[serde(default = "default_credentials_env_var")]
    pub env_var: String,
}

fn default_credentials_env_var() -> String {
    portal_credentials::DEFAULT_CREDENTIALS_VAR.to_owned()
}

impl Default for CredentialsConfig {
    fn default() -> Self {
        Self {
            env_var: default_credentials_env_var(),
        }
    }
}

/// A portal team and the callers that belong to it.
#[derive(Debug, Clone, Deserialize)]
pub struct TeamConfig {
    /// Team name, as used for credential lookup.
    pub name: String,

    /// Member identifiers (token subject or email).
    #[serde(default)]
    pub members: Vec<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = AiCoreConfig::default();
        assert_eq!(config.server.listen_addr.port(), 8080);
        assert_eq!(config.server.request_timeout_secs, 30);
        assert_eq!(config.auth.algorithm, AuthAlgorithm::HS256);
        assert_eq!(config.upstream.models_scenario, "foundation-models");
        assert_eq!(config.credentials.env_var, "AI_CORE_CREDENTIALS");
        assert!(config.teams.is_empty());
    }

    #[test]
    fn default_config_requires_secret() {
        let err = AiCoreConfig::default().validate().unwrap_err();
        assert!(err.to_string().contains("auth.secret"));
    }

    #[test]
    fn config_from_toml() {
        let toml = r#"
            [server]
            listen_addr = "127.0.0.1:9000"

            [auth]
            secret = "s3cret"
            algorithm = "HS384"
            issuer = "portal"

            [upstream]
            openai_api_version = "2024-06-01"

            [[teams]]
            name = "alpha"
            members = ["alice@example.com", "I000001"]

            [[teams]]
            name = "beta"
        "#;

        let config: AiCoreConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.server.listen_addr.port(), 9000);
        assert_eq!(config.auth.algorithm, AuthAlgorithm::HS384);
        assert_eq!(config.auth.issuer.as_deref(), Some("portal"));
        assert_eq!(config.upstream.openai_api_version, "2024-06-01");
        assert_eq!(config.upstream.timeout_secs, 30);
        assert_eq!(config.teams.len(), 2);
        assert_eq!(config.teams[0].members.len(), 2);
        assert!(config.teams[1].members.is_empty());
        config.validate().unwrap();
    }

    #[test]
    fn config_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("aicore.toml");
        std::fs::write(
            &path,
            "[auth]\nsecret = \"file-secret\"\n\n[credentials]\nenv_var = \"TEAM_KEYS\"\n",
        )
        .unwrap();

        let config = AiCoreConfig::from_file(&path).unwrap();
        assert_eq!(config.auth.secret, "file-secret");
        assert_eq!(config.credentials.env_var, "TEAM_KEYS");
    }

    #[test]
    fn blank_team_name_is_rejected() {
        let config = AiCoreConfig {
            auth: AuthConfig {
                secret: "s".to_owned(),
                ..AuthConfig::default()
            },
            teams: vec![TeamConfig {
                name: " ".to_owned(),
                members: vec![],
            }],
            ..AiCoreConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
