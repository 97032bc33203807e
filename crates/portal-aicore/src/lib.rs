//! Developer portal AI Core service
//!
//! This crate maps the portal's simplified AI Core requests onto the
//! platform's two-resource model: a *configuration* binds an executable and
//! scenario to parameters, and a *deployment* runs a configuration.
//!
//! # Architecture
//!
//! - **Identity**: a tower layer validates Bearer JWTs and hands handlers a
//!   typed [`Identity`]
//! - **Teams and credentials**: the caller's primary team is looked up in the
//!   [`TeamDirectory`], then that team's service key in a
//!   [`portal_credentials::CredentialStore`]
//! - **Deployment plans**: a create request becomes either a direct or a
//!   composed [`DeploymentPlan`]
//! - **Upstream client**: every platform call goes through the
//!   [`AiPlatformClient`] capability
//!
//! # Creating a deployment
//!
//! ```text
//! { configurationId }        ──▶ Direct   ──▶ create deployment
//! { configurationRequest }   ──▶ Composed ──▶ create configuration ──▶ create deployment
//! both / neither             ──▶ 400, no upstream call
//! ```
//!
//! A composed plan whose deployment step fails leaves the new configuration
//! upstream.
//!
//! # Example
//!
//! ```ignore
//! use portal_aicore::{ConfigurationSource, DeploymentPlan, DeploymentRequest};
//! use portal_aicore::types::CreateDeploymentBody;
//!
//! let body = CreateDeploymentBody {
//!     configuration_id: Some("config-1".to_owned()),
//!     ttl: Some("1h".to_owned()),
//!     ..CreateDeploymentBody::default()
//! };
//!
//! let request = DeploymentRequest::try_from(body)?;
//! assert_eq!(request.source, ConfigurationSource::Existing("config-1".to_owned()));
//!
//! let plan = DeploymentPlan::from(request);
//! let response = plan.execute(&client, &credentials).await?;
//! ```

#![doc = include_str!("../README.md")]
#![forbid(unsafe_code)]

pub mod api;
pub mod client;
pub mod config;
pub mod deployment;
pub mod error;
pub mod identity;
pub mod service;
pub mod teams;
pub mod types;

// Re-export commonly used types at the crate root
pub use client::{AiPlatformClient, HttpAiPlatformClient, RecordingClient};
pub use config::AiCoreConfig;
pub use deployment::{AiCoreManager, ConfigurationSource, DeploymentPlan, DeploymentRequest};
pub use error::{AiCoreError, AiCoreResult};
pub use identity::{AuthLayer, Identity};
pub use service::AiCoreService;
pub use teams::{StaticTeamDirectory, TeamDirectory};
