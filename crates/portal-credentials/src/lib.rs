//! Per-team AI Core credential storage.
//!
//! Every portal team that uses AI Core owns one service key: an OAuth client
//! id and secret, the token endpoint, the API base URL and the resource group
//! its deployments live in. This crate resolves a team name to that key.
//!
//! # Backends
//!
//! - **Memory** (`memory` feature): mutable in-memory store for tests and development
//! - **Env** (`env` feature): read-only store parsed from a JSON environment variable
//!
//! Client secrets are held as [`secrecy::SecretString`] and never appear in
//! `Debug` output.
//!
//! # Example
//!
//! ```rust,ignore
//! use portal_credentials::{CredentialStore, EnvCredentials};
//!
//! let store = EnvCredentials::from_env("AI_CORE_CREDENTIALS")?;
//! if let Some(credentials) = store.get("team-alpha").await? {
//!     println!("{}", credentials.api_url);
//! }
//! ```

mod error;
mod traits;
mod types;

#[cfg(feature = "memory")]
mod memory;

#[cfg(feature = "env")]
mod env;

pub use error::CredentialsError;
pub use traits::CredentialStore;
pub use types::{TeamCredentials, DEFAULT_RESOURCE_GROUP};

#[cfg(feature = "memory")]
pub use memory::MemoryCredentials;

#[cfg(feature = "env")]
pub use env::{EnvCredentials, DEFAULT_VAR as DEFAULT_CREDENTIALS_VAR};
