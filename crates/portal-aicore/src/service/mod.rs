//! Service lifecycle management.
//!
//! Provides the main service runner with signal handling and graceful shutdown.

use std::sync::Arc;
use std::time::Duration;

use portal_credentials::{CredentialStore, CredentialsError, EnvCredentials, MemoryCredentials};
use tokio::net::TcpListener;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::api;
use crate::client::HttpAiPlatformClient;
use crate::config::AiCoreConfig;
use crate::deployment::AiCoreManager;
use crate::error::{AiCoreError, AiCoreResult};
use crate::teams::StaticTeamDirectory;

/// The AI Core service.
///
/// Manages the lifecycle of the service, including:
/// - Credential loading
/// - Upstream client and manager wiring
/// - HTTP API server
/// - Signal handling and graceful shutdown
pub struct AiCoreService {
    config: AiCoreConfig,
    cancel: CancellationToken,
}

impl AiCoreService {
    /// Create a new service with the given configuration.
    #[must_use]
    pub fn new(config: AiCoreConfig) -> Self {
        Self {
            config,
            cancel: CancellationToken::new(),
        }
    }

    /// Bind the configured address and run until shutdown.
    pub async fn run(&self) -> AiCoreResult<()> {
        let listener = TcpListener::bind(self.config.server.listen_addr)
            .await
            .map_err(|e| AiCoreError::Config(format!("failed to bind TCP: {e}")))?;

        self.run_on(listener).await
    }

    /// Run on an already bound listener until shutdown.
    pub async fn run_on(&self, listener: TcpListener) -> AiCoreResult<()> {
        self.config.validate()?;

        let credentials = self.create_credentials()?;

        let with_credentials = credentials.teams().await?;
        for team in &self.config.teams {
            if !with_credentials.contains(&team.name) {
                warn!(team = %team.name, "team has no AI Core credentials");
            }
        }

        let client = Arc::new(HttpAiPlatformClient::new(&self.config.upstream)?);
        let directory = Arc::new(StaticTeamDirectory::from_config(&self.config.teams));
        info!(teams = self.config.teams.len(), "team directory loaded");

        let manager = Arc::new(AiCoreManager::new(
            directory,
            credentials,
            client,
            self.config.upstream.clone(),
        ));

        let state = api::AppState {
            manager,
            auth: Arc::new(self.config.auth.clone()),
        };

        let deadline = Duration::from_secs(self.config.server.request_timeout_secs);
        let app = api::with_deadline(api::router(state), deadline)
            .layer(TraceLayer::new_for_http());

        let local_addr = listener
            .local_addr()
            .map_err(|e| AiCoreError::Config(format!("failed to read local address: {e}")))?;
        info!(listen_addr = %local_addr, "AI Core service listening");

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal(self.cancel.clone()))
            .await
            .map_err(|e| AiCoreError::Config(format!("server error: {e}")))?;

        info!("AI Core service shutdown complete");
        Ok(())
    }

    /// Request graceful shutdown.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }

    fn create_credentials(&self) -> AiCoreResult<Arc<dyn CredentialStore>> {
        let var = &self.config.credentials.env_var;
        match EnvCredentials::from_env(var) {
            Ok(store) => {
                info!(var = %var, teams = store.len(), "team credentials loaded");
                Ok(Arc::new(store))
            }
            Err(CredentialsError::SourceNotFound(_)) => {
                warn!(
                    var = %var,
                    "credential variable not set, no team has AI Core access"
                );
                Ok(Arc::new(MemoryCredentials::new()))
            }
            Err(e) => Err(e.into()),
        }
    }
}

async fn shutdown_signal(cancel: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "failed to install Ctrl+C handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("received Ctrl+C, initiating shutdown");
        }
        () = terminate => {
            info!("received SIGTERM, initiating shutdown");
        }
        () = cancel.cancelled() => {
            info!("shutdown requested");
        }
    }
}
