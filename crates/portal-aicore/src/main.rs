//! Developer portal AI Core service binary.
//!
//! Usage: `portal-aicore [CONFIG_FILE]` (defaults to `aicore.toml`).

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use portal_aicore::{AiCoreConfig, AiCoreService};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("portal_aicore=info".parse()?),
        )
        .init();

    info!("portal AI Core service starting");

    let config = match std::env::args().nth(1) {
        Some(path) => AiCoreConfig::from_file(path),
        None => AiCoreConfig::load(),
    }?;

    info!(
        listen_addr = %config.server.listen_addr,
        teams = config.teams.len(),
        credentials_var = %config.credentials.env_var,
        "configuration loaded"
    );

    let service = AiCoreService::new(config);
    if let Err(e) = service.run().await {
        error!(error = %e, "AI Core service failed");
        return Err(e.into());
    }

    Ok(())
}
