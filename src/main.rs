//! qlik-client demo entry point.
//!
//! Prints the server build information and the app list, then copies the
//! app given as first argument, if any.

use tracing_subscriber::EnvFilter;

use qlik_client::{ClientConfig, ClientError, QlikClient};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = ClientConfig::from_env()?;
    tracing::info!(server = %config.server, user = %config.identity, "starting qlik-client");
    let client = QlikClient::new(config)?;

    match client.about().await {
        Ok(about) => tracing::info!(version = %about.build_version, "server about"),
        Err(err) => tracing::error!(%err, "about failed"),
    }

    match client.list_apps().await {
        Ok(apps) => {
            for app in &apps {
                tracing::info!(id = %app.id, name = %app.name, published = app.published, "app");
            }
        }
        Err(ClientError::NotFound) => tracing::warn!("app list endpoint does not exist"),
        Err(err) => tracing::error!(%err, "list failed"),
    }

    if let Some(app_id) = std::env::args().nth(1) {
        let name = std::env::args()
            .nth(2)
            .unwrap_or_else(|| format!("{app_id} copy"));
        let copy = client.copy_app(&app_id, &name).await?;
        tracing::info!(id = %copy.id, name = %copy.name, "app copied");
    }

    Ok(())
}
