use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

use api::config::AppConfig;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting Fantamatto API service");

    let config = AppConfig::load()?;
    let state = api::build_state(&config).await?;
    let app = api::build_app(state);

    let address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address).await?;
    info!("Fantamatto API listening on {}", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutting down Fantamatto API service");
        })
        .await?;

    Ok(())
}
