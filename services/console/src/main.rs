//! Terminal front end for Fantamatto

mod prompt;
mod screens;

use clap::Parser;
use client::{App, ClientConfig};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::prompt::DialoguerPrompter;

/// Hunt the craziest characters of Ponza from your terminal
#[derive(Debug, Parser)]
#[command(name = "fantamatto", version, about)]
struct Cli {
    /// Backend origin; `/api` is appended
    #[arg(long, env = "FANTAMATTO_API_URL", default_value = "http://localhost:8000")]
    api_url: String,

    /// Rows shown by the leaderboard and gallery
    #[arg(long, env = "FANTAMATTO_DISPLAY_LIMIT", default_value_t = 10)]
    display_limit: usize,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    debug!("{cli:?}");
    if cli.display_limit == 0 {
        anyhow::bail!("--display-limit must be greater than 0");
    }

    let config = ClientConfig {
        base_url: cli.api_url,
        display_limit: cli.display_limit,
    };
    let mut app = App::new(&config, DialoguerPrompter);
    app.on_start().await;

    screens::main_menu(&mut app).await
}
