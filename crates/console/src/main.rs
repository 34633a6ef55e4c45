//! `clubdesk`: terminal console for the club administration API.
//!
//! ```sh
//! clubdesk login --email admin@example.org
//! clubdesk list players --search ravi --sort firstName --filter clubId=4
//! clubdesk create regions --data '{"name": "Konkan", "code": "KN"}'
//! clubdesk export players excel -o players.xlsx
//! ```

mod cli;
mod commands;
mod config;
mod render;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cli::Cli;
use commands::Console;
use config::ConsoleConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "clubdesk=info,clubdesk_client=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    // --- Configuration ---
    let mut config = ConsoleConfig::from_env();
    if let Some(api_url) = cli.api_url {
        config.client = clubdesk_client::ClientConfig::new(api_url, config.client.request_timeout_secs);
    }
    tracing::debug!(
        api_url = %config.client.base_url,
        session_file = %config.session_file.display(),
        page_size = config.page_size,
        "Loaded console configuration"
    );

    let mut console = Console::new(config, cli.json)?;
    console.run(cli.command).await
}
