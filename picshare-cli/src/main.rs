//! # PicShare CLI
//!
//! Schema migrations and user administration for the PicShare database.
//!
//! ## Usage
//!
//! ```bash
//! picshare-cli migrate up
//! picshare-cli migrate down --target 20240101000000
//! picshare-cli user show --email alice@example.com
//! ```

use clap::Parser;
use picshare_cli::commands::{self, Cli};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Exactly one of the two fmt layers is installed
    let json = cli.log_json;
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "picshare_cli=info,picshare_shared=info".into()),
        )
        .with(json.then(|| tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr)))
        .with((!json).then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr)))
        .init();

    tracing::debug!("PicShare CLI v{} starting", env!("CARGO_PKG_VERSION"));

    commands::run(cli).await
}
