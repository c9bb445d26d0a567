// Copyright (c) 2025 MCP Rust Contributors
// SPDX-License-Identifier: MIT

use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use admob_mcp::auth::{SystemBrowser, authorize};
use admob_mcp::config::{Config, is_truthy};

#[derive(Parser)]
#[command(
    name = "admob-mcp",
    version,
    about = "Google AdMob tools and prompts over the Model Context Protocol"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Log level (trace, debug, info, warn, error). RUST_LOG takes precedence.
    #[arg(long, global = true)]
    log_level: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Authorize access to the AdMob account and store a refresh token.
    Auth {
        /// Run the browser flow even if a token is already stored.
        #[arg(long)]
        force: bool,
    },
}

fn init_telemetry(cli: &Cli, config: &Config) {
    let level = match (&cli.log_level, config.debug) {
        (Some(level), _) => level.as_str(),
        (None, true) => "debug",
        (None, false) => "info",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    // stdout carries the MCP stream; logs always go to stderr.
    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_ansi(cli.command.is_some()),
        )
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if std::env::var("DEBUG").is_ok_and(|value| is_truthy(&value)) {
        dotenvy::dotenv().ok();
    }
    let config = Arc::new(Config::from_env());
    init_telemetry(&cli, &config);

    let code = match cli.command {
        Some(Commands::Auth { force }) => match authorize(&config, &SystemBrowser, force).await {
            Ok(_) => {
                eprintln!(
                    "Authorization complete. Token stored at {}",
                    config.token_path().display()
                );
                0
            }
            Err(e) => {
                tracing::error!("Authorization failed: {}", e);
                eprintln!("Authorization failed: {e}");
                1
            }
        },
        None => serve(config).await,
    };

    // Exit explicitly: a pending stdin read would otherwise keep the runtime alive.
    std::process::exit(code);
}

async fn serve(config: Arc<Config>) -> i32 {
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        credentials_dir = %config.credentials_dir.display(),
        publisher_configured = config.publisher_code.is_some(),
        "admob-mcp starting"
    );

    let server = match admob_mcp::admob::build_server(config).await {
        Ok(server) => server,
        Err(e) => {
            tracing::error!("Failed to build server: {}", e);
            return 1;
        }
    };

    match server.run_with_stdio().await {
        Ok(()) => 0,
        Err(e) => {
            tracing::error!("Server error: {}", e);
            1
        }
    }
}
