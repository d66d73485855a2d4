use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use avatar_proxy::{config::Config, services::avatar::SharedAvatarService, web::WebServer};

#[derive(Parser)]
#[command(name = "avatar-proxy")]
#[command(version)]
#[command(about = "Caching avatar proxy with bounded upstream fetching")]
#[command(long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Listening IP address
    #[arg(short = 'H', long, value_name = "IP")]
    host: Option<String>,

    /// Listening port
    #[arg(short, long, value_name = "PORT")]
    port: Option<u16>,

    /// Avatar provider base URL (overrides config file)
    #[arg(short = 'b', long, value_name = "URL")]
    base_url: Option<String>,

    /// Log level
    #[arg(short = 'v', long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging with specified level
    let log_filter = if cli.log_level == "trace" {
        format!("avatar_proxy={},tower_http=trace", cli.log_level)
    } else {
        format!("avatar_proxy={}", cli.log_level)
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Avatar Proxy v{}", env!("CARGO_PKG_VERSION"));

    let mut config = Config::load_from_file(&cli.config)?;
    info!("Configuration loaded from: {}", cli.config);

    // Override config with CLI arguments
    if let Some(host) = cli.host {
        config.web.host = host;
    }
    if let Some(port) = cli.port {
        config.web.port = port;
    }
    if let Some(base_url) = cli.base_url {
        config.avatar.base_url = base_url;
        config.validate()?;
    }

    info!("Using avatar provider: {}", config.avatar.base_url);

    // Construct up front so client or config problems fail startup
    let avatars = Arc::new(SharedAvatarService::new(config.avatar.clone()));
    let service = avatars.get().await?.clone();
    info!("Avatar service initialized");

    let web_server = WebServer::new(config, avatars)?;

    info!(
        "Starting web server on {}:{}",
        web_server.host(),
        web_server.port()
    );
    web_server.serve().await?;

    service.shutdown();
    info!("Avatar proxy stopped");

    Ok(())
}
