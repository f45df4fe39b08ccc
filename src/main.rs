use anyhow::Result;
use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tradesxbt::{
    config::AppConfig,
    feed::{PriceEndpoint, PriceFeed},
    monitor, server, utils,
};

#[derive(Parser)]
#[command(name = "tradesxbt", version, about = "Live price feed and dashboard gateway")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP gateway.
    Serve {
        /// Overrides BIND_ADDR.
        #[arg(long, env = "BIND_ADDR")]
        bind: Option<SocketAddr>,
    },
    /// Follow the live price feed and log it.
    Watch {
        #[arg(long, default_value_t = 5)]
        heartbeat_secs: u64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    utils::init_logging();

    let cli = Cli::parse();
    let mut config = AppConfig::load()?;

    match cli.command {
        Command::Serve { bind } => {
            if let Some(addr) = bind {
                config.bind_addr = addr;
            }
            tracing::info!(bind = %config.bind_addr, "[INIT] tradesxbt gateway starting");
            server::serve(config).await?;
        }
        Command::Watch { heartbeat_secs } => {
            let token = config.require_bitquery_token()?.to_string();
            tracing::info!(
                endpoint = %config.price_endpoint,
                ws = %config.feed.ws_url,
                max_attempts = config.feed.max_attempts,
                "[INIT] tradesxbt watch starting"
            );

            let source = Arc::new(PriceEndpoint::new(&config.price_endpoint)?);
            let mut feed = PriceFeed::new(config.feed.clone(), source);
            let handle =
                monitor::spawn_price_monitor(feed.watch(), Duration::from_secs(heartbeat_secs.max(1)));
            feed.subscribe(&token).await?;

            tokio::signal::ctrl_c().await?;
            tracing::info!("[INIT] shutting down");
            feed.unsubscribe().await;
            drop(feed);
            let _ = handle.await;
        }
    }
    Ok(())
}
