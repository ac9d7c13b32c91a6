//! Pairup lobby server binary.

use anyhow::Result;
use clap::Parser;
use pairup::PairupServerBuilder;
use pairup_lobby::{DeparturePolicy, LobbyConfig};
use tracing_subscriber::EnvFilter;

/// Real-time two-player matchmaking lobby server.
#[derive(Parser)]
#[command(name = "pairup", version, about)]
struct Args {
    /// Port to listen on.
    #[arg(short, long, env = "PORT", default_value_t = 4000)]
    port: u16,

    /// Address to bind.
    #[arg(long, default_value = "0.0.0.0")]
    bind: String,

    /// Keep half-empty rooms open for a replacement opponent instead of
    /// tearing them down when one of two members departs.
    #[arg(long)]
    reserve_rooms: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let departure_policy = if args.reserve_rooms {
        DeparturePolicy::Reserve
    } else {
        DeparturePolicy::Teardown
    };

    let server = PairupServerBuilder::new()
        .bind(&format!("{}:{}", args.bind, args.port))
        .lobby_config(LobbyConfig { departure_policy })
        .build()
        .await?;

    tracing::info!(port = args.port, "server listening");
    server.run().await?;
    Ok(())
}
