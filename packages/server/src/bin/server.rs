//! Hubbub relay server.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin hubbub-server
//! cargo run --bin hubbub-server -- --host 0.0.0.0 --port 3000 --broadcast-interval 2
//! ```

use std::{path::PathBuf, time::Duration};

use clap::Parser;
use hubbub_server::ui::{Server, ServerConfig};
use hubbub_shared::logger::setup_logger;

#[derive(Parser, Debug)]
#[command(name = "hubbub-server")]
#[command(about = "WebSocket chat relay server", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, default_value = "8181")]
    port: u16,

    /// Directory of static files served for unknown paths
    #[arg(long, default_value = "web/static")]
    static_dir: PathBuf,

    /// Room id served under /room/{room_id}
    #[arg(long, default_value = "1")]
    room_id: String,

    /// Broadcast a tick to every /ws connection every N seconds
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    broadcast_interval: Option<u64>,

    /// Stop the periodic broadcast after N seconds
    #[arg(long, default_value = "100")]
    broadcast_for: u64,
}

impl From<Args> for ServerConfig {
    fn from(args: Args) -> Self {
        Self {
            host: args.host,
            port: args.port,
            static_dir: args.static_dir,
            room_id: args.room_id,
            broadcast_interval: args.broadcast_interval.map(Duration::from_secs),
            broadcast_for: Duration::from_secs(args.broadcast_for),
        }
    }
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "debug");

    let args = Args::parse();
    let server = Server::new(ServerConfig::from(args));

    if let Err(e) = server.run().await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
