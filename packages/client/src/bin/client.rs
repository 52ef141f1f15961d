//! Hubbub chat client with reconnection support.
//!
//! Joins a relay room and sends every stdin line as a chat message.
//! Automatically reconnects on disconnection (max 5 attempts with 5 second interval).
//!
//! Run with:
//! ```not_rust
//! cargo run --bin hubbub-client -- --username Alice
//! cargo run --bin hubbub-client -- -u ws://127.0.0.1:8181/room/1 -n Bob
//! ```

use clap::Parser;

use hubbub_shared::logger::setup_logger;

#[derive(Parser, Debug)]
#[command(name = "hubbub-client")]
#[command(about = "WebSocket chat client for the Hubbub relay", long_about = None)]
struct Args {
    /// WebSocket room URL
    #[arg(short = 'u', long, default_value = "ws://127.0.0.1:8181/room/1")]
    url: String,

    /// Display name announced to the room after connecting
    #[arg(short = 'n', long)]
    username: Option<String>,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "info");

    let args = Args::parse();

    // Run the client
    if let Err(e) = hubbub_client::run_client(args.url, args.username).await {
        tracing::error!("Client error: {}", e);
        std::process::exit(1);
    }
}
