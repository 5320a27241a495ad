use clap::Parser;
use cli::commands::Cli;
use tracing_subscriber::prelude::__tracing_subscriber_SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::cli::handlers::CommandHandler;

mod chat;
mod cli;
mod client;
mod prompts;
mod server;
mod store;
mod trending;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();
    let cli = Cli::parse();

    let handler = CommandHandler::new(&cli)?;
    handler.run().await
}

/// Log to stderr so command output on stdout stays clean
fn init_logging() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "promptdeck=info,tower_http=info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
