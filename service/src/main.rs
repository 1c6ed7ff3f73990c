mod config;
mod dispatcher;
mod emitter;
mod error;
mod models;
mod relay;
mod reporter;

use std::process::ExitCode;

use clap::Parser;
use relay_parser::NdjsonParser;
use tokio::io::BufReader;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Cli;
use crate::dispatcher::Dispatcher;
use crate::error::{error_chain, RelayError};
use crate::models::RelaySummary;
use crate::relay::Relay;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // Initialize tracing; stdout carries relayed bodies, so logs go to stderr
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mcp_relay=warn,relay_parser=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(summary) => {
            tracing::debug!("Exiting after {:?}", summary);
            ExitCode::SUCCESS
        }
        Err(err) => {
            tracing::error!("Relay stopped: {}", error_chain(&err));
            eprintln!("Error: {}", error_chain(&err));
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<RelaySummary, RelayError> {
    let config = cli.into_config()?;
    let dispatcher = Dispatcher::new(&config)?;
    tracing::info!("Forwarding requests to {}", dispatcher.url());

    let relay = Relay::new(NdjsonParser, dispatcher, config.max_in_flight);
    relay
        .run(
            BufReader::new(tokio::io::stdin()),
            tokio::io::stdout(),
            tokio::io::stderr(),
        )
        .await
}
