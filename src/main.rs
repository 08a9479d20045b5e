use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use chatrelay::cli::{Cli, Commands};
use chatrelay::connector::api::controller::AskController;
use chatrelay::{Container, Router};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = cli.container_config();
    let container = Container::new(config)?;

    match cli.command {
        Commands::Serve { host, port } => {
            let addr: SocketAddr = format!("{}:{}", host, port)
                .parse()
                .with_context(|| format!("Invalid listen address {}:{}", host, port))?;

            info!(
                "Starting chat relay (upstream: {} at {}, default model: {})",
                container.upstream_name(),
                container.upstream_url(),
                container.default_model()
            );
            Router::new(Arc::new(container)).serve(addr).await?;
        }

        Commands::Ask {
            prompt,
            conversation,
        } => {
            let controller = AskController::new(&container);
            let output = controller.ask(prompt, None, conversation).await?;
            println!("{}", output);
        }
    }

    Ok(())
}
