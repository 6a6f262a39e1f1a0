//! Graph gateway server

use clap::Parser;
use graph_gateway_adapter_in_memory::InMemoryGraphModule;
use graph_gateway_core::{GraphModule, PresentationAdapter};
use graph_gateway_http::GraphGatewayHttp;
use std::process;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod cli;
mod config;

use cli::Cli;
use config::ServerConfig;

#[tokio::main]
async fn main() {
    let args = Cli::parse();

    // Initialize logging; RUST_LOG wins over -v
    let log_level = match args.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    // Load configuration
    let config = match ServerConfig::load(&args.config) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            process::exit(1);
        }
    };

    // Override config with CLI args
    let config = config.with_overrides(&args);

    let module: Arc<dyn GraphModule> = Arc::new(InMemoryGraphModule::new_with_config(config.store.clone()));
    let gateway = Arc::new(GraphGatewayHttp::new(config.http.clone()));

    let signal_gateway = Arc::clone(&gateway);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Received Ctrl-C");
            if let Err(e) = signal_gateway.stop().await {
                error!("Failed to stop graph gateway: {}", e);
            }
        }
    });

    if let Err(e) = gateway.start(module).await {
        error!("Graph gateway failed: {}", e);
        process::exit(1);
    }

    info!("Graph gateway stopped");
}
