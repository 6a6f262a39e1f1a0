//! CLI argument definitions

use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "graph-gateway")]
#[command(about = "HTTP gateway for vertices, edges and graphs")]
#[command(version)]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Address to listen on, e.g. 127.0.0.1:8529
    #[arg(short, long)]
    pub bind: Option<SocketAddr>,

    /// Path prefix for the graph routes
    #[arg(short, long)]
    pub mount: Option<String>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}
