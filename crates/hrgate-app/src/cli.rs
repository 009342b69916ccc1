use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;

/// CLI arguments for hrgate
#[derive(Parser, Debug)]
#[command(name = "hrgate")]
#[command(about = "HR assistant gateway - relays browser API routes to the HR backend")]
#[command(version = "0.1.0")]
pub struct Cli {
    /// Address to listen on
    #[arg(long, default_value = "127.0.0.1:3000")]
    pub bind: SocketAddr,

    /// Base URL of the HR FastAPI backend
    #[arg(long, env = "BACKEND_URL", default_value = "http://localhost:8000")]
    pub backend_url: String,

    /// Directory for persisted chat sessions
    #[arg(long, default_value = "data")]
    pub data_dir: PathBuf,

    /// Keep chat sessions in memory only (nothing written to disk)
    #[arg(long)]
    pub ephemeral: bool,

    /// Log every relayed request to the console and the logs directory
    #[arg(short, long)]
    pub verbose: bool,
}
