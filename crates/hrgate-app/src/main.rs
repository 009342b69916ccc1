use anyhow::Result;
use clap::Parser;
use std::sync::Arc;

use hrgate_backend::BackendClient;
use hrgate_chat::{ChatOrchestrator, JobTracker};
use hrgate_store::{FileStore, MemoryStore, SessionBook, SessionRepository};

use hrgate::{AppConfig, AppState, Cli, WebServer};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file if it exists
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = AppConfig::from_cli(&cli);

    let backend = Arc::new(BackendClient::new(&config.backend_url, config.verbose)?);
    println!("🔗 Relaying to backend at {}", backend.base_url());

    let repo: Arc<dyn SessionRepository> = if config.ephemeral {
        println!("💾 Sessions kept in memory only");
        Arc::new(MemoryStore::new())
    } else {
        let store = FileStore::new(&config.data_dir)?;
        println!("💾 Sessions persisted to {}", store.path().display());
        Arc::new(store)
    };

    let sessions = Arc::new(SessionBook::new(repo));
    sessions.init().await;

    let tracker = Arc::new(JobTracker::default());
    let orchestrator = Arc::new(ChatOrchestrator::new(backend.clone(), sessions.clone()));

    let state = AppState {
        backend,
        orchestrator,
        tracker,
        sessions,
        production: config.production,
    };

    WebServer::new(config.bind_addr, state).start().await
}
