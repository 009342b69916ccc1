use anyhow::Result;
use std::net::SocketAddr;

use tower_http::cors::{Any, CorsLayer};

use crate::web::routes::{self, AppState};

/// Web server instance
pub struct WebServer {
    bind_addr: SocketAddr,
    state: AppState,
}

impl WebServer {
    pub fn new(bind_addr: SocketAddr, state: AppState) -> Self {
        Self { bind_addr, state }
    }

    /// Start the web server and run until interrupted
    pub async fn start(self) -> Result<()> {
        let tracker = self.state.tracker.clone();
        let app = routes::create_router(self.state);

        // CORS layer for development
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
        let app = app.layer(cors);

        println!("🌐 HR gateway listening on http://{}", self.bind_addr);
        println!("   API endpoints: http://{}/api/...", self.bind_addr);

        let listener = tokio::net::TcpListener::bind(&self.bind_addr).await?;
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        // Stop outstanding job poll loops before exiting
        tracker.shutdown().await;
        println!("👋 Shutting down");
        Ok(())
    }
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
