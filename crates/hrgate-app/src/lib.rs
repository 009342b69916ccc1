//! HR assistant gateway: CLI, configuration, and the axum web server that
//! relays browser-facing routes to the HR backend.

pub mod cli;
pub mod config;
pub mod web;

pub use cli::Cli;
pub use config::AppConfig;
pub use web::{create_router, AppState, WebServer};
