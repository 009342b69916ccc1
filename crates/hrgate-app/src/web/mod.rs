// Web gateway module
pub mod cookies;
pub mod routes;
pub mod server;
pub mod validate;

pub use routes::{create_router, AppState};
pub use server::WebServer;
