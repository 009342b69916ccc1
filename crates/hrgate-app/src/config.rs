use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

use crate::cli::Cli;

/// Resolved application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub backend_url: String,
    pub data_dir: PathBuf,
    pub ephemeral: bool,
    pub verbose: bool,
    /// Marks cookies Secure; set HRGATE_ENV=production to enable
    pub production: bool,
}

impl AppConfig {
    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            bind_addr: cli.bind,
            backend_url: cli.backend_url.clone(),
            data_dir: cli.data_dir.clone(),
            ephemeral: cli.ephemeral,
            verbose: cli.verbose,
            production: is_production(env::var("HRGATE_ENV").ok().as_deref()),
        }
    }
}

fn is_production(env: Option<&str>) -> bool {
    env == Some("production")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_production_detection() {
        assert!(is_production(Some("production")));
        assert!(!is_production(Some("development")));
        assert!(!is_production(None));
    }
}
