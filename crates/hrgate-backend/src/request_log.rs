use anyhow::{Context, Result};
use chrono::Utc;
use colored::Colorize;
use serde_json::Value;
use std::fs;
use std::path::PathBuf;

/// Console trace of an outgoing relay request (verbose mode only)
pub fn log_relay(method: &str, url: &str, body: Option<&Value>, verbose: bool) {
    if !verbose {
        return;
    }

    println!(
        "{} {} {}",
        "→".bright_cyan(),
        method.bright_yellow(),
        url
    );
    if let Some(body) = body {
        match serde_json::to_string(body) {
            Ok(json) if json.chars().count() <= 500 => println!("  {}", json.bright_black()),
            Ok(json) => println!(
                "  {}...",
                json.chars().take(500).collect::<String>().bright_black()
            ),
            Err(_) => {}
        }
    }
}

/// Get or create the relay logs directory (./logs)
pub fn get_logs_dir() -> Result<PathBuf> {
    let logs_dir = PathBuf::from("logs");
    if !logs_dir.exists() {
        fs::create_dir_all(&logs_dir).context("Failed to create logs directory")?;
    }
    Ok(logs_dir)
}

/// Persist one request/response exchange for debugging
pub fn log_exchange_to_file(label: &str, url: &str, status: u16, body: &str) -> Result<()> {
    let logs_dir = get_logs_dir()?;

    let now = Utc::now();
    let filename = logs_dir.join(format!(
        "relay-{}-{}.txt",
        now.format("%Y%m%d-%H%M%S%3f"),
        label
    ));

    let mut content = String::new();
    content.push_str("RELAY EXCHANGE LOG\n");
    content.push_str("==================\n\n");
    content.push_str(&format!("Timestamp: {}\n", now.to_rfc3339()));
    content.push_str(&format!("URL: {}\n", url));
    content.push_str(&format!("Status: {}\n\n", status));
    content.push_str("Body:\n");
    content.push_str(body);
    content.push('\n');

    fs::write(&filename, content)
        .with_context(|| format!("Failed to write relay log to {}", filename.display()))?;

    Ok(())
}
