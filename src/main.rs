//! equitydash - fetch and summarize portfolio equity history.
//!
//! Logs in (environment variables or interactive prompts), fetches the
//! year/day equity history through the disk cache, and prints a short
//! summary. Charting and interactive menus are left to presentation
//! layers built on the library.

use std::io;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use equitydash::{ApiClient, Config, Interval, Span};

/// Initialize the tracing subscriber for logging
fn init_tracing() {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();
    init_tracing();

    if let Err(e) = run().await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let mut client = ApiClient::new(Config::default())?;
    client.login().await?;
    info!("Login succeeded");

    let table = client.equity_table(Span::Year, Interval::Day, false).await?;
    if table.is_empty() {
        println!("No equity history for the requested window.");
        return Ok(());
    }

    println!("Points: {}", table.len());
    if let (Some(first), Some(last)) = (table.first(), table.last()) {
        println!(
            "Equity: {:.2} ({}) -> {:.2} ({})",
            first.equity,
            first.begins_at.format("%Y-%m-%d"),
            last.equity,
            last.begins_at.format("%Y-%m-%d")
        );
        if first.equity != 0.0 {
            let change = (last.equity - first.equity) / first.equity * 100.0;
            println!("Change: {:+.2}%", change);
        }
    }
    if let Some((slope, _)) = table.linear_trend() {
        println!("Trend: {:+.2} per interval", slope);
    }

    Ok(())
}
