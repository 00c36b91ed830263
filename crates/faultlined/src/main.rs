//! faultlined: receives one file transfer, rebuilds it, and exits.

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use faultline_core::config::FaultlineConfig;
use faultline_services::serve_once;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = FaultlineConfig::load().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "failed to load config, using defaults");
        FaultlineConfig::default()
    });

    let addr = &config.receiver.listen_addr;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to start listener on {addr}"))?;
    tracing::info!(%addr, "listening for a single transfer");

    let outcome = serve_once(&listener, &config.receiver.output_path)
        .await
        .context("transfer failed")?;

    println!("═══════════════════════════════════════");
    println!("  Transfer complete ({})", outcome.peer);
    println!("═══════════════════════════════════════");
    println!("  Accepted  : {}", outcome.accepted);
    println!("  Rejected  : {}", outcome.rejected);
    println!("  Malformed : {}", outcome.malformed);
    println!("  Lost      : {}", outcome.lost_count);
    println!("  Bytes     : {}", outcome.bytes_written);
    println!();
    println!("File saved as '{}'.", outcome.output_path.display());

    Ok(())
}
