//! faultline-send: send a file to faultlined through a lossy, shuffling sender.

use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

use faultline_core::config::FaultlineConfig;
use faultline_services::{transmit_file, ChaosFaults};

fn print_usage() {
    println!("Usage: faultline-send [options] <file_path> <server_address>");
    println!();
    println!("Options:");
    println!("  --seed <n>           Seed for shuffling and fault injection");
    println!("  --segment-size <n>   Payload bytes per segment (default: 64)");
    println!("  --loss <p>           Drop probability per segment (default: 0.10)");
    println!("  --corrupt <p>        Corruption probability per segment (default: 0.10)");
}

/// Command-line arguments after option parsing.
struct Args {
    file: PathBuf,
    addr: String,
}

/// Parse options into `config` and return the positional arguments.
/// Returns `Ok(None)` when fewer than two positionals were given.
fn parse_args(args: &[String], config: &mut FaultlineConfig) -> Result<Option<Args>> {
    let mut positional: Vec<&str> = Vec::new();
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--seed" => {
                i += 1;
                let seed = args
                    .get(i)
                    .context("--seed requires a value")?
                    .parse()
                    .context("--seed must be a number")?;
                config.faults.seed = Some(seed);
            }
            "--segment-size" => {
                i += 1;
                config.transfer.segment_size = args
                    .get(i)
                    .context("--segment-size requires a value")?
                    .parse()
                    .context("--segment-size must be a number")?;
            }
            "--loss" => {
                i += 1;
                config.faults.loss_rate = args
                    .get(i)
                    .context("--loss requires a value")?
                    .parse()
                    .context("--loss must be a number")?;
            }
            "--corrupt" => {
                i += 1;
                config.faults.corrupt_rate = args
                    .get(i)
                    .context("--corrupt requires a value")?
                    .parse()
                    .context("--corrupt must be a number")?;
            }
            other => positional.push(other),
        }
        i += 1;
    }

    match positional.as_slice() {
        [file, addr, ..] => Ok(Some(Args {
            file: PathBuf::from(*file),
            addr: addr.to_string(),
        })),
        _ => Ok(None),
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mut config = FaultlineConfig::load().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "failed to load config, using defaults");
        FaultlineConfig::default()
    });

    let raw: Vec<String> = std::env::args().skip(1).collect();
    if matches!(raw.first().map(String::as_str), Some("help" | "--help" | "-h")) {
        print_usage();
        return Ok(());
    }

    let Some(args) = parse_args(&raw, &mut config)? else {
        print_usage();
        std::process::exit(1);
    };

    let mut faults = ChaosFaults::from_config(&config.faults);
    tracing::info!(
        seed = faults.seed(),
        loss_rate = faults.loss_rate(),
        corrupt_rate = faults.corrupt_rate(),
        segment_size = config.transfer.segment_size,
        "fault injection configured"
    );

    let report = transmit_file(&args.file, &args.addr, config.transfer.segment_size, &mut faults)
        .await
        .with_context(|| format!("failed to send {}", args.file.display()))?;

    if report.aborted {
        tracing::error!(written = report.written, "transport failed, transfer cut short");
    }
    tracing::info!(
        written = report.written,
        dropped = report.dropped,
        corrupted = report.corrupted,
        "transfer finished"
    );
    println!("Sent {} segments in total.", report.written);

    Ok(())
}
