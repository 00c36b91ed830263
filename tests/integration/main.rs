//! Faultline integration test harness.
//!
//! Every test runs a real sender and a real one-shot receiver against each
//! other over loopback TCP on an OS-assigned port. Nothing needs to be set
//! up beforehand.
//!
//!   cargo test --test integration

use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use faultline_services::{serve_once, SessionError, SessionOutcome};

mod faults;
mod transfer;

// ── Harness ───────────────────────────────────────────────────────────────────

/// Scratch directory removed on drop, including when a test panics.
pub struct TestDir {
    path: PathBuf,
}

impl TestDir {
    pub fn new(name: &str) -> Self {
        let path = std::env::temp_dir().join(format!(
            "faultline-it-{name}-{}",
            std::process::id()
        ));
        let _ = std::fs::remove_dir_all(&path);
        std::fs::create_dir_all(&path).expect("failed to create test dir");
        Self { path }
    }

    pub fn join(&self, name: &str) -> PathBuf {
        self.path.join(name)
    }
}

impl Drop for TestDir {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.path);
    }
}

/// Deterministic bytes that never contain the field or record delimiter.
pub fn frame_safe_bytes(len: usize) -> Vec<u8> {
    (0..len)
        .map(|i| match (i * 31 % 256) as u8 {
            b'|' | b'\n' => b'.',
            b => b,
        })
        .collect()
}

/// Every sequence number covered by `gaps`. Only for small test gaps.
pub fn expand(gaps: &[RangeInclusive<u64>]) -> Vec<u64> {
    gaps.iter().flat_map(|g| g.clone()).collect()
}

/// Write `data` to `name` inside `dir` and return the path.
pub fn write_input(dir: &TestDir, name: &str, data: &[u8]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, data).expect("failed to write input file");
    path
}

/// Bind a loopback listener and start a one-shot receiver writing to `output`.
/// Returns the address to send to and the receiver's task.
pub async fn spawn_receiver(
    output: &Path,
) -> Result<(String, JoinHandle<Result<SessionOutcome, SessionError>>)> {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .context("failed to bind loopback listener")?;
    let addr = listener.local_addr()?.to_string();
    let output = output.to_path_buf();
    let task = tokio::spawn(async move { serve_once(&listener, &output).await });
    Ok((addr, task))
}
