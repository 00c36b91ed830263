//! Configuration system for Faultline.
//!
//! Resolution order: environment variables → config file → defaults.
//!
//! Config file location:
//!   1. $FAULTLINE_CONFIG (explicit override)
//!   2. $XDG_CONFIG_HOME/faultline/config.toml
//!   3. ~/.config/faultline/config.toml

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Segment size used when nothing else is configured.
pub const DEFAULT_SEGMENT_SIZE: usize = 64;

/// Address the receiver listens on by default.
pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:8080";

/// Output file written by the receiver, relative to the working directory.
pub const DEFAULT_OUTPUT_PATH: &str = "received_file.txt";

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FaultlineConfig {
    pub transfer: TransferConfig,
    pub faults: FaultConfig,
    pub receiver: ReceiverConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TransferConfig {
    /// Payload bytes per segment. Must be non-zero.
    pub segment_size: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FaultConfig {
    /// Probability that a segment is silently dropped.
    pub loss_rate: f64,
    /// Probability that a surviving segment has its payload replaced.
    pub corrupt_rate: f64,
    /// Seed for shuffling and fault decisions. None = fresh entropy per run.
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReceiverConfig {
    pub listen_addr: String,
    pub output_path: PathBuf,
}

// ── Defaults ──────────────────────────────────────────────────────────────────

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            segment_size: DEFAULT_SEGMENT_SIZE,
        }
    }
}

impl Default for FaultConfig {
    fn default() -> Self {
        Self {
            loss_rate: 0.10,
            corrupt_rate: 0.10,
            seed: None,
        }
    }
}

impl Default for ReceiverConfig {
    fn default() -> Self {
        Self {
            listen_addr: DEFAULT_LISTEN_ADDR.to_string(),
            output_path: PathBuf::from(DEFAULT_OUTPUT_PATH),
        }
    }
}

// ── Path helpers ──────────────────────────────────────────────────────────────

fn config_dir() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".config"))
        .join("faultline")
}

fn home_dir() -> PathBuf {
    std::env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/tmp"))
}

// ── Errors ────────────────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {0}: {1}")]
    ReadFailed(PathBuf, std::io::Error),
    #[error("failed to parse {0}: {1}")]
    ParseFailed(PathBuf, toml::de::Error),
}

// ── Loading ───────────────────────────────────────────────────────────────────

impl FaultlineConfig {
    /// Load config: env vars → file → defaults.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::load_file(&Self::file_path())?;
        config.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Read a config file, falling back to defaults when it does not exist.
    pub fn load_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::ReadFailed(path.to_path_buf(), e))?;
        toml::from_str(&text).map_err(|e| ConfigError::ParseFailed(path.to_path_buf(), e))
    }

    /// Config file path.
    pub fn file_path() -> PathBuf {
        std::env::var("FAULTLINE_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| config_dir().join("config.toml"))
    }

    /// Apply FAULTLINE_* overrides. Unparsable values are ignored.
    fn apply_env_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(v) = var("FAULTLINE_TRANSFER__SEGMENT_SIZE") {
            if let Ok(n) = v.parse() {
                self.transfer.segment_size = n;
            }
        }
        if let Some(v) = var("FAULTLINE_FAULTS__LOSS_RATE") {
            if let Ok(p) = v.parse() {
                self.faults.loss_rate = p;
            }
        }
        if let Some(v) = var("FAULTLINE_FAULTS__CORRUPT_RATE") {
            if let Ok(p) = v.parse() {
                self.faults.corrupt_rate = p;
            }
        }
        if let Some(v) = var("FAULTLINE_FAULTS__SEED") {
            if let Ok(s) = v.parse() {
                self.faults.seed = Some(s);
            }
        }
        if let Some(v) = var("FAULTLINE_RECEIVER__LISTEN_ADDR") {
            self.receiver.listen_addr = v;
        }
        if let Some(v) = var("FAULTLINE_RECEIVER__OUTPUT_PATH") {
            self.receiver.output_path = PathBuf::from(v);
        }
    }
}
