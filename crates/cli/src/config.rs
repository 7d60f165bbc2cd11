// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Client configuration and data directory layout.
//!
//! A data directory holds:
//! - `config.toml`: client id and `[sync]` settings
//! - `satchel.db`: the local store

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use satchel_core::{DrainMode, SyncConfig};

use crate::error::{Error, Result};

const DATA_DIR_NAME: &str = "satchel";
const CONFIG_FILE_NAME: &str = "config.toml";
const DB_FILE_NAME: &str = "satchel.db";

/// Client configuration stored in `<data-dir>/config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Stable id the remote uses to de-duplicate re-submitted changes.
    pub client_id: String,
    #[serde(default)]
    pub sync: SyncSection,
}

/// The `[sync]` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncSection {
    /// WebSocket server. Absent means local-only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_url: Option<String>,
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    #[serde(default)]
    pub drain_mode: DrainMode,
    /// How long to wait for the server to acknowledge one entry.
    #[serde(default = "default_ack_timeout_secs")]
    pub ack_timeout_secs: u64,
}

impl Default for SyncSection {
    fn default() -> Self {
        SyncSection {
            remote_url: None,
            debounce_ms: default_debounce_ms(),
            drain_mode: DrainMode::default(),
            ack_timeout_secs: default_ack_timeout_secs(),
        }
    }
}

fn default_debounce_ms() -> u64 {
    1000
}

fn default_ack_timeout_secs() -> u64 {
    10
}

impl Config {
    /// A config with a freshly generated client id.
    pub fn new(remote_url: Option<String>) -> Result<Self> {
        if let Some(url) = &remote_url {
            validate_remote_url(url)?;
        }
        Ok(Config {
            client_id: generate_client_id(),
            sync: SyncSection {
                remote_url,
                ..SyncSection::default()
            },
        })
    }

    pub fn load(data_dir: &Path) -> Result<Self> {
        let config_path = config_path(data_dir);
        if !config_path.exists() {
            return Err(Error::NotInitialized);
        }
        let content = fs::read_to_string(&config_path)
            .map_err(|e| Error::Config(format!("failed to read config: {}", e)))?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse config: {}", e)))?;
        if let Some(url) = &config.sync.remote_url {
            validate_remote_url(url)?;
        }
        Ok(config)
    }

    pub fn save(&self, data_dir: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("failed to serialize config: {}", e)))?;
        fs::write(config_path(data_dir), content)?;
        Ok(())
    }

    pub fn remote_url(&self) -> Option<&str> {
        self.sync.remote_url.as_deref()
    }

    pub fn sync_config(&self) -> SyncConfig {
        SyncConfig {
            debounce: Duration::from_millis(self.sync.debounce_ms),
            drain_mode: self.sync.drain_mode,
        }
    }

    pub fn ack_timeout(&self) -> Duration {
        Duration::from_secs(self.sync.ack_timeout_secs.max(1))
    }
}

fn validate_remote_url(url: &str) -> Result<()> {
    if url.starts_with("ws://") || url.starts_with("wss://") {
        Ok(())
    } else {
        Err(Error::InvalidRemoteUrl(url.to_string()))
    }
}

/// `c-` followed by hex of the creation time and process id.
fn generate_client_id() -> String {
    let nanos = chrono::Utc::now()
        .timestamp_nanos_opt()
        .unwrap_or_default();
    format!("c-{:x}{:04x}", nanos, std::process::id() & 0xffff)
}

/// Resolves the data directory: explicit flag (or `SATCHEL_DIR`, which clap
/// folds into the flag), else the platform data directory.
pub fn resolve_data_dir(flag: Option<PathBuf>) -> Result<PathBuf> {
    match flag {
        Some(dir) => Ok(dir),
        None => dirs::data_local_dir()
            .map(|d| d.join(DATA_DIR_NAME))
            .ok_or(Error::NoDataDir),
    }
}

pub fn config_path(data_dir: &Path) -> PathBuf {
    data_dir.join(CONFIG_FILE_NAME)
}

pub fn db_path(data_dir: &Path) -> PathBuf {
    data_dir.join(DB_FILE_NAME)
}

/// Creates the data directory and writes a new config.
///
/// Fails if a config already exists there.
pub fn init_data_dir(data_dir: &Path, remote_url: Option<String>) -> Result<Config> {
    if config_path(data_dir).exists() {
        return Err(Error::AlreadyInitialized(data_dir.display().to_string()));
    }
    let config = Config::new(remote_url)?;
    fs::create_dir_all(data_dir)?;
    config.save(data_dir)?;
    Ok(config)
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
