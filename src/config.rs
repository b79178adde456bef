//! Process configuration: command-line flags plus an optional YAML file.

use crate::application::LatencyConfig;
use crate::domain::MarketData;
use anyhow::Context;
use clap::Parser;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Command-line flags.
#[derive(Parser, Debug, Clone)]
#[command(name = "price-fetcher", version, about = "JSON API serving cryptocurrency prices")]
pub struct Cli {
    /// Listen address the service is running on (":3000" binds all interfaces)
    #[arg(long = "listenaddr", env = "LISTEN_ADDR", default_value = ":3000")]
    pub listen_addr: String,

    /// Path to the YAML configuration file. A missing file means defaults.
    #[arg(long, env = "CONFIG_PATH", default_value = "config.yaml")]
    pub config: PathBuf,
}

/// Top-level application configuration loaded from `config.yaml`.
#[derive(Deserialize, Debug, Clone, Default)]
pub struct Config {
    /// Server configuration (CORS origins)
    #[serde(default)]
    pub server: ServerConfig,
    /// Simulated upstream latency
    #[serde(default)]
    pub latency: LatencyConfig,
    /// Optional market data file replacing the built-in tables
    #[serde(default)]
    pub data_path: Option<PathBuf>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct ServerConfig {
    /// Comma-separated list of allowed CORS origins (default: "*")
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: String,
}

fn default_allowed_origins() -> String {
    "*".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            allowed_origins: default_allowed_origins(),
        }
    }
}

impl Config {
    /// Load from `path`, falling back to defaults when the file does not exist.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            tracing::info!("{} not found - using default configuration", path.display());
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::from_yaml(&content).with_context(|| {
            format!(
                "Failed to parse {} - check YAML syntax and structure",
                path.display()
            )
        })
    }

    pub fn from_yaml(content: &str) -> anyhow::Result<Self> {
        // An empty document deserializes as unit, not as a mapping.
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }

    /// Tables from `data_path`, or the built-in seed tables.
    pub fn market_data(&self) -> anyhow::Result<MarketData> {
        match &self.data_path {
            Some(path) => MarketData::load(path),
            None => Ok(MarketData::builtin()),
        }
    }
}

/// Turn a Go-style `:PORT` address into a bindable `0.0.0.0:PORT`.
pub fn resolve_listen_addr(addr: &str) -> String {
    if addr.starts_with(':') {
        format!("0.0.0.0{}", addr)
    } else {
        addr.to_string()
    }
}
