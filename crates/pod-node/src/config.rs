//! Node-level configuration: where `pod-consensus`'s [`EngineConfig`] is
//! actually loaded from TOML, in the binary crate rather than the library.

use clap::Parser;
use pod_consensus::EngineConfig;
use std::path::PathBuf;
use thiserror::Error;

/// Command-line arguments, `clap`-derive style.
#[derive(Debug, Parser)]
#[command(name = "pod-node", about = "Proof-of-Devotion consensus node")]
pub struct Cli {
    /// Path to the node's TOML configuration file.
    #[arg(long, default_value = "pod-node.toml")]
    pub config: PathBuf,

    /// Chain identifier mixed into every block hash ("seal").
    #[arg(long, default_value_t = 1)]
    pub chain_id: u64,

    /// Override the configured log level (ambient logging, not
    /// a consensus option).
    #[arg(long)]
    pub log_level: Option<String>,
}

/// Errors loading the node's configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Load [`EngineConfig`] from `path`. Unrecognized TOML fields are ignored
/// by `EngineConfig`'s own `Deserialize` impl ("Dynamic
/// config").
pub fn load_engine_config(path: &PathBuf) -> Result<EngineConfig, ConfigError> {
    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.clone(),
        source,
    })?;
    toml::from_str(&raw).map_err(|source| ConfigError::Parse {
        path: path.clone(),
        source,
    })
}
