//! Engine configuration ("Configuration (recognized options)").
//!
//! Deserialized via `serde` (TOML in `pod-node`).
//! Unrecognized fields are ignored — no
//! `#[serde(deny_unknown_fields)]`.

use crate::domain::timing::ProtocolConfig;
use crate::domain::Address;
use serde::Deserialize;

/// Recognized configuration options plus the protocol
/// constants they're paired with at setup.
#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    /// Whether to begin mining on startup.
    #[serde(default)]
    pub start_mine: bool,

    /// Block reward/coinbase recipient address.
    pub coinbase: Address,

    /// Local miner identity used for proposer-schedule checks.
    pub miner: Address,

    /// Whether to sign and generate VRF seeds via a remote service instead
    /// of the local account manager.
    #[serde(default)]
    pub enable_remote_sign_server: bool,

    /// Remote sign server endpoint, required when
    /// `enable_remote_sign_server` is set.
    #[serde(default)]
    pub remote_sign_server: Option<String>,

    /// Protocol timing/finality constants.
    #[serde(default = "ProtocolConfig::testnet")]
    pub protocol: ProtocolConfig,

    /// Height at which the VRF random-seed requirement activates.
    #[serde(default)]
    pub vrf_activation_height: u64,

    /// Height at which evil-detection reporting and the governance driver
    /// activate.
    #[serde(default)]
    pub pod_activation_height: u64,

    /// Default unlock duration used by `enable_mining`.
    #[serde(default = "default_unlock_duration_s")]
    pub default_max_unlock_duration_s: u64,
}

const fn default_unlock_duration_s() -> u64 {
    // 5 minutes, a conventional account-unlock window for mining keys.
    300
}

impl EngineConfig {
    /// Build a config from explicit values, skipping file/env lookup; used
    /// by tests and by callers that already hold parsed settings.
    pub fn new(coinbase: Address, miner: Address, protocol: ProtocolConfig) -> Self {
        Self {
            start_mine: false,
            coinbase,
            miner,
            enable_remote_sign_server: false,
            remote_sign_server: None,
            protocol,
            vrf_activation_height: 0,
            pod_activation_height: 0,
            default_max_unlock_duration_s: default_unlock_duration_s(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_from_toml_ignoring_unknown_fields() {
        let addr = Address::from_bytes([7u8; 20]).to_base58();
        let toml_src = format!(
            r#"
            start_mine = true
            coinbase = "{addr}"
            miner = "{addr}"
            enable_remote_sign_server = false
            some_future_field = 42
        "#
        );
        let cfg: EngineConfig = toml::from_str(&toml_src).expect("parses despite unknown field");
        assert!(cfg.start_mine);
        assert!(!cfg.enable_remote_sign_server);
    }
}
