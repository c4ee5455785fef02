use alloy::primitives::Address;
use anyhow::{Context, Result, bail};
use nouns::{
    NOUNS_DAO_PROXY_ADDRESS, safe_api::SAFE_TRANSACTION_SERVICE_URL, subgraph::NOUNS_SUBGRAPH_URL,
};
use once_cell::sync::OnceCell;
use serde::Deserialize;
use std::{env, fs};
use tracing::{info, warn};
use utils::errors::{
    CONFIG_ALREADY_INITIALIZED, CONFIG_NOT_INITIALIZED, ETHEREUM_NODE_URL_NOT_SET,
    INVALID_DAO_PROXY_ADDRESS, INVALID_SAFE_ADDRESS,
};

pub static CONFIG: OnceCell<MultisigConfig> = OnceCell::new();

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MultisigConfig {
    pub ethereum_node_url: String,
    /// Safe whose pending votes are shown. Without it no votes are queued.
    pub safe_address: Option<String>,
    pub dao_proxy_address: String,
    pub subgraph_url: String,
    pub safe_transaction_service_url: String,
    pub poll_interval_secs: u64,
    pub proposals_to_fetch: usize,
    pub is_dao_gte_v3: bool,
}

impl Default for MultisigConfig {
    fn default() -> Self {
        Self {
            ethereum_node_url: String::new(),
            safe_address: None,
            dao_proxy_address: NOUNS_DAO_PROXY_ADDRESS.to_string(),
            subgraph_url: NOUNS_SUBGRAPH_URL.to_string(),
            safe_transaction_service_url: SAFE_TRANSACTION_SERVICE_URL.to_string(),
            poll_interval_secs: 60,
            proposals_to_fetch: 100,
            is_dao_gte_v3: true,
        }
    }
}

impl MultisigConfig {
    pub fn safe_address(&self) -> Result<Option<Address>> {
        self.safe_address
            .as_deref()
            .map(|address| address.parse::<Address>().context(INVALID_SAFE_ADDRESS))
            .transpose()
    }

    pub fn dao_proxy_address(&self) -> Result<Address> {
        self.dao_proxy_address
            .parse::<Address>()
            .context(INVALID_DAO_PROXY_ADDRESS)
    }
}

pub fn load() -> Result<()> {
    let config = load_config()?;
    CONFIG
        .set(config)
        .map_err(|_| anyhow::anyhow!(CONFIG_ALREADY_INITIALIZED))?;
    Ok(())
}

pub fn get_config() -> Result<&'static MultisigConfig> {
    CONFIG.get().context(CONFIG_NOT_INITIALIZED)
}

fn load_config() -> Result<MultisigConfig> {
    let path = env::var("MULTISIG_CONFIG_PATH").unwrap_or_else(|_| "multisig.yaml".to_string());
    let mut config = match fs::read_to_string(&path) {
        Ok(contents) => match serde_yaml::from_str::<MultisigConfig>(&contents) {
            Ok(config) => config,
            Err(err) => {
                warn!(error = %err, path = %path, "Failed to parse multisig config, using defaults");
                MultisigConfig::default()
            }
        },
        Err(err) => {
            warn!(error = %err, path = %path, "Multisig config not found, using defaults");
            MultisigConfig::default()
        }
    };

    apply_env_overrides(&mut config);
    validate(&config)?;

    info!(
        safe_address = config.safe_address.as_deref().unwrap_or("none"),
        dao_proxy_address = %config.dao_proxy_address,
        poll_interval_secs = config.poll_interval_secs,
        "Multisig config loaded"
    );

    Ok(config)
}

fn apply_env_overrides(config: &mut MultisigConfig) {
    if let Ok(value) = env::var("ETHEREUM_NODE_URL") {
        config.ethereum_node_url = value;
    }

    if let Ok(value) = env::var("SAFE_ADDRESS") {
        config.safe_address = Some(value).filter(|v| !v.is_empty());
    }

    if let Ok(value) = env::var("NOUNS_SUBGRAPH_URL") {
        config.subgraph_url = value;
    }

    if let Ok(value) = env::var("SAFE_TRANSACTION_SERVICE_URL") {
        config.safe_transaction_service_url = value;
    }

    if let Ok(value) = env::var("NOUNS_DAO_PROXY_ADDRESS") {
        config.dao_proxy_address = value;
    }

    if let Ok(value) = env::var("MULTISIG_POLL_INTERVAL_SECS") {
        match value.parse::<u64>() {
            Ok(secs) if secs > 0 => {
                config.poll_interval_secs = secs;
            }
            Ok(_) => {
                warn!("Ignoring zero MULTISIG_POLL_INTERVAL_SECS override");
            }
            Err(err) => {
                warn!(
                    error = %err,
                    "Failed to parse MULTISIG_POLL_INTERVAL_SECS override"
                );
            }
        }
    }
}

fn validate(config: &MultisigConfig) -> Result<()> {
    if config.ethereum_node_url.trim().is_empty() {
        bail!(ETHEREUM_NODE_URL_NOT_SET);
    }
    config.safe_address()?;
    config.dao_proxy_address()?;
    Ok(())
}
