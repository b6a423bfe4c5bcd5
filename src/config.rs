use std::path::Path;
use std::str::FromStr;
use std::{env, fs};

use alloy_primitives::{address, Address, B256};
use anyhow::Context;
use serde::Deserialize;

use crate::chain::ChainParams;
use crate::workflow::ApprovalChannel;

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub backend: BackendConfig,
    pub contracts: Contracts,
    pub chain: ChainConfig,
    pub catalog: CatalogConfig,
    pub general: General,
    pub credentials: Credentials,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    pub url: String,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            url: "https://kamoaze30.onrender.com".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Contracts {
    /// The ERC-721 collection traded here
    pub nft: Address,
    /// Seaport deployment orders are signed for and filled on
    pub marketplace: Address,
    /// Route approvals through a conduit instead of the marketplace itself
    pub conduit: Option<ConduitConfig>,
}

impl Default for Contracts {
    fn default() -> Self {
        Self {
            nft: address!("54a88333F6e7540eA982261301309048aC431eD5"),
            marketplace: address!("0000000000000068F116a894984e2DB1123eB395"),
            conduit: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ConduitConfig {
    pub key: B256,
    pub address: Address,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ChainConfig {
    pub id: u64,
    pub name: String,
    pub rpc_url: String,
    pub explorer_url: String,
    pub currency_name: String,
    pub currency_symbol: String,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            id: 33139,
            name: "ApeChain Mainnet".to_string(),
            rpc_url: "https://rpc.apechain.com".to_string(),
            explorer_url: "https://apescan.io".to_string(),
            currency_name: "APE".to_string(),
            currency_symbol: "APE".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Cards rendered per page
    pub batch_size: usize,
    /// Load the next page when this close to the bottom (pixels)
    pub scroll_threshold_px: u32,
    /// Wait before reloading after a list or buy, for backend writes to land
    pub reload_delay_ms: u64,
    pub ipfs_gateway: String,
    pub placeholder_image: String,
    /// Used for cards the backend sent without a name
    pub collection_name: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            batch_size: 12,
            scroll_threshold_px: 300,
            reload_delay_ms: 1500,
            ipfs_gateway: "https://ipfs.io/ipfs/".to_string(),
            placeholder_image: "/placeholder.png".to_string(),
            collection_name: "Bear".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct General {
    pub log_level: String,
    pub notice_timeout_ms: u64,
    /// Check the seller still holds the token before filling their order
    pub verify_seller_before_buy: bool,
}

impl Default for General {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            notice_timeout_ms: 3000,
            verify_seller_before_buy: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Credentials {
    pub private_key: Option<String>,
}

impl Config {
    /// Defaults, then `path` if it exists, then environment overrides.
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let mut config = if Path::new(path).exists() {
            let contents = fs::read_to_string(path)?;
            toml::from_str(&contents).with_context(|| format!("parsing {}", path))?
        } else {
            Config::default()
        };
        config.apply_env(|key| env::var(key).ok())?;
        Ok(config)
    }

    /// Override fields from environment-style lookups.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<()> {
        if let Some(url) = lookup("MARKET_BACKEND_URL") {
            self.backend.url = url;
        }
        if let Some(raw) = lookup("MARKET_NFT_CONTRACT") {
            self.contracts.nft = Address::from_str(raw.trim())
                .with_context(|| format!("MARKET_NFT_CONTRACT={}", raw))?;
        }
        if let Some(raw) = lookup("MARKET_SEAPORT_CONTRACT") {
            self.contracts.marketplace = Address::from_str(raw.trim())
                .with_context(|| format!("MARKET_SEAPORT_CONTRACT={}", raw))?;
        }
        if let Some(url) = lookup("APECHAIN_RPC") {
            self.chain.rpc_url = url;
        }
        if let Some(key) = lookup("MARKET_PRIVATE_KEY") {
            self.credentials.private_key = Some(key);
        }
        Ok(())
    }

    /// What to ask the wallet for when it is on the wrong network.
    pub fn chain_params(&self) -> ChainParams {
        ChainParams {
            chain_id: self.chain.id,
            chain_name: self.chain.name.clone(),
            currency_name: self.chain.currency_name.clone(),
            currency_symbol: self.chain.currency_symbol.clone(),
            currency_decimals: crate::price::DECIMALS as u8,
            rpc_urls: vec![self.chain.rpc_url.clone()],
            explorer_urls: vec![self.chain.explorer_url.clone()],
        }
    }

    pub fn approval_channel(&self) -> ApprovalChannel {
        match &self.contracts.conduit {
            Some(conduit) => ApprovalChannel::Conduit {
                key: conduit.key,
                conduit: conduit.address,
            },
            None => ApprovalChannel::Marketplace,
        }
    }

    /// Backend base URL without a trailing slash.
    pub fn backend_url(&self) -> &str {
        self.backend.url.trim_end_matches('/')
    }
}
