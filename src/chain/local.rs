use std::sync::Arc;

use alloy::network::ReceiptResponse;
use alloy::providers::{DynProvider, PendingTransactionBuilder, Provider, ProviderBuilder};
use alloy::signers::local::PrivateKeySigner;
use alloy_primitives::Address;
use async_trait::async_trait;
use tracing::{debug, error, info};

use super::{
    ChainParams, Erc721Contract, OrderProtocol, SeaportClient, TokenContract, TxHash,
    WalletEnvironment, WalletProvider,
};
use crate::error::{MarketError, Result};

/// Wallet environment backed by a private key from configuration.
/// Without a key there is no wallet, same as a browser without an extension.
pub struct LocalEnvironment {
    private_key: Option<String>,
    rpc_url: String,
}

impl LocalEnvironment {
    pub fn new(private_key: Option<String>, rpc_url: impl Into<String>) -> Self {
        Self {
            private_key,
            rpc_url: rpc_url.into(),
        }
    }
}

impl WalletEnvironment for LocalEnvironment {
    fn detect(&self) -> Option<Arc<dyn WalletProvider>> {
        let key = self.private_key.as_deref()?;
        match LocalWallet::connect(key, &self.rpc_url) {
            Ok(wallet) => Some(Arc::new(wallet)),
            Err(e) => {
                error!("[wallet] Unusable wallet key: {}", e);
                None
            }
        }
    }
}

/// A single-key wallet sending transactions over HTTP JSON-RPC.
pub struct LocalWallet {
    signer: PrivateKeySigner,
    provider: DynProvider,
}

impl LocalWallet {
    pub fn connect(private_key: &str, rpc_url: &str) -> Result<Self> {
        let signer: PrivateKeySigner = private_key
            .trim()
            .parse()
            .map_err(|e| MarketError::Wallet(format!("invalid private key: {}", e)))?;
        let url: reqwest::Url = rpc_url
            .parse()
            .map_err(|e| MarketError::Wallet(format!("invalid rpc url {}: {}", rpc_url, e)))?;

        let provider = ProviderBuilder::new()
            .wallet(signer.clone())
            .connect_http(url)
            .erased();

        info!("[wallet] Local wallet {} via {}", signer.address(), rpc_url);
        Ok(Self { signer, provider })
    }
}

#[async_trait]
impl WalletProvider for LocalWallet {
    async fn request_accounts(&self) -> Result<Vec<Address>> {
        Ok(vec![self.signer.address()])
    }

    async fn chain_id(&self) -> Result<u64> {
        self.provider
            .get_chain_id()
            .await
            .map_err(|e| MarketError::ChainRead(format!("eth_chainId: {}", e)))
    }

    async fn add_chain(&self, params: &ChainParams) -> Result<()> {
        // The network is fixed by the RPC endpoint.
        Err(MarketError::Wallet(format!(
            "a local wallet cannot switch networks; point the RPC url at {} ({})",
            params.chain_name,
            params.chain_id_hex()
        )))
    }

    async fn wait_for_confirmation(&self, tx: TxHash) -> Result<()> {
        debug!("[wallet] Waiting for {}", tx);
        let receipt = PendingTransactionBuilder::new(self.provider.root().clone(), tx)
            .get_receipt()
            .await
            .map_err(|e| MarketError::Transaction(format!("{}: {}", tx, e)))?;

        if !receipt.status() {
            return Err(MarketError::Transaction(format!("{} reverted", tx)));
        }
        info!("[wallet] Confirmed {}", tx);
        Ok(())
    }

    fn token_contract(&self, address: Address) -> Arc<dyn TokenContract> {
        Arc::new(Erc721Contract::new(address, self.provider.clone()))
    }

    fn order_protocol(&self, marketplace: Address) -> Arc<dyn OrderProtocol> {
        Arc::new(SeaportClient::new(
            marketplace,
            self.signer.clone(),
            self.provider.clone(),
        ))
    }
}
