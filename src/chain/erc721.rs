use alloy::providers::DynProvider;
use alloy::sol;
use alloy_primitives::{Address, U256};
use async_trait::async_trait;

use super::{TokenContract, TxHash};
use crate::error::{MarketError, Result};

sol! {
    #[sol(rpc)]
    interface IERC721 {
        function ownerOf(uint256 tokenId) external view returns (address owner);
        function isApprovedForAll(address owner, address operator) external view returns (bool approved);
        function setApprovalForAll(address operator, bool approved) external;
    }
}

/// Collection contract reached through an alloy provider.
pub struct Erc721Contract {
    contract: IERC721::IERC721Instance<DynProvider>,
}

impl Erc721Contract {
    pub fn new(address: Address, provider: DynProvider) -> Self {
        Self {
            contract: IERC721::new(address, provider),
        }
    }
}

#[async_trait]
impl TokenContract for Erc721Contract {
    fn address(&self) -> Address {
        *self.contract.address()
    }

    async fn owner_of(&self, token_id: U256) -> Result<Address> {
        self.contract
            .ownerOf(token_id)
            .call()
            .await
            .map_err(|e| MarketError::ChainRead(format!("ownerOf({}): {}", token_id, e)))
    }

    async fn is_approved_for_all(&self, owner: Address, operator: Address) -> Result<bool> {
        self.contract
            .isApprovedForAll(owner, operator)
            .call()
            .await
            .map_err(|e| MarketError::ChainRead(format!("isApprovedForAll: {}", e)))
    }

    async fn set_approval_for_all(&self, operator: Address, approved: bool) -> Result<TxHash> {
        let pending = self
            .contract
            .setApprovalForAll(operator, approved)
            .send()
            .await
            .map_err(|e| MarketError::Transaction(format!("setApprovalForAll: {}", e)))?;
        Ok(*pending.tx_hash())
    }
}
