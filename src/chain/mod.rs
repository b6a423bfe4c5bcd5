//! Seams to everything on the other side of the wallet: the wallet itself,
//! the collection's token contract, and the order-settlement protocol.

mod erc721;
mod local;
mod seaport;

use std::sync::Arc;

use alloy_primitives::{Address, B256, U256};
use async_trait::async_trait;

use crate::error::Result;
use crate::order::{CreateOrderInput, Order, OrderParameters};

pub use erc721::Erc721Contract;
pub use local::{LocalEnvironment, LocalWallet};
pub use seaport::{order_hash, seaport_domain, SeaportClient};

pub type TxHash = B256;

/// Parameters for asking a wallet to add (and switch to) a network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainParams {
    pub chain_id: u64,
    pub chain_name: String,
    pub currency_name: String,
    pub currency_symbol: String,
    pub currency_decimals: u8,
    pub rpc_urls: Vec<String>,
    pub explorer_urls: Vec<String>,
}

impl ChainParams {
    /// Chain id in the `0x`-prefixed form wallets expect.
    pub fn chain_id_hex(&self) -> String {
        format!("{:#x}", self.chain_id)
    }
}

/// Whatever hosts the wallet. `None` means there is no wallet to talk to.
pub trait WalletEnvironment: Send + Sync {
    fn detect(&self) -> Option<Arc<dyn WalletProvider>>;
}

/// An account-holding wallet that can sign and send transactions.
#[async_trait]
pub trait WalletProvider: Send + Sync {
    async fn request_accounts(&self) -> Result<Vec<Address>>;

    async fn chain_id(&self) -> Result<u64>;

    /// Ask the wallet to add and switch to a network.
    async fn add_chain(&self, params: &ChainParams) -> Result<()>;

    /// Block until the transaction is mined; reverted transactions are errors.
    async fn wait_for_confirmation(&self, tx: TxHash) -> Result<()>;

    fn token_contract(&self, address: Address) -> Arc<dyn TokenContract>;

    fn order_protocol(&self, marketplace: Address) -> Arc<dyn OrderProtocol>;
}

/// The ERC-721 calls the marketplace needs.
#[async_trait]
pub trait TokenContract: Send + Sync {
    fn address(&self) -> Address;

    async fn owner_of(&self, token_id: U256) -> Result<Address>;

    async fn is_approved_for_all(&self, owner: Address, operator: Address) -> Result<bool>;

    /// Submits the approval; returns as soon as the transaction is sent.
    async fn set_approval_for_all(&self, operator: Address, approved: bool) -> Result<TxHash>;
}

/// One step of fulfilling an order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FulfillmentAction {
    /// Let `operator` pull `amount` of an ERC-20 from the buyer.
    Approval {
        token: Address,
        operator: Address,
        amount: U256,
    },
    /// The fill itself, paying `value` in native currency.
    Exchange {
        order: Order,
        fulfiller_conduit_key: B256,
        value: U256,
    },
}

/// Pending actions for filling one order as `buyer`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fulfillment {
    pub buyer: Address,
    pub actions: Vec<FulfillmentAction>,
}

impl Fulfillment {
    /// True when the plan ends in an exchange, i.e. running every action
    /// actually completes the purchase.
    pub fn is_executable(&self) -> bool {
        matches!(self.actions.last(), Some(FulfillmentAction::Exchange { .. }))
    }
}

/// Order construction, hashing and fulfillment, delegated to the protocol.
#[async_trait]
pub trait OrderProtocol: Send + Sync {
    fn marketplace(&self) -> Address;

    /// Build and sign an order offering `input` on behalf of `account`.
    async fn create_order(&self, input: CreateOrderInput, account: Address) -> Result<Order>;

    fn order_hash(&self, parameters: &OrderParameters) -> B256;

    async fn fulfill_order(&self, order: &Order, buyer: Address) -> Result<Fulfillment>;

    /// Runs every action; returns the hash of the final exchange transaction.
    async fn execute_all_actions(&self, fulfillment: &Fulfillment) -> Result<TxHash>;
}
