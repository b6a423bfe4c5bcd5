//! Recording fakes for the wallet, token contract, protocol and backend.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use alloy_primitives::{Address, Bytes, B256, U256};
use async_trait::async_trait;

use crate::api::{Backend, CatalogEntry, ListingRequest, PurchaseRequest};
use crate::chain::{
    self, ChainParams, Fulfillment, FulfillmentAction, OrderProtocol, TokenContract, TxHash,
    WalletEnvironment, WalletProvider,
};
use crate::config::Config;
use crate::error::{MarketError, Result};
use crate::order::{
    ConsiderationItem, CreateOrderInput, ItemType, OfferItem, Order, OrderParameters, OrderType,
};
use crate::state::Session;

pub const SELLER: Address = Address::new([0xaa; 20]);
pub const BUYER: Address = Address::new([0xbb; 20]);
pub const APPROVAL_TX: TxHash = B256::new([0xa1; 32]);
pub const EXCHANGE_TX: TxHash = B256::new([0xe1; 32]);

pub fn addr(byte: u8) -> Address {
    Address::repeat_byte(byte)
}

pub fn no_progress(_: &str) {}

/// Token #7 of the default collection listed by SELLER for 0.5 APE.
pub fn sample_order() -> Order {
    let config = Config::default();
    Order {
        parameters: OrderParameters {
            offerer: SELLER,
            zone: Address::ZERO,
            offer: vec![OfferItem {
                item_type: ItemType::Erc721,
                token: config.contracts.nft,
                identifier_or_criteria: U256::from(7),
                start_amount: U256::from(1),
                end_amount: U256::from(1),
            }],
            consideration: vec![ConsiderationItem {
                item_type: ItemType::Native,
                token: Address::ZERO,
                identifier_or_criteria: U256::ZERO,
                start_amount: U256::from(500_000_000_000_000_000u64),
                end_amount: U256::from(500_000_000_000_000_000u64),
                recipient: SELLER,
            }],
            order_type: OrderType::FullOpen,
            start_time: U256::from(1_700_000_000u64),
            end_time: U256::from(1_702_592_000u64),
            zone_hash: B256::ZERO,
            salt: U256::from(12345),
            conduit_key: B256::ZERO,
            total_original_consideration_items: U256::from(1),
            counter: U256::ZERO,
        },
        signature: Bytes::from(vec![0x1b; 65]),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    RequestAccounts,
    ChainId,
    AddChain(u64),
    WaitForConfirmation(TxHash),
    OwnerOf(U256),
    IsApprovedForAll(Address, Address),
    SetApprovalForAll(Address, bool),
    CreateOrder(Address),
    FulfillOrder(Address),
    ExecuteAllActions,
}

/// Shared chain state behind the fake wallet, token and protocol.
pub struct FakeLedger {
    pub account: Address,
    pub chain_id: u64,
    pub add_chain_fails: bool,
    pub no_accounts: bool,
    pub fulfillment_executable: bool,
    owners: Mutex<HashMap<U256, Address>>,
    approved: Mutex<bool>,
    confirmations_fail: Mutex<bool>,
    calls: Mutex<Vec<Call>>,
}

impl FakeLedger {
    pub fn new(account: Address) -> Self {
        Self {
            account,
            chain_id: Config::default().chain.id,
            add_chain_fails: false,
            no_accounts: false,
            fulfillment_executable: true,
            owners: Mutex::new(HashMap::new()),
            approved: Mutex::new(false),
            confirmations_fail: Mutex::new(false),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn set_owner(&self, token_id: U256, owner: Address) {
        self.owners.lock().unwrap().insert(token_id, owner);
    }

    pub fn set_approved(&self, approved: bool) {
        *self.approved.lock().unwrap() = approved;
    }

    pub fn fail_confirmations(&self) {
        *self.confirmations_fail.lock().unwrap() = true;
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| pred(c)).count()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    /// A session as connect would build it against the default config.
    pub fn session(self: &Arc<Self>) -> Session {
        let config = Config::default();
        let wallet = FakeWallet(self.clone());
        Session {
            token: wallet.token_contract(config.contracts.nft),
            protocol: wallet.order_protocol(config.contracts.marketplace),
            wallet: Arc::new(wallet),
            user_address: self.account,
        }
    }
}

pub struct FakeEnvironment {
    ledger: Option<Arc<FakeLedger>>,
}

impl FakeEnvironment {
    pub fn empty() -> Self {
        Self { ledger: None }
    }

    pub fn with(ledger: Arc<FakeLedger>) -> Self {
        Self {
            ledger: Some(ledger),
        }
    }
}

impl WalletEnvironment for FakeEnvironment {
    fn detect(&self) -> Option<Arc<dyn WalletProvider>> {
        self.ledger
            .as_ref()
            .map(|l| Arc::new(FakeWallet(l.clone())) as Arc<dyn WalletProvider>)
    }
}

pub struct FakeWallet(pub Arc<FakeLedger>);

#[async_trait]
impl WalletProvider for FakeWallet {
    async fn request_accounts(&self) -> Result<Vec<Address>> {
        self.0.record(Call::RequestAccounts);
        if self.0.no_accounts {
            return Ok(Vec::new());
        }
        Ok(vec![self.0.account])
    }

    async fn chain_id(&self) -> Result<u64> {
        self.0.record(Call::ChainId);
        Ok(self.0.chain_id)
    }

    async fn add_chain(&self, params: &ChainParams) -> Result<()> {
        self.0.record(Call::AddChain(params.chain_id));
        if self.0.add_chain_fails {
            return Err(MarketError::Wallet("user rejected the request".to_string()));
        }
        Ok(())
    }

    async fn wait_for_confirmation(&self, tx: TxHash) -> Result<()> {
        self.0.record(Call::WaitForConfirmation(tx));
        if *self.0.confirmations_fail.lock().unwrap() {
            return Err(MarketError::Transaction(format!("{} reverted", tx)));
        }
        if tx == APPROVAL_TX {
            self.0.set_approved(true);
        }
        Ok(())
    }

    fn token_contract(&self, address: Address) -> Arc<dyn TokenContract> {
        Arc::new(FakeToken {
            ledger: self.0.clone(),
            address,
        })
    }

    fn order_protocol(&self, marketplace: Address) -> Arc<dyn OrderProtocol> {
        Arc::new(FakeProtocol {
            ledger: self.0.clone(),
            marketplace,
        })
    }
}

pub struct FakeToken {
    ledger: Arc<FakeLedger>,
    address: Address,
}

#[async_trait]
impl TokenContract for FakeToken {
    fn address(&self) -> Address {
        self.address
    }

    async fn owner_of(&self, token_id: U256) -> Result<Address> {
        self.ledger.record(Call::OwnerOf(token_id));
        self.ledger
            .owners
            .lock()
            .unwrap()
            .get(&token_id)
            .copied()
            .ok_or_else(|| MarketError::ChainRead("ERC721: invalid token ID".to_string()))
    }

    async fn is_approved_for_all(&self, owner: Address, operator: Address) -> Result<bool> {
        self.ledger.record(Call::IsApprovedForAll(owner, operator));
        Ok(*self.ledger.approved.lock().unwrap())
    }

    async fn set_approval_for_all(&self, operator: Address, approved: bool) -> Result<TxHash> {
        self.ledger.record(Call::SetApprovalForAll(operator, approved));
        Ok(APPROVAL_TX)
    }
}

pub struct FakeProtocol {
    ledger: Arc<FakeLedger>,
    marketplace: Address,
}

#[async_trait]
impl OrderProtocol for FakeProtocol {
    fn marketplace(&self) -> Address {
        self.marketplace
    }

    async fn create_order(&self, input: CreateOrderInput, account: Address) -> Result<Order> {
        self.ledger.record(Call::CreateOrder(account));
        Ok(Order {
            parameters: OrderParameters::from_input(input, account, U256::ZERO),
            signature: Bytes::from(vec![0x1c; 65]),
        })
    }

    fn order_hash(&self, parameters: &OrderParameters) -> B256 {
        chain::order_hash(parameters)
    }

    async fn fulfill_order(&self, order: &Order, buyer: Address) -> Result<Fulfillment> {
        self.ledger.record(Call::FulfillOrder(buyer));
        let actions = if self.ledger.fulfillment_executable {
            vec![FulfillmentAction::Exchange {
                order: order.clone(),
                fulfiller_conduit_key: B256::ZERO,
                value: order.parameters.native_payment_total()?,
            }]
        } else {
            Vec::new()
        };
        Ok(Fulfillment { buyer, actions })
    }

    async fn execute_all_actions(&self, _fulfillment: &Fulfillment) -> Result<TxHash> {
        self.ledger.record(Call::ExecuteAllActions);
        Ok(EXCHANGE_TX)
    }
}

/// In-memory backend recording every request.
#[derive(Default)]
pub struct FakeBackend {
    pub catalog: Mutex<Vec<CatalogEntry>>,
    listings: Mutex<Vec<ListingRequest>>,
    purchases: Mutex<Vec<PurchaseRequest>>,
    reject_listings: Option<String>,
    fail_purchases: bool,
    fetches: AtomicUsize,
}

impl FakeBackend {
    pub fn with_catalog(entries: Vec<CatalogEntry>) -> Self {
        Self {
            catalog: Mutex::new(entries),
            ..Default::default()
        }
    }

    pub fn rejecting_listings(reason: &str) -> Self {
        Self {
            reject_listings: Some(reason.to_string()),
            ..Default::default()
        }
    }

    pub fn failing_purchases() -> Self {
        Self {
            fail_purchases: true,
            ..Default::default()
        }
    }

    pub fn listings(&self) -> Vec<ListingRequest> {
        self.listings.lock().unwrap().clone()
    }

    pub fn purchases(&self) -> Vec<PurchaseRequest> {
        self.purchases.lock().unwrap().clone()
    }

    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Backend for FakeBackend {
    async fn fetch_catalog(&self) -> Result<Vec<CatalogEntry>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        Ok(self.catalog.lock().unwrap().clone())
    }

    async fn submit_listing(&self, request: &ListingRequest) -> Result<()> {
        if let Some(reason) = &self.reject_listings {
            return Err(MarketError::BackendRejected(reason.clone()));
        }
        self.listings.lock().unwrap().push(request.clone());
        Ok(())
    }

    async fn record_purchase(&self, request: &PurchaseRequest) -> Result<()> {
        if self.fail_purchases {
            return Err(MarketError::BackendRejected("database unavailable".to_string()));
        }
        self.purchases.lock().unwrap().push(request.clone());
        Ok(())
    }
}
