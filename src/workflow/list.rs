use alloy_primitives::{Address, B256, U256};
use tracing::info;

use super::Progress;
use crate::api::{lower_hex, Backend, ListingRequest};
use crate::chain::TxHash;
use crate::config::Config;
use crate::error::{MarketError, Result};
use crate::order::{
    parse_u256, to_json_safe, ConsiderationItem, CreateOrderInput, ItemType, OfferItem,
    OrderType,
};
use crate::price::Wei;
use crate::state::Session;

/// Listings stay open for 30 days.
pub const LISTING_DURATION_SECS: u64 = 30 * 24 * 60 * 60;

/// Orders start slightly in the past so a lagging chain clock accepts them.
pub const START_TIME_SKEW_SECS: u64 = 60;

/// Which operator the seller approves, and therefore which conduit key the
/// order must name. Both come from this one value so they cannot disagree:
/// an order routed through a conduit the seller never approved lists fine
/// and then fails at fulfillment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApprovalChannel {
    /// Approve the marketplace contract directly; zero conduit key.
    Marketplace,
    /// Approve a conduit; orders carry its key.
    Conduit { key: B256, conduit: Address },
}

impl ApprovalChannel {
    pub fn operator(&self, marketplace: Address) -> Address {
        match self {
            Self::Marketplace => marketplace,
            Self::Conduit { conduit, .. } => *conduit,
        }
    }

    pub fn conduit_key(&self) -> B256 {
        match self {
            Self::Marketplace => B256::ZERO,
            Self::Conduit { key, .. } => *key,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingReceipt {
    pub token_id: String,
    pub price: Wei,
    pub order_hash: B256,
    /// Set when an approval had to be sent first
    pub approval_tx: Option<TxHash>,
}

/// Order input for selling one ERC-721 for `price` in native currency.
pub fn build_listing_input(
    nft: Address,
    token_id: U256,
    price: Wei,
    seller: Address,
    channel: ApprovalChannel,
    now_secs: u64,
    salt: U256,
) -> CreateOrderInput {
    let start = now_secs.saturating_sub(START_TIME_SKEW_SECS);
    let end = now_secs + LISTING_DURATION_SECS;

    CreateOrderInput {
        offer: vec![OfferItem {
            item_type: ItemType::Erc721,
            token: nft,
            identifier_or_criteria: token_id,
            start_amount: U256::from(1),
            end_amount: U256::from(1),
        }],
        consideration: vec![ConsiderationItem {
            item_type: ItemType::Native,
            token: Address::ZERO,
            identifier_or_criteria: U256::ZERO,
            start_amount: price.0,
            end_amount: price.0,
            recipient: seller,
        }],
        order_type: OrderType::FullOpen,
        start_time: U256::from(start),
        end_time: U256::from(end),
        zone: Address::ZERO,
        zone_hash: B256::ZERO,
        conduit_key: channel.conduit_key(),
        salt,
    }
}

fn now_secs() -> u64 {
    chrono::Utc::now().timestamp().max(0) as u64
}

fn random_salt() -> U256 {
    U256::from_be_bytes(B256::random().0)
}

/// Approve `operator` for all of the seller's tokens unless already done,
/// waiting for the approval to be mined before returning.
async fn ensure_approval(
    session: &Session,
    seller: Address,
    operator: Address,
    progress: Progress<'_>,
) -> Result<Option<TxHash>> {
    if session.token.is_approved_for_all(seller, operator).await? {
        return Ok(None);
    }

    progress("Sending approval...");
    let tx = session
        .token
        .set_approval_for_all(operator, true)
        .await
        .map_err(|e| MarketError::ApprovalTxFailed(e.to_string()))?;
    session
        .wallet
        .wait_for_confirmation(tx)
        .await
        .map_err(|e| MarketError::ApprovalTxFailed(e.to_string()))?;

    info!("[list] Approved {} for {}", operator, seller);
    Ok(Some(tx))
}

/// List `token_id` for `price` (whole units, e.g. "0.5").
pub async fn list_nft(
    session: Option<&Session>,
    backend: &dyn Backend,
    config: &Config,
    token_id: &str,
    price: &str,
    progress: Progress<'_>,
) -> Result<ListingReceipt> {
    let session = session.ok_or(MarketError::MissingSession)?;

    let token_id = token_id.trim();
    if token_id.is_empty() {
        return Err(MarketError::InvalidInput("token id is empty".to_string()));
    }
    let token = parse_u256(token_id).map_err(MarketError::InvalidInput)?;
    let price = Wei::parse_ether(price)?;
    let seller = session.user_address;

    progress("Checking ownership...");
    let owner = session.token.owner_of(token).await?;
    if owner != seller {
        return Err(MarketError::NotOwner {
            token_id: token_id.to_string(),
            owner,
        });
    }

    let channel = config.approval_channel();
    let marketplace = session.protocol.marketplace();
    let approval_tx = ensure_approval(session, seller, channel.operator(marketplace), progress).await?;

    progress("Creating order...");
    let input = build_listing_input(
        session.token.address(),
        token,
        price,
        seller,
        channel,
        now_secs(),
        random_salt(),
    );
    let order = session.protocol.create_order(input, seller).await?;
    let order_hash = session.protocol.order_hash(&order.parameters);
    let seaport_order = to_json_safe(&order)?;

    progress("Sending order to backend...");
    let request = ListingRequest {
        tokenid: token_id.to_string(),
        price: price.to_ether_string(),
        nft_contract: lower_hex(&session.token.address()),
        marketplace_contract: lower_hex(&marketplace),
        seller_address: lower_hex(&seller),
        seaport_order,
        order_hash: order_hash.to_string(),
        on_chain: false,
    };
    backend.submit_listing(&request).await?;

    info!("[list] Listed #{} for {} as {}", token_id, price, order_hash);
    Ok(ListingReceipt {
        token_id: token_id.to_string(),
        price,
        order_hash,
        approval_tx,
    })
}
