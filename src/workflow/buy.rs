use alloy_primitives::{Address, B256, U256};
use tracing::{error, info, warn};

use super::Progress;
use crate::api::{lower_hex, Backend, CatalogEntry, PurchaseRequest};
use crate::chain::TxHash;
use crate::config::Config;
use crate::error::{MarketError, Result};
use crate::order::{extract_order, parse_u256, to_json_safe, Order};
use crate::state::Session;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurchaseReceipt {
    pub token_id: String,
    pub tx_hash: TxHash,
    pub order_hash: B256,
    /// False when the purchase went through on-chain but the backend did
    /// not acknowledge it.
    pub recorded: bool,
}

fn is_own_listing(entry: &CatalogEntry, buyer: Address) -> bool {
    let Some(seller) = entry.seller_address.as_deref() else {
        return false;
    };
    match seller.trim().parse::<Address>() {
        Ok(seller) => seller == buyer,
        Err(_) => seller.trim().eq_ignore_ascii_case(&lower_hex(&buyer)),
    }
}

/// Token the order sells; must be the token on the card.
fn offered_token(entry: &CatalogEntry, order: &Order) -> Result<U256> {
    let (_, offered) = order
        .parameters
        .offered_token()
        .ok_or_else(|| MarketError::MalformedOrder("order offers no ERC-721".to_string()))?;

    if let Ok(listed) = parse_u256(&entry.token_id) {
        if listed != offered {
            return Err(MarketError::MalformedOrder(format!(
                "order sells token {} but the card is #{}",
                offered, entry.token_id
            )));
        }
    }
    Ok(offered)
}

/// Refuse to fill an order whose offerer no longer holds the token.
/// A failed lookup is logged and ignored.
async fn verify_seller(session: &Session, order: &Order, token: U256) -> Result<()> {
    match session.token.owner_of(token).await {
        Ok(owner) if owner != order.parameters.offerer => Err(MarketError::StaleOrder {
            token_id: token.to_string(),
            owner,
        }),
        Ok(_) => Ok(()),
        Err(e) => {
            warn!("[buy] Could not re-check owner of #{}, filling anyway: {}", token, e);
            Ok(())
        }
    }
}

/// Buy the token on `entry` by filling its stored order.
pub async fn buy_nft(
    session: Option<&Session>,
    backend: &dyn Backend,
    config: &Config,
    entry: &CatalogEntry,
    progress: Progress<'_>,
) -> Result<PurchaseReceipt> {
    let session = session.ok_or(MarketError::MissingSession)?;
    let buyer = session.user_address;

    if is_own_listing(entry, buyer) {
        return Err(MarketError::SelfPurchase);
    }

    progress("Preparing purchase...");
    let order = extract_order(entry.stored_order())?;
    let token = offered_token(entry, &order)?;

    if config.general.verify_seller_before_buy {
        verify_seller(session, &order, token).await?;
    }

    let fulfillment = session.protocol.fulfill_order(&order, buyer).await?;
    if !fulfillment.is_executable() {
        return Err(MarketError::ProtocolClient(
            "fulfillment cannot execute its actions".to_string(),
        ));
    }

    progress("Sending transaction...");
    let tx_hash = session.protocol.execute_all_actions(&fulfillment).await?;
    session.wallet.wait_for_confirmation(tx_hash).await?;
    info!("[buy] Bought #{} in {}", entry.token_id, tx_hash);

    let order_hash = entry
        .order_hash
        .as_deref()
        .and_then(|h| h.parse::<B256>().ok())
        .unwrap_or_else(|| session.protocol.order_hash(&order.parameters));

    let request = PurchaseRequest {
        tokenid: entry.token_id.clone(),
        nft_contract: lower_hex(&session.token.address()),
        marketplace_contract: lower_hex(&session.protocol.marketplace()),
        buyer_address: lower_hex(&buyer),
        seaport_order: Some(to_json_safe(&order)?),
        order_hash: Some(order_hash.to_string()),
        price: entry.price.clone(),
        on_chain: true,
    };
    let recorded = match backend.record_purchase(&request).await {
        Ok(()) => true,
        Err(e) => {
            error!(
                "[buy] #{} bought in {} but the backend did not record it: {}",
                entry.token_id, tx_hash, e
            );
            false
        }
    };

    Ok(PurchaseReceipt {
        token_id: entry.token_id.clone(),
        tx_hash,
        order_hash,
        recorded,
    })
}
