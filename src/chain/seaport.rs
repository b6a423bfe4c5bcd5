use alloy::providers::{DynProvider, Provider};
use alloy::signers::local::PrivateKeySigner;
use alloy::signers::Signer;
use alloy::sol_types::{eip712_domain, Eip712Domain, SolStruct};
use alloy_primitives::{Address, Bytes, B256, U256};
use async_trait::async_trait;
use tracing::{debug, info};

use super::{Fulfillment, FulfillmentAction, OrderProtocol, TxHash};
use crate::error::{MarketError, Result};
use crate::order::{CreateOrderInput, ItemType, Order, OrderParameters};

/// Version string of the Seaport deployment the marketplace points at.
pub const SEAPORT_VERSION: &str = "1.6";

mod bindings {
    alloy::sol! {
        struct OfferItem {
            uint8 itemType;
            address token;
            uint256 identifierOrCriteria;
            uint256 startAmount;
            uint256 endAmount;
        }

        struct ConsiderationItem {
            uint8 itemType;
            address token;
            uint256 identifierOrCriteria;
            uint256 startAmount;
            uint256 endAmount;
            address recipient;
        }

        struct OrderComponents {
            address offerer;
            address zone;
            OfferItem[] offer;
            ConsiderationItem[] consideration;
            uint8 orderType;
            uint256 startTime;
            uint256 endTime;
            bytes32 zoneHash;
            uint256 salt;
            bytes32 conduitKey;
            uint256 counter;
        }

        struct OrderParameters {
            address offerer;
            address zone;
            OfferItem[] offer;
            ConsiderationItem[] consideration;
            uint8 orderType;
            uint256 startTime;
            uint256 endTime;
            bytes32 zoneHash;
            uint256 salt;
            bytes32 conduitKey;
            uint256 totalOriginalConsiderationItems;
        }

        struct Order {
            OrderParameters parameters;
            bytes signature;
        }

        #[sol(rpc)]
        interface ISeaport {
            function getCounter(address offerer) external view returns (uint256 counter);
            function fulfillOrder(Order calldata order, bytes32 fulfillerConduitKey) external payable returns (bool fulfilled);
        }

        #[sol(rpc)]
        interface IERC20 {
            function approve(address spender, uint256 value) external returns (bool);
        }
    }
}

fn offer_items(params: &OrderParameters) -> Vec<bindings::OfferItem> {
    params
        .offer
        .iter()
        .map(|item| bindings::OfferItem {
            itemType: item.item_type as u8,
            token: item.token,
            identifierOrCriteria: item.identifier_or_criteria,
            startAmount: item.start_amount,
            endAmount: item.end_amount,
        })
        .collect()
}

fn consideration_items(params: &OrderParameters) -> Vec<bindings::ConsiderationItem> {
    params
        .consideration
        .iter()
        .map(|item| bindings::ConsiderationItem {
            itemType: item.item_type as u8,
            token: item.token,
            identifierOrCriteria: item.identifier_or_criteria,
            startAmount: item.start_amount,
            endAmount: item.end_amount,
            recipient: item.recipient,
        })
        .collect()
}

/// The struct Seaport hashes and offerers sign.
fn order_components(params: &OrderParameters) -> bindings::OrderComponents {
    bindings::OrderComponents {
        offerer: params.offerer,
        zone: params.zone,
        offer: offer_items(params),
        consideration: consideration_items(params),
        orderType: params.order_type as u8,
        startTime: params.start_time,
        endTime: params.end_time,
        zoneHash: params.zone_hash,
        salt: params.salt,
        conduitKey: params.conduit_key,
        counter: params.counter,
    }
}

fn onchain_order(order: &Order) -> bindings::Order {
    let params = &order.parameters;
    bindings::Order {
        parameters: bindings::OrderParameters {
            offerer: params.offerer,
            zone: params.zone,
            offer: offer_items(params),
            consideration: consideration_items(params),
            orderType: params.order_type as u8,
            startTime: params.start_time,
            endTime: params.end_time,
            zoneHash: params.zone_hash,
            salt: params.salt,
            conduitKey: params.conduit_key,
            totalOriginalConsiderationItems: params.consideration_count(),
        },
        signature: order.signature.clone(),
    }
}

/// Seaport order hash: the EIP-712 struct hash of the order components.
pub fn order_hash(params: &OrderParameters) -> B256 {
    order_components(params).eip712_hash_struct()
}

/// EIP-712 domain for a Seaport deployment.
pub fn seaport_domain(chain_id: u64, marketplace: Address) -> Eip712Domain {
    eip712_domain! {
        name: "Seaport",
        version: SEAPORT_VERSION,
        chain_id: chain_id,
        verifying_contract: marketplace,
    }
}

/// Seaport client bound to one signer and one marketplace contract.
pub struct SeaportClient {
    seaport: bindings::ISeaport::ISeaportInstance<DynProvider>,
    signer: PrivateKeySigner,
    provider: DynProvider,
}

impl SeaportClient {
    pub fn new(marketplace: Address, signer: PrivateKeySigner, provider: DynProvider) -> Self {
        Self {
            seaport: bindings::ISeaport::new(marketplace, provider.clone()),
            signer,
            provider,
        }
    }

    async fn sign(&self, params: &OrderParameters) -> Result<Bytes> {
        let chain_id = self
            .provider
            .get_chain_id()
            .await
            .map_err(|e| MarketError::ChainRead(format!("eth_chainId: {}", e)))?;
        let domain = seaport_domain(chain_id, self.marketplace());
        let digest = order_components(params).eip712_signing_hash(&domain);

        let signature = self
            .signer
            .sign_hash(&digest)
            .await
            .map_err(|e| MarketError::ProtocolClient(format!("signing failed: {}", e)))?;
        Ok(Bytes::copy_from_slice(&signature.as_bytes()))
    }
}

#[async_trait]
impl OrderProtocol for SeaportClient {
    fn marketplace(&self) -> Address {
        *self.seaport.address()
    }

    async fn create_order(&self, input: CreateOrderInput, account: Address) -> Result<Order> {
        if account != self.signer.address() {
            return Err(MarketError::ProtocolClient(format!(
                "cannot sign for {} with the key of {}",
                account,
                self.signer.address()
            )));
        }

        let counter = self
            .seaport
            .getCounter(account)
            .call()
            .await
            .map_err(|e| MarketError::ChainRead(format!("getCounter: {}", e)))?;

        let parameters = OrderParameters::from_input(input, account, counter);
        let signature = self.sign(&parameters).await?;
        debug!("[seaport] Signed order with counter {}", counter);

        Ok(Order {
            parameters,
            signature,
        })
    }

    fn order_hash(&self, parameters: &OrderParameters) -> B256 {
        order_hash(parameters)
    }

    async fn fulfill_order(&self, order: &Order, buyer: Address) -> Result<Fulfillment> {
        let params = &order.parameters;
        let mut actions = Vec::new();

        for item in &params.consideration {
            match item.item_type {
                ItemType::Native => {}
                ItemType::Erc20 => actions.push(FulfillmentAction::Approval {
                    token: item.token,
                    operator: self.marketplace(),
                    amount: item.end_amount,
                }),
                other => {
                    return Err(MarketError::ProtocolClient(format!(
                        "cannot pay a {:?} consideration item",
                        other
                    )))
                }
            }
        }

        actions.push(FulfillmentAction::Exchange {
            order: order.clone(),
            fulfiller_conduit_key: B256::ZERO,
            value: params.native_payment_total()?,
        });

        Ok(Fulfillment { buyer, actions })
    }

    async fn execute_all_actions(&self, fulfillment: &Fulfillment) -> Result<TxHash> {
        let mut exchange_tx = None;

        for action in &fulfillment.actions {
            match action {
                FulfillmentAction::Approval {
                    token,
                    operator,
                    amount,
                } => {
                    info!("[seaport] Approving {} of {} for {}", amount, token, operator);
                    bindings::IERC20::new(*token, self.provider.clone())
                        .approve(*operator, *amount)
                        .send()
                        .await
                        .map_err(|e| MarketError::Transaction(format!("approve: {}", e)))?
                        .get_receipt()
                        .await
                        .map_err(|e| MarketError::Transaction(format!("approve: {}", e)))?;
                }
                FulfillmentAction::Exchange {
                    order,
                    fulfiller_conduit_key,
                    value,
                } => {
                    let pending = self
                        .seaport
                        .fulfillOrder(onchain_order(order), *fulfiller_conduit_key)
                        .value(*value)
                        .send()
                        .await
                        .map_err(|e| MarketError::Transaction(format!("fulfillOrder: {}", e)))?;
                    info!("[seaport] Sent fulfillOrder {}", pending.tx_hash());
                    exchange_tx = Some(*pending.tx_hash());
                }
            }
        }

        exchange_tx.ok_or_else(|| {
            MarketError::ProtocolClient("fulfillment has no exchange action".to_string())
        })
    }
}
