use alloy_primitives::{Address, Bytes, B256, U256};
use serde::{Deserialize, Deserializer, Serialize};

use super::json::{deserialize_u8, u256_dec};
use crate::error::MarketError;

/// Seaport item kinds. Only the first four are produced here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ItemType {
    Native = 0,
    Erc20 = 1,
    Erc721 = 2,
    Erc1155 = 3,
    Erc721WithCriteria = 4,
    Erc1155WithCriteria = 5,
}

impl TryFrom<u8> for ItemType {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Native),
            1 => Ok(Self::Erc20),
            2 => Ok(Self::Erc721),
            3 => Ok(Self::Erc1155),
            4 => Ok(Self::Erc721WithCriteria),
            5 => Ok(Self::Erc1155WithCriteria),
            other => Err(format!("unknown item type {}", other)),
        }
    }
}

impl Serialize for ItemType {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(*self as u8)
    }
}

impl<'de> Deserialize<'de> for ItemType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = deserialize_u8(deserializer)?;
        ItemType::try_from(raw).map_err(serde::de::Error::custom)
    }
}

/// Seaport order types. FULL_OPEN lets anyone fill the whole order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum OrderType {
    #[default]
    FullOpen = 0,
    PartialOpen = 1,
    FullRestricted = 2,
    PartialRestricted = 3,
    Contract = 4,
}

impl TryFrom<u8> for OrderType {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::FullOpen),
            1 => Ok(Self::PartialOpen),
            2 => Ok(Self::FullRestricted),
            3 => Ok(Self::PartialRestricted),
            4 => Ok(Self::Contract),
            other => Err(format!("unknown order type {}", other)),
        }
    }
}

impl Serialize for OrderType {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(*self as u8)
    }
}

impl<'de> Deserialize<'de> for OrderType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = deserialize_u8(deserializer)?;
        OrderType::try_from(raw).map_err(serde::de::Error::custom)
    }
}

/// What the offerer gives up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OfferItem {
    pub item_type: ItemType,
    pub token: Address,
    #[serde(with = "u256_dec")]
    pub identifier_or_criteria: U256,
    #[serde(with = "u256_dec")]
    pub start_amount: U256,
    #[serde(with = "u256_dec")]
    pub end_amount: U256,
}

/// What the offerer expects in return, and who receives it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsiderationItem {
    pub item_type: ItemType,
    pub token: Address,
    #[serde(with = "u256_dec")]
    pub identifier_or_criteria: U256,
    #[serde(with = "u256_dec")]
    pub start_amount: U256,
    #[serde(with = "u256_dec")]
    pub end_amount: U256,
    pub recipient: Address,
}

/// Everything the protocol needs to build and sign a new order.
/// The offerer is supplied separately as the signing account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateOrderInput {
    pub offer: Vec<OfferItem>,
    pub consideration: Vec<ConsiderationItem>,
    pub order_type: OrderType,
    pub start_time: U256,
    pub end_time: U256,
    pub zone: Address,
    pub zone_hash: B256,
    pub conduit_key: B256,
    pub salt: U256,
}

/// Signed order parameters in the shape Seaport clients exchange
/// (order components plus the original consideration count).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderParameters {
    pub offerer: Address,
    #[serde(default)]
    pub zone: Address,
    pub offer: Vec<OfferItem>,
    pub consideration: Vec<ConsiderationItem>,
    #[serde(default)]
    pub order_type: OrderType,
    #[serde(with = "u256_dec")]
    pub start_time: U256,
    #[serde(with = "u256_dec")]
    pub end_time: U256,
    #[serde(default)]
    pub zone_hash: B256,
    #[serde(with = "u256_dec")]
    pub salt: U256,
    #[serde(default)]
    pub conduit_key: B256,
    #[serde(with = "u256_dec", default)]
    pub total_original_consideration_items: U256,
    #[serde(with = "u256_dec", default)]
    pub counter: U256,
}

impl OrderParameters {
    pub fn from_input(input: CreateOrderInput, offerer: Address, counter: U256) -> Self {
        let total = U256::from(input.consideration.len());
        Self {
            offerer,
            zone: input.zone,
            offer: input.offer,
            consideration: input.consideration,
            order_type: input.order_type,
            start_time: input.start_time,
            end_time: input.end_time,
            zone_hash: input.zone_hash,
            salt: input.salt,
            conduit_key: input.conduit_key,
            total_original_consideration_items: total,
            counter,
        }
    }

    /// Original consideration count; stored orders sometimes omit it.
    pub fn consideration_count(&self) -> U256 {
        if self.total_original_consideration_items.is_zero() {
            U256::from(self.consideration.len())
        } else {
            self.total_original_consideration_items
        }
    }

    /// Sum of native-currency payments, i.e. the value a buyer must attach.
    pub fn native_payment_total(&self) -> Result<U256, MarketError> {
        self.consideration
            .iter()
            .filter(|item| item.item_type == ItemType::Native)
            .try_fold(U256::ZERO, |acc, item| acc.checked_add(item.end_amount))
            .ok_or_else(|| {
                MarketError::MalformedOrder("native payments overflow uint256".to_string())
            })
    }

    /// The ERC-721 token this order sells, if it sells one.
    pub fn offered_token(&self) -> Option<(Address, U256)> {
        self.offer
            .iter()
            .find(|item| item.item_type == ItemType::Erc721)
            .map(|item| (item.token, item.identifier_or_criteria))
    }
}

/// A signed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub parameters: OrderParameters,
    #[serde(default)]
    pub signature: Bytes,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testkit::sample_order;
    use serde_json::json;

    #[test]
    fn test_item_type_accepts_strings_and_numbers() {
        let a: ItemType = serde_json::from_value(json!(2)).unwrap();
        let b: ItemType = serde_json::from_value(json!("2")).unwrap();
        assert_eq!(a, ItemType::Erc721);
        assert_eq!(b, ItemType::Erc721);
        assert!(serde_json::from_value::<ItemType>(json!(9)).is_err());
    }

    #[test]
    fn test_native_payment_total() {
        let order = sample_order();
        let mut params = order.parameters.clone();
        let mut fee = params.consideration[0].clone();
        fee.end_amount = U256::from(5);
        params.consideration.push(fee);

        let expected = order.parameters.consideration[0].end_amount + U256::from(5);
        assert_eq!(params.native_payment_total().unwrap(), expected);
    }

    #[test]
    fn test_native_payment_total_overflow() {
        let mut params = sample_order().parameters;
        let mut second = params.consideration[0].clone();
        params.consideration[0].end_amount = U256::MAX;
        second.end_amount = U256::from(1);
        params.consideration.push(second);

        assert!(matches!(
            params.native_payment_total(),
            Err(MarketError::MalformedOrder(_))
        ));
    }

    #[test]
    fn test_consideration_count_falls_back_to_len() {
        let mut params = sample_order().parameters;
        params.total_original_consideration_items = U256::ZERO;
        assert_eq!(params.consideration_count(), U256::from(1));
    }

    #[test]
    fn test_offered_token() {
        let params = sample_order().parameters;
        let (token, id) = params.offered_token().unwrap();
        assert_eq!(token, params.offer[0].token);
        assert_eq!(id, U256::from(7));
    }
}
