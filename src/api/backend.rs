use alloy_primitives::Address;
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::{MarketError, Result};

/// One NFT as the backend lists it.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CatalogEntry {
    #[serde(rename = "tokenid", alias = "tokenId", default, deserialize_with = "string_or_number")]
    pub token_id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    /// Asking price in whole units, if listed
    #[serde(default, deserialize_with = "opt_string_or_number")]
    pub price: Option<String>,
    #[serde(default, alias = "sellerAddress")]
    pub seller_address: Option<String>,
    #[serde(default, alias = "orderHash")]
    pub order_hash: Option<String>,
    #[serde(default)]
    seaport_order: Option<Value>,
    #[serde(default, rename = "seaportOrderJSON")]
    seaport_order_json: Option<Value>,
    #[serde(default, rename = "signedOrder")]
    signed_order: Option<Value>,
}

impl CatalogEntry {
    pub fn new(token_id: impl Into<String>) -> Self {
        Self {
            token_id: token_id.into(),
            name: None,
            image: None,
            price: None,
            seller_address: None,
            order_hash: None,
            seaport_order: None,
            seaport_order_json: None,
            signed_order: None,
        }
    }

    pub fn with_stored_order(mut self, order: Value) -> Self {
        self.seaport_order = Some(order);
        self
    }

    /// The stored sale order, whichever key the backend put it under.
    pub fn stored_order(&self) -> Option<&Value> {
        [
            &self.seaport_order,
            &self.seaport_order_json,
            &self.signed_order,
        ]
        .into_iter()
        .find_map(|v| v.as_ref().filter(|v| !v.is_null()))
    }
}

fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(opt_string_or_number(deserializer)?.unwrap_or_default())
}

fn opt_string_or_number<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s)),
        Value::Number(n) => Ok(Some(n.to_string())),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number, got {}",
            other
        ))),
    }
}

#[derive(Debug, Deserialize)]
struct NftsResponse {
    #[serde(default)]
    nfts: Vec<CatalogEntry>,
}

/// Body of `POST /api/order`.
#[derive(Debug, Clone, Serialize)]
pub struct ListingRequest {
    pub tokenid: String,
    pub price: String,
    pub nft_contract: String,
    pub marketplace_contract: String,
    pub seller_address: String,
    pub seaport_order: Value,
    pub order_hash: String,
    pub on_chain: bool,
}

/// Body of `POST /api/buy`.
#[derive(Debug, Clone, Serialize)]
pub struct PurchaseRequest {
    pub tokenid: String,
    pub nft_contract: String,
    pub marketplace_contract: String,
    pub buyer_address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seaport_order: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_hash: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<String>,
    pub on_chain: bool,
}

/// `{success, error?}` as the backend answers mutations.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BackendReply {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub error: Option<String>,
}

impl BackendReply {
    /// `require_flag`: only an explicit `success: true` counts.
    fn check(self, status: StatusCode, require_flag: bool) -> Result<()> {
        let ok = match self.success {
            Some(flag) => flag,
            None => !require_flag && status.is_success(),
        };
        if ok && status.is_success() {
            return Ok(());
        }
        Err(MarketError::BackendRejected(
            self.error
                .unwrap_or_else(|| format!("backend answered {}", status)),
        ))
    }
}

/// Addresses go over the wire in lowercase hex.
pub(crate) fn lower_hex(address: &Address) -> String {
    address.to_string().to_lowercase()
}

/// The marketplace backend that owns catalog and order state.
#[async_trait]
pub trait Backend: Send + Sync {
    async fn fetch_catalog(&self) -> Result<Vec<CatalogEntry>>;

    async fn submit_listing(&self, request: &ListingRequest) -> Result<()>;

    async fn record_purchase(&self, request: &PurchaseRequest) -> Result<()>;
}

pub struct HttpBackend {
    base_url: String,
    client: reqwest::Client,
}

impl HttpBackend {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    async fn post(&self, path: &str, body: &impl Serialize, require_flag: bool) -> Result<()> {
        let url = format!("{}{}", self.base_url, path);
        debug!("[backend] POST {} {}", url, serde_json::to_string(body)?);

        let response = self.client.post(&url).json(body).send().await?;
        let status = response.status();
        let text = response.text().await?;

        let reply = match serde_json::from_str::<BackendReply>(&text) {
            Ok(reply) => reply,
            Err(_) => BackendReply {
                success: Some(false),
                error: Some(format!("{} from {}: {}", status, path, text)),
            },
        };
        reply.check(status, require_flag)
    }
}

#[async_trait]
impl Backend for HttpBackend {
    async fn fetch_catalog(&self) -> Result<Vec<CatalogEntry>> {
        let url = format!("{}/api/nfts", self.base_url);
        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(MarketError::BackendRejected(format!(
                "GET /api/nfts answered {}",
                response.status()
            )));
        }

        let body: NftsResponse = response.json().await?;
        debug!("[backend] Catalog has {} entries", body.nfts.len());
        Ok(body.nfts)
    }

    async fn submit_listing(&self, request: &ListingRequest) -> Result<()> {
        self.post("/api/order", request, true).await
    }

    async fn record_purchase(&self, request: &PurchaseRequest) -> Result<()> {
        self.post("/api/buy", request, false).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_catalog_entry_accepts_numbers() {
        let body = json!({
            "nfts": [
                {"tokenid": 12, "name": "Bear #12", "image": "ipfs://abc", "price": 0.5},
                {"tokenid": "13", "price": "1.25", "seller_address": "0xabc"},
                {"tokenid": null}
            ]
        });
        let parsed: NftsResponse = serde_json::from_value(body).unwrap();

        assert_eq!(parsed.nfts.len(), 3);
        assert_eq!(parsed.nfts[0].token_id, "12");
        assert_eq!(parsed.nfts[0].price.as_deref(), Some("0.5"));
        assert_eq!(parsed.nfts[1].price.as_deref(), Some("1.25"));
        assert_eq!(parsed.nfts[1].seller_address.as_deref(), Some("0xabc"));
        assert_eq!(parsed.nfts[2].token_id, "");
    }

    #[test]
    fn test_missing_nfts_key_is_empty() {
        let parsed: NftsResponse = serde_json::from_value(json!({})).unwrap();
        assert!(parsed.nfts.is_empty());
    }

    #[test]
    fn test_stored_order_key_precedence() {
        let entry: CatalogEntry = serde_json::from_value(json!({
            "tokenid": "1",
            "seaport_order": null,
            "seaportOrderJSON": "{\"parameters\":{}}",
            "signedOrder": {"parameters": {}}
        }))
        .unwrap();

        assert_eq!(
            entry.stored_order(),
            Some(&json!("{\"parameters\":{}}"))
        );
        assert_eq!(CatalogEntry::new("2").stored_order(), None);
    }

    #[test]
    fn test_listing_request_wire_names() {
        let request = ListingRequest {
            tokenid: "7".to_string(),
            price: "0.5".to_string(),
            nft_contract: "0xnft".to_string(),
            marketplace_contract: "0xseaport".to_string(),
            seller_address: "0xseller".to_string(),
            seaport_order: json!({"parameters": {}}),
            order_hash: "0xhash".to_string(),
            on_chain: false,
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["tokenid"], json!("7"));
        assert_eq!(value["price"], json!("0.5"));
        assert_eq!(value["on_chain"], json!(false));
        assert_eq!(value["seaport_order"], json!({"parameters": {}}));
    }

    #[test]
    fn test_purchase_request_skips_missing_fields() {
        let request = PurchaseRequest {
            tokenid: "7".to_string(),
            nft_contract: "0xnft".to_string(),
            marketplace_contract: "0xseaport".to_string(),
            buyer_address: "0xbuyer".to_string(),
            seaport_order: None,
            order_hash: None,
            price: None,
            on_chain: true,
        };
        let value = serde_json::to_value(&request).unwrap();
        assert!(value.get("order_hash").is_none());
        assert!(value.get("price").is_none());
        assert_eq!(value["on_chain"], json!(true));
    }

    #[test]
    fn test_reply_check() {
        let ok = BackendReply {
            success: Some(true),
            error: None,
        };
        assert!(ok.check(StatusCode::OK, true).is_ok());

        let rejected = BackendReply {
            success: Some(false),
            error: Some("already listed".to_string()),
        };
        match rejected.check(StatusCode::OK, true) {
            Err(MarketError::BackendRejected(reason)) => assert_eq!(reason, "already listed"),
            other => panic!("unexpected {:?}", other),
        }

        // Listing needs the flag, purchases accept any 2xx.
        assert!(BackendReply::default().check(StatusCode::OK, true).is_err());
        assert!(BackendReply::default().check(StatusCode::OK, false).is_ok());
        assert!(BackendReply::default()
            .check(StatusCode::INTERNAL_SERVER_ERROR, false)
            .is_err());
    }

    #[test]
    fn test_lower_hex() {
        let address: Address = "0x54a88333F6e7540eA982261301309048aC431eD5".parse().unwrap();
        assert_eq!(
            lower_hex(&address),
            "0x54a88333f6e7540ea982261301309048ac431ed5"
        );
    }
}
