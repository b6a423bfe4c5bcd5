use alloy_primitives::Address;
use thiserror::Error;

/// Every way a marketplace action can end early.
/// Each one terminates the current user action and is shown as a single alert.
#[derive(Debug, Error)]
pub enum MarketError {
    #[error("no wallet provider found")]
    NoWallet,

    #[error("wallet is not connected")]
    MissingSession,

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("token {token_id} is owned by {owner}, not by you")]
    NotOwner { token_id: String, owner: Address },

    #[error("approval transaction failed: {0}")]
    ApprovalTxFailed(String),

    #[error("backend rejected request: {0}")]
    BackendRejected(String),

    #[error("you cannot buy your own listing")]
    SelfPurchase,

    #[error("no usable sale order: {0}")]
    MalformedOrder(String),

    #[error("sale cancelled: token {token_id} is now owned by {owner}")]
    StaleOrder { token_id: String, owner: Address },

    #[error("order protocol error: {0}")]
    ProtocolClient(String),

    #[error("chain read failed: {0}")]
    ChainRead(String),

    #[error("wallet request failed: {0}")]
    Wallet(String),

    #[error("transaction failed: {0}")]
    Transaction(String),

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T, E = MarketError> = std::result::Result<T, E>;
