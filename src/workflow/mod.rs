//! The user-facing actions: connecting a wallet, listing a token, buying one.
//! Each runs its steps strictly in order and stops at the first error.

mod buy;
mod connect;
mod list;

pub use buy::{buy_nft, PurchaseReceipt};
pub use connect::{connect, ConnectOutcome};
pub use list::{
    build_listing_input, list_nft, ApprovalChannel, ListingReceipt, LISTING_DURATION_SECS,
    START_TIME_SKEW_SECS,
};

/// Sink for transient progress messages while an action runs.
pub type Progress<'a> = &'a (dyn Fn(&str) + Send + Sync);
