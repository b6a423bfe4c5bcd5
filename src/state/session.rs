use std::fmt;
use std::sync::Arc;

use alloy_primitives::Address;

use crate::api::lower_hex;
use crate::chain::{OrderProtocol, TokenContract, WalletProvider};

/// A connected wallet and the clients bound to its signer.
/// Built whole by connect and dropped whole by disconnect.
#[derive(Clone)]
pub struct Session {
    pub wallet: Arc<dyn WalletProvider>,
    pub token: Arc<dyn TokenContract>,
    pub protocol: Arc<dyn OrderProtocol>,
    pub user_address: Address,
}

impl Session {
    /// `0x1234...abcd`
    pub fn short_address(&self) -> String {
        let full = lower_hex(&self.user_address);
        format!("{}...{}", &full[..6], &full[full.len() - 4..])
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("user_address", &self.user_address)
            .field("token", &self.token.address())
            .field("marketplace", &self.protocol.marketplace())
            .finish()
    }
}
