use tracing::{info, warn};

use crate::chain::WalletEnvironment;
use crate::config::Config;
use crate::error::{MarketError, Result};
use crate::state::Session;

#[derive(Debug)]
pub enum ConnectOutcome {
    Connected(Session),
    /// The wallet was asked to add the target network; the user has to
    /// connect again once it has switched.
    ChainAdded,
}

pub async fn connect(env: &dyn WalletEnvironment, config: &Config) -> Result<ConnectOutcome> {
    let wallet = env.detect().ok_or(MarketError::NoWallet)?;

    let accounts = wallet.request_accounts().await?;
    let user_address = *accounts
        .first()
        .ok_or_else(|| MarketError::Wallet("wallet returned no accounts".to_string()))?;

    let chain_id = wallet.chain_id().await?;
    if chain_id != config.chain.id {
        info!(
            "[wallet] On chain {}, asking for {} ({})",
            chain_id, config.chain.name, config.chain.id
        );
        match wallet.add_chain(&config.chain_params()).await {
            Ok(()) => return Ok(ConnectOutcome::ChainAdded),
            Err(e) => warn!(
                "[wallet] Network switch failed, staying on chain {}: {}",
                chain_id, e
            ),
        }
    }

    let token = wallet.token_contract(config.contracts.nft);
    let protocol = wallet.order_protocol(config.contracts.marketplace);
    info!("[wallet] Connected {}", user_address);

    Ok(ConnectOutcome::Connected(Session {
        wallet,
        token,
        protocol,
        user_address,
    }))
}
