//! Network provider setup for reads and signed writes

use alloy::{
    network::EthereumWallet,
    primitives::Address,
    providers::{Provider, ProviderBuilder},
    rpc::client::RpcClient,
    signers::local::PrivateKeySigner,
};
use anyhow::{Context, Result};
use std::str::FromStr;
use std::sync::Arc;
use tracing::{info, warn};
use crate::{
    config::Config,
    errors::PoolError,
    network::retry::{retry_with_backoff, RetryPolicy},
    ConcreteProvider, SharedProvider,
};

pub async fn setup_provider(config: &Config) -> Result<Arc<ConcreteProvider>> {
    let rpc_url = config.rpc_endpoint()?;

    let provider: Arc<ConcreteProvider> = Arc::new(
        ProviderBuilder::new()
            .on_http(rpc_url.parse().context("Invalid RPC URL")?)
            .boxed()
    );

    info!("🔗 Testing connection to {}...", config.network);
    let block = retry_with_backoff(
        || async {
            provider.get_block_number().await
                .context("Failed to get block number")
        },
        &RetryPolicy::connection(),
        "RPC connection",
    ).await
    .map_err(|e| {
        warn!("⚠️ Network connection attempt failed: {}", e);
        anyhow::anyhow!("Network connection failed: {}", e)
    })?;

    info!("✅ Connected to {} at block {}", config.network, block);
    Ok(provider)
}

/// Builds a signing provider for approvals, joins, exits and pool creation.
/// Returns the provider together with the account it signs for.
pub fn setup_wallet_provider(config: &Config) -> Result<(SharedProvider, Address)> {
    let private_key = config.private_key.as_ref().ok_or_else(|| PoolError::ClientUnavailable {
        what: "Signer (set PRIVATE_KEY)".to_string(),
    })?;
    let signer = PrivateKeySigner::from_str(private_key)
        .context("Failed to parse private key")?;
    let account = signer.address();

    let rpc_url = config.rpc_endpoint()?;
    let client = RpcClient::new_http(rpc_url.parse().context("Invalid RPC URL")?).boxed();
    let provider: SharedProvider = Arc::new(
        ProviderBuilder::new()
            .with_recommended_fillers()
            .wallet(EthereumWallet::from(signer))
            .on_client(client)
    );

    info!("🔑 Wallet provider ready for {}", account);
    Ok((provider, account))
}
