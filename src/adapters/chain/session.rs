//! Wallet Session - Signer-backed alloy-rs 0.9 Provider
//!
//! Builds the one provider every chain adapter shares: an HTTP JSON-RPC
//! connection with the recommended fillers (gas, blob gas, nonce, chain ID)
//! and the wallet's local signer attached. The session is the integration
//! point for "a signer became available"; adapters never build their own.
//!
//! The RPC client is boxed before the fillers are stacked on it, so the
//! provider type below names `BoxTransport` instead of the HTTP client.
//! `sol!` instances take a clone of it; cloning shares the one connection.

use alloy::network::{Ethereum, EthereumWallet};
use alloy::primitives::Address;
use alloy::providers::fillers::{
    BlobGasFiller, ChainIdFiller, FillProvider, GasFiller, JoinFill, NonceFiller, WalletFiller,
};
use alloy::providers::{Identity, Provider, ProviderBuilder, RootProvider};
use alloy::rpc::client::ClientBuilder;
use alloy::signers::local::PrivateKeySigner;
use alloy::transports::BoxTransport;
use alloy::transports::http::reqwest::Url;
use tracing::{debug, info, instrument, warn};

use crate::config::{ChainConfig, WalletConfig};
use crate::domain::LendingError;

/// Filler stack produced by `with_recommended_fillers().wallet(..)`.
type SignerFillers = JoinFill<
    JoinFill<Identity, JoinFill<GasFiller, JoinFill<BlobGasFiller, JoinFill<NonceFiller, ChainIdFiller>>>>,
    WalletFiller<EthereumWallet>,
>;

/// Provider that fills and signs transactions for the session's account.
pub type SignerProvider = FillProvider<SignerFillers, RootProvider<BoxTransport>, BoxTransport, Ethereum>;

/// Connected wallet: signer account plus a provider pinned to one chain.
pub struct WalletSession {
    provider: SignerProvider,
    /// Account the signer controls.
    account: Address,
    /// Chain the session was opened on.
    expected_chain_id: u64,
}

impl WalletSession {
    /// Open a session from the configured signer key and RPC endpoint.
    ///
    /// # Errors
    /// - `NotConnected` when the key variable is unset or empty
    /// - `Config` when the key or URL is malformed
    /// - `UnsupportedChain` when the node reports another chain ID
    #[instrument(skip_all, fields(expected_chain = chain.chain_id))]
    pub async fn connect(chain: &ChainConfig, wallet: &WalletConfig) -> Result<Self, LendingError> {
        let signer = load_signer(
            &wallet.private_key_env,
            std::env::var(&wallet.private_key_env).ok(),
        )?;
        let account = signer.address();

        let url: Url = chain
            .rpc_url
            .parse()
            .map_err(|e| LendingError::Config(format!("invalid RPC URL: {e}")))?;

        let provider = build_provider(signer, url);

        let session = Self {
            provider,
            account,
            expected_chain_id: chain.chain_id,
        };
        session.verify_chain().await?;

        if std::env::var(&wallet.project_id_env).is_ok() {
            debug!("WalletConnect project ID present");
        } else {
            debug!("WalletConnect project ID not set; using local signer only");
        }

        info!(account = %account, chain_id = chain.chain_id, "Wallet session connected");
        Ok(session)
    }

    /// The connected account.
    pub const fn account(&self) -> Address {
        self.account
    }

    pub const fn expected_chain_id(&self) -> u64 {
        self.expected_chain_id
    }

    pub const fn provider(&self) -> &SignerProvider {
        &self.provider
    }

    /// Re-check the active chain. Called before every write so a signer
    /// left over from a network switch never broadcasts on the wrong chain.
    pub async fn verify_chain(&self) -> Result<(), LendingError> {
        let actual = self
            .provider
            .get_chain_id()
            .await
            .map_err(|e| LendingError::ReadError(format!("eth_chainId: {e}")))?;

        check_chain(self.expected_chain_id, actual).inspect_err(|_| {
            warn!(expected = self.expected_chain_id, actual, "Wallet is on an unsupported chain");
        })
    }

    /// Check if the RPC connection is healthy via a lightweight call.
    pub async fn is_healthy(&self) -> bool {
        self.provider.get_block_number().await.is_ok()
    }
}

/// Stack the fillers and wallet on a boxed HTTP client. Sends nothing.
pub(crate) fn build_provider(signer: PrivateKeySigner, url: Url) -> SignerProvider {
    let client = ClientBuilder::default().http(url).boxed();
    ProviderBuilder::new()
        .with_recommended_fillers()
        .wallet(EthereumWallet::from(signer))
        .on_client(client)
}

/// Parse the signer key read from `env_name`. The value is never logged.
pub(crate) fn load_signer(env_name: &str, value: Option<String>) -> Result<PrivateKeySigner, LendingError> {
    let key = value
        .filter(|k| !k.trim().is_empty())
        .ok_or(LendingError::NotConnected)?;

    key.trim()
        .parse()
        .map_err(|_| LendingError::Config(format!("{env_name} does not hold a valid private key")))
}

fn check_chain(expected: u64, actual: u64) -> Result<(), LendingError> {
    if actual == expected {
        Ok(())
    } else {
        Err(LendingError::UnsupportedChain { expected, actual })
    }
}
