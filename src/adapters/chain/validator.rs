//! Contract Validator - On-chain Verification at Startup
//!
//! Validates that the configured lending pool and token addresses point
//! to deployed contracts (not EOAs or typos) before the client reads or
//! writes anything. A lending pool without code is fatal; a token without
//! code is reported and left to fail on its first read.

use alloy::primitives::Address;
use alloy::providers::Provider;
use anyhow::{Context, Result};
use tracing::{info, instrument, warn};

/// Result of validating a single contract.
#[derive(Debug)]
pub struct ValidationResult {
    /// Contract name for logging.
    pub name: &'static str,
    /// Address that was validated.
    pub address: Address,
    /// Whether the contract has deployed code.
    pub has_code: bool,
}

/// Validates contract addresses against on-chain state.
pub struct ContractValidator<P> {
    /// Alloy provider for on-chain queries.
    provider: P,
}

impl<P: Provider> ContractValidator<P> {
    /// Create a new validator with the given provider.
    pub const fn new(provider: P) -> Self {
        Self { provider }
    }

    /// Validate both contracts.
    ///
    /// Returns an error if the lending pool has no code.
    #[instrument(skip(self))]
    pub async fn validate_all(
        &self,
        lending: Address,
        token: Address,
    ) -> Result<Vec<ValidationResult>> {
        let mut results = Vec::with_capacity(2);

        for (name, address) in [("Lending Pool", lending), ("Deposit Token", token)] {
            let result = self.validate_contract(name, address).await?;

            if result.has_code {
                info!(contract = name, address = %address, "Contract validated: code exists on-chain");
            } else {
                warn!(
                    contract = name,
                    address = %address,
                    "Contract has no code; possible misconfiguration"
                );
            }

            results.push(result);
        }

        if let Some(pool) = results.first() {
            anyhow::ensure!(
                pool.has_code,
                "Lending pool at {lending} has no deployed code; check config.toml"
            );
        }

        Ok(results)
    }

    /// Validate a single contract by checking if code exists at the address.
    async fn validate_contract(&self, name: &'static str, address: Address) -> Result<ValidationResult> {
        let code = self
            .provider
            .get_code_at(address)
            .await
            .with_context(|| format!("Failed to query code for {name}"))?;

        Ok(ValidationResult {
            name,
            address,
            has_code: !code.is_empty(),
        })
    }
}
