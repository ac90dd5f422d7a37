//! Sale wave configuration model
//!
//! A project owns an ordered list of sale waves. Each wave is a time-boxed minting phase
//! with its own price, caps and eligibility rule (whitelist or token gate).

use crate::address::is_zero_address;
use crate::amount::parse_units;
use crate::{Error, Result};
use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Eligibility rule of a sale wave
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SaleType {
    /// Whitelisted buyers only
    Private,
    /// Anyone may mint
    Public,
}

impl SaleType {
    /// Storage/wire name
    pub fn as_str(&self) -> &'static str {
        match self {
            SaleType::Private => "private",
            SaleType::Public => "public",
        }
    }

    /// Parse storage/wire name
    pub fn parse(value: &str) -> Result<Self> {
        match value {
            "private" => Ok(SaleType::Private),
            "public" => Ok(SaleType::Public),
            other => Err(Error::Validation(format!("Unknown sale type: {}", other))),
        }
    }
}

/// One buyer's allowance within a private wave
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WhitelistEntry {
    /// Buyer wallet
    pub address: Address,
    /// Number of mints allowed
    pub limit: u64,
}

impl WhitelistEntry {
    /// Create entry
    pub fn new(address: Address, limit: u64) -> Self {
        Self { address, limit }
    }

    /// Zero-limit entry used to prove non-entitlement
    pub fn zero(address: Address) -> Self {
        Self { address, limit: 0 }
    }
}

/// Sale wave configuration as stored for a project
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleWaveConfig {
    /// Opaque unique identifier (UUID)
    pub identifier: String,
    /// Whether the wave may run at all
    pub enabled: bool,
    /// Start, unix seconds
    pub start_time: u64,
    /// End, unix seconds; 0 = never ends
    pub end_time: u64,
    /// Price per mint as a decimal native-currency amount
    pub mint_charge: String,
    /// Per-wallet cap (replaced by the token-gated limit when that policy applies)
    pub max_mint_per_wallet: u64,
    /// Cap across the whole wave
    pub max_mint_in_sale: u64,
    /// Eligibility rule
    pub sale_type: SaleType,
    /// Whitelist entries; ignored for public waves
    #[serde(default)]
    pub whitelist: Vec<WhitelistEntry>,
    /// Gating collection or the zero address
    #[serde(default)]
    pub token_gated_address: Address,
}

impl SaleWaveConfig {
    /// Mint charge in wei
    pub fn mint_charge_wei(&self) -> Result<U256> {
        parse_units(&self.mint_charge).map_err(|e| match e {
            Error::Validation(msg) => Error::Encoding(format!(
                "Wave {} mint charge: {}",
                self.identifier, msg
            )),
            other => other,
        })
    }

    /// Whether a gating collection is configured
    pub fn is_token_gated(&self) -> bool {
        !is_zero_address(&self.token_gated_address)
    }

    /// Whether the wave is eligible to run at `now`
    pub fn is_active(&self, now: u64) -> bool {
        self.enabled && self.start_time <= now && (self.end_time == 0 || self.end_time >= now)
    }

    /// Whitelist entry for `wallet`, or a zero-limit entry when absent
    pub fn whitelist_entry(&self, wallet: &Address) -> WhitelistEntry {
        self.whitelist
            .iter()
            .find(|entry| entry.address == *wallet)
            .copied()
            .unwrap_or_else(|| WhitelistEntry::zero(*wallet))
    }

    /// Check structural integrity before the wave is stored or committed
    pub fn validate(&self) -> Result<()> {
        if self.identifier.trim().is_empty() {
            return Err(Error::Validation("Sale wave identifier is empty".to_string()));
        }

        if self.end_time != 0 && self.end_time < self.start_time {
            return Err(Error::Validation(format!(
                "Sale wave {} ends ({}) before it starts ({})",
                self.identifier, self.end_time, self.start_time
            )));
        }

        parse_units(&self.mint_charge)?;
        self.ensure_unique_whitelist()
    }

    /// Whitelist addresses must be unique within the wave
    pub fn ensure_unique_whitelist(&self) -> Result<()> {
        let mut seen = HashSet::with_capacity(self.whitelist.len());
        for entry in &self.whitelist {
            if !seen.insert(entry.address) {
                return Err(Error::Validation(format!(
                    "Duplicate whitelist address {} in sale wave {}",
                    entry.address, self.identifier
                )));
            }
        }
        Ok(())
    }
}

/// Resolve the single wave active at `now`.
///
/// More than one eligible wave is a configuration error and is not tie-broken.
pub fn resolve_active_wave(waves: &[SaleWaveConfig], now: u64) -> Result<&SaleWaveConfig> {
    let mut active = waves.iter().filter(|wave| wave.is_active(now));

    let wave = active
        .next()
        .ok_or_else(|| Error::NoSaleRunning(format!("No sale wave active at {}", now)))?;

    if let Some(other) = active.next() {
        tracing::warn!(
            "Overlapping sale waves {} and {} are both active at {}",
            wave.identifier,
            other.identifier,
            now
        );
        return Err(Error::NoSaleRunning(format!(
            "Sale waves {} and {} are both active at {}",
            wave.identifier, other.identifier, now
        )));
    }

    Ok(wave)
}

#[cfg(any(test, feature = "test-helpers"))]
impl SaleWaveConfig {
    /// Public wave fixture
    pub fn test_public(identifier: &str, start_time: u64, end_time: u64, mint_charge: &str) -> Self {
        Self {
            identifier: identifier.to_string(),
            enabled: true,
            start_time,
            end_time,
            mint_charge: mint_charge.to_string(),
            max_mint_per_wallet: 5,
            max_mint_in_sale: 1000,
            sale_type: SaleType::Public,
            whitelist: Vec::new(),
            token_gated_address: Address::ZERO,
        }
    }

    /// Private wave fixture
    pub fn test_private(
        identifier: &str,
        start_time: u64,
        end_time: u64,
        whitelist: Vec<WhitelistEntry>,
    ) -> Self {
        Self {
            sale_type: SaleType::Private,
            whitelist,
            ..Self::test_public(identifier, start_time, end_time, "0.05")
        }
    }
}
