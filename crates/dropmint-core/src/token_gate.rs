//! Token-gated mint limits
//!
//! Holders of a gating collection may mint according to how many of its tokens they have
//! ever received. The stepped bonus below is reproduced exactly as deployed.

use crate::wave::SaleWaveConfig;
use crate::{Error, Result};
use alloy_primitives::Address;

/// Bonus per block of five received tokens, for counts 0..=39
pub const BONUS_TABLE: [u64; 8] = [0, 1, 3, 4, 6, 7, 9, 10];

/// Counts above this get the flat bonus
pub const TABLE_CEILING: u64 = 39;

/// Bonus above the table
pub const FLAT_BONUS: u64 = 12;

/// Maximum mints for a wallet that has received `base_count` gating tokens
pub fn limit(base_count: u64) -> u64 {
    if base_count > TABLE_CEILING {
        return base_count.saturating_add(FLAT_BONUS);
    }
    base_count + BONUS_TABLE[(base_count / 5) as usize]
}

/// Outcome of an entitlement check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entitlement {
    /// Request fits within the limit
    Allow,
    /// Request denied
    Deny(String),
}

impl Entitlement {
    /// Whether the request is allowed
    pub fn is_allowed(&self) -> bool {
        matches!(self, Entitlement::Allow)
    }

    /// Turn a denial into `MintLimitExceeded`
    pub fn into_result(self) -> Result<()> {
        match self {
            Entitlement::Allow => Ok(()),
            Entitlement::Deny(reason) => Err(Error::MintLimitExceeded(reason)),
        }
    }
}

/// Allow iff `already_minted + requested_count <= limit(base_count)`
pub fn check_entitlement(already_minted: u64, requested_count: u64, base_count: u64) -> Entitlement {
    let allowed = limit(base_count);
    match already_minted.checked_add(requested_count) {
        Some(total) if total <= allowed => Entitlement::Allow,
        _ => Entitlement::Deny("mint limit exceeded".to_string()),
    }
}

/// Per-wallet policy in force for a wave
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MintPolicy {
    /// Limit derived from gating-collection holdings
    TokenGated {
        /// Gating collection
        gating_address: Address,
    },
    /// Static per-wallet cap
    PerWallet {
        /// Cap from the wave configuration
        max_mint_per_wallet: u64,
    },
}

impl MintPolicy {
    /// Decide the policy for `wave`.
    ///
    /// The token gate applies only to free waves with a gating collection that holds one
    /// unit per token (`single_unit_collection`, confirmed by the chain reader).
    pub fn for_wave(wave: &SaleWaveConfig, single_unit_collection: bool) -> Result<Self> {
        let free = wave.mint_charge_wei()?.is_zero();
        if wave.is_token_gated() && free && single_unit_collection {
            Ok(MintPolicy::TokenGated {
                gating_address: wave.token_gated_address,
            })
        } else {
            Ok(MintPolicy::PerWallet {
                max_mint_per_wallet: wave.max_mint_per_wallet,
            })
        }
    }

    /// Whether the token gate applies
    pub fn is_token_gated(&self) -> bool {
        matches!(self, MintPolicy::TokenGated { .. })
    }
}
