//! Canonical encoding
//!
//! Byte layouts re-derived by the sale contract. Do not change a field, its width or its
//! order without changing the contract in the same release.
//!
//! Whitelist entry: `abi.encode(address, uint256)`.
//! Sale wave: `abi.encode(string, bool, uint256, uint256, uint256, bytes32, uint256,
//! uint256, address)`.

use crate::merkle::EMPTY_ROOT;
use crate::wave::{SaleType, SaleWaveConfig, WhitelistEntry};
use crate::whitelist::WhitelistTree;
use crate::Result;
use alloy_primitives::{keccak256, Address, B256, U256};
use alloy_sol_types::SolValue;
use serde::{Deserialize, Serialize};

/// ABI-encode a whitelist entry
pub fn encode_whitelist_entry(entry: &WhitelistEntry) -> Vec<u8> {
    (entry.address, U256::from(entry.limit)).abi_encode_params()
}

/// ABI-encode a sale wave, computing its whitelist root
pub fn encode_sale_wave_config(wave: &SaleWaveConfig) -> Result<Vec<u8>> {
    Ok(OnChainSaleConfig::from_wave(wave)?.abi_encode())
}

/// Whitelist root committed for a wave.
///
/// Public waves always commit [`EMPTY_ROOT`], whatever whitelist data they carry.
pub fn whitelist_root_for(wave: &SaleWaveConfig) -> B256 {
    match wave.sale_type {
        SaleType::Public => EMPTY_ROOT,
        SaleType::Private if wave.whitelist.is_empty() => EMPTY_ROOT,
        SaleType::Private => WhitelistTree::build(&wave.whitelist).root(),
    }
}

/// A sale wave reduced to the integer fields the contract sees
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OnChainSaleConfig {
    /// Wave identifier
    pub identifier: String,
    /// Enabled flag
    pub enabled: bool,
    /// Start, unix seconds
    pub start_time: u64,
    /// End, unix seconds (0 = never)
    pub end_time: u64,
    /// Price per mint in wei
    pub mint_charge_wei: U256,
    /// Whitelist commitment
    pub whitelist_root: B256,
    /// Per-wallet cap
    pub max_mint_per_wallet: u64,
    /// Wave cap
    pub max_mint_in_sale: u64,
    /// Gating collection or zero
    pub token_gated_address: Address,
}

impl OnChainSaleConfig {
    /// Convert a stored wave; fails if the mint charge cannot be represented exactly
    pub fn from_wave(wave: &SaleWaveConfig) -> Result<Self> {
        Ok(Self {
            identifier: wave.identifier.clone(),
            enabled: wave.enabled,
            start_time: wave.start_time,
            end_time: wave.end_time,
            mint_charge_wei: wave.mint_charge_wei()?,
            whitelist_root: whitelist_root_for(wave),
            max_mint_per_wallet: wave.max_mint_per_wallet,
            max_mint_in_sale: wave.max_mint_in_sale,
            token_gated_address: wave.token_gated_address,
        })
    }

    /// Canonical ABI bytes
    pub fn abi_encode(&self) -> Vec<u8> {
        (
            self.identifier.clone(),
            self.enabled,
            U256::from(self.start_time),
            U256::from(self.end_time),
            self.mint_charge_wei,
            self.whitelist_root,
            U256::from(self.max_mint_per_wallet),
            U256::from(self.max_mint_in_sale),
            self.token_gated_address,
        )
            .abi_encode_params()
    }

    /// Leaf hash in the sale-config tree
    pub fn leaf_hash(&self) -> B256 {
        keccak256(self.abi_encode())
    }
}
