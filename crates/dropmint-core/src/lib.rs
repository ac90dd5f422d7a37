//! Dropmint core
//!
//! Sale-configuration commitments and mint authorization for NFT drops: canonical ABI
//! encoding, sorted-pair Merkle trees over whitelists and sale waves, platform-signed
//! mint challenges and the token-gated mint-limit policy.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod address;
pub mod amount;
pub mod config;
pub mod encoding;
pub mod error;
pub mod merkle;
pub mod sale_config;
pub mod signer;
pub mod token_gate;
pub mod wave;
pub mod whitelist;

pub use address::{parse_address, ZERO_ADDRESS};
pub use amount::{format_units, parse_units, total_charge, NATIVE_DECIMALS};
pub use config::{SignerConfig, SIGNER_KEY_ENV};
pub use encoding::{encode_sale_wave_config, encode_whitelist_entry, OnChainSaleConfig};
pub use error::{Error, ErrorCategory, Result};
pub use merkle::{verify_proof, MerkleTree, EMPTY_ROOT};
pub use sale_config::{get_sale_config_proof, get_sale_config_root, SaleConfigTree};
pub use signer::{
    recover_signer, verify_recovered_signer, LocalKeyStore, MintAuthorizer, MintChallenge,
    SigningKeyStore,
};
pub use token_gate::{check_entitlement, Entitlement, MintPolicy};
pub use wave::{resolve_active_wave, SaleType, SaleWaveConfig, WhitelistEntry};
pub use whitelist::{get_whitelist_proof, RawWhitelistEntry, WhitelistTree};
