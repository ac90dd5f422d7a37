//! Whitelist commitment for one private sale wave
//!
//! Leaves are `keccak256(abi.encode(address, uint256 limit))`. Callers pass entries that
//! are already unique by address; duplicates are not rejected here and simply become
//! duplicate leaves.

use crate::address::parse_address;
use crate::encoding::encode_whitelist_entry;
use crate::merkle::{verify_proof, MerkleTree};
use crate::wave::{SaleType, WhitelistEntry};
use crate::Result;
use alloy_primitives::{keccak256, B256};
use serde::{Deserialize, Serialize};

/// Leaf hash of a whitelist entry
pub fn whitelist_leaf(entry: &WhitelistEntry) -> B256 {
    keccak256(encode_whitelist_entry(entry))
}

/// Whitelist entry as submitted by an owner, address still unparsed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawWhitelistEntry {
    /// Wallet address text
    pub address: String,
    /// Number of mints allowed
    pub limit: u64,
}

/// Merkle tree over a wave's whitelist
#[derive(Debug, Clone)]
pub struct WhitelistTree {
    tree: MerkleTree,
}

impl WhitelistTree {
    /// Build from typed entries
    pub fn build(entries: &[WhitelistEntry]) -> Self {
        let tree = MerkleTree::new(entries.iter().map(whitelist_leaf).collect());
        tracing::debug!("Built whitelist tree: {} leaves, root {}", tree.len(), tree.root());
        Self { tree }
    }

    /// Build from submitted entries, failing on the first malformed address
    pub fn build_from_raw(entries: &[RawWhitelistEntry]) -> Result<Self> {
        let parsed = entries
            .iter()
            .map(|raw| Ok(WhitelistEntry::new(parse_address(&raw.address)?, raw.limit)))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::build(&parsed))
    }

    /// Whitelist root
    pub fn root(&self) -> B256 {
        self.tree.root()
    }

    /// Number of entries committed
    pub fn len(&self) -> usize {
        self.tree.len()
    }

    /// Whether the whitelist is empty
    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// Proof for `entry`.
    ///
    /// Pass a zero-limit entry for wallets that are not whitelisted; an entry absent from
    /// the tree yields an empty proof.
    pub fn proof(&self, entry: &WhitelistEntry) -> Vec<B256> {
        self.tree.proof(&whitelist_leaf(entry))
    }

    /// Check a proof against this tree's root
    pub fn verify(&self, entry: &WhitelistEntry, proof: &[B256]) -> bool {
        verify_proof(whitelist_leaf(entry), proof, self.root())
    }
}

/// Whitelist proof for a wallet entry; public waves need none
pub fn get_whitelist_proof(
    sale_type: SaleType,
    whitelist: &[WhitelistEntry],
    wallet_entry: &WhitelistEntry,
) -> Vec<B256> {
    match sale_type {
        SaleType::Public => Vec::new(),
        SaleType::Private => WhitelistTree::build(whitelist).proof(wallet_entry),
    }
}
