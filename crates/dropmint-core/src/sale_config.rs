//! Sale-config commitment for a project
//!
//! One leaf per sale wave, `keccak256(encode_sale_wave_config(wave))`, in the same
//! sorted-pair tree as whitelists. The root is what the owner publishes on-chain.

use crate::encoding::OnChainSaleConfig;
use crate::merkle::{verify_proof, MerkleTree};
use crate::wave::SaleWaveConfig;
use crate::{Error, Result};
use alloy_primitives::B256;

/// Leaf hash of a sale wave
pub fn sale_config_leaf(wave: &SaleWaveConfig) -> Result<B256> {
    Ok(OnChainSaleConfig::from_wave(wave)?.leaf_hash())
}

/// Merkle tree over all of a project's sale waves
#[derive(Debug, Clone)]
pub struct SaleConfigTree {
    tree: MerkleTree,
    identifiers: Vec<(String, B256)>,
}

impl SaleConfigTree {
    /// Build from the project's waves in any order
    pub fn build(waves: &[SaleWaveConfig]) -> Result<Self> {
        let identifiers = waves
            .iter()
            .map(|wave| Ok((wave.identifier.clone(), sale_config_leaf(wave)?)))
            .collect::<Result<Vec<_>>>()?;

        let tree = MerkleTree::new(identifiers.iter().map(|(_, leaf)| *leaf).collect());
        tracing::debug!("Built sale-config tree: {} waves, root {}", tree.len(), tree.root());

        Ok(Self { tree, identifiers })
    }

    /// Sale-config root
    pub fn root(&self) -> B256 {
        self.tree.root()
    }

    /// Leaf of the wave with `identifier`
    pub fn leaf(&self, identifier: &str) -> Option<B256> {
        self.identifiers
            .iter()
            .find(|(id, _)| id == identifier)
            .map(|(_, leaf)| *leaf)
    }

    /// Proof for the wave with `identifier`
    pub fn proof(&self, identifier: &str) -> Result<Vec<B256>> {
        let leaf = self.leaf(identifier).ok_or_else(|| {
            Error::Validation(format!("Sale wave {} is not part of this project", identifier))
        })?;
        Ok(self.tree.proof(&leaf))
    }

    /// Check a proof for `wave` against this tree's root
    pub fn verify(&self, wave: &SaleWaveConfig, proof: &[B256]) -> Result<bool> {
        Ok(verify_proof(sale_config_leaf(wave)?, proof, self.root()))
    }
}

/// Root over `waves`; zero waves give the empty root
pub fn get_sale_config_root(waves: &[SaleWaveConfig]) -> Result<B256> {
    Ok(SaleConfigTree::build(waves)?.root())
}

/// Proof for the wave `target_identifier` within `waves`
pub fn get_sale_config_proof(waves: &[SaleWaveConfig], target_identifier: &str) -> Result<Vec<B256>> {
    SaleConfigTree::build(waves)?.proof(target_identifier)
}
