//! Project commitments
//!
//! Owner-facing operations: saving a project's waves and answering root and proof queries
//! against what is stored.

use crate::providers::WaveRepository;
use crate::Result;
use alloy_primitives::{Address, B256};
use dropmint_core::encoding::whitelist_root_for;
use dropmint_core::whitelist::whitelist_leaf;
use dropmint_core::{
    get_sale_config_proof, get_sale_config_root, get_whitelist_proof, verify_proof,
    Error as CoreError, SaleType, SaleWaveConfig, WhitelistEntry,
};
use std::collections::HashSet;
use std::sync::Arc;

/// Sale wave management for project owners
#[derive(Clone)]
pub struct SaleWaveService {
    waves: Arc<dyn WaveRepository>,
}

impl SaleWaveService {
    /// Create service over a wave repository
    pub fn new(waves: Arc<dyn WaveRepository>) -> Self {
        Self { waves }
    }

    /// Replace all waves of `project_id` and return the root to publish on-chain.
    ///
    /// Every wave is validated before anything is written.
    pub async fn save_sale_waves(&self, project_id: &str, waves: &[SaleWaveConfig]) -> Result<B256> {
        let mut identifiers = HashSet::with_capacity(waves.len());
        for wave in waves {
            wave.validate()?;
            if !identifiers.insert(wave.identifier.as_str()) {
                return Err(CoreError::Validation(format!(
                    "Duplicate wave identifier {}",
                    wave.identifier
                ))
                .into());
            }
        }

        let root = self.waves.replace_sale_waves(project_id, waves).await?;
        tracing::info!(
            "Project {} now commits {} sale waves under root {:?}",
            project_id,
            waves.len(),
            root
        );
        Ok(root)
    }

    /// Sale-config root over the stored waves of `project_id`
    pub async fn sale_config_root(&self, project_id: &str) -> Result<B256> {
        let waves = self.waves.load_sale_waves(project_id).await?;
        Ok(get_sale_config_root(&waves)?)
    }

    /// Sale-config proof for one stored wave
    pub async fn sale_config_proof(&self, project_id: &str, wave_identifier: &str) -> Result<Vec<B256>> {
        let waves = self.waves.load_sale_waves(project_id).await?;
        Ok(get_sale_config_proof(&waves, wave_identifier)?)
    }

    /// Whitelist proof for `wallet` in one stored wave.
    ///
    /// The entry comes from the same load as the wave's whitelist. Wallets that are not
    /// listed are proven with a zero-limit entry.
    pub async fn whitelist_proof(
        &self,
        project_id: &str,
        wave_identifier: &str,
        wallet: Address,
    ) -> Result<(WhitelistEntry, Vec<B256>)> {
        let waves = self.waves.load_sale_waves(project_id).await?;
        let wave = waves
            .iter()
            .find(|w| w.identifier == wave_identifier)
            .ok_or_else(|| {
                CoreError::Validation(format!("Unknown sale wave {}", wave_identifier))
            })?;

        wave.ensure_unique_whitelist()?;

        let entry = wave.whitelist_entry(&wallet);
        let proof = get_whitelist_proof(wave.sale_type, &wave.whitelist, &entry);

        let listed = wave.sale_type == SaleType::Private && wave.whitelist.contains(&entry);
        if listed && !verify_proof(whitelist_leaf(&entry), &proof, whitelist_root_for(wave)) {
            return Err(CoreError::Encoding(format!(
                "Whitelist proof for {} in {} does not verify",
                wallet, wave_identifier
            ))
            .into());
        }

        Ok((entry, proof))
    }
}
