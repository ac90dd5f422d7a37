//! Mint orchestration
//!
//! Assembles everything a mint page needs to submit a mint transaction. A bundle is either
//! returned complete or not at all.
//!
//! Free waves gated by a single-unit collection are served only by the token-gated path;
//! the plain path refuses them.

use crate::providers::{ChainReader, WaveRepository};
use crate::Result;
use alloy_primitives::{Address, Bytes, B256, U256};
use dropmint_core::token_gate::limit;
use dropmint_core::{
    check_entitlement, get_whitelist_proof, resolve_active_wave, total_charge,
    verify_recovered_signer, Error as CoreError, MintAuthorizer, MintPolicy, OnChainSaleConfig,
    SaleConfigTree, SaleType, SaleWaveConfig, WhitelistEntry,
};
use dropmint_core::{verify_proof, whitelist::whitelist_leaf};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// How far `issued_at` of an ownership message may be from the current time, in seconds
pub const OWNERSHIP_WINDOW_SECS: u64 = 300;

/// Text a wallet signs to request a token-gated mint
pub fn ownership_message(project_id: &str, wallet: &Address, mint_count: u64, issued_at: u64) -> String {
    format!(
        "Dropmint token-gated mint\nProject: {}\nWallet: {}\nCount: {}\nIssued at: {}",
        project_id,
        wallet.to_checksum(None),
        mint_count,
        issued_at
    )
}

/// Everything needed to submit one mint transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MintBundle {
    /// Active wave as the contract sees it
    pub sale_config: OnChainSaleConfig,
    /// Bound challenge message
    pub message: String,
    /// Platform signature over the bound payload
    pub signature: Bytes,
    /// Proof of the wallet's whitelist entry (empty for public waves)
    pub whitelist_proof: Vec<B256>,
    /// Total price in wei
    pub mint_charge_total: U256,
    /// Limit the contract checks the proof against
    pub whitelist_mint_limit: u64,
    /// Proof of the active wave against the project root
    pub sale_config_proof: Vec<B256>,
}

/// Token-gated mint request, signed by the wallet it names
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenGatedMintRequest {
    /// Project to mint from
    pub project_id: String,
    /// Claimed wallet
    pub wallet: Address,
    /// Units requested
    pub mint_count: u64,
    /// Unix seconds the wallet signed at
    pub issued_at: u64,
    /// Personal-message signature by `wallet` over [`ownership_message`]
    pub ownership_signature: Bytes,
}

/// Entry point for mint preparation
#[derive(Clone)]
pub struct MintOrchestrator {
    waves: Arc<dyn WaveRepository>,
    chain: Arc<dyn ChainReader>,
    authorizer: MintAuthorizer,
}

impl MintOrchestrator {
    /// Create orchestrator
    pub fn new(
        waves: Arc<dyn WaveRepository>,
        chain: Arc<dyn ChainReader>,
        authorizer: MintAuthorizer,
    ) -> Self {
        Self {
            waves,
            chain,
            authorizer,
        }
    }

    /// Prepare a mint of `mint_count` units for `wallet` at the current time
    pub async fn prepare_mint(&self, project_id: &str, wallet: Address, mint_count: u64) -> Result<MintBundle> {
        self.prepare_mint_at(project_id, wallet, mint_count, unix_now()).await
    }

    /// Prepare a mint as of `now` (unix seconds)
    pub async fn prepare_mint_at(
        &self,
        project_id: &str,
        wallet: Address,
        mint_count: u64,
        now: u64,
    ) -> Result<MintBundle> {
        validate_request(&wallet, mint_count)?;

        let waves = self.waves.load_sale_waves(project_id).await?;
        let wave = resolve_active_wave(&waves, now)?;

        if wave.is_token_gated() {
            let single_unit = self
                .chain
                .is_single_unit_collection(&wave.token_gated_address)
                .await?;
            if MintPolicy::for_wave(wave, single_unit)?.is_token_gated() {
                return Err(CoreError::Validation(format!(
                    "Sale wave {} is token gated; use the token-gated mint",
                    wave.identifier
                ))
                .into());
            }
        }

        let entry = wave.whitelist_entry(&wallet);

        let bundle = self.assemble(&waves, wave, entry, mint_count, entry.limit)?;
        tracing::info!(
            "Prepared mint of {} for {} in wave {} of project {}",
            mint_count,
            wallet,
            wave.identifier,
            project_id
        );
        Ok(bundle)
    }

    /// Prepare a token-gated mint at the current time
    pub async fn prepare_token_gated_mint(&self, request: &TokenGatedMintRequest) -> Result<MintBundle> {
        self.prepare_token_gated_mint_at(request, unix_now()).await
    }

    /// Prepare a token-gated mint as of `now` (unix seconds).
    ///
    /// The wallet must have signed [`ownership_message`] for this request within
    /// [`OWNERSHIP_WINDOW_SECS`] of `now`. The active wave must be free and gated by a
    /// single-unit collection, and the request must fit the holder's limit.
    pub async fn prepare_token_gated_mint_at(
        &self,
        request: &TokenGatedMintRequest,
        now: u64,
    ) -> Result<MintBundle> {
        validate_request(&request.wallet, request.mint_count)?;

        if request.issued_at.abs_diff(now) > OWNERSHIP_WINDOW_SECS {
            return Err(CoreError::InvalidSignature(format!(
                "Ownership message issued at {} is outside the window around {}",
                request.issued_at, now
            ))
            .into());
        }

        let message = ownership_message(
            &request.project_id,
            &request.wallet,
            request.mint_count,
            request.issued_at,
        );
        verify_recovered_signer(message.as_bytes(), &request.ownership_signature, &request.wallet)?;

        let waves = self.waves.load_sale_waves(&request.project_id).await?;
        let wave = resolve_active_wave(&waves, now)?;

        let single_unit = if wave.is_token_gated() {
            self.chain
                .is_single_unit_collection(&wave.token_gated_address)
                .await?
        } else {
            false
        };

        let gating_address = match MintPolicy::for_wave(wave, single_unit)? {
            MintPolicy::TokenGated { gating_address } => gating_address,
            MintPolicy::PerWallet { .. } => {
                return Err(CoreError::Validation(format!(
                    "Sale wave {} is not a free token-gated wave",
                    wave.identifier
                ))
                .into());
            }
        };

        let base_count = self
            .chain
            .received_count(&gating_address, &request.wallet)
            .await?;
        let already_minted = self
            .chain
            .minted_count(&request.wallet, &wave.identifier)
            .await?;

        if let Err(e) = check_entitlement(already_minted, request.mint_count, base_count).into_result() {
            tracing::info!(
                "Denied token-gated mint for {}: {} minted + {} requested > limit {}",
                request.wallet,
                already_minted,
                request.mint_count,
                limit(base_count)
            );
            return Err(e.into());
        }

        let entry = wave.whitelist_entry(&request.wallet);
        self.assemble(&waves, wave, entry, request.mint_count, limit(base_count))
    }

    fn assemble(
        &self,
        waves: &[SaleWaveConfig],
        wave: &SaleWaveConfig,
        entry: WhitelistEntry,
        mint_count: u64,
        whitelist_mint_limit: u64,
    ) -> Result<MintBundle> {
        wave.ensure_unique_whitelist()?;

        let sale_config = OnChainSaleConfig::from_wave(wave)?;
        let mint_charge_total = total_charge(sale_config.mint_charge_wei, mint_count)?;

        let tree = SaleConfigTree::build(waves)?;
        let sale_config_proof = tree.proof(&wave.identifier)?;
        if !tree.verify(wave, &sale_config_proof)? {
            return Err(CoreError::Encoding(format!(
                "Sale-config proof for {} does not verify",
                wave.identifier
            ))
            .into());
        }

        let whitelist_proof = get_whitelist_proof(wave.sale_type, &wave.whitelist, &entry);
        let listed = wave.sale_type == SaleType::Private && wave.whitelist.contains(&entry);
        if listed && !verify_proof(whitelist_leaf(&entry), &whitelist_proof, sale_config.whitelist_root) {
            return Err(CoreError::Encoding(format!(
                "Whitelist proof for {} in {} does not verify",
                entry.address, wave.identifier
            ))
            .into());
        }

        let challenge = self
            .authorizer
            .issue_bound_challenge(entry.address, mint_count)?;

        Ok(MintBundle {
            sale_config,
            message: challenge.message,
            signature: challenge.signature,
            whitelist_proof,
            mint_charge_total,
            whitelist_mint_limit,
            sale_config_proof,
        })
    }
}

impl std::fmt::Debug for MintOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MintOrchestrator")
            .field("authorizer", &self.authorizer)
            .finish_non_exhaustive()
    }
}

fn validate_request(wallet: &Address, mint_count: u64) -> Result<()> {
    if wallet.is_zero() {
        return Err(CoreError::Validation("Wallet address is the zero address".to_string()).into());
    }
    if mint_count == 0 {
        return Err(CoreError::Validation("Mint count must be positive".to_string()).into());
    }
    Ok(())
}

fn unix_now() -> u64 {
    u64::try_from(chrono::Utc::now().timestamp()).unwrap_or(0)
}
