//! Mint authorization signing
//!
//! The platform key signs short-lived challenges that the sale contract checks before
//! minting. Signatures are EIP-191 personal-message signatures over a 32-byte keccak
//! digest:
//! - random challenge: `keccak256(message)`
//! - bound challenge: `keccak256(abi.encodePacked(account, message, uint256 count))`
//!
//! Nothing here is persisted; spent challenges are tracked on-chain.

use crate::{Error, Result};
use alloy_primitives::{keccak256, Address, Bytes, Signature, B256, U256};
use alloy_signer::SignerSync;
use alloy_signer_local::PrivateKeySigner;
use alloy_sol_types::SolValue;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Upper bound for a single pre-signing batch
pub const MAX_BATCH_SIZE: usize = 10_000;

/// Holder of the platform signing key
pub trait SigningKeyStore: Send + Sync {
    /// Address of the platform signer
    fn signer_address(&self) -> Address;

    /// Personal-sign a 32-byte digest, returning 65 bytes `r || s || v`
    fn sign_digest(&self, digest: &B256) -> Result<Bytes>;
}

/// In-process key store backed by a secp256k1 secret
pub struct LocalKeyStore {
    signer: PrivateKeySigner,
}

impl LocalKeyStore {
    /// Wrap an existing signer
    pub fn new(signer: PrivateKeySigner) -> Self {
        Self { signer }
    }

    /// Parse a 0x-hex 32-byte secret
    pub fn from_hex(secret: &str) -> Result<Self> {
        let signer = secret
            .trim()
            .parse::<PrivateKeySigner>()
            .map_err(|_| Error::Config("Signer key is not a valid secp256k1 secret".to_string()))?;
        Ok(Self { signer })
    }

    /// Fresh random key (tests and local tooling)
    pub fn random() -> Self {
        Self {
            signer: PrivateKeySigner::random(),
        }
    }
}

impl std::fmt::Debug for LocalKeyStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalKeyStore")
            .field("address", &self.signer.address())
            .finish_non_exhaustive()
    }
}

impl SigningKeyStore for LocalKeyStore {
    fn signer_address(&self) -> Address {
        self.signer.address()
    }

    fn sign_digest(&self, digest: &B256) -> Result<Bytes> {
        let signature = self
            .signer
            .sign_message_sync(digest.as_slice())
            .map_err(|e| Error::Signing(e.to_string()))?;
        Ok(Bytes::from(signature.as_bytes().to_vec()))
    }
}

/// Signed authorization artifact handed to a minting client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MintChallenge {
    /// Random single-use message
    pub message: String,
    /// Platform signature
    pub signature: Bytes,
}

/// Digest signed for a random challenge
pub fn challenge_digest(message: &str) -> B256 {
    keccak256(message.as_bytes())
}

/// Packed payload binding a challenge to an account and a count
pub fn bound_payload(account: Address, message: &str, mint_count: u64) -> Vec<u8> {
    (account, message.to_string(), U256::from(mint_count)).abi_encode_packed()
}

/// Digest signed for a bound challenge
pub fn bound_digest(account: Address, message: &str, mint_count: u64) -> B256 {
    keccak256(bound_payload(account, message, mint_count))
}

/// Recover the signer of a personal-message signature over `payload`.
///
/// Malformed signature bytes are reported as `InvalidSignature`, never panicked on.
pub fn recover_signer(payload: &[u8], signature: &[u8]) -> Result<Address> {
    let signature = Signature::try_from(signature)
        .map_err(|e| Error::InvalidSignature(format!("Malformed signature: {}", e)))?;
    signature
        .recover_address_from_msg(payload)
        .map_err(|e| Error::InvalidSignature(format!("Signer recovery failed: {}", e)))
}

/// Recover the signer of `payload` and require it to be `expected`
pub fn verify_recovered_signer(
    payload: &[u8],
    signature: &[u8],
    expected: &Address,
) -> Result<Address> {
    let recovered = recover_signer(payload, signature)?;
    if recovered != *expected {
        return Err(Error::InvalidSignature(format!(
            "Signature recovered to {}, expected {}",
            recovered, expected
        )));
    }
    Ok(recovered)
}

fn fresh_message() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Issues mint challenges with the platform key
#[derive(Clone)]
pub struct MintAuthorizer {
    key_store: Arc<dyn SigningKeyStore>,
}

impl MintAuthorizer {
    /// Create authorizer over a key store loaded at startup
    pub fn new(key_store: Arc<dyn SigningKeyStore>) -> Self {
        Self { key_store }
    }

    /// Address the sale contract must trust
    pub fn signer_address(&self) -> Address {
        self.key_store.signer_address()
    }

    /// Sign a fresh random message
    pub fn issue_random_challenge(&self) -> Result<MintChallenge> {
        let message = fresh_message();
        let signature = self.key_store.sign_digest(&challenge_digest(&message))?;
        tracing::debug!("Issued random challenge {}", message);
        Ok(MintChallenge { message, signature })
    }

    /// Sign `count` independent random messages
    pub fn issue_batch(&self, count: usize) -> Result<Vec<MintChallenge>> {
        if count > MAX_BATCH_SIZE {
            return Err(Error::Validation(format!(
                "Batch of {} exceeds maximum {}",
                count, MAX_BATCH_SIZE
            )));
        }

        let challenges = (0..count)
            .map(|_| self.issue_random_challenge())
            .collect::<Result<Vec<_>>>()?;

        tracing::info!("Issued batch of {} challenges", challenges.len());
        Ok(challenges)
    }

    /// Sign a fresh message bound to `account` and `mint_count`
    pub fn issue_bound_challenge(&self, account: Address, mint_count: u64) -> Result<MintChallenge> {
        if mint_count == 0 {
            return Err(Error::Validation("Mint count must be positive".to_string()));
        }

        let message = fresh_message();
        let signature = self
            .key_store
            .sign_digest(&bound_digest(account, &message, mint_count))?;

        tracing::debug!(
            "Issued bound challenge {} for {} x{}",
            message,
            account,
            mint_count
        );
        Ok(MintChallenge { message, signature })
    }
}

impl std::fmt::Debug for MintAuthorizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MintAuthorizer")
            .field("signer", &self.signer_address())
            .finish()
    }
}
