//! Signer configuration
//!
//! The platform key is read once at startup and lives for the whole process. Rotating it
//! means restarting with a new value.

use crate::signer::{LocalKeyStore, MintAuthorizer};
use crate::{Error, Result};
use std::sync::Arc;
use zeroize::Zeroizing;

/// Environment variable holding the 0x-hex signer secret
pub const SIGNER_KEY_ENV: &str = "DROPMINT_SIGNER_KEY";

/// Signer key material as loaded from configuration
pub struct SignerConfig {
    secret: Zeroizing<String>,
}

impl SignerConfig {
    /// Wrap an explicit secret
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: Zeroizing::new(secret.into()),
        }
    }

    /// Read the secret from [`SIGNER_KEY_ENV`]
    pub fn from_env() -> Result<Self> {
        let secret = std::env::var(SIGNER_KEY_ENV)
            .map_err(|_| Error::Config(format!("{} is not set", SIGNER_KEY_ENV)))?;
        Ok(Self::new(secret))
    }

    /// Parse the secret into a key store
    pub fn into_key_store(self) -> Result<LocalKeyStore> {
        LocalKeyStore::from_hex(&self.secret)
    }

    /// Build an authorizer over this key
    pub fn into_authorizer(self) -> Result<MintAuthorizer> {
        let key_store = self.into_key_store()?;
        tracing::info!(
            "Loaded mint signer {}",
            crate::signer::SigningKeyStore::signer_address(&key_store)
        );
        Ok(MintAuthorizer::new(Arc::new(key_store)))
    }
}

impl std::fmt::Debug for SignerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SignerConfig(<redacted>)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "0x4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318";

    #[test]
    fn test_explicit_secret() {
        let auth = SignerConfig::new(SECRET).into_authorizer().unwrap();
        assert_eq!(
            auth.signer_address().to_checksum(None),
            "0x2c7536E3605D9C16a7a3D7b1898e529396a65c23"
        );
    }

    #[test]
    fn test_invalid_secret() {
        let result = SignerConfig::new("not-a-key").into_key_store();
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_debug_redacts() {
        let config = SignerConfig::new(SECRET);
        assert!(!format!("{:?}", config).contains("4c0883"));
    }
}
