//! Key ceremony configuration.
//!
//! Defines the settings a host application (CLI, ceremony tool) passes to the
//! protocol layer.

use alloc::vec::Vec;

use crate::protocol::ProtocolError;
use crate::rsa::MIN_MODULUS_BITS;
use crate::token::{Cards, RetryPolicy};

/// Settings shared by generation, decryption and signing.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct KeyConfig {
    /// Authorization tag every share blob is bound to.
    pub share_aid: Vec<u8>,

    /// Identifier of the ElGamal decryption share on each token.
    pub decryption_identifier: Vec<u8>,

    /// Identifier of the RSA signing share on each token.
    pub signing_identifier: Vec<u8>,

    /// RSA modulus size in bits.
    pub modulus_bits: u64,

    /// Attach a proof of correct decryption to every decryption.
    pub decrypt_with_proof: bool,

    /// Retry policy for token communication.
    pub retry: RetryPolicy,
}

impl Default for KeyConfig {
    fn default() -> Self {
        Self {
            share_aid: alloc::vec![0x01],
            decryption_identifier: b"DEC".to_vec(),
            signing_identifier: b"SIGN".to_vec(),
            modulus_bits: 3072,
            decrypt_with_proof: true,
            retry: RetryPolicy::default(),
        }
    }
}

impl KeyConfig {
    pub fn validate(&self) -> Result<(), ProtocolError> {
        if self.share_aid.is_empty() {
            return Err(ProtocolError::InvalidParameters("empty share authorization tag"));
        }
        if self.decryption_identifier.is_empty() || self.signing_identifier.is_empty() {
            return Err(ProtocolError::InvalidParameters("empty share identifier"));
        }
        if self.decryption_identifier == self.signing_identifier {
            return Err(ProtocolError::InvalidParameters("decryption and signing shares share an identifier"));
        }
        if self.modulus_bits < MIN_MODULUS_BITS {
            return Err(ProtocolError::InvalidParameters("RSA modulus too small"));
        }
        Ok(())
    }

    /// An empty token set using this configuration's retry policy.
    pub fn cards(&self) -> Cards {
        Cards::new(self.retry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::time::Duration;

    #[test]
    fn test_defaults_are_valid() {
        let config = KeyConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.retry.retries, 3);
        assert_eq!(config.retry.delay, Duration::from_secs(2));
        assert_eq!(config.cards().retry_policy(), config.retry);
    }

    #[test]
    fn test_rejects_unusable_settings() {
        let small = KeyConfig { modulus_bits: 512, ..KeyConfig::default() };
        assert!(small.validate().is_err());

        let clash = KeyConfig { signing_identifier: b"DEC".to_vec(), ..KeyConfig::default() };
        assert!(clash.validate().is_err());

        let no_aid = KeyConfig { share_aid: Vec::new(), ..KeyConfig::default() };
        assert!(no_aid.validate().is_err());
    }
}
