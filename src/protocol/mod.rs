//! Threshold protocol layer.
//!
//! Drives key generation, decryption and signing against a set of share
//! tokens. Each protocol run reads what it needs from the tokens, works on
//! transient in-memory state, and drops that state before returning.
//!
//! # Components
//! - `generation`: Desmedt (ElGamal) and Shoup (RSA) key generation.
//! - `decryption`: decryption by reconstructing the ElGamal key.
//! - `signing`: Shoup threshold RSA-PSS signing.
//! - `util`: blob collection from tokens and key fingerprints.
//! - `ceremony`: full key ceremony and quorum rehearsal.
//!
//! # Retries
//! Token calls are retried inside [`crate::token::Cards`]. Nothing at this
//! layer retries.

pub mod ceremony;
pub mod decryption;
pub mod generation;
pub mod signing;
pub mod util;

pub use decryption::RecoverDecryption;
pub use generation::{DesmedtGeneration, ShoupGeneration};
pub use signing::ShoupSigning;

use alloc::vec::Vec;
use core::fmt;

use crate::codec::CodecError;
use crate::elgamal::{CiphertextCorrectness, Decryption};
use crate::entropy::EntropyError;
use crate::math::MathError;
use crate::sharing::ShareError;
use crate::token::TokenError;

/// Errors from running a threshold protocol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// Unusable parameters or configuration.
    InvalidParameters(&'static str),
    /// Fewer tokens than parties.
    InsufficientTokens { available: usize, required: usize },
    /// Fewer readable shares than the threshold.
    InsufficientShares { available: usize, required: usize },
    /// Shares come from different key ceremonies.
    ParameterMismatch,
    /// Arithmetic failure, e.g. a ciphertext outside the group.
    Arithmetic(MathError),
    /// Token failure that survived the retry policy.
    CardCommunication(TokenError),
    /// Quorum size is zero or larger than the holder list.
    InvalidQuorumSize { quorum: usize, holders: usize },
    /// Entropy source failed.
    Entropy(EntropyError),
    /// A share blob read from a token does not parse.
    MalformedShare(CodecError),
    /// Caller input (ciphertext, public key) does not parse.
    MalformedInput(CodecError),
    /// A share carries an index outside `1..=parties`.
    IndexMismatch(u32),
    /// Two shares carry the same index.
    DuplicateShare(u32),
    /// The combined signature does not verify.
    SignatureRejected,
    /// A rehearsal quorum failed; holds its share indices.
    QuorumRejected(Vec<u32>),
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProtocolError::InvalidParameters(reason) => write!(f, "invalid parameters: {}", reason),
            ProtocolError::InsufficientTokens { available, required } => {
                write!(f, "{} tokens available, {} required", available, required)
            }
            ProtocolError::InsufficientShares { available, required } => {
                write!(f, "{} shares available, {} required", available, required)
            }
            ProtocolError::ParameterMismatch => write!(f, "shares belong to different keys"),
            ProtocolError::Arithmetic(e) => write!(f, "arithmetic error: {}", e),
            ProtocolError::CardCommunication(e) => write!(f, "card communication error: {}", e),
            ProtocolError::InvalidQuorumSize { quorum, holders } => {
                write!(f, "quorum of {} cannot be drawn from {} holders", quorum, holders)
            }
            ProtocolError::Entropy(e) => write!(f, "entropy error: {}", e),
            ProtocolError::MalformedShare(e) => write!(f, "malformed share: {}", e),
            ProtocolError::MalformedInput(e) => write!(f, "malformed input: {}", e),
            ProtocolError::IndexMismatch(i) => write!(f, "share index {} out of range", i),
            ProtocolError::DuplicateShare(i) => write!(f, "share index {} appears twice", i),
            ProtocolError::SignatureRejected => write!(f, "combined signature does not verify"),
            ProtocolError::QuorumRejected(indices) => write!(f, "quorum {:?} failed rehearsal", indices),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ProtocolError {}

impl From<MathError> for ProtocolError {
    fn from(e: MathError) -> Self {
        match e {
            MathError::Entropy(inner) => ProtocolError::Entropy(inner),
            other => ProtocolError::Arithmetic(other),
        }
    }
}

impl From<EntropyError> for ProtocolError {
    fn from(e: EntropyError) -> Self {
        ProtocolError::Entropy(e)
    }
}

impl From<TokenError> for ProtocolError {
    fn from(e: TokenError) -> Self {
        ProtocolError::CardCommunication(e)
    }
}

impl From<ShareError> for ProtocolError {
    fn from(e: ShareError) -> Self {
        match e {
            ShareError::InvalidParameters { .. } => {
                ProtocolError::InvalidParameters("parties must be at least 2·threshold − 1")
            }
            ShareError::InvalidShareIndex(i) => ProtocolError::IndexMismatch(i),
            ShareError::DuplicateShareIndex(i) => ProtocolError::DuplicateShare(i),
            ShareError::InsufficientShares { available, required } => {
                ProtocolError::InsufficientShares { available, required }
            }
            ShareError::InvalidQuorumSize { quorum, holders } => {
                ProtocolError::InvalidQuorumSize { quorum, holders }
            }
            ShareError::Math(m) => m.into(),
        }
    }
}

/// Generates a key, leaves its shares on the tokens, returns the public key DER.
pub trait GenerationProtocol {
    fn generate_key(&mut self) -> Result<Vec<u8>, ProtocolError>;
}

/// Decrypts DER ciphertexts with a threshold key.
pub trait DecryptionProtocol {
    fn decrypt_message(&mut self, ciphertext: &[u8]) -> Result<Decryption, ProtocolError>;

    /// Classifies a ciphertext without decrypting it.
    fn check_correctness(&self, ciphertext: &[u8]) -> CiphertextCorrectness;
}

/// Produces RSA-PSS signatures with a threshold key.
pub trait SigningProtocol {
    /// Returns the signature as exactly `k` big-endian bytes.
    fn sign(&mut self, msg: &[u8]) -> Result<Vec<u8>, ProtocolError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_share_errors_map_to_protocol_errors() {
        let e: ProtocolError = ShareError::InsufficientShares { available: 2, required: 3 }.into();
        assert_eq!(e, ProtocolError::InsufficientShares { available: 2, required: 3 });

        let e: ProtocolError = ShareError::DuplicateShareIndex(4).into();
        assert_eq!(e, ProtocolError::DuplicateShare(4));

        let e: ProtocolError = ShareError::Math(MathError::Entropy(EntropyError::Exhausted)).into();
        assert_eq!(e, ProtocolError::Entropy(EntropyError::Exhausted));

        let e: ProtocolError = ShareError::InvalidParameters { parties: 2, threshold: 2 }.into();
        assert!(matches!(e, ProtocolError::InvalidParameters(_)));
    }

    #[test]
    fn test_display() {
        let e = ProtocolError::QuorumRejected(alloc::vec![1, 2, 5]);
        assert_eq!(alloc::format!("{}", e), "quorum [1, 2, 5] failed rehearsal");
        let e = ProtocolError::CardCommunication(TokenError::Communication);
        assert_eq!(alloc::format!("{}", e), "card communication error: token communication failure");
    }
}
