//! Threshold key management for e-voting.
//!
//! The election's ElGamal decryption key and its RSA signing key are split
//! across trustee tokens with Shamir sharing. Any `threshold` of `parties`
//! tokens can decrypt (by reconstructing the ElGamal key in memory) or sign
//! (by combining partial RSA-PSS signatures, Shoup style).
//!
//! # Layers
//! - `entropy`: randomness sources and their aggregation.
//! - `math`: number theory, polynomials, Lagrange bases, the ElGamal group.
//! - `codec`: DER encodings of keys, shares and ciphertexts.
//! - `sharing`: threshold parameters, share generation and reconstruction, quorums.
//! - `elgamal`, `rsa`: the key and ciphertext models.
//! - `token`: share storage on trustee tokens.
//! - `protocol`: key generation, decryption and signing across tokens.
//! - `config`: ceremony settings.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod codec;
pub mod config;
pub mod elgamal;
pub mod entropy;
pub mod math;
pub mod protocol;
pub mod rsa;
pub mod sharing;
pub mod token;

pub use config::KeyConfig;
pub use protocol::{DecryptionProtocol, GenerationProtocol, ProtocolError, SigningProtocol};
pub use sharing::ThresholdParameters;
