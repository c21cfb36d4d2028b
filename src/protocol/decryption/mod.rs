//! Threshold decryption.

pub mod recover;

pub use recover::RecoverDecryption;
