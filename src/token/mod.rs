//! Share tokens.
//!
//! A token is a trustee's smart card (or a stand-in for one) holding key-share
//! blobs. Each blob is stored under an `(aid, identifier)` pair together with
//! its share index. Writes are write-once: a second store under the same
//! identifier is refused, which is how an interrupted ceremony is detected.
//!
//! # Components
//! - `memory`: in-process token, with failure injection for tests.
//! - `file`: token persisted to an encrypted file (requires `std`).
//! - `retry`: bounded retry policy for transient communication errors.
//! - `cards`: the ordered set of tokens a ceremony works with.

pub mod cards;
#[cfg(feature = "std")]
pub mod file;
pub mod memory;
pub mod retry;

pub use cards::Cards;
pub use retry::RetryPolicy;

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;
use zeroize::Zeroizing;

/// Errors reported by a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenError {
    /// Nothing stored under the identifier.
    NotFound,
    /// The identifier is already taken; blobs are write-once.
    AlreadyExists,
    /// The stored blob carries a different authorization tag.
    AuthMismatch,
    /// Transient failure talking to the token. Safe to retry.
    Communication,
    /// The PIN/password does not open the token.
    PinRejected,
    /// Persistent storage failed.
    Storage,
    /// Token contents could not be parsed.
    Corrupted,
    /// No token in the given slot.
    UnknownSlot(usize),
}

impl TokenError {
    /// Whether retrying the same call can succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, TokenError::Communication)
    }
}

impl fmt::Display for TokenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenError::NotFound => write!(f, "blob not found on token"),
            TokenError::AlreadyExists => write!(f, "blob already exists on token"),
            TokenError::AuthMismatch => write!(f, "authorization tag mismatch"),
            TokenError::Communication => write!(f, "token communication failure"),
            TokenError::PinRejected => write!(f, "token PIN rejected"),
            TokenError::Storage => write!(f, "token storage failure"),
            TokenError::Corrupted => write!(f, "token contents corrupted"),
            TokenError::UnknownSlot(slot) => write!(f, "no token in slot {}", slot),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for TokenError {}

/// A blob read back from a token with the share index it was stored under.
#[derive(Clone, PartialEq, Eq)]
pub struct IndexedBlob {
    index: u32,
    blob: Zeroizing<Vec<u8>>,
}

impl IndexedBlob {
    pub fn new(index: u32, blob: Vec<u8>) -> Self {
        Self { index, blob: Zeroizing::new(blob) }
    }

    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn blob(&self) -> &[u8] {
        &self.blob
    }
}

impl fmt::Debug for IndexedBlob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IndexedBlob")
            .field("index", &self.index)
            .field("length", &self.blob.len())
            .field("blob", &"***SENSITIVE***")
            .finish()
    }
}

/// Per-token persistence of key-share blobs.
pub trait ShareStore {
    /// Human-readable token identifier (card serial, file name).
    fn id(&self) -> &str;

    /// Stores `blob` with its share `index`. Fails with
    /// [`TokenError::AlreadyExists`] if `identifier` is taken.
    fn store_indexed_blob(&mut self, aid: &[u8], identifier: &[u8], blob: &[u8], index: u32) -> Result<(), TokenError>;

    /// Reads the blob stored under `identifier`; `aid` must match the tag it was stored with.
    fn get_indexed_blob(&mut self, aid: &[u8], identifier: &[u8]) -> Result<IndexedBlob, TokenError>;

    /// Erases a blob so a failed ceremony can be restarted. Returns whether anything was removed.
    fn remove_blob(&mut self, aid: &[u8], identifier: &[u8]) -> Result<bool, TokenError>;
}

/// What a token keeps per identifier.
#[derive(Clone)]
pub(crate) struct StoredBlob {
    pub(crate) aid: Vec<u8>,
    pub(crate) index: u32,
    pub(crate) blob: Zeroizing<Vec<u8>>,
}

impl StoredBlob {
    pub(crate) fn new(aid: &[u8], index: u32, blob: &[u8]) -> Self {
        Self { aid: aid.to_vec(), index, blob: Zeroizing::new(blob.to_vec()) }
    }

    pub(crate) fn read(&self, aid: &[u8]) -> Result<IndexedBlob, TokenError> {
        if self.aid != aid {
            return Err(TokenError::AuthMismatch);
        }
        Ok(IndexedBlob::new(self.index, self.blob.to_vec()))
    }
}

pub(crate) fn describe(identifier: &[u8]) -> String {
    match core::str::from_utf8(identifier) {
        Ok(s) => String::from(s),
        Err(_) => hex::encode(identifier),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indexed_blob_debug_redacted() {
        let b = IndexedBlob::new(3, alloc::vec![0x41; 16]);
        let s = alloc::format!("{:?}", b);
        assert!(s.contains("index: 3"));
        assert!(s.contains("***SENSITIVE***"));
        assert!(!s.contains("65"));
    }

    #[test]
    fn test_stored_blob_checks_aid() {
        let stored = StoredBlob::new(&[0x01], 2, b"share");
        assert_eq!(stored.read(&[0x02]), Err(TokenError::AuthMismatch));
        let ok = stored.read(&[0x01]).unwrap();
        assert_eq!(ok.index(), 2);
        assert_eq!(ok.blob(), b"share");
    }

    #[test]
    fn test_transient_classification() {
        assert!(TokenError::Communication.is_transient());
        assert!(!TokenError::NotFound.is_transient());
        assert!(!TokenError::AuthMismatch.is_transient());
    }
}
