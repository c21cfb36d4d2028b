//! Blob collection and key fingerprints.

use alloc::string::String;
use alloc::vec::Vec;

use super::ProtocolError;
use crate::sharing::ThresholdParameters;
use crate::token::{Cards, IndexedBlob, TokenError};

/// Reads one blob per token into the slot matching its share index.
///
/// The result has `parties` entries; entry `i` holds share `i + 1` or `None`
/// if no token produced it. Absent blobs and unreachable tokens are tolerated.
pub fn fetch_all_blobs(
    cards: &mut Cards,
    tparams: &ThresholdParameters,
    aid: &[u8],
    identifier: &[u8],
) -> Result<Vec<Option<IndexedBlob>>, ProtocolError> {
    let parties = tparams.parties() as usize;
    if cards.count() > parties {
        return Err(ProtocolError::InvalidParameters("more tokens than parties"));
    }

    let mut slots: Vec<Option<IndexedBlob>> = alloc::vec![None; parties];
    for slot in 0..cards.count() {
        let blob = match cards.get_indexed_blob(slot, aid, identifier) {
            Ok(blob) => blob,
            Err(e @ (TokenError::NotFound | TokenError::Communication | TokenError::AuthMismatch)) => {
                log::warn!("Token in slot {}: {}, share skipped", slot, e);
                continue;
            }
            Err(e) => return Err(ProtocolError::CardCommunication(e)),
        };
        let index = blob.index();
        if !tparams.is_valid_index(index) {
            return Err(ProtocolError::IndexMismatch(index));
        }
        let entry = &mut slots[index as usize - 1];
        if entry.is_some() {
            return Err(ProtocolError::DuplicateShare(index));
        }
        *entry = Some(blob);
    }
    Ok(slots)
}

/// The blobs actually present, in index order.
pub fn present(slots: Vec<Option<IndexedBlob>>) -> Vec<IndexedBlob> {
    slots.into_iter().flatten().collect()
}

/// Fails with `InsufficientShares` unless `available` reaches the threshold.
pub fn require_threshold(available: usize, tparams: &ThresholdParameters) -> Result<(), ProtocolError> {
    let required = tparams.threshold() as usize;
    if available < required {
        return Err(ProtocolError::InsufficientShares { available, required });
    }
    Ok(())
}

/// Short hex fingerprint of a public key for logs.
pub fn fingerprint(der: &[u8]) -> String {
    let digest = blake3::hash(der);
    hex::encode(&digest.as_bytes()[..8])
}
