//! Quorum selection for post-ceremony rehearsal.
//!
//! Testing every `q`-subset of `n` holders is combinatorial. Instead three
//! quorums are picked, none of them the full set:
//! - the first `q` holders,
//! - the last `q` holders,
//! - the first `q − 1` holders plus the last one.
//!
//! Together they cover every holder whenever `2q ≥ n`. When `q == n` the only
//! quorum is everyone.

use alloc::vec::Vec;
use super::ShareError;

/// Picks test quorums of size `quorum_size` from `holders`, preserving order.
pub fn select_quorums<T: Clone>(holders: &[T], quorum_size: usize) -> Result<Vec<Vec<T>>, ShareError> {
    let n = holders.len();
    if quorum_size == 0 || quorum_size > n {
        return Err(ShareError::InvalidQuorumSize { quorum: quorum_size, holders: n });
    }
    if quorum_size == n {
        return Ok(alloc::vec![holders.to_vec()]);
    }

    let first = holders[..quorum_size].to_vec();
    let last = holders[n - quorum_size..].to_vec();
    let mut mixed = holders[..quorum_size - 1].to_vec();
    mixed.push(holders[n - 1].clone());

    Ok(alloc::vec![first, last, mixed])
}
