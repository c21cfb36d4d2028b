//! Threshold secret sharing over big-integer rings.
//!
//! Shamir sharing of a secret `s` modulo `m` (the ElGamal group order or
//! `φ(n)` for RSA): a random polynomial `f` of degree `t − 1` with `f(0) = s`
//! is evaluated at `1..=n`, and any `t` points determine `f(0)` again.
//!
//! # Components
//! - `params`: validated `(parties, threshold)` pairs.
//! - `share`: a single `(index, value)` point.
//! - `split`: share generation.
//! - `reconstruct`: Lagrange interpolation at zero.
//! - `quorum`: test-quorum selection over any holder type.
//!
//! # Security
//! - Share values and polynomial coefficients are zeroized on drop.
//! - `Debug` output redacts share values.

pub mod params;
pub mod quorum;
pub mod reconstruct;
pub mod share;
pub mod split;

pub use params::ThresholdParameters;
pub use quorum::select_quorums;
pub use reconstruct::interpolate_at_zero;
pub use share::SecretShare;
pub use split::generate_shares;

use core::fmt;
use crate::math::MathError;

/// Errors for secret sharing operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShareError {
    /// `parties` is zero, `threshold` is zero, or `parties < 2·threshold − 1`.
    InvalidParameters { parties: u32, threshold: u32 },
    /// Share index is zero or beyond the number of parties.
    InvalidShareIndex(u32),
    /// Two shares carry the same index.
    DuplicateShareIndex(u32),
    /// Not enough shares to reconstruct.
    InsufficientShares { available: usize, required: usize },
    /// Quorum size is zero or larger than the holder list.
    InvalidQuorumSize { quorum: usize, holders: usize },
    /// Arithmetic failure during interpolation.
    Math(MathError),
}

impl fmt::Display for ShareError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShareError::InvalidParameters { parties, threshold } => write!(
                f,
                "invalid threshold parameters: {} parties, threshold {}",
                parties, threshold
            ),
            ShareError::InvalidShareIndex(i) => write!(f, "invalid share index {}", i),
            ShareError::DuplicateShareIndex(i) => write!(f, "duplicate share index {}", i),
            ShareError::InsufficientShares { available, required } => write!(
                f,
                "{} shares available, {} required",
                available, required
            ),
            ShareError::InvalidQuorumSize { quorum, holders } => write!(
                f,
                "quorum of {} cannot be drawn from {} holders",
                quorum, holders
            ),
            ShareError::Math(e) => write!(f, "{}", e),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ShareError {}

impl From<MathError> for ShareError {
    fn from(e: MathError) -> Self {
        ShareError::Math(e)
    }
}
