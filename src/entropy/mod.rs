//! Entropy sources for key generation and signing.
//!
//! Every random value the protocols draw (polynomial coefficients, RSA prime
//! candidates, PSS salts, proof nonces) comes through the [`EntropySource`]
//! trait so the ceremony operator decides where randomness comes from.
//!
//! # Design
//! - **Best-effort vs blocking**: `read` returns whatever is available right
//!   now, `must_read` blocks until the buffer is full. Key generation only
//!   uses `must_read`.
//! - **Finite sources**: a finite source that runs dry fails with
//!   [`EntropyError::Exhausted`] instead of blocking forever.
//! - **Aggregation**: [`aggregator::EntropyAggregator`] mixes several sources
//!   so the output is as strong as the best of them.

pub mod aggregator;
pub mod custom;
pub mod dprng;
#[cfg(feature = "std")]
pub mod file;
pub mod os;

use core::fmt;

/// Error types for entropy collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntropyError {
    /// Source initialization failed (no sources, unreadable seed file).
    InitFailed,
    /// A finite source ran out of bytes.
    Exhausted,
    /// The underlying device or stream reported an error.
    ReadFailed,
    /// The source was closed and can no longer be read.
    Closed,
}

impl fmt::Display for EntropyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntropyError::InitFailed => write!(f, "entropy source could not be initialized"),
            EntropyError::Exhausted => write!(f, "finite entropy source is exhausted"),
            EntropyError::ReadFailed => write!(f, "entropy source read failed"),
            EntropyError::Closed => write!(f, "entropy source is closed"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for EntropyError {}

/// A trait for entropy sources.
pub trait EntropySource {
    /// Returns a short identifier for the source, used in log lines.
    fn name(&self) -> &'static str;

    /// Reads up to `dest.len()` bytes without blocking for more.
    ///
    /// Returns the number of bytes written to the front of `dest`. Zero means
    /// nothing is available at the moment (infinite source) or the source is
    /// drained (finite source).
    fn read(&mut self, dest: &mut [u8]) -> Result<usize, EntropyError>;

    /// Fills all of `dest`, blocking until enough entropy is available.
    fn must_read(&mut self, dest: &mut [u8]) -> Result<(), EntropyError> {
        let mut filled = 0;
        while filled < dest.len() {
            let n = self.read(&mut dest[filled..])?;
            if n == 0 {
                if self.is_finite() {
                    return Err(EntropyError::Exhausted);
                }
                wait_for_entropy();
            }
            filled += n;
        }
        Ok(())
    }

    /// Whether the source can run out of bytes.
    fn is_finite(&self) -> bool;

    /// Releases any underlying resources. Further reads fail.
    fn close(&mut self) {}
}

impl<S: EntropySource + ?Sized> EntropySource for &mut S {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn read(&mut self, dest: &mut [u8]) -> Result<usize, EntropyError> {
        (**self).read(dest)
    }

    fn must_read(&mut self, dest: &mut [u8]) -> Result<(), EntropyError> {
        (**self).must_read(dest)
    }

    fn is_finite(&self) -> bool {
        (**self).is_finite()
    }

    fn close(&mut self) {
        (**self).close()
    }
}

#[cfg(feature = "std")]
fn wait_for_entropy() {
    std::thread::sleep(std::time::Duration::from_millis(10));
}

#[cfg(not(feature = "std"))]
fn wait_for_entropy() {
    core::hint::spin_loop();
}
