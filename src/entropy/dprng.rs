//! Deterministic pseudo-random generator.
//!
//! Expands a seed into an unbounded stream of SHA-256 blocks
//! `H(seed || counter)`. Used to replay a ceremony from a recorded seed and to
//! make tests reproducible. Never use a guessable seed for real keys.

use alloc::vec::Vec;
use sha2::{Digest, Sha256};
use zeroize::{Zeroize, ZeroizeOnDrop};
use super::{EntropyError, EntropySource};

const BLOCK_LEN: usize = 32;

/// Seeded SHA-256 counter-mode generator.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct Dprng {
    seed: Vec<u8>,
    counter: u64,
    block: [u8; BLOCK_LEN],
    used: usize,
}

impl Dprng {
    /// Creates a generator from raw seed bytes.
    pub fn new(seed: &[u8]) -> Self {
        Self { seed: seed.to_vec(), counter: 0, block: [0u8; BLOCK_LEN], used: BLOCK_LEN }
    }

    /// Seeds the generator with the digest of everything `source` yields.
    ///
    /// `source` must be finite; it is read until it runs dry.
    pub fn from_source<S: EntropySource + ?Sized>(source: &mut S) -> Result<Self, EntropyError> {
        if !source.is_finite() {
            return Err(EntropyError::InitFailed);
        }
        let mut hasher = Sha256::new();
        let mut chunk = [0u8; 1024];
        loop {
            let n = source.read(&mut chunk)?;
            if n == 0 {
                break;
            }
            hasher.update(&chunk[..n]);
        }
        chunk.zeroize();
        let seed = hasher.finalize();
        Ok(Self::new(&seed))
    }

    fn refill(&mut self) {
        let mut hasher = Sha256::new();
        hasher.update(&self.seed);
        hasher.update(self.counter.to_be_bytes());
        self.block.copy_from_slice(&hasher.finalize());
        self.counter = self.counter.wrapping_add(1);
        self.used = 0;
    }
}

impl EntropySource for Dprng {
    fn name(&self) -> &'static str {
        "Dprng"
    }

    fn read(&mut self, dest: &mut [u8]) -> Result<usize, EntropyError> {
        let mut written = 0;
        while written < dest.len() {
            if self.used == BLOCK_LEN {
                self.refill();
            }
            let n = (dest.len() - written).min(BLOCK_LEN - self.used);
            dest[written..written + n].copy_from_slice(&self.block[self.used..self.used + n]);
            self.used += n;
            written += n;
        }
        Ok(written)
    }

    fn is_finite(&self) -> bool {
        false
    }
}
