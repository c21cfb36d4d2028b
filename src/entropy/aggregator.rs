//! Entropy Aggregator.
//!
//! Combines multiple sources into one stream through a BLAKE3 pool.
//!
//! Finite sources are absorbed completely when they are registered, so a
//! seed file contributes all of its bytes exactly once. Infinite sources are
//! read on every request. Output is squeezed from a snapshot of the pool and
//! the pool is then advanced, so two requests never return the same bytes.
//! If any one contributing source is unpredictable, so is the output.

use alloc::boxed::Box;
use alloc::vec::Vec;
use zeroize::Zeroizing;
use super::{EntropyError, EntropySource};

const DOMAIN: &str = "evote-keyshare entropy aggregator v1";

/// Aggregator that mixes several sources into one.
pub struct EntropyAggregator {
    sources: Vec<Box<dyn EntropySource + Send + Sync>>,
    pool: blake3::Hasher,
    absorbed: usize,
    requests: u64,
}

impl EntropyAggregator {
    /// Creates a new empty aggregator.
    pub fn new() -> Self {
        Self {
            sources: Vec::new(),
            pool: blake3::Hasher::new_derive_key(DOMAIN),
            absorbed: 0,
            requests: 0,
        }
    }

    /// Adds a source.
    ///
    /// A finite source is drained into the pool immediately and closed; only
    /// infinite sources are kept for later requests.
    pub fn add_source<S>(&mut self, mut source: S) -> Result<(), EntropyError>
    where
        S: EntropySource + Send + Sync + 'static,
    {
        if source.is_finite() {
            let mut chunk = Zeroizing::new([0u8; 512]);
            let mut total = 0usize;
            loop {
                let n = source.read(&mut chunk[..])?;
                if n == 0 {
                    break;
                }
                self.pool.update(&chunk[..n]);
                total += n;
            }
            source.close();
            self.absorbed += 1;
            log::debug!("Absorbed {} bytes from finite source {}", total, source.name());
        } else {
            log::debug!("Registered infinite source {}", source.name());
            self.sources.push(Box::new(source));
        }
        Ok(())
    }

    /// Number of sources that contributed (absorbed plus live).
    pub fn source_count(&self) -> usize {
        self.absorbed + self.sources.len()
    }

    fn squeeze(&mut self, dest: &mut [u8], blocking: bool) -> Result<(), EntropyError> {
        if self.source_count() == 0 {
            return Err(EntropyError::InitFailed);
        }

        let mut input = Zeroizing::new(alloc::vec![0u8; dest.len()]);
        for source in &mut self.sources {
            if blocking {
                source.must_read(&mut input)?;
                self.pool.update(&input);
            } else {
                let n = source.read(&mut input)?;
                self.pool.update(&input[..n]);
            }
        }

        self.requests = self.requests.wrapping_add(1);
        self.pool.update(&self.requests.to_le_bytes());
        self.pool.update(&(dest.len() as u64).to_le_bytes());

        let mut reader = self.pool.clone().finalize_xof();
        reader.fill(dest);
        Ok(())
    }
}

impl Default for EntropyAggregator {
    fn default() -> Self {
        Self::new()
    }
}

impl EntropySource for EntropyAggregator {
    fn name(&self) -> &'static str {
        "Aggregator"
    }

    fn read(&mut self, dest: &mut [u8]) -> Result<usize, EntropyError> {
        self.squeeze(dest, false)?;
        Ok(dest.len())
    }

    fn must_read(&mut self, dest: &mut [u8]) -> Result<(), EntropyError> {
        self.squeeze(dest, true)
    }

    fn is_finite(&self) -> bool {
        false
    }

    fn close(&mut self) {
        for source in &mut self.sources {
            source.close();
        }
        self.sources.clear();
        self.pool.reset();
        self.absorbed = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entropy::custom::CustomSource;
    use crate::entropy::dprng::Dprng;

    #[test]
    fn test_empty_aggregator_fails() {
        let mut agg = EntropyAggregator::new();
        let mut buf = [0u8; 4];
        assert_eq!(agg.must_read(&mut buf), Err(EntropyError::InitFailed));
    }

    #[test]
    fn test_finite_source_absorbed_once() {
        let mut agg = EntropyAggregator::new();
        agg.add_source(CustomSource::from_bytes(&[0xAA; 64])).unwrap();
        assert_eq!(agg.source_count(), 1);

        let mut a = [0u8; 32];
        let mut b = [0u8; 32];
        agg.must_read(&mut a).unwrap();
        agg.must_read(&mut b).unwrap();
        assert_ne!(a, b);
        assert_ne!(a, [0xAA; 32]);
    }

    #[test]
    fn test_output_depends_on_every_source() {
        let mut plain = EntropyAggregator::new();
        plain.add_source(Dprng::new(b"seed")).unwrap();

        let mut mixed = EntropyAggregator::new();
        mixed.add_source(Dprng::new(b"seed")).unwrap();
        mixed.add_source(CustomSource::from_bytes(b"operator dice")).unwrap();

        let mut x = [0u8; 48];
        let mut y = [0u8; 48];
        plain.must_read(&mut x).unwrap();
        mixed.must_read(&mut y).unwrap();
        assert_ne!(x, y);
    }

    #[test]
    fn test_deterministic_for_same_inputs() {
        let build = || {
            let mut agg = EntropyAggregator::new();
            agg.add_source(CustomSource::from_bytes(b"fixed")).unwrap();
            agg.add_source(Dprng::new(b"replay")).unwrap();
            agg
        };
        let mut a = build();
        let mut b = build();
        let mut x = [0u8; 40];
        let mut y = [0u8; 40];
        a.must_read(&mut x).unwrap();
        b.must_read(&mut y).unwrap();
        assert_eq!(x, y);
    }
}
