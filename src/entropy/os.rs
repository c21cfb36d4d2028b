//! Operating-system randomness.

use rand_core::{OsRng, RngCore};
use super::{EntropyError, EntropySource};

/// Infinite source backed by the OS CSPRNG (`getrandom`).
#[derive(Debug, Default, Clone, Copy)]
pub struct OsSource {
    closed: bool,
}

impl OsSource {
    pub fn new() -> Self {
        Self::default()
    }
}

impl EntropySource for OsSource {
    fn name(&self) -> &'static str {
        "OsRng"
    }

    fn read(&mut self, dest: &mut [u8]) -> Result<usize, EntropyError> {
        if self.closed {
            return Err(EntropyError::Closed);
        }
        OsRng.try_fill_bytes(dest).map_err(|_| EntropyError::ReadFailed)?;
        Ok(dest.len())
    }

    fn is_finite(&self) -> bool {
        false
    }

    fn close(&mut self) {
        self.closed = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_os_source_fills_buffer() {
        let mut os = OsSource::new();
        let mut a = [0u8; 32];
        let mut b = [0u8; 32];
        os.must_read(&mut a).unwrap();
        os.must_read(&mut b).unwrap();
        assert_ne!(a, b);
        assert!(!os.is_finite());
    }
}
