//! Operator-supplied entropy.
//!
//! Lets the ceremony operator inject bytes from outside the machine (dice
//! rolls, a hardware token dump, keyboard timings). The buffer is finite and is
//! wiped as it is consumed.

use alloc::vec::Vec;
use zeroize::Zeroize;
use super::{EntropyError, EntropySource};

/// Source that buffers injected bytes.
pub struct CustomSource {
    buffer: Vec<u8>,
    closed: bool,
}

impl CustomSource {
    /// Creates an empty source.
    pub fn new() -> Self {
        Self { buffer: Vec::new(), closed: false }
    }

    /// Creates a source pre-loaded with `bytes`.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let mut source = Self::new();
        source.add_bytes(bytes);
        source
    }

    /// Appends bytes to the pool.
    pub fn add_bytes(&mut self, bytes: &[u8]) {
        self.buffer.extend_from_slice(bytes);
    }

    /// Bytes still available.
    pub fn remaining(&self) -> usize {
        self.buffer.len()
    }
}

impl Default for CustomSource {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for CustomSource {
    fn drop(&mut self) {
        self.buffer.zeroize();
    }
}

impl EntropySource for CustomSource {
    fn name(&self) -> &'static str {
        "CustomInput"
    }

    fn read(&mut self, dest: &mut [u8]) -> Result<usize, EntropyError> {
        if self.closed {
            return Err(EntropyError::Closed);
        }
        let n = dest.len().min(self.buffer.len());
        dest[..n].copy_from_slice(&self.buffer[..n]);
        self.buffer[..n].zeroize();
        self.buffer.drain(..n);
        Ok(n)
    }

    fn is_finite(&self) -> bool {
        true
    }

    fn close(&mut self) {
        self.buffer.zeroize();
        self.closed = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_custom_source() {
        let mut source = CustomSource::new();
        source.add_bytes(&[0x01, 0x02, 0x03, 0x04]);

        let mut buf = [0u8; 2];
        assert_eq!(source.read(&mut buf), Ok(2));
        assert_eq!(buf, [0x01, 0x02]);

        let mut big = [0u8; 4];
        assert_eq!(source.read(&mut big), Ok(2));
        assert_eq!(&big[..2], &[0x03, 0x04]);

        assert_eq!(source.read(&mut buf), Ok(0));
        assert_eq!(source.must_read(&mut buf), Err(EntropyError::Exhausted));
    }

    #[test]
    fn test_closed_source_rejects_reads() {
        let mut source = CustomSource::from_bytes(&[9; 8]);
        source.close();
        assert_eq!(source.remaining(), 0);
        let mut buf = [0u8; 1];
        assert_eq!(source.read(&mut buf), Err(EntropyError::Closed));
    }
}
