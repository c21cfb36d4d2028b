//! File and device backed entropy.
//!
//! Reads randomness from a regular file (finite, e.g. a dump from an offline
//! hardware RNG) or from a device/FIFO that keeps producing (infinite, e.g.
//! `/dev/random` or a TRNG pipe).

use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;

use super::{EntropyError, EntropySource};

/// Entropy read from a file or character device.
pub struct FileSource {
    file: Option<File>,
    finite: bool,
}

impl FileSource {
    /// Opens `path`. `finite` marks a source that can run dry.
    pub fn open<P: AsRef<Path>>(path: P, finite: bool) -> Result<Self, EntropyError> {
        let file = File::open(path.as_ref()).map_err(|e| {
            log::warn!("Cannot open entropy file {}: {}", path.as_ref().display(), e);
            EntropyError::InitFailed
        })?;
        Ok(Self { file: Some(file), finite })
    }
}

impl EntropySource for FileSource {
    fn name(&self) -> &'static str {
        "File"
    }

    fn read(&mut self, dest: &mut [u8]) -> Result<usize, EntropyError> {
        let file = self.file.as_mut().ok_or(EntropyError::Closed)?;
        loop {
            match file.read(dest) {
                Ok(n) => return Ok(n),
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) if e.kind() == ErrorKind::WouldBlock => return Ok(0),
                Err(_) => return Err(EntropyError::ReadFailed),
            }
        }
    }

    fn is_finite(&self) -> bool {
        self.finite
    }

    fn close(&mut self) {
        self.file = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_finite_file_source() {
        let dir = std::env::temp_dir().join("evote_keyshare_entropy_file");
        let _ = fs::create_dir_all(&dir);
        let path = dir.join("seed.bin");
        fs::write(&path, [0xA5u8; 48]).unwrap();

        let mut src = FileSource::open(&path, true).unwrap();
        let mut buf = [0u8; 32];
        src.must_read(&mut buf).unwrap();
        assert_eq!(buf, [0xA5; 32]);
        assert_eq!(src.must_read(&mut buf), Err(EntropyError::Exhausted));

        src.close();
        assert_eq!(src.read(&mut buf), Err(EntropyError::Closed));

        let _ = fs::remove_file(&path);
        let _ = fs::remove_dir(&dir);
    }

    #[test]
    fn test_missing_file() {
        let missing = std::env::temp_dir().join("evote_keyshare_no_such_entropy_file");
        assert_eq!(FileSource::open(missing, true).err(), Some(EntropyError::InitFailed));
    }
}
