//! In-memory token.
//!
//! Behaves like a card that never leaves the terminal. Failure injection lets
//! tests simulate flaky readers (`with_transient_failures`) and absent cards
//! (`unreachable`).

use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;

use super::{IndexedBlob, ShareStore, StoredBlob, TokenError};

pub struct MemoryToken {
    id: String,
    files: BTreeMap<Vec<u8>, StoredBlob>,
    pending_failures: u32,
    unreachable: bool,
    calls: u32,
}

impl MemoryToken {
    pub fn new(id: &str) -> Self {
        Self {
            id: String::from(id),
            files: BTreeMap::new(),
            pending_failures: 0,
            unreachable: false,
            calls: 0,
        }
    }

    /// The next `count` calls fail with [`TokenError::Communication`].
    pub fn with_transient_failures(mut self, count: u32) -> Self {
        self.pending_failures = count;
        self
    }

    /// A token every call to which fails with [`TokenError::Communication`].
    pub fn unreachable(id: &str) -> Self {
        let mut token = Self::new(id);
        token.unreachable = true;
        token
    }

    /// Calls made so far, failed ones included.
    pub fn calls(&self) -> u32 {
        self.calls
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    fn connect(&mut self) -> Result<(), TokenError> {
        self.calls += 1;
        if self.unreachable {
            return Err(TokenError::Communication);
        }
        if self.pending_failures > 0 {
            self.pending_failures -= 1;
            return Err(TokenError::Communication);
        }
        Ok(())
    }
}

impl ShareStore for MemoryToken {
    fn id(&self) -> &str {
        &self.id
    }

    fn store_indexed_blob(&mut self, aid: &[u8], identifier: &[u8], blob: &[u8], index: u32) -> Result<(), TokenError> {
        self.connect()?;
        if self.files.contains_key(identifier) {
            return Err(TokenError::AlreadyExists);
        }
        self.files.insert(identifier.to_vec(), StoredBlob::new(aid, index, blob));
        Ok(())
    }

    fn get_indexed_blob(&mut self, aid: &[u8], identifier: &[u8]) -> Result<IndexedBlob, TokenError> {
        self.connect()?;
        self.files.get(identifier).ok_or(TokenError::NotFound)?.read(aid)
    }

    fn remove_blob(&mut self, aid: &[u8], identifier: &[u8]) -> Result<bool, TokenError> {
        self.connect()?;
        match self.files.get(identifier) {
            None => Ok(false),
            Some(stored) if stored.aid != aid => Err(TokenError::AuthMismatch),
            Some(_) => Ok(self.files.remove(identifier).is_some()),
        }
    }
}
