//! The ordered collection of tokens taking part in a ceremony.
//!
//! Slot `i` is the `i`-th token added. Every call goes through the retry
//! policy, so a flaky reader is retried while a missing blob is not.

use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;

use super::{describe, IndexedBlob, RetryPolicy, ShareStore, TokenError};

pub struct Cards {
    tokens: Vec<Box<dyn ShareStore>>,
    retry: RetryPolicy,
}

impl Cards {
    pub fn new(retry: RetryPolicy) -> Self {
        Self { tokens: Vec::new(), retry }
    }

    /// Appends a token; returns its slot.
    pub fn add<S: ShareStore + 'static>(&mut self, token: S) -> usize {
        log::debug!("Token {} inserted in slot {}", token.id(), self.tokens.len());
        self.tokens.push(Box::new(token));
        self.tokens.len() - 1
    }

    /// Swaps the token in `slot`, returning the one taken out.
    pub fn replace(&mut self, slot: usize, token: Box<dyn ShareStore>) -> Result<Box<dyn ShareStore>, TokenError> {
        let current = self.tokens.get_mut(slot).ok_or(TokenError::UnknownSlot(slot))?;
        Ok(core::mem::replace(current, token))
    }

    pub fn count(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn token_id(&self, slot: usize) -> Option<&str> {
        self.tokens.get(slot).map(|t| t.id())
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    fn slot(&mut self, slot: usize) -> Result<(&mut Box<dyn ShareStore>, String), TokenError> {
        let token = self.tokens.get_mut(slot).ok_or(TokenError::UnknownSlot(slot))?;
        let label = String::from(token.id());
        Ok((token, label))
    }

    pub fn store_indexed_blob(
        &mut self,
        slot: usize,
        aid: &[u8],
        identifier: &[u8],
        blob: &[u8],
        index: u32,
    ) -> Result<(), TokenError> {
        let retry = self.retry;
        let (token, label) = self.slot(slot)?;
        retry.run(&label, || token.store_indexed_blob(aid, identifier, blob, index))?;
        log::debug!("Token {}: stored {} (index {})", label, describe(identifier), index);
        Ok(())
    }

    pub fn get_indexed_blob(&mut self, slot: usize, aid: &[u8], identifier: &[u8]) -> Result<IndexedBlob, TokenError> {
        let retry = self.retry;
        let (token, label) = self.slot(slot)?;
        retry.run(&label, || token.get_indexed_blob(aid, identifier))
    }

    pub fn remove_blob(&mut self, slot: usize, aid: &[u8], identifier: &[u8]) -> Result<bool, TokenError> {
        let retry = self.retry;
        let (token, label) = self.slot(slot)?;
        let removed = retry.run(&label, || token.remove_blob(aid, identifier))?;
        if removed {
            log::info!("Token {}: removed {}", label, describe(identifier));
        }
        Ok(removed)
    }
}

impl Default for Cards {
    fn default() -> Self {
        Self::new(RetryPolicy::default())
    }
}
