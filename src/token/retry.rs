//! Bounded retry for token communication.
//!
//! Card readers drop connections; a call that fails with a transient error is
//! repeated after a fixed delay, up to `retries` extra attempts. Any other
//! error is returned at once.

use core::time::Duration;
use super::TokenError;

/// Extra attempts after the first failure and the pause between them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RetryPolicy {
    pub retries: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self { retries: 3, delay: Duration::from_secs(2) }
    }
}

impl RetryPolicy {
    pub const fn new(retries: u32, delay: Duration) -> Self {
        Self { retries, delay }
    }

    /// Retries without pausing.
    pub const fn immediate(retries: u32) -> Self {
        Self { retries, delay: Duration::ZERO }
    }

    /// Runs `op`, retrying transient failures. `label` names the token in logs.
    pub fn run<T, F>(&self, label: &str, mut op: F) -> Result<T, TokenError>
    where
        F: FnMut() -> Result<T, TokenError>,
    {
        let mut attempt = 0u32;
        loop {
            match op() {
                Err(e) if e.is_transient() && attempt < self.retries => {
                    attempt += 1;
                    log::warn!(
                        "Token {}: {}, retrying ({}/{})",
                        label, e, attempt, self.retries
                    );
                    pause(self.delay);
                }
                other => return other,
            }
        }
    }
}

#[cfg(feature = "std")]
fn pause(delay: Duration) {
    if !delay.is_zero() {
        std::thread::sleep(delay);
    }
}

#[cfg(not(feature = "std"))]
fn pause(_delay: Duration) {}
