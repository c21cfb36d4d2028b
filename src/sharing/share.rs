//! Secret Share Definition.
//!
//! A share is a point `(i, f(i))` on the sharing polynomial.
//! - `index`: the holder number, `1..=parties`. Public.
//! - `value`: `f(i) mod m`. Secret.
//!
//! # Security
//! - The value is a [`SecretInt`] and is wiped on drop.
//! - `Debug` implementation redacts the actual value.

use core::fmt;
use num_bigint::BigUint;

use super::ShareError;
use crate::math::SecretInt;

/// One holder's point on the sharing polynomial.
#[derive(Clone, PartialEq, Eq)]
pub struct SecretShare {
    index: u32,
    value: SecretInt,
}

impl fmt::Debug for SecretShare {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretShare")
            .field("index", &self.index)
            .field("bits", &self.value.expose().bits())
            .field("value", &"***SENSITIVE***")
            .finish()
    }
}

impl SecretShare {
    /// Creates a share; the index must be non-zero.
    pub fn new(index: u32, value: SecretInt) -> Result<Self, ShareError> {
        if index == 0 {
            return Err(ShareError::InvalidShareIndex(index));
        }
        Ok(Self { index, value })
    }

    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn value(&self) -> &BigUint {
        self.value.expose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_share_creation() {
        let s = SecretShare::new(1, SecretInt::new(BigUint::from(1020u32))).unwrap();
        assert_eq!(s.index(), 1);
        assert_eq!(s.value(), &BigUint::from(1020u32));
    }

    #[test]
    fn test_share_validation() {
        assert_eq!(
            SecretShare::new(0, SecretInt::new(BigUint::from(1u32))),
            Err(ShareError::InvalidShareIndex(0))
        );
    }

    #[test]
    fn test_debug_redaction() {
        let s = SecretShare::new(5, SecretInt::new(BigUint::from(987_654_321u32))).unwrap();
        let debug_str = alloc::format!("{:?}", s);
        assert!(debug_str.contains("index: 5"));
        assert!(debug_str.contains("***SENSITIVE***"));
        assert!(!debug_str.contains("987654321"));
    }
}
