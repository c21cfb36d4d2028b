//! Share generation.
//!
//! # Security
//! - Evaluation happens on a borrowed [`Polynomial`]; the caller owns and drops it.
//! - Indices are 1-based, `x = 0` is never handed out.

use alloc::vec::Vec;
use num_bigint::BigUint;

use super::{SecretShare, ShareError};
use crate::math::polynomial::Polynomial;

/// Evaluates `polynomial` at `1..=count`; share `i` belongs to holder `i`.
pub fn generate_shares(polynomial: &Polynomial, count: u32) -> Result<Vec<SecretShare>, ShareError> {
    let mut shares = Vec::with_capacity(count as usize);
    for index in 1..=count {
        let value = polynomial.evaluate(&BigUint::from(index));
        shares.push(SecretShare::new(index, value)?);
    }
    Ok(shares)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_shares_basic() {
        // f(x) = 7 + 3x mod 11
        let f = Polynomial::from_coefficients(
            &BigUint::from(11u32),
            alloc::vec![BigUint::from(7u32), BigUint::from(3u32)],
        )
        .unwrap();
        let shares = generate_shares(&f, 4).unwrap();

        assert_eq!(shares.len(), 4);
        let values: Vec<u32> = shares
            .iter()
            .map(|s| u32::try_from(s.value()).unwrap())
            .collect();
        assert_eq!(values, alloc::vec![10, 2, 5, 8]);
        for (i, share) in shares.iter().enumerate() {
            assert_eq!(share.index(), i as u32 + 1);
        }
    }

    #[test]
    fn test_zero_count() {
        let f = Polynomial::from_coefficients(&BigUint::from(11u32), alloc::vec![BigUint::from(1u32)]).unwrap();
        assert!(generate_shares(&f, 0).unwrap().is_empty());
    }
}
