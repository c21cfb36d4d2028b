//! Secret reconstruction from shares.
//!
//! Lagrange interpolation at `x = 0` modulo a prime, over exactly the indices
//! that are present.
//!
//! # Security
//! - **Validation**: Checks for zero and duplicate indices.
//! - The result is returned as a [`SecretInt`].

use alloc::vec::Vec;
use num_bigint::BigUint;
use num_traits::Zero;

use super::{SecretShare, ShareError};
use crate::math::lagrange::basis_at_zero;
use crate::math::SecretInt;

/// Reconstructs `f(0) mod modulus` from a list of shares.
///
/// The caller decides how many shares are enough; this only needs one.
pub fn interpolate_at_zero(shares: &[SecretShare], modulus: &BigUint) -> Result<SecretInt, ShareError> {
    if shares.is_empty() {
        return Err(ShareError::InsufficientShares { available: 0, required: 1 });
    }

    // O(n^2) duplicate check; n is a handful of trustees.
    let indices: Vec<u32> = shares.iter().map(SecretShare::index).collect();
    for (pos, &i) in indices.iter().enumerate() {
        if i == 0 {
            return Err(ShareError::InvalidShareIndex(i));
        }
        if indices[pos + 1..].contains(&i) {
            return Err(ShareError::DuplicateShareIndex(i));
        }
    }

    let mut acc = SecretInt::new(BigUint::zero());
    for share in shares {
        let lambda = basis_at_zero(&indices, share.index(), modulus)?;
        let term = SecretInt::new(share.value() * lambda);
        acc = SecretInt::new((acc.expose() + term.expose()) % modulus);
    }
    Ok(acc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entropy::dprng::Dprng;
    use crate::math::polynomial::Polynomial;
    use crate::sharing::split::generate_shares;

    fn subsets(n: usize, k: usize) -> Vec<Vec<usize>> {
        if k == 0 {
            return alloc::vec![Vec::new()];
        }
        if n < k {
            return Vec::new();
        }
        let mut with_last: Vec<Vec<usize>> = subsets(n - 1, k - 1);
        for s in with_last.iter_mut() {
            s.push(n - 1);
        }
        let mut out = subsets(n - 1, k);
        out.extend(with_last);
        out
    }

    #[test]
    fn test_any_threshold_subset_reconstructs() {
        let mut rng = Dprng::new(b"reconstruct");
        let q = BigUint::parse_bytes(crate::math::group::tests::TEST_SAFE_PRIME.as_bytes(), 16).unwrap() >> 1u32;
        let f = Polynomial::random(2, &q, &mut rng).unwrap();
        let secret = f.constant().clone();
        let shares = generate_shares(&f, 5).unwrap();

        let combos = subsets(5, 3);
        assert_eq!(combos.len(), 10);
        for combo in combos {
            let subset: Vec<SecretShare> = combo.iter().map(|&i| shares[i].clone()).collect();
            let recovered = interpolate_at_zero(&subset, &q).unwrap();
            assert_eq!(recovered.expose(), &secret);
        }

        // Too few points give an unrelated value.
        let recovered = interpolate_at_zero(&shares[..2], &q).unwrap();
        assert_ne!(recovered.expose(), &secret);
    }

    #[test]
    fn test_reconstruct_errors() {
        let q = BigUint::from(101u32);
        let a = SecretShare::new(1, SecretInt::new(BigUint::from(5u32))).unwrap();
        let b = SecretShare::new(1, SecretInt::new(BigUint::from(9u32))).unwrap();

        assert_eq!(
            interpolate_at_zero(&[a.clone(), b], &q).err(),
            Some(ShareError::DuplicateShareIndex(1))
        );
        assert_eq!(
            interpolate_at_zero(&[], &q).err(),
            Some(ShareError::InsufficientShares { available: 0, required: 1 })
        );
        assert_eq!(interpolate_at_zero(&[a], &q).unwrap().expose(), &BigUint::from(5u32));
    }
}
