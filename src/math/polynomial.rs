//! Sharing polynomials over `Z_m`.
//!
//! `f(x) = c[0] + c[1]*x + ... + c[k-1]*x^(k-1) mod m`. The constant term is the
//! shared secret; every coefficient is a [`SecretInt`], so dropping the
//! polynomial wipes it.

use alloc::vec::Vec;
use num_bigint::BigUint;
use num_traits::Zero;

use super::{random_below, MathError, SecretInt};
use crate::entropy::EntropySource;

/// A polynomial with private coefficients.
pub struct Polynomial {
    coefficients: Vec<SecretInt>,
    modulus: BigUint,
}

impl Polynomial {
    /// Uniformly random polynomial of `degree` (the constant term is random too).
    pub fn random<R: EntropySource + ?Sized>(
        degree: usize,
        modulus: &BigUint,
        rng: &mut R,
    ) -> Result<Self, MathError> {
        if modulus.is_zero() {
            return Err(MathError::InvalidModulus);
        }
        let mut coefficients = Vec::with_capacity(degree + 1);
        for _ in 0..=degree {
            coefficients.push(SecretInt::new(random_below(rng, modulus)?));
        }
        Ok(Self { coefficients, modulus: modulus.clone() })
    }

    /// Random polynomial of `degree` whose constant term is `constant`.
    pub fn with_constant<R: EntropySource + ?Sized>(
        degree: usize,
        modulus: &BigUint,
        constant: &BigUint,
        rng: &mut R,
    ) -> Result<Self, MathError> {
        if modulus.is_zero() {
            return Err(MathError::InvalidModulus);
        }
        let mut coefficients = Vec::with_capacity(degree + 1);
        coefficients.push(SecretInt::new(constant % modulus));
        for _ in 0..degree {
            coefficients.push(SecretInt::new(random_below(rng, modulus)?));
        }
        Ok(Self { coefficients, modulus: modulus.clone() })
    }

    /// Polynomial with explicit coefficients, lowest degree first.
    pub fn from_coefficients(modulus: &BigUint, coefficients: Vec<BigUint>) -> Result<Self, MathError> {
        if modulus.is_zero() || coefficients.is_empty() {
            return Err(MathError::InvalidModulus);
        }
        let coefficients = coefficients
            .into_iter()
            .map(|c| SecretInt::new(c % modulus))
            .collect();
        Ok(Self { coefficients, modulus: modulus.clone() })
    }

    pub fn degree(&self) -> usize {
        self.coefficients.len() - 1
    }

    pub fn modulus(&self) -> &BigUint {
        &self.modulus
    }

    /// The constant term `f(0)`.
    pub fn constant(&self) -> &BigUint {
        self.coefficients[0].expose()
    }

    /// Horner evaluation of `f(x) mod m`.
    pub fn evaluate(&self, x: &BigUint) -> SecretInt {
        let mut acc = BigUint::zero();
        for coefficient in self.coefficients.iter().rev() {
            acc = (acc * x + coefficient.expose()) % &self.modulus;
        }
        SecretInt::new(acc)
    }
}

impl core::fmt::Debug for Polynomial {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Polynomial")
            .field("degree", &self.degree())
            .field("coefficients", &"***SENSITIVE***")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entropy::dprng::Dprng;

    fn big(v: u64) -> BigUint {
        BigUint::from(v)
    }

    #[test]
    fn test_polynomial_eval() {
        // f(x) = 1 + 2x + 3x^2 mod 97
        let f = Polynomial::from_coefficients(&big(97), alloc::vec![big(1), big(2), big(3)]).unwrap();
        assert_eq!(f.degree(), 2);
        assert_eq!(f.evaluate(&big(0)).expose(), &big(1));
        assert_eq!(f.evaluate(&big(1)).expose(), &big(6));
        assert_eq!(f.evaluate(&big(2)).expose(), &big(17));
        // 1 + 20 + 300 = 321 = 3*97 + 30
        assert_eq!(f.evaluate(&big(10)).expose(), &big(30));
    }

    #[test]
    fn test_with_constant_keeps_secret() {
        let mut rng = Dprng::new(b"poly");
        let m = big(1_000_003);
        let f = Polynomial::with_constant(4, &m, &big(424_242), &mut rng).unwrap();
        assert_eq!(f.degree(), 4);
        assert_eq!(f.constant(), &big(424_242));
        assert_eq!(f.evaluate(&big(0)).expose(), &big(424_242));
    }

    #[test]
    fn test_random_coefficients_reduced() {
        let mut rng = Dprng::new(b"poly-random");
        let m = big(101);
        let f = Polynomial::random(3, &m, &mut rng).unwrap();
        assert!(f.constant() < &m);
        assert!(alloc::format!("{:?}", f).contains("***SENSITIVE***"));
        assert_eq!(Polynomial::random(3, &big(0), &mut rng).err(), Some(MathError::InvalidModulus));
    }
}
