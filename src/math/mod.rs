//! Number theory for the threshold protocols.
//!
//! Big-integer helpers shared by the ElGamal and RSA code paths: factorials for
//! the inverse-less Lagrange basis, extended Euclid for Bézout coefficients,
//! modular inverses, exponentiation with signed exponents, uniform sampling
//! and the [`SecretInt`] wrapper that wipes private integers on drop.
//!
//! # Security
//! - No attempt is made at constant-time arithmetic.
//! - Private values live in [`SecretInt`] and are zeroized on drop.

pub mod group;
pub mod lagrange;
pub mod polynomial;
pub mod prime;

use core::fmt;
use alloc::vec::Vec;
use num_bigint::{BigInt, BigUint, Sign};
use num_integer::Integer;
use num_traits::{One, Signed, Zero};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::entropy::{EntropyError, EntropySource};

/// Errors from modular arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MathError {
    /// The value has no inverse modulo the given modulus.
    NotInvertible,
    /// A modulus or bound was zero (or otherwise unusable).
    InvalidModulus,
    /// Value is not an element of the group.
    NotGroupElement,
    /// Value is a group element but not a quadratic residue.
    NotQuadraticResidue,
    /// Plaintext does not fit the group.
    MessageTooLong,
    /// Decoded plaintext has broken padding.
    InvalidPadding,
    /// Prime or group search gave up.
    SearchExhausted,
    /// Interpolation point is not in the index set.
    UnknownIndex,
    /// Entropy source failed while sampling.
    Entropy(EntropyError),
}

impl fmt::Display for MathError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MathError::NotInvertible => write!(f, "value is not invertible"),
            MathError::InvalidModulus => write!(f, "invalid modulus"),
            MathError::NotGroupElement => write!(f, "value is not a group element"),
            MathError::NotQuadraticResidue => write!(f, "value is not a quadratic residue"),
            MathError::MessageTooLong => write!(f, "message does not fit the group"),
            MathError::InvalidPadding => write!(f, "invalid plaintext padding"),
            MathError::SearchExhausted => write!(f, "search for a suitable prime gave up"),
            MathError::UnknownIndex => write!(f, "index is not part of the interpolation set"),
            MathError::Entropy(e) => write!(f, "entropy failure: {}", e),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for MathError {}

impl From<EntropyError> for MathError {
    fn from(e: EntropyError) -> Self {
        MathError::Entropy(e)
    }
}

/// A private big integer that is wiped when dropped.
///
/// Deliberately has no `Display`; `Debug` is redacted.
#[derive(Clone, PartialEq, Eq)]
pub struct SecretInt(BigUint);

impl SecretInt {
    pub fn new(value: BigUint) -> Self {
        Self(value)
    }

    /// Borrows the value for arithmetic.
    pub fn expose(&self) -> &BigUint {
        &self.0
    }
}

impl From<BigUint> for SecretInt {
    fn from(value: BigUint) -> Self {
        Self(value)
    }
}

impl Zeroize for SecretInt {
    fn zeroize(&mut self) {
        wipe(&mut self.0);
    }
}

impl Drop for SecretInt {
    fn drop(&mut self) {
        self.zeroize();
    }
}

impl ZeroizeOnDrop for SecretInt {}

impl fmt::Debug for SecretInt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SecretInt").field(&"***SENSITIVE***").finish()
    }
}

/// Overwrites the digits of `value` in place and leaves it at zero.
pub fn wipe(value: &mut BigUint) {
    let words = value.iter_u32_digits().len();
    let zeros: Vec<u32> = alloc::vec![0u32; words];
    value.assign_from_slice(&zeros);
}

/// `n!`
pub fn factorial(n: u32) -> BigUint {
    (2..=n).fold(BigUint::one(), |acc, k| acc * k)
}

/// Extended Euclid: returns `(g, x, y)` with `a·x + b·y = g = gcd(a, b)`.
pub fn extended_gcd(a: &BigInt, b: &BigInt) -> (BigInt, BigInt, BigInt) {
    let (mut old_r, mut r) = (a.clone(), b.clone());
    let (mut old_s, mut s) = (BigInt::one(), BigInt::zero());
    let (mut old_t, mut t) = (BigInt::zero(), BigInt::one());
    while !r.is_zero() {
        let q = &old_r / &r;
        let next_r = &old_r - &q * &r;
        old_r = core::mem::replace(&mut r, next_r);
        let next_s = &old_s - &q * &s;
        old_s = core::mem::replace(&mut s, next_s);
        let next_t = &old_t - &q * &t;
        old_t = core::mem::replace(&mut t, next_t);
    }
    if old_r.is_negative() {
        (-old_r, -old_s, -old_t)
    } else {
        (old_r, old_s, old_t)
    }
}

/// `a⁻¹ mod m`.
pub fn mod_inverse(a: &BigUint, m: &BigUint) -> Result<BigUint, MathError> {
    if m.is_zero() {
        return Err(MathError::InvalidModulus);
    }
    let a = BigInt::from(a % m);
    let m_signed = BigInt::from(m.clone());
    let (g, x, _) = extended_gcd(&a, &m_signed);
    if !g.is_one() {
        return Err(MathError::NotInvertible);
    }
    to_unsigned(&x.mod_floor(&m_signed))
}

/// `base^exp mod m` for a signed exponent; negative exponents go through the inverse.
pub fn mod_pow_signed(base: &BigUint, exp: &BigInt, m: &BigUint) -> Result<BigUint, MathError> {
    if m.is_zero() {
        return Err(MathError::InvalidModulus);
    }
    let magnitude = exp.magnitude();
    match exp.sign() {
        Sign::Minus => Ok(mod_inverse(base, m)?.modpow(magnitude, m)),
        _ => Ok(base.modpow(magnitude, m)),
    }
}

/// Euler's totient of `p·q` for distinct primes.
pub fn phi_semiprime(p: &BigUint, q: &BigUint) -> BigUint {
    (p - 1u32) * (q - 1u32)
}

/// Samples uniformly from `[0, upper)` by rejection.
pub fn random_below<R: EntropySource + ?Sized>(rng: &mut R, upper: &BigUint) -> Result<BigUint, MathError> {
    if upper.is_zero() {
        return Err(MathError::InvalidModulus);
    }
    let bits = upper.bits();
    let len = ((bits + 7) / 8) as usize;
    let excess = (len as u64) * 8 - bits;
    let mut buf = zeroize::Zeroizing::new(alloc::vec![0u8; len]);
    loop {
        rng.must_read(&mut buf)?;
        buf[0] &= 0xFFu8 >> excess;
        let candidate = BigUint::from_bytes_be(&buf);
        if &candidate < upper {
            return Ok(candidate);
        }
    }
}

/// Samples uniformly from `[1, upper)`.
pub fn random_nonzero_below<R: EntropySource + ?Sized>(rng: &mut R, upper: &BigUint) -> Result<BigUint, MathError> {
    if upper <= &BigUint::one() {
        return Err(MathError::InvalidModulus);
    }
    loop {
        let candidate = random_below(rng, upper)?;
        if !candidate.is_zero() {
            return Ok(candidate);
        }
    }
}

/// Big-endian encoding left-padded to exactly `len` bytes.
pub fn to_fixed_bytes(value: &BigUint, len: usize) -> Option<Vec<u8>> {
    let raw = value.to_bytes_be();
    if value.is_zero() {
        return Some(alloc::vec![0u8; len]);
    }
    if raw.len() > len {
        return None;
    }
    let mut out = alloc::vec![0u8; len - raw.len()];
    out.extend_from_slice(&raw);
    Some(out)
}

/// Number of bytes needed for `value`.
pub fn byte_len(value: &BigUint) -> usize {
    ((value.bits() + 7) / 8) as usize
}

fn to_unsigned(value: &BigInt) -> Result<BigUint, MathError> {
    value.to_biguint().ok_or(MathError::NotInvertible)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entropy::dprng::Dprng;

    fn big(v: u64) -> BigUint {
        BigUint::from(v)
    }

    #[test]
    fn test_factorial() {
        assert_eq!(factorial(0), big(1));
        assert_eq!(factorial(1), big(1));
        assert_eq!(factorial(5), big(120));
        assert_eq!(factorial(20), big(2_432_902_008_176_640_000));
    }

    #[test]
    fn test_extended_gcd_bezout() {
        let e = BigInt::from(65537);
        let delta = BigInt::from(factorial(7));
        let (g, a, b) = extended_gcd(&e, &delta);
        assert!(g.is_one());
        assert_eq!(&a * &e + &b * &delta, BigInt::one());

        let (g, _, _) = extended_gcd(&BigInt::from(12), &BigInt::from(18));
        assert_eq!(g, BigInt::from(6));
    }

    #[test]
    fn test_mod_inverse() {
        assert_eq!(mod_inverse(&big(3), &big(11)), Ok(big(4)));
        assert_eq!(mod_inverse(&big(6), &big(9)), Err(MathError::NotInvertible));
        assert_eq!(mod_inverse(&big(6), &big(0)), Err(MathError::InvalidModulus));
    }

    #[test]
    fn test_mod_pow_signed() {
        let m = big(23);
        let neg = mod_pow_signed(&big(5), &BigInt::from(-3), &m).unwrap();
        let pos = mod_pow_signed(&big(5), &BigInt::from(3), &m).unwrap();
        assert_eq!((neg * pos) % &m, big(1));
        assert_eq!(mod_pow_signed(&big(5), &BigInt::zero(), &m), Ok(big(1)));
    }

    #[test]
    fn test_random_below_in_range() {
        let mut rng = Dprng::new(b"random_below");
        let upper = big(1000);
        for _ in 0..200 {
            assert!(random_below(&mut rng, &upper).unwrap() < upper);
        }
        assert!(!random_nonzero_below(&mut rng, &big(2)).unwrap().is_zero());
        assert_eq!(random_below(&mut rng, &big(0)), Err(MathError::InvalidModulus));
    }

    #[test]
    fn test_wipe_clears_value() {
        let mut v = (big(1) << 300u32) + big(12345);
        wipe(&mut v);
        assert!(v.is_zero());

        let mut s = SecretInt::new(big(99));
        s.zeroize();
        assert!(s.expose().is_zero());
        assert!(!alloc::format!("{:?}", SecretInt::new(big(424242))).contains("424242"));
    }

    #[test]
    fn test_fixed_bytes() {
        assert_eq!(to_fixed_bytes(&big(0x0102), 4), Some(alloc::vec![0, 0, 1, 2]));
        assert_eq!(to_fixed_bytes(&big(0x010203), 2), None);
        assert_eq!(to_fixed_bytes(&big(0), 2), Some(alloc::vec![0, 0]));
        assert_eq!(byte_len(&big(256)), 2);
    }
}
