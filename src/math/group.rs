//! Quadratic-residue subgroup of a safe-prime group.
//!
//! For a safe prime `p = 2q + 1` the quadratic residues mod `p` form a subgroup
//! of prime order `q`. ElGamal keys live in this subgroup. Messages are mapped
//! into it with the standard trick: `m` if `m` is a residue, `p − m` otherwise
//! (valid because `−1` is a non-residue when `p ≡ 3 mod 4`).

use num_bigint::BigUint;
use num_traits::{One, Zero};

use super::prime::{is_probable_prime, random_prime, MR_ROUNDS};
use super::{mod_inverse, MathError};
use crate::entropy::EntropySource;

/// Outcome of checking whether a value can be decoded as a plaintext.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decodable {
    Valid,
    /// Outside `[1, p)`.
    InvalidGroupElement,
    /// In range but not in the residue subgroup.
    InvalidResidue,
}

/// `Z_p^*` restricted to its order-`q` residue subgroup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModPGroup {
    p: BigUint,
    q: BigUint,
}

impl ModPGroup {
    /// Wraps a safe prime. Primality of `p` and `q` is checked.
    pub fn new(p: BigUint) -> Result<Self, MathError> {
        if p < BigUint::from(7u32) || !p.bit(0) || !p.bit(1) {
            return Err(MathError::InvalidModulus);
        }
        let q = (&p - 1u32) >> 1u32;
        if !is_probable_prime(&p, MR_ROUNDS) || !is_probable_prime(&q, MR_ROUNDS) {
            return Err(MathError::InvalidModulus);
        }
        Ok(Self { p, q })
    }

    /// Wraps a modulus read back from a key blob the ceremony produced.
    ///
    /// Only the shape is checked; primality was established when the group
    /// was first created.
    pub fn from_trusted(p: BigUint) -> Result<Self, MathError> {
        if p < BigUint::from(7u32) || !p.bit(0) || !p.bit(1) {
            return Err(MathError::InvalidModulus);
        }
        let q = (&p - 1u32) >> 1u32;
        Ok(Self { p, q })
    }

    /// Searches for a `bits`-bit safe prime, giving up after `tries` candidates.
    pub fn generate<R: EntropySource + ?Sized>(
        bits: u64,
        rng: &mut R,
        tries: usize,
    ) -> Result<Self, MathError> {
        for attempt in 0..tries {
            let q = random_prime(rng, bits - 1)?;
            let p: BigUint = (&q << 1u32) + 1u32;
            if is_probable_prime(&p, MR_ROUNDS) {
                log::debug!("Safe prime found after {} candidates", attempt + 1);
                return Ok(Self { p, q });
            }
        }
        Err(MathError::SearchExhausted)
    }

    /// The prime modulus `p`.
    pub fn modulus(&self) -> &BigUint {
        &self.p
    }

    /// The subgroup order `q = (p − 1) / 2`.
    pub fn order(&self) -> &BigUint {
        &self.q
    }

    /// Byte length of a padded plaintext block.
    pub fn message_len(&self) -> usize {
        super::byte_len(&self.q)
    }

    /// `0 < x < p`.
    pub fn is_element(&self, x: &BigUint) -> bool {
        !x.is_zero() && x < &self.p
    }

    /// Euler's criterion: `x^q ≡ 1 (mod p)`.
    pub fn is_residue(&self, x: &BigUint) -> bool {
        self.is_element(x) && x.modpow(&self.q, &self.p).is_one()
    }

    /// A usable generator: a residue other than 1.
    pub fn is_generator(&self, g: &BigUint) -> bool {
        !g.is_one() && self.is_residue(g)
    }

    pub fn pow(&self, base: &BigUint, exp: &BigUint) -> BigUint {
        base.modpow(exp, &self.p)
    }

    pub fn mul(&self, a: &BigUint, b: &BigUint) -> BigUint {
        (a * b) % &self.p
    }

    /// `a / b mod p`.
    pub fn div(&self, a: &BigUint, b: &BigUint) -> Result<BigUint, MathError> {
        Ok(self.mul(a, &mod_inverse(b, &self.p)?))
    }

    /// Maps `1 ≤ m ≤ q` into the residue subgroup.
    pub fn encode(&self, m: &BigUint) -> Result<BigUint, MathError> {
        if m.is_zero() || m > &self.q {
            return Err(MathError::MessageTooLong);
        }
        if self.is_residue(m) {
            Ok(m.clone())
        } else {
            Ok(&self.p - m)
        }
    }

    /// Inverse of [`ModPGroup::encode`].
    pub fn decode(&self, x: &BigUint) -> Result<BigUint, MathError> {
        match self.decodable(x) {
            Decodable::Valid => Ok(if x > &self.q { &self.p - x } else { x.clone() }),
            Decodable::InvalidGroupElement => Err(MathError::NotGroupElement),
            Decodable::InvalidResidue => Err(MathError::NotQuadraticResidue),
        }
    }

    pub fn decodable(&self, x: &BigUint) -> Decodable {
        if !self.is_element(x) {
            Decodable::InvalidGroupElement
        } else if !self.is_residue(x) {
            Decodable::InvalidResidue
        } else {
            Decodable::Valid
        }
    }
}
