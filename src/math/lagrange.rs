//! Lagrange basis coefficients at `x = 0`.
//!
//! Two flavours:
//! - [`basis_at_zero`] works modulo a prime group order and is used to
//!   reconstruct the ElGamal key.
//! - [`inverseless_basis_at_zero`] returns `Δ·λ_i(0)` as an exact integer for
//!   RSA signing, where `φ(n)` is unknown and no inverses are available.
//!   With `Δ = parties!` the result is always integral.

use num_bigint::{BigInt, BigUint};
use num_integer::Integer;
use num_traits::One;

use super::{mod_inverse, MathError};

fn check_member(indices: &[u32], i: u32) -> Result<(), MathError> {
    if indices.contains(&i) {
        Ok(())
    } else {
        Err(MathError::UnknownIndex)
    }
}

/// `λ_i(0) = Π_{j≠i} x_j / (x_j − x_i) mod m` over the points in `indices`.
pub fn basis_at_zero(indices: &[u32], i: u32, modulus: &BigUint) -> Result<BigUint, MathError> {
    check_member(indices, i)?;
    let m = BigInt::from(modulus.clone());
    let mut numerator = BigInt::one();
    let mut denominator = BigInt::one();
    for &j in indices.iter().filter(|&&j| j != i) {
        numerator *= BigInt::from(j);
        denominator *= BigInt::from(j) - BigInt::from(i);
    }
    let numerator = numerator.mod_floor(&m).to_biguint().ok_or(MathError::InvalidModulus)?;
    let denominator = denominator.mod_floor(&m).to_biguint().ok_or(MathError::InvalidModulus)?;
    Ok((numerator * mod_inverse(&denominator, modulus)?) % modulus)
}

/// `Δ·λ_i(0)` computed over the integers.
pub fn inverseless_basis_at_zero(indices: &[u32], i: u32, delta: &BigUint) -> Result<BigInt, MathError> {
    check_member(indices, i)?;
    let mut numerator = BigInt::from(delta.clone());
    let mut denominator = BigInt::one();
    for &j in indices.iter().filter(|&&j| j != i) {
        numerator *= BigInt::from(j);
        denominator *= BigInt::from(j) - BigInt::from(i);
    }
    let (quotient, remainder) = numerator.div_rem(&denominator);
    if remainder != BigInt::from(0) {
        return Err(MathError::NotInvertible);
    }
    Ok(quotient)
}
