//! Probabilistic primality testing and random prime generation.

use num_bigint::BigUint;
use num_traits::{One, Zero};
use zeroize::Zeroizing;

use super::MathError;
use crate::entropy::EntropySource;

const SMALL_PRIMES: [u32; 54] = [
    2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37, 41, 43, 47, 53, 59, 61, 67, 71, 73, 79, 83, 89, 97,
    101, 103, 107, 109, 113, 127, 131, 137, 139, 149, 151, 157, 163, 167, 173, 179, 181, 191, 193,
    197, 199, 211, 223, 227, 229, 233, 239, 241, 251,
];

/// Miller-Rabin rounds used for RSA and group primes.
pub const MR_ROUNDS: usize = 40;

/// Miller-Rabin with the first `rounds` small primes as witnesses, after trial division.
pub fn is_probable_prime(n: &BigUint, rounds: usize) -> bool {
    let two = BigUint::from(2u32);
    if n < &two {
        return false;
    }
    for &p in SMALL_PRIMES.iter() {
        if n == &BigUint::from(p) {
            return true;
        }
        if (n % p).is_zero() {
            return false;
        }
    }

    let n_minus_one = n - 1u32;
    let s = n_minus_one.trailing_zeros().unwrap_or(0);
    let d = &n_minus_one >> s;

    'witness: for &a in SMALL_PRIMES.iter().take(rounds.max(1)) {
        let mut x = BigUint::from(a).modpow(&d, n);
        if x.is_one() || x == n_minus_one {
            continue;
        }
        for _ in 1..s {
            x = x.modpow(&two, n);
            if x == n_minus_one {
                continue 'witness;
            }
            if x.is_one() {
                return false;
            }
        }
        return false;
    }
    true
}

/// Draws a random prime of exactly `bits` bits with the two top bits set.
///
/// Setting both top bits makes the product of two such primes exactly
/// `bits_p + bits_q` bits long.
pub fn random_prime<R: EntropySource + ?Sized>(rng: &mut R, bits: u64) -> Result<BigUint, MathError> {
    if bits < 16 {
        return Err(MathError::InvalidModulus);
    }
    let len = ((bits + 7) / 8) as usize;
    let excess = (len as u64) * 8 - bits;
    let mut buf = Zeroizing::new(alloc::vec![0u8; len]);
    loop {
        rng.must_read(&mut buf)?;
        buf[0] &= 0xFFu8 >> excess;
        let mut candidate = BigUint::from_bytes_be(&buf);
        candidate.set_bit(bits - 1, true);
        candidate.set_bit(bits - 2, true);
        candidate.set_bit(0, true);
        // Cheap screen first, full rounds only for survivors.
        if is_probable_prime(&candidate, 4) && is_probable_prime(&candidate, MR_ROUNDS) {
            return Ok(candidate);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entropy::dprng::Dprng;

    #[test]
    fn test_small_values() {
        let primes = [2u32, 3, 5, 97, 251, 257, 65537, 7919];
        let composites = [0u32, 1, 4, 9, 561, 1105, 65535, 7917];
        for p in primes {
            assert!(is_probable_prime(&BigUint::from(p), MR_ROUNDS), "{} is prime", p);
        }
        for c in composites {
            assert!(!is_probable_prime(&BigUint::from(c), MR_ROUNDS), "{} is composite", c);
        }
    }

    #[test]
    fn test_known_large_prime() {
        // 2^127 - 1
        let m127 = (BigUint::one() << 127u32) - 1u32;
        assert!(is_probable_prime(&m127, MR_ROUNDS));
        assert!(!is_probable_prime(&(&m127 * &m127), MR_ROUNDS));
    }

    #[test]
    fn test_random_prime_shape() {
        let mut rng = Dprng::new(b"prime-shape");
        let p = random_prime(&mut rng, 128).unwrap();
        assert_eq!(p.bits(), 128);
        assert!(p.bit(126));
        assert!(is_probable_prime(&p, MR_ROUNDS));
    }
}
