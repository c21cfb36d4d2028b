//! Shoup-style RSA key generation.
//!
//! Draws `p`, `q` until `e = 65537` is invertible modulo `φ(n)`, then shares
//! `d = e⁻¹ mod φ(n)` with a random polynomial of degree `t − 1` over `φ(n)`.
//! `p`, `q`, `φ(n)` and `d` are wiped before the call returns; tokens receive
//! `(n, e, d_i)`.

use alloc::vec::Vec;
use num_bigint::BigUint;
use num_integer::Integer;
use num_traits::One;

use super::require_tokens;
use crate::entropy::EntropySource;
use crate::math::polynomial::Polynomial;
use crate::math::prime::random_prime;
use crate::math::{mod_inverse, phi_semiprime, SecretInt};
use crate::protocol::util::fingerprint;
use crate::protocol::{GenerationProtocol, ProtocolError};
use crate::rsa::{RsaKeyShare, RsaPublicKey, MIN_MODULUS_BITS, PUBLIC_EXPONENT};
use crate::sharing::{generate_shares, ThresholdParameters};
use crate::token::Cards;

pub struct ShoupGeneration<'a, R: EntropySource + ?Sized> {
    cards: &'a mut Cards,
    tparams: ThresholdParameters,
    modulus_bits: u64,
    rng: &'a mut R,
    aid: Vec<u8>,
    identifier: Vec<u8>,
}

impl<'a, R: EntropySource + ?Sized> ShoupGeneration<'a, R> {
    pub fn new(
        cards: &'a mut Cards,
        tparams: ThresholdParameters,
        modulus_bits: u64,
        rng: &'a mut R,
        aid: &[u8],
        identifier: &[u8],
    ) -> Result<Self, ProtocolError> {
        if modulus_bits < MIN_MODULUS_BITS {
            return Err(ProtocolError::InvalidParameters("RSA modulus too small"));
        }
        require_tokens(cards, &tparams)?;
        Ok(Self {
            cards,
            tparams,
            modulus_bits,
            rng,
            aid: aid.to_vec(),
            identifier: identifier.to_vec(),
        })
    }

    /// Returns `(n, φ(n))` with `gcd(e, φ(n)) = 1`.
    fn draw_modulus(&mut self, e: &BigUint) -> Result<(BigUint, SecretInt), ProtocolError> {
        let p_bits = self.modulus_bits / 2;
        let q_bits = self.modulus_bits - p_bits;
        let mut attempts = 0u32;
        loop {
            attempts += 1;
            let p = SecretInt::new(random_prime(&mut *self.rng, p_bits)?);
            let q = SecretInt::new(random_prime(&mut *self.rng, q_bits)?);
            if p == q {
                continue;
            }
            let phi = SecretInt::new(phi_semiprime(p.expose(), q.expose()));
            if phi.expose().gcd(e).is_one() {
                log::debug!("RSA modulus found after {} attempts", attempts);
                return Ok((p.expose() * q.expose(), phi));
            }
            log::debug!("e shares a factor with φ(n), drawing new primes");
        }
    }
}

impl<R: EntropySource + ?Sized> GenerationProtocol for ShoupGeneration<'_, R> {
    fn generate_key(&mut self) -> Result<Vec<u8>, ProtocolError> {
        let e = BigUint::from(PUBLIC_EXPONENT);
        let (n, phi) = self.draw_modulus(&e)?;
        let public = RsaPublicKey::new(n, e)?;

        let shares = {
            let d = SecretInt::new(mod_inverse(public.exponent(), phi.expose())?);
            let degree = self.tparams.threshold() as usize - 1;
            let polynomial = Polynomial::with_constant(degree, phi.expose(), d.expose(), &mut *self.rng)?;
            generate_shares(&polynomial, self.tparams.parties())?
        };
        drop(phi);

        for (slot, share) in shares.iter().enumerate() {
            let key = RsaKeyShare::new(public.clone(), SecretInt::new(share.value().clone()));
            let blob = key.to_der();
            self.cards
                .store_indexed_blob(slot, &self.aid, &self.identifier, &blob, share.index())?;
        }

        let der = public.to_der();
        log::info!(
            "RSA-{} signing key generated, {} shares stored, fingerprint {}",
            public.modulus_bits(),
            self.tparams,
            fingerprint(&der)
        );
        Ok(der)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entropy::dprng::Dprng;
    use crate::token::memory::MemoryToken;
    use crate::token::RetryPolicy;

    const AID: &[u8] = &[0x01];

    fn cards(count: usize) -> Cards {
        let mut cards = Cards::new(RetryPolicy::immediate(0));
        for i in 0..count {
            cards.add(MemoryToken::new(&alloc::format!("trustee-{}", i + 1)));
        }
        cards
    }

    #[test]
    fn test_generates_spki_and_shares() {
        let mut rng = Dprng::new(b"shoup-gen");
        let mut cards = cards(3);
        let tparams = ThresholdParameters::new(3, 2).unwrap();
        let der = ShoupGeneration::new(&mut cards, tparams, 768, &mut rng, AID, b"SIGN")
            .unwrap()
            .generate_key()
            .unwrap();
        let public = RsaPublicKey::from_der(&der).unwrap();
        assert_eq!(public.modulus_bits(), 768);
        assert_eq!(public.exponent(), &BigUint::from(PUBLIC_EXPONENT));

        for slot in 0..3 {
            let blob = cards.get_indexed_blob(slot, AID, b"SIGN").unwrap();
            assert_eq!(blob.index(), slot as u32 + 1);
            let share = RsaKeyShare::from_der(blob.blob()).unwrap();
            assert_eq!(share.public_key(), &public);
        }
    }

    #[test]
    fn test_rejects_small_modulus() {
        let mut rng = Dprng::new(b"shoup-small");
        let mut cards = cards(3);
        let tparams = ThresholdParameters::new(3, 2).unwrap();
        let err = ShoupGeneration::new(&mut cards, tparams, 512, &mut rng, AID, b"SIGN").err();
        assert!(matches!(err, Some(ProtocolError::InvalidParameters(_))));
    }

    #[test]
    fn test_insufficient_tokens_before_any_io() {
        let mut rng = Dprng::new(b"shoup-few");
        let mut cards = cards(2);
        let tparams = ThresholdParameters::new(3, 2).unwrap();
        let err = ShoupGeneration::new(&mut cards, tparams, 768, &mut rng, AID, b"SIGN").err();
        assert_eq!(err, Some(ProtocolError::InsufficientTokens { available: 2, required: 3 }));
    }
}
