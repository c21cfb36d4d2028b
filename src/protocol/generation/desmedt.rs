//! Desmedt-style ElGamal key generation.
//!
//! The election key `x = f(0)` of a random polynomial `f` of degree `t − 1`
//! over the group order is never stored: each token receives `f(i)` packaged
//! as a standalone private key, and only `g^x` leaves the call.

use alloc::vec::Vec;

use super::require_tokens;
use crate::elgamal::{ElGamalParameters, ElGamalPrivateKey, ElGamalPublicKey};
use crate::entropy::EntropySource;
use crate::math::polynomial::Polynomial;
use crate::math::SecretInt;
use crate::protocol::util::fingerprint;
use crate::protocol::{GenerationProtocol, ProtocolError};
use crate::sharing::{generate_shares, ThresholdParameters};
use crate::token::Cards;

pub struct DesmedtGeneration<'a, R: EntropySource + ?Sized> {
    cards: &'a mut Cards,
    params: ElGamalParameters,
    tparams: ThresholdParameters,
    rng: &'a mut R,
    aid: Vec<u8>,
    identifier: Vec<u8>,
}

impl<'a, R: EntropySource + ?Sized> DesmedtGeneration<'a, R> {
    /// Fails with `InsufficientTokens` unless every party has a token.
    pub fn new(
        cards: &'a mut Cards,
        params: ElGamalParameters,
        tparams: ThresholdParameters,
        rng: &'a mut R,
        aid: &[u8],
        identifier: &[u8],
    ) -> Result<Self, ProtocolError> {
        require_tokens(cards, &tparams)?;
        Ok(Self {
            cards,
            params,
            tparams,
            rng,
            aid: aid.to_vec(),
            identifier: identifier.to_vec(),
        })
    }
}

impl<R: EntropySource + ?Sized> GenerationProtocol for DesmedtGeneration<'_, R> {
    fn generate_key(&mut self) -> Result<Vec<u8>, ProtocolError> {
        let group = self.params.group();
        let degree = self.tparams.threshold() as usize - 1;

        let (shares, y) = {
            let polynomial = Polynomial::random(degree, group.order(), &mut *self.rng)?;
            let shares = generate_shares(&polynomial, self.tparams.parties())?;
            let y = group.pow(self.params.generator(), polynomial.constant());
            (shares, y)
        };

        for (slot, share) in shares.iter().enumerate() {
            let key = ElGamalPrivateKey::new(self.params.clone(), SecretInt::new(share.value().clone()))?;
            let blob = key.to_der();
            self.cards
                .store_indexed_blob(slot, &self.aid, &self.identifier, &blob, share.index())?;
        }

        let public = ElGamalPublicKey::new(self.params.clone(), y)?;
        let der = public.to_der();
        log::info!(
            "ElGamal key for {} generated, {} shares stored, fingerprint {}",
            self.params.election_id(),
            self.tparams,
            fingerprint(&der)
        );
        Ok(der)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elgamal::tests::test_params;
    use crate::entropy::dprng::Dprng;
    use crate::sharing::{interpolate_at_zero, SecretShare};
    use crate::token::memory::MemoryToken;
    use crate::token::{RetryPolicy, TokenError};

    const AID: &[u8] = &[0x01];

    fn cards(count: usize) -> Cards {
        let mut cards = Cards::new(RetryPolicy::immediate(2));
        for i in 0..count {
            cards.add(MemoryToken::new(&alloc::format!("trustee-{}", i + 1)));
        }
        cards
    }

    #[test]
    fn test_shares_reconstruct_public_key() {
        let mut rng = Dprng::new(b"desmedt");
        let mut cards = cards(5);
        let tparams = ThresholdParameters::new(5, 3).unwrap();
        let der = DesmedtGeneration::new(&mut cards, test_params(), tparams, &mut rng, AID, b"DEC")
            .unwrap()
            .generate_key()
            .unwrap();
        let public = ElGamalPublicKey::from_der(&der).unwrap();

        let mut shares = Vec::new();
        for slot in [0usize, 2, 4] {
            let blob = cards.get_indexed_blob(slot, AID, b"DEC").unwrap();
            assert_eq!(blob.index(), slot as u32 + 1);
            let key = ElGamalPrivateKey::from_der(blob.blob()).unwrap();
            assert_eq!(key.parameters(), public.parameters());
            shares.push(SecretShare::new(blob.index(), SecretInt::new(key.secret().clone())).unwrap());
        }
        let group = public.parameters().group();
        let x = interpolate_at_zero(&shares, group.order()).unwrap();
        assert_eq!(&group.pow(public.parameters().generator(), x.expose()), public.key());
    }

    #[test]
    fn test_insufficient_tokens() {
        let mut rng = Dprng::new(b"desmedt-few");
        let mut cards = cards(4);
        let tparams = ThresholdParameters::new(5, 3).unwrap();
        let err = DesmedtGeneration::new(&mut cards, test_params(), tparams, &mut rng, AID, b"DEC").err();
        assert_eq!(err, Some(ProtocolError::InsufficientTokens { available: 4, required: 5 }));
    }

    #[test]
    fn test_second_ceremony_refused() {
        let mut rng = Dprng::new(b"desmedt-twice");
        let mut cards = cards(3);
        let tparams = ThresholdParameters::new(3, 2).unwrap();
        DesmedtGeneration::new(&mut cards, test_params(), tparams, &mut rng, AID, b"DEC")
            .unwrap()
            .generate_key()
            .unwrap();
        let again = DesmedtGeneration::new(&mut cards, test_params(), tparams, &mut rng, AID, b"DEC")
            .unwrap()
            .generate_key();
        assert_eq!(again, Err(ProtocolError::CardCommunication(TokenError::AlreadyExists)));
    }
}
