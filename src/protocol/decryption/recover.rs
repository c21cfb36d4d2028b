//! Decryption by reconstructing the ElGamal key.
//!
//! The election key is interpolated at zero from the shares present, using
//! the Lagrange basis over exactly those indices. The reconstructed key lives
//! only inside a [`RecoverDecryption`] and is wiped when it is dropped.

use alloc::vec::Vec;

use crate::elgamal::{Ciphertext, CiphertextCorrectness, Decryption, ElGamalPrivateKey, ElGamalPublicKey};
use crate::entropy::EntropySource;
use crate::math::SecretInt;
use crate::protocol::util::{fetch_all_blobs, fingerprint, present, require_threshold};
use crate::protocol::{DecryptionProtocol, ProtocolError};
use crate::sharing::{interpolate_at_zero, SecretShare, ThresholdParameters};
use crate::token::{Cards, IndexedBlob};

pub struct RecoverDecryption<'a, R: EntropySource + ?Sized> {
    key: ElGamalPrivateKey,
    with_proof: bool,
    rng: &'a mut R,
}

impl<'a, R: EntropySource + ?Sized> RecoverDecryption<'a, R> {
    /// Reconstructs the key from share blobs read off the tokens.
    pub fn new(
        blobs: &[IndexedBlob],
        tparams: &ThresholdParameters,
        with_proof: bool,
        rng: &'a mut R,
    ) -> Result<Self, ProtocolError> {
        require_threshold(blobs.len(), tparams)?;

        let mut params = None;
        let mut shares = Vec::with_capacity(blobs.len());
        for blob in blobs {
            if !tparams.is_valid_index(blob.index()) {
                return Err(ProtocolError::IndexMismatch(blob.index()));
            }
            let key = ElGamalPrivateKey::from_der(blob.blob()).map_err(ProtocolError::MalformedShare)?;
            match &params {
                None => params = Some(key.parameters().clone()),
                Some(p) if p != key.parameters() => return Err(ProtocolError::ParameterMismatch),
                Some(_) => {}
            }
            shares.push(SecretShare::new(blob.index(), SecretInt::new(key.secret().clone()))?);
        }
        let params = params.ok_or(ProtocolError::InsufficientShares {
            available: 0,
            required: tparams.threshold() as usize,
        })?;

        let x = interpolate_at_zero(&shares, params.group().order())?;
        drop(shares);
        let key = ElGamalPrivateKey::new(params, x)?;
        log::info!(
            "Election key reconstructed from {} shares, fingerprint {}",
            blobs.len(),
            fingerprint(&key.public_key().to_der())
        );
        Ok(Self { key, with_proof, rng })
    }

    /// Collects the shares stored under `(aid, identifier)` and reconstructs.
    pub fn from_cards(
        cards: &mut Cards,
        tparams: &ThresholdParameters,
        aid: &[u8],
        identifier: &[u8],
        with_proof: bool,
        rng: &'a mut R,
    ) -> Result<Self, ProtocolError> {
        let blobs = present(fetch_all_blobs(cards, tparams, aid, identifier)?);
        Self::new(&blobs, tparams, with_proof, rng)
    }

    pub fn public_key(&self) -> ElGamalPublicKey {
        self.key.public_key()
    }
}

impl<R: EntropySource + ?Sized> DecryptionProtocol for RecoverDecryption<'_, R> {
    fn decrypt_message(&mut self, ciphertext: &[u8]) -> Result<Decryption, ProtocolError> {
        let ct = Ciphertext::from_der(ciphertext).map_err(ProtocolError::MalformedInput)?;
        if self.with_proof {
            Ok(self.key.provable_decrypt(&ct, &mut *self.rng)?)
        } else {
            Ok(Decryption { plaintext: self.key.decrypt(&ct)?, proof: None })
        }
    }

    fn check_correctness(&self, ciphertext: &[u8]) -> CiphertextCorrectness {
        self.key.public_key().check_ciphertext(ciphertext)
    }
}
