//! ElGamal over the quadratic residues of a safe-prime group.
//!
//! The discrete-log key of the election lives here: parameters (group,
//! generator, election identifier), key pairs, ciphertexts, and decryption
//! with an optional proof of correct decryption. Private keys read back from
//! tokens are key *shares*; the same type holds the reconstructed key.
//!
//! # Security
//! - Private exponents are [`SecretInt`]s and are wiped on drop.
//! - `Debug` on private keys redacts the exponent.

pub mod plaintext;
pub mod proof;

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;
use num_bigint::BigUint;
use zeroize::Zeroizing;

use crate::codec::{CodecError, DerReader, DerWriter, OID_MODP_ELGAMAL};
use crate::entropy::EntropySource;
use crate::math::group::{Decodable, ModPGroup};
use crate::math::{random_below, random_nonzero_below, to_fixed_bytes, MathError, SecretInt};

pub use proof::DecryptionProof;

/// Group, generator and the election the key belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElGamalParameters {
    group: ModPGroup,
    generator: BigUint,
    election_id: String,
}

impl ElGamalParameters {
    /// Validates that `generator` generates the residue subgroup.
    pub fn new(group: ModPGroup, generator: BigUint, election_id: &str) -> Result<Self, MathError> {
        if !group.is_generator(&generator) {
            return Err(MathError::NotGroupElement);
        }
        Ok(Self { group, generator, election_id: String::from(election_id) })
    }

    /// Fresh safe-prime group of `bits` bits with a random generator.
    pub fn generate<R: EntropySource + ?Sized>(
        bits: u64,
        election_id: &str,
        rng: &mut R,
    ) -> Result<Self, MathError> {
        let group = ModPGroup::generate(bits, rng, 100_000)?;
        loop {
            let h = random_nonzero_below(rng, group.modulus())?;
            let generator = group.pow(&h, &BigUint::from(2u32));
            if group.is_generator(&generator) {
                return Self::new(group, generator, election_id);
            }
        }
    }

    pub fn group(&self) -> &ModPGroup {
        &self.group
    }

    pub fn generator(&self) -> &BigUint {
        &self.generator
    }

    pub fn election_id(&self) -> &str {
        &self.election_id
    }

    pub(crate) fn write_der(&self, w: &mut DerWriter) {
        w.sequence(|s| {
            s.oid(OID_MODP_ELGAMAL).sequence(|g| {
                g.integer(self.group.modulus())
                    .integer(&self.generator)
                    .utf8_string(&self.election_id);
            });
        });
    }

    pub(crate) fn read_der(r: &mut DerReader<'_>) -> Result<Self, CodecError> {
        let mut seq = r.sequence()?;
        seq.expect_oid(OID_MODP_ELGAMAL)?;
        let mut body = seq.sequence()?;
        let p = body.integer()?;
        let generator = body.integer()?;
        let election_id = body.utf8_string()?;
        body.finish()?;
        seq.finish()?;
        let group = ModPGroup::from_trusted(p).map_err(|_| CodecError::InvalidValue)?;
        Self::new(group, generator, &election_id).map_err(|_| CodecError::InvalidValue)
    }

    pub fn to_der(&self) -> Vec<u8> {
        let mut w = DerWriter::new();
        self.write_der(&mut w);
        w.finish()
    }

    pub fn from_der(der: &[u8]) -> Result<Self, CodecError> {
        let mut r = DerReader::new(der);
        let params = Self::read_der(&mut r)?;
        r.finish()?;
        Ok(params)
    }
}

/// `y = g^x`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElGamalPublicKey {
    params: ElGamalParameters,
    key: BigUint,
}

impl ElGamalPublicKey {
    pub fn new(params: ElGamalParameters, key: BigUint) -> Result<Self, MathError> {
        if !params.group().is_residue(&key) {
            return Err(MathError::NotGroupElement);
        }
        Ok(Self { params, key })
    }

    pub fn parameters(&self) -> &ElGamalParameters {
        &self.params
    }

    pub fn key(&self) -> &BigUint {
        &self.key
    }

    /// `SEQUENCE { parameters, INTEGER y }`
    pub fn to_der(&self) -> Vec<u8> {
        let mut w = DerWriter::new();
        w.sequence(|s| {
            self.params.write_der(s);
            s.integer(&self.key);
        });
        w.finish()
    }

    pub fn from_der(der: &[u8]) -> Result<Self, CodecError> {
        let mut r = DerReader::new(der);
        let mut seq = r.sequence()?;
        let params = ElGamalParameters::read_der(&mut seq)?;
        let key = seq.integer()?;
        seq.finish()?;
        r.finish()?;
        Self::new(params, key).map_err(|_| CodecError::InvalidValue)
    }

    /// Pads, encodes and encrypts `msg` under this key.
    pub fn encrypt<R: EntropySource + ?Sized>(&self, msg: &[u8], rng: &mut R) -> Result<Ciphertext, MathError> {
        let group = self.params.group();
        let block = plaintext::pad(msg, group.message_len())?;
        let encoded = group.encode(&BigUint::from_bytes_be(&block))?;
        let r = SecretInt::new(random_nonzero_below(rng, group.order())?);
        let blind = group.pow(&self.params.generator, r.expose());
        let blinded = group.mul(&encoded, &group.pow(&self.key, r.expose()));
        Ok(Ciphertext { blind, blinded })
    }

    /// Classifies a serialized ciphertext before attempting to decrypt it.
    pub fn check_ciphertext(&self, der: &[u8]) -> CiphertextCorrectness {
        match Ciphertext::from_der(der) {
            Ok(ct) => ct.correctness(self.params.group()),
            Err(_) => CiphertextCorrectness::Malformed,
        }
    }
}

/// `x`, either a key share or the reconstructed key.
pub struct ElGamalPrivateKey {
    params: ElGamalParameters,
    key: SecretInt,
}

impl fmt::Debug for ElGamalPrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ElGamalPrivateKey")
            .field("election_id", &self.params.election_id)
            .field("key", &"***SENSITIVE***")
            .finish()
    }
}

impl ElGamalPrivateKey {
    pub fn new(params: ElGamalParameters, key: SecretInt) -> Result<Self, MathError> {
        if key.expose() >= params.group().order() {
            return Err(MathError::NotGroupElement);
        }
        Ok(Self { params, key })
    }

    pub fn parameters(&self) -> &ElGamalParameters {
        &self.params
    }

    pub(crate) fn secret(&self) -> &BigUint {
        self.key.expose()
    }

    pub fn public_key(&self) -> ElGamalPublicKey {
        let y = self.params.group().pow(&self.params.generator, self.key.expose());
        ElGamalPublicKey { params: self.params.clone(), key: y }
    }

    /// `SEQUENCE { INTEGER 0, parameters, INTEGER x }`
    pub fn to_der(&self) -> Zeroizing<Vec<u8>> {
        let mut w = DerWriter::new();
        w.sequence(|s| {
            s.small_integer(0);
            self.params.write_der(s);
            s.integer(self.key.expose());
        });
        Zeroizing::new(w.finish())
    }

    pub fn from_der(der: &[u8]) -> Result<Self, CodecError> {
        let mut r = DerReader::new(der);
        let mut seq = r.sequence()?;
        if seq.small_integer()? != 0 {
            return Err(CodecError::InvalidValue);
        }
        let params = ElGamalParameters::read_der(&mut seq)?;
        let key = SecretInt::new(seq.integer()?);
        seq.finish()?;
        r.finish()?;
        Self::new(params, key).map_err(|_| CodecError::InvalidValue)
    }

    /// Decrypts and strips the padding.
    ///
    /// Both ciphertext components are checked for subgroup membership first.
    pub fn decrypt(&self, ct: &Ciphertext) -> Result<Vec<u8>, MathError> {
        let group = self.params.group();
        match ct.correctness(group) {
            CiphertextCorrectness::Valid => {}
            CiphertextCorrectness::InvalidResidue => return Err(MathError::NotQuadraticResidue),
            _ => return Err(MathError::NotGroupElement),
        }
        let shared = SecretInt::new(group.pow(&ct.blind, self.key.expose()));
        let encoded = group.div(&ct.blinded, shared.expose())?;
        let decoded = group.decode(&encoded)?;
        let block = to_fixed_bytes(&decoded, group.message_len()).ok_or(MathError::MessageTooLong)?;
        plaintext::unpad(&block)
    }

    /// Decrypts and proves that the result matches this key's public key.
    pub fn provable_decrypt<R: EntropySource + ?Sized>(
        &self,
        ct: &Ciphertext,
        rng: &mut R,
    ) -> Result<Decryption, MathError> {
        let plaintext = self.decrypt(ct)?;
        let group = self.params.group();
        let public = self.public_key();

        let nonce = SecretInt::new(random_below(rng, group.order())?);
        let msg_commitment = group.pow(&ct.blind, nonce.expose());
        let key_commitment = group.pow(&self.params.generator, nonce.expose());
        let challenge = proof::challenge(&public, ct, &plaintext, &msg_commitment, &key_commitment);
        let response = (challenge * self.key.expose() + nonce.expose()) % group.order();

        Ok(Decryption {
            plaintext,
            proof: Some(DecryptionProof::new(msg_commitment, key_commitment, response)),
        })
    }
}

/// `(c1, c2) = (g^r, m·y^r)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ciphertext {
    blind: BigUint,
    blinded: BigUint,
}

impl Ciphertext {
    pub fn new(blind: BigUint, blinded: BigUint) -> Self {
        Self { blind, blinded }
    }

    pub fn blind(&self) -> &BigUint {
        &self.blind
    }

    pub fn blinded(&self) -> &BigUint {
        &self.blinded
    }

    /// `SEQUENCE { OID, INTEGER c1, INTEGER c2 }`
    pub fn to_der(&self) -> Vec<u8> {
        let mut w = DerWriter::new();
        w.sequence(|s| {
            s.oid(OID_MODP_ELGAMAL).integer(&self.blind).integer(&self.blinded);
        });
        w.finish()
    }

    pub fn from_der(der: &[u8]) -> Result<Self, CodecError> {
        let mut r = DerReader::new(der);
        let mut seq = r.sequence()?;
        seq.expect_oid(OID_MODP_ELGAMAL)?;
        let blind = seq.integer()?;
        let blinded = seq.integer()?;
        seq.finish()?;
        r.finish()?;
        Ok(Self { blind, blinded })
    }

    /// Both components must be residues for decryption to be meaningful.
    pub fn correctness(&self, group: &ModPGroup) -> CiphertextCorrectness {
        let mut worst = CiphertextCorrectness::Valid;
        for component in [&self.blind, &self.blinded] {
            match group.decodable(component) {
                Decodable::Valid => {}
                Decodable::InvalidResidue => worst = CiphertextCorrectness::InvalidResidue,
                Decodable::InvalidGroupElement => return CiphertextCorrectness::InvalidGroupElement,
            }
        }
        worst
    }
}

/// Result of [`ElGamalPublicKey::check_ciphertext`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CiphertextCorrectness {
    Valid,
    /// Not a DER ciphertext at all.
    Malformed,
    /// A component lies outside `[1, p)`.
    InvalidGroupElement,
    /// A component is outside the residue subgroup.
    InvalidResidue,
}

/// A decrypted message and, when requested, its proof.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decryption {
    pub plaintext: Vec<u8>,
    pub proof: Option<DecryptionProof>,
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::entropy::dprng::Dprng;
    use crate::math::group::tests::test_group;

    pub(crate) fn test_params() -> ElGamalParameters {
        ElGamalParameters::new(test_group(), BigUint::from(4u32), "TEST-2026").unwrap()
    }

    fn keypair(rng: &mut Dprng) -> ElGamalPrivateKey {
        let params = test_params();
        let x = random_below(rng, params.group().order()).unwrap();
        ElGamalPrivateKey::new(params, SecretInt::new(x)).unwrap()
    }

    #[test]
    fn test_encrypt_decrypt() {
        let mut rng = Dprng::new(b"elgamal");
        let sk = keypair(&mut rng);
        let pk = sk.public_key();
        let ct = pk.encrypt(b"candidate 101", &mut rng).unwrap();
        assert_eq!(sk.decrypt(&ct).unwrap(), b"candidate 101".to_vec());
        assert_eq!(pk.check_ciphertext(&ct.to_der()), CiphertextCorrectness::Valid);
    }

    #[test]
    fn test_message_too_long() {
        let mut rng = Dprng::new(b"elgamal-long");
        let pk = keypair(&mut rng).public_key();
        let long = [0x41u8; 30];
        assert_eq!(pk.encrypt(&long, &mut rng), Err(MathError::MessageTooLong));
        assert!(pk.encrypt(&long[..29], &mut rng).is_ok());
    }

    #[test]
    fn test_der_round_trip_keeps_parameters() {
        let mut rng = Dprng::new(b"elgamal-der");
        let sk = keypair(&mut rng);
        let blob = sk.to_der();
        let parsed = ElGamalPrivateKey::from_der(&blob).unwrap();
        assert_eq!(parsed.parameters(), sk.parameters());
        assert_eq!(parsed.public_key(), sk.public_key());

        let pk_der = sk.public_key().to_der();
        assert_eq!(ElGamalPublicKey::from_der(&pk_der).unwrap(), sk.public_key());
        assert!(ElGamalPrivateKey::from_der(&pk_der).is_err());
        assert!(!alloc::format!("{:?}", parsed).contains(&alloc::format!("{}", parsed.secret())));
    }

    #[test]
    fn test_corrupted_ciphertext() {
        let mut rng = Dprng::new(b"elgamal-bad");
        let sk = keypair(&mut rng);
        let pk = sk.public_key();
        let p = pk.parameters().group().modulus().clone();

        let out_of_group = Ciphertext::new(p.clone(), BigUint::from(4u32));
        assert_eq!(sk.decrypt(&out_of_group), Err(MathError::NotGroupElement));
        assert_eq!(pk.check_ciphertext(&out_of_group.to_der()), CiphertextCorrectness::InvalidGroupElement);

        let non_residue = Ciphertext::new(BigUint::from(4u32), &p - 1u32);
        assert_eq!(sk.decrypt(&non_residue), Err(MathError::NotQuadraticResidue));
        assert_eq!(pk.check_ciphertext(&non_residue.to_der()), CiphertextCorrectness::InvalidResidue);

        assert_eq!(pk.check_ciphertext(&[0x30, 0x00]), CiphertextCorrectness::Malformed);
    }

    #[test]
    fn test_rejects_bad_generator() {
        assert_eq!(
            ElGamalParameters::new(test_group(), BigUint::from(1u32), "x"),
            Err(MathError::NotGroupElement)
        );
    }
}
