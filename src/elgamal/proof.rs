//! Non-interactive proof of correct decryption.
//!
//! Chaum-Pedersen proof that `log_g(y) = log_{c1}(c2 / d)` where `d` is the
//! encoded plaintext, made non-interactive with Fiat-Shamir. The challenge is
//! `SHA-256(DER SEQUENCE { "DECRYPTION", pk, ct, plaintext, a, b })`.

use alloc::vec::Vec;
use num_bigint::BigUint;
use sha2::{Digest, Sha256};

use super::{plaintext, Ciphertext, ElGamalPublicKey};
use crate::codec::{CodecError, DerReader, DerWriter};
use crate::math::MathError;

const DOMAIN: &[u8] = b"DECRYPTION";

/// Commitments `a = c1^r`, `b = g^r` and response `s = k·x + r mod q`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecryptionProof {
    msg_commitment: BigUint,
    key_commitment: BigUint,
    response: BigUint,
}

pub(crate) fn challenge(
    public: &ElGamalPublicKey,
    ct: &Ciphertext,
    plaintext: &[u8],
    msg_commitment: &BigUint,
    key_commitment: &BigUint,
) -> BigUint {
    let mut w = DerWriter::new();
    w.sequence(|s| {
        s.octet_string(DOMAIN)
            .raw(&public.to_der())
            .raw(&ct.to_der())
            .octet_string(plaintext)
            .integer(msg_commitment)
            .integer(key_commitment);
    });
    BigUint::from_bytes_be(&Sha256::digest(w.finish()))
}

impl DecryptionProof {
    pub fn new(msg_commitment: BigUint, key_commitment: BigUint, response: BigUint) -> Self {
        Self { msg_commitment, key_commitment, response }
    }

    /// Checks both halves of the proof for `plaintext` as the decryption of `ct`.
    pub fn verify(&self, public: &ElGamalPublicKey, ct: &Ciphertext, plaintext: &[u8]) -> Result<bool, MathError> {
        let group = public.parameters().group();
        if !group.is_residue(&self.msg_commitment) || !group.is_residue(&self.key_commitment) {
            return Ok(false);
        }
        let k = challenge(public, ct, plaintext, &self.msg_commitment, &self.key_commitment);

        // g^s = b · y^k
        let left = group.pow(public.parameters().generator(), &self.response);
        let right = group.mul(&self.key_commitment, &group.pow(public.key(), &k));
        if left != right {
            return Ok(false);
        }

        // c1^s = a · (c2 / d)^k
        let block = plaintext::pad(plaintext, group.message_len())?;
        let d = group.encode(&BigUint::from_bytes_be(&block))?;
        let left = group.pow(ct.blind(), &self.response);
        let right = group.mul(&self.msg_commitment, &group.pow(&group.div(ct.blinded(), &d)?, &k));
        Ok(left == right)
    }

    /// `SEQUENCE { INTEGER a, INTEGER b, INTEGER s }`
    pub fn to_der(&self) -> Vec<u8> {
        let mut w = DerWriter::new();
        w.sequence(|s| {
            s.integer(&self.msg_commitment)
                .integer(&self.key_commitment)
                .integer(&self.response);
        });
        w.finish()
    }

    pub fn from_der(der: &[u8]) -> Result<Self, CodecError> {
        let mut r = DerReader::new(der);
        let mut seq = r.sequence()?;
        let proof = Self {
            msg_commitment: seq.integer()?,
            key_commitment: seq.integer()?,
            response: seq.integer()?,
        };
        seq.finish()?;
        r.finish()?;
        Ok(proof)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elgamal::tests::test_params;
    use crate::elgamal::ElGamalPrivateKey;
    use crate::entropy::dprng::Dprng;
    use crate::math::{random_below, SecretInt};

    #[test]
    fn test_proof_verifies() {
        let mut rng = Dprng::new(b"proof");
        let params = test_params();
        let x = random_below(&mut rng, params.group().order()).unwrap();
        let sk = ElGamalPrivateKey::new(params, SecretInt::new(x)).unwrap();
        let pk = sk.public_key();
        let ct = pk.encrypt(b"yes", &mut rng).unwrap();

        let result = sk.provable_decrypt(&ct, &mut rng).unwrap();
        assert_eq!(result.plaintext, b"yes".to_vec());
        let proof = result.proof.unwrap();
        assert_eq!(proof.verify(&pk, &ct, b"yes"), Ok(true));

        // A different claimed plaintext must not verify.
        assert_eq!(proof.verify(&pk, &ct, b"no"), Ok(false));

        let parsed = DecryptionProof::from_der(&proof.to_der()).unwrap();
        assert_eq!(parsed, proof);
    }

    #[test]
    fn test_proof_bound_to_key() {
        let mut rng = Dprng::new(b"proof-key");
        let params = test_params();
        let q = params.group().order().clone();
        let sk = ElGamalPrivateKey::new(params.clone(), SecretInt::new(random_below(&mut rng, &q).unwrap())).unwrap();
        let other = ElGamalPrivateKey::new(params, SecretInt::new(random_below(&mut rng, &q).unwrap())).unwrap();
        let ct = sk.public_key().encrypt(b"ballot", &mut rng).unwrap();
        let proof = sk.provable_decrypt(&ct, &mut rng).unwrap().proof.unwrap();
        assert_eq!(proof.verify(&other.public_key(), &ct, b"ballot"), Ok(false));
    }
}
