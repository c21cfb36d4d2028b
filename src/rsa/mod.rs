//! RSA keys for threshold signing.
//!
//! The public key is exported as an X.509 `SubjectPublicKeyInfo`. The private
//! exponent only ever exists as Shamir shares over `φ(n)`; each share is stored
//! with `(n, e)` so a token's blob is usable on its own.

pub mod pss;

use alloc::vec::Vec;
use core::fmt;
use num_bigint::BigUint;
use num_traits::One;
use zeroize::Zeroizing;

use crate::codec::{CodecError, DerReader, DerWriter, OID_RSA_ENCRYPTION};
use crate::math::{to_fixed_bytes, MathError, SecretInt};

/// Public exponent used for every generated key.
pub const PUBLIC_EXPONENT: u32 = 65537;

/// Smallest modulus accepted for key generation.
pub const MIN_MODULUS_BITS: u64 = 768;

/// `(n, e)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RsaPublicKey {
    modulus: BigUint,
    exponent: BigUint,
}

impl RsaPublicKey {
    pub fn new(modulus: BigUint, exponent: BigUint) -> Result<Self, MathError> {
        if exponent <= BigUint::one() || !exponent.bit(0) || modulus <= exponent || !modulus.bit(0) {
            return Err(MathError::InvalidModulus);
        }
        Ok(Self { modulus, exponent })
    }

    pub fn modulus(&self) -> &BigUint {
        &self.modulus
    }

    pub fn exponent(&self) -> &BigUint {
        &self.exponent
    }

    pub fn modulus_bits(&self) -> usize {
        self.modulus.bits() as usize
    }

    /// Signature length `k` in bytes.
    pub fn modulus_len(&self) -> usize {
        (self.modulus_bits() + 7) / 8
    }

    fn em_bits(&self) -> usize {
        self.modulus_bits() - 1
    }

    /// PSS-encodes `msg` with `salt` and returns it as an integer below `n`.
    pub fn encode_message(&self, msg: &[u8], salt: &[u8]) -> Result<BigUint, MathError> {
        let em = pss::encode(msg, self.em_bits(), salt)?;
        Ok(BigUint::from_bytes_be(&em))
    }

    /// RSASSA-PSS verification of a `k`-byte signature.
    pub fn verify(&self, msg: &[u8], signature: &[u8]) -> bool {
        if signature.len() != self.modulus_len() {
            return false;
        }
        let s = BigUint::from_bytes_be(signature);
        if s >= self.modulus {
            return false;
        }
        let m = s.modpow(&self.exponent, &self.modulus);
        let em_bits = self.em_bits();
        match to_fixed_bytes(&m, (em_bits + 7) / 8) {
            Some(em) => pss::verify(msg, &em, em_bits),
            None => false,
        }
    }

    /// `SubjectPublicKeyInfo { AlgorithmIdentifier { rsaEncryption, NULL }, BIT STRING RSAPublicKey }`
    pub fn to_der(&self) -> Vec<u8> {
        let mut inner = DerWriter::new();
        inner.sequence(|s| {
            s.integer(&self.modulus).integer(&self.exponent);
        });
        let rsa_public_key = inner.finish();

        let mut w = DerWriter::new();
        w.sequence(|s| {
            s.sequence(|alg| {
                alg.oid(OID_RSA_ENCRYPTION).null();
            })
            .bit_string(&rsa_public_key);
        });
        w.finish()
    }

    pub fn from_der(der: &[u8]) -> Result<Self, CodecError> {
        let mut r = DerReader::new(der);
        let mut spki = r.sequence()?;
        let mut alg = spki.sequence()?;
        alg.expect_oid(OID_RSA_ENCRYPTION)?;
        alg.null()?;
        alg.finish()?;
        let key_bytes = spki.bit_string()?;
        spki.finish()?;
        r.finish()?;

        let mut kr = DerReader::new(key_bytes);
        let mut key = kr.sequence()?;
        let modulus = key.integer()?;
        let exponent = key.integer()?;
        key.finish()?;
        kr.finish()?;
        Self::new(modulus, exponent).map_err(|_| CodecError::InvalidValue)
    }
}

/// One holder's share `d_i` of the private exponent, with `(n, e)`.
pub struct RsaKeyShare {
    public: RsaPublicKey,
    exponent: SecretInt,
}

impl fmt::Debug for RsaKeyShare {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RsaKeyShare")
            .field("modulus_bits", &self.public.modulus_bits())
            .field("exponent", &"***SENSITIVE***")
            .finish()
    }
}

impl RsaKeyShare {
    pub fn new(public: RsaPublicKey, exponent: SecretInt) -> Self {
        Self { public, exponent }
    }

    pub fn public_key(&self) -> &RsaPublicKey {
        &self.public
    }

    /// `EM^{d_i} mod n` for the PSS encoding of `msg` under `salt`.
    pub fn partial_sign(&self, msg: &[u8], salt: &[u8]) -> Result<BigUint, MathError> {
        let em = self.public.encode_message(msg, salt)?;
        Ok(em.modpow(self.exponent.expose(), &self.public.modulus))
    }

    /// `SEQUENCE { INTEGER 0, INTEGER n, INTEGER e, INTEGER d_i }`
    pub fn to_der(&self) -> Zeroizing<Vec<u8>> {
        let mut w = DerWriter::new();
        w.sequence(|s| {
            s.small_integer(0)
                .integer(&self.public.modulus)
                .integer(&self.public.exponent)
                .integer(self.exponent.expose());
        });
        Zeroizing::new(w.finish())
    }

    pub fn from_der(der: &[u8]) -> Result<Self, CodecError> {
        let mut r = DerReader::new(der);
        let mut seq = r.sequence()?;
        if seq.small_integer()? != 0 {
            return Err(CodecError::InvalidValue);
        }
        let modulus = seq.integer()?;
        let exponent = seq.integer()?;
        let share = SecretInt::new(seq.integer()?);
        seq.finish()?;
        r.finish()?;
        let public = RsaPublicKey::new(modulus, exponent).map_err(|_| CodecError::InvalidValue)?;
        Ok(Self { public, exponent: share })
    }
}

/// A partial signature tagged with the share index that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartialSignature {
    pub index: u32,
    pub value: BigUint,
}
