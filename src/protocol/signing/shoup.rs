//! Shoup threshold RSA-PSS signing.
//!
//! Every share signs the same PSS encoding `EM` (one salt per message), giving
//! `c_i = EM^{d_i}`. With `Δ = parties!` and the integer Lagrange basis
//! `Δ·λ_i`, the product `w = Π c_i^{Δ·λ_i}` equals `EM^{Δ·d}`. Since
//! `gcd(e, Δ) = 1`, Bézout gives `a·e + b·Δ = 1` and
//! `y = EM^a · w^b` satisfies `y^e = EM`. The private exponent is never formed.

use alloc::vec::Vec;
use num_bigint::{BigInt, BigUint};
use num_traits::One;
use zeroize::Zeroizing;

use crate::entropy::EntropySource;
use crate::math::lagrange::inverseless_basis_at_zero;
use crate::math::{extended_gcd, factorial, mod_pow_signed, to_fixed_bytes};
use crate::protocol::util::{fetch_all_blobs, present, require_threshold};
use crate::protocol::{ProtocolError, SigningProtocol};
use crate::rsa::pss::SALT_LEN;
use crate::rsa::{PartialSignature, RsaKeyShare, RsaPublicKey};
use crate::sharing::ThresholdParameters;
use crate::token::{Cards, IndexedBlob};

/// Bézout coefficients `(a, b)` with `a·e + b·Δ = 1`.
fn bezout(e: &BigUint, delta: &BigUint) -> Result<(BigInt, BigInt), ProtocolError> {
    let (g, a, b) = extended_gcd(&BigInt::from(e.clone()), &BigInt::from(delta.clone()));
    if !g.is_one() {
        return Err(ProtocolError::InvalidParameters("public exponent divides parties!"));
    }
    Ok((a, b))
}

/// Combines partial signatures on `encoded` into `y` with `y^e = encoded mod n`.
///
/// Fails with `SignatureRejected` if the result does not verify, which is
/// what a wrong or corrupted partial signature produces.
pub fn combine_partial_signatures(
    partials: &[PartialSignature],
    encoded: &BigUint,
    public: &RsaPublicKey,
    parties: u32,
) -> Result<BigUint, ProtocolError> {
    let n = public.modulus();
    let delta = factorial(parties);
    let (a, b) = bezout(public.exponent(), &delta)?;

    let indices: Vec<u32> = partials.iter().map(|p| p.index).collect();
    let mut w = BigUint::one();
    for partial in partials {
        let lambda = inverseless_basis_at_zero(&indices, partial.index, &delta)?;
        w = w * mod_pow_signed(&partial.value, &lambda, n)? % n;
    }

    let y = mod_pow_signed(encoded, &a, n)? * mod_pow_signed(&w, &b, n)? % n;
    if &y.modpow(public.exponent(), n) != encoded {
        log::warn!("Combined signature from shares {:?} does not verify", indices);
        return Err(ProtocolError::SignatureRejected);
    }
    Ok(y)
}

pub struct ShoupSigning<'a, R: EntropySource + ?Sized> {
    public: RsaPublicKey,
    shares: Vec<(u32, RsaKeyShare)>,
    parties: u32,
    rng: &'a mut R,
}

impl<'a, R: EntropySource + ?Sized> ShoupSigning<'a, R> {
    pub fn new(blobs: &[IndexedBlob], tparams: &ThresholdParameters, rng: &'a mut R) -> Result<Self, ProtocolError> {
        require_threshold(blobs.len(), tparams)?;

        let mut public: Option<RsaPublicKey> = None;
        let mut shares: Vec<(u32, RsaKeyShare)> = Vec::with_capacity(blobs.len());
        for blob in blobs {
            let index = blob.index();
            if !tparams.is_valid_index(index) {
                return Err(ProtocolError::IndexMismatch(index));
            }
            if shares.iter().any(|(i, _)| *i == index) {
                return Err(ProtocolError::DuplicateShare(index));
            }
            let share = RsaKeyShare::from_der(blob.blob()).map_err(ProtocolError::MalformedShare)?;
            match &public {
                None => public = Some(share.public_key().clone()),
                Some(pk) if pk != share.public_key() => return Err(ProtocolError::ParameterMismatch),
                Some(_) => {}
            }
            shares.push((index, share));
        }
        let public = public.ok_or(ProtocolError::InsufficientShares {
            available: 0,
            required: tparams.threshold() as usize,
        })?;
        bezout(public.exponent(), &factorial(tparams.parties()))?;

        Ok(Self { public, shares, parties: tparams.parties(), rng })
    }

    pub fn from_cards(
        cards: &mut Cards,
        tparams: &ThresholdParameters,
        aid: &[u8],
        identifier: &[u8],
        rng: &'a mut R,
    ) -> Result<Self, ProtocolError> {
        let blobs = present(fetch_all_blobs(cards, tparams, aid, identifier)?);
        Self::new(&blobs, tparams, rng)
    }

    pub fn public_key(&self) -> &RsaPublicKey {
        &self.public
    }

    /// One partial signature per share over the same salted encoding.
    pub fn partial_signatures(&self, msg: &[u8], salt: &[u8]) -> Result<Vec<PartialSignature>, ProtocolError> {
        self.shares
            .iter()
            .map(|(index, share)| {
                Ok(PartialSignature { index: *index, value: share.partial_sign(msg, salt)? })
            })
            .collect()
    }
}

impl<R: EntropySource + ?Sized> SigningProtocol for ShoupSigning<'_, R> {
    fn sign(&mut self, msg: &[u8]) -> Result<Vec<u8>, ProtocolError> {
        let mut salt = Zeroizing::new([0u8; SALT_LEN]);
        self.rng.must_read(&mut salt[..])?;

        let partials = self.partial_signatures(msg, &salt[..])?;
        let encoded = self.public.encode_message(msg, &salt[..])?;
        let y = combine_partial_signatures(&partials, &encoded, &self.public, self.parties)?;
        let signature = to_fixed_bytes(&y, self.public.modulus_len()).ok_or(ProtocolError::SignatureRejected)?;
        log::debug!("Message signed with {} shares", partials.len());
        Ok(signature)
    }
}
