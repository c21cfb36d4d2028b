//! Key ceremony and quorum rehearsal.
//!
//! The ceremony writes the decryption and signing shares to the same tokens.
//! Rehearsal then reads both share sets back and exercises every quorum the
//! selector yields, so a missing or damaged share surfaces before election
//! day rather than at tallying.

use alloc::vec::Vec;

use super::decryption::RecoverDecryption;
use super::generation::{DesmedtGeneration, ShoupGeneration};
use super::signing::ShoupSigning;
use super::util::{fetch_all_blobs, present, require_threshold};
use super::{DecryptionProtocol, GenerationProtocol, ProtocolError, SigningProtocol};
use crate::config::KeyConfig;
use crate::elgamal::{ElGamalParameters, ElGamalPublicKey};
use crate::entropy::EntropySource;
use crate::rsa::RsaPublicKey;
use crate::sharing::{select_quorums, ThresholdParameters};
use crate::token::{Cards, IndexedBlob};

/// Public keys produced by a ceremony, DER encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CeremonyKeys {
    pub election_key: Vec<u8>,
    pub signing_key: Vec<u8>,
}

/// Generates the election (ElGamal) and signing (RSA) keys onto `cards`.
///
/// An interrupted ceremony leaves some shares behind; a rerun then fails with
/// `AlreadyExists` until the shares are removed with [`Cards::remove_blob`].
pub fn run_key_ceremony<R: EntropySource + ?Sized>(
    cards: &mut Cards,
    params: ElGamalParameters,
    tparams: ThresholdParameters,
    config: &KeyConfig,
    rng: &mut R,
) -> Result<CeremonyKeys, ProtocolError> {
    config.validate()?;
    log::info!("Key ceremony for {} started, {} shares", params.election_id(), tparams);

    let election_key = DesmedtGeneration::new(
        cards,
        params,
        tparams,
        &mut *rng,
        &config.share_aid,
        &config.decryption_identifier,
    )?
    .generate_key()?;

    let signing_key = ShoupGeneration::new(
        cards,
        tparams,
        config.modulus_bits,
        &mut *rng,
        &config.share_aid,
        &config.signing_identifier,
    )?
    .generate_key()?;

    Ok(CeremonyKeys { election_key, signing_key })
}

fn indices(quorum: &[IndexedBlob]) -> Vec<u32> {
    quorum.iter().map(|b| b.index()).collect()
}

fn collect(
    cards: &mut Cards,
    tparams: &ThresholdParameters,
    config: &KeyConfig,
    identifier: &[u8],
) -> Result<Vec<Vec<IndexedBlob>>, ProtocolError> {
    let blobs = present(fetch_all_blobs(cards, tparams, &config.share_aid, identifier)?);
    require_threshold(blobs.len(), tparams)?;
    Ok(select_quorums(&blobs, tparams.threshold() as usize)?)
}

/// Checks that every rehearsal quorum decrypts a fresh test ciphertext.
///
/// Returns the number of quorums checked.
pub fn rehearse_decryption<R: EntropySource + ?Sized>(
    cards: &mut Cards,
    tparams: &ThresholdParameters,
    config: &KeyConfig,
    election_key: &[u8],
    rng: &mut R,
) -> Result<usize, ProtocolError> {
    let public = ElGamalPublicKey::from_der(election_key).map_err(ProtocolError::MalformedInput)?;
    let quorums = collect(cards, tparams, config, &config.decryption_identifier)?;

    for (n, quorum) in quorums.iter().enumerate() {
        let probe = alloc::format!("rehearsal {}", n);
        let ct = public.encrypt(probe.as_bytes(), &mut *rng)?;

        let mut decryption = RecoverDecryption::new(quorum, tparams, config.decrypt_with_proof, &mut *rng)?;
        let passed = decryption.public_key() == public
            && match decryption.decrypt_message(&ct.to_der()) {
                Ok(out) => {
                    out.plaintext == probe.as_bytes()
                        && match &out.proof {
                            Some(proof) => proof.verify(&public, &ct, &out.plaintext)?,
                            None => true,
                        }
                }
                Err(e) => {
                    log::warn!("Rehearsal decryption failed: {}", e);
                    false
                }
            };
        if !passed {
            log::warn!("Decryption quorum {:?} failed rehearsal", indices(quorum));
            return Err(ProtocolError::QuorumRejected(indices(quorum)));
        }
    }
    log::info!("Decryption rehearsal passed for {} quorums", quorums.len());
    Ok(quorums.len())
}

/// Checks that every rehearsal quorum produces a verifying signature.
pub fn rehearse_signing<R: EntropySource + ?Sized>(
    cards: &mut Cards,
    tparams: &ThresholdParameters,
    config: &KeyConfig,
    signing_key: &[u8],
    rng: &mut R,
) -> Result<usize, ProtocolError> {
    let public = RsaPublicKey::from_der(signing_key).map_err(ProtocolError::MalformedInput)?;
    let quorums = collect(cards, tparams, config, &config.signing_identifier)?;

    for (n, quorum) in quorums.iter().enumerate() {
        let probe = alloc::format!("rehearsal {}", n);
        let mut signer = ShoupSigning::new(quorum, tparams, &mut *rng)?;
        let passed = signer.public_key() == &public
            && match signer.sign(probe.as_bytes()) {
                Ok(signature) => public.verify(probe.as_bytes(), &signature),
                Err(e) => {
                    log::warn!("Rehearsal signing failed: {}", e);
                    false
                }
            };
        if !passed {
            log::warn!("Signing quorum {:?} failed rehearsal", indices(quorum));
            return Err(ProtocolError::QuorumRejected(indices(quorum)));
        }
    }
    log::info!("Signing rehearsal passed for {} quorums", quorums.len());
    Ok(quorums.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elgamal::tests::test_params;
    use crate::elgamal::ElGamalPrivateKey;
    use crate::entropy::dprng::Dprng;
    use crate::math::SecretInt;
    use crate::token::memory::MemoryToken;
    use crate::token::{RetryPolicy, TokenError};
    use num_bigint::BigUint;

    fn config() -> KeyConfig {
        KeyConfig { modulus_bits: 768, retry: RetryPolicy::immediate(1), ..KeyConfig::default() }
    }

    fn trustees(config: &KeyConfig, count: u32) -> Cards {
        let mut cards = config.cards();
        for i in 0..count {
            cards.add(MemoryToken::new(&alloc::format!("trustee-{}", i + 1)));
        }
        cards
    }

    #[test]
    fn test_ceremony_then_rehearsal() {
        let config = config();
        let tparams = ThresholdParameters::new(4, 2).unwrap();
        let mut cards = trustees(&config, 4);
        let mut rng = Dprng::new(b"ceremony");

        let keys = run_key_ceremony(&mut cards, test_params(), tparams, &config, &mut rng).unwrap();
        assert!(ElGamalPublicKey::from_der(&keys.election_key).is_ok());
        assert!(RsaPublicKey::from_der(&keys.signing_key).is_ok());

        assert_eq!(rehearse_decryption(&mut cards, &tparams, &config, &keys.election_key, &mut rng), Ok(3));
        assert_eq!(rehearse_signing(&mut cards, &tparams, &config, &keys.signing_key, &mut rng), Ok(3));
    }

    #[test]
    fn test_rerun_detects_partial_ceremony() {
        let config = config();
        let tparams = ThresholdParameters::new(3, 2).unwrap();
        let mut cards = trustees(&config, 3);
        let mut rng = Dprng::new(b"ceremony-rerun");
        run_key_ceremony(&mut cards, test_params(), tparams, &config, &mut rng).unwrap();

        let rerun = run_key_ceremony(&mut cards, test_params(), tparams, &config, &mut rng);
        assert_eq!(rerun, Err(ProtocolError::CardCommunication(TokenError::AlreadyExists)));

        for slot in 0..3 {
            cards.remove_blob(slot, &config.share_aid, &config.decryption_identifier).unwrap();
            cards.remove_blob(slot, &config.share_aid, &config.signing_identifier).unwrap();
        }
        assert!(run_key_ceremony(&mut cards, test_params(), tparams, &config, &mut rng).is_ok());
    }

    #[test]
    fn test_rehearsal_catches_foreign_share() {
        let config = config();
        let tparams = ThresholdParameters::new(3, 2).unwrap();
        let mut cards = trustees(&config, 3);
        let mut rng = Dprng::new(b"ceremony-foreign");
        let keys = run_key_ceremony(&mut cards, test_params(), tparams, &config, &mut rng).unwrap();

        // Replace trustee 3's share with one of an unrelated key for the same election.
        let forged = ElGamalPrivateKey::new(test_params(), SecretInt::new(BigUint::from(12345u32))).unwrap();
        let mut token = MemoryToken::new("trustee-3");
        {
            use crate::token::ShareStore;
            token
                .store_indexed_blob(&config.share_aid, &config.decryption_identifier, &forged.to_der(), 3)
                .unwrap();
        }
        cards.replace(2, alloc::boxed::Box::new(token)).unwrap();

        let result = rehearse_decryption(&mut cards, &tparams, &config, &keys.election_key, &mut rng);
        assert!(matches!(result, Err(ProtocolError::QuorumRejected(ref q)) if q.contains(&3)));
    }

    #[test]
    fn test_rehearsal_needs_threshold() {
        let config = config();
        let tparams = ThresholdParameters::new(3, 2).unwrap();
        let mut cards = trustees(&config, 3);
        let mut rng = Dprng::new(b"ceremony-empty");
        let err = rehearse_signing(&mut cards, &tparams, &config, &[0x30, 0x00], &mut rng);
        assert!(matches!(err, Err(ProtocolError::MalformedInput(_))));

        let keys = run_key_ceremony(&mut cards, test_params(), tparams, &config, &mut rng).unwrap();
        cards.remove_blob(0, &config.share_aid, &config.signing_identifier).unwrap();
        cards.remove_blob(1, &config.share_aid, &config.signing_identifier).unwrap();
        assert_eq!(
            rehearse_signing(&mut cards, &tparams, &config, &keys.signing_key, &mut rng),
            Err(ProtocolError::InsufficientShares { available: 1, required: 2 })
        );
    }
}
