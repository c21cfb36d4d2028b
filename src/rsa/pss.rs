//! EMSA-PSS encoding (RFC 8017, section 9.1) with SHA-256 and MGF1-SHA-256.
//!
//! The salt is supplied by the caller: threshold signing needs every partial
//! signature to cover the very same encoded message.

use alloc::vec::Vec;
use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

use crate::math::MathError;

pub const HASH_LEN: usize = 32;
pub const SALT_LEN: usize = 32;
const TRAILER: u8 = 0xbc;

fn mgf1(seed: &[u8], len: usize) -> Vec<u8> {
    let mut mask = Vec::with_capacity(len + HASH_LEN);
    let mut counter: u32 = 0;
    while mask.len() < len {
        let mut hasher = Sha256::new();
        hasher.update(seed);
        hasher.update(counter.to_be_bytes());
        mask.extend_from_slice(&hasher.finalize());
        counter += 1;
    }
    mask.truncate(len);
    mask
}

fn digest_with_salt(m_hash: &[u8], salt: &[u8]) -> Vec<u8> {
    let mut hasher = Sha256::new();
    hasher.update([0u8; 8]);
    hasher.update(m_hash);
    hasher.update(salt);
    hasher.finalize().to_vec()
}

/// Smallest `em_bits` that can hold a PSS encoding.
pub const fn min_em_bits() -> usize {
    8 * (HASH_LEN + SALT_LEN + 2) - 7
}

/// `EM = maskedDB || H || 0xbc`, `ceil(em_bits / 8)` bytes long.
pub fn encode(msg: &[u8], em_bits: usize, salt: &[u8]) -> Result<Vec<u8>, MathError> {
    if salt.len() != SALT_LEN {
        return Err(MathError::InvalidPadding);
    }
    let em_len = (em_bits + 7) / 8;
    if em_len < HASH_LEN + SALT_LEN + 2 {
        return Err(MathError::InvalidModulus);
    }
    let m_hash = Sha256::digest(msg);
    let h = digest_with_salt(&m_hash, salt);

    let db_len = em_len - HASH_LEN - 1;
    let mut db = Zeroizing::new(alloc::vec![0u8; db_len]);
    db[db_len - SALT_LEN - 1] = 0x01;
    db[db_len - SALT_LEN..].copy_from_slice(salt);

    let mask = mgf1(&h, db_len);
    let mut em = Vec::with_capacity(em_len);
    em.extend(db.iter().zip(mask.iter()).map(|(d, m)| d ^ m));
    em[0] &= 0xffu8 >> (8 * em_len - em_bits);
    em.extend_from_slice(&h);
    em.push(TRAILER);
    Ok(em)
}

/// Checks `em` (exactly `ceil(em_bits / 8)` bytes) against `msg`.
pub fn verify(msg: &[u8], em: &[u8], em_bits: usize) -> bool {
    let em_len = (em_bits + 7) / 8;
    if em.len() != em_len || em_len < HASH_LEN + SALT_LEN + 2 {
        return false;
    }
    if em[em_len - 1] != TRAILER {
        return false;
    }
    let db_len = em_len - HASH_LEN - 1;
    let (masked_db, rest) = em.split_at(db_len);
    let h = &rest[..HASH_LEN];

    let top_mask = 0xffu8 >> (8 * em_len - em_bits);
    if masked_db[0] & !top_mask != 0 {
        return false;
    }

    let mask = mgf1(h, db_len);
    let mut db: Vec<u8> = masked_db.iter().zip(mask.iter()).map(|(d, m)| d ^ m).collect();
    db[0] &= top_mask;

    let ps_len = db_len - SALT_LEN - 1;
    if db[..ps_len].iter().any(|&b| b != 0) || db[ps_len] != 0x01 {
        return false;
    }
    let salt = &db[ps_len + 1..];
    let m_hash = Sha256::digest(msg);
    digest_with_salt(&m_hash, salt) == h
}
