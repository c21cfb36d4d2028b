//! Plaintext block padding.
//!
//! Messages are padded to the byte length of the group order as
//! `00 01 FF .. FF 00 || msg`, which keeps the integer value in `[1, q]`.

use alloc::vec::Vec;
use crate::math::MathError;

/// Pads `msg` into a block of `block_len` bytes.
pub fn pad(msg: &[u8], block_len: usize) -> Result<Vec<u8>, MathError> {
    if block_len < 3 || msg.len() > block_len - 3 {
        return Err(MathError::MessageTooLong);
    }
    let fill = block_len - msg.len() - 3;
    let mut block = Vec::with_capacity(block_len);
    block.extend_from_slice(&[0x00, 0x01]);
    block.resize(2 + fill, 0xff);
    block.push(0x00);
    block.extend_from_slice(msg);
    Ok(block)
}

/// Strips the padding added by [`pad`].
pub fn unpad(block: &[u8]) -> Result<Vec<u8>, MathError> {
    if block.len() < 3 || block[0] != 0x00 || block[1] != 0x01 {
        return Err(MathError::InvalidPadding);
    }
    for (i, &b) in block.iter().enumerate().skip(2) {
        match b {
            0x00 => return Ok(block[i + 1..].to_vec()),
            0xff => continue,
            _ => return Err(MathError::InvalidPadding),
        }
    }
    Err(MathError::InvalidPadding)
}
