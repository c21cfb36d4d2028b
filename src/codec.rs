//! Minimal DER encoding for key blobs and public keys.
//!
//! Only the handful of universal types the key formats need: INTEGER
//! (non-negative), SEQUENCE, OBJECT IDENTIFIER, NULL, BIT STRING, OCTET STRING
//! and UTF8String. Lengths use the definite form; the reader rejects
//! indefinite lengths and trailing bytes.

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;
use num_bigint::BigUint;

pub const TAG_INTEGER: u8 = 0x02;
pub const TAG_BIT_STRING: u8 = 0x03;
pub const TAG_OCTET_STRING: u8 = 0x04;
pub const TAG_NULL: u8 = 0x05;
pub const TAG_OID: u8 = 0x06;
pub const TAG_UTF8_STRING: u8 = 0x0c;
pub const TAG_SEQUENCE: u8 = 0x30;

/// Encoded content of OID 1.2.840.113549.1.1.1 (rsaEncryption).
pub const OID_RSA_ENCRYPTION: &[u8] = &[0x2a, 0x86, 0x48, 0x86, 0xf7, 0x0d, 0x01, 0x01, 0x01];
/// Encoded content of OID 1.3.6.1.4.1.3029.2.1 (ElGamal over a mod-p group).
pub const OID_MODP_ELGAMAL: &[u8] = &[0x2b, 0x06, 0x01, 0x04, 0x01, 0x97, 0x55, 0x02, 0x01];

/// DER decoding errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodecError {
    /// Input ended in the middle of an element.
    Truncated,
    /// A different element was expected here.
    UnexpectedTag { expected: u8, found: u8 },
    /// Length field is malformed or indefinite.
    InvalidLength,
    /// Bytes left over after the outermost element.
    TrailingData,
    /// Algorithm identifier is not the expected one.
    UnknownAlgorithm,
    /// Content is not a valid value for its type.
    InvalidValue,
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodecError::Truncated => write!(f, "DER input truncated"),
            CodecError::UnexpectedTag { expected, found } => {
                write!(f, "expected DER tag 0x{:02x}, found 0x{:02x}", expected, found)
            }
            CodecError::InvalidLength => write!(f, "invalid DER length"),
            CodecError::TrailingData => write!(f, "trailing data after DER element"),
            CodecError::UnknownAlgorithm => write!(f, "unknown algorithm identifier"),
            CodecError::InvalidValue => write!(f, "invalid DER value"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for CodecError {}

/// Appends DER elements to a buffer.
#[derive(Default)]
pub struct DerWriter {
    buf: Vec<u8>,
}

impl DerWriter {
    pub fn new() -> Self {
        Self::default()
    }

    fn element(&mut self, tag: u8, content: &[u8]) -> &mut Self {
        self.buf.push(tag);
        push_length(&mut self.buf, content.len());
        self.buf.extend_from_slice(content);
        self
    }

    pub fn integer(&mut self, value: &BigUint) -> &mut Self {
        let mut content = value.to_bytes_be();
        if content[0] & 0x80 != 0 {
            content.insert(0, 0);
        }
        let out = self.element(TAG_INTEGER, &content);
        zeroize::Zeroize::zeroize(&mut content);
        out
    }

    pub fn small_integer(&mut self, value: u64) -> &mut Self {
        self.integer(&BigUint::from(value))
    }

    pub fn octet_string(&mut self, bytes: &[u8]) -> &mut Self {
        self.element(TAG_OCTET_STRING, bytes)
    }

    pub fn utf8_string(&mut self, text: &str) -> &mut Self {
        self.element(TAG_UTF8_STRING, text.as_bytes())
    }

    /// `encoded` is the content octets of the identifier.
    pub fn oid(&mut self, encoded: &[u8]) -> &mut Self {
        self.element(TAG_OID, encoded)
    }

    pub fn null(&mut self) -> &mut Self {
        self.element(TAG_NULL, &[])
    }

    /// BIT STRING with no unused bits.
    pub fn bit_string(&mut self, bytes: &[u8]) -> &mut Self {
        let mut content = Vec::with_capacity(bytes.len() + 1);
        content.push(0);
        content.extend_from_slice(bytes);
        self.element(TAG_BIT_STRING, &content)
    }

    /// Appends an already encoded element.
    pub fn raw(&mut self, der: &[u8]) -> &mut Self {
        self.buf.extend_from_slice(der);
        self
    }

    /// Writes a SEQUENCE whose body is produced by `body`.
    pub fn sequence<F: FnOnce(&mut DerWriter)>(&mut self, body: F) -> &mut Self {
        let mut inner = DerWriter::new();
        body(&mut inner);
        let content = inner.finish();
        self.element(TAG_SEQUENCE, &content)
    }

    pub fn finish(self) -> Vec<u8> {
        self.buf
    }
}

fn push_length(buf: &mut Vec<u8>, len: usize) {
    if len < 0x80 {
        buf.push(len as u8);
        return;
    }
    let bytes = len.to_be_bytes();
    let skip = bytes.iter().take_while(|&&b| b == 0).count();
    buf.push(0x80 | (bytes.len() - skip) as u8);
    buf.extend_from_slice(&bytes[skip..]);
}

/// Walks DER elements in a buffer.
pub struct DerReader<'a> {
    data: &'a [u8],
}

impl<'a> DerReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data }
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    fn element(&mut self, expected: u8) -> Result<&'a [u8], CodecError> {
        let (&tag, rest) = self.data.split_first().ok_or(CodecError::Truncated)?;
        if tag != expected {
            return Err(CodecError::UnexpectedTag { expected, found: tag });
        }
        let (&first, mut rest) = rest.split_first().ok_or(CodecError::Truncated)?;
        let len = if first < 0x80 {
            first as usize
        } else {
            let count = (first & 0x7f) as usize;
            if count == 0 || count > core::mem::size_of::<usize>() || rest.len() < count {
                return Err(CodecError::InvalidLength);
            }
            let mut len = 0usize;
            for &b in &rest[..count] {
                len = (len << 8) | b as usize;
            }
            if len < 0x80 {
                return Err(CodecError::InvalidLength);
            }
            rest = &rest[count..];
            len
        };
        if rest.len() < len {
            return Err(CodecError::Truncated);
        }
        let (content, remaining) = rest.split_at(len);
        self.data = remaining;
        Ok(content)
    }

    pub fn integer(&mut self) -> Result<BigUint, CodecError> {
        let content = self.element(TAG_INTEGER)?;
        match content.first() {
            None => Err(CodecError::InvalidValue),
            Some(&b) if b & 0x80 != 0 => Err(CodecError::InvalidValue),
            Some(_) => Ok(BigUint::from_bytes_be(content)),
        }
    }

    pub fn small_integer(&mut self) -> Result<u64, CodecError> {
        let value = self.integer()?;
        let digits = value.to_u64_digits();
        match digits.as_slice() {
            [] => Ok(0),
            [v] => Ok(*v),
            _ => Err(CodecError::InvalidValue),
        }
    }

    pub fn octet_string(&mut self) -> Result<&'a [u8], CodecError> {
        self.element(TAG_OCTET_STRING)
    }

    pub fn utf8_string(&mut self) -> Result<String, CodecError> {
        let content = self.element(TAG_UTF8_STRING)?;
        core::str::from_utf8(content)
            .map(String::from)
            .map_err(|_| CodecError::InvalidValue)
    }

    /// Reads an OID and checks it against `expected` content octets.
    pub fn expect_oid(&mut self, expected: &[u8]) -> Result<(), CodecError> {
        if self.element(TAG_OID)? == expected {
            Ok(())
        } else {
            Err(CodecError::UnknownAlgorithm)
        }
    }

    pub fn null(&mut self) -> Result<(), CodecError> {
        if self.element(TAG_NULL)?.is_empty() {
            Ok(())
        } else {
            Err(CodecError::InvalidValue)
        }
    }

    pub fn bit_string(&mut self) -> Result<&'a [u8], CodecError> {
        match self.element(TAG_BIT_STRING)?.split_first() {
            Some((0, bytes)) => Ok(bytes),
            _ => Err(CodecError::InvalidValue),
        }
    }

    pub fn sequence(&mut self) -> Result<DerReader<'a>, CodecError> {
        Ok(DerReader::new(self.element(TAG_SEQUENCE)?))
    }

    /// Fails if anything is left unread.
    pub fn finish(self) -> Result<(), CodecError> {
        if self.data.is_empty() {
            Ok(())
        } else {
            Err(CodecError::TrailingData)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_encoding() {
        let mut w = DerWriter::new();
        w.small_integer(0).small_integer(127).small_integer(128).small_integer(65537);
        assert_eq!(
            w.finish(),
            alloc::vec![
                0x02, 0x01, 0x00,
                0x02, 0x01, 0x7f,
                0x02, 0x02, 0x00, 0x80,
                0x02, 0x03, 0x01, 0x00, 0x01,
            ]
        );
    }

    #[test]
    fn test_long_length_and_nesting() {
        let payload = alloc::vec![0xABu8; 300];
        let mut w = DerWriter::new();
        w.sequence(|s| {
            s.oid(OID_RSA_ENCRYPTION).null().octet_string(&payload);
        });
        let der = w.finish();
        assert_eq!(&der[..4], &[0x30, 0x82, 0x01, 0x3d]);

        let mut r = DerReader::new(&der);
        let mut seq = r.sequence().unwrap();
        seq.expect_oid(OID_RSA_ENCRYPTION).unwrap();
        seq.null().unwrap();
        assert_eq!(seq.octet_string().unwrap(), &payload[..]);
        seq.finish().unwrap();
        r.finish().unwrap();
    }

    #[test]
    fn test_reader_errors() {
        let mut r = DerReader::new(&[0x02, 0x05, 0x01]);
        assert_eq!(r.integer(), Err(CodecError::Truncated));

        let mut r = DerReader::new(&[0x04, 0x00]);
        assert_eq!(
            r.integer(),
            Err(CodecError::UnexpectedTag { expected: TAG_INTEGER, found: TAG_OCTET_STRING })
        );

        let mut r = DerReader::new(&[0x02, 0x01, 0xff]);
        assert_eq!(r.integer(), Err(CodecError::InvalidValue));

        let mut r = DerReader::new(&[0x06, 0x01, 0x2a]);
        assert_eq!(r.expect_oid(OID_MODP_ELGAMAL), Err(CodecError::UnknownAlgorithm));

        let r = DerReader::new(&[0x05, 0x00, 0x00]);
        let mut r2 = DerReader::new(&[0x05, 0x00, 0x00]);
        r2.null().unwrap();
        assert_eq!(r2.finish(), Err(CodecError::TrailingData));
        assert!(!r.is_empty());
    }

    #[test]
    fn test_strings() {
        let mut w = DerWriter::new();
        w.utf8_string("election-2026").bit_string(&[1, 2, 3]);
        let der = w.finish();
        let mut r = DerReader::new(&der);
        assert_eq!(r.utf8_string().unwrap(), "election-2026");
        assert_eq!(r.bit_string().unwrap(), &[1, 2, 3]);
        assert!(r.is_empty());
    }
}
