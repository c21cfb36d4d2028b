//! File-backed token, encrypted at rest.
//!
//! Layout: `Salt(32) || Nonce(12) || ChaCha20-Poly1305(records)`. The key is
//! derived from the token PIN with scrypt. Records are a DER
//! `SEQUENCE OF SEQUENCE { OCTET identifier, OCTET aid, INTEGER index, OCTET blob }`.
//! Every write re-encrypts the whole file under a fresh nonce and replaces it
//! atomically.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use chacha20poly1305::aead::{Aead, KeyInit};
use chacha20poly1305::{ChaCha20Poly1305, Key, Nonce};
use rand_core::{OsRng, RngCore};
use zeroize::Zeroizing;

use super::{IndexedBlob, ShareStore, StoredBlob, TokenError};
use crate::codec::{DerReader, DerWriter};

const SALT_LEN: usize = 32;
const NONCE_LEN: usize = 12;
const KEY_LEN: usize = 32;
const SCRYPT_LOG_N: u8 = 14;

fn scrypt_params() -> Result<scrypt::Params, TokenError> {
    scrypt::Params::new(SCRYPT_LOG_N, 8, 1, KEY_LEN).map_err(|_| TokenError::Storage)
}

pub struct FileToken {
    id: String,
    path: PathBuf,
    records: BTreeMap<Vec<u8>, StoredBlob>,
    key: Zeroizing<[u8; KEY_LEN]>,
    salt: [u8; SALT_LEN],
}

impl FileToken {
    /// Opens the token at `path`, or prepares a new one if the file does not exist.
    pub fn open<P: AsRef<Path>>(id: &str, path: P, pin: &[u8]) -> Result<Self, TokenError> {
        let path = path.as_ref().to_path_buf();
        let content = match fs::read(&path) {
            Ok(bytes) if !bytes.is_empty() => Some(bytes),
            Ok(_) => None,
            Err(e) if e.kind() == ErrorKind::NotFound => None,
            Err(e) => {
                log::error!("Token {}: cannot read {}: {}", id, path.display(), e);
                return Err(TokenError::Storage);
            }
        };

        let mut salt = [0u8; SALT_LEN];
        match &content {
            Some(bytes) if bytes.len() >= SALT_LEN + NONCE_LEN => salt.copy_from_slice(&bytes[..SALT_LEN]),
            Some(_) => return Err(TokenError::Corrupted),
            None => OsRng.fill_bytes(&mut salt),
        }

        let mut key = Zeroizing::new([0u8; KEY_LEN]);
        scrypt::scrypt(pin, &salt, &scrypt_params()?, &mut *key).map_err(|_| TokenError::Storage)?;

        let mut token = Self {
            id: String::from(id),
            path,
            records: BTreeMap::new(),
            key,
            salt,
        };
        if let Some(bytes) = content {
            token.load(&bytes)?;
        }
        Ok(token)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn cipher(&self) -> ChaCha20Poly1305 {
        ChaCha20Poly1305::new(Key::from_slice(&*self.key))
    }

    fn load(&mut self, content: &[u8]) -> Result<(), TokenError> {
        let nonce = Nonce::from_slice(&content[SALT_LEN..SALT_LEN + NONCE_LEN]);
        let plaintext = Zeroizing::new(
            self.cipher()
                .decrypt(nonce, &content[SALT_LEN + NONCE_LEN..])
                .map_err(|_| TokenError::PinRejected)?,
        );

        let mut r = DerReader::new(&plaintext);
        let mut list = r.sequence().map_err(|_| TokenError::Corrupted)?;
        while !list.is_empty() {
            let mut rec = list.sequence().map_err(|_| TokenError::Corrupted)?;
            let identifier = rec.octet_string().map_err(|_| TokenError::Corrupted)?;
            let aid = rec.octet_string().map_err(|_| TokenError::Corrupted)?;
            let index = rec.small_integer().map_err(|_| TokenError::Corrupted)?;
            let blob = rec.octet_string().map_err(|_| TokenError::Corrupted)?;
            rec.finish().map_err(|_| TokenError::Corrupted)?;
            let index = u32::try_from(index).map_err(|_| TokenError::Corrupted)?;
            self.records.insert(identifier.to_vec(), StoredBlob::new(aid, index, blob));
        }
        r.finish().map_err(|_| TokenError::Corrupted)?;
        Ok(())
    }

    fn serialize(&self) -> Zeroizing<Vec<u8>> {
        let mut w = DerWriter::new();
        w.sequence(|list| {
            for (identifier, stored) in &self.records {
                list.sequence(|rec| {
                    rec.octet_string(identifier)
                        .octet_string(&stored.aid)
                        .small_integer(u64::from(stored.index))
                        .octet_string(&stored.blob);
                });
            }
        });
        Zeroizing::new(w.finish())
    }

    fn save(&self) -> Result<(), TokenError> {
        let plaintext = self.serialize();
        let mut nonce_bytes = [0u8; NONCE_LEN];
        OsRng.fill_bytes(&mut nonce_bytes);
        let ciphertext = self
            .cipher()
            .encrypt(Nonce::from_slice(&nonce_bytes), plaintext.as_slice())
            .map_err(|_| TokenError::Storage)?;

        let mut content = Vec::with_capacity(SALT_LEN + NONCE_LEN + ciphertext.len());
        content.extend_from_slice(&self.salt);
        content.extend_from_slice(&nonce_bytes);
        content.extend_from_slice(&ciphertext);
        write_atomic(&self.path, &content).map_err(|e| {
            log::error!("Token {}: cannot write {}: {}", self.id, self.path.display(), e);
            TokenError::Storage
        })
    }
}

/// Writes to a sibling temp file, syncs, then renames over `path`.
fn write_atomic(path: &Path, data: &[u8]) -> std::io::Result<()> {
    let file_name = path
        .file_name()
        .ok_or_else(|| std::io::Error::new(ErrorKind::InvalidInput, "path has no file name"))?;
    let mut temp_path = path.to_path_buf();
    temp_path.set_file_name(format!("{}.tmp", file_name.to_string_lossy()));

    let mut file = File::create(&temp_path)?;
    file.write_all(data)?;
    file.sync_all()?;
    fs::rename(&temp_path, path)
}

impl ShareStore for FileToken {
    fn id(&self) -> &str {
        &self.id
    }

    fn store_indexed_blob(&mut self, aid: &[u8], identifier: &[u8], blob: &[u8], index: u32) -> Result<(), TokenError> {
        if self.records.contains_key(identifier) {
            return Err(TokenError::AlreadyExists);
        }
        self.records.insert(identifier.to_vec(), StoredBlob::new(aid, index, blob));
        if let Err(e) = self.save() {
            self.records.remove(identifier);
            return Err(e);
        }
        Ok(())
    }

    fn get_indexed_blob(&mut self, aid: &[u8], identifier: &[u8]) -> Result<IndexedBlob, TokenError> {
        self.records.get(identifier).ok_or(TokenError::NotFound)?.read(aid)
    }

    fn remove_blob(&mut self, aid: &[u8], identifier: &[u8]) -> Result<bool, TokenError> {
        let removed = match self.records.get(identifier) {
            None => return Ok(false),
            Some(stored) if stored.aid != aid => return Err(TokenError::AuthMismatch),
            Some(_) => self.records.remove(identifier),
        };
        if let Err(e) = self.save() {
            if let Some(stored) = removed {
                self.records.insert(identifier.to_vec(), stored);
            }
            return Err(e);
        }
        Ok(true)
    }
}
