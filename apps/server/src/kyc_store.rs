//! Encrypting filesystem object store for KYC documents.
//!
//! Blobs are sealed with ChaCha20-Poly1305 under the process-wide key
//! from `AMORA_KYC_ENCRYPTION_KEY`; the random nonce is prefixed to the
//! ciphertext file. Reads decrypt on open. Files that fail
//! authentication are returned raw only when the explicit legacy
//! fallback is enabled (pre-encryption deployments).

use std::fs;
use std::path::{Path, PathBuf};

use chacha20poly1305::{
    aead::{Aead, KeyInit},
    ChaCha20Poly1305, Key, Nonce,
};
use rand::{rngs::OsRng, RngCore};

use amora_core::errors::{Error, Result};
use amora_core::kyc::ObjectStore;

const NONCE_LEN: usize = 12;

pub struct EncryptedFileStore {
    root: PathBuf,
    key: [u8; 32],
    legacy_plaintext_fallback: bool,
}

impl EncryptedFileStore {
    pub fn new(root: impl Into<PathBuf>, key: [u8; 32], legacy_plaintext_fallback: bool) -> Self {
        Self {
            root: root.into(),
            key,
            legacy_plaintext_fallback,
        }
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        // Keys are generated internally, but refuse traversal anyway.
        let relative = Path::new(key);
        if relative
            .components()
            .any(|c| !matches!(c, std::path::Component::Normal(_)))
        {
            return Err(Error::Secret(format!("invalid object key '{key}'")));
        }
        Ok(self.root.join(relative))
    }

    fn cipher(&self) -> ChaCha20Poly1305 {
        ChaCha20Poly1305::new(Key::from_slice(&self.key))
    }
}

impl ObjectStore for EncryptedFileStore {
    fn put(&self, key: &str, bytes: &[u8]) -> Result<String> {
        let path = self.path_for(key)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut nonce_bytes = [0u8; NONCE_LEN];
        OsRng.fill_bytes(&mut nonce_bytes);
        let ciphertext = self
            .cipher()
            .encrypt(Nonce::from_slice(&nonce_bytes), bytes)
            .map_err(|_| Error::Secret("failed to encrypt object".into()))?;

        let mut sealed = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        sealed.extend_from_slice(&nonce_bytes);
        sealed.extend_from_slice(&ciphertext);
        fs::write(&path, sealed)?;

        Ok(key.to_string())
    }

    fn get(&self, key: &str) -> Result<Vec<u8>> {
        let path = self.path_for(key)?;
        let raw = fs::read(&path)?;

        if raw.len() > NONCE_LEN {
            let (nonce_bytes, ciphertext) = raw.split_at(NONCE_LEN);
            if let Ok(plaintext) = self
                .cipher()
                .decrypt(Nonce::from_slice(nonce_bytes), ciphertext)
            {
                return Ok(plaintext);
            }
        }

        if self.legacy_plaintext_fallback {
            // Pre-encryption file; serve the raw bytes.
            return Ok(raw);
        }
        Err(Error::Secret(format!(
            "object '{key}' failed authentication"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn round_trip_encrypts_at_rest() {
        let dir = tempdir().unwrap();
        let store = EncryptedFileStore::new(dir.path(), [7u8; 32], false);

        let key = store.put("kyc/documents/doc1", b"passport scan").unwrap();
        assert_eq!(store.get(&key).unwrap(), b"passport scan");

        // The file on disk is not the plaintext.
        let on_disk = std::fs::read(dir.path().join("kyc/documents/doc1")).unwrap();
        assert_ne!(on_disk, b"passport scan");
        assert!(on_disk.len() > b"passport scan".len());
    }

    #[test]
    fn wrong_key_fails_closed_without_legacy_flag() {
        let dir = tempdir().unwrap();
        let store = EncryptedFileStore::new(dir.path(), [1u8; 32], false);
        store.put("kyc/documents/doc2", b"secret").unwrap();

        let other = EncryptedFileStore::new(dir.path(), [2u8; 32], false);
        assert!(other.get("kyc/documents/doc2").is_err());
    }

    #[test]
    fn legacy_flag_returns_raw_bytes() {
        let dir = tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("kyc/documents")).unwrap();
        std::fs::write(dir.path().join("kyc/documents/legacy"), b"plain old file").unwrap();

        let store = EncryptedFileStore::new(dir.path(), [1u8; 32], true);
        assert_eq!(store.get("kyc/documents/legacy").unwrap(), b"plain old file");

        let strict = EncryptedFileStore::new(dir.path(), [1u8; 32], false);
        assert!(strict.get("kyc/documents/legacy").is_err());
    }

    #[test]
    fn rejects_traversal_keys() {
        let dir = tempdir().unwrap();
        let store = EncryptedFileStore::new(dir.path(), [1u8; 32], false);
        assert!(store.put("../escape", b"x").is_err());
    }
}
