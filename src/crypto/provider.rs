//! The capability every keychain component draws its primitives from.
//!
//! Nothing in the crate reaches for a global crypto singleton: the
//! provider is handed to key derivation, indexing and the record codec
//! explicitly, so tests can wrap or replace it.

use aes_gcm::aead::{Aead, KeyInit, Payload};
use aes_gcm::{Aes256Gcm, Nonce};
use hmac::{Hmac, Mac};
use rand::rngs::OsRng;
use rand::TryRngCore;
use sha2::{Digest, Sha256};

use crate::errors::{KeychainError, Result};

/// Length of an AES-256-GCM nonce in bytes.
pub const IV_LEN: usize = 12;

/// Length of a SHA-256 digest / HMAC-SHA256 tag in bytes.
pub const DIGEST_LEN: usize = 32;

/// Cryptographic primitives used by the keychain.
pub trait CryptoProvider: Send + Sync {
    /// PBKDF2 with HMAC-SHA256, filling `out` completely.
    fn pbkdf2_sha256(
        &self,
        password: &[u8],
        salt: &[u8],
        iterations: u32,
        out: &mut [u8],
    ) -> Result<()>;

    /// HMAC-SHA256 of `data` under `key`.
    fn hmac_sha256(&self, key: &[u8], data: &[u8]) -> Result<[u8; DIGEST_LEN]>;

    /// AES-256-GCM encryption. Returns ciphertext with the tag appended.
    fn aead_seal(&self, key: &[u8], iv: &[u8], plaintext: &[u8], aad: &[u8]) -> Result<Vec<u8>>;

    /// AES-256-GCM decryption. Any verification failure is `KeychainError::Auth`.
    fn aead_open(&self, key: &[u8], iv: &[u8], ciphertext: &[u8], aad: &[u8]) -> Result<Vec<u8>>;

    /// Fill `buf` from a cryptographically strong random source.
    fn fill_random(&self, buf: &mut [u8]) -> Result<()>;

    /// SHA-256 digest of `data`.
    fn sha256(&self, data: &[u8]) -> [u8; DIGEST_LEN];
}

/// Production provider backed by the RustCrypto crates and the OS RNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemCrypto;

impl CryptoProvider for SystemCrypto {
    fn pbkdf2_sha256(
        &self,
        password: &[u8],
        salt: &[u8],
        iterations: u32,
        out: &mut [u8],
    ) -> Result<()> {
        pbkdf2::pbkdf2_hmac::<Sha256>(password, salt, iterations, out);
        Ok(())
    }

    fn hmac_sha256(&self, key: &[u8], data: &[u8]) -> Result<[u8; DIGEST_LEN]> {
        let mut mac = <Hmac<Sha256> as Mac>::new_from_slice(key)
            .map_err(|e| KeychainError::KeyDerivationFailed(format!("invalid HMAC key: {e}")))?;
        mac.update(data);
        Ok(mac.finalize().into_bytes().into())
    }

    fn aead_seal(&self, key: &[u8], iv: &[u8], plaintext: &[u8], aad: &[u8]) -> Result<Vec<u8>> {
        if iv.len() != IV_LEN {
            return Err(KeychainError::EncryptionFailed(format!(
                "IV must be {IV_LEN} bytes (got {})",
                iv.len()
            )));
        }
        let cipher = Aes256Gcm::new_from_slice(key)
            .map_err(|e| KeychainError::EncryptionFailed(format!("invalid key length: {e}")))?;

        cipher
            .encrypt(
                Nonce::from_slice(iv),
                Payload {
                    msg: plaintext,
                    aad,
                },
            )
            .map_err(|e| KeychainError::EncryptionFailed(format!("encryption error: {e}")))
    }

    fn aead_open(&self, key: &[u8], iv: &[u8], ciphertext: &[u8], aad: &[u8]) -> Result<Vec<u8>> {
        // A wrong-sized IV can only come from a tampered record.
        if iv.len() != IV_LEN {
            return Err(KeychainError::Auth);
        }
        let cipher = Aes256Gcm::new_from_slice(key).map_err(|_| KeychainError::Auth)?;

        cipher
            .decrypt(
                Nonce::from_slice(iv),
                Payload {
                    msg: ciphertext,
                    aad,
                },
            )
            .map_err(|_| KeychainError::Auth)
    }

    fn fill_random(&self, buf: &mut [u8]) -> Result<()> {
        OsRng
            .try_fill_bytes(buf)
            .map_err(|e| KeychainError::RandomFailed(e.to_string()))
    }

    fn sha256(&self, data: &[u8]) -> [u8; DIGEST_LEN] {
        Sha256::digest(data).into()
    }
}
