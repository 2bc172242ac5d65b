//! Session subkeys derived from the master password.
//!
//! From the PBKDF2 output we derive, by HMAC over fixed labels:
//! - an **HMAC key** used only to compute blind domain indices,
//! - an **encryption key** used only for AES-256-GCM record sealing.
//!
//! Neither key is ever serialized. Both wipe their bytes on drop.

use zeroize::{Zeroize, ZeroizeOnDrop};

use super::provider::{CryptoProvider, DIGEST_LEN};
use crate::errors::Result;

/// Length of derived sub-keys (256 bits).
pub const KEY_LEN: usize = 32;

/// Label MAC'd under the master secret to obtain the index key.
const HMAC_KEY_LABEL: &[u8] = b"HMACKEY";

/// Label MAC'd under the master secret to obtain the encryption key.
const ENC_KEY_LABEL: &[u8] = b"ENCKEY";

/// Secret key for computing blind indices.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct HmacKey([u8; KEY_LEN]);

impl HmacKey {
    pub fn new(bytes: [u8; KEY_LEN]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }
}

/// Secret key for authenticated encryption of records.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct EncKey([u8; KEY_LEN]);

impl EncKey {
    pub fn new(bytes: [u8; KEY_LEN]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }
}

/// Both subkeys for one keychain session.
pub struct Subkeys {
    pub hmac: HmacKey,
    pub enc: EncKey,
}

impl std::fmt::Debug for Subkeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Subkeys { .. }")
    }
}

/// Split a master secret into independent HMAC and encryption subkeys.
pub fn split_master<P: CryptoProvider + ?Sized>(
    provider: &P,
    master: &[u8; DIGEST_LEN],
) -> Result<Subkeys> {
    let mut hmac_bytes = provider.hmac_sha256(master, HMAC_KEY_LABEL)?;
    let mut enc_bytes = provider.hmac_sha256(master, ENC_KEY_LABEL)?;

    let keys = Subkeys {
        hmac: HmacKey::new(hmac_bytes),
        enc: EncKey::new(enc_bytes),
    };
    hmac_bytes.zeroize();
    enc_bytes.zeroize();

    Ok(keys)
}
