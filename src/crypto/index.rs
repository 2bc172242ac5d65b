//! Blind indexing of domain names.
//!
//! A domain is never stored in the clear as a table key. Instead the
//! key is `base64(HMAC-SHA256(hmac_key, domain))`: equal domains map to
//! equal indices, and nothing about the domain leaks without the key.

use std::fmt;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Serialize};

use super::keys::HmacKey;
use super::provider::CryptoProvider;
use crate::errors::Result;

/// Number of leading characters shown when an index stands in for a domain.
const SHORT_LEN: usize = 12;

/// Deterministic, keyed lookup key for one domain.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlindIndex(String);

impl BlindIndex {
    /// Wrap an index read back from a serialized store.
    pub fn from_encoded(encoded: impl Into<String>) -> Self {
        Self(encoded.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Bytes used as AEAD associated data for records in this slot.
    pub fn as_aad(&self) -> &[u8] {
        self.0.as_bytes()
    }

    /// A truncated, display-only form: first 12 characters + "...".
    pub fn short(&self) -> String {
        let head: String = self.0.chars().take(SHORT_LEN).collect();
        format!("{head}...")
    }
}

impl fmt::Display for BlindIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Compute the blind index of `domain`.
pub fn blind_index<P: CryptoProvider + ?Sized>(
    provider: &P,
    hmac_key: &HmacKey,
    domain: &str,
) -> Result<BlindIndex> {
    let tag = provider.hmac_sha256(hmac_key.as_bytes(), domain.as_bytes())?;
    Ok(BlindIndex(BASE64.encode(tag)))
}
