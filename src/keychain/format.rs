//! Serialized keychain format and rollback checksums.
//!
//! A dumped keychain is a JSON object:
//!
//! ```text
//! {
//!   "kvs":        { "<blind index>": { iv, ciphertext, labelIv, labelCiphertext }, ... },
//!   "salt":       "<base64, 16 bytes>",
//!   "checksum":   "<base64 SHA-256 of the serialized kvs>",
//!   "iterations": 100000,
//!   "verifier":   { iv, ciphertext }
//! }
//! ```
//!
//! - **kvs**: the record table, keyed by blind index. A `BTreeMap` keeps
//!   the serialization deterministic, so the checksum recomputed after a
//!   parse matches the one produced at dump time.
//! - **checksum**: informational copy; only a caller-pinned checksum is
//!   trusted during load.
//! - **iterations**: PBKDF2 iterations chosen at init (defaults to 100 000).
//!   Not authenticated; range-checked on load before any key derivation.
//! - **verifier**: optional sealed constant used to check the password
//!   even when the table is empty.

use std::collections::BTreeMap;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;

use super::record::Record;
use crate::crypto::{BlindIndex, CryptoProvider, Sealed, DEFAULT_ITERATIONS};
use crate::errors::{KeychainError, Result};

/// The record table: blind index -> encrypted record.
pub type RecordTable = BTreeMap<BlindIndex, Record>;

// ---------------------------------------------------------------------------
// SerializedStore
// ---------------------------------------------------------------------------

/// Sealed known constant proving the password at load time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verifier {
    #[serde(serialize_with = "base64_encode", deserialize_with = "base64_decode")]
    pub iv: Vec<u8>,

    #[serde(serialize_with = "base64_encode", deserialize_with = "base64_decode")]
    pub ciphertext: Vec<u8>,
}

impl From<Sealed> for Verifier {
    fn from(sealed: Sealed) -> Self {
        Self {
            iv: sealed.iv.to_vec(),
            ciphertext: sealed.ciphertext,
        }
    }
}

/// The persisted / exported form of a keychain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SerializedStore {
    pub kvs: RecordTable,

    #[serde(serialize_with = "base64_encode", deserialize_with = "base64_decode")]
    pub salt: Vec<u8>,

    #[serde(default)]
    pub checksum: String,

    #[serde(default = "default_iterations")]
    pub iterations: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verifier: Option<Verifier>,
}

fn default_iterations() -> u32 {
    DEFAULT_ITERATIONS
}

impl SerializedStore {
    /// Parse a serialized keychain. Any JSON or base64 problem is an input error.
    pub fn parse(serialized: &str) -> Result<Self> {
        serde_json::from_str(serialized)
            .map_err(|e| KeychainError::Input(format!("keychain JSON: {e}")))
    }

    /// Render as JSON text.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self)
            .map_err(|e| KeychainError::SerializationError(format!("keychain: {e}")))
    }
}

// ---------------------------------------------------------------------------
// Checksums
// ---------------------------------------------------------------------------

/// SHA-256 over the JSON serialization of the record table, base64-encoded.
pub fn records_checksum<P: CryptoProvider + ?Sized>(
    provider: &P,
    records: &RecordTable,
) -> Result<String> {
    let bytes = serde_json::to_vec(records)
        .map_err(|e| KeychainError::SerializationError(format!("records: {e}")))?;
    Ok(BASE64.encode(provider.sha256(&bytes)))
}

/// Compare a recomputed checksum with a trusted one in constant time.
pub fn verify_checksum(computed: &str, trusted: &str) -> Result<()> {
    if bool::from(computed.as_bytes().ct_eq(trusted.trim().as_bytes())) {
        Ok(())
    } else {
        Err(KeychainError::Rollback)
    }
}

// ---------------------------------------------------------------------------
// Serde helpers for base64-encoded Vec<u8> fields
// ---------------------------------------------------------------------------

pub(crate) fn base64_encode<S>(data: &[u8], serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    let encoded = BASE64.encode(data);
    serializer.serialize_str(&encoded)
}

pub(crate) fn base64_decode<'de, D>(deserializer: D) -> std::result::Result<Vec<u8>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    BASE64.decode(&s).map_err(serde::de::Error::custom)
}

pub(crate) fn base64_encode_opt<S>(
    data: &Option<Vec<u8>>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    match data {
        Some(bytes) => base64_encode(bytes, serializer),
        None => serializer.serialize_none(),
    }
}

pub(crate) fn base64_decode_opt<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<Vec<u8>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = Option::<String>::deserialize(deserializer)?;
    s.map(|s| BASE64.decode(&s).map_err(serde::de::Error::custom))
        .transpose()
}
