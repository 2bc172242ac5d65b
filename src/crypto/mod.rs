//! Cryptographic building blocks for the keychain.
//!
//! This module provides:
//! - The injectable `CryptoProvider` capability (`provider`)
//! - PBKDF2 password-based key derivation (`kdf`)
//! - Domain-separated HMAC / encryption subkeys (`keys`)
//! - Blind indexing of domain names (`index`)
//! - Length-hiding AES-256-GCM record sealing (`record`)

pub mod index;
pub mod kdf;
pub mod keys;
pub mod provider;
pub mod record;

// Re-export the most commonly used items so callers can write:
//   use crate::crypto::{derive_subkeys, blind_index, seal, open, ...};
pub use index::{blind_index, BlindIndex};
pub use kdf::{
    derive_subkeys, generate_salt, KdfParams, DEFAULT_ITERATIONS, MAX_ITERATIONS, MIN_ITERATIONS,
    SALT_LEN,
};
pub use keys::{EncKey, HmacKey, Subkeys};
pub use provider::{CryptoProvider, SystemCrypto, IV_LEN};
pub use record::{open, seal, Sealed};
