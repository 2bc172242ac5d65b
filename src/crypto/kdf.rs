//! Password-based key derivation using PBKDF2-HMAC-SHA256.
//!
//! The master password and the store's salt go through PBKDF2 to a
//! 256-bit master secret, which is then split into the two session
//! subkeys (see `keys`). The master secret never outlives this call.

use zeroize::Zeroize;

use super::keys::{split_master, Subkeys};
use super::provider::{CryptoProvider, DIGEST_LEN};
use crate::errors::{KeychainError, Result};

/// Length of the salt in bytes (128 bits).
pub const SALT_LEN: usize = 16;

/// Default PBKDF2 iteration count.
pub const DEFAULT_ITERATIONS: u32 = 100_000;

/// Minimum accepted iteration count.
pub const MIN_ITERATIONS: u32 = 1_000;

/// Maximum accepted iteration count. Stored parameters are not
/// authenticated, so this caps the work a rewritten store can demand.
pub const MAX_ITERATIONS: u32 = DEFAULT_ITERATIONS;

/// Configurable PBKDF2 parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KdfParams {
    /// Number of PBKDF2 iterations (default: 100 000).
    pub iterations: u32,
}

impl Default for KdfParams {
    fn default() -> Self {
        Self {
            iterations: DEFAULT_ITERATIONS,
        }
    }
}

impl KdfParams {
    /// Accept an iteration count read from a serialized store.
    ///
    /// Counts below `min` or above `MAX_ITERATIONS` are `Input` errors and
    /// never reach PBKDF2.
    pub fn from_stored(iterations: u32, min: u32) -> Result<Self> {
        if !(min..=MAX_ITERATIONS).contains(&iterations) {
            return Err(KeychainError::Input(format!(
                "stored PBKDF2 iterations must be between {min} and {MAX_ITERATIONS} (got {iterations})"
            )));
        }
        Ok(Self { iterations })
    }
}

/// Derive the HMAC and encryption subkeys from a password and salt.
///
/// Deterministic: the same password, salt and params always produce
/// the same subkeys.
pub fn derive_subkeys<P: CryptoProvider + ?Sized>(
    provider: &P,
    password: &[u8],
    salt: &[u8],
    params: &KdfParams,
) -> Result<Subkeys> {
    if !(MIN_ITERATIONS..=MAX_ITERATIONS).contains(&params.iterations) {
        return Err(KeychainError::KeyDerivationFailed(format!(
            "PBKDF2 iterations must be between {MIN_ITERATIONS} and {MAX_ITERATIONS} (got {})",
            params.iterations
        )));
    }
    if salt.len() != SALT_LEN {
        return Err(KeychainError::Input(format!(
            "salt must be {SALT_LEN} bytes (got {})",
            salt.len()
        )));
    }

    let mut master = [0u8; DIGEST_LEN];
    let derived = provider
        .pbkdf2_sha256(password, salt, params.iterations, &mut master)
        .and_then(|()| split_master(provider, &master));
    master.zeroize();

    derived
}

/// Generate a random salt for a new keychain.
pub fn generate_salt<P: CryptoProvider + ?Sized>(provider: &P) -> Result<[u8; SALT_LEN]> {
    let mut salt = [0u8; SALT_LEN];
    provider.fill_random(&mut salt)?;
    Ok(salt)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::provider::SystemCrypto;

    const FAST: KdfParams = KdfParams { iterations: 1_000 };

    #[test]
    fn rejects_weak_iteration_count() {
        let salt = [0u8; SALT_LEN];
        let weak = KdfParams { iterations: 10 };
        assert!(matches!(
            derive_subkeys(&SystemCrypto, b"pw", &salt, &weak),
            Err(KeychainError::KeyDerivationFailed(_))
        ));
    }

    #[test]
    fn rejects_excessive_iteration_count() {
        let salt = [0u8; SALT_LEN];
        let heavy = KdfParams {
            iterations: u32::MAX,
        };
        assert!(matches!(
            derive_subkeys(&SystemCrypto, b"pw", &salt, &heavy),
            Err(KeychainError::KeyDerivationFailed(_))
        ));
    }

    #[test]
    fn stored_iterations_are_range_checked() {
        assert_eq!(
            KdfParams::from_stored(DEFAULT_ITERATIONS, DEFAULT_ITERATIONS).unwrap(),
            KdfParams::default()
        );
        assert_eq!(
            KdfParams::from_stored(1_000, MIN_ITERATIONS).unwrap().iterations,
            1_000
        );
        for bad in [0, 999, DEFAULT_ITERATIONS + 1, u32::MAX] {
            assert!(matches!(
                KdfParams::from_stored(bad, MIN_ITERATIONS),
                Err(KeychainError::Input(_))
            ));
        }
        assert!(matches!(
            KdfParams::from_stored(1_000, DEFAULT_ITERATIONS),
            Err(KeychainError::Input(_))
        ));
    }

    #[test]
    fn rejects_wrong_salt_length() {
        assert!(matches!(
            derive_subkeys(&SystemCrypto, b"pw", &[0u8; 8], &FAST),
            Err(KeychainError::Input(_))
        ));
    }

    #[test]
    fn generated_salts_differ() {
        let a = generate_salt(&SystemCrypto).unwrap();
        let b = generate_salt(&SystemCrypto).unwrap();
        assert_ne!(a, b);
    }
}
