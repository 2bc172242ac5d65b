//! The keychain: a blind-indexed table of encrypted domain passwords.
//!
//! `Keychain` owns the session subkeys and the record table. Create one
//! with `Keychain::init` or `Keychain::load`, mutate it with `set` and
//! `remove`, and persist it with `dump`. The keychain performs no I/O.

use tracing::{debug, info, warn};
use zeroize::Zeroize;

use crate::crypto::record::{open, seal};
use crate::crypto::{
    blind_index, derive_subkeys, generate_salt, BlindIndex, CryptoProvider, KdfParams, Subkeys,
    SystemCrypto, DEFAULT_ITERATIONS, MIN_ITERATIONS, SALT_LEN,
};
use crate::errors::{KeychainError, Result};

use super::format::{records_checksum, verify_checksum, RecordTable, SerializedStore, Verifier};
use super::record::Record;

/// Constant sealed into the password verifier (also used as its AAD).
const VERIFIER_TAG: &[u8] = b"keychain-verifier";

/// One row of `Keychain::list`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListEntry {
    /// The decrypted domain, or a truncated blind index if the label
    /// could not be decrypted.
    pub domain: String,
    pub blind_index: BlindIndex,
}

/// Result of `Keychain::dump`.
#[derive(Debug, Clone)]
pub struct Dump {
    /// The full serialized keychain (JSON).
    pub store: String,
    /// The checksum to pin out-of-band and pass back into `load`.
    pub checksum: String,
}

/// The main keychain handle.
pub struct Keychain<P: CryptoProvider = SystemCrypto> {
    provider: P,

    /// Blind index -> encrypted record.
    records: RecordTable,

    salt: [u8; SALT_LEN],

    /// KDF parameters this keychain was created with.
    params: KdfParams,

    /// Derived HMAC and encryption keys (zeroized on drop).
    keys: Subkeys,
}

impl Keychain<SystemCrypto> {
    /// Create a new, empty keychain with default KDF parameters.
    pub fn init(password: &str) -> Result<Self> {
        Self::init_with(SystemCrypto, password, &KdfParams::default())
    }

    /// Load a serialized keychain, optionally checking a trusted checksum.
    ///
    /// Only stores written with the default iteration count are accepted.
    pub fn load(password: &str, serialized: &str, trusted_checksum: Option<&str>) -> Result<Self> {
        Self::load_inner(
            SystemCrypto,
            password,
            serialized,
            trusted_checksum,
            DEFAULT_ITERATIONS,
        )
    }
}

impl<P: CryptoProvider> Keychain<P> {
    // ------------------------------------------------------------------
    // Construction
    // ------------------------------------------------------------------

    /// Create a new, empty keychain using an explicit provider and params.
    ///
    /// Draws a fresh salt and derives the session subkeys from it.
    pub fn init_with(provider: P, password: &str, params: &KdfParams) -> Result<Self> {
        let salt = generate_salt(&provider)?;
        let keys = derive_subkeys(&provider, password.as_bytes(), &salt, params)?;

        info!(iterations = params.iterations, "created new keychain");

        Ok(Self {
            provider,
            records: RecordTable::new(),
            salt,
            params: *params,
            keys,
        })
    }

    /// Load a serialized keychain using an explicit provider.
    ///
    /// Accepts any stored iteration count in
    /// `MIN_ITERATIONS..=MAX_ITERATIONS`.
    ///
    /// 1. Parse the store, range-check its iteration count and derive
    ///    subkeys from the stored salt.
    /// 2. If `trusted_checksum` is given, recompute the table checksum and
    ///    fail with `Rollback` on mismatch.
    /// 3. Check the password against the verifier, or, for stores without
    ///    one, against an arbitrary record. An empty store without a
    ///    verifier is accepted as is.
    pub fn load_with(
        provider: P,
        password: &str,
        serialized: &str,
        trusted_checksum: Option<&str>,
    ) -> Result<Self> {
        Self::load_inner(
            provider,
            password,
            serialized,
            trusted_checksum,
            MIN_ITERATIONS,
        )
    }

    fn load_inner(
        provider: P,
        password: &str,
        serialized: &str,
        trusted_checksum: Option<&str>,
        min_iterations: u32,
    ) -> Result<Self> {
        let parsed = SerializedStore::parse(serialized)?;

        let salt: [u8; SALT_LEN] = parsed.salt.as_slice().try_into().map_err(|_| {
            KeychainError::Input(format!(
                "salt must be {SALT_LEN} bytes (got {})",
                parsed.salt.len()
            ))
        })?;
        let params = KdfParams::from_stored(parsed.iterations, min_iterations)?;
        let keys = derive_subkeys(&provider, password.as_bytes(), &salt, &params)?;

        if let Some(trusted) = trusted_checksum {
            let computed = records_checksum(&provider, &parsed.kvs)?;
            if let Err(e) = verify_checksum(&computed, trusted) {
                warn!("keychain checksum does not match the trusted checksum");
                return Err(e);
            }
        }

        let keychain = Self {
            provider,
            records: parsed.kvs,
            salt,
            params,
            keys,
        };
        keychain.probe_password(parsed.verifier.as_ref())?;

        info!(records = keychain.records.len(), "loaded keychain");
        Ok(keychain)
    }

    /// Confirm the derived keys can decrypt something from this store.
    fn probe_password(&self, verifier: Option<&Verifier>) -> Result<()> {
        let probe = match verifier {
            Some(v) => open(
                &self.provider,
                &self.keys.enc,
                &v.iv,
                &v.ciphertext,
                VERIFIER_TAG,
            )
            .map(|plain| plain.as_slice() == VERIFIER_TAG),
            None => match self.records.iter().next() {
                Some((index, record)) => open(
                    &self.provider,
                    &self.keys.enc,
                    &record.iv,
                    &record.ciphertext,
                    index.as_aad(),
                )
                .map(|_| true),
                None => {
                    debug!("empty keychain without verifier; password not checked");
                    return Ok(());
                }
            },
        };

        match probe {
            Ok(true) => Ok(()),
            Ok(false) | Err(KeychainError::Auth) | Err(KeychainError::Input(_)) => {
                warn!("password probe failed");
                Err(KeychainError::InvalidPassword)
            }
            Err(e) => Err(e),
        }
    }

    // ------------------------------------------------------------------
    // Record operations
    // ------------------------------------------------------------------

    /// Add or replace the password stored for `domain`.
    ///
    /// The password and the domain label are sealed independently, each
    /// with its own IV and both bound to the domain's blind index.
    pub fn set(&mut self, domain: &str, password: &str) -> Result<()> {
        let index = self.index_of(domain)?;

        let sealed_password = seal(
            &self.provider,
            &self.keys.enc,
            password.as_bytes(),
            index.as_aad(),
        )?;
        let sealed_label = seal(
            &self.provider,
            &self.keys.enc,
            domain.as_bytes(),
            index.as_aad(),
        )?;

        debug!(index = %index.short(), "upserting record");
        self.records
            .insert(index, Record::new(sealed_password, sealed_label));
        Ok(())
    }

    /// Return the password stored for `domain`, or `None` if there is none.
    ///
    /// A stored record that fails authentication is `KeychainError::Auth`,
    /// never `None`.
    pub fn get(&self, domain: &str) -> Result<Option<String>> {
        let index = self.index_of(domain)?;
        let Some(record) = self.records.get(&index) else {
            return Ok(None);
        };

        let plaintext = open(
            &self.provider,
            &self.keys.enc,
            &record.iv,
            &record.ciphertext,
            index.as_aad(),
        )
        .inspect_err(|_| warn!(index = %index.short(), "record failed authentication"))?;

        String::from_utf8(plaintext.to_vec()).map(Some).map_err(|e| {
            let mut bad_bytes = e.into_bytes();
            bad_bytes.zeroize();
            KeychainError::Input("stored password is not valid UTF-8".into())
        })
    }

    /// Remove the entry for `domain`. Returns whether anything was removed.
    pub fn remove(&mut self, domain: &str) -> Result<bool> {
        let index = self.index_of(domain)?;
        let removed = self.records.remove(&index).is_some();
        if removed {
            debug!(index = %index.short(), "removed record");
        }
        Ok(removed)
    }

    /// List every entry with its domain label.
    ///
    /// Entries whose label is missing or fails to decrypt are reported
    /// under a truncated form of their blind index.
    pub fn list(&self) -> Vec<ListEntry> {
        self.records
            .iter()
            .map(|(index, record)| ListEntry {
                domain: self
                    .decrypt_label(index, record)
                    .unwrap_or_else(|| index.short()),
                blind_index: index.clone(),
            })
            .collect()
    }

    fn decrypt_label(&self, index: &BlindIndex, record: &Record) -> Option<String> {
        let (iv, ct) = record.label()?;
        let plaintext = open(&self.provider, &self.keys.enc, iv, ct, index.as_aad()).ok()?;
        String::from_utf8(plaintext.to_vec()).ok()
    }

    // ------------------------------------------------------------------
    // Persistence
    // ------------------------------------------------------------------

    /// Serialize the keychain and compute the checksum of its table.
    pub fn dump(&self) -> Result<Dump> {
        let checksum = records_checksum(&self.provider, &self.records)?;
        let verifier = seal(&self.provider, &self.keys.enc, VERIFIER_TAG, VERIFIER_TAG)?;

        let serialized = SerializedStore {
            kvs: self.records.clone(),
            salt: self.salt.to_vec(),
            checksum: checksum.clone(),
            iterations: self.params.iterations,
            verifier: Some(verifier.into()),
        };

        Ok(Dump {
            store: serialized.to_json()?,
            checksum,
        })
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    /// Number of entries in the keychain.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Returns `true` if an entry exists for `domain`. No decryption is performed.
    pub fn contains(&self, domain: &str) -> Result<bool> {
        Ok(self.records.contains_key(&self.index_of(domain)?))
    }

    /// The blind index this keychain computes for `domain`.
    pub fn index_of(&self, domain: &str) -> Result<BlindIndex> {
        blind_index(&self.provider, &self.keys.hmac, domain)
    }

    /// The store's salt.
    pub fn salt(&self) -> &[u8; SALT_LEN] {
        &self.salt
    }

    /// KDF parameters in effect.
    pub fn params(&self) -> &KdfParams {
        &self.params
    }
}
