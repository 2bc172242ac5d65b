//! A cloneable, thread-safe handle around one `Keychain`.
//!
//! Reads (`get`, `list`, `dump`) share a read lock; `set` and `remove`
//! take the write lock, so read-modify-write on the table is serialized
//! and every caller observes operations in lock order.

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::crypto::{CryptoProvider, SystemCrypto};
use crate::errors::{KeychainError, Result};

use super::store::{Dump, Keychain, ListEntry};

/// Shared handle to a keychain.
pub struct SharedKeychain<P: CryptoProvider = SystemCrypto> {
    inner: Arc<RwLock<Keychain<P>>>,
}

impl<P: CryptoProvider> Clone for SharedKeychain<P> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<P: CryptoProvider> SharedKeychain<P> {
    pub fn new(keychain: Keychain<P>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(keychain)),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Keychain<P>>> {
        self.inner.read().map_err(|_| KeychainError::LockPoisoned)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Keychain<P>>> {
        self.inner.write().map_err(|_| KeychainError::LockPoisoned)
    }

    pub fn set(&self, domain: &str, password: &str) -> Result<()> {
        self.write()?.set(domain, password)
    }

    pub fn get(&self, domain: &str) -> Result<Option<String>> {
        self.read()?.get(domain)
    }

    pub fn remove(&self, domain: &str) -> Result<bool> {
        self.write()?.remove(domain)
    }

    pub fn list(&self) -> Result<Vec<ListEntry>> {
        Ok(self.read()?.list())
    }

    pub fn dump(&self) -> Result<Dump> {
        self.read()?.dump()
    }

    pub fn len(&self) -> Result<usize> {
        Ok(self.read()?.len())
    }
}
