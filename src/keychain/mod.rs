//! Keychain module — blind-indexed encrypted password storage.
//!
//! This module provides:
//! - The encrypted `Record` type stored per slot (`record`)
//! - The JSON store format and rollback checksums (`format`)
//! - The `Keychain` itself: init, load, set, get, remove, list, dump (`store`)
//! - A lock-guarded handle for multi-threaded callers (`shared`)

pub mod format;
pub mod record;
pub mod shared;
pub mod store;

// Re-export the most commonly used items.
pub use format::{SerializedStore, Verifier};
pub use record::Record;
pub use shared::SharedKeychain;
pub use store::{Dump, Keychain, ListEntry};
