use std::path::PathBuf;
use thiserror::Error;

/// All errors that can occur in the keychain.
#[derive(Debug, Error)]
pub enum KeychainError {
    // --- Keychain protocol errors ---
    #[error("Invalid master password")]
    InvalidPassword,

    #[error("Integrity check failed — possible rollback attack")]
    Rollback,

    #[error("Decryption or integrity check failed — possible swap or tamper")]
    Auth,

    #[error("Malformed input: {0}")]
    Input(String),

    // --- Crypto errors ---
    #[error("Key derivation failed: {0}")]
    KeyDerivationFailed(String),

    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("Secure random source failed: {0}")]
    RandomFailed(String),

    // --- Store errors ---
    #[error("Keychain not found at {0}")]
    StoreNotFound(PathBuf),

    #[error("Keychain already exists at {0}")]
    StoreAlreadyExists(PathBuf),

    #[error("No password stored for '{0}'")]
    DomainNotFound(String),

    #[error("Keychain lock poisoned by a panicking thread")]
    LockPoisoned,

    // --- Config errors ---
    #[error("Config file error: {0}")]
    ConfigError(String),

    // --- IO errors ---
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // --- Serialization errors ---
    #[error("Serialization error: {0}")]
    SerializationError(String),

    // --- CLI errors ---
    #[error("Command failed: {0}")]
    CommandFailed(String),
}

/// Convenience type alias for keychain results.
pub type Result<T> = std::result::Result<T, KeychainError>;
