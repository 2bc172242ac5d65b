//! Configuration loaded from `.keychain.toml`.

pub mod settings;

pub use settings::Settings;
