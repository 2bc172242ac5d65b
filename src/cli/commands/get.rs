//! `keychain get` — print the password stored for a domain.

use crate::cli::{open_keychain, store_paths, Cli};
use crate::errors::{KeychainError, Result};

/// Execute the `get` command.
pub fn execute(cli: &Cli, domain: &str) -> Result<()> {
    let paths = store_paths(cli)?;
    let keychain = open_keychain(&paths)?;

    match keychain.get(domain)? {
        Some(password) => {
            println!("{password}");
            Ok(())
        }
        None => Err(KeychainError::DomainNotFound(domain.to_string())),
    }
}
