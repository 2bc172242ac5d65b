//! `keychain init` — create a new, empty keychain on disk.

use std::fs;

use crate::cli::output;
use crate::cli::{prompt_new_password, save_keychain, settings, Cli, StorePaths};
use crate::errors::{KeychainError, Result};
use crate::keychain::Keychain;

/// Execute the `init` command.
pub fn execute(cli: &Cli) -> Result<()> {
    let (cwd, settings) = settings(cli)?;
    let paths = StorePaths::new(&cwd, &settings);

    // 1. Create the store directory if it doesn't exist.
    if !paths.dir.exists() {
        fs::create_dir_all(&paths.dir)?;
        output::info(&format!("Created keychain directory: {}", paths.dir.display()));
    }

    // 2. Refuse to overwrite an existing keychain.
    if paths.store.exists() {
        output::tip("Use `keychain set` to add passwords to the existing keychain.");
        return Err(KeychainError::StoreAlreadyExists(paths.store));
    }

    // 3. Prompt for a new master password (with confirmation).
    let password = prompt_new_password()?;

    // 4. Derive keys, then persist the empty keychain and pin its checksum.
    let keychain = Keychain::init(&password)?;
    save_keychain(&keychain, &paths)?;

    output::success(&format!("Keychain created at {}", paths.store.display()));
    output::tip("Run `keychain set <DOMAIN>` to add a password.");
    output::tip("Run `keychain list` to see all stored domains.");

    Ok(())
}
