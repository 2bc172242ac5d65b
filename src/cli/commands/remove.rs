//! `keychain remove` — delete the password stored for a domain.

use dialoguer::Confirm;

use crate::cli::output;
use crate::cli::{open_keychain, save_keychain, store_paths, Cli};
use crate::errors::{KeychainError, Result};

/// Execute the `remove` command.
pub fn execute(cli: &Cli, domain: &str, force: bool) -> Result<()> {
    let paths = store_paths(cli)?;

    // Unless --force is set, ask for confirmation before removing.
    if !force {
        let confirmed = Confirm::new()
            .with_prompt(format!("Remove password for '{domain}'?"))
            .default(false)
            .interact()
            .map_err(|e| KeychainError::CommandFailed(format!("confirm prompt: {e}")))?;

        if !confirmed {
            output::info("Cancelled.");
            return Ok(());
        }
    }

    let mut keychain = open_keychain(&paths)?;

    if keychain.remove(domain)? {
        save_keychain(&keychain, &paths)?;
        output::success(&format!("Removed password for '{domain}'"));
    } else {
        output::info(&format!("No password stored for '{domain}' — nothing to remove."));
    }

    Ok(())
}
