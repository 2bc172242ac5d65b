//! `keychain set` — add or replace the password for a domain.

use std::io::{self, IsTerminal, Read};

use zeroize::Zeroizing;

use crate::cli::output;
use crate::cli::{open_keychain, save_keychain, store_paths, Cli};
use crate::errors::{KeychainError, Result};

/// Execute the `set` command.
pub fn execute(cli: &Cli, domain: &str, password: Option<&str>) -> Result<()> {
    let paths = store_paths(cli)?;

    // Unlock first so a wrong master password fails before any input is read.
    let mut keychain = open_keychain(&paths)?;

    // Determine the password from one of three sources.
    let value = if let Some(v) = password {
        // Source 1: Inline value on the command line.
        output::warning("Password provided on command line — it may appear in shell history.");
        Zeroizing::new(v.to_string())
    } else if !io::stdin().is_terminal() {
        // Source 2: Piped input (stdin is not a terminal).
        let mut buf = Zeroizing::new(String::new());
        io::stdin().read_to_string(&mut buf)?;
        Zeroizing::new(buf.trim_end_matches(['\r', '\n']).to_string())
    } else {
        // Source 3: Interactive secure prompt (default).
        let pw = dialoguer::Password::new()
            .with_prompt(format!("Enter password for {domain}"))
            .interact()
            .map_err(|e| KeychainError::CommandFailed(format!("input prompt: {e}")))?;
        Zeroizing::new(pw)
    };

    let existed = keychain.contains(domain)?;
    keychain.set(domain, &value)?;
    save_keychain(&keychain, &paths)?;

    let verb = if existed { "updated" } else { "added" };
    output::success(&format!(
        "Password for '{domain}' {verb} ({} total)",
        keychain.len()
    ));

    Ok(())
}
