//! `keychain list` — display all stored domains in a table.

use crate::cli::output;
use crate::cli::{open_keychain, store_paths, Cli};
use crate::errors::Result;

/// Execute the `list` command.
pub fn execute(cli: &Cli) -> Result<()> {
    let paths = store_paths(cli)?;
    let keychain = open_keychain(&paths)?;

    let mut entries = keychain.list();
    entries.sort_by(|a, b| a.domain.cmp(&b.domain));

    output::info(&format!("{} password(s) stored", entries.len()));
    output::print_entries_table(&entries);

    Ok(())
}
