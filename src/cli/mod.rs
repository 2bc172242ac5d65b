//! CLI module — Clap argument parser, output helpers, and command implementations.

pub mod commands;
pub mod output;

use std::path::{Path, PathBuf};

use clap::Parser;
use zeroize::Zeroizing;

use crate::config::Settings;
use crate::errors::{KeychainError, Result};
use crate::keychain::Keychain;
use crate::persist;

/// Minimum length for a new master password.
const MIN_PASSWORD_LEN: usize = 8;

/// Environment variable consulted before prompting for the master password.
const PASSWORD_ENV: &str = "KEYCHAIN_PASSWORD";

/// Longest domain name accepted on the command line, in bytes.
const MAX_DOMAIN_LEN: usize = 253;

/// Keychain CLI: encrypted password store with blind-indexed domains.
#[derive(Parser)]
#[command(
    name = "keychain",
    about = "Encrypted password keychain with blind-indexed domains",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Keychain directory (overrides `store_dir` in .keychain.toml)
    #[arg(long, global = true)]
    pub store_dir: Option<String>,
}

/// All available subcommands.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Create a new, empty keychain
    Init,

    /// Store a password for a domain (add or replace)
    Set {
        /// Domain name (e.g. example.com)
        #[arg(value_parser = parse_domain)]
        domain: String,
        /// Password (omit for interactive prompt)
        password: Option<String>,
    },

    /// Print the password stored for a domain
    Get {
        /// Domain name
        #[arg(value_parser = parse_domain)]
        domain: String,
    },

    /// List all stored domains
    List,

    /// Remove the password stored for a domain
    Remove {
        /// Domain name
        #[arg(value_parser = parse_domain)]
        domain: String,
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },

    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Clap value parser for domain arguments: non-empty, at most 253 bytes.
pub fn parse_domain(raw: &str) -> std::result::Result<String, String> {
    if raw.is_empty() {
        return Err("domain cannot be empty".into());
    }
    if raw.len() > MAX_DOMAIN_LEN {
        return Err(format!("domain cannot exceed {MAX_DOMAIN_LEN} bytes"));
    }
    Ok(raw.to_string())
}

// ---------------------------------------------------------------------------
// Shared helpers used by multiple commands
// ---------------------------------------------------------------------------

/// Resolved on-disk locations for one keychain.
#[derive(Debug, Clone)]
pub struct StorePaths {
    pub dir: PathBuf,
    pub store: PathBuf,
    pub checksum: PathBuf,
}

/// Load settings from the working directory and apply CLI overrides.
pub fn settings(cli: &Cli) -> Result<(PathBuf, Settings)> {
    let cwd = std::env::current_dir()?;
    let mut settings = Settings::load(&cwd)?;
    if let Some(dir) = &cli.store_dir {
        settings.store_dir = dir.clone();
    }
    Ok((cwd, settings))
}

impl StorePaths {
    pub fn new(project_dir: &Path, settings: &Settings) -> Self {
        Self {
            dir: settings.store_dir(project_dir),
            store: settings.store_path(project_dir),
            checksum: settings.checksum_path(project_dir),
        }
    }
}

/// Build the store and checksum paths from the CLI arguments.
pub fn store_paths(cli: &Cli) -> Result<StorePaths> {
    let (cwd, settings) = settings(cli)?;
    Ok(StorePaths::new(&cwd, &settings))
}

/// Get the master password, trying in order:
/// 1. `KEYCHAIN_PASSWORD` env var (scripts/CI)
/// 2. Interactive prompt
///
/// Returns `Zeroizing<String>` so the password is wiped from memory on drop.
pub fn prompt_password() -> Result<Zeroizing<String>> {
    if let Ok(pw) = std::env::var(PASSWORD_ENV) {
        if !pw.is_empty() {
            return Ok(Zeroizing::new(pw));
        }
    }

    let pw = dialoguer::Password::new()
        .with_prompt("Enter master password")
        .interact()
        .map_err(|e| KeychainError::CommandFailed(format!("password prompt: {e}")))?;
    Ok(Zeroizing::new(pw))
}

/// Prompt for a new master password with confirmation (used during `init`).
///
/// Also respects `KEYCHAIN_PASSWORD`. Enforces a minimum password length.
pub fn prompt_new_password() -> Result<Zeroizing<String>> {
    if let Ok(pw) = std::env::var(PASSWORD_ENV) {
        if !pw.is_empty() {
            if pw.len() < MIN_PASSWORD_LEN {
                return Err(KeychainError::CommandFailed(format!(
                    "password must be at least {MIN_PASSWORD_LEN} characters"
                )));
            }
            return Ok(Zeroizing::new(pw));
        }
    }

    loop {
        let password = dialoguer::Password::new()
            .with_prompt("Choose master password")
            .with_confirmation(
                "Confirm master password",
                "Passwords do not match, try again",
            )
            .interact()
            .map_err(|e| KeychainError::CommandFailed(format!("password prompt: {e}")))?;

        if password.len() < MIN_PASSWORD_LEN {
            output::warning(&format!(
                "Password must be at least {MIN_PASSWORD_LEN} characters. Try again."
            ));
            continue;
        }

        return Ok(Zeroizing::new(password));
    }
}

/// Read the keychain from disk and unlock it against the pinned checksum.
pub fn open_keychain(paths: &StorePaths) -> Result<Keychain> {
    let serialized = persist::read_store(&paths.store)?;
    let trusted = persist::read_checksum(&paths.checksum)?;
    if trusted.is_none() {
        output::warning("No trusted checksum found — rollback protection is off for this load.");
    }

    let password = prompt_password()?;
    Keychain::load(&password, &serialized, trusted.as_deref())
}

/// Dump the keychain and write it plus its new pinned checksum.
pub fn save_keychain(keychain: &Keychain, paths: &StorePaths) -> Result<()> {
    let dump = keychain.dump()?;
    persist::save(&paths.store, &paths.checksum, &dump.store, &dump.checksum)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_domain_bounds() {
        assert_eq!(parse_domain("example.com").unwrap(), "example.com");
        assert!(parse_domain(&"a".repeat(MAX_DOMAIN_LEN)).is_ok());
        assert!(parse_domain("").is_err());
        assert!(parse_domain(&"a".repeat(MAX_DOMAIN_LEN + 1)).is_err());
    }

    #[test]
    fn completions_shell_is_a_value_enum() {
        let cli = Cli::try_parse_from(["keychain", "completions", "zsh"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Completions {
                shell: clap_complete::Shell::Zsh
            }
        ));
        assert!(Cli::try_parse_from(["keychain", "completions", "csh"]).is_err());
    }

    #[test]
    fn set_rejects_empty_domain_argument() {
        assert!(Cli::try_parse_from(["keychain", "set", "", "pw"]).is_err());
    }
}
