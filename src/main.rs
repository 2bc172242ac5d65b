use clap::Parser;
use keychain::cli::{Cli, Commands};
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter (e.g. `KEYCHAIN_LOG=debug`).
const LOG_ENV: &str = "KEYCHAIN_LOG";

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let result = match cli.command {
        Commands::Init => keychain::cli::commands::init::execute(&cli),
        Commands::Set {
            ref domain,
            ref password,
        } => keychain::cli::commands::set::execute(&cli, domain, password.as_deref()),
        Commands::Get { ref domain } => keychain::cli::commands::get::execute(&cli, domain),
        Commands::List => keychain::cli::commands::list::execute(&cli),
        Commands::Remove { ref domain, force } => {
            keychain::cli::commands::remove::execute(&cli, domain, force)
        }
        Commands::Completions { shell } => keychain::cli::commands::completions::execute(shell),
    };

    if let Err(e) = result {
        keychain::cli::output::error(&e.to_string());
        std::process::exit(1);
    }
}
