//! One module per subcommand. Each exposes an `execute` function.

pub mod completions;
pub mod get;
pub mod init;
pub mod list;
pub mod remove;
pub mod set;
