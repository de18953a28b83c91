pub mod config;
pub mod doctor;
pub mod migrate;

use clap::{Parser, Subcommand};

/// wcp-server — the World Control Protocol surface for one world.
#[derive(Debug, Parser)]
#[command(name = "wcp-server", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Start the WCP server (default when no subcommand is given).
    Serve,
    /// Run diagnostic checks against the current configuration.
    Doctor,
    /// Configuration utilities.
    #[command(subcommand)]
    Config(ConfigCommand),
    /// Database migration utilities.
    #[command(subcommand)]
    Migrate(MigrateCommand),
    /// Print version information.
    Version,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the resolved configuration (secrets redacted).
    Show,
    /// Validate the resolved configuration and exit non-zero on error.
    Validate,
}

#[derive(Debug, Subcommand)]
pub enum MigrateCommand {
    /// Apply all pending migrations.
    Up,
    /// Roll back the most recently applied migration.
    Down,
    /// Print applied migration status.
    Status,
}
