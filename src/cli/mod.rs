//! CLI module - Command-line interface for laptopdash
//!
//! This module provides a structured CLI using clap for argument parsing.

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// laptopdash - Laptop catalog dashboard
/// Browse and analyze scraped laptop listings
#[derive(Parser)]
#[command(name = "laptopdash")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the web dashboard
    #[command(alias = "web")]
    Serve,

    /// Create an administrator account
    CreateAdmin {
        username: String,
        email: String,
        password: String,
    },

    /// List all user accounts
    #[command(alias = "users")]
    ListUsers,

    /// Replace a user's password
    ResetPassword {
        username: String,
        new_password: String,
    },

    /// Import or refresh the catalog from a cleaned CSV export
    ImportCsv {
        /// CSV file to read (defaults to import.csv_path)
        #[arg(long = "csv-path", alias = "csv_path")]
        csv_path: Option<PathBuf>,
    },

    /// Create the schema and a bootstrap admin when no user exists
    InitDb,

    /// Create the single-column lookup indexes
    CreateIndexes,

    /// Fill in missing memory sizes from the free-text RAM column
    BackfillRamGb,

    /// Create default config file
    Init,
}

pub use commands::*;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_import_csv_path() {
        let cli = Cli::try_parse_from(["laptopdash", "import-csv", "--csv-path", "data/x.csv"])
            .unwrap();
        match cli.command {
            Some(Commands::ImportCsv { csv_path }) => {
                assert_eq!(csv_path, Some(PathBuf::from("data/x.csv")));
            }
            _ => panic!("expected import-csv"),
        }
    }

    #[test]
    fn test_parse_reset_password() {
        let cli = Cli::try_parse_from(["laptopdash", "reset-password", "alice", "s3cret!"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::ResetPassword { ref username, ref new_password })
                if username == "alice" && new_password == "s3cret!"
        ));
    }

    #[test]
    fn test_create_admin_requires_all_arguments() {
        assert!(Cli::try_parse_from(["laptopdash", "create-admin", "root"]).is_err());
    }
}
