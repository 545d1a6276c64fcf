// src/cli/mod.rs
// Command line: interactive session by default, catalog listings as subcommands

pub mod inspect;

use crate::session::EditMode;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "sinq")]
#[command(version, about = "sinq - browse and edit SQLite tables through their foreign keys", long_about = None)]
pub struct Cli {
    /// Settings file to use instead of the per-user app_settings.json
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Log filter, e.g. `info` or `sinq=debug` (SINQ_LOG takes precedence)
    #[arg(long, value_name = "FILTER")]
    pub log_level: Option<String>,

    /// Edit granularity for this run
    #[arg(long, value_enum)]
    pub mode: Option<EditMode>,

    /// Start at this table's menu instead of the table list
    #[arg(long, value_name = "TABLE")]
    pub table: Option<String>,

    /// Path to an existing SQLite database
    pub database: PathBuf,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// List user tables
    Tables,

    /// List a table's columns with type, affinity and key position
    Columns {
        table: String,
    },

    /// List a table's foreign keys and which column represents each one
    ForeignKeys {
        table: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_session_flags() {
        let cli = Cli::try_parse_from(["sinq", "--mode", "single-column", "--table", "city", "db.sqlite"]).unwrap();
        assert_eq!(cli.mode, Some(EditMode::SingleColumn));
        assert_eq!(cli.table.as_deref(), Some("city"));
        assert_eq!(cli.database, PathBuf::from("db.sqlite"));
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_parse_subcommand() {
        let cli = Cli::try_parse_from(["sinq", "db.sqlite", "foreign-keys", "book"]).unwrap();
        assert_eq!(
            cli.command,
            Some(Commands::ForeignKeys {
                table: "book".to_string()
            })
        );
    }

    #[test]
    fn test_database_is_required() {
        assert!(Cli::try_parse_from(["sinq"]).is_err());
    }
}
