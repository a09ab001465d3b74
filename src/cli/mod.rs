// CLI Layer
// ユーザー入力の受付とコマンドルーティング

pub mod command_context;
pub mod commands;

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// 出力フォーマット
#[derive(Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Colored console table (default)
    #[default]
    Table,
    /// XML report
    Xml,
    /// Structured JSON output
    Json,
}

/// pgcmp - PostgreSQL Schema Comparison CLI
///
/// Compares two PostgreSQL catalog snapshots and reports what would have to be
/// created, dropped or altered to make the right side match the left side.
#[derive(Parser, Debug)]
#[command(name = "pgcmp")]
#[command(author = "pgcmp Contributors")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "PostgreSQL schema comparison CLI tool")]
#[command(long_about = "pgcmp - PostgreSQL Schema Comparison CLI

Compares the schema catalogs of two PostgreSQL databases (or exported
snapshot files) and classifies every object as added, removed or modified.

LEFT is the desired state, RIGHT is the current state. Every reported
action describes how to make RIGHT match LEFT.")]
#[command(propagate_version = true)]
#[command(after_help = "EXIT CODES:
  0  No differences
  2  Differences found
  1  Error (connection, query, file, config)

For detailed help on each command, use: pgcmp <command> --help")]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compare the schema catalogs of two databases
    ///
    /// Each side is either a connection string or a snapshot file
    /// previously written by `pgcmp export`.
    ///
    /// EXAMPLES:
    ///   # Compare two live databases
    ///   pgcmp compare postgres://localhost/desired postgres://localhost/current
    ///
    ///   # Preview the effect of a migration script on the right database
    ///   pgcmp compare desired.json postgres://localhost/current --apply-sql-file migrate.sql
    ///
    ///   # Machine-readable report
    ///   pgcmp compare left.json right.json --format xml
    Compare {
        /// Desired state (connection string or snapshot file)
        #[arg(value_name = "LEFT")]
        left: String,

        /// Current state (connection string or snapshot file)
        #[arg(value_name = "RIGHT")]
        right: String,

        /// SQL script applied to RIGHT before capture (always rolled back)
        #[arg(long, value_name = "FILE")]
        apply_sql_file: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "table")]
        format: OutputFormat,
    },

    /// Compare only the row counts of every table
    ///
    /// EXAMPLES:
    ///   pgcmp row-counts postgres://localhost/a postgres://localhost/b
    RowCounts {
        /// Desired state (connection string or snapshot file)
        #[arg(value_name = "LEFT")]
        left: String,

        /// Current state (connection string or snapshot file)
        #[arg(value_name = "RIGHT")]
        right: String,

        /// Output format
        #[arg(short, long, value_enum, default_value = "table")]
        format: OutputFormat,
    },

    /// Export a database catalog to a snapshot file
    ///
    /// The snapshot carries a checksum that is verified when it is loaded.
    ///
    /// EXAMPLES:
    ///   pgcmp export postgres://localhost/app --output app.json
    ///
    ///   # Overwrite an existing file
    ///   pgcmp export postgres://localhost/app --output app.json --force
    Export {
        /// Database to export (connection string)
        #[arg(value_name = "SOURCE")]
        source: String,

        /// Output snapshot file
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,

        /// Overwrite existing file without confirmation
        #[arg(long)]
        force: bool,
    },
}
