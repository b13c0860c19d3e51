//! CLI parse: clap types for schemaforge. No behavior; definitions only.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// schemaforge - generate typed project sources from a database schema snapshot
#[derive(Parser)]
#[command(name = "schemaforge")]
#[command(about = "Generate models, roles, rpc bindings and storages from a schema snapshot")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Project root directory
    #[arg(long, default_value = ".")]
    pub project: PathBuf,

    /// Configuration file path (overrides default config loading)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging (default: off)
    #[arg(long, default_value = "false")]
    pub verbose: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file)
    #[arg(long)]
    pub log_output: Option<String>,

    /// Log file path (when output is "file")
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate sources for every resource in a snapshot and update the import state
    Generate {
        /// Schema snapshot (JSON)
        #[arg(long)]
        resources: PathBuf,

        /// Render without writing files; the import state is kept in memory
        #[arg(long)]
        dry_run: bool,
    },
    /// Show the recorded import state
    State {
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Show relations inferred from a snapshot
    Relations {
        /// Schema snapshot (JSON)
        #[arg(long)]
        resources: PathBuf,

        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
}
