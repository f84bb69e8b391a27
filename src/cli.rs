use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Skusync - marketplace inventory reconciliation and sync runner
#[derive(Parser, Debug)]
#[command(name = "skusync")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Output format for CI
    #[arg(long, global = true)]
    pub json: bool,

    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Reconcile local inventory against the remote snapshot
    Sync {
        /// Path to the local inventory file (JSON array of records)
        #[arg(short, long, default_value = "items.json")]
        source: PathBuf,

        /// Path to the remote snapshot file
        #[arg(short, long, default_value = "remote.json")]
        remote: PathBuf,

        /// Path to the configuration file
        #[arg(short, long, default_value = skusync::config::CONFIG_FILE)]
        config: PathBuf,

        /// Dry run - compute and report decisions without writing
        #[arg(long)]
        dry_run: bool,

        /// Offline - never attempt remote mutation
        #[arg(long)]
        offline: bool,

        /// Only process local items changed on/after this date (YYYY-MM-DD)
        #[arg(long)]
        since: Option<String>,

        /// Skip the delete reconciliation pass
        #[arg(long)]
        no_delete: bool,

        /// Write a one-row CSV rollup to this path
        #[arg(long)]
        summary_csv: Option<PathBuf>,

        /// Directory for run artifacts (overrides config)
        #[arg(long)]
        log_dir: Option<PathBuf>,
    },
}
