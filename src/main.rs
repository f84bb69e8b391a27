//! Skusync CLI - marketplace inventory reconciliation and sync runner
//!
//! Usage: skusync sync [--dry-run] [--offline] [--since YYYY-MM-DD]

mod cli;

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::Result;
use chrono::{NaiveDate, TimeZone, Utc};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};
use skusync::{
    report, Config, JsonFileLocalStore, JsonFileRemoteStore, RunSummary, SyncOptions,
};

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let code = match dispatch(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            2
        }
    };
    std::process::exit(code);
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn dispatch(cli: Cli) -> Result<i32> {
    match cli.command {
        Commands::Sync {
            source,
            remote,
            config,
            dry_run,
            offline,
            since,
            no_delete,
            summary_csv,
            log_dir,
        } => cmd_sync(CmdSync {
            source,
            remote,
            config,
            dry_run,
            offline,
            since,
            no_delete,
            summary_csv,
            log_dir,
            json: cli.json,
        }),
    }
}

struct CmdSync {
    source: PathBuf,
    remote: PathBuf,
    config: PathBuf,
    dry_run: bool,
    offline: bool,
    since: Option<String>,
    no_delete: bool,
    summary_csv: Option<PathBuf>,
    log_dir: Option<PathBuf>,
    json: bool,
}

fn cmd_sync(cmd: CmdSync) -> Result<i32> {
    let config = Config::load(&cmd.config)?;

    let options = SyncOptions {
        offline: config.effective_offline(cmd.offline),
        dry_run: cmd.dry_run,
        deletes_enabled: config.deletes_enabled && !cmd.no_delete,
        since: parse_since(cmd.since.as_deref()),
        timestamp_fields: config.timestamp_fields.clone(),
    };

    let local = JsonFileLocalStore::new(&cmd.source);
    let mut remote = JsonFileRemoteStore::new(&cmd.remote, config.comparable_fields.clone());

    // Ctrl-C trips the flag; the engine finishes the current decision and
    // emits a partial summary.
    let cancel = Arc::new(AtomicBool::new(false));
    {
        let cancel = Arc::clone(&cancel);
        let _ = ctrlc::set_handler(move || cancel.store(true, Ordering::SeqCst));
    }

    if !cmd.json {
        println!("Syncing {} -> {}", cmd.source.display(), cmd.remote.display());
        if options.dry_run {
            println!("Mode: DRY RUN (no writes, no deletes)");
        }
        if options.offline {
            println!("Mode: OFFLINE (no remote mutation)");
        }
        if let Some(since) = &options.since {
            println!("Filter: since {} (local items only)", since.format("%Y-%m-%d"));
        }
    }

    let summary = skusync::run_sync_with_callback::<fn(skusync::SyncEvent)>(
        &local,
        &mut remote,
        &options,
        Some(&cancel),
        None,
    )?;

    let log_dir = cmd.log_dir.unwrap_or_else(|| config.log_dir.clone());
    let artifact = report::write_artifacts(&summary, &log_dir)?;
    if let Some(csv_path) = &cmd.summary_csv {
        report::write_summary_csv(&summary, csv_path)?;
    }

    if cmd.json {
        println!("{}", serde_json::to_string(&summary)?);
    } else {
        print_summary(&summary, &artifact, cmd.summary_csv.as_deref());
    }

    Ok(if summary.has_errors() { 1 } else { 0 })
}

/// Parse the cutoff date, failing open: an unparseable value logs a
/// warning and the run continues unfiltered.
fn parse_since(since: Option<&str>) -> Option<chrono::DateTime<Utc>> {
    let raw = since?;
    match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        Ok(date) => date
            .and_hms_opt(0, 0, 0)
            .map(|dt| Utc.from_utc_datetime(&dt)),
        Err(_) => {
            tracing::warn!(
                since = raw,
                "could not parse --since (expected YYYY-MM-DD); continuing without filter"
            );
            None
        }
    }
}

fn print_summary(summary: &RunSummary, artifact: &Path, csv: Option<&Path>) {
    let c = &summary.counts;
    println!();
    println!("Added   : {}", c.added);
    println!("Updated : {}", c.updated);
    println!("Skipped : {}", c.skipped);
    println!("Deleted : {}", c.deleted);
    println!("Errors  : {}", c.errors);
    println!("Duration: {}s", summary.duration_sec);
    println!("Details : {}", artifact.display());
    if let Some(csv) = csv {
        println!("Summary CSV: {}", csv.display());
    }
    if summary.has_errors() {
        println!("\nSync completed WITH ERRORS");
    } else {
        println!("\nSync completed successfully");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_since_accepts_iso_date() {
        let dt = parse_since(Some("2025-10-01")).unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2025, 10, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn parse_since_fails_open() {
        assert!(parse_since(Some("not-a-date")).is_none());
        assert!(parse_since(None).is_none());
    }
}
