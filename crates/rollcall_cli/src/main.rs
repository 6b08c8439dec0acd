//! Rollcall command-line front end.
//!
//! # Responsibility
//! - Expose roster import/edit/delete and scan ingestion over a local database.
//! - Stand in for the presentation layer; all rules live in `rollcall_core`.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rollcall_core::db::open_db;
use rollcall_core::{
    default_log_level, init_logging, AttendanceDesk, BlobStore, Clock, SqliteBlobStore, StatusKind,
};
use std::io::BufRead;
use std::path::PathBuf;

/// Command-line arguments for rollcall
#[derive(Parser, Debug)]
#[command(name = "rollcall")]
#[command(about = "Roster check-in tracking with CSV import and scan ingestion")]
#[command(version)]
struct Args {
    /// SQLite database file holding roster and attendance snapshots
    #[arg(long, default_value = "rollcall.sqlite3", env = "ROLLCALL_DB")]
    db: PathBuf,

    /// Absolute directory for rolling log files; logging is off when unset
    #[arg(long, env = "ROLLCALL_LOG_DIR")]
    log_dir: Option<String>,

    /// Log level (trace|debug|info|warn|error)
    #[arg(long, env = "ROLLCALL_LOG_LEVEL")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Replace the roster with the contents of a CSV file (`id,name...`)
    Import { file: PathBuf },
    /// Add or overwrite one student
    Add {
        id: String,
        #[arg(required = true, num_args = 1..)]
        name: Vec<String>,
    },
    /// Change a student's id and/or name
    Edit {
        old_id: String,
        new_id: String,
        #[arg(required = true, num_args = 1..)]
        name: Vec<String>,
    },
    /// Delete one or more students and their check-ins
    Delete {
        #[arg(required = true, num_args = 1..)]
        ids: Vec<String>,
    },
    /// Check in scanned ids; reads one id per stdin line when none are given
    Scan { candidates: Vec<String> },
    /// Print the roster
    Roster,
    /// Print recorded check-ins
    Attendance,
}

fn main() -> Result<()> {
    let args = Args::parse();

    if let Some(log_dir) = args.log_dir.as_deref() {
        let level = args.log_level.as_deref().unwrap_or(default_log_level());
        init_logging(level, log_dir).context("failed to initialize logging")?;
    }

    let conn = open_db(&args.db)
        .with_context(|| format!("failed to open database `{}`", args.db.display()))?;
    let store = SqliteBlobStore::try_new(&conn)?;
    let mut desk = AttendanceDesk::open(store)?;

    match args.command {
        Command::Import { file } => {
            let bytes = std::fs::read(&file)
                .with_context(|| format!("error reading the file `{}`", file.display()))?;
            let report = desk.import_csv_bytes(&bytes)?;
            println!(
                "Successfully uploaded and processed {} students.",
                report.imported_count
            );
            for line in &report.skipped_lines {
                println!("skipped malformed line {line}");
            }
            if report.dropped_arrivals > 0 {
                println!(
                    "removed {} check-ins for students no longer on the roster",
                    report.dropped_arrivals
                );
            }
        }
        Command::Add { id, name } => {
            let identity = desk.add_student(&id, &name.join(" "))?;
            println!("saved {identity}");
        }
        Command::Edit {
            old_id,
            new_id,
            name,
        } => {
            let outcome = desk.edit_student(&old_id, &new_id, &name.join(" "))?;
            if outcome.arrival_rekeyed {
                println!("updated student and check-in");
            } else {
                println!("updated student");
            }
        }
        Command::Delete { ids } => {
            let removed = desk.delete_many(&ids)?;
            println!("deleted {removed} students");
        }
        Command::Scan { candidates } => {
            if candidates.is_empty() {
                let stdin = std::io::stdin();
                for line in stdin.lock().lines() {
                    scan_one(&mut desk, &line?)?;
                }
            } else {
                for candidate in &candidates {
                    scan_one(&mut desk, candidate)?;
                }
            }
        }
        Command::Roster => {
            for (identity, name) in desk.roster().iter() {
                println!("{name} (ID: {identity})");
            }
        }
        Command::Attendance => {
            for (identity, record) in desk.attendance().iter() {
                println!("{} (ID: {identity})\t{}", record.display_name, record.time);
            }
        }
    }

    Ok(())
}

fn scan_one<S: BlobStore, C: Clock>(
    desk: &mut AttendanceDesk<S, C>,
    candidate: &str,
) -> Result<()> {
    let outcome = desk.scan(candidate)?;
    match outcome.status() {
        StatusKind::Error => eprintln!("{}", outcome.message()),
        StatusKind::Success | StatusKind::Warning => println!("{}", outcome.message()),
    }
    Ok(())
}
