//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `sharenote_core` linkage (`sharenote_cli` prints the version).
//! - Preview the history a note edit would record
//!   (`sharenote_cli diff OLD_FILE NEW_FILE`).

use clap::{Parser, Subcommand};
use sharenote_core::{compute_diff, core_version, ChangeKind, ChangeRecord};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "sharenote_cli", version)]
#[command(about = "Smoke checks for sharenote core", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the line changes that editing OLD into NEW would record
    Diff {
        /// File holding the current note content
        old: PathBuf,
        /// File holding the edited note content
        new: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match cli.command {
        None => {
            println!("sharenote_core version={}", core_version());
            ExitCode::SUCCESS
        }
        Some(Commands::Diff { old, new }) => match run_diff(&old, &new) {
            Ok(()) => ExitCode::SUCCESS,
            Err(err) => {
                eprintln!("error: {err}");
                ExitCode::FAILURE
            }
        },
    }
}

fn run_diff(old_path: &Path, new_path: &Path) -> std::io::Result<()> {
    let old_text = std::fs::read_to_string(old_path)?;
    let new_text = std::fs::read_to_string(new_path)?;
    for change in compute_diff(&old_text, &new_text) {
        println!("{}", format_change(&change));
    }
    Ok(())
}

fn format_change(change: &ChangeRecord) -> String {
    let old_text = change.old_text.as_deref().unwrap_or("");
    let new_text = change.new_text.as_deref().unwrap_or("");
    match change.kind {
        ChangeKind::Add => format!("{:>5} + {new_text}", change.position),
        ChangeKind::Delete => format!("{:>5} - {old_text}", change.position),
        ChangeKind::Update => format!("{:>5} ~ {old_text} => {new_text}", change.position),
    }
}
