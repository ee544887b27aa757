//! The `thyro files` command: folder housekeeping.

use clap::{Args, Subcommand};
use std::path::PathBuf;

use thyro_core::files::{move_by_prefix, remove_duplicates};

/// Arguments for the `files` command.
#[derive(Args, Debug)]
pub struct FilesArgs {
    #[command(subcommand)]
    pub command: FilesCommand,
}

#[derive(Subcommand, Debug)]
pub enum FilesCommand {
    /// Move files whose names start with given letters into another directory
    Move {
        /// Directory to move files out of
        #[arg(long, required = true)]
        source: PathBuf,

        /// Directory to move files into (created if missing)
        #[arg(long, required = true)]
        target: PathBuf,

        /// Leading characters to match, case-insensitive
        #[arg(long, default_value = "BCD")]
        prefixes: String,
    },

    /// Delete files from TARGET that also exist (by name) in REFERENCE
    Dedupe {
        /// Directory whose file names are kept
        #[arg(long, required = true)]
        reference: PathBuf,

        /// Directory to remove duplicates from
        #[arg(long, required = true)]
        target: PathBuf,
    },
}

/// Execute the files command.
pub fn execute(args: FilesArgs) -> anyhow::Result<()> {
    match args.command {
        FilesCommand::Move {
            source,
            target,
            prefixes,
        } => {
            let prefixes: Vec<char> = prefixes.chars().collect();
            if prefixes.is_empty() {
                anyhow::bail!("--prefixes must contain at least one character");
            }
            let summary = move_by_prefix(&source, &target, &prefixes)?;
            println!(
                "Done! Moved {} files ({} failed)",
                summary.processed, summary.failed
            );
        }

        FilesCommand::Dedupe { reference, target } => {
            let summary = remove_duplicates(&reference, &target)?;
            println!(
                "Done! Removed {} duplicate files ({} failed)",
                summary.processed, summary.failed
            );
        }
    }

    Ok(())
}
