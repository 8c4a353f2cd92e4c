//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::commands;


/// Gemini Goblin - CLI for Gemini CLI usage tracking and cost analytics
#[derive(Parser)]
#[command(name = "gcg")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}


#[derive(Subcommand)]
enum Commands {
    /// Aggregate a telemetry log and show daily usage and cost
    Stats {
        /// Telemetry file, or a directory holding .gemini/telemetry.{log,jsonl}
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Timezone for daily buckets (e.g. 'UTC', 'America/New_York');
        /// defaults to the system timezone
        #[arg(short = 'z', long)]
        timezone: Option<String>,

        /// Archive the raw log after converting it
        #[arg(long)]
        archive: bool,

        /// Simplification level applied while converting (0-3)
        #[arg(short, long, default_value_t = 1)]
        level: u8,
    },

    /// Convert a raw telemetry log into canonical JSONL
    Convert {
        /// Raw log of concatenated JSON objects (default: .gemini/telemetry.log)
        input: Option<PathBuf>,

        /// Output JSONL path (default: telemetry.jsonl next to the input)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Simplification level applied to converted records (0-3)
        #[arg(short, long, default_value_t = 0)]
        level: u8,

        /// Move the consumed raw log into the archive folder
        #[arg(long)]
        archive: bool,

        /// Where archived logs go (default: system temp directory)
        #[arg(short = 'a', long)]
        archive_folder: Option<PathBuf>,
    },

    /// Re-simplify an existing JSONL file in place
    Simplify {
        /// The JSONL file to simplify
        input: PathBuf,

        /// Simplification level (0-3)
        #[arg(short, long, default_value_t = 1)]
        level: u8,

        /// Where the original file is archived (default: system temp directory)
        #[arg(short = 'a', long)]
        archive_folder: Option<PathBuf>,

        /// Remove the original instead of archiving it
        #[arg(short, long)]
        disable_archiving: bool,
    },
}


/// Run the CLI.
pub fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Stats { path, timezone, archive, level }) => {
            commands::stats::run(path, timezone, archive, level)
        }
        Some(Commands::Convert { input, output, level, archive, archive_folder }) => {
            commands::convert::run(input, output, level, archive, archive_folder)
        }
        Some(Commands::Simplify { input, level, archive_folder, disable_archiving }) => {
            commands::simplify::run(input, level, archive_folder, disable_archiving)
        }
        None => {
            // No subcommand, show help
            use clap::CommandFactory;
            Cli::command().print_help()?;
            Ok(())
        }
    }
}
